//! Sensor-to-light animation engine
//!
//! Everything in here is synchronous and deterministic: given a previous state and a pair of
//! readings, an animator always produces the same next state.

use thiserror::Error;

use crate::models;

mod bar;
pub use bar::*;

mod field;
pub use field::*;

mod quota;
pub use quota::*;

mod ring;
pub use ring::*;

/// Brightness of a saturated LED
pub const MAX_BRIGHTNESS: u8 = 255;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum AnimationError {
    #[error("invalid input: {0} is outside of [0, 1]")]
    InvalidInput(f64),
}

/// Check that a reading or fill fraction is in [0, 1]
///
/// NaN is rejected as well.
pub fn check_fraction(value: f64) -> Result<f64, AnimationError> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(AnimationError::InvalidInput(value))
    }
}

/// Step counts and constants shared by the animators, resolved from the configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationTiming {
    /// Degrees the ring field advances every frame
    pub rotation_step: i32,
    /// Brightness the bar peak LED starts each pulse at
    pub pulse_peak_brightness: u8,
    /// Number of frames in the decaying part of the pulse
    pub pulse_steps: u32,
    /// Number of frames the peak LED rests between pulses
    pub delay_steps: u32,
}

impl AnimationTiming {
    pub fn new(animation: &models::Animation, frame_rate: u32) -> Self {
        let steps = |ms: u32| (frame_rate as f64 * ms as f64 / 1000.).round() as u32;

        let pulse_steps = steps(animation.pulse_decay);
        let mut delay_steps = steps(animation.pulse_delay);

        if pulse_steps.saturating_add(delay_steps) == 0 {
            // The cycle must last at least one frame for the counter to wrap
            delay_steps = 1;
        }

        Self {
            rotation_step: animation.rotation_step,
            pulse_peak_brightness: animation.pulse_peak_brightness,
            pulse_steps,
            delay_steps,
        }
    }

    /// Length of a full pulse cycle, in frames
    pub fn cycle_steps(&self) -> u32 {
        self.pulse_steps.saturating_add(self.delay_steps)
    }
}

impl Default for AnimationTiming {
    fn default() -> Self {
        Self::new(
            &models::Animation::default(),
            models::GlobalConfig::default().frame_rate,
        )
    }
}
