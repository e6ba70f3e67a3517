use super::{allocate, check_fraction, AnimationError, AnimationTiming};

/// Animation state of a bar channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarState {
    brightnesses: Vec<u8>,
    pulse_step: u32,
    peak_index: usize,
    pulse_base: u8,
}

impl BarState {
    pub fn brightnesses(&self) -> &[u8] {
        &self.brightnesses
    }

    pub fn pulse_step(&self) -> u32 {
        self.pulse_step
    }

    /// Index of the LED at the front of the bar, `brightnesses().len()` when all are saturated
    pub fn peak_index(&self) -> usize {
        self.peak_index
    }

    /// Steady brightness of the peak LED
    pub fn pulse_base(&self) -> u8 {
        self.pulse_base
    }
}

/// Level meter on a linear group of LEDs, with a pulsing peak indicator
///
/// The pulse cycle is made of a decay phase of `pulse_steps` frames, where the peak LED fades
/// linearly from the peak brightness, followed by `delay_steps` frames where it is left alone.
/// The pulse never makes the peak LED brighter than its steady value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarAnimator {
    led_count: usize,
    timing: AnimationTiming,
}

impl BarAnimator {
    pub fn new(led_count: usize, timing: &AnimationTiming) -> Self {
        Self {
            led_count,
            timing: *timing,
        }
    }

    fn pulse_brightness(&self, step: u32, base: u8) -> u8 {
        let decay = 1. - step as f64 / self.timing.pulse_steps as f64;
        let brightness = (self.timing.pulse_peak_brightness as f64 * decay).round() as u8;
        brightness.min(base)
    }

    /// Compute the next state from the previous one (`None` on first activation) and the
    /// reading pair. The brightness of every LED is [BarState::brightnesses].
    pub fn animate(
        &self,
        state: Option<&BarState>,
        previous: f64,
        current: f64,
    ) -> Result<BarState, AnimationError> {
        let previous = check_fraction(previous)?;
        let current = check_fraction(current)?;

        let mut next = match state {
            Some(state) if previous == current => state.clone(),
            state => {
                let quota = allocate(self.led_count, current)?;

                BarState {
                    brightnesses: quota.slots,
                    // The pulse cadence carries over level changes
                    pulse_step: state.map(|state| state.pulse_step).unwrap_or(0),
                    peak_index: quota.peak_index,
                    pulse_base: quota.remainder,
                }
            }
        };

        if next.pulse_step >= self.timing.cycle_steps() {
            next.pulse_step = 0;
        }

        if next.pulse_step < self.timing.pulse_steps {
            let brightness = self.pulse_brightness(next.pulse_step, next.pulse_base);

            if let Some(peak) = next.brightnesses.get_mut(next.peak_index) {
                *peak = brightness;
            }
        }

        next.pulse_step += 1;
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn animator(led_count: usize) -> BarAnimator {
        BarAnimator::new(led_count, &AnimationTiming::default())
    }

    #[test]
    fn test_first_activation() {
        let state = animator(4).animate(None, 0.625, 0.625).unwrap();

        // The peak LED starts the pulse at min(100, 128)
        assert_eq!(state.brightnesses(), &[255, 255, 100, 0]);
        assert_eq!(state.peak_index(), 2);
        assert_eq!(state.pulse_base(), 128);
        assert_eq!(state.pulse_step(), 1);
    }

    #[test]
    fn test_pulse_cycle() {
        let animator = animator(4);
        let timing = AnimationTiming::default();
        let mut state = animator.animate(None, 0.3, 0.3).unwrap();
        let base = state.pulse_base();
        let mut values = vec![state.brightnesses()[state.peak_index()]];

        for _ in 1..timing.cycle_steps() {
            state = animator.animate(Some(&state), 0.3, 0.3).unwrap();
            values.push(state.brightnesses()[state.peak_index()]);
        }

        let (pulse, delay) = values.split_at(timing.pulse_steps as usize);

        assert!(pulse.windows(2).all(|w| w[1] <= w[0]), "{:?}", pulse);
        assert!(delay.iter().all(|&v| v == pulse[pulse.len() - 1]));
        assert!(values.iter().all(|&v| v <= base));

        // Saturated LEDs are never touched
        assert_eq!(&state.brightnesses()[..state.peak_index()], &[255]);

        // The counter wraps and the pulse restarts
        state = animator.animate(Some(&state), 0.3, 0.3).unwrap();
        assert_eq!(state.pulse_step(), 1);
        assert_eq!(state.brightnesses()[state.peak_index()], 100u8.min(base));
    }

    #[test]
    fn test_pulse_is_capped_by_base() {
        // 0.26 * 4 * 255 = 265.2, so the peak LED only gets 10
        let animator = animator(4);
        let mut state = animator.animate(None, 0.26, 0.26).unwrap();
        assert_eq!(state.pulse_base(), 10);

        for _ in 0..20 {
            assert!(state.brightnesses()[1] <= 10);
            state = animator.animate(Some(&state), 0.26, 0.26).unwrap();
        }
    }

    #[test]
    fn test_level_change_keeps_counter() {
        let animator = animator(4);
        let mut state = animator.animate(None, 0.3, 0.3).unwrap();
        for _ in 0..9 {
            state = animator.animate(Some(&state), 0.3, 0.3).unwrap();
        }
        assert_eq!(state.pulse_step(), 10);

        let changed = animator.animate(Some(&state), 0.3, 0.9).unwrap();
        assert_eq!(changed.pulse_step(), 11);
        assert_eq!(changed.peak_index(), 3);
        assert_eq!(&changed.brightnesses()[..3], &[255, 255, 255]);
        assert_eq!(changed.pulse_base(), 153);
        // Decayed pulse: round(100 * (1 - 10 / 25)) = 60
        assert_eq!(changed.brightnesses()[3], 60);
    }

    #[test]
    fn test_saturated_bar() {
        let animator = animator(4);
        let mut state = animator.animate(None, 1., 1.).unwrap();

        for _ in 0..200 {
            assert_eq!(state.peak_index(), 4);
            assert_eq!(state.brightnesses(), &[255; 4]);
            state = animator.animate(Some(&state), 1., 1.).unwrap();
        }
    }

    #[test]
    fn test_empty_bar() {
        let state = animator(4).animate(None, 0., 0.).unwrap();

        assert_eq!(state.brightnesses(), &[0; 4]);
        assert_eq!(state.peak_index(), 0);
    }

    #[test]
    fn test_invalid_reading() {
        assert_eq!(
            animator(4).animate(None, 0.2, 2.),
            Err(AnimationError::InvalidInput(2.))
        );
    }
}
