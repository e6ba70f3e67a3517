//! Routes every channel through its animator once per frame

use crate::{
    animation::{AnimationError, AnimationTiming, BarAnimator, BarState, RingAnimator, RingState},
    models::{self, ChannelMode},
    readings::ReadingSnapshot,
};

/// Destination of the brightness values of a frame
pub trait LedSink {
    /// Set the brightness of a LED, by device index
    fn write(&mut self, index: usize, brightness: u8);

    /// Make every write since the last flush visible at once
    fn flush(&mut self);
}

/// Animator of a channel along with its last state, resolved once from the channel mode
#[derive(Debug, Clone)]
enum ChannelAnimation {
    Ring {
        animator: RingAnimator,
        state: Option<RingState>,
    },
    Bar {
        animator: BarAnimator,
        state: Option<BarState>,
    },
}

impl ChannelAnimation {
    fn new(mode: ChannelMode, led_count: usize, timing: &AnimationTiming) -> Self {
        match mode {
            ChannelMode::Ring => Self::Ring {
                animator: RingAnimator::new(led_count, timing),
                state: None,
            },
            ChannelMode::Bar => Self::Bar {
                animator: BarAnimator::new(led_count, timing),
                state: None,
            },
        }
    }

    /// Advance the animation by one frame and write its output through `write`
    ///
    /// On error the state is left untouched and nothing is written.
    fn step(
        &mut self,
        previous: f64,
        current: f64,
        mut write: impl FnMut(&[u8]),
    ) -> Result<(), AnimationError> {
        match self {
            Self::Ring { animator, state } => {
                let (next, output) = animator.animate(state.as_ref(), previous, current)?;
                write(&output);
                *state = Some(next);
            }
            Self::Bar { animator, state } => {
                let next = animator.animate(state.as_ref(), previous, current)?;
                write(next.brightnesses());
                *state = Some(next);
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone)]
struct ChannelSlot {
    name: String,
    leds: Vec<usize>,
    animation: ChannelAnimation,
    notified_error: bool,
}

/// Per-channel animation state, owned for the lifetime of the renderer
#[derive(Debug, Clone)]
pub struct Dispatcher {
    channels: Vec<ChannelSlot>,
}

impl Dispatcher {
    pub fn new(channels: &[models::Channel], timing: &AnimationTiming) -> Self {
        Self {
            channels: channels
                .iter()
                .map(|channel| ChannelSlot {
                    name: channel.name.clone(),
                    leds: channel.leds.clone(),
                    animation: ChannelAnimation::new(channel.mode, channel.leds.len(), timing),
                    notified_error: false,
                })
                .collect(),
        }
    }

    /// Render one frame: animate every channel, write its LEDs, then flush the sink once
    ///
    /// A channel with an invalid reading keeps its state and its LEDs for this frame, the other
    /// channels are rendered normally.
    pub fn render_frame(&mut self, snapshot: &ReadingSnapshot, sink: &mut impl LedSink) {
        for channel in &mut self.channels {
            let (previous, current) = snapshot.pair(&channel.name);
            let leds = &channel.leds;

            let result = channel.animation.step(previous, current, |output| {
                for (&index, &brightness) in leds.iter().zip(output.iter()) {
                    sink.write(index, brightness);
                }
            });

            match result {
                Ok(()) => {
                    channel.notified_error = false;
                }
                Err(error) => {
                    if !channel.notified_error {
                        channel.notified_error = true;
                        warn!(channel = %channel.name, error = %error, "skipping channel update");
                    }
                }
            }
        }

        sink.flush();
    }
}
