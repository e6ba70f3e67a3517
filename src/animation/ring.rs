use super::{check_fraction, AnimationError, AnimationTiming, CircularField, FIELD_SLOTS};

/// Animation state of a ring channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RingState {
    field: CircularField,
    heading: u16,
}

impl RingState {
    fn new(field: CircularField, heading: i32) -> Self {
        Self {
            field,
            heading: heading.rem_euclid(FIELD_SLOTS as i32) as u16,
        }
    }

    pub fn field(&self) -> &CircularField {
        &self.field
    }

    /// Rotational offset of the field, in degrees in [0, 360)
    pub fn heading(&self) -> u16 {
        self.heading
    }

    fn rotated(&self, degrees: i32) -> Self {
        let mut field = self.field.clone();
        field.rotate(degrees);
        Self::new(field, self.heading as i32 + degrees)
    }
}

/// Field a boundary reading pins the ring to, if `value` is a boundary
fn boundary_field(value: f64) -> Option<CircularField> {
    if value == 0. {
        Some(CircularField::off())
    } else if value == 1. {
        Some(CircularField::full())
    } else {
        None
    }
}

/// Rotating light on a circular group of LEDs
///
/// A steady mid-range reading keeps the lit segment turning by `rotation_step` degrees every
/// frame. A changed reading regenerates the field at the new level without interrupting the
/// rotation. Readings of exactly 0 or 1 freeze the ring fully off or fully on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RingAnimator {
    led_count: usize,
    rotation_step: i32,
}

impl RingAnimator {
    pub fn new(led_count: usize, timing: &AnimationTiming) -> Self {
        Self {
            led_count,
            rotation_step: timing.rotation_step,
        }
    }

    /// Compute the next state from the previous one (`None` on first activation) and the
    /// reading pair, along with the brightness of every LED of the ring
    pub fn animate(
        &self,
        state: Option<&RingState>,
        previous: f64,
        current: f64,
    ) -> Result<(RingState, Vec<u8>), AnimationError> {
        let previous = check_fraction(previous)?;
        let current = check_fraction(current)?;

        let next = if previous == current {
            match (state, boundary_field(current)) {
                // Nothing to animate, keep the frozen display
                (Some(state), Some(_)) => state.clone(),
                (None, Some(field)) => RingState::new(field, 0),
                (None, None) => RingState::new(CircularField::generate(current, 0)?, 0),
                (Some(state), None) => state.rotated(self.rotation_step),
            }
        } else if let Some(field) = boundary_field(current) {
            RingState::new(field, 0)
        } else {
            let heading = state.map(|state| state.heading as i32).unwrap_or(0) + self.rotation_step;
            RingState::new(CircularField::generate(current, heading)?, heading)
        };

        let output = next.field.sample(self.led_count);
        Ok((next, output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn animator() -> RingAnimator {
        RingAnimator::new(3, &AnimationTiming::default())
    }

    #[test]
    fn test_first_steady_tick() {
        let (state, output) = animator().animate(None, 0.5, 0.5).unwrap();

        assert_eq!(state.heading(), 0);
        assert_eq!(state.field(), &CircularField::generate(0.5, 0).unwrap());
        // Slots 0 and 120 are in the lit half, 240 is not
        assert_eq!(output, vec![255, 255, 0]);
    }

    #[test]
    fn test_steady_value_rotates() {
        let animator = animator();
        let (mut state, _) = animator.animate(None, 0.4, 0.4).unwrap();
        let lit = state.field().lit();

        for tick in 1..=120 {
            let (next, output) = animator.animate(Some(&state), 0.4, 0.4).unwrap();

            assert_eq!(next.heading(), (state.heading() + 7) % 360, "tick {}", tick);
            assert_eq!(next.field().lit(), lit);
            assert_eq!(output.len(), 3);

            state = next;
        }

        // 120 * 7 = 840 = 2 * 360 + 120
        assert_eq!(state.heading(), 120);
    }

    #[test]
    fn test_rotation_moves_the_segment() {
        let animator = animator();
        let (state, _) = animator.animate(None, 0.25, 0.25).unwrap();

        let mut expected = state.field().clone();
        expected.rotate(7);

        let (next, _) = animator.animate(Some(&state), 0.25, 0.25).unwrap();
        assert_eq!(next.field(), &expected);
    }

    #[test]
    fn test_boundary_is_frozen() {
        let animator = animator();

        let (off, output) = animator.animate(None, 0., 0.).unwrap();
        assert_eq!(off.field(), &CircularField::off());
        assert_eq!(output, vec![0; 3]);

        let (full, output) = animator.animate(None, 1., 1.).unwrap();
        assert_eq!(full.field(), &CircularField::full());
        assert_eq!(output, vec![255; 3]);

        // An existing state is kept as is, even if it does not match the boundary
        let (mid, _) = animator.animate(None, 0.3, 0.3).unwrap();
        let (kept, _) = animator.animate(Some(&mid), 1., 1.).unwrap();
        assert_eq!(kept, mid);
    }

    #[test]
    fn test_change_to_boundary_resets_heading() {
        let animator = animator();
        let (state, _) = animator.animate(None, 0.3, 0.3).unwrap();
        let (state, _) = animator.animate(Some(&state), 0.3, 0.3).unwrap();
        assert_eq!(state.heading(), 7);

        let (full, output) = animator.animate(Some(&state), 0.3, 1.).unwrap();
        assert_eq!(full.heading(), 0);
        assert_eq!(full.field(), &CircularField::full());
        assert_eq!(output, vec![255; 3]);

        let (off, output) = animator.animate(Some(&full), 1., 0.).unwrap();
        assert_eq!(off.heading(), 0);
        assert_eq!(output, vec![0; 3]);
    }

    #[test]
    fn test_change_continues_rotation() {
        let animator = animator();
        let (mut state, _) = animator.animate(None, 0.3, 0.3).unwrap();
        for _ in 0..4 {
            state = animator.animate(Some(&state), 0.3, 0.3).unwrap().0;
        }
        assert_eq!(state.heading(), 28);

        let (next, _) = animator.animate(Some(&state), 0.3, 0.6).unwrap();
        assert_eq!(next.heading(), 35);
        assert_eq!(next.field(), &CircularField::generate(0.6, 35).unwrap());

        // First activation on a changing value starts one step in
        let (fresh, _) = animator.animate(None, 0.3, 0.6).unwrap();
        assert_eq!(fresh.heading(), 7);
    }

    #[test]
    fn test_heading_wraps() {
        let animator = animator();
        let state = RingState::new(CircularField::generate(0.5, 355).unwrap(), 355);

        let (next, _) = animator.animate(Some(&state), 0.5, 0.5).unwrap();
        assert_eq!(next.heading(), 2);
    }

    #[test]
    fn test_invalid_reading() {
        let animator = animator();

        assert_eq!(
            animator.animate(None, 0.5, 1.2),
            Err(AnimationError::InvalidInput(1.2))
        );
        assert_eq!(
            animator.animate(None, -1., 0.5),
            Err(AnimationError::InvalidInput(-1.))
        );
    }
}
