use std::fmt;

use super::{fill, AnimationError, MAX_BRIGHTNESS};

/// Number of slots in a circular field, one per degree
pub const FIELD_SLOTS: usize = 360;

/// Virtual ring of 360 brightness values, sampled down to the physical LEDs of a ring
#[derive(Clone, PartialEq, Eq)]
pub struct CircularField {
    slots: [u8; FIELD_SLOTS],
}

impl CircularField {
    /// A field with every slot off
    pub fn off() -> Self {
        Self {
            slots: [0; FIELD_SLOTS],
        }
    }

    /// A field with every slot saturated
    pub fn full() -> Self {
        Self {
            slots: [MAX_BRIGHTNESS; FIELD_SLOTS],
        }
    }

    /// Fill the circle from degree 0 upwards with `fraction` of its capacity, then rotate it by
    /// `heading` degrees
    pub fn generate(fraction: f64, heading: i32) -> Result<Self, AnimationError> {
        let mut field = Self::off();
        fill(&mut field.slots, fraction)?;

        if heading.rem_euclid(FIELD_SLOTS as i32) != 0 {
            field.rotate(heading);
        }

        Ok(field)
    }

    /// Circular shift: the slot at `i` receives the value previously at `i - degrees`
    pub fn rotate(&mut self, degrees: i32) {
        let shift = degrees.rem_euclid(FIELD_SLOTS as i32) as usize;
        self.slots.rotate_right(shift);
    }

    /// Read `n` evenly spaced slots, starting at degree 0
    pub fn sample(&self, n: usize) -> Vec<u8> {
        (0..n).map(|i| self.slots[i * FIELD_SLOTS / n]).collect()
    }

    pub fn slots(&self) -> &[u8] {
        &self.slots
    }

    /// Number of slots that are not off
    pub fn lit(&self) -> usize {
        self.slots.iter().filter(|&&value| value > 0).count()
    }
}

impl Default for CircularField {
    fn default() -> Self {
        Self::off()
    }
}

impl fmt::Debug for CircularField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CircularField")
            .field("lit", &self.lit())
            .field("first", &self.slots[0])
            .finish()
    }
}
