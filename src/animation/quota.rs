use super::{check_fraction, AnimationError, MAX_BRIGHTNESS};

/// Result of spreading a fill fraction over a row of slots
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quota {
    /// Brightness of every slot, saturated slots first
    pub slots: Vec<u8>,
    /// Index of the first slot that did not saturate, or `slots.len()` if all of them did
    pub peak_index: usize,
    /// Brightness left in the slot at `peak_index`
    pub remainder: u8,
}

/// Position of the fill front after a call to [fill]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillFront {
    pub peak_index: usize,
    pub remainder: u8,
}

/// Fill `slots` in order with `round(len * 255 * fraction)` brightness units
///
/// Every slot is saturated before the next one receives anything. Rounding is half away from
/// zero.
pub fn fill(slots: &mut [u8], fraction: f64) -> Result<FillFront, AnimationError> {
    let fraction = check_fraction(fraction)?;

    let capacity = slots.len() * MAX_BRIGHTNESS as usize;
    let mut amount = ((capacity as f64 * fraction).round() as usize).min(capacity);

    for slot in slots.iter_mut() {
        let value = amount.min(MAX_BRIGHTNESS as usize);
        *slot = value as u8;
        amount -= value;
    }

    let peak_index = slots
        .iter()
        .position(|&value| value < MAX_BRIGHTNESS)
        .unwrap_or(slots.len());

    Ok(FillFront {
        peak_index,
        remainder: slots.get(peak_index).copied().unwrap_or(0),
    })
}

/// Spread `fraction` over `elements` slots of capacity 255
pub fn allocate(elements: usize, fraction: f64) -> Result<Quota, AnimationError> {
    let mut slots = vec![0; elements];
    let FillFront {
        peak_index,
        remainder,
    } = fill(&mut slots, fraction)?;

    Ok(Quota {
        slots,
        peak_index,
        remainder,
    })
}
