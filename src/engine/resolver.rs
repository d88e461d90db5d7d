//! Terminal position to slot mapping
//!
//! Slots share a centered band covering 95% of the field width. Anything
//! outside the band (wall hugging, physics jitter) lands in the nearest edge
//! slot.

use crate::consts::{SLOT_BAND_FRACTION, SLOT_BAND_START};

/// Slot index for a ball leaving the field at `exit_x`
///
/// Total: every input, including non-finite ones, maps into
/// `[0, slot_count - 1]`.
pub fn resolve(exit_x: f32, field_width: f32, slot_count: usize) -> usize {
    let last = slot_count.saturating_sub(1);
    let band_start = field_width * SLOT_BAND_START;
    let slot_width = field_width * SLOT_BAND_FRACTION / slot_count as f32;

    let raw = ((exit_x - band_start) / slot_width).floor();
    if raw.is_nan() || raw < 0.0 {
        return 0;
    }
    // Saturating float->int cast handles +inf
    (raw as usize).min(last)
}

/// Horizontal centre of a slot (inverse of [`resolve`])
pub fn slot_center(slot: usize, field_width: f32, slot_count: usize) -> f32 {
    let slot_width = field_width * SLOT_BAND_FRACTION / slot_count as f32;
    field_width * SLOT_BAND_START + (slot as f32 + 0.5) * slot_width
}
