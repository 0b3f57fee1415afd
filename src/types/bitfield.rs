//! Bit-range extraction for packed beacon fields

use crate::{DecodeError, Result};

/// Extract the inclusive bit range `start..=end` of `byte`, right-aligned.
///
/// Bit 0 is the least significant bit. The range must satisfy
/// `start <= end <= 7`.
///
/// ```rust
/// use phacolink::types::extract_bits;
///
/// assert_eq!(extract_bits(0b0010_1010, 3, 5).unwrap(), 0b101);
/// assert_eq!(extract_bits(0xA5, 0, 7).unwrap(), 0xA5);
/// ```
pub fn extract_bits(byte: u8, start: u8, end: u8) -> Result<u8> {
    if start > end || end > 7 {
        return Err(DecodeError::InvalidBitRange { start, end });
    }

    let width = end - start + 1;
    let mask = (((1u16 << width) - 1) << start) as u8;
    Ok((byte & mask) >> start)
}

/// Check a single bit of `byte`.
pub fn bit_is_set(byte: u8, bit: u8) -> Result<bool> {
    Ok(extract_bits(byte, bit, bit)? == 1)
}
