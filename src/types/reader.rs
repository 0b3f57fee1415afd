//! Bounds-checked field reads over a payload slice

use super::bitfield::extract_bits;
use super::layout::{BEACON_WINDOW_SIZE, BitsField, ByteField, WordField};
use crate::{DecodeError, Result};

/// Read-only view of a payload positioned at a block offset.
///
/// Every access is checked against the full payload length; a read that would
/// run past it fails with [`DecodeError::OutOfBounds`] instead of touching
/// memory outside the frame.
#[derive(Debug, Clone, Copy)]
pub struct PayloadReader<'a> {
    payload: &'a [u8],
    base: usize,
}

impl<'a> PayloadReader<'a> {
    /// View over an arbitrary payload, positioned at offset 0.
    pub fn new(payload: &'a [u8]) -> Self {
        Self { payload, base: 0 }
    }

    /// View over a payload that must contain the complete beacon window.
    pub fn beacon_window(payload: &'a [u8]) -> Result<Self> {
        if payload.len() < BEACON_WINDOW_SIZE {
            return Err(DecodeError::MalformedBeacon {
                payload_size: payload.len(),
                required: BEACON_WINDOW_SIZE,
            });
        }
        Ok(Self::new(payload))
    }

    /// Reader for the block starting `offset` bytes into the payload.
    pub fn block(&self, offset: usize) -> Self {
        Self { payload: self.payload, base: self.base + offset }
    }

    /// Absolute payload offset this reader is positioned at
    pub fn base(&self) -> usize {
        self.base
    }

    pub fn payload_len(&self) -> usize {
        self.payload.len()
    }

    fn bytes(&self, offset: usize, width: usize) -> Result<&'a [u8]> {
        let start = self.base + offset;
        self.payload
            .get(start..start + width)
            .ok_or_else(|| DecodeError::out_of_bounds(start, width, self.payload.len()))
    }

    /// Read a full byte.
    pub fn byte(&self, field: ByteField) -> Result<u8> {
        Ok(self.bytes(field.byte, 1)?[0])
    }

    /// Read a packed bit range.
    pub fn bits(&self, field: BitsField) -> Result<u8> {
        let byte = self.bytes(field.byte, 1)?[0];
        extract_bits(byte, field.start, field.end)
    }

    /// Read a packed bit range as a flag (non-zero is set).
    pub fn flag(&self, field: BitsField) -> Result<bool> {
        Ok(self.bits(field)? != 0)
    }

    /// Read a big-endian unsigned word.
    pub fn u16_be(&self, field: WordField) -> Result<u16> {
        let bytes = self.bytes(field.byte, 2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    /// Read a big-endian signed word.
    pub fn i16_be(&self, field: WordField) -> Result<i16> {
        let bytes = self.bytes(field.byte, 2)?;
        Ok(i16::from_be_bytes([bytes[0], bytes[1]]))
    }
}
