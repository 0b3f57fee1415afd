//! Raw link-layer frame and its radio sideband

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::layout::{CRC_SIZE, HEADER_SIZE};

/// Link-quality sideband delivered by the radio alongside each frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct LinkMetadata {
    /// Link quality indicator (0-255)
    pub lqi: u8,
    /// Received signal strength in dBm
    pub rssi_dbm: i8,
    /// Arrival timestamp in microseconds
    pub timestamp_us: u64,
}

impl LinkMetadata {
    pub fn new(lqi: u8, rssi_dbm: i8, timestamp_us: u64) -> Self {
        Self { lqi, rssi_dbm, timestamp_us }
    }
}

/// One received link-layer frame: header, payload and FCS trailer.
///
/// The decoder never retains a frame beyond the call it was passed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame {
    /// Frame bytes as delivered by the radio (zero-copy via Arc)
    pub data: Arc<[u8]>,

    /// Radio sideband for this frame
    pub link: LinkMetadata,
}

impl RawFrame {
    /// Create a new raw frame
    pub fn new(data: Vec<u8>, link: LinkMetadata) -> Self {
        Self { data: data.into(), link }
    }

    /// Total frame length including header and trailer
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Payload between the link-layer header and the FCS trailer.
    ///
    /// Returns `None` when the frame cannot hold both header and trailer.
    pub fn payload(&self) -> Option<&[u8]> {
        let end = self.data.len().checked_sub(CRC_SIZE)?;
        self.data.get(HEADER_SIZE..end)
    }

    /// Payload size implied by the frame length (zero for short frames).
    pub fn payload_size(&self) -> usize {
        self.data.len().saturating_sub(HEADER_SIZE + CRC_SIZE)
    }
}
