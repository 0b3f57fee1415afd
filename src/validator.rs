//! Frame size validation and classification

use serde::{Deserialize, Serialize};

use crate::types::layout::{MIN_BEACON_FRAME_SIZE, MIN_FRAME_SIZE};
use crate::{DecodeError, Result};

/// Size class of a frame that passed the minimum length check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub enum FrameClass {
    /// Header and trailer present but the beacon window is incomplete.
    /// Reported with metadata only.
    Malformed,
    /// Complete beacon window, fields are decoded.
    Beacon,
}

impl FrameClass {
    /// Classify a frame by its total length.
    ///
    /// Frames that cannot hold the link-layer header and trailer are rejected
    /// with [`DecodeError::ShortFrame`] and produce no report at all.
    pub fn classify(length: usize) -> Result<Self> {
        if length < MIN_FRAME_SIZE {
            return Err(DecodeError::ShortFrame { length, required: MIN_FRAME_SIZE });
        }

        if length < MIN_BEACON_FRAME_SIZE {
            Ok(FrameClass::Malformed)
        } else {
            Ok(FrameClass::Beacon)
        }
    }

    /// Report tag opening every report line.
    pub const fn tag(self) -> &'static str {
        match self {
            FrameClass::Malformed => "<MALFORMED PACKET> ",
            FrameClass::Beacon => "<BEACON PACKET> ",
        }
    }

    pub fn is_beacon(self) -> bool {
        self == FrameClass::Beacon
    }
}
