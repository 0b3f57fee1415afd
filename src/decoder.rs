//! Stateful beacon decoder
//!
//! [`BeaconDecoder`] turns a [`RawFrame`] into a [`DecodedFrame`]. The only state
//! it keeps between frames is the status [`MessageCounter`]; it is mutated
//! through `&mut self`, so a decoder has exactly one writer at a time. Run one
//! decoder per frame source.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::Result;
use crate::types::layout::{
    self, CONFIG_BLOCK_OFFSET, CONFIG_SLOT_ID, MESSAGE_COUNTER_MODULUS, STATUS_BLOCK_OFFSET,
};
use crate::types::{BeaconFields, ConfigFields, LinkMetadata, PayloadReader, RawFrame, StatusFields};
use crate::validator::FrameClass;

/// Free-running modulo-16 sequence number assigned to status frames.
///
/// Unrelated to the link-layer sequence number; downstream tooling uses it to
/// spot gaps in the decoded status stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MessageCounter {
    next: u8,
}

impl MessageCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counter whose next assigned value is `value % 16`.
    pub fn starting_at(value: u8) -> Self {
        Self { next: value % MESSAGE_COUNTER_MODULUS }
    }

    /// Value the next status frame will receive.
    pub fn peek(&self) -> u8 {
        self.next
    }

    /// Assign the current value and advance, wrapping 15 -> 0.
    pub fn advance(&mut self) -> u8 {
        let value = self.next;
        self.next = (self.next + 1) % MESSAGE_COUNTER_MODULUS;
        value
    }
}

/// Everything extracted from one frame.
///
/// `config` and `status` are only populated when their trigger fields say so;
/// malformed frames carry neither beacon nor optional blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct DecodedFrame {
    pub class: FrameClass,
    pub payload_size: usize,
    pub link: LinkMetadata,
    pub beacon: Option<BeaconFields>,
    pub config: Option<ConfigFields>,
    pub status: Option<StatusFields>,
}

/// Validates and decodes beacon frames.
#[derive(Debug, Default)]
pub struct BeaconDecoder {
    counter: MessageCounter,
}

impl BeaconDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decoder continuing from an existing counter.
    pub fn with_counter(counter: MessageCounter) -> Self {
        Self { counter }
    }

    pub fn counter(&self) -> MessageCounter {
        self.counter
    }

    /// Validate, classify and decode a frame.
    ///
    /// # Errors
    ///
    /// - [`DecodeError::ShortFrame`](crate::DecodeError::ShortFrame) when the frame
    ///   cannot hold header and trailer
    /// - [`DecodeError::UnknownEnumValue`](crate::DecodeError::UnknownEnumValue) when
    ///   a label-coded field is outside its table
    /// - [`DecodeError::OutOfBounds`](crate::DecodeError::OutOfBounds) if a field read
    ///   would leave the payload
    ///
    /// The message counter advances once per full-size status beacon, before
    /// any field is validated, so a status frame rejected for an unknown label
    /// still leaves a gap in the sequence.
    pub fn decode(&mut self, frame: &RawFrame) -> Result<DecodedFrame> {
        let class = FrameClass::classify(frame.len())?;
        let payload_size = frame.payload_size();

        let mut decoded = DecodedFrame {
            class,
            payload_size,
            link: frame.link,
            beacon: None,
            config: None,
            status: None,
        };

        if !class.is_beacon() {
            debug!("Malformed frame: {} bytes, payload {}", frame.len(), payload_size);
            return Ok(decoded);
        }

        let payload = frame.payload().unwrap_or_default();
        let reader = PayloadReader::beacon_window(payload)?;

        // Status frames consume a counter value even when a later field is rejected
        let is_status = reader.flag(layout::beacon::PAYLOAD_TYPE)?;
        let message_counter = is_status.then(|| self.counter.advance());

        let beacon = BeaconFields::extract(&reader)?;
        decoded.beacon = Some(beacon);

        if beacon.packet_slot_id == CONFIG_SLOT_ID {
            decoded.config = Some(ConfigFields::extract(&reader.block(CONFIG_BLOCK_OFFSET))?);
        }

        if let Some(message_counter) = message_counter {
            let block = reader.block(STATUS_BLOCK_OFFSET);
            decoded.status = Some(StatusFields::extract(&block, message_counter)?);
        }

        trace!(
            "Decoded beacon: config={} status={}",
            decoded.config.is_some(),
            decoded.status.is_some()
        );

        Ok(decoded)
    }
}
