//! Builder for synthetic beacon frames
//!
//! Produces byte-exact frames for tests, benchmarks and capture tooling. Values
//! are masked to their field width but never checked against the label tables,
//! so out-of-table codes can be produced on purpose.
//!
//! ```rust
//! use phacolink::BeaconFrameBuilder;
//!
//! let frame = BeaconFrameBuilder::new()
//!     .network_state(2)
//!     .footswitch_id(7)
//!     .step_type(3)
//!     .build();
//! assert_eq!(frame.len(), 80);
//! ```

use crate::types::layout::{
    BEACON_WINDOW_SIZE, BitsField, ByteField, CONFIG_BLOCK_OFFSET, CRC_SIZE, HEADER_SIZE,
    STATUS_BLOCK_OFFSET, WordField, beacon, config, status,
};
use crate::types::{LinkMetadata, RawFrame};

/// Frame control for a data frame with PAN id compression
const DEFAULT_FRAME_CONTROL: [u8; 2] = [0x41, 0x88];

#[derive(Debug, Clone)]
pub struct BeaconFrameBuilder {
    header: [u8; HEADER_SIZE],
    payload: [u8; BEACON_WINDOW_SIZE],
    payload_len: usize,
    trailer: [u8; CRC_SIZE],
    link: LinkMetadata,
}

impl Default for BeaconFrameBuilder {
    fn default() -> Self {
        let mut header = [0xFF; HEADER_SIZE];
        header[..2].copy_from_slice(&DEFAULT_FRAME_CONTROL);
        header[2] = 0;

        Self {
            header,
            payload: [0; BEACON_WINDOW_SIZE],
            payload_len: BEACON_WINDOW_SIZE,
            trailer: [0; CRC_SIZE],
            link: LinkMetadata::default(),
        }
    }
}

impl BeaconFrameBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn set_bits(mut self, block: usize, field: BitsField, value: u8) -> Self {
        let width = field.end - field.start + 1;
        let mask = (((1u16 << width) - 1) << field.start) as u8;
        let byte = &mut self.payload[block + field.byte];
        *byte = (*byte & !mask) | ((value << field.start) & mask);
        self
    }

    fn set_flag(self, block: usize, field: BitsField, on: bool) -> Self {
        self.set_bits(block, field, on as u8)
    }

    fn set_byte(mut self, block: usize, field: ByteField, value: u8) -> Self {
        self.payload[block + field.byte] = value;
        self
    }

    fn set_word(mut self, block: usize, field: WordField, value: [u8; 2]) -> Self {
        let at = block + field.byte;
        self.payload[at..at + 2].copy_from_slice(&value);
        self
    }

    /// Link-layer sequence number
    pub fn sequence(mut self, seq: u8) -> Self {
        self.header[2] = seq;
        self
    }

    pub fn link(mut self, link: LinkMetadata) -> Self {
        self.link = link;
        self
    }

    /// Payload length between header and trailer. Shorter than the beacon
    /// window truncates the fields; longer pads with zeros.
    pub fn payload_len(mut self, len: usize) -> Self {
        self.payload_len = len;
        self
    }

    /// Overwrite one raw payload byte inside the beacon window.
    pub fn payload_byte(mut self, offset: usize, value: u8) -> Self {
        if let Some(byte) = self.payload.get_mut(offset) {
            *byte = value;
        }
        self
    }

    pub fn network_state(self, code: u8) -> Self {
        self.set_bits(0, beacon::NETWORK_STATE, code)
    }

    pub fn beacon_source(self, code: u8) -> Self {
        self.set_bits(0, beacon::BEACON_SOURCE, code)
    }

    pub fn footswitch_id(self, id: u16) -> Self {
        self.set_word(0, beacon::FOOTSWITCH_ID, id.to_be_bytes())
    }

    pub fn sm_overlay(self, on: bool) -> Self {
        self.set_flag(0, beacon::SM_OVERLAY, on)
    }

    pub fn sg_enable(self, on: bool) -> Self {
        self.set_flag(0, beacon::SG_ENABLE, on)
    }

    pub fn step_type(self, code: u8) -> Self {
        self.set_bits(0, beacon::STEP_TYPE, code)
    }

    pub fn slot_id(self, slot: u8) -> Self {
        self.set_bits(0, beacon::PACKET_SLOT_ID, slot)
    }

    /// Mark the beacon as a status beacon (`true`) or setup beacon (`false`)
    pub fn status(self, on: bool) -> Self {
        self.set_flag(0, beacon::PAYLOAD_TYPE, on)
    }

    pub fn step_sub_type(self, code: u8) -> Self {
        self.set_bits(0, beacon::STEP_SUB_TYPE, code)
    }

    pub fn sm_active(self, on: bool) -> Self {
        self.set_flag(0, beacon::SM_ACTIVE, on)
    }

    pub fn sg_active(self, on: bool) -> Self {
        self.set_flag(0, beacon::SG_ACTIVE, on)
    }

    pub fn sm_fsw_active(self, on: bool) -> Self {
        self.set_flag(0, beacon::SM_FSW_ACTIVE, on)
    }

    pub fn wireless_channel(self, channel: u8) -> Self {
        self.set_byte(0, beacon::WIRELESS_CHANNEL, channel)
    }

    pub fn vacuum_limit(self, mmhg: u16) -> Self {
        self.set_word(CONFIG_BLOCK_OFFSET, config::RANGE2_VACUUM_LIMIT_END, mmhg.to_be_bytes())
    }

    pub fn treadle_range(self, range: u8) -> Self {
        self.set_bits(STATUS_BLOCK_OFFSET, status::FOOTSWITCH_TREADLE_RANGE, range)
    }

    pub fn iop(self, mmhg: u8) -> Self {
        self.set_byte(STATUS_BLOCK_OFFSET, status::IOP, mmhg)
    }

    pub fn irrigation_pressure(self, mmhg: i16) -> Self {
        self.set_word(STATUS_BLOCK_OFFSET, status::IRRIGATION_PRESSURE, mmhg.to_be_bytes())
    }

    pub fn reflux(self, on: bool) -> Self {
        self.set_flag(STATUS_BLOCK_OFFSET, status::REFLUX_ACTIVE, on)
    }

    pub fn continuous_irrigation(self, on: bool) -> Self {
        self.set_flag(STATUS_BLOCK_OFFSET, status::CONTINUOUS_IRRIGATION, on)
    }

    pub fn range_penetration(self, value: u8) -> Self {
        self.set_bits(STATUS_BLOCK_OFFSET, status::RANGE_PENETRATION, value)
    }

    pub fn aspiration_pressure(self, mmhg: i16) -> Self {
        self.set_word(STATUS_BLOCK_OFFSET, status::ASPIRATION_PRESSURE, mmhg.to_be_bytes())
    }

    pub fn longitudinal_power(self, percent: u8) -> Self {
        self.set_byte(STATUS_BLOCK_OFFSET, status::ULS_LONGITUDINAL_POWER, percent)
    }

    pub fn torsional_amplitude(self, percent: u8) -> Self {
        self.set_byte(STATUS_BLOCK_OFFSET, status::ULS_TORSIONAL_AMPLITUDE, percent)
    }

    /// Serialize header, payload and trailer.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(HEADER_SIZE + self.payload_len + CRC_SIZE);
        bytes.extend_from_slice(&self.header);
        let kept = self.payload_len.min(BEACON_WINDOW_SIZE);
        bytes.extend_from_slice(&self.payload[..kept]);
        bytes.resize(HEADER_SIZE + self.payload_len, 0);
        bytes.extend_from_slice(&self.trailer);
        bytes
    }

    pub fn build(&self) -> RawFrame {
        RawFrame::new(self.to_bytes(), self.link)
    }
}
