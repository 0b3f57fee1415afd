//! Frame layout constants and per-field offset tables
//!
//! ## Frame Structure
//!
//! ```text
//! | frame control (2) | seq (1) | addressing (11) | payload ... | FCS (2) |
//! ```
//!
//! The payload starts with a 64-byte beacon window. Two optional blocks live
//! inside that window:
//!
//! - **Config block** at payload offset 22, present when the slot id is 8
//! - **Status block** at payload offset 38, present when the payload-type bit is set
//!
//! Field offsets below are relative to the start of their block. Multi-byte
//! values are big-endian.

use serde::Serialize;

pub const FRAME_CONTROL_SIZE: usize = 2;
pub const SEQ_NUM_SIZE: usize = 1;
pub const ADDRESS_INFO_SIZE: usize = 11;
pub const CRC_SIZE: usize = 2;

/// Link-layer header preceding the payload
pub const HEADER_SIZE: usize = FRAME_CONTROL_SIZE + SEQ_NUM_SIZE + ADDRESS_INFO_SIZE;

/// Payload bytes required for a frame to count as a beacon
pub const BEACON_WINDOW_SIZE: usize = 64;

/// Smallest frame that can hold header and trailer
pub const MIN_FRAME_SIZE: usize = HEADER_SIZE + CRC_SIZE;

/// Smallest frame that carries a complete beacon window
pub const MIN_BEACON_FRAME_SIZE: usize = HEADER_SIZE + BEACON_WINDOW_SIZE + CRC_SIZE;

/// Report buffer capacity, terminator included
pub const REPORT_BUFFER_SIZE: usize = 256;

/// Printable bytes a report may hold
pub const REPORT_MAX_LEN: usize = REPORT_BUFFER_SIZE - 1;

/// Slot id that announces a config block
pub const CONFIG_SLOT_ID: u8 = 8;

/// Payload offset of the config block
pub const CONFIG_BLOCK_OFFSET: usize = 22;

/// Payload offset of the status block
pub const STATUS_BLOCK_OFFSET: usize = 38;

/// Status frames are numbered modulo this value
pub const MESSAGE_COUNTER_MODULUS: u8 = 16;

/// Bit range `start..=end` inside one byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BitsField {
    pub name: &'static str,
    pub byte: usize,
    pub start: u8,
    pub end: u8,
}

/// A full unsigned byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ByteField {
    pub name: &'static str,
    pub byte: usize,
}

/// A big-endian 16-bit word starting at `byte`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WordField {
    pub name: &'static str,
    pub byte: usize,
    pub signed: bool,
}

/// Any field of a block layout, for table-driven inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FieldSpec {
    Bits(BitsField),
    Byte(ByteField),
    Word(WordField),
}

impl FieldSpec {
    pub fn name(&self) -> &'static str {
        match self {
            FieldSpec::Bits(f) => f.name,
            FieldSpec::Byte(f) => f.name,
            FieldSpec::Word(f) => f.name,
        }
    }

    /// Byte offset within the block
    pub fn offset(&self) -> usize {
        match self {
            FieldSpec::Bits(f) => f.byte,
            FieldSpec::Byte(f) => f.byte,
            FieldSpec::Word(f) => f.byte,
        }
    }

    /// Number of bytes the field touches
    pub fn width(&self) -> usize {
        match self {
            FieldSpec::Bits(_) | FieldSpec::Byte(_) => 1,
            FieldSpec::Word(_) => 2,
        }
    }

    /// One past the last byte the field touches
    pub fn end(&self) -> usize {
        self.offset() + self.width()
    }
}

/// Named group of fields at a fixed payload offset.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct BlockLayout {
    pub name: &'static str,
    pub offset: usize,
    pub fields: &'static [FieldSpec],
}

impl BlockLayout {
    /// Payload bytes needed to read every field of the block
    pub fn required_len(&self) -> usize {
        self.offset + self.fields.iter().map(FieldSpec::end).max().unwrap_or(0)
    }
}

const fn bits(name: &'static str, byte: usize, start: u8, end: u8) -> BitsField {
    BitsField { name, byte, start, end }
}

const fn byte(name: &'static str, byte: usize) -> ByteField {
    ByteField { name, byte }
}

const fn word(name: &'static str, byte: usize, signed: bool) -> WordField {
    WordField { name, byte, signed }
}

/// Beacon block, always present in a full beacon window.
pub mod beacon {
    use super::*;

    pub const NETWORK_STATE: BitsField = bits("network_state", 0, 0, 2);
    pub const BEACON_SOURCE: BitsField = bits("beacon_source", 0, 3, 5);
    pub const FOOTSWITCH_ID: WordField = word("footswitch_id", 4, false);
    pub const SM_OVERLAY: BitsField = bits("sm_overlay", 6, 7, 7);
    pub const SG_ENABLE: BitsField = bits("sg_enable", 7, 7, 7);
    pub const STEP_TYPE: BitsField = bits("step_type", 9, 0, 4);
    pub const PACKET_SLOT_ID: BitsField = bits("packet_slot_id", 10, 0, 4);
    pub const PAYLOAD_TYPE: BitsField = bits("payload_type", 10, 5, 5);
    pub const STEP_SUB_TYPE: BitsField = bits("step_sub_type", 11, 0, 5);
    pub const SM_ACTIVE: BitsField = bits("sm_active", 12, 0, 0);
    pub const SG_ACTIVE: BitsField = bits("sg_active", 12, 1, 1);
    pub const SM_FSW_ACTIVE: BitsField = bits("sm_fsw_active", 12, 3, 3);
    pub const WIRELESS_CHANNEL: ByteField = byte("wireless_channel", 16);

    pub const LAYOUT: BlockLayout = BlockLayout {
        name: "beacon",
        offset: 0,
        fields: &[
            FieldSpec::Bits(NETWORK_STATE),
            FieldSpec::Bits(BEACON_SOURCE),
            FieldSpec::Word(FOOTSWITCH_ID),
            FieldSpec::Bits(SM_OVERLAY),
            FieldSpec::Bits(SG_ENABLE),
            FieldSpec::Bits(STEP_TYPE),
            FieldSpec::Bits(PACKET_SLOT_ID),
            FieldSpec::Bits(PAYLOAD_TYPE),
            FieldSpec::Bits(STEP_SUB_TYPE),
            FieldSpec::Bits(SM_ACTIVE),
            FieldSpec::Bits(SG_ACTIVE),
            FieldSpec::Bits(SM_FSW_ACTIVE),
            FieldSpec::Byte(WIRELESS_CHANNEL),
        ],
    };
}

/// Config block, present when the slot id is [`CONFIG_SLOT_ID`].
pub mod config {
    use super::*;

    pub const RANGE2_VACUUM_LIMIT_END: WordField = word("range2_vacuum_limit_end", 6, false);

    pub const LAYOUT: BlockLayout = BlockLayout {
        name: "config",
        offset: CONFIG_BLOCK_OFFSET,
        fields: &[FieldSpec::Word(RANGE2_VACUUM_LIMIT_END)],
    };
}

/// Status block, present on status beacons.
pub mod status {
    use super::*;

    pub const FOOTSWITCH_TREADLE_RANGE: BitsField = bits("footswitch_treadle_range", 1, 4, 5);
    pub const ULS_LONGITUDINAL_POWER: ByteField = byte("uls_longitudinal_power", 2);
    pub const ULS_TORSIONAL_AMPLITUDE: ByteField = byte("uls_torsional_amplitude", 3);
    pub const IOP: ByteField = byte("iop", 10);
    pub const IRRIGATION_PRESSURE: WordField = word("irrigation_pressure", 12, true);
    pub const REFLUX_ACTIVE: BitsField = bits("reflux_active", 14, 0, 0);
    pub const CONTINUOUS_IRRIGATION: BitsField = bits("continuous_irrigation", 14, 5, 5);
    pub const RANGE_PENETRATION: BitsField = bits("range_penetration", 15, 0, 6);
    pub const ASPIRATION_PRESSURE: WordField = word("aspiration_pressure", 16, true);

    pub const LAYOUT: BlockLayout = BlockLayout {
        name: "status",
        offset: STATUS_BLOCK_OFFSET,
        fields: &[
            FieldSpec::Bits(FOOTSWITCH_TREADLE_RANGE),
            FieldSpec::Byte(ULS_LONGITUDINAL_POWER),
            FieldSpec::Byte(ULS_TORSIONAL_AMPLITUDE),
            FieldSpec::Byte(IOP),
            FieldSpec::Word(IRRIGATION_PRESSURE),
            FieldSpec::Bits(REFLUX_ACTIVE),
            FieldSpec::Bits(CONTINUOUS_IRRIGATION),
            FieldSpec::Bits(RANGE_PENETRATION),
            FieldSpec::Word(ASPIRATION_PRESSURE),
        ],
    };
}

/// Every block layout, in payload order.
pub const BLOCKS: [BlockLayout; 3] = [beacon::LAYOUT, config::LAYOUT, status::LAYOUT];
