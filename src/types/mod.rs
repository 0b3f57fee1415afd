//! Core types for beacon frame decoding.
//!
//! ## Architecture
//!
//! - [`RawFrame`] carries the received bytes plus [`LinkMetadata`]
//! - [`layout`] describes every field as an offset/width entry in a static table
//! - [`PayloadReader`] is the single bounds-checked read primitive
//! - [`BeaconFields`], [`ConfigFields`] and [`StatusFields`] are the decoded blocks
//! - Label enums ([`NetworkState`], [`StepType`], ...) resolve wire codes totally
//!
//! ## Usage Example
//!
//! ```rust
//! use phacolink::types::{BeaconFields, NetworkState, PayloadReader};
//!
//! let mut payload = [0u8; 64];
//! payload[0] = 0b0000_0011; // network pairing
//! payload[5] = 7;           // footswitch id
//!
//! let reader = PayloadReader::beacon_window(&payload).unwrap();
//! let beacon = BeaconFields::extract(&reader).unwrap();
//! assert_eq!(beacon.network_state, NetworkState::Pairing);
//! assert_eq!(beacon.footswitch_id, 7);
//! ```

mod bitfield;
mod fields;
mod frame;
mod labels;
pub mod layout;
mod reader;

pub use bitfield::{bit_is_set, extract_bits};
pub use fields::{BeaconFields, ConfigFields, StatusFields};
pub use frame::{LinkMetadata, RawFrame};
pub use labels::{BeaconSource, NetworkState, PayloadType, StepSubType, StepType};
pub use layout::{BitsField, BlockLayout, ByteField, FieldSpec, WordField};
pub use reader::PayloadReader;
