//! Decoded beacon, config and status field sets

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::labels::{BeaconSource, NetworkState, PayloadType, StepSubType, StepType};
use super::layout::{beacon, config, status};
use super::reader::PayloadReader;
use crate::Result;

/// Fields present in every full beacon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct BeaconFields {
    pub network_state: NetworkState,
    pub beacon_source: BeaconSource,
    pub footswitch_id: u16,
    pub sm_overlay: bool,
    pub sg_enable: bool,
    pub step_type: StepType,
    pub packet_slot_id: u8,
    pub payload_type: PayloadType,
    pub step_sub_type: StepSubType,
    pub sm_active: bool,
    pub sg_active: bool,
    pub sm_fsw_active: bool,
    pub wireless_channel: u8,
}

impl BeaconFields {
    /// Decode the beacon block. `reader` must be positioned at payload offset 0.
    pub fn extract(reader: &PayloadReader<'_>) -> Result<Self> {
        let fields = Self {
            network_state: NetworkState::try_from(reader.bits(beacon::NETWORK_STATE)?)?,
            beacon_source: BeaconSource::try_from(reader.bits(beacon::BEACON_SOURCE)?)?,
            footswitch_id: reader.u16_be(beacon::FOOTSWITCH_ID)?,
            sm_overlay: reader.flag(beacon::SM_OVERLAY)?,
            sg_enable: reader.flag(beacon::SG_ENABLE)?,
            step_type: StepType::try_from(reader.bits(beacon::STEP_TYPE)?)?,
            packet_slot_id: reader.bits(beacon::PACKET_SLOT_ID)?,
            payload_type: PayloadType::from_flag(reader.flag(beacon::PAYLOAD_TYPE)?),
            step_sub_type: StepSubType::try_from(reader.bits(beacon::STEP_SUB_TYPE)?)?,
            sm_active: reader.flag(beacon::SM_ACTIVE)?,
            sg_active: reader.flag(beacon::SG_ACTIVE)?,
            sm_fsw_active: reader.flag(beacon::SM_FSW_ACTIVE)?,
            wireless_channel: reader.byte(beacon::WIRELESS_CHANNEL)?,
        };

        trace!(
            "Beacon: ns={:?} src={:?} fsid={} step={:?}/{:?} slot={} type={:?}",
            fields.network_state,
            fields.beacon_source,
            fields.footswitch_id,
            fields.step_type,
            fields.step_sub_type,
            fields.packet_slot_id,
            fields.payload_type
        );

        Ok(fields)
    }
}

/// Console configuration carried in slot 8 beacons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct ConfigFields {
    /// Range 2 vacuum limit end point in mmHg
    pub range2_vacuum_limit_end: u16,
}

impl ConfigFields {
    /// Decode the config block. `reader` must be positioned at the config offset.
    pub fn extract(reader: &PayloadReader<'_>) -> Result<Self> {
        let fields =
            Self { range2_vacuum_limit_end: reader.u16_be(config::RANGE2_VACUUM_LIMIT_END)? };
        trace!("Config: vacuum limit end={}mmHg", fields.range2_vacuum_limit_end);
        Ok(fields)
    }
}

/// Live measurements carried in status beacons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct StatusFields {
    pub footswitch_treadle_range: u8,
    /// Intraocular pressure in mmHg
    pub iop: u8,
    /// Irrigation pressure in mmHg
    pub irrigation_pressure: i16,
    pub reflux_active: bool,
    pub continuous_irrigation: bool,
    pub range_penetration: u8,
    /// Aspiration pressure in mmHg
    pub aspiration_pressure: i16,
    /// Ultrasound longitudinal power in percent
    pub uls_longitudinal_power: u8,
    /// Ultrasound torsional amplitude in percent
    pub uls_torsional_amplitude: u8,
    /// Decoder-assigned sequence number, modulo 16
    pub message_counter: u8,
}

impl StatusFields {
    /// Decode the status block. `reader` must be positioned at the status offset.
    ///
    /// `message_counter` is assigned by the caller; the sender does not transmit it.
    pub fn extract(reader: &PayloadReader<'_>, message_counter: u8) -> Result<Self> {
        let fields = Self {
            footswitch_treadle_range: reader.bits(status::FOOTSWITCH_TREADLE_RANGE)?,
            iop: reader.byte(status::IOP)?,
            irrigation_pressure: reader.i16_be(status::IRRIGATION_PRESSURE)?,
            reflux_active: reader.flag(status::REFLUX_ACTIVE)?,
            continuous_irrigation: reader.flag(status::CONTINUOUS_IRRIGATION)?,
            range_penetration: reader.bits(status::RANGE_PENETRATION)?,
            aspiration_pressure: reader.i16_be(status::ASPIRATION_PRESSURE)?,
            uls_longitudinal_power: reader.byte(status::ULS_LONGITUDINAL_POWER)?,
            uls_torsional_amplitude: reader.byte(status::ULS_TORSIONAL_AMPLITUDE)?,
            message_counter,
        };

        trace!(
            "Status #{}: iop={} irr={} asp={} lon={}% tor={}%",
            fields.message_counter,
            fields.iop,
            fields.irrigation_pressure,
            fields.aspiration_pressure,
            fields.uls_longitudinal_power,
            fields.uls_torsional_amplitude
        );

        Ok(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DecodeError;
    use crate::types::layout::{BEACON_WINDOW_SIZE, CONFIG_BLOCK_OFFSET, STATUS_BLOCK_OFFSET};

    fn window() -> [u8; BEACON_WINDOW_SIZE] {
        [0u8; BEACON_WINDOW_SIZE]
    }

    #[test]
    fn beacon_fields_from_packed_bytes() {
        let mut payload = window();
        payload[0] = 0b0000_1010; // network_state=2, beacon_source=1
        payload[4] = 0x01;
        payload[5] = 0x02;
        payload[6] = 0x80;
        payload[7] = 0x7F;
        payload[9] = 0b1110_0100; // step_type=4, upper bits ignored
        payload[10] = 0b0010_1000; // slot=8, status
        payload[11] = 0b1100_0010; // sub_type=2
        payload[12] = 0b0000_1001;
        payload[16] = 25;

        let reader = PayloadReader::beacon_window(&payload).unwrap();
        let beacon = BeaconFields::extract(&reader).unwrap();

        assert_eq!(beacon.network_state, NetworkState::FootswitchActive);
        assert_eq!(beacon.beacon_source, BeaconSource::Microscope);
        assert_eq!(beacon.footswitch_id, 0x0102);
        assert!(beacon.sm_overlay);
        assert!(!beacon.sg_enable);
        assert_eq!(beacon.step_type, StepType::Phaco);
        assert_eq!(beacon.packet_slot_id, 8);
        assert_eq!(beacon.payload_type, PayloadType::Status);
        assert_eq!(beacon.step_sub_type, StepSubType::Sculpt);
        assert!(beacon.sm_active);
        assert!(!beacon.sg_active);
        assert!(beacon.sm_fsw_active);
        assert_eq!(beacon.wireless_channel, 25);
    }

    #[test]
    fn unknown_codes_fail_extraction() {
        let mut payload = window();
        payload[9] = 14;
        let reader = PayloadReader::beacon_window(&payload).unwrap();
        assert!(matches!(
            BeaconFields::extract(&reader),
            Err(DecodeError::UnknownEnumValue { field: "step_type", value: 14 })
        ));

        let mut payload = window();
        payload[0] = 0b0001_0000; // beacon_source=2
        let reader = PayloadReader::beacon_window(&payload).unwrap();
        assert!(matches!(
            BeaconFields::extract(&reader),
            Err(DecodeError::UnknownEnumValue { field: "beacon_source", value: 2 })
        ));
    }

    #[test]
    fn config_vacuum_limit_is_big_endian() {
        let mut payload = window();
        payload[CONFIG_BLOCK_OFFSET + 6] = 0x01;
        payload[CONFIG_BLOCK_OFFSET + 7] = 0xF4;
        let reader = PayloadReader::beacon_window(&payload).unwrap();
        let config = ConfigFields::extract(&reader.block(CONFIG_BLOCK_OFFSET)).unwrap();
        assert_eq!(config.range2_vacuum_limit_end, 500);
    }

    #[test]
    fn status_fields_from_packed_bytes() {
        let mut payload = window();
        let s = STATUS_BLOCK_OFFSET;
        payload[s + 1] = 0b0011_0000; // treadle range 3
        payload[s + 2] = 80;
        payload[s + 3] = 45;
        payload[s + 10] = 30;
        payload[s + 12..s + 14].copy_from_slice(&(-12i16).to_be_bytes());
        payload[s + 14] = 0b0010_0001;
        payload[s + 15] = 0xFF; // penetration keeps 7 bits
        payload[s + 16..s + 18].copy_from_slice(&(-350i16).to_be_bytes());

        let reader = PayloadReader::beacon_window(&payload).unwrap();
        let status = StatusFields::extract(&reader.block(s), 9).unwrap();

        assert_eq!(status.footswitch_treadle_range, 3);
        assert_eq!(status.uls_longitudinal_power, 80);
        assert_eq!(status.uls_torsional_amplitude, 45);
        assert_eq!(status.iop, 30);
        assert_eq!(status.irrigation_pressure, -12);
        assert!(status.reflux_active);
        assert!(status.continuous_irrigation);
        assert_eq!(status.range_penetration, 127);
        assert_eq!(status.aspiration_pressure, -350);
        assert_eq!(status.message_counter, 9);
    }

    #[test]
    fn status_block_on_truncated_payload_is_out_of_bounds() {
        let payload = [0u8; STATUS_BLOCK_OFFSET + 10];
        let reader = PayloadReader::new(&payload).block(STATUS_BLOCK_OFFSET);
        assert!(matches!(
            StatusFields::extract(&reader, 0),
            Err(DecodeError::OutOfBounds { .. })
        ));
    }
}
