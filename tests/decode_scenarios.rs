//! End-to-end decode scenarios through the public API

use phacolink::types::layout::{HEADER_SIZE, MIN_BEACON_FRAME_SIZE};
use phacolink::{
    BeaconDecoder, BeaconFrameBuilder, BeaconSource, BufferTransport, DecodeError, FrameClass,
    LinkMetadata, MessageCounter, NetworkState, RawFrame, Sniffer, StepSubType, StepType,
};

fn init_logging() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// Hand-assembled frame, independent of the builder
fn scenario_frame() -> RawFrame {
    let mut bytes = vec![0xA5; HEADER_SIZE];
    let mut payload = [0u8; 64];
    payload[0] = 0b0000_0010;
    payload[4] = 0x00;
    payload[5] = 0x07;
    payload[9] = 3;
    payload[10] = 0x00;
    bytes.extend_from_slice(&payload);
    bytes.extend_from_slice(&[0xDE, 0xAD]);
    assert_eq!(bytes.len(), MIN_BEACON_FRAME_SIZE);
    RawFrame::new(bytes, LinkMetadata::new(180, -52, 1_000_000))
}

#[test]
fn setup_beacon_scenario() -> anyhow::Result<()> {
    init_logging();
    let mut sniffer = Sniffer::new(BufferTransport::new());

    let outcome = sniffer.feed(&scenario_frame())?;
    let text = outcome.report.as_str();

    assert!(text.starts_with("<BEACON PACKET> TS: 1000000us|PS: 64|LQI: 180|RSSI: -52dBm\n"));
    assert!(text.contains("NS: Network Footswitch Active\n"));
    assert!(text.contains("FSID: 7\n"));
    assert!(text.contains("ST: I/A\n"));
    assert!(text.contains("PT: Setup\n"));
    assert!(!text.contains("VacLE"));
    assert!(!text.contains("FSTrdl"));
    assert!(!text.contains("MC:"));
    assert_eq!(sniffer.transport().text(), text);
    Ok(())
}

#[test]
fn classification_boundaries() {
    init_logging();
    let mut decoder = BeaconDecoder::new();

    for len in [0usize, 1, 15] {
        let frame = RawFrame::new(vec![0; len], LinkMetadata::default());
        assert!(matches!(
            decoder.decode(&frame),
            Err(DecodeError::ShortFrame { required: 16, .. })
        ));
    }

    for len in [16usize, 40, 79] {
        let frame = RawFrame::new(vec![0xFF; len], LinkMetadata::default());
        let decoded = decoder.decode(&frame).unwrap();
        assert_eq!(decoded.class, FrameClass::Malformed);
        assert_eq!(decoded.payload_size, len - 16);
        assert!(decoded.beacon.is_none());
    }

    let decoded = decoder.decode(&BeaconFrameBuilder::new().build()).unwrap();
    assert_eq!(decoded.class, FrameClass::Beacon);
}

#[test]
fn malformed_frame_report_is_tag_and_metadata() {
    let mut sniffer = Sniffer::new(BufferTransport::new());
    let frame = BeaconFrameBuilder::new()
        .payload_len(63)
        .link(LinkMetadata::new(10, -90, 42))
        .build();
    assert_eq!(frame.len(), 79);

    let outcome = sniffer.feed(&frame).unwrap();
    assert_eq!(
        outcome.report.as_str(),
        "<MALFORMED PACKET> TS: 42us|PS: 63|LQI: 10|RSSI: -90dBm\n"
    );
}

#[test]
fn config_block_follows_slot_id() {
    let mut sniffer = Sniffer::new(BufferTransport::new());

    for slot in [0u8, 7, 9, 31] {
        let frame = BeaconFrameBuilder::new().slot_id(slot).vacuum_limit(450).build();
        let outcome = sniffer.feed(&frame).unwrap();
        assert!(!outcome.report.as_str().contains("VacLE"), "slot {}", slot);
    }

    let frame = BeaconFrameBuilder::new().slot_id(8).vacuum_limit(450).build();
    let outcome = sniffer.feed(&frame).unwrap();
    assert!(outcome.report.as_str().contains("VacLE: 450mmHg\n"));
}

#[test]
fn status_beacon_renders_live_measurements() {
    let mut sniffer = Sniffer::new(BufferTransport::new());
    let frame = BeaconFrameBuilder::new()
        .status(true)
        .treadle_range(2)
        .iop(35)
        .irrigation_pressure(70)
        .reflux(true)
        .range_penetration(55)
        .aspiration_pressure(-250)
        .longitudinal_power(60)
        .torsional_amplitude(15)
        .build();

    let outcome = sniffer.feed(&frame).unwrap();
    assert!(outcome.report.as_str().ends_with(
        "PT: Status\n\
         FSTrdl: 2|IOPr: 35mmHg|IrrPr: 70mmHg|Reflux: Active|CIrr: Not Active|FSPen: 55|AsPr: -250mmHg|LonPwr: 60%|TorAmp: 15%\n\
         MC: 0\n"
    ));
}

#[test]
fn message_counter_wraps_and_skips_setup_frames() {
    let mut decoder = BeaconDecoder::with_counter(MessageCounter::starting_at(14));
    let status = BeaconFrameBuilder::new().status(true).build();
    let setup = BeaconFrameBuilder::new().build();

    let mut seen = Vec::new();
    for frame in [&status, &setup, &status, &setup, &status] {
        if let Some(block) = decoder.decode(frame).unwrap().status {
            seen.push(block.message_counter);
        }
    }
    assert_eq!(seen, vec![14, 15, 0]);
    assert_eq!(decoder.counter().peek(), 1);
}

#[test]
fn rejected_status_frames_leave_a_counter_gap() {
    let mut sniffer = Sniffer::new(BufferTransport::new());
    let good = BeaconFrameBuilder::new().status(true).build();
    let bad = BeaconFrameBuilder::new().status(true).step_type(14).build();

    assert!(sniffer.feed(&good).unwrap().report.as_str().ends_with("MC: 0\n"));
    assert!(matches!(sniffer.feed(&bad), Err(DecodeError::UnknownEnumValue { .. })));
    assert!(sniffer.feed(&good).unwrap().report.as_str().ends_with("MC: 2\n"));
}

#[test]
fn every_registered_label_renders() {
    let mut sniffer = Sniffer::new(BufferTransport::new());

    for state in NetworkState::ALL {
        let frame = BeaconFrameBuilder::new().network_state(state.code()).build();
        let text = sniffer.feed(&frame).unwrap().report.as_str().to_owned();
        assert!(text.contains(&format!("NS: {}\n", state.label())));
    }

    for step in StepType::ALL {
        let frame = BeaconFrameBuilder::new().step_type(step.code()).build();
        let text = sniffer.feed(&frame).unwrap().report.as_str().to_owned();
        assert!(text.contains(&format!("ST: {}\n", step.label())));
    }

    for source in BeaconSource::ALL {
        let frame = BeaconFrameBuilder::new().beacon_source(source.code()).build();
        let decoded = sniffer.feed(&frame).unwrap().decoded;
        assert_eq!(decoded.beacon.map(|b| b.beacon_source), Some(*source));
    }

    for sub in StepSubType::ALL {
        let frame = BeaconFrameBuilder::new().step_sub_type(sub.code()).build();
        let decoded = sniffer.feed(&frame).unwrap().decoded;
        assert_eq!(decoded.beacon.map(|b| b.step_sub_type), Some(*sub));
    }
}

#[test]
fn undefined_codes_are_rejected_without_output() {
    let mut sniffer = Sniffer::new(BufferTransport::new());

    let cases = [
        (BeaconFrameBuilder::new().step_type(14), "step_type", 14),
        (BeaconFrameBuilder::new().network_state(4), "network_state", 4),
        (BeaconFrameBuilder::new().beacon_source(2), "beacon_source", 2),
        (BeaconFrameBuilder::new().step_sub_type(26), "step_sub_type", 26),
    ];
    for (builder, expected_field, expected_value) in cases {
        match sniffer.feed(&builder.build()) {
            Err(DecodeError::UnknownEnumValue { field, value }) => {
                assert_eq!(field, expected_field);
                assert_eq!(value, expected_value);
            }
            other => panic!("expected UnknownEnumValue, got {:?}", other),
        }
    }
    assert_eq!(sniffer.transport().writes(), 0);

    // Decoder is still usable afterwards
    assert!(sniffer.feed(&BeaconFrameBuilder::new().build()).is_ok());
}

#[test]
fn oversized_frames_decode_from_the_window() {
    let mut decoder = BeaconDecoder::new();
    let frame = BeaconFrameBuilder::new().payload_len(100).footswitch_id(0xBEEF).build();
    let decoded = decoder.decode(&frame).unwrap();
    assert_eq!(decoded.payload_size, 100);
    assert_eq!(decoded.beacon.map(|b| b.footswitch_id), Some(0xBEEF));
}
