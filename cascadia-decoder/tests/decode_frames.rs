// End-to-end decoding of inverter broadcast frames
use cascadia_decoder::{
    CandumpParser, DecodedMessage, Decoder, DecoderConfig, MessageKind, RawFrame, SignalValue,
    FAULT_CATALOG,
};
use std::io::Write;

fn decode(id: u32, data: &[u8]) -> cascadia_decoder::DecodedRecord {
    let frame = RawFrame::new(id, data).unwrap();
    Decoder::new().decode(&frame).unwrap()
}

fn value(record: &cascadia_decoder::DecodedRecord, name: &str) -> f64 {
    record
        .signal(name)
        .unwrap_or_else(|| panic!("signal {} missing", name))
        .value
        .as_f64()
}

#[test]
fn temperatures_three_carries_torque_shudder() {
    // 20.0, 65.5, 40.0 C and -2.5 Nm
    let record = decode(0x0A2, &[0xC8, 0x00, 0x8F, 0x02, 0x90, 0x01, 0xE7, 0xFF]);

    assert_eq!(value(&record, "Coolant"), 20.0);
    assert_eq!(value(&record, "Hotspot"), 65.5);
    assert_eq!(value(&record, "Motor"), 40.0);
    assert_eq!(value(&record, "Torque Shudder"), -2.5);
    assert_eq!(
        record.signal("Torque Shudder").unwrap().unit.map(|u| u.symbol()),
        Some("Nm")
    );
}

#[test]
fn motor_position_reuses_temperature_scale_for_angles() {
    // angle 180.0, 3000 rpm, 200.0 Hz, delta -0.5
    let record = decode(0x0A5, &[0x08, 0x07, 0xB8, 0x0B, 0xD0, 0x07, 0xFB, 0xFF]);

    assert_eq!(value(&record, "Angle"), 180.0);
    assert_eq!(record.signal("Speed").unwrap().value, SignalValue::Integer(3000));
    assert_eq!(value(&record, "Freq"), 200.0);
    assert_eq!(value(&record, "Delta Resolver"), -0.5);
}

#[test]
fn currents_and_voltages() {
    let currents = decode(0x0A6, &[0x64, 0x00, 0x9C, 0xFF, 0x00, 0x00, 0xE8, 0x03]);
    assert_eq!(value(&currents, "Phase A"), 10.0);
    assert_eq!(value(&currents, "Phase B"), -10.0);
    assert_eq!(value(&currents, "Phase C"), 0.0);
    assert_eq!(value(&currents, "DC Bus"), 100.0);

    let voltages = decode(0x0A7, &[0xF4, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]);
    assert_eq!(value(&voltages, "DC Bus"), 50.0);
    assert_eq!(value(&voltages, "VBC/Vq"), 0.0);
}

#[test]
fn internal_states_labels_and_raw_bytes() {
    let record = decode(0x0AA, &[0x06, 0x0C, 0x03, 0x1F, 0, 0, 0, 0]);

    let vsm = record.signal("VSM State").unwrap();
    assert_eq!(vsm.value_description, Some("Motor Running State"));
    assert_eq!(record.signal("PWM Freq").unwrap().value, SignalValue::Integer(12));
    assert_eq!(
        record.signal("Inverter State").unwrap().value_description,
        Some("Closed Loop State")
    );
    assert_eq!(record.signal("Relay State").unwrap().value, SignalValue::Flags(0x1F));

    let unknown = decode(0x0AA, &[10, 0, 5, 0, 0, 0, 0, 0]);
    assert_eq!(unknown.signal("VSM State").unwrap().value_description, Some("Unknown state"));
    assert_eq!(
        unknown.signal("Inverter State").unwrap().value_description,
        Some("Unknown state")
    );
}

#[test]
fn torque_and_timer() {
    // cmd 15.0 Nm, feedback 14.8 Nm, 1000 ticks
    let record = decode(0x0AC, &[0x96, 0x00, 0x94, 0x00, 0xE8, 0x03, 0x00, 0x00]);

    assert_eq!(value(&record, "Cmd Torque"), 15.0);
    assert_eq!(value(&record, "Feedback Torque"), 14.8);
    assert!((value(&record, "Power Timer") - 3.0).abs() < 1e-9);
    assert_eq!(record.signal("Power Timer").unwrap().raw_value, 1000);
}

#[test]
fn power_timer_uses_full_unsigned_range() {
    let record = decode(0x0AC, &[0, 0, 0, 0, 0xFF, 0xFF, 0xFF, 0xFF]);
    let timer = record.signal("Power Timer").unwrap();
    assert_eq!(timer.raw_value, u32::MAX as i64);
    assert!((timer.value.as_f64() - u32::MAX as f64 * 0.003).abs() < 1e-3);
}

#[test]
fn fault_frame_with_clear_payload() {
    let record = decode(0x0AB, &[0; 8]);
    let report = record.fault_report().unwrap();
    assert!(report.post_faults.is_empty());
    assert!(report.run_faults.is_empty());
}

#[test]
fn fault_frame_separates_post_and_run() {
    // POST lo bit 1, Run hi bit 0
    let record = decode(0x0AB, &[0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00]);
    let report = record.fault_report().unwrap();

    assert_eq!(report.words.post_lo, 0x0002);
    assert_eq!(report.words.run_hi, 0x0001);
    assert_eq!(report.post_faults, vec!["HW Over-current Fault"]);
    assert_eq!(report.run_faults, vec![FAULT_CATALOG[16]]);
}

#[test]
fn unassigned_type_is_reported_not_rejected() {
    let record = decode(0x0C0, &[0; 8]);
    assert_eq!(record.message, DecodedMessage::Unhandled { msg_type: 0x20 });
}

#[test]
fn short_frame_is_flagged() {
    let record = decode(0x0A0, &[0xFA, 0x00]);
    let warning = record.length_warning.unwrap();
    assert_eq!((warning.required, warning.available), (8, 2));
    assert_eq!(value(&record, "Module A"), 25.0);
    assert_eq!(value(&record, "Gate Driver"), 0.0);
}

#[test]
fn internal_voltages_when_extended() {
    let decoder = Decoder::with_config(DecoderConfig::new().with_extended_messages(true));
    // 1.50, 2.50, 5.00, 12.00 V
    let frame = RawFrame::new(0x0A9, &[0x96, 0x00, 0xFA, 0x00, 0xF4, 0x01, 0xB0, 0x04]).unwrap();
    let record = decoder.decode(&frame).unwrap();

    match &record.message {
        DecodedMessage::Signals { kind, .. } => assert_eq!(*kind, MessageKind::InternalVoltages),
        other => panic!("unexpected message {:?}", other),
    }
    assert_eq!(value(&record, "1.5V Reference"), 1.5);
    assert_eq!(value(&record, "12V System"), 12.0);
}

#[test]
fn records_serialize_to_json() {
    let record = decode(0x0AB, &[0x01, 0x00, 0, 0, 0, 0, 0, 0]);
    let json = serde_json::to_value(&record).unwrap();

    assert_eq!(json["can_id"], 0x0AB);
    assert_eq!(json["message"]["type"], "fault");
    assert_eq!(json["message"]["post_faults"][0], "Hardware Gate/Desaturation Fault");
    assert!(json.get("length_warning").is_none());
}

#[test]
fn candump_file_round_trip_through_decoder() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "(1700000000.000000) can0 0A7#F401000000000000").unwrap();
    writeln!(file, "(1700000000.001000) can0 123#DEADBEEF").unwrap();
    writeln!(file, "(1700000000.002000) can0 0AB#0000000000000100").unwrap();
    writeln!(file, "(1700000000.003000) can0 0C0#00").unwrap();
    file.flush().unwrap();

    let decoder = Decoder::new();
    let frames = CandumpParser::parse(file.path()).unwrap().raw_frames();
    let records: Vec<_> = decoder
        .decode_frames(frames)
        .collect::<cascadia_decoder::Result<Vec<_>>>()
        .unwrap();

    assert_eq!(records.len(), 3);
    assert_eq!(value(&records[0], "DC Bus"), 50.0);
    assert_eq!(records[1].fault_report().unwrap().run_faults, vec![FAULT_CATALOG[16]]);
    assert!(records[2].is_unhandled());
}

#[test]
fn decoder_is_shareable_across_threads() {
    let decoder = std::sync::Arc::new(Decoder::new());
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let decoder = decoder.clone();
            std::thread::spawn(move || {
                let raw = (i as i16 * 100).to_le_bytes();
                let frame = RawFrame::new(0x0A7, &[raw[0], raw[1], 0, 0, 0, 0, 0, 0]).unwrap();
                decoder.decode(&frame).unwrap()
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let record = handle.join().unwrap();
        assert_eq!(value(&record, "DC Bus"), i as f64 * 10.0);
    }
}
