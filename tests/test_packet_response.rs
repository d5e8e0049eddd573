mod common;
use common::*;
use omnik_bridge::omnik::packet::{decode_response, MIN_RESPONSE_LEN};
use omnik_bridge::prelude::*;

#[test]
fn decodes_all_fields() {
    let record = MeasurementRecord::parse(&Factory::response(), Factory::observed_at()).unwrap();
    assert_eq!(record, Factory::record());
}

#[test]
fn exactly_75_bytes_is_enough() {
    let response = Factory::response();
    let record = MeasurementRecord::parse(&response[..MIN_RESPONSE_LEN], Factory::observed_at()).unwrap();
    assert_eq!(record, Factory::record());
}

#[test]
fn short_response_fails() {
    let response = Factory::response();

    for len in [0, 1, 30, 74] {
        match decode_response(&response[..len]) {
            Err(DecodeError::TooShort { len: got, required }) => {
                assert_eq!(got, len);
                assert_eq!(required, 75);
            }
            other => panic!("expected TooShort for {} bytes, got {:?}", len, other),
        }
    }
}

#[test]
fn temperature_sentinel_reads_as_zero() {
    let mut response = Factory::response();

    Factory::put_u16(&mut response, 31, 2500);
    let record = decode_response(&response).unwrap();
    assert_eq!(record.temperature_c, 0.0);

    Factory::put_u16(&mut response, 31, 2499);
    let record = decode_response(&response).unwrap();
    assert_eq!(record.temperature_c, 249.9);

    Factory::put_u16(&mut response, 31, 0xffff);
    let record = decode_response(&response).unwrap();
    assert_eq!(record.temperature_c, 0.0);
}

#[test]
fn full_scale_values() {
    let mut response = Factory::response();
    Factory::put_u16(&mut response, 59, 0xffff);
    response[71..75].copy_from_slice(&[0xff; 4]);

    let record = decode_response(&response).unwrap();
    assert_eq!(record.power_w, 65535);
    assert_eq!(record.energy_total_kwh, 429496729.5);
}

#[test]
fn invalid_serial_number_fails() {
    let mut response = Factory::response();
    response[20] = 0xff;

    assert!(matches!(
        decode_response(&response),
        Err(DecodeError::SerialNumber(_))
    ));
}

#[test]
fn stamps_local_time() {
    let before = chrono::Local::now();
    let record = decode_response(&Factory::response()).unwrap();
    let after = chrono::Local::now();

    assert!(record.observed_at >= before && record.observed_at <= after);
    assert_eq!(record.observed_at.offset(), before.offset());
}

#[test]
fn serializes_with_sink_field_names() {
    let json = serde_json::to_value(Factory::record()).unwrap();

    assert_eq!(json["serial_number"], "NLDN302013P00001");
    assert_eq!(json["power"], 1234);
    assert_eq!(json["energy_today"], 5.67);
    assert_eq!(json["energy_total"], 12345.6);
    assert_eq!(json["input_voltage"], 301.2);
    assert_eq!(json["input_current"], 4.2);
    assert_eq!(json["output_voltage"], 230.5);
    assert_eq!(json["output_current"], 5.3);
    assert_eq!(json["output_frequency"], 50.01);
    assert_eq!(json["temperature"], 35.5);
    assert_eq!(json["time"], "2024-06-01T12:00:00+02:00");
}
