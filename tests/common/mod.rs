#![allow(dead_code)]

use chrono::{DateTime, FixedOffset};
use omnik_bridge::prelude::*;

pub fn common_setup() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub struct Factory();
impl Factory {
    pub fn serial_number() -> &'static str {
        "NLDN302013P00001"
    }

    pub fn observed_at() -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339("2024-06-01T12:00:00+02:00").unwrap()
    }

    /// A 99 byte response as the logger sends it, with known readings.
    pub fn response() -> Vec<u8> {
        let mut r = vec![0; 99];
        r[0..4].copy_from_slice(&[0x68, 0x59, 0x41, 0xb0]);
        r[15..31].copy_from_slice(Self::serial_number().as_bytes());
        Self::put_u16(&mut r, 31, 355); // temperature
        Self::put_u16(&mut r, 33, 3012); // input voltage
        Self::put_u16(&mut r, 39, 42); // input current
        Self::put_u16(&mut r, 45, 53); // output current
        Self::put_u16(&mut r, 51, 2305); // output voltage
        Self::put_u16(&mut r, 57, 5001); // output frequency
        Self::put_u16(&mut r, 59, 1234); // power
        Self::put_u16(&mut r, 69, 567); // energy today
        r[71..75].copy_from_slice(&123456u32.to_be_bytes()); // energy total
        r[98] = 0x16;
        r
    }

    pub fn record() -> MeasurementRecord {
        MeasurementRecord {
            serial_number: Self::serial_number().to_string(),
            power_w: 1234,
            energy_today_kwh: 5.67,
            energy_total_kwh: 12345.6,
            input_voltage_v: 301.2,
            input_current_a: 4.2,
            output_voltage_v: 230.5,
            output_current_a: 5.3,
            output_frequency_hz: 50.01,
            temperature_c: 35.5,
            observed_at: Self::observed_at(),
        }
    }

    pub fn put_u16(buf: &mut [u8], offset: usize, value: u16) {
        buf[offset..offset + 2].copy_from_slice(&value.to_be_bytes());
    }
}
