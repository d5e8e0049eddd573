use crate::prelude::*;

use chrono::{DateTime, FixedOffset, Local};
use nom_derive::{Nom, Parse};
use serde::Serialize;

const QUERY_HEADER: [u8; 4] = [0x68, 0x02, 0x40, 0x30];
const QUERY_TRAILER: [u8; 2] = [0x01, 0x00];
const QUERY_END: u8 = 0x16;
const CHECKSUM_SEED: u32 = 115;

/// Shortest response that covers every field we read.
pub const MIN_RESPONSE_LEN: usize = 75;

/// Build the query frame for the datalogger with the given serial number.
///
/// The serial's hex digits are written out twice, paired up into bytes and
/// reversed. With an odd digit count the middle byte takes its high nibble
/// from the first copy and its low nibble from the second; loggers expect
/// exactly that.
pub fn encode_query(serial_number: u64) -> Vec<u8> {
    let id = id_bytes(serial_number);

    let mut r = Vec::with_capacity(QUERY_HEADER.len() + id.len() + 4);
    r.extend_from_slice(&QUERY_HEADER);
    r.extend_from_slice(&id);
    r.extend_from_slice(&QUERY_TRAILER);
    r.push(checksum(&id));
    r.push(QUERY_END);

    r
}

/// The serial number part of a query frame, in wire order.
pub fn id_bytes(serial_number: u64) -> Vec<u8> {
    let nibbles = Utils::hex_nibbles(serial_number);
    let doubled: Vec<u8> = nibbles.iter().chain(nibbles.iter()).copied().collect();

    doubled
        .chunks_exact(2)
        .rev()
        .map(|pair| (pair[0] << 4) | pair[1])
        .collect()
}

pub fn checksum(id_bytes: &[u8]) -> u8 {
    let sum = id_bytes
        .iter()
        .fold(CHECKSUM_SEED, |acc, b| acc + u32::from(*b));
    (sum % 256) as u8
}

// ResponseFrame {{{
/// Raw field layout of a datalogger response, big endian, starting at byte 0.
#[derive(PartialEq, Clone, Debug, Nom)]
#[nom(BigEndian)]
pub struct ResponseFrame {
    #[nom(SkipBefore(15))]
    #[nom(Count = "16")]
    pub serial_number: Vec<u8>,

    #[nom(Parse = "Utils::be_u16_temperature")]
    pub temperature: f64,
    #[nom(Parse = "Utils::be_u16_div10")]
    pub input_voltage: f64,

    #[nom(SkipBefore(4))]
    #[nom(Parse = "Utils::be_u16_div10")]
    pub input_current: f64,

    #[nom(SkipBefore(4))]
    #[nom(Parse = "Utils::be_u16_div10")]
    pub output_current: f64,

    #[nom(SkipBefore(4))]
    #[nom(Parse = "Utils::be_u16_div10")]
    pub output_voltage: f64,

    #[nom(SkipBefore(4))]
    #[nom(Parse = "Utils::be_u16_div100")]
    pub output_frequency: f64,
    pub power: u16,

    #[nom(SkipBefore(8))]
    #[nom(Parse = "Utils::be_u16_div100")]
    pub energy_today: f64,
    #[nom(Parse = "Utils::be_u32_div10")]
    pub energy_total: f64,
} // }}}

// MeasurementRecord {{{
/// One decoded reading. Serializes with the field names the sinks use.
#[derive(PartialEq, Clone, Debug, Serialize)]
pub struct MeasurementRecord {
    pub serial_number: String,
    #[serde(rename = "power")]
    pub power_w: u16,
    #[serde(rename = "energy_today")]
    pub energy_today_kwh: f64,
    #[serde(rename = "energy_total")]
    pub energy_total_kwh: f64,
    #[serde(rename = "input_voltage")]
    pub input_voltage_v: f64,
    #[serde(rename = "input_current")]
    pub input_current_a: f64,
    #[serde(rename = "output_voltage")]
    pub output_voltage_v: f64,
    #[serde(rename = "output_current")]
    pub output_current_a: f64,
    #[serde(rename = "output_frequency")]
    pub output_frequency_hz: f64,
    #[serde(rename = "temperature")]
    pub temperature_c: f64,
    #[serde(rename = "time")]
    pub observed_at: DateTime<FixedOffset>,
}

impl MeasurementRecord {
    pub fn parse(
        input: &[u8],
        observed_at: DateTime<FixedOffset>,
    ) -> std::result::Result<Self, DecodeError> {
        if input.len() < MIN_RESPONSE_LEN {
            return Err(DecodeError::TooShort {
                len: input.len(),
                required: MIN_RESPONSE_LEN,
            });
        }

        let (_, frame) =
            ResponseFrame::parse(input).map_err(|err| DecodeError::Field(err.to_string()))?;

        Ok(Self {
            serial_number: std::str::from_utf8(&frame.serial_number)?.to_string(),
            power_w: frame.power,
            energy_today_kwh: frame.energy_today,
            energy_total_kwh: frame.energy_total,
            input_voltage_v: frame.input_voltage,
            input_current_a: frame.input_current,
            output_voltage_v: frame.output_voltage,
            output_current_a: frame.output_current,
            output_frequency_hz: frame.output_frequency,
            temperature_c: frame.temperature,
            observed_at,
        })
    }
} // }}}

/// Decode a response buffer, stamping it with the current local time.
pub fn decode_response(input: &[u8]) -> std::result::Result<MeasurementRecord, DecodeError> {
    MeasurementRecord::parse(input, Local::now().into())
}
