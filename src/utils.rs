use nom::number::complete::{be_u16, be_u32};
use nom::IResult;

pub struct Utils;

impl Utils {
    pub fn be_u16_div10(input: &[u8]) -> IResult<&[u8], f64> {
        let (input, num) = be_u16(input)?;
        Ok((input, num as f64 / 10.0))
    }

    pub fn be_u16_div100(input: &[u8]) -> IResult<&[u8], f64> {
        let (input, num) = be_u16(input)?;
        Ok((input, num as f64 / 100.0))
    }

    pub fn be_u32_div10(input: &[u8]) -> IResult<&[u8], f64> {
        let (input, num) = be_u32(input)?;
        Ok((input, num as f64 / 10.0))
    }

    // readings at or above 250.0 mean the sensor has nothing to report
    pub fn be_u16_temperature(input: &[u8]) -> IResult<&[u8], f64> {
        let (input, temp) = Self::be_u16_div10(input)?;
        Ok((input, if temp < 250.0 { temp } else { 0.0 }))
    }

    /// Lowercase hex digits of `num`, most significant first, no leading zeros.
    pub fn hex_nibbles(mut num: u64) -> Vec<u8> {
        let mut nibbles = Vec::with_capacity(16);
        loop {
            nibbles.push((num & 0x0f) as u8);
            num >>= 4;
            if num == 0 {
                break;
            }
        }
        nibbles.reverse();
        nibbles
    }
}
