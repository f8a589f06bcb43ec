#[cfg(test)]
mod fingerprint_test;

use crc::{Crc, CRC_32_ISO_HDLC};

use crate::attributes::*;
use crate::checks::*;
use crate::error::*;
use crate::message::*;

// FingerprintAttr represents FINGERPRINT attribute.
//
// RFC 5389 Section 15.5
pub struct FingerprintAttr;

// FINGERPRINT is shorthand for FingerprintAttr.
//
// Example:
//
//  let mut m = Message::new();
//  FINGERPRINT.add_to(&mut m)?;
pub const FINGERPRINT: FingerprintAttr = FingerprintAttr {};

pub const FINGERPRINT_XOR_VALUE: u32 = 0x5354554e;
pub const FINGERPRINT_SIZE: usize = 4; // 32 bit

// fingerprint_value returns CRC-32 of b, XORed with 0x5354554e to
// distinguish it from payloads that carry their own CRC-32.
pub fn fingerprint_value(b: &[u8]) -> u32 {
    Crc::<u32>::new(&CRC_32_ISO_HDLC).checksum(b) ^ FINGERPRINT_XOR_VALUE
}

impl Setter for FingerprintAttr {
    // add_to appends FINGERPRINT, checksumming the message with its
    // header length pre-adjusted to cover the fingerprint TLV.
    fn add_to(&self, m: &mut Message) -> Result<()> {
        let length = m.length;
        m.length += (FINGERPRINT_SIZE + ATTRIBUTE_HEADER_SIZE) as u32;
        m.write_length();
        let val = fingerprint_value(&m.raw);
        m.length = length; // restore before the attribute write bumps it
        m.add(ATTR_FINGERPRINT, &val.to_be_bytes());
        Ok(())
    }
}

impl FingerprintAttr {
    // Check reads fingerprint value from m and checks it.
    //
    // FINGERPRINT must be the last attribute of the message; a
    // fingerprint followed by further attributes is rejected.
    pub fn check(&self, m: &Message) -> Result<()> {
        let b = m.get(ATTR_FINGERPRINT)?;
        expect_size(ATTR_FINGERPRINT, b.len(), FINGERPRINT_SIZE)?;

        match m.attributes.0.last() {
            Some(a) if a.typ == ATTR_FINGERPRINT => {}
            _ => return Err(Error::ErrFingerprintNotLast),
        }

        let stored = u32::from_be_bytes([b[0], b[1], b[2], b[3]]);
        let covered = m.raw.len() - (FINGERPRINT_SIZE + ATTRIBUTE_HEADER_SIZE);
        if stored == fingerprint_value(&m.raw[..covered]) {
            Ok(())
        } else {
            Err(Error::ErrFingerprintMismatch)
        }
    }
}
