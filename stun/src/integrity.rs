
use std::fmt;

use md5::{Digest, Md5};
use ring::hmac;
use subtle::ConstantTimeEq;

use crate::attributes::*;
use crate::error::*;
use crate::message::*;

// separator for credentials.
pub(crate) const CREDENTIALS_SEP: &str = ":";

// MESSAGE_INTEGRITY_SIZE is the MAC output length. The canonical MAC
// here is HMAC-SHA-256; peers that insist on the RFC 5389 HMAC-SHA-1
// need this constant and new_hmac swapped out together.
pub const MESSAGE_INTEGRITY_SIZE: usize = 32;

fn new_hmac(key: &[u8], message: &[u8]) -> Vec<u8> {
    let mac = hmac::Key::new(hmac::HMAC_SHA256, key);
    hmac::sign(&mac, message).as_ref().to_vec()
}

// MessageIntegrity represents MESSAGE-INTEGRITY attribute.
//
// The wrapped value is the HMAC key: either the raw secret, or for
// long-term credentials MD5(username ":" realm ":" secret).
//
// RFC 5389 Section 15.4
#[derive(Default, Clone, Debug, PartialEq, Eq)]
pub struct MessageIntegrity(pub Vec<u8>);

impl fmt::Display for MessageIntegrity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KEY: 0x{:x?}", self.0)
    }
}

impl Setter for MessageIntegrity {
    // add_to appends a MESSAGE-INTEGRITY attribute to message.
    //
    // The HMAC input is the message with its header length temporarily
    // rewritten to cover the integrity TLV, up to and including the
    // attribute preceding MESSAGE-INTEGRITY. FINGERPRINT must not be
    // in the message yet; it goes after the integrity attribute.
    fn add_to(&self, m: &mut Message) -> Result<()> {
        if m.contains(ATTR_FINGERPRINT) {
            return Err(Error::ErrFingerprintBeforeIntegrity);
        }

        let length = m.length;
        m.length += (MESSAGE_INTEGRITY_SIZE + ATTRIBUTE_HEADER_SIZE) as u32;
        m.write_length();
        let v = new_hmac(&self.0, &m.raw);
        m.length = length; // restore before the attribute write bumps it

        m.add(ATTR_MESSAGE_INTEGRITY, &v);

        Ok(())
    }
}

impl MessageIntegrity {
    // new_long_term_integrity returns new MessageIntegrity with key for long-term
    // credentials. Secret, username, and realm must be SASL-prepared.
    pub fn new_long_term_integrity(username: String, realm: String, secret: String) -> Self {
        let s = [username, realm, secret].join(CREDENTIALS_SEP);

        let mut h = Md5::new();
        h.update(s.as_bytes());

        MessageIntegrity(h.finalize().as_slice().to_vec())
    }

    // new_short_term_integrity returns new MessageIntegrity keyed with the
    // raw secret.
    pub fn new_short_term_integrity(secret: String) -> Self {
        MessageIntegrity(secret.as_bytes().to_vec())
    }

    // Check checks MESSAGE-INTEGRITY attribute.
    //
    // The recorded hash is compared, in constant time, against the HMAC
    // recomputed over the message rewritten with length =
    // length-up-to-integrity and the body truncated there, so whatever
    // follows the integrity attribute on the wire (FINGERPRINT, unknown
    // optional attributes) does not participate.
    pub fn check(&self, m: &mut Message) -> Result<()> {
        let stored = m.get(ATTR_MESSAGE_INTEGRITY)?;

        // Figure out how many trailing bytes sit after the integrity
        // attribute, then shrink the header length by that much to
        // reproduce the signer's view of the message.
        let length = m.length;
        let mut after_integrity = false;
        let mut trailing = 0;
        for a in &m.attributes.0 {
            if after_integrity {
                trailing += ATTRIBUTE_HEADER_SIZE + nearest_padded_value_length(a.length as usize);
            }
            if a.typ == ATTR_MESSAGE_INTEGRITY {
                after_integrity = true;
            }
        }
        m.length -= trailing as u32;
        m.write_length();

        let hmac_end = MESSAGE_HEADER_SIZE + m.length as usize
            - (ATTRIBUTE_HEADER_SIZE + MESSAGE_INTEGRITY_SIZE);
        let expected = new_hmac(&self.0, &m.raw[..hmac_end]);

        m.length = length;
        m.write_length();

        if stored.ct_eq(&expected).unwrap_u8() == 1 {
            Ok(())
        } else {
            Err(Error::ErrIntegrityMismatch)
        }
    }
}
