
use std::fmt;

use crate::attributes::*;
use crate::checks::*;
use crate::error::*;
use crate::message::*;

// ErrorCodeAttribute represents ERROR-CODE attribute.
//
// RFC 5389 Section 15.6
#[derive(Default, Debug, PartialEq, Eq)]
pub struct ErrorCodeAttribute {
    pub code: ErrorCode,
    pub reason: Vec<u8>,
}

impl fmt::Display for ErrorCodeAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match String::from_utf8(self.reason.clone()) {
            Ok(reason) => reason,
            Err(_) => return Err(fmt::Error {}),
        };

        write!(f, "{}: {}", self.code.0, reason)
    }
}

// Wire layout: 21 reserved bits, 3-bit class (the hundreds digit),
// 8-bit number, then the UTF-8 reason.
const ERROR_CODE_CLASS_BYTE: usize = 2;
const ERROR_CODE_NUMBER_BYTE: usize = 3;
const ERROR_CODE_REASON_START: usize = 4;
const ERROR_CODE_REASON_MAX_B: usize = 763;
const ERROR_CODE_MODULO: u16 = 100;

// class is 3..6; number is 0..99.
const ERROR_CODE_CLASS_MIN: u16 = 3;
const ERROR_CODE_CLASS_MAX: u16 = 6;

impl Setter for ErrorCodeAttribute {
    // add_to adds ERROR-CODE to m.
    fn add_to(&self, m: &mut Message) -> Result<()> {
        cap_size(ATTR_ERROR_CODE, self.reason.len(), ERROR_CODE_REASON_MAX_B)?;

        let mut value: Vec<u8> = Vec::with_capacity(ERROR_CODE_REASON_START + self.reason.len());
        value.extend_from_slice(&[0, 0]);
        value.push((self.code.0 / ERROR_CODE_MODULO) as u8);
        value.push((self.code.0 % ERROR_CODE_MODULO) as u8);
        value.extend_from_slice(&self.reason);

        m.add(ATTR_ERROR_CODE, &value);

        Ok(())
    }
}

impl Getter for ErrorCodeAttribute {
    // get_from decodes ERROR-CODE from m, validating the class and
    // number ranges and the UTF-8 reason.
    fn get_from(&mut self, m: &Message) -> Result<()> {
        let v = m.get(ATTR_ERROR_CODE)?;

        if v.len() < ERROR_CODE_REASON_START {
            return Err(Error::ErrUnexpectedEof);
        }

        let class = v[ERROR_CODE_CLASS_BYTE] as u16;
        let number = v[ERROR_CODE_NUMBER_BYTE] as u16;
        if !(ERROR_CODE_CLASS_MIN..=ERROR_CODE_CLASS_MAX).contains(&class)
            || number >= ERROR_CODE_MODULO
        {
            return Err(Error::ErrBadErrorCodeValue);
        }

        let reason = v[ERROR_CODE_REASON_START..].to_vec();
        if String::from_utf8(reason.clone()).is_err() {
            return Err(Error::ErrBadErrorCodeValue);
        }

        self.code = ErrorCode(class * ERROR_CODE_MODULO + number);
        self.reason = reason;

        Ok(())
    }
}

// ErrorCode is code for ERROR-CODE attribute.
#[derive(PartialEq, Eq, Hash, Copy, Clone, Default, Debug)]
pub struct ErrorCode(pub u16);

impl Setter for ErrorCode {
    // add_to adds ERROR-CODE with its default reason to m, or
    // ErrNoDefaultReason when the code has none.
    fn add_to(&self, m: &mut Message) -> Result<()> {
        let reason = default_reason(*self).ok_or(Error::ErrNoDefaultReason)?;
        let a = ErrorCodeAttribute {
            code: *self,
            reason: reason.as_bytes().to_vec(),
        };
        a.add_to(m)
    }
}

// Possible error codes.
pub const CODE_TRY_ALTERNATE: ErrorCode = ErrorCode(300);
pub const CODE_BAD_REQUEST: ErrorCode = ErrorCode(400);
pub const CODE_UNAUTHORIZED: ErrorCode = ErrorCode(401);
pub const CODE_UNKNOWN_ATTRIBUTE: ErrorCode = ErrorCode(420);
pub const CODE_STALE_NONCE: ErrorCode = ErrorCode(438);
pub const CODE_SERVER_ERROR: ErrorCode = ErrorCode(500);

// Error codes from RFC 5766.
//
// RFC 5766 Section 15
pub const CODE_FORBIDDEN: ErrorCode = ErrorCode(403); // Forbidden
pub const CODE_ALLOC_MISMATCH: ErrorCode = ErrorCode(437); // Allocation Mismatch
pub const CODE_WRONG_CREDENTIALS: ErrorCode = ErrorCode(441); // Wrong Credentials
pub const CODE_UNSUPPORTED_TRANS_PROTO: ErrorCode = ErrorCode(442); // Unsupported Transport Protocol
pub const CODE_ALLOC_QUOTA_REACHED: ErrorCode = ErrorCode(486); // Allocation Quota Reached
pub const CODE_INSUFFICIENT_CAPACITY: ErrorCode = ErrorCode(508); // Insufficient Capacity

/// default_reason returns the canonical reason phrase for a code, if
/// it has one.
pub fn default_reason(code: ErrorCode) -> Option<&'static str> {
    match code {
        CODE_TRY_ALTERNATE => Some("Try Alternate"),
        CODE_BAD_REQUEST => Some("Bad Request"),
        CODE_UNAUTHORIZED => Some("Unauthorized"),
        CODE_UNKNOWN_ATTRIBUTE => Some("Unknown Attribute"),
        CODE_STALE_NONCE => Some("Stale Nonce"),
        CODE_SERVER_ERROR => Some("Server Error"),
        // RFC 5766.
        CODE_FORBIDDEN => Some("Forbidden"),
        CODE_ALLOC_MISMATCH => Some("Allocation Mismatch"),
        CODE_WRONG_CREDENTIALS => Some("Wrong Credentials"),
        CODE_UNSUPPORTED_TRANS_PROTO => Some("Unsupported Transport Protocol"),
        CODE_ALLOC_QUOTA_REACHED => Some("Allocation Quota Reached"),
        CODE_INSUFFICIENT_CAPACITY => Some("Insufficient Capacity"),
        _ => None,
    }
}
