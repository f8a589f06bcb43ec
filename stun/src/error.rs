use std::io;
use std::string::FromUtf8Error;

use thiserror::Error;

use crate::attributes::AttrType;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum Error {
    #[error("unexpected EOF: not enough bytes to read header")]
    ErrUnexpectedHeaderEof,
    #[error("unexpected EOF")]
    ErrUnexpectedEof,
    #[error("{0:#010x} is not the magic cookie")]
    ErrBadMagicCookie(u32),
    #[error("message length exceeds buffer")]
    ErrBadMessageLength,
    #[error("message length is not padded to a 4-byte boundary")]
    ErrBadPadding,
    #[error("unknown comprehension-required attribute {0}")]
    ErrUnknownRequiredAttribute(AttrType),
    #[error("attribute not found")]
    ErrAttributeNotFound,
    #[error("attribute size is invalid")]
    ErrAttributeSizeInvalid,
    #[error("attribute size overflow")]
    ErrAttributeSizeOverflow,
    #[error("bad ERROR-CODE class or number")]
    ErrBadErrorCodeValue,
    #[error("integrity check failed")]
    ErrIntegrityMismatch,
    #[error("fingerprint check failed")]
    ErrFingerprintMismatch,
    #[error("FINGERPRINT is not the last attribute")]
    ErrFingerprintNotLast,
    #[error("FINGERPRINT before MESSAGE-INTEGRITY attribute")]
    ErrFingerprintBeforeIntegrity,
    #[error("no default reason for ErrorCode")]
    ErrNoDefaultReason,
    #[error("utf8: {0}")]
    Utf8(#[from] FromUtf8Error),
    #[error("{0}")]
    Io(#[source] IoError),
    #[error("{0}")]
    Other(String),
}

#[derive(Debug, Error)]
#[error("io error: {0}")]
pub struct IoError(#[from] pub io::Error);

// Workaround for wanting PartialEq for io::Error.
impl PartialEq for IoError {
    fn eq(&self, other: &Self) -> bool {
        self.0.kind() == other.0.kind()
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(IoError(e))
    }
}
