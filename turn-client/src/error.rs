use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum Error {
    #[error("transaction timed out")]
    ErrTimeout,
    #[error("no active allocation")]
    ErrNoAllocation,
    #[error("no permission for peer address")]
    ErrNoPermission,
    #[error("unauthorized, credentials promoted")]
    ErrUnauthorized,
    #[error("stale nonce, credentials promoted")]
    ErrStaleNonce,
    #[error("server error {code}: {reason}")]
    ErrServer { code: u16, reason: String },
    #[error("at least one peer address is required")]
    ErrNoPeerAddresses,
    #[error("unexpected response type")]
    ErrUnexpectedResponse,
    #[error("session is closed")]
    ErrClosed,
    #[error("{0}")]
    Io(#[source] IoError),
    #[error("{0}")]
    Stun(#[from] stun::Error),
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
