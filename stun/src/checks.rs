use crate::attributes::AttrType;
use crate::error::*;

// Length validation shared by the attribute codecs. The attribute type
// parameter keeps call sites self-describing; the error kinds carry no
// attribute context so tests can match them structurally.

/// expect_size fails with ErrAttributeSizeInvalid unless the value has
/// exactly the size its codec requires.
pub fn expect_size(_at: AttrType, got: usize, want: usize) -> Result<()> {
    if got == want {
        Ok(())
    } else {
        Err(Error::ErrAttributeSizeInvalid)
    }
}

/// cap_size fails with ErrAttributeSizeOverflow when a bounded value
/// exceeds its limit.
pub fn cap_size(_at: AttrType, got: usize, max: usize) -> Result<()> {
    if got <= max {
        Ok(())
    } else {
        Err(Error::ErrAttributeSizeOverflow)
    }
}

/// is_attr_size_invalid returns true for the fixed-size violation kind.
pub fn is_attr_size_invalid(err: &Error) -> bool {
    Error::ErrAttributeSizeInvalid == *err
}

/// is_attr_size_overflow returns true for the bounded-size violation kind.
pub fn is_attr_size_overflow(err: &Error) -> bool {
    Error::ErrAttributeSizeOverflow == *err
}
