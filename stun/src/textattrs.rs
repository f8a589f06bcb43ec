#[cfg(test)]
mod textattrs_test;

use std::fmt;

use crate::attributes::*;
use crate::checks::*;
use crate::error::*;
use crate::message::*;

const MAX_USERNAME_B: usize = 513;
const MAX_REALM_CHARS: usize = 128;
const MAX_NONCE_B: usize = 763;
const MAX_SOFTWARE_B: usize = 763;

// Username represents USERNAME attribute.
//
// RFC 5389 Section 15.3
pub type Username = TextAttribute;

// Realm represents REALM attribute.
//
// RFC 5389 Section 15.7
pub type Realm = TextAttribute;

// Nonce represents NONCE attribute.
//
// RFC 5389 Section 15.8
pub type Nonce = TextAttribute;

// Software is SOFTWARE attribute.
//
// RFC 5389 Section 15.10
pub type Software = TextAttribute;

// Per-type length limit. REALM counts characters, the rest count
// bytes.
enum Limit {
    Bytes(usize),
    Chars(usize),
}

fn limit_for(attr: AttrType) -> Option<Limit> {
    match attr {
        ATTR_USERNAME => Some(Limit::Bytes(MAX_USERNAME_B)),
        ATTR_REALM => Some(Limit::Chars(MAX_REALM_CHARS)),
        ATTR_NONCE => Some(Limit::Bytes(MAX_NONCE_B)),
        ATTR_SOFTWARE => Some(Limit::Bytes(MAX_SOFTWARE_B)),
        _ => None,
    }
}

fn check_limit(attr: AttrType, text: &str) -> Result<()> {
    match limit_for(attr) {
        Some(Limit::Bytes(max)) => cap_size(attr, text.len(), max),
        Some(Limit::Chars(max)) => cap_size(attr, text.chars().count(), max),
        None => Err(Error::Other(format!("unsupported text attribute {attr}"))),
    }
}

// TextAttribute is helper for adding and getting text attributes.
#[derive(Clone, Default, Debug, PartialEq, Eq)]
pub struct TextAttribute {
    pub attr: AttrType,
    pub text: String,
}

impl fmt::Display for TextAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

impl Setter for TextAttribute {
    // add_to adds the attribute to m after validating its length limit.
    fn add_to(&self, m: &mut Message) -> Result<()> {
        check_limit(self.attr, &self.text)?;
        m.add(self.attr, self.text.as_bytes());
        Ok(())
    }
}

impl Getter for TextAttribute {
    fn get_from(&mut self, m: &Message) -> Result<()> {
        let attr = self.attr;
        *self = TextAttribute::get_from_as(m, attr)?;
        Ok(())
    }
}

impl TextAttribute {
    pub fn new(attr: AttrType, text: String) -> Self {
        TextAttribute { attr, text }
    }

    // get_from_as reads attribute attr from m, validating UTF-8 and
    // the length limit.
    pub fn get_from_as(m: &Message, attr: AttrType) -> Result<Self> {
        let text = String::from_utf8(m.get(attr)?)?;
        check_limit(attr, &text)?;
        Ok(TextAttribute { attr, text })
    }
}
