#[cfg(test)]
mod message_test;

use std::fmt;

use base64::prelude::BASE64_STANDARD;
use base64::Engine;
use rand::Rng;

use crate::attributes::*;
use crate::error::*;

// MAGIC_COOKIE is the fixed 0x2112A442 every message carries in bytes
// 4..8 of its header. It doubles as the XOR mask for the address
// attributes.
pub const MAGIC_COOKIE: u32 = 0x2112A442;
pub const ATTRIBUTE_HEADER_SIZE: usize = 4;
pub const MESSAGE_HEADER_SIZE: usize = 20;

// TRANSACTION_ID_SIZE is length of transaction id array (in bytes).
pub const TRANSACTION_ID_SIZE: usize = 12; // 96 bit

// Setter writes one attribute (or header field) into a message.
// Messages are assembled by applying a list of setters in order.
pub trait Setter: Send {
    fn add_to(&self, m: &mut Message) -> Result<()>;
}

// Getter parses one attribute out of a decoded message.
pub trait Getter {
    fn get_from(&mut self, m: &Message) -> Result<()>;
}

// Checker validates an aspect of a decoded message (integrity,
// fingerprint) without extracting a value.
pub trait Checker {
    fn check(&self, m: &Message) -> Result<()>;
}

/// TransactionId is a 96-bit STUN transaction id.
#[derive(Default, PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub struct TransactionId(pub [u8; TRANSACTION_ID_SIZE]);

impl TransactionId {
    /// new returns a fresh random transaction id drawn from a
    /// cryptographically secure generator.
    pub fn new() -> Self {
        let mut b = TransactionId([0u8; TRANSACTION_ID_SIZE]);
        rand::thread_rng().fill(&mut b.0);
        b
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", BASE64_STANDARD.encode(self.0))
    }
}

impl Setter for TransactionId {
    fn add_to(&self, m: &mut Message) -> Result<()> {
        m.transaction_id = *self;
        m.write_transaction_id();
        Ok(())
    }
}

// is_message returns true if b looks like a STUN message: long enough
// for a header and carrying the magic cookie. Useful for multiplexing;
// it does not guarantee that decoding will succeed.
pub fn is_message(b: &[u8]) -> bool {
    b.len() >= MESSAGE_HEADER_SIZE && u32::from_be_bytes([b[4], b[5], b[6], b[7]]) == MAGIC_COOKIE
}

// Message is a single STUN packet. The wire bytes live in raw and are
// kept in sync as attributes are added, so encoding is free; the typed
// fields and the attribute list are views that decode() rebuilds from
// raw. Attribute values returned by get() are copies.
#[derive(Default, Debug, Clone)]
pub struct Message {
    pub typ: MessageType,
    pub length: u32, // len(raw) not including header
    pub transaction_id: TransactionId,
    pub attributes: Attributes,
    pub raw: Vec<u8>,
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} l={} attrs={} id={}",
            self.typ,
            self.length,
            self.attributes.0.len(),
            self.transaction_id
        )
    }
}

// Messages compare by their decoded view; raw is ignored.
impl PartialEq for Message {
    fn eq(&self, other: &Self) -> bool {
        self.typ == other.typ
            && self.transaction_id == other.transaction_id
            && self.length == other.length
            && self.attributes == other.attributes
    }
}

const DEFAULT_RAW_CAPACITY: usize = 120;

impl Message {
    // new returns a message with a zeroed header pre-allocated in raw.
    pub fn new() -> Self {
        Message {
            raw: {
                let mut raw = Vec::with_capacity(DEFAULT_RAW_CAPACITY);
                raw.extend_from_slice(&[0; MESSAGE_HEADER_SIZE]);
                raw
            },
            ..Default::default()
        }
    }

    // reset drops the attributes and truncates raw for reuse.
    pub fn reset(&mut self) {
        self.raw.clear();
        self.length = 0;
        self.attributes.0.clear();
    }

    // grow ensures raw is at least n bytes long.
    fn grow(&mut self, n: usize, resize: bool) {
        if self.raw.len() >= n {
            if resize {
                self.raw.resize(n, 0);
            }
            return;
        }
        self.raw.extend_from_slice(&vec![0; n - self.raw.len()]);
    }

    // add appends a TLV to raw, zero-pads the value to the 32-bit
    // boundary, records the attribute in the list and refreshes the
    // header length. The value is copied, so v can be reused.
    pub fn add(&mut self, t: AttrType, v: &[u8]) {
        let alloc_size = ATTRIBUTE_HEADER_SIZE + v.len();
        let first = MESSAGE_HEADER_SIZE + self.length as usize;
        let mut last = first + alloc_size;
        self.grow(last, true);
        self.length += alloc_size as u32;

        let buf = &mut self.raw[first..last];
        buf[0..2].copy_from_slice(&t.value().to_be_bytes()); // T
        buf[2..4].copy_from_slice(&(v.len() as u16).to_be_bytes()); // L

        let value = &mut buf[ATTRIBUTE_HEADER_SIZE..];
        value.copy_from_slice(v); // V

        let attr = RawAttribute {
            typ: t,
            length: v.len() as u16,
            value: value.to_vec(),
        };

        if attr.length as usize % PADDING != 0 {
            let bytes_to_add = nearest_padded_value_length(v.len()) - v.len();
            last += bytes_to_add;
            self.grow(last, true);
            // zero the padding so stale buffer contents cannot leak
            for b in &mut self.raw[last - bytes_to_add..last] {
                *b = 0;
            }
            self.length += bytes_to_add as u32;
        }
        self.attributes.0.push(attr);
        self.write_length();
    }

    // write_length renders length into the header.
    pub fn write_length(&mut self) {
        self.grow(4, false);
        self.raw[2..4].copy_from_slice(&(self.length as u16).to_be_bytes());
    }

    // write_header renders type, length, cookie and transaction id.
    pub fn write_header(&mut self) {
        self.grow(MESSAGE_HEADER_SIZE, false);

        self.write_type();
        self.write_length();
        self.raw[4..8].copy_from_slice(&MAGIC_COOKIE.to_be_bytes());
        self.raw[8..MESSAGE_HEADER_SIZE].copy_from_slice(&self.transaction_id.0);
    }

    // write_transaction_id renders transaction_id into the header.
    pub fn write_transaction_id(&mut self) {
        self.raw[8..MESSAGE_HEADER_SIZE].copy_from_slice(&self.transaction_id.0);
    }

    // write_type renders typ into the header.
    pub fn write_type(&mut self) {
        self.grow(2, false);
        self.raw[..2].copy_from_slice(&self.typ.value().to_be_bytes());
    }

    // set_type sets typ and renders it.
    pub fn set_type(&mut self, t: MessageType) {
        self.typ = t;
        self.write_type();
    }

    // decode rebuilds the typed view from raw.
    //
    // Fails with a distinct error kind on truncated input, a foreign
    // magic cookie, a length that overruns the buffer or is not 32-bit
    // aligned, and on any comprehension-required attribute the codec
    // does not recognize. Unrecognized comprehension-optional
    // attributes are kept opaquely in the attribute list.
    pub fn decode(&mut self) -> Result<()> {
        let buf = &self.raw;
        if buf.len() < MESSAGE_HEADER_SIZE {
            return Err(Error::ErrUnexpectedHeaderEof);
        }

        let t = u16::from_be_bytes([buf[0], buf[1]]);
        let size = u16::from_be_bytes([buf[2], buf[3]]) as usize;
        let cookie = u32::from_be_bytes([buf[4], buf[5], buf[6], buf[7]]);
        let full_size = MESSAGE_HEADER_SIZE + size;

        if cookie != MAGIC_COOKIE {
            return Err(Error::ErrBadMagicCookie(cookie));
        }
        if size % PADDING != 0 {
            return Err(Error::ErrBadPadding);
        }
        if buf.len() < full_size {
            return Err(Error::ErrBadMessageLength);
        }

        self.typ.read_value(t);
        self.length = size as u32;
        self.transaction_id
            .0
            .copy_from_slice(&buf[8..MESSAGE_HEADER_SIZE]);

        self.attributes.0.clear();
        let mut offset = 0;
        let mut b = &buf[MESSAGE_HEADER_SIZE..full_size];

        while offset < size {
            if b.len() < ATTRIBUTE_HEADER_SIZE {
                return Err(Error::ErrUnexpectedEof);
            }

            let mut a = RawAttribute {
                typ: AttrType(u16::from_be_bytes([b[0], b[1]])),
                length: u16::from_be_bytes([b[2], b[3]]),
                ..Default::default()
            };
            let a_l = a.length as usize;
            let a_buff_l = nearest_padded_value_length(a_l); // value plus its padding

            b = &b[ATTRIBUTE_HEADER_SIZE..];
            offset += ATTRIBUTE_HEADER_SIZE;
            if b.len() < a_buff_l {
                return Err(Error::ErrUnexpectedEof);
            }

            if a.typ.required() && !a.typ.recognized() {
                return Err(Error::ErrUnknownRequiredAttribute(a.typ));
            }

            a.value = b[..a_l].to_vec();
            offset += a_buff_l;
            b = &b[a_buff_l..];

            self.attributes.0.push(a);
        }

        Ok(())
    }

    // write replaces raw with t_buf and decodes it. On error the
    // message may be partially decoded.
    pub fn write(&mut self, t_buf: &[u8]) -> Result<usize> {
        self.raw.clear();
        self.raw.extend_from_slice(t_buf);
        self.decode()?;
        Ok(t_buf.len())
    }

    // contains returns true if the message has an attribute of type t.
    pub fn contains(&self, t: AttrType) -> bool {
        self.attributes.0.iter().any(|a| a.typ == t)
    }

    // get returns a copy of the value of the first attribute of type
    // t, or ErrAttributeNotFound.
    pub fn get(&self, t: AttrType) -> Result<Vec<u8>> {
        let (v, ok) = self.attributes.get(t);
        if ok {
            Ok(v.value)
        } else {
            Err(Error::ErrAttributeNotFound)
        }
    }

    // build resets the message, writes a fresh header and applies the
    // setters in order, stopping at the first error.
    pub fn build(&mut self, setters: &[Box<dyn Setter>]) -> Result<()> {
        self.reset();
        self.write_header();
        for s in setters {
            s.add_to(self)?;
        }
        Ok(())
    }

    // check applies checkers in order, stopping at the first error.
    pub fn check<C: Checker>(&self, checkers: &[C]) -> Result<()> {
        for c in checkers {
            c.check(self)?;
        }
        Ok(())
    }

    // parse applies getters in order, stopping at the first error.
    pub fn parse<G: Getter>(&self, getters: &mut [G]) -> Result<()> {
        for c in getters {
            c.get_from(self)?;
        }
        Ok(())
    }
}

// MessageClass is 8-bit representation of 2-bit class of STUN Message Class.
#[derive(Default, PartialEq, Eq, Debug, Copy, Clone)]
pub struct MessageClass(u8);

// Possible values for message class in STUN Message Type.
pub const CLASS_REQUEST: MessageClass = MessageClass(0x00); // 0b00
pub const CLASS_INDICATION: MessageClass = MessageClass(0x01); // 0b01
pub const CLASS_SUCCESS_RESPONSE: MessageClass = MessageClass(0x02); // 0b10
pub const CLASS_ERROR_RESPONSE: MessageClass = MessageClass(0x03); // 0b11

impl fmt::Display for MessageClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match *self {
            CLASS_REQUEST => "request",
            CLASS_INDICATION => "indication",
            CLASS_SUCCESS_RESPONSE => "success response",
            CLASS_ERROR_RESPONSE => "error response",
            _ => "unknown message class",
        };

        write!(f, "{s}")
    }
}

// Method is uint16 representation of 12-bit STUN method.
#[derive(Default, PartialEq, Eq, Debug, Copy, Clone)]
pub struct Method(u16);

// Possible methods for STUN Message.
pub const METHOD_BINDING: Method = Method(0x001);
pub const METHOD_ALLOCATE: Method = Method(0x003);
pub const METHOD_REFRESH: Method = Method(0x004);
pub const METHOD_SEND: Method = Method(0x006);
pub const METHOD_DATA: Method = Method(0x007);
pub const METHOD_CREATE_PERMISSION: Method = Method(0x008);

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unknown = format!("0x{:x}", self.0);

        let s = match *self {
            METHOD_BINDING => "Binding",
            METHOD_ALLOCATE => "Allocate",
            METHOD_REFRESH => "Refresh",
            METHOD_SEND => "Send",
            METHOD_DATA => "Data",
            METHOD_CREATE_PERMISSION => "CreatePermission",
            _ => unknown.as_str(),
        };

        write!(f, "{s}")
    }
}

// MessageType is STUN Message Type Field.
#[derive(Default, Debug, PartialEq, Eq, Clone, Copy)]
pub struct MessageType {
    pub method: Method,      // e.g. binding
    pub class: MessageClass, // e.g. request
}

// Common STUN message types.
// Binding request message type.
pub const BINDING_REQUEST: MessageType = MessageType {
    method: METHOD_BINDING,
    class: CLASS_REQUEST,
};
// Binding success response message type
pub const BINDING_SUCCESS: MessageType = MessageType {
    method: METHOD_BINDING,
    class: CLASS_SUCCESS_RESPONSE,
};
// Binding error response message type.
pub const BINDING_ERROR: MessageType = MessageType {
    method: METHOD_BINDING,
    class: CLASS_ERROR_RESPONSE,
};
// Binding indication message type (fire-and-forget keep-alive).
pub const BINDING_INDICATION: MessageType = MessageType {
    method: METHOD_BINDING,
    class: CLASS_INDICATION,
};

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.class)
    }
}

// The 14-bit type field interleaves the 12 method bits with the 2
// class bits: class bit 0 sits at position 4, class bit 1 at position
// 8, splitting the method into three runs (M0-M3, M4-M6, M7-M11).
const METHOD_ABITS: u16 = 0xf;
const METHOD_BBITS: u16 = 0x70;
const METHOD_DBITS: u16 = 0xf80;

const METHOD_BSHIFT: u16 = 1;
const METHOD_DSHIFT: u16 = 2;

const FIRST_BIT: u16 = 0x1;
const SECOND_BIT: u16 = 0x2;

const C0BIT: u16 = FIRST_BIT;
const C1BIT: u16 = SECOND_BIT;

const CLASS_C0SHIFT: u16 = 4;
const CLASS_C1SHIFT: u16 = 7;

impl Setter for MessageType {
    // add_to sets m's type to self.
    fn add_to(&self, m: &mut Message) -> Result<()> {
        m.set_type(*self);
        Ok(())
    }
}

impl MessageType {
    // new returns new message type with provided method and class.
    pub fn new(method: Method, class: MessageClass) -> Self {
        MessageType { method, class }
    }

    // value returns the interleaved 14-bit wire representation.
    pub fn value(&self) -> u16 {
        let method = self.method.0;
        let a = method & METHOD_ABITS;
        let b = method & METHOD_BBITS;
        let d = method & METHOD_DBITS;

        // shift the upper method runs left to open the class holes
        let method = a + (b << METHOD_BSHIFT) + (d << METHOD_DSHIFT);

        let c = self.class.0 as u16;
        let class = ((c & C0BIT) << CLASS_C0SHIFT) + ((c & C1BIT) << CLASS_C1SHIFT);

        method + class
    }

    // read_value decodes the interleaved wire representation.
    pub fn read_value(&mut self, value: u16) {
        let c0 = (value >> CLASS_C0SHIFT) & C0BIT;
        let c1 = (value >> CLASS_C1SHIFT) & C1BIT;
        self.class = MessageClass((c0 + c1) as u8);

        let a = value & METHOD_ABITS;
        let b = (value >> METHOD_BSHIFT) & METHOD_BBITS;
        let d = (value >> METHOD_DSHIFT) & METHOD_DBITS;
        self.method = Method(a + b + d);
    }
}
