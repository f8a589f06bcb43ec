
use std::fmt;

use crate::error::*;
use crate::message::*;

/// Attributes is the decoded TLV list of a message, in wire order.
#[derive(Default, PartialEq, Eq, Debug, Clone)]
pub struct Attributes(pub Vec<RawAttribute>);

impl Attributes {
    /// get returns the first attribute of type t, plus whether one was
    /// found at all.
    pub fn get(&self, t: AttrType) -> (RawAttribute, bool) {
        for candidate in &self.0 {
            if candidate.typ == t {
                return (candidate.clone(), true);
            }
        }

        (RawAttribute::default(), false)
    }
}

/// AttrType is attribute type.
#[derive(PartialEq, Debug, Eq, Default, Copy, Clone)]
pub struct AttrType(pub u16);

impl fmt::Display for AttrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let other = format!("0x{:x}", self.0);

        let s = match *self {
            ATTR_USERNAME => "USERNAME",
            ATTR_MESSAGE_INTEGRITY => "MESSAGE-INTEGRITY",
            ATTR_ERROR_CODE => "ERROR-CODE",
            ATTR_LIFETIME => "LIFETIME",
            ATTR_XOR_PEER_ADDRESS => "XOR-PEER-ADDRESS",
            ATTR_DATA => "DATA",
            ATTR_REALM => "REALM",
            ATTR_NONCE => "NONCE",
            ATTR_XOR_RELAYED_ADDRESS => "XOR-RELAYED-ADDRESS",
            ATTR_REQUESTED_TRANSPORT => "REQUESTED-TRANSPORT",
            ATTR_XORMAPPED_ADDRESS => "XOR-MAPPED-ADDRESS",
            ATTR_SOFTWARE => "SOFTWARE",
            ATTR_ALTERNATE_SERVER => "ALTERNATE-SERVER",
            ATTR_FINGERPRINT => "FINGERPRINT",
            ATTR_STUN_ID => "STUN-ID",
            ATTR_PROTOCOL_VERSION => "PROTOCOL-VERSION",
            ATTR_NAT_BINDING_INTERVAL => "NAT-BINDING-INTERVAL",
            ATTR_RESPONSE_ADDRESS => "RESPONSE-ADDRESS",
            _ => other.as_str(),
        };

        write!(f, "{s}")
    }
}

impl AttrType {
    /// required returns true if type is from comprehension-required range (0x0000-0x7FFF).
    pub fn required(&self) -> bool {
        self.0 <= 0x7FFF
    }

    /// optional returns true if type is from comprehension-optional range (0x8000-0xFFFF).
    pub fn optional(&self) -> bool {
        self.0 >= 0x8000
    }

    /// recognized returns true for the attribute types this codec
    /// understands. A message carrying a comprehension-required type
    /// outside this set fails to decode; unrecognized
    /// comprehension-optional types are kept opaquely.
    pub fn recognized(&self) -> bool {
        matches!(
            *self,
            ATTR_USERNAME
                | ATTR_MESSAGE_INTEGRITY
                | ATTR_ERROR_CODE
                | ATTR_LIFETIME
                | ATTR_XOR_PEER_ADDRESS
                | ATTR_DATA
                | ATTR_REALM
                | ATTR_NONCE
                | ATTR_XOR_RELAYED_ADDRESS
                | ATTR_REQUESTED_TRANSPORT
                | ATTR_XORMAPPED_ADDRESS
        )
    }

    /// value returns uint16 representation of attribute type.
    pub fn value(&self) -> u16 {
        self.0
    }
}

/// Attributes from comprehension-required range (0x0000-0x7FFF).
pub const ATTR_USERNAME: AttrType = AttrType(0x0006); // USERNAME
pub const ATTR_MESSAGE_INTEGRITY: AttrType = AttrType(0x0008); // MESSAGE-INTEGRITY
pub const ATTR_ERROR_CODE: AttrType = AttrType(0x0009); // ERROR-CODE
pub const ATTR_REALM: AttrType = AttrType(0x0014); // REALM
pub const ATTR_NONCE: AttrType = AttrType(0x0015); // NONCE
pub const ATTR_XORMAPPED_ADDRESS: AttrType = AttrType(0x0020); // XOR-MAPPED-ADDRESS

/// Attributes from comprehension-optional range (0x8000-0xFFFF).
pub const ATTR_SOFTWARE: AttrType = AttrType(0x8022); // SOFTWARE
pub const ATTR_ALTERNATE_SERVER: AttrType = AttrType(0x8023); // ALTERNATE-SERVER
pub const ATTR_FINGERPRINT: AttrType = AttrType(0x8028); // FINGERPRINT

/// Attributes from RFC 5766 TURN.
pub const ATTR_LIFETIME: AttrType = AttrType(0x000D); // LIFETIME
pub const ATTR_XOR_PEER_ADDRESS: AttrType = AttrType(0x0012); // XOR-PEER-ADDRESS
pub const ATTR_DATA: AttrType = AttrType(0x0013); // DATA
pub const ATTR_XOR_RELAYED_ADDRESS: AttrType = AttrType(0x0016); // XOR-RELAYED-ADDRESS
pub const ATTR_REQUESTED_TRANSPORT: AttrType = AttrType(0x0019); // REQUESTED-TRANSPORT

/// Vendor extension attributes (comprehension-optional range).
pub const ATTR_STUN_ID: AttrType = AttrType(0xFF03); // STUN-ID
pub const ATTR_PROTOCOL_VERSION: AttrType = AttrType(0xFF04); // PROTOCOL-VERSION
pub const ATTR_NAT_BINDING_INTERVAL: AttrType = AttrType(0xFF05); // NAT-BINDING-INTERVAL
pub const ATTR_RESPONSE_ADDRESS: AttrType = AttrType(0xFF06); // RESPONSE-ADDRESS

/// RawAttribute is one Type-Length-Value entry of a message. The codec
/// keeps every decoded attribute in this raw form; typed wrappers
/// interpret the value on demand, and comprehension-optional types
/// nobody interprets still round-trip unchanged.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct RawAttribute {
    pub typ: AttrType,
    pub length: u16, // ignored while encoding
    pub value: Vec<u8>,
}

impl fmt::Display for RawAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {:?}", self.typ, self.value)
    }
}

impl Setter for RawAttribute {
    /// add_to appends the attribute as typ/value; length is derived.
    fn add_to(&self, m: &mut Message) -> Result<()> {
        m.add(self.typ, &self.value);
        Ok(())
    }
}

pub(crate) const PADDING: usize = 4;

/// nearest_padded_value_length rounds l up to the 32-bit boundary
/// attribute values are aligned to on the wire. The padding bytes are
/// not counted in the attribute length.
pub(crate) fn nearest_padded_value_length(l: usize) -> usize {
    match l % PADDING {
        0 => l,
        rem => l + PADDING - rem,
    }
}
