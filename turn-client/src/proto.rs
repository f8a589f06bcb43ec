
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use stun::attributes::*;
use stun::checks::*;
use stun::message::*;
use stun::xoraddr::XorMappedAddress;

// Typed views over the TURN and vendor-extension attributes the session
// puts on the wire. Each wrapper reads and writes the codec's raw TLV
// list through the Setter/Getter traits; nothing here owns policy.

/// IANA protocol number carried in REQUESTED-TRANSPORT.
#[derive(PartialEq, Eq, Default, Debug, Clone, Copy, Hash)]
pub struct Protocol(pub u8);

/// The only transport this client ever asks for.
pub const PROTO_UDP: Protocol = Protocol(17);

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == PROTO_UDP {
            write!(f, "UDP")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

// The three XOR-address attributes differ only in type code and
// meaning; they share the XOR-MAPPED-ADDRESS wire codec. Stamp the
// wrappers out together.
macro_rules! xor_addr_attribute {
    ($(#[$doc:meta])* $name:ident, $attr:expr) => {
        $(#[$doc])*
        #[derive(PartialEq, Eq, Debug, Clone, Copy)]
        pub struct $name {
            pub ip: IpAddr,
            pub port: u16,
        }

        impl Default for $name {
            fn default() -> Self {
                $name {
                    ip: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
                    port: 0,
                }
            }
        }

        impl From<SocketAddr> for $name {
            fn from(addr: SocketAddr) -> Self {
                $name {
                    ip: addr.ip(),
                    port: addr.port(),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self.ip {
                    IpAddr::V4(_) => write!(f, "{}:{}", self.ip, self.port),
                    IpAddr::V6(_) => write!(f, "[{}]:{}", self.ip, self.port),
                }
            }
        }

        impl Setter for $name {
            fn add_to(&self, m: &mut Message) -> Result<(), stun::Error> {
                XorMappedAddress {
                    ip: self.ip,
                    port: self.port,
                }
                .add_to_as(m, $attr)
            }
        }

        impl Getter for $name {
            fn get_from(&mut self, m: &Message) -> Result<(), stun::Error> {
                let mut inner = XorMappedAddress::default();
                inner.get_from_as(m, $attr)?;
                self.ip = inner.ip;
                self.port = inner.port;
                Ok(())
            }
        }
    };
}

xor_addr_attribute!(
    /// XOR-PEER-ADDRESS: the peer a permission or a send/data
    /// indication concerns, as seen from the server.
    PeerAddress,
    ATTR_XOR_PEER_ADDRESS
);

xor_addr_attribute!(
    /// XOR-RELAYED-ADDRESS: the transport address the server allocated
    /// on the client's behalf.
    RelayedAddress,
    ATTR_XOR_RELAYED_ADDRESS
);

xor_addr_attribute!(
    /// RESPONSE-ADDRESS vendor extension, same encoding as the other
    /// XOR addresses.
    ResponseAddress,
    ATTR_RESPONSE_ADDRESS
);

// LIFETIME and NAT-BINDING-INTERVAL both carry whole seconds in a
// 32-bit big-endian integer.
const SECONDS_SIZE: usize = 4;

fn add_seconds(m: &mut Message, attr: AttrType, d: Duration) {
    m.add(attr, &(d.as_secs() as u32).to_be_bytes());
}

fn get_seconds(m: &Message, attr: AttrType) -> Result<Duration, stun::Error> {
    let v = m.get(attr)?;
    expect_size(attr, v.len(), SECONDS_SIZE)?;
    let seconds = u32::from_be_bytes([v[0], v[1], v[2], v[3]]);
    Ok(Duration::from_secs(seconds as u64))
}

/// LIFETIME: how long the server keeps the allocation absent a
/// refresh. Read back from allocate and refresh responses; a zero
/// lifetime in a refresh response releases the allocation.
#[derive(Default, Debug, PartialEq, Eq, Clone, Copy)]
pub struct Lifetime(pub Duration);

impl fmt::Display for Lifetime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0.as_secs())
    }
}

impl Setter for Lifetime {
    fn add_to(&self, m: &mut Message) -> Result<(), stun::Error> {
        add_seconds(m, ATTR_LIFETIME, self.0);
        Ok(())
    }
}

impl Getter for Lifetime {
    fn get_from(&mut self, m: &Message) -> Result<(), stun::Error> {
        self.0 = get_seconds(m, ATTR_LIFETIME)?;
        Ok(())
    }
}

/// NAT-BINDING-INTERVAL vendor extension: the cadence at which the
/// server would like keep-alive indications.
#[derive(Default, Debug, PartialEq, Eq, Clone, Copy)]
pub struct NatBindingInterval(pub Duration);

impl fmt::Display for NatBindingInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0.as_secs())
    }
}

impl Setter for NatBindingInterval {
    fn add_to(&self, m: &mut Message) -> Result<(), stun::Error> {
        add_seconds(m, ATTR_NAT_BINDING_INTERVAL, self.0);
        Ok(())
    }
}

impl Getter for NatBindingInterval {
    fn get_from(&mut self, m: &Message) -> Result<(), stun::Error> {
        self.0 = get_seconds(m, ATTR_NAT_BINDING_INTERVAL)?;
        Ok(())
    }
}

/// DATA: the application payload of send and data indications. Opaque
/// to the session; it travels between the local caller and the peer.
#[derive(Default, Debug, PartialEq, Eq)]
pub struct Data(pub Vec<u8>);

impl Setter for Data {
    fn add_to(&self, m: &mut Message) -> Result<(), stun::Error> {
        m.add(ATTR_DATA, &self.0);
        Ok(())
    }
}

impl Getter for Data {
    fn get_from(&mut self, m: &Message) -> Result<(), stun::Error> {
        self.0 = m.get(ATTR_DATA)?;
        Ok(())
    }
}

/// REQUESTED-TRANSPORT: the protocol codepoint in the first byte, the
/// remaining three reserved as zero.
#[derive(Default, Debug, PartialEq, Eq, Clone, Copy)]
pub struct RequestedTransport(pub Protocol);

impl fmt::Display for RequestedTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "protocol: {}", self.0)
    }
}

const REQUESTED_TRANSPORT_SIZE: usize = 4;

impl Setter for RequestedTransport {
    fn add_to(&self, m: &mut Message) -> Result<(), stun::Error> {
        m.add(ATTR_REQUESTED_TRANSPORT, &[self.0 .0, 0, 0, 0]);
        Ok(())
    }
}

impl Getter for RequestedTransport {
    fn get_from(&mut self, m: &Message) -> Result<(), stun::Error> {
        let v = m.get(ATTR_REQUESTED_TRANSPORT)?;
        expect_size(ATTR_REQUESTED_TRANSPORT, v.len(), REQUESTED_TRANSPORT_SIZE)?;
        self.0 = Protocol(v[0]);
        Ok(())
    }
}

/// STUN-ID vendor extension: an opaque identifier echoed between
/// client and server.
#[derive(Default, Debug, PartialEq, Eq, Clone)]
pub struct StunId(pub Vec<u8>);

impl Setter for StunId {
    fn add_to(&self, m: &mut Message) -> Result<(), stun::Error> {
        m.add(ATTR_STUN_ID, &self.0);
        Ok(())
    }
}

impl Getter for StunId {
    fn get_from(&mut self, m: &Message) -> Result<(), stun::Error> {
        self.0 = m.get(ATTR_STUN_ID)?;
        Ok(())
    }
}

/// PROTOCOL-VERSION vendor extension: the protocol revision in use,
/// as a 32-bit integer.
#[derive(Default, Debug, PartialEq, Eq, Clone, Copy)]
pub struct ProtocolVersion(pub u32);

const PROTOCOL_VERSION_SIZE: usize = 4;

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

impl Setter for ProtocolVersion {
    fn add_to(&self, m: &mut Message) -> Result<(), stun::Error> {
        m.add(ATTR_PROTOCOL_VERSION, &self.0.to_be_bytes());
        Ok(())
    }
}

impl Getter for ProtocolVersion {
    fn get_from(&mut self, m: &Message) -> Result<(), stun::Error> {
        let v = m.get(ATTR_PROTOCOL_VERSION)?;
        expect_size(ATTR_PROTOCOL_VERSION, v.len(), PROTOCOL_VERSION_SIZE)?;
        self.0 = u32::from_be_bytes([v[0], v[1], v[2], v[3]]);
        Ok(())
    }
}
