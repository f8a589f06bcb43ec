#[cfg(test)]
mod xoraddr_test;

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use crate::attributes::*;
use crate::checks::*;
use crate::error::*;
use crate::message::*;

pub const FAMILY_IPV4: u16 = 0x01;
pub const FAMILY_IPV6: u16 = 0x02;

pub const IPV4LEN: usize = 4;
pub const IPV6LEN: usize = 16;

/// xor_bytes writes a ^ b into dst, stopping at the shortest of the
/// three slices, and returns how many bytes were written.
pub fn xor_bytes(dst: &mut [u8], a: &[u8], b: &[u8]) -> usize {
    let n = dst.len().min(a.len()).min(b.len());
    for (d, (x, y)) in dst[..n].iter_mut().zip(a.iter().zip(b)) {
        *d = x ^ y;
    }
    n
}

/// XorMappedAddress implements XOR-MAPPED-ADDRESS attribute.
///
/// The mask is the magic cookie for the port (top 16 bits) and the
/// IPv4 address, and the cookie concatenated with the transaction id
/// for IPv6 addresses. The TURN peer/relayed address attributes and
/// the RESPONSE-ADDRESS extension reuse this codec through
/// add_to_as/get_from_as.
///
/// RFC 5389 Section 15.2
pub struct XorMappedAddress {
    pub ip: IpAddr,
    pub port: u16,
}

impl Default for XorMappedAddress {
    fn default() -> Self {
        XorMappedAddress {
            ip: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 0,
        }
    }
}

impl fmt::Display for XorMappedAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.ip {
            IpAddr::V4(_) => write!(f, "{}:{}", self.ip, self.port),
            IpAddr::V6(_) => write!(f, "[{}]:{}", self.ip, self.port),
        }
    }
}

fn xor_mask(m: &Message) -> [u8; 4 + TRANSACTION_ID_SIZE] {
    let mut mask = [0u8; 4 + TRANSACTION_ID_SIZE];
    mask[0..4].copy_from_slice(&MAGIC_COOKIE.to_be_bytes());
    mask[4..].copy_from_slice(&m.transaction_id.0);
    mask
}

impl Setter for XorMappedAddress {
    /// add_to adds XOR-MAPPED-ADDRESS to m.
    fn add_to(&self, m: &mut Message) -> Result<()> {
        self.add_to_as(m, ATTR_XORMAPPED_ADDRESS)
    }
}

impl Getter for XorMappedAddress {
    /// get_from decodes XOR-MAPPED-ADDRESS attribute in message and returns
    /// error if any.
    fn get_from(&mut self, m: &Message) -> Result<()> {
        self.get_from_as(m, ATTR_XORMAPPED_ADDRESS)
    }
}

impl XorMappedAddress {
    /// add_to_as encodes the address under attribute type t: a family
    /// byte, the masked port, then the masked address bytes.
    pub fn add_to_as(&self, m: &mut Message, t: AttrType) -> Result<()> {
        let (family, ip_len, ip) = match self.ip {
            IpAddr::V4(ipv4) => (FAMILY_IPV4, IPV4LEN, ipv4.octets().to_vec()),
            IpAddr::V6(ipv6) => (FAMILY_IPV6, IPV6LEN, ipv6.octets().to_vec()),
        };

        let mask = xor_mask(m);
        let mut value = [0u8; 4 + IPV6LEN];
        value[0..2].copy_from_slice(&family.to_be_bytes());
        value[2..4].copy_from_slice(&(self.port ^ (MAGIC_COOKIE >> 16) as u16).to_be_bytes());
        xor_bytes(&mut value[4..4 + ip_len], &ip, &mask);
        m.add(t, &value[..4 + ip_len]);
        Ok(())
    }

    /// get_from_as decodes an XOR-address value stored under attribute
    /// type t into self.
    pub fn get_from_as(&mut self, m: &Message, t: AttrType) -> Result<()> {
        let v = m.get(t)?;
        if v.len() <= 4 {
            return Err(Error::ErrUnexpectedEof);
        }

        let family = u16::from_be_bytes([v[0], v[1]]);
        if family != FAMILY_IPV6 && family != FAMILY_IPV4 {
            return Err(Error::Other(format!("bad address family value {family}")));
        }

        expect_size(
            t,
            v[4..].len(),
            if family == FAMILY_IPV4 {
                IPV4LEN
            } else {
                IPV6LEN
            },
        )?;

        self.port = u16::from_be_bytes([v[2], v[3]]) ^ (MAGIC_COOKIE >> 16) as u16;
        let mask = xor_mask(m);
        if family == FAMILY_IPV6 {
            let mut ip = [0; IPV6LEN];
            xor_bytes(&mut ip, &v[4..], &mask);
            self.ip = IpAddr::V6(Ipv6Addr::from(ip));
        } else {
            let mut ip = [0; IPV4LEN];
            xor_bytes(&mut ip, &v[4..], &mask);
            self.ip = IpAddr::V4(Ipv4Addr::from(ip));
        };

        Ok(())
    }
}
