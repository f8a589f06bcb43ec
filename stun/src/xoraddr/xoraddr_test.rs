use std::net::IpAddr;
use std::str::FromStr;

use super::*;

#[test]
fn test_xor_mapped_address_encoding() -> Result<()> {
    // IPv4 192.0.2.1:0x1234 under transaction id 00 01 02 .. 0b:
    // family 1, port 0x1234 ^ 0x2112, address 192.0.2.1 ^ 0x2112A442.
    let mut m = Message::new();
    m.transaction_id = TransactionId([0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11]);
    m.write_header();

    let a = XorMappedAddress {
        ip: IpAddr::from_str("192.0.2.1").unwrap(),
        port: 0x1234,
    };
    a.add_to(&mut m)?;

    let v = m.get(ATTR_XORMAPPED_ADDRESS)?;
    assert_eq!(&v[..2], &[0x00, 0x01]); // family IPv4
    assert_eq!(
        u16::from_be_bytes([v[2], v[3]]),
        0x1234 ^ 0x2112,
        "port is XORed with the top 16 cookie bits"
    );
    assert_eq!(
        &v[4..],
        &[0xC0 ^ 0x21, 0x00 ^ 0x12, 0x02 ^ 0xA4, 0x01 ^ 0x42],
        "address is XORed with the cookie"
    );

    Ok(())
}

#[test]
fn test_xor_mapped_address_round_trip_v4() -> Result<()> {
    let mut m = Message::new();
    m.transaction_id = TransactionId::new();
    m.write_header();

    let a = XorMappedAddress {
        ip: IpAddr::from_str("198.51.100.7").unwrap(),
        port: 49160,
    };
    a.add_to(&mut m)?;

    let mut decoded = Message::new();
    decoded.write(&m.raw)?;
    let mut got = XorMappedAddress::default();
    got.get_from(&decoded)?;

    assert_eq!(got.ip, a.ip);
    assert_eq!(got.port, a.port);

    Ok(())
}

#[test]
fn test_xor_mapped_address_round_trip_v6() -> Result<()> {
    // IPv6 addresses are XORed with cookie || transaction id
    let mut m = Message::new();
    m.transaction_id = TransactionId([3; 12]);
    m.write_header();

    let a = XorMappedAddress {
        ip: IpAddr::from_str("2001:db8::68").unwrap(),
        port: 5000,
    };
    a.add_to(&mut m)?;

    let mut decoded = Message::new();
    decoded.write(&m.raw)?;
    let mut got = XorMappedAddress::default();
    got.get_from(&decoded)?;

    assert_eq!(got.ip, a.ip);
    assert_eq!(got.port, a.port);

    Ok(())
}

#[test]
fn test_get_from_as_other_types() -> Result<()> {
    // peer/relayed addresses share the codec under their own types
    let mut m = Message::new();
    m.transaction_id = TransactionId::new();
    m.write_header();

    let a = XorMappedAddress {
        ip: IpAddr::from_str("203.0.113.4").unwrap(),
        port: 1000,
    };
    a.add_to_as(&mut m, ATTR_XOR_PEER_ADDRESS)?;

    let mut got = XorMappedAddress::default();
    got.get_from_as(&m, ATTR_XOR_PEER_ADDRESS)?;
    assert_eq!(got.ip, a.ip);
    assert_eq!(got.port, a.port);

    let err = got
        .get_from(&m)
        .expect_err("expected error, but got ok");
    assert_eq!(err, Error::ErrAttributeNotFound);

    Ok(())
}

#[test]
fn test_get_from_bad_family() {
    let mut m = Message::new();
    m.transaction_id = TransactionId::new();
    m.write_header();
    m.add(ATTR_XORMAPPED_ADDRESS, &[0x00, 0x03, 0x10, 0x20, 1, 2, 3, 4]);

    let mut got = XorMappedAddress::default();
    let result = got.get_from(&m);
    assert!(result.is_err(), "family 3 must not decode");
}

#[test]
fn test_get_from_truncated() {
    let mut m = Message::new();
    m.transaction_id = TransactionId::new();
    m.write_header();
    m.add(ATTR_XORMAPPED_ADDRESS, &[0x00, 0x01]);

    let mut got = XorMappedAddress::default();
    let err = got.get_from(&m).expect_err("expected error, but got ok");
    assert_eq!(err, Error::ErrUnexpectedEof);
}
