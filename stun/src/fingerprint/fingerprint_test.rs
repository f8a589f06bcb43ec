use super::*;
use crate::textattrs::TextAttribute;

#[test]
fn test_fingerprint_uses_crc_32() {
    assert_eq!(fingerprint_value(b"\x00\x01\x00\x00") ^ FINGERPRINT_XOR_VALUE, {
        let crc = Crc::<u32>::new(&CRC_32_ISO_HDLC);
        crc.checksum(b"\x00\x01\x00\x00")
    });
}

#[test]
fn test_add_to_and_check() -> Result<()> {
    let mut m = Message::new();
    m.transaction_id = TransactionId::new();
    m.set_type(BINDING_REQUEST);
    m.write_header();
    let a = TextAttribute::new(ATTR_SOFTWARE, "software".to_owned());
    a.add_to(&mut m)?;
    FINGERPRINT.add_to(&mut m)?;

    let mut decoded = Message::new();
    decoded.write(&m.raw)?;
    FINGERPRINT.check(&decoded)?;

    // corrupt the message body
    decoded.raw[MESSAGE_HEADER_SIZE + ATTRIBUTE_HEADER_SIZE] ^= 0x20;
    let err = FINGERPRINT
        .check(&decoded)
        .expect_err("expected error, but got ok");
    assert_eq!(err, Error::ErrFingerprintMismatch);

    Ok(())
}

#[test]
fn test_check_missing() {
    let mut m = Message::new();
    m.transaction_id = TransactionId::new();
    m.set_type(BINDING_REQUEST);
    m.write_header();

    let err = FINGERPRINT
        .check(&m)
        .expect_err("expected error, but got ok");
    assert_eq!(err, Error::ErrAttributeNotFound);
}

#[test]
fn test_fingerprint_must_be_last() -> Result<()> {
    let mut m = Message::new();
    m.transaction_id = TransactionId::new();
    m.set_type(BINDING_REQUEST);
    m.write_header();
    FINGERPRINT.add_to(&mut m)?;
    // an attribute sneaking in after the fingerprint invalidates it
    m.add(ATTR_SOFTWARE, b"late");

    let mut decoded = Message::new();
    decoded.write(&m.raw)?;
    let err = FINGERPRINT
        .check(&decoded)
        .expect_err("expected error, but got ok");
    assert_eq!(err, Error::ErrFingerprintNotLast);

    Ok(())
}
