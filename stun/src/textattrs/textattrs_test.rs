use super::*;

#[test]
fn test_text_attribute_round_trip() -> Result<()> {
    let mut m = Message::new();
    let u = TextAttribute::new(ATTR_USERNAME, "alice".to_owned());
    u.add_to(&mut m)?;
    m.write_header();

    let mut decoded = Message::new();
    decoded.write(&m.raw)?;
    let got = TextAttribute::get_from_as(&decoded, ATTR_USERNAME)?;
    assert_eq!(got.text, "alice");

    Ok(())
}

#[test]
fn test_username_byte_limit() {
    let mut m = Message::new();
    let ok = TextAttribute::new(ATTR_USERNAME, "a".repeat(513));
    assert!(ok.add_to(&mut m).is_ok());

    let mut m = Message::new();
    let too_long = TextAttribute::new(ATTR_USERNAME, "a".repeat(514));
    let err = too_long
        .add_to(&mut m)
        .expect_err("expected error, but got ok");
    assert!(is_attr_size_overflow(&err));
}

#[test]
fn test_realm_character_limit() {
    // the realm limit counts characters, not bytes
    let mut m = Message::new();
    let multibyte = TextAttribute::new(ATTR_REALM, "ü".repeat(128));
    assert!(multibyte.add_to(&mut m).is_ok());

    let mut m = Message::new();
    let too_long = TextAttribute::new(ATTR_REALM, "a".repeat(129));
    let err = too_long
        .add_to(&mut m)
        .expect_err("expected error, but got ok");
    assert!(is_attr_size_overflow(&err));
}

#[test]
fn test_nonce_byte_limit() {
    let mut m = Message::new();
    let too_long = TextAttribute::new(ATTR_NONCE, "n".repeat(764));
    let err = too_long
        .add_to(&mut m)
        .expect_err("expected error, but got ok");
    assert!(is_attr_size_overflow(&err));
}

#[test]
fn test_get_from_missing() {
    let m = Message::new();
    let err = TextAttribute::get_from_as(&m, ATTR_REALM).expect_err("expected error, but got ok");
    assert_eq!(err, Error::ErrAttributeNotFound);
}

#[test]
fn test_get_from_bad_utf8() {
    let mut m = Message::new();
    m.add(ATTR_USERNAME, &[0xFF, 0xFE, 0xFD]);
    let result = TextAttribute::get_from_as(&m, ATTR_USERNAME);
    assert!(
        matches!(result, Err(Error::Utf8(_))),
        "expected utf8 error, got {result:?}"
    );
}
