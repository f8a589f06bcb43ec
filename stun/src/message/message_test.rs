use super::*;
use crate::textattrs::TextAttribute;

#[test]
fn test_message_type_value() {
    let tests = vec![
        (
            MessageType {
                method: METHOD_BINDING,
                class: CLASS_REQUEST,
            },
            0x0001,
        ),
        (
            MessageType {
                method: METHOD_BINDING,
                class: CLASS_SUCCESS_RESPONSE,
            },
            0x0101,
        ),
        (
            MessageType {
                method: METHOD_BINDING,
                class: CLASS_ERROR_RESPONSE,
            },
            0x0111,
        ),
        (
            MessageType {
                method: METHOD_BINDING,
                class: CLASS_INDICATION,
            },
            0x0011,
        ),
        (
            MessageType {
                method: METHOD_ALLOCATE,
                class: CLASS_REQUEST,
            },
            0x0003,
        ),
        (
            MessageType {
                method: METHOD_REFRESH,
                class: CLASS_REQUEST,
            },
            0x0004,
        ),
        (
            MessageType {
                method: METHOD_SEND,
                class: CLASS_INDICATION,
            },
            0x0016,
        ),
        (
            MessageType {
                method: METHOD_DATA,
                class: CLASS_INDICATION,
            },
            0x0017,
        ),
        (
            MessageType {
                method: METHOD_CREATE_PERMISSION,
                class: CLASS_REQUEST,
            },
            0x0008,
        ),
    ];

    for (input, output) in tests {
        assert_eq!(input.value(), output, "{input}: got 0x{:x}", input.value());

        let mut got = MessageType::default();
        got.read_value(output);
        assert_eq!(got, input, "ReadValue(0x{output:x}) = {got}, want {input}");
    }
}

#[test]
fn test_message_encode_decode() -> Result<()> {
    let mut m = Message::new();
    m.transaction_id = TransactionId([1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12]);
    m.set_type(MessageType::new(METHOD_ALLOCATE, CLASS_REQUEST));
    m.write_header();
    m.add(ATTR_NONCE, b"nonce value");
    m.add(ATTR_DATA, &[1, 2, 3]); // padded to 4 bytes on the wire

    let mut decoded = Message::new();
    decoded.write(&m.raw)?;

    assert_eq!(decoded, m, "decoded {decoded}, want {m}");
    assert_eq!(
        decoded.get(ATTR_DATA)?,
        vec![1, 2, 3],
        "padding must not leak into the value"
    );

    Ok(())
}

#[test]
fn test_message_decode_truncated_header() {
    let mut m = Message::new();
    let result = m.write(&[0, 1, 0, 0, 0x21]);
    assert_eq!(
        result.expect_err("expected error, but got ok"),
        Error::ErrUnexpectedHeaderEof,
    );
}

#[test]
fn test_message_decode_bad_magic_cookie() {
    let mut raw = vec![0u8; MESSAGE_HEADER_SIZE];
    raw[4..8].copy_from_slice(&0xdeadbeefu32.to_be_bytes());

    let mut m = Message::new();
    let result = m.write(&raw);
    assert_eq!(
        result.expect_err("expected error, but got ok"),
        Error::ErrBadMagicCookie(0xdeadbeef),
    );
}

#[test]
fn test_message_decode_length_overruns_buffer() {
    let mut m = Message::new();
    m.transaction_id = TransactionId::new();
    m.set_type(BINDING_REQUEST);
    m.write_header();
    m.length = 8; // pretend there are attributes we did not append
    m.write_length();

    let raw = m.raw.clone();
    let mut decoded = Message::new();
    let result = decoded.write(&raw);
    assert_eq!(
        result.expect_err("expected error, but got ok"),
        Error::ErrBadMessageLength,
    );
}

#[test]
fn test_message_decode_unaligned_length() {
    let mut m = Message::new();
    m.transaction_id = TransactionId::new();
    m.set_type(BINDING_REQUEST);
    m.write_header();
    m.length = 3;
    m.write_length();
    m.raw.extend_from_slice(&[0, 0, 0]);

    let raw = m.raw.clone();
    let mut decoded = Message::new();
    let result = decoded.write(&raw);
    assert_eq!(
        result.expect_err("expected error, but got ok"),
        Error::ErrBadPadding,
    );
}

#[test]
fn test_message_decode_unknown_required_attribute() {
    let mut m = Message::new();
    m.transaction_id = TransactionId::new();
    m.set_type(BINDING_REQUEST);
    m.write_header();
    m.add(AttrType(0x7F00), &[0, 0, 0, 0]);

    let raw = m.raw.clone();
    let mut decoded = Message::new();
    let result = decoded.write(&raw);
    assert_eq!(
        result.expect_err("expected error, but got ok"),
        Error::ErrUnknownRequiredAttribute(AttrType(0x7F00)),
    );
}

#[test]
fn test_message_decode_keeps_unknown_optional_attribute() -> Result<()> {
    let mut m = Message::new();
    m.transaction_id = TransactionId::new();
    m.set_type(BINDING_REQUEST);
    m.write_header();
    m.add(AttrType(0x8123), &[0xAB; 4]);
    m.add(ATTR_STUN_ID, b"id-bytes"); // vendor range is optional too

    let mut decoded = Message::new();
    decoded.write(&m.raw)?;

    assert!(decoded.contains(AttrType(0x8123)));
    assert_eq!(decoded.get(AttrType(0x8123))?, vec![0xAB; 4]);
    assert_eq!(decoded.get(ATTR_STUN_ID)?, b"id-bytes".to_vec());

    Ok(())
}

#[test]
fn test_message_build_and_parse() -> Result<()> {
    let id = TransactionId::new();
    let mut m = Message::new();
    m.build(&[
        Box::new(id),
        Box::new(BINDING_REQUEST),
        Box::new(TextAttribute::new(ATTR_SOFTWARE, "test agent".to_owned())),
    ])?;

    assert_eq!(m.transaction_id, id);
    assert_eq!(m.typ, BINDING_REQUEST);

    let mut decoded = Message::new();
    decoded.write(&m.raw)?;
    let mut getters = [TextAttribute {
        attr: ATTR_SOFTWARE,
        ..Default::default()
    }];
    decoded.parse(&mut getters)?;
    assert_eq!(getters[0].text, "test agent");

    Ok(())
}

#[test]
fn test_is_message() {
    let mut m = Message::new();
    m.transaction_id = TransactionId::new();
    m.set_type(BINDING_REQUEST);
    m.write_header();

    assert!(is_message(&m.raw));
    assert!(!is_message(&m.raw[..MESSAGE_HEADER_SIZE - 1]));
    assert!(!is_message(&[0u8; MESSAGE_HEADER_SIZE]));
}

#[test]
fn test_transaction_id_randomness() {
    // ids come from a CSPRNG; two draws colliding would be a bug
    let a = TransactionId::new();
    let b = TransactionId::new();
    assert_ne!(a, b);
}
