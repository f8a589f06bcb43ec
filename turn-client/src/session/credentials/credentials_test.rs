use stun::integrity::MessageIntegrity;

use super::*;

#[test]
fn test_initial_requires_both_values() {
    assert_eq!(
        Credentials::initial(Some("alice".to_owned()), None),
        Credentials::None
    );
    assert_eq!(
        Credentials::initial(None, Some("s3cr3t".to_owned())),
        Credentials::None
    );
    assert_eq!(
        Credentials::initial(Some("alice".to_owned()), Some("s3cr3t".to_owned())),
        Credentials::LongTerm {
            username: "alice".to_owned(),
            secret: "s3cr3t".to_owned(),
        }
    );
}

#[test]
fn test_promote_long_term() {
    let c = Credentials::initial(Some("alice".to_owned()), Some("s3cr3t".to_owned()));
    let promoted = c
        .promote("example.org".to_owned(), "N1".to_owned())
        .expect("promote should succeed from LongTerm");

    assert_eq!(
        promoted,
        Credentials::Final {
            username: "alice".to_owned(),
            secret: "s3cr3t".to_owned(),
            realm: "example.org".to_owned(),
            nonce: "N1".to_owned(),
        }
    );
}

#[test]
fn test_re_promote_with_fresh_nonce() {
    let c = Credentials::Final {
        username: "alice".to_owned(),
        secret: "s3cr3t".to_owned(),
        realm: "example.org".to_owned(),
        nonce: "N1".to_owned(),
    };

    let promoted = c
        .promote("example.org".to_owned(), "N2".to_owned())
        .expect("re-challenge should succeed from Final");
    assert_eq!(promoted.nonce(), Some("N2"));
    assert_eq!(promoted.realm(), Some("example.org"));
}

#[test]
fn test_promote_without_configured_credentials() {
    assert!(Credentials::None
        .promote("example.org".to_owned(), "N1".to_owned())
        .is_none());
}

#[test]
fn test_only_final_signs() {
    assert!(Credentials::None.integrity().is_none());

    let long_term = Credentials::initial(Some("alice".to_owned()), Some("s3cr3t".to_owned()));
    assert!(long_term.integrity().is_none());

    let fin = long_term
        .promote("example.org".to_owned(), "N1".to_owned())
        .unwrap();
    assert_eq!(
        fin.integrity(),
        Some(MessageIntegrity::new_long_term_integrity(
            "alice".to_owned(),
            "example.org".to_owned(),
            "s3cr3t".to_owned(),
        ))
    );
}
