#[cfg(test)]
mod credentials_test;

use stun::integrity::MessageIntegrity;

/// Long-term credential state of a session.
///
/// The variant is immutable and replaced wholesale when the server
/// challenges: a 401 (or 438) carrying REALM and NONCE promotes
/// `LongTerm` to `Final`. Only `Final` can sign messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    None,
    LongTerm {
        username: String,
        secret: String,
    },
    Final {
        username: String,
        secret: String,
        realm: String,
        nonce: String,
    },
}

impl Credentials {
    /// Builds the initial credential state from the configured values.
    pub fn initial(username: Option<String>, secret: Option<String>) -> Self {
        match (username, secret) {
            (Some(username), Some(secret)) => Credentials::LongTerm { username, secret },
            _ => Credentials::None,
        }
    }

    /// Promotes to `Final` with the challenge realm and nonce.
    ///
    /// Valid from `LongTerm`, and from `Final` on a re-challenge (the
    /// server handing out a fresh nonce). Returns `None` when no
    /// username/secret were configured.
    pub fn promote(&self, realm: String, nonce: String) -> Option<Credentials> {
        match self {
            Credentials::None => None,
            Credentials::LongTerm { username, secret }
            | Credentials::Final {
                username, secret, ..
            } => Some(Credentials::Final {
                username: username.clone(),
                secret: secret.clone(),
                realm,
                nonce,
            }),
        }
    }

    /// Returns the signing key, present only for `Final`.
    pub fn integrity(&self) -> Option<MessageIntegrity> {
        match self {
            Credentials::Final {
                username,
                secret,
                realm,
                ..
            } => Some(MessageIntegrity::new_long_term_integrity(
                username.clone(),
                realm.clone(),
                secret.clone(),
            )),
            _ => None,
        }
    }

    pub fn username(&self) -> Option<&str> {
        match self {
            Credentials::None => None,
            Credentials::LongTerm { username, .. } | Credentials::Final { username, .. } => {
                Some(username)
            }
        }
    }

    pub fn realm(&self) -> Option<&str> {
        match self {
            Credentials::Final { realm, .. } => Some(realm),
            _ => None,
        }
    }

    pub fn nonce(&self) -> Option<&str> {
        match self {
            Credentials::Final { nonce, .. } => Some(nonce),
            _ => None,
        }
    }
}
