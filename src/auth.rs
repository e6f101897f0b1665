//! Identity token verification.
//!
//! The credential service issues opaque bearer tokens of the form
//! `<userId>.<hex sha256(secret:userId)>`. This module only verifies
//! them; registration and credential storage live elsewhere.

use sha2::{Digest, Sha256};

fn signature(secret: &str, user_id: &str) -> String {
    hex::encode(Sha256::digest(format!("{secret}:{user_id}").as_bytes()))
}

/// Issues a token for `user_id`. Used by tests and operator tooling.
pub fn issue(secret: &str, user_id: &str) -> String {
    format!("{user_id}.{}", signature(secret, user_id))
}

/// Verifies a bearer token, returning the user id it names.
pub fn verify(secret: &str, token: &str) -> Option<String> {
    let (user_id, sig) = token.rsplit_once('.')?;
    if user_id.is_empty() {
        return None;
    }
    if sig == signature(secret, user_id) {
        Some(user_id.to_string())
    } else {
        None
    }
}
