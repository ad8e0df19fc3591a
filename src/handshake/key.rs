//! Key exchange.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use sha1::{Digest, Sha1};

use super::GUID;

/// Generate a new `sec-websocket-key`, 16 random bytes in base64.
pub fn new_sec_key() -> String {
    let nonce: [u8; 16] = rand::random();
    STANDARD.encode(nonce)
}

/// Derive `sec-websocket-accept` from `sec-websocket-key`.
pub fn derive_accept_key(sec_key: &[u8]) -> String {
    let digest = Sha1::new().chain_update(sec_key).chain_update(GUID).finalize();
    STANDARD.encode(digest)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn sec_key() {
        let key = new_sec_key();
        assert_eq!(key.len(), 24);
        assert_eq!(STANDARD.decode(&key).unwrap().len(), 16);
        assert_ne!(key, new_sec_key());
    }

    #[test]
    fn accept_key() {
        assert_eq!(
            derive_accept_key(b"dGhlIHNhbXBsZSBub25jZQ=="),
            "s3pPLMBiTxaQ9kYGzzhZRbK+xOo="
        );
    }
}
