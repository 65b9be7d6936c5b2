//! Handshake transcript for Finished verification.
//!
//! The transcript is the ordered concatenation of every handshake message
//! sent or received in the current handshake, each including its 4-byte
//! header. Its hash feeds the Finished verify-data PRF: an endpoint hashes
//! the transcript *without* its own Finished when sending, while the peer's
//! later verification *includes* it, so the hash is computed on demand at
//! the right moments rather than cached.

use siotls_crypto::{CryptoProvider, HashAlgorithm};

use crate::error::Result;

/// Ordered buffer of raw handshake messages.
#[derive(Debug, Clone, Default)]
pub struct HandshakeTranscript {
    messages: Vec<Vec<u8>>,
}

impl HandshakeTranscript {
    /// Create an empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a raw handshake message (header + body).
    pub fn update(&mut self, message: &[u8]) {
        self.messages.push(message.to_vec());
    }

    /// SHA-256 over the concatenated messages so far.
    pub fn hash(&self, provider: &dyn CryptoProvider) -> Result<Vec<u8>> {
        let mut hasher = provider.hash(HashAlgorithm::Sha256)?;
        for msg in &self.messages {
            hasher.update(msg);
        }
        Ok(hasher.finalize())
    }

    /// Number of messages recorded.
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// Whether nothing has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Forget everything (used when a resumption offer is abandoned).
    pub fn reset(&mut self) {
        self.messages.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use siotls_crypto_rustcrypto::RustCryptoProvider;

    #[test]
    fn test_hash_matches_concatenation() {
        let provider = RustCryptoProvider::new();

        let mut transcript = HandshakeTranscript::new();
        transcript.update(&[1, 0, 0, 1, 0xAA]);
        transcript.update(&[2, 0, 0, 2, 0xBB, 0xCC]);

        let mut hasher = provider.hash(HashAlgorithm::Sha256).unwrap();
        hasher.update(&[1, 0, 0, 1, 0xAA, 2, 0, 0, 2, 0xBB, 0xCC]);
        let expected = hasher.finalize();

        assert_eq!(transcript.hash(&provider).unwrap(), expected);
        assert_eq!(transcript.message_count(), 2);
    }

    #[test]
    fn test_hash_changes_with_each_message() {
        let provider = RustCryptoProvider::new();

        let mut transcript = HandshakeTranscript::new();
        transcript.update(b"first");
        let before = transcript.hash(&provider).unwrap();
        transcript.update(b"second");
        let after = transcript.hash(&provider).unwrap();
        assert_ne!(before, after);
    }

    #[test]
    fn test_reset() {
        let provider = RustCryptoProvider::new();
        let mut transcript = HandshakeTranscript::new();
        transcript.update(b"x");
        transcript.reset();
        assert!(transcript.is_empty());
        assert_eq!(
            transcript.hash(&provider).unwrap(),
            HandshakeTranscript::new().hash(&provider).unwrap()
        );
    }
}
