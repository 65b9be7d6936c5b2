//! Bulk cipher interface for record protection.

use crate::Result;

/// Bulk cipher algorithms of the supported TLS 1.2 cipher suites.
///
/// The NULL bulk cipher is not listed here: the engine simply performs no
/// encryption for it and never instantiates a cipher object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CipherAlgorithm {
    /// AES-128 in CBC mode
    Aes128Cbc,

    /// AES-256 in CBC mode
    Aes256Cbc,

    /// Triple-DES (EDE, three-key) in CBC mode
    TdesEdeCbc,

    /// RC4 with a 128-bit key
    Rc4_128,
}

impl CipherAlgorithm {
    /// Encryption key length in bytes.
    pub const fn key_length(self) -> usize {
        match self {
            CipherAlgorithm::Aes128Cbc => 16,
            CipherAlgorithm::Aes256Cbc => 32,
            CipherAlgorithm::TdesEdeCbc => 24,
            CipherAlgorithm::Rc4_128 => 16,
        }
    }

    /// Cipher block length in bytes; 0 for stream ciphers.
    pub const fn block_length(self) -> usize {
        match self {
            CipherAlgorithm::Aes128Cbc | CipherAlgorithm::Aes256Cbc => 16,
            CipherAlgorithm::TdesEdeCbc => 8,
            CipherAlgorithm::Rc4_128 => 0,
        }
    }

    /// Whether this is a stream cipher.
    pub const fn is_stream(self) -> bool {
        matches!(self, CipherAlgorithm::Rc4_128)
    }
}

/// A keyed bulk cipher bound to one connection direction.
///
/// Block-mode implementations are stateless between calls and take the IV
/// per record; stream implementations ignore `iv` and advance their
/// keystream, so one instance must serve a direction for a whole epoch.
pub trait BulkCipher: Send {
    /// Encrypt `data` and return the ciphertext.
    ///
    /// For CBC modes, `data` must be a multiple of the block length and `iv`
    /// one block long. For stream ciphers, `iv` must be empty.
    ///
    /// # Errors
    ///
    /// Returns an error on length violations.
    fn encrypt(&mut self, iv: &[u8], data: &[u8]) -> Result<Vec<u8>>;

    /// Decrypt `data` and return the plaintext.
    ///
    /// Same length requirements as [`BulkCipher::encrypt`].
    ///
    /// # Errors
    ///
    /// Returns an error on length violations.
    fn decrypt(&mut self, iv: &[u8], data: &[u8]) -> Result<Vec<u8>>;

    /// The algorithm this instance implements.
    fn algorithm(&self) -> CipherAlgorithm;
}
