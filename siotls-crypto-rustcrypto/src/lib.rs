//! # RustCrypto-backed provider for siotls
//!
//! Implements the [`siotls_crypto`] provider traits on top of the RustCrypto
//! crates: `sha2`/`sha1`/`md-5` for digests, `hmac` for record MACs and the
//! PRF, `aes`+`cbc`/`des`/`rc4` for bulk record ciphers, and `rsa` for the
//! RSAES-PKCS1-v1_5 key transport. Randomness comes from the operating
//! system via `rand::rngs::OsRng`.
//!
//! ## Example
//!
//! ```rust
//! use siotls_crypto::{CryptoProvider, HashAlgorithm};
//! use siotls_crypto_rustcrypto::RustCryptoProvider;
//!
//! let provider = RustCryptoProvider::new();
//! let mut hash = provider.hash(HashAlgorithm::Sha256).unwrap();
//! hash.update(b"abc");
//! assert_eq!(hash.finalize().len(), 32);
//! ```

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    unused_qualifications,
    missing_debug_implementations
)]

use siotls_crypto::{
    BulkCipher, CipherAlgorithm, CryptoProvider, Hash, HashAlgorithm, Hmac, Random, Result,
    RsaPrivateKey, RsaPublicKey,
};

pub mod cipher;
pub mod der;
pub mod hash;
pub mod hmac;
pub mod random;
pub mod rsa;

use random::OsRandom;

/// Cryptography provider backed by the RustCrypto crates.
///
/// # Thread Safety
///
/// The provider is `Send + Sync` and can be shared across any number of
/// connections.
#[derive(Debug, Default)]
pub struct RustCryptoProvider {
    random: OsRandom,
}

impl RustCryptoProvider {
    /// Create a new provider.
    pub fn new() -> Self {
        Self { random: OsRandom }
    }
}

impl CryptoProvider for RustCryptoProvider {
    fn random(&self) -> &dyn Random {
        &self.random
    }

    fn hash(&self, algorithm: HashAlgorithm) -> Result<Box<dyn Hash>> {
        hash::create_hash(algorithm)
    }

    fn hmac(&self, algorithm: HashAlgorithm, key: &[u8]) -> Result<Box<dyn Hmac>> {
        hmac::create_hmac(algorithm, key)
    }

    fn cipher(&self, algorithm: CipherAlgorithm, key: &[u8]) -> Result<Box<dyn BulkCipher>> {
        cipher::create_cipher(algorithm, key)
    }

    fn certificate_public_key(&self, certificate_der: &[u8]) -> Result<Box<dyn RsaPublicKey>> {
        let spki = der::subject_public_key_info(certificate_der)?;
        rsa::public_key_from_spki(spki)
    }

    fn rsa_private_key(&self, key_der: &[u8]) -> Result<Box<dyn RsaPrivateKey>> {
        rsa::private_key_from_der(key_der)
    }
}
