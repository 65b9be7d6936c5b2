//! # siotls cryptographic provider interface
//!
//! This crate defines the cryptographic abstraction layer for the siotls
//! TLS 1.2 engine. The protocol core never touches a concrete algorithm;
//! everything it needs — hashing, HMAC, bulk record ciphers, RSA key
//! transport and randomness — is reached through the [`CryptoProvider`]
//! trait defined here, so backends are pluggable.
//!
//! ## Architecture
//!
//! ```text
//! CryptoProvider (main trait)
//! ├── Hash        (MD5, SHA-1, SHA-256)
//! ├── Hmac        (HMAC over any supported hash)
//! ├── BulkCipher  (AES-CBC, 3DES-CBC, RC4 record protection)
//! ├── RsaPublicKey / RsaPrivateKey (RSAES-PKCS1-v1_5 key transport)
//! └── Random      (CSPRNG)
//! ```
//!
//! A provider also knows how to extract the subjectPublicKeyInfo from a
//! DER-encoded X.509 certificate, because certificate decoding is a backend
//! concern, not a protocol one.

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    unused_qualifications,
    missing_debug_implementations
)]

pub mod cipher;
pub mod error;
pub mod hash;
pub mod hmac;
pub mod random;
pub mod rsa;

pub use cipher::{BulkCipher, CipherAlgorithm};
pub use error::{Error, Result};
pub use hash::{Hash, HashAlgorithm};
pub use hmac::Hmac;
pub use random::Random;
pub use rsa::{RsaPrivateKey, RsaPublicKey};

/// The main cryptographic provider trait.
///
/// Implementations provide every cryptographic operation the TLS 1.2 engine
/// needs. The trait is object-safe; the engine holds a `dyn CryptoProvider`
/// and asks it for boxed algorithm instances as the handshake progresses.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` so a single provider can back many
/// connections.
pub trait CryptoProvider: Send + Sync {
    /// Get the random number generator.
    fn random(&self) -> &dyn Random;

    /// Get a hash function instance.
    ///
    /// # Errors
    ///
    /// Returns an error if the algorithm is not supported by this backend.
    fn hash(&self, algorithm: HashAlgorithm) -> Result<Box<dyn Hash>>;

    /// Get a keyed HMAC instance over the given hash algorithm.
    ///
    /// # Errors
    ///
    /// Returns an error if the algorithm is not supported by this backend.
    fn hmac(&self, algorithm: HashAlgorithm, key: &[u8]) -> Result<Box<dyn Hmac>>;

    /// Get a keyed bulk cipher instance for record protection.
    ///
    /// Each connection direction gets its own instance: stream ciphers keep
    /// keystream state across records, so instances must not be shared.
    ///
    /// # Errors
    ///
    /// Returns an error if the algorithm is unsupported or the key length
    /// does not match the algorithm.
    fn cipher(&self, algorithm: CipherAlgorithm, key: &[u8]) -> Result<Box<dyn BulkCipher>>;

    /// Extract the RSA public key from a DER-encoded X.509 certificate.
    ///
    /// Parses the certificate structure far enough to locate the
    /// subjectPublicKeyInfo and interprets it as an RSA key.
    ///
    /// # Errors
    ///
    /// Returns an error on malformed DER or a non-RSA subject key.
    fn certificate_public_key(&self, certificate_der: &[u8]) -> Result<Box<dyn RsaPublicKey>>;

    /// Load an RSA private key from DER (PKCS#8, with PKCS#1 fallback).
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes do not decode as an RSA private key.
    fn rsa_private_key(&self, key_der: &[u8]) -> Result<Box<dyn RsaPrivateKey>>;
}
