//! RSA key transport interface.
//!
//! TLS 1.2 static-RSA key exchange needs exactly two asymmetric operations:
//! the client encrypts the premaster secret under the server certificate's
//! public key, and the server decrypts it with its private key. Both use
//! RSAES-PKCS1-v1_5.

use crate::Result;

/// An RSA public key, as extracted from a server certificate.
pub trait RsaPublicKey: Send {
    /// Encrypt `plaintext` with RSAES-PKCS1-v1_5.
    ///
    /// # Errors
    ///
    /// Returns an error if the plaintext is too long for the modulus or the
    /// backend fails.
    fn encrypt_pkcs1(&self, plaintext: &[u8]) -> Result<Vec<u8>>;

    /// Modulus size in bytes (the ciphertext length).
    fn modulus_size(&self) -> usize;
}

/// An RSA private key, loaded from DER by the provider.
pub trait RsaPrivateKey: Send {
    /// Decrypt `ciphertext` with RSAES-PKCS1-v1_5.
    ///
    /// # Errors
    ///
    /// Returns an error on malformed padding. Callers on the server side
    /// must not let this error influence observable behavior directly
    /// (Bleichenbacher); the TLS driver substitutes a random premaster.
    fn decrypt_pkcs1(&self, ciphertext: &[u8]) -> Result<Vec<u8>>;
}
