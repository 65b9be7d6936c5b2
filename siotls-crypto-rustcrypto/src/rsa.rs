//! RSAES-PKCS1-v1_5 key transport via the `rsa` crate.

use rand::rngs::OsRng;
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey};
use rsa::traits::PublicKeyParts;
use rsa::Pkcs1v15Encrypt;
use siotls_crypto::{Error, Result, RsaPrivateKey, RsaPublicKey};

/// Interpret a subjectPublicKeyInfo as an RSA public key.
pub fn public_key_from_spki(spki_der: &[u8]) -> Result<Box<dyn RsaPublicKey>> {
    let key = rsa::RsaPublicKey::from_public_key_der(spki_der)
        .map_err(|e| Error::InvalidKey(format!("not an RSA subject key: {}", e)))?;
    Ok(Box::new(PublicKey(key)))
}

/// Load an RSA private key from DER, trying PKCS#8 first and bare PKCS#1
/// second.
pub fn private_key_from_der(key_der: &[u8]) -> Result<Box<dyn RsaPrivateKey>> {
    let key = rsa::RsaPrivateKey::from_pkcs8_der(key_der)
        .or_else(|_| rsa::RsaPrivateKey::from_pkcs1_der(key_der))
        .map_err(|e| Error::InvalidKey(format!("not an RSA private key: {}", e)))?;
    Ok(Box::new(PrivateKey(key)))
}

struct PublicKey(rsa::RsaPublicKey);

impl RsaPublicKey for PublicKey {
    fn encrypt_pkcs1(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        self.0
            .encrypt(&mut OsRng, Pkcs1v15Encrypt, plaintext)
            .map_err(|e| Error::CipherFailed(e.to_string()))
    }

    fn modulus_size(&self) -> usize {
        self.0.size()
    }
}

struct PrivateKey(rsa::RsaPrivateKey);

impl RsaPrivateKey for PrivateKey {
    fn decrypt_pkcs1(&self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        self.0
            .decrypt(Pkcs1v15Encrypt, ciphertext)
            .map_err(|e| Error::CipherFailed(e.to_string()))
    }
}
