//! HMAC implementations via the `hmac` crate.

use hmac::{Hmac as HmacGeneric, Mac};
use md5::Md5;
use sha1::Sha1;
use sha2::Sha256;
use siotls_crypto::{Error, HashAlgorithm, Hmac, Result};

type HmacMd5 = HmacGeneric<Md5>;
type HmacSha1 = HmacGeneric<Sha1>;
type HmacSha256 = HmacGeneric<Sha256>;

/// Create an HMAC instance for the given hash algorithm and key.
pub fn create_hmac(algorithm: HashAlgorithm, key: &[u8]) -> Result<Box<dyn Hmac>> {
    let invalid_key = |e: hmac::digest::InvalidLength| Error::InvalidKey(e.to_string());
    match algorithm {
        HashAlgorithm::Md5 => Ok(Box::new(Md5Impl(
            HmacMd5::new_from_slice(key).map_err(invalid_key)?,
        ))),
        HashAlgorithm::Sha1 => Ok(Box::new(Sha1Impl(
            HmacSha1::new_from_slice(key).map_err(invalid_key)?,
        ))),
        HashAlgorithm::Sha256 => Ok(Box::new(Sha256Impl(
            HmacSha256::new_from_slice(key).map_err(invalid_key)?,
        ))),
    }
}

struct Sha256Impl(HmacSha256);

impl Hmac for Sha256Impl {
    fn update(&mut self, data: &[u8]) {
        self.0.update(data);
    }

    fn finalize(self: Box<Self>) -> Vec<u8> {
        self.0.finalize().into_bytes().to_vec()
    }

    fn output_size(&self) -> usize {
        32
    }

    fn algorithm(&self) -> HashAlgorithm {
        HashAlgorithm::Sha256
    }
}

struct Sha1Impl(HmacSha1);

impl Hmac for Sha1Impl {
    fn update(&mut self, data: &[u8]) {
        self.0.update(data);
    }

    fn finalize(self: Box<Self>) -> Vec<u8> {
        self.0.finalize().into_bytes().to_vec()
    }

    fn output_size(&self) -> usize {
        20
    }

    fn algorithm(&self) -> HashAlgorithm {
        HashAlgorithm::Sha1
    }
}

struct Md5Impl(HmacMd5);

impl Hmac for Md5Impl {
    fn update(&mut self, data: &[u8]) {
        self.0.update(data);
    }

    fn finalize(self: Box<Self>) -> Vec<u8> {
        self.0.finalize().into_bytes().to_vec()
    }

    fn output_size(&self) -> usize {
        16
    }

    fn algorithm(&self) -> HashAlgorithm {
        HashAlgorithm::Md5
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hmac_sha256_rfc4231_case1() {
        // RFC 4231 test case 1
        let key = [0x0b; 20];
        let mut mac = create_hmac(HashAlgorithm::Sha256, &key).unwrap();
        mac.update(b"Hi There");
        let tag = mac.finalize();
        assert_eq!(tag[..4], [0xb0, 0x34, 0x4c, 0x61]);
    }

    #[test]
    fn test_hmac_verify_constant_time() {
        let key = b"0123456789abcdef";
        let mut mac = create_hmac(HashAlgorithm::Sha1, key).unwrap();
        mac.update(b"payload");
        let tag = mac.finalize();

        let mut mac = create_hmac(HashAlgorithm::Sha1, key).unwrap();
        mac.update(b"payload");
        assert!(mac.verify(&tag));

        let mut mac = create_hmac(HashAlgorithm::Sha1, key).unwrap();
        mac.update(b"payload");
        let mut bad = tag.clone();
        bad[0] ^= 1;
        assert!(!mac.verify(&bad));
    }
}
