//! Digest implementations via `sha2`, `sha1` and `md-5`.

use md5::Md5;
use sha1::Sha1;
use sha2::{Digest, Sha256};
use siotls_crypto::{Hash, HashAlgorithm, Result};

/// Create a hash instance for the given algorithm.
pub fn create_hash(algorithm: HashAlgorithm) -> Result<Box<dyn Hash>> {
    match algorithm {
        HashAlgorithm::Md5 => Ok(Box::new(Md5Hash(Md5::new()))),
        HashAlgorithm::Sha1 => Ok(Box::new(Sha1Hash(Sha1::new()))),
        HashAlgorithm::Sha256 => Ok(Box::new(Sha256Hash(Sha256::new()))),
    }
}

struct Sha256Hash(Sha256);

impl Hash for Sha256Hash {
    fn update(&mut self, data: &[u8]) {
        self.0.update(data);
    }

    fn finalize(self: Box<Self>) -> Vec<u8> {
        self.0.finalize().to_vec()
    }

    fn output_size(&self) -> usize {
        32
    }

    fn algorithm(&self) -> HashAlgorithm {
        HashAlgorithm::Sha256
    }
}

struct Sha1Hash(Sha1);

impl Hash for Sha1Hash {
    fn update(&mut self, data: &[u8]) {
        self.0.update(data);
    }

    fn finalize(self: Box<Self>) -> Vec<u8> {
        self.0.finalize().to_vec()
    }

    fn output_size(&self) -> usize {
        20
    }

    fn algorithm(&self) -> HashAlgorithm {
        HashAlgorithm::Sha1
    }
}

struct Md5Hash(Md5);

impl Hash for Md5Hash {
    fn update(&mut self, data: &[u8]) {
        self.0.update(data);
    }

    fn finalize(self: Box<Self>) -> Vec<u8> {
        self.0.finalize().to_vec()
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
    fn test_sha256_empty_vector() {
        // SHA-256("") from FIPS 180-4 validation data
        let hash = create_hash(HashAlgorithm::Sha256).unwrap();
        let digest = hash.finalize();
        assert_eq!(
            digest[..4],
            [0xe3, 0xb0, 0xc4, 0x42],
            "SHA-256 of empty input should start with e3b0c442"
        );
    }

    #[test]
    fn test_sha1_abc_vector() {
        // SHA-1("abc") = a9993e36...
        let mut hash = create_hash(HashAlgorithm::Sha1).unwrap();
        hash.update(b"abc");
        let digest = hash.finalize();
        assert_eq!(digest[..4], [0xa9, 0x99, 0x3e, 0x36]);
        assert_eq!(digest.len(), 20);
    }

    #[test]
    fn test_output_sizes() {
        assert_eq!(create_hash(HashAlgorithm::Md5).unwrap().output_size(), 16);
        assert_eq!(create_hash(HashAlgorithm::Sha1).unwrap().output_size(), 20);
        assert_eq!(
            create_hash(HashAlgorithm::Sha256).unwrap().output_size(),
            32
        );
    }
}
