//! Bulk record ciphers via `aes`/`cbc`, `des` and `rc4`.

use aes::cipher::block_padding::NoPadding;
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use rc4::{KeyInit, Rc4, StreamCipher};
use siotls_crypto::{BulkCipher, CipherAlgorithm, Error, Result};
use zeroize::Zeroizing;

/// Create a keyed bulk cipher instance for one connection direction.
pub fn create_cipher(algorithm: CipherAlgorithm, key: &[u8]) -> Result<Box<dyn BulkCipher>> {
    if key.len() != algorithm.key_length() {
        return Err(Error::InvalidKey(format!(
            "{:?} needs a {}-byte key, got {}",
            algorithm,
            algorithm.key_length(),
            key.len()
        )));
    }

    match algorithm {
        CipherAlgorithm::Aes128Cbc | CipherAlgorithm::Aes256Cbc | CipherAlgorithm::TdesEdeCbc => {
            Ok(Box::new(CbcCipher {
                algorithm,
                key: Zeroizing::new(key.to_vec()),
            }))
        }
        CipherAlgorithm::Rc4_128 => {
            let state = Rc4::new_from_slice(key).map_err(|e| Error::InvalidKey(e.to_string()))?;
            Ok(Box::new(Rc4Cipher { state }))
        }
    }
}

type Aes128CbcEnc = cbc::Encryptor<aes::Aes128>;
type Aes128CbcDec = cbc::Decryptor<aes::Aes128>;
type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;
type TdesCbcEnc = cbc::Encryptor<des::TdesEde3>;
type TdesCbcDec = cbc::Decryptor<des::TdesEde3>;

/// CBC block cipher. Stateless between records; the IV arrives per call.
struct CbcCipher {
    algorithm: CipherAlgorithm,
    key: Zeroizing<Vec<u8>>,
}

impl CbcCipher {
    fn check_lengths(&self, iv: &[u8], data: &[u8]) -> Result<()> {
        let block = self.algorithm.block_length();
        if iv.len() != block {
            return Err(Error::InvalidInput(format!(
                "IV must be {} bytes, got {}",
                block,
                iv.len()
            )));
        }
        if data.len() % block != 0 {
            return Err(Error::InvalidInput(format!(
                "data length {} is not a multiple of the {}-byte block",
                data.len(),
                block
            )));
        }
        Ok(())
    }
}

impl BulkCipher for CbcCipher {
    fn encrypt(&mut self, iv: &[u8], data: &[u8]) -> Result<Vec<u8>> {
        self.check_lengths(iv, data)?;
        let bad_key = |e: aes::cipher::InvalidLength| Error::InvalidKey(e.to_string());
        let out = match self.algorithm {
            CipherAlgorithm::Aes128Cbc => Aes128CbcEnc::new_from_slices(&self.key, iv)
                .map_err(bad_key)?
                .encrypt_padded_vec_mut::<NoPadding>(data),
            CipherAlgorithm::Aes256Cbc => Aes256CbcEnc::new_from_slices(&self.key, iv)
                .map_err(bad_key)?
                .encrypt_padded_vec_mut::<NoPadding>(data),
            CipherAlgorithm::TdesEdeCbc => TdesCbcEnc::new_from_slices(&self.key, iv)
                .map_err(bad_key)?
                .encrypt_padded_vec_mut::<NoPadding>(data),
            CipherAlgorithm::Rc4_128 => unreachable!("RC4 is not a CBC cipher"),
        };
        Ok(out)
    }

    fn decrypt(&mut self, iv: &[u8], data: &[u8]) -> Result<Vec<u8>> {
        self.check_lengths(iv, data)?;
        let bad_key = |e: aes::cipher::InvalidLength| Error::InvalidKey(e.to_string());
        let out = match self.algorithm {
            CipherAlgorithm::Aes128Cbc => Aes128CbcDec::new_from_slices(&self.key, iv)
                .map_err(bad_key)?
                .decrypt_padded_vec_mut::<NoPadding>(data),
            CipherAlgorithm::Aes256Cbc => Aes256CbcDec::new_from_slices(&self.key, iv)
                .map_err(bad_key)?
                .decrypt_padded_vec_mut::<NoPadding>(data),
            CipherAlgorithm::TdesEdeCbc => TdesCbcDec::new_from_slices(&self.key, iv)
                .map_err(bad_key)?
                .decrypt_padded_vec_mut::<NoPadding>(data),
            CipherAlgorithm::Rc4_128 => unreachable!("RC4 is not a CBC cipher"),
        }
        .map_err(|e| Error::CipherFailed(e.to_string()))?;
        Ok(out)
    }

    fn algorithm(&self) -> CipherAlgorithm {
        self.algorithm
    }
}

/// RC4 stream cipher.
///
/// One instance serves one direction, which either encrypts or decrypts
/// exclusively; both operations advance the same keystream, preserving
/// continuity across records within an epoch.
struct Rc4Cipher {
    state: Rc4<rc4::consts::U16>,
}

impl Rc4Cipher {
    fn apply(&mut self, iv: &[u8], data: &[u8]) -> Result<Vec<u8>> {
        if !iv.is_empty() {
            return Err(Error::InvalidInput("RC4 takes no IV".into()));
        }
        let mut buf = data.to_vec();
        self.state.apply_keystream(&mut buf);
        Ok(buf)
    }
}

impl BulkCipher for Rc4Cipher {
    fn encrypt(&mut self, iv: &[u8], data: &[u8]) -> Result<Vec<u8>> {
        self.apply(iv, data)
    }

    fn decrypt(&mut self, iv: &[u8], data: &[u8]) -> Result<Vec<u8>> {
        self.apply(iv, data)
    }

    fn algorithm(&self) -> CipherAlgorithm {
        CipherAlgorithm::Rc4_128
    }
}
