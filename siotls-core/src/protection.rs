//! Record protection: MAC-then-encrypt, per direction.
//!
//! Each connection direction owns one `RecordProtection`. Before the first
//! ChangeCipherSpec it is the identity transform; afterwards it applies the
//! negotiated suite's construction (RFC 5246 Section 6.2.3):
//!
//! - **GenericStreamCipher** (RC4, NULL): `cipher(fragment || MAC)`
//! - **GenericBlockCipher** (AES/3DES CBC):
//!   `IV || cipher(fragment || MAC || padding || padding_length)` with a
//!   fresh random explicit IV per record
//!
//! The MAC covers `seq || type || version || length || fragment`. The
//! sequence number increments for every record transited, successful or
//! not, and resets to zero when a ChangeCipherSpec activates new keys.

use siotls_crypto::{BulkCipher as BulkCipherObj, CryptoProvider, HashAlgorithm};
use zeroize::Zeroizing;

use crate::cipher_suites::{BulkCipher, CipherType};
use crate::error::{Error, Result};
use crate::params::{ConnectionEnd, KeyBlock, SecurityParameters};
use crate::protocol::{ContentType, ProtocolVersion};
use crate::record::MAX_FRAGMENT_SIZE;

/// Protection state for one direction of a connection.
pub struct RecordProtection {
    active: Option<ActiveProtection>,
    sequence_number: u64,
}

impl std::fmt::Debug for RecordProtection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordProtection")
            .field("active", &self.active.is_some())
            .field("sequence_number", &self.sequence_number)
            .finish()
    }
}

struct ActiveProtection {
    cipher_type: CipherType,
    cipher: Option<Box<dyn BulkCipherObj>>,
    mac_hash: Option<HashAlgorithm>,
    mac_key: Zeroizing<Vec<u8>>,
    mac_length: usize,
    record_iv_length: usize,
    block_length: usize,
}

impl Default for RecordProtection {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordProtection {
    /// Create protection in the initial (identity) epoch.
    pub fn new() -> Self {
        Self {
            active: None,
            sequence_number: 0,
        }
    }

    /// Current sequence number for this direction.
    pub fn sequence_number(&self) -> u64 {
        self.sequence_number
    }

    /// Whether a cipher spec has been applied to this direction.
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Apply a ChangeCipherSpec: install the keys the given endpoint writes
    /// with and reset the sequence number.
    ///
    /// A NULL bulk cipher keeps this direction on the identity transform;
    /// only the epoch (and with it the sequence counter) changes.
    pub fn activate(
        &mut self,
        provider: &dyn CryptoProvider,
        params: &SecurityParameters,
        key_block: &KeyBlock,
        writer: ConnectionEnd,
    ) -> Result<()> {
        let (mac_key, enc_key) = key_block.write_keys(writer);

        let active = match params.bulk_cipher {
            BulkCipher::Null => ActiveProtection {
                cipher_type: CipherType::Stream,
                cipher: None,
                mac_hash: None,
                mac_key: Zeroizing::new(Vec::new()),
                mac_length: 0,
                record_iv_length: 0,
                block_length: 0,
            },
            BulkCipher::Cipher(algorithm) => ActiveProtection {
                cipher_type: params.cipher_type,
                cipher: Some(provider.cipher(algorithm, enc_key)?),
                mac_hash: params.mac_algorithm.hash_algorithm(),
                mac_key: Zeroizing::new(mac_key.to_vec()),
                mac_length: params.mac_length,
                record_iv_length: params.record_iv_length,
                block_length: params.block_length,
            },
        };

        self.active = Some(active);
        self.sequence_number = 0;
        Ok(())
    }

    /// Protect an outbound fragment, yielding the record payload.
    pub fn encode(
        &mut self,
        provider: &dyn CryptoProvider,
        content_type: ContentType,
        version: ProtocolVersion,
        fragment: &[u8],
    ) -> Result<Vec<u8>> {
        if fragment.len() > MAX_FRAGMENT_SIZE {
            return Err(Error::RecordOverflow);
        }

        let seq = self.sequence_number;
        self.sequence_number = self.sequence_number.wrapping_add(1);

        let state = match &mut self.active {
            None => return Ok(fragment.to_vec()),
            Some(state) => state,
        };

        let mac = state.compute_mac(provider, seq, content_type, version, fragment)?;

        match state.cipher_type {
            CipherType::Stream => {
                let mut data = Vec::with_capacity(fragment.len() + mac.len());
                data.extend_from_slice(fragment);
                data.extend_from_slice(&mac);
                match &mut state.cipher {
                    None => Ok(data),
                    Some(cipher) => Ok(cipher.encrypt(&[], &data)?),
                }
            }
            CipherType::Block => {
                let block = state.block_length;
                let mut data = Vec::with_capacity(fragment.len() + mac.len() + block);
                data.extend_from_slice(fragment);
                data.extend_from_slice(&mac);

                // padding_length bytes of value padding_length, then the
                // padding_length byte itself; total to a block multiple
                let padding_length = (block - (data.len() + 1) % block) % block;
                data.resize(data.len() + padding_length + 1, padding_length as u8);

                let iv = provider.random().generate(state.record_iv_length)?;
                let cipher = state
                    .cipher
                    .as_mut()
                    .ok_or_else(|| Error::InternalError("block suite without cipher".into()))?;
                let ciphertext = cipher.encrypt(&iv, &data)?;

                let mut payload = Vec::with_capacity(iv.len() + ciphertext.len());
                payload.extend_from_slice(&iv);
                payload.extend_from_slice(&ciphertext);
                Ok(payload)
            }
        }
    }

    /// Unprotect an inbound record payload, yielding the plaintext
    /// fragment.
    ///
    /// The sequence number is consumed and incremented whether or not
    /// verification succeeds.
    pub fn decode(
        &mut self,
        provider: &dyn CryptoProvider,
        content_type: ContentType,
        version: ProtocolVersion,
        payload: &[u8],
    ) -> Result<Vec<u8>> {
        let seq = self.sequence_number;
        self.sequence_number = self.sequence_number.wrapping_add(1);

        let state = match &mut self.active {
            None => {
                if payload.len() > MAX_FRAGMENT_SIZE {
                    return Err(Error::RecordOverflow);
                }
                return Ok(payload.to_vec());
            }
            Some(state) => state,
        };

        let data = match state.cipher_type {
            CipherType::Stream => match &mut state.cipher {
                None => payload.to_vec(),
                Some(cipher) => cipher.decrypt(&[], payload)?,
            },
            CipherType::Block => {
                let block = state.block_length;
                let iv_len = state.record_iv_length;
                if payload.len() < iv_len + block || (payload.len() - iv_len) % block != 0 {
                    return Err(Error::BadRecordMac);
                }
                let (iv, ciphertext) = payload.split_at(iv_len);
                let cipher = state
                    .cipher
                    .as_mut()
                    .ok_or_else(|| Error::InternalError("block suite without cipher".into()))?;
                let mut data = cipher
                    .decrypt(iv, ciphertext)
                    .map_err(|_| Error::BadRecordMac)?;

                // strip and verify padding
                let padding_length = *data.last().ok_or(Error::BadRecordMac)? as usize;
                if padding_length + 1 > data.len() {
                    return Err(Error::BadRecordMac);
                }
                let body_len = data.len() - padding_length - 1;
                if data[body_len..data.len() - 1]
                    .iter()
                    .any(|&b| b as usize != padding_length)
                {
                    return Err(Error::BadRecordMac);
                }
                data.truncate(body_len);
                data
            }
        };

        if data.len() < state.mac_length {
            return Err(Error::BadRecordMac);
        }
        let fragment_len = data.len() - state.mac_length;
        let (fragment, received_mac) = data.split_at(fragment_len);

        if fragment.len() > MAX_FRAGMENT_SIZE {
            return Err(Error::RecordOverflow);
        }

        if state.mac_length > 0 {
            use subtle::ConstantTimeEq;
            let expected = state.compute_mac(provider, seq, content_type, version, fragment)?;
            if expected.len() != received_mac.len()
                || !bool::from(expected.ct_eq(received_mac))
            {
                return Err(Error::BadRecordMac);
            }
        }

        Ok(fragment.to_vec())
    }
}

impl ActiveProtection {
    /// MAC input: seq (8) || type (1) || version (2) || length (2) ||
    /// fragment.
    fn compute_mac(
        &self,
        provider: &dyn CryptoProvider,
        seq: u64,
        content_type: ContentType,
        version: ProtocolVersion,
        fragment: &[u8],
    ) -> Result<Vec<u8>> {
        let hash = match self.mac_hash {
            None => return Ok(Vec::new()),
            Some(hash) => hash,
        };

        let mut mac = provider.hmac(hash, &self.mac_key)?;
        mac.update(&seq.to_be_bytes());
        mac.update(&[content_type.to_u8()]);
        mac.update(&version.to_u16().to_be_bytes());
        mac.update(&(fragment.len() as u16).to_be_bytes());
        mac.update(fragment);
        Ok(mac.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cipher_suites::CipherSuite;
    use crate::prf;
    use siotls_crypto_rustcrypto::RustCryptoProvider;

    fn activated_pair(suite: CipherSuite) -> (RecordProtection, RecordProtection) {
        let provider = RustCryptoProvider::new();
        let params = SecurityParameters::new(
            ConnectionEnd::Client,
            suite,
            Zeroizing::new(vec![7u8; 48]),
            [1u8; 32],
            [2u8; 32],
        );
        let raw = prf::compute_key_block(
            &provider,
            &params.master_secret,
            &params.server_random,
            &params.client_random,
            suite.key_block_length(),
        )
        .unwrap();
        let key_block = KeyBlock::split(suite, &raw).unwrap();

        let mut writer = RecordProtection::new();
        writer
            .activate(&provider, &params, &key_block, ConnectionEnd::Client)
            .unwrap();
        let mut reader = RecordProtection::new();
        reader
            .activate(&provider, &params, &key_block, ConnectionEnd::Client)
            .unwrap();
        (writer, reader)
    }

    #[test]
    fn test_initial_epoch_is_identity() {
        let provider = RustCryptoProvider::new();
        let mut protection = RecordProtection::new();
        let out = protection
            .encode(
                &provider,
                ContentType::Handshake,
                ProtocolVersion::Tls12,
                b"hello",
            )
            .unwrap();
        assert_eq!(out, b"hello");
        assert_eq!(protection.sequence_number(), 1);

        let back = protection
            .decode(
                &provider,
                ContentType::Handshake,
                ProtocolVersion::Tls12,
                b"hello",
            )
            .unwrap();
        assert_eq!(back, b"hello");
        assert_eq!(protection.sequence_number(), 2);
    }

    #[test]
    fn test_activate_resets_sequence() {
        let (mut writer, _) = activated_pair(CipherSuite::RsaWithAes128CbcSha);
        assert_eq!(writer.sequence_number(), 0);
        assert!(writer.is_active());

        let provider = RustCryptoProvider::new();
        writer
            .encode(
                &provider,
                ContentType::ApplicationData,
                ProtocolVersion::Tls12,
                b"x",
            )
            .unwrap();
        assert_eq!(writer.sequence_number(), 1);
    }

    #[test]
    fn test_cbc_roundtrip_and_wire_size() {
        let provider = RustCryptoProvider::new();
        let (mut writer, mut reader) = activated_pair(CipherSuite::RsaWithAes128CbcSha);

        let payload = writer
            .encode(
                &provider,
                ContentType::ApplicationData,
                ProtocolVersion::Tls12,
                &[0x42],
            )
            .unwrap();
        // 16 IV + (1 data + 20 MAC + 11 padding) = 48
        assert_eq!(payload.len(), 48);

        let plaintext = reader
            .decode(
                &provider,
                ContentType::ApplicationData,
                ProtocolVersion::Tls12,
                &payload,
            )
            .unwrap();
        assert_eq!(plaintext, [0x42]);
    }

    #[test]
    fn test_null_suite_stays_identity() {
        let provider = RustCryptoProvider::new();
        let (mut writer, mut reader) = activated_pair(CipherSuite::RsaWithNullSha);

        // the NULL bulk cipher never leaves the identity transform; the
        // epoch switch only resets the counters
        let payload = writer
            .encode(
                &provider,
                ContentType::ApplicationData,
                ProtocolVersion::Tls12,
                b"ping\n",
            )
            .unwrap();
        assert_eq!(payload, b"ping\n");
        assert_eq!(writer.sequence_number(), 1);

        let plaintext = reader
            .decode(
                &provider,
                ContentType::ApplicationData,
                ProtocolVersion::Tls12,
                &payload,
            )
            .unwrap();
        assert_eq!(plaintext, b"ping\n");
    }

    #[test]
    fn test_tampered_record_fails_mac() {
        let provider = RustCryptoProvider::new();
        let (mut writer, mut reader) = activated_pair(CipherSuite::RsaWithAes128CbcSha);

        let mut payload = writer
            .encode(
                &provider,
                ContentType::ApplicationData,
                ProtocolVersion::Tls12,
                b"secret",
            )
            .unwrap();
        let last = payload.len() - 1;
        payload[last] ^= 0x01;

        let result = reader.decode(
            &provider,
            ContentType::ApplicationData,
            ProtocolVersion::Tls12,
            &payload,
        );
        assert_eq!(result, Err(Error::BadRecordMac));
        // sequence was still consumed
        assert_eq!(reader.sequence_number(), 1);
    }

    #[test]
    fn test_wrong_sequence_fails_mac() {
        let provider = RustCryptoProvider::new();
        let (mut writer, mut reader) = activated_pair(CipherSuite::RsaWithRc4128Sha);

        let first = writer
            .encode(
                &provider,
                ContentType::ApplicationData,
                ProtocolVersion::Tls12,
                b"a",
            )
            .unwrap();
        // replaying record 0 as record 1 must fail
        reader
            .decode(
                &provider,
                ContentType::ApplicationData,
                ProtocolVersion::Tls12,
                &first,
            )
            .unwrap();
        let result = reader.decode(
            &provider,
            ContentType::ApplicationData,
            ProtocolVersion::Tls12,
            &first,
        );
        assert_eq!(result, Err(Error::BadRecordMac));
    }

    #[test]
    fn test_rc4_roundtrip_across_records() {
        let provider = RustCryptoProvider::new();
        let (mut writer, mut reader) = activated_pair(CipherSuite::RsaWithRc4128Sha);

        for msg in [&b"first"[..], &b"second"[..], &b""[..]] {
            let payload = writer
                .encode(
                    &provider,
                    ContentType::ApplicationData,
                    ProtocolVersion::Tls12,
                    msg,
                )
                .unwrap();
            let plaintext = reader
                .decode(
                    &provider,
                    ContentType::ApplicationData,
                    ProtocolVersion::Tls12,
                    &payload,
                )
                .unwrap();
            assert_eq!(plaintext, msg);
        }
    }

    #[test]
    fn test_oversize_fragment_rejected() {
        let provider = RustCryptoProvider::new();
        let mut protection = RecordProtection::new();
        let big = vec![0u8; MAX_FRAGMENT_SIZE + 1];
        assert_eq!(
            protection.encode(
                &provider,
                ContentType::ApplicationData,
                ProtocolVersion::Tls12,
                &big
            ),
            Err(Error::RecordOverflow)
        );
    }
}
