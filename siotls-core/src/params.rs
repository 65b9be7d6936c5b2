//! Security parameters and derived key material.

use zeroize::Zeroizing;

use crate::cipher_suites::{BulkCipher, CipherSuite, CipherType, MacAlgorithm};
use crate::error::{Error, Result};

/// Which end of the connection an endpoint is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionEnd {
    /// The endpoint that sent ClientHello.
    Client,

    /// The endpoint that answered with ServerHello.
    Server,
}

impl ConnectionEnd {
    /// The opposite end.
    pub const fn peer(self) -> Self {
        match self {
            ConnectionEnd::Client => ConnectionEnd::Server,
            ConnectionEnd::Server => ConnectionEnd::Client,
        }
    }
}

/// Negotiated security parameters for one connection (RFC 5246 Appendix
/// A.6), fixed once the handshake selects a cipher suite and both randoms
/// are known.
#[derive(Debug, Clone)]
pub struct SecurityParameters {
    /// This endpoint's role.
    pub entity: ConnectionEnd,

    /// The negotiated cipher suite.
    pub cipher_suite: CipherSuite,

    /// Bulk cipher of the suite.
    pub bulk_cipher: BulkCipher,

    /// Stream or block protection.
    pub cipher_type: CipherType,

    /// Encryption key length in bytes.
    pub enc_key_length: usize,

    /// Cipher block length in bytes (0 for stream/null).
    pub block_length: usize,

    /// Key-block derived IV length (0: TLS 1.2 uses explicit IVs).
    pub fixed_iv_length: usize,

    /// Per-record explicit IV length.
    pub record_iv_length: usize,

    /// Record MAC algorithm.
    pub mac_algorithm: MacAlgorithm,

    /// MAC tag length in bytes.
    pub mac_length: usize,

    /// MAC key length in bytes.
    pub mac_key_length: usize,

    /// Master secret (48 bytes).
    pub master_secret: Zeroizing<Vec<u8>>,

    /// ClientHello random (32 bytes).
    pub client_random: [u8; 32],

    /// ServerHello random (32 bytes).
    pub server_random: [u8; 32],
}

impl SecurityParameters {
    /// Assemble parameters from a negotiated suite, role, secrets and
    /// randoms.
    pub fn new(
        entity: ConnectionEnd,
        cipher_suite: CipherSuite,
        master_secret: Zeroizing<Vec<u8>>,
        client_random: [u8; 32],
        server_random: [u8; 32],
    ) -> Self {
        let bulk = cipher_suite.bulk_cipher();
        let mac = cipher_suite.mac();
        Self {
            entity,
            cipher_suite,
            bulk_cipher: bulk,
            cipher_type: cipher_suite.cipher_type(),
            enc_key_length: bulk.key_length(),
            block_length: bulk.block_length(),
            fixed_iv_length: bulk.fixed_iv_length(),
            record_iv_length: bulk.record_iv_length(),
            mac_algorithm: mac,
            mac_length: mac.mac_length(),
            mac_key_length: mac.key_length(),
            master_secret,
            client_random,
            server_random,
        }
    }
}

/// Key material derived from the key-expansion PRF, split in RFC 5246
/// Section 6.3 order.
#[derive(Debug)]
pub struct KeyBlock {
    /// MAC key for records the client writes.
    pub client_write_mac_key: Zeroizing<Vec<u8>>,

    /// MAC key for records the server writes.
    pub server_write_mac_key: Zeroizing<Vec<u8>>,

    /// Encryption key for records the client writes.
    pub client_write_enc_key: Zeroizing<Vec<u8>>,

    /// Encryption key for records the server writes.
    pub server_write_enc_key: Zeroizing<Vec<u8>>,

    /// Fixed IV share for the client direction (empty for explicit-IV and
    /// stream suites).
    pub client_write_iv: Zeroizing<Vec<u8>>,

    /// Fixed IV share for the server direction.
    pub server_write_iv: Zeroizing<Vec<u8>>,
}

impl KeyBlock {
    /// Split raw PRF output into the six shares.
    ///
    /// The input length must equal `suite.key_block_length()` exactly.
    pub fn split(suite: CipherSuite, key_block: &[u8]) -> Result<Self> {
        let mac_len = suite.mac().key_length();
        let enc_len = suite.bulk_cipher().key_length();
        let iv_len = suite.bulk_cipher().fixed_iv_length();

        let expected = 2 * mac_len + 2 * enc_len + 2 * iv_len;
        if key_block.len() != expected {
            return Err(Error::InternalError(format!(
                "key block of {} bytes, expected {}",
                key_block.len(),
                expected
            )));
        }

        let mut rest = key_block;
        let mut take = |n: usize| {
            let (head, tail) = rest.split_at(n);
            rest = tail;
            Zeroizing::new(head.to_vec())
        };

        Ok(Self {
            client_write_mac_key: take(mac_len),
            server_write_mac_key: take(mac_len),
            client_write_enc_key: take(enc_len),
            server_write_enc_key: take(enc_len),
            client_write_iv: take(iv_len),
            server_write_iv: take(iv_len),
        })
    }

    /// MAC and encryption keys for records written by `end`.
    pub fn write_keys(&self, end: ConnectionEnd) -> (&[u8], &[u8]) {
        match end {
            ConnectionEnd::Client => (&self.client_write_mac_key, &self.client_write_enc_key),
            ConnectionEnd::Server => (&self.server_write_mac_key, &self.server_write_enc_key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_block_split_order() {
        let suite = CipherSuite::RsaWithAes128CbcSha;
        // 20+20 MAC, 16+16 enc, 0 IVs
        let mut raw = Vec::new();
        raw.extend(std::iter::repeat(0xA1).take(20));
        raw.extend(std::iter::repeat(0xA2).take(20));
        raw.extend(std::iter::repeat(0xB1).take(16));
        raw.extend(std::iter::repeat(0xB2).take(16));

        let kb = KeyBlock::split(suite, &raw).unwrap();
        assert!(kb.client_write_mac_key.iter().all(|&b| b == 0xA1));
        assert!(kb.server_write_mac_key.iter().all(|&b| b == 0xA2));
        assert!(kb.client_write_enc_key.iter().all(|&b| b == 0xB1));
        assert!(kb.server_write_enc_key.iter().all(|&b| b == 0xB2));
        assert!(kb.client_write_iv.is_empty());
        assert!(kb.server_write_iv.is_empty());

        let (mac, enc) = kb.write_keys(ConnectionEnd::Client);
        assert_eq!(mac[0], 0xA1);
        assert_eq!(enc[0], 0xB1);
        let (mac, enc) = kb.write_keys(ConnectionEnd::Server);
        assert_eq!(mac[0], 0xA2);
        assert_eq!(enc[0], 0xB2);
    }

    #[test]
    fn test_key_block_length_enforced() {
        let suite = CipherSuite::RsaWithAes128CbcSha;
        assert!(KeyBlock::split(suite, &[0u8; 71]).is_err());
        assert!(KeyBlock::split(suite, &[0u8; 73]).is_err());
        assert!(KeyBlock::split(suite, &[0u8; 72]).is_ok());
    }

    #[test]
    fn test_security_parameters_from_suite() {
        let params = SecurityParameters::new(
            ConnectionEnd::Client,
            CipherSuite::RsaWithAes128CbcSha,
            Zeroizing::new(vec![0u8; 48]),
            [1u8; 32],
            [2u8; 32],
        );
        assert_eq!(params.enc_key_length, 16);
        assert_eq!(params.block_length, 16);
        assert_eq!(params.record_iv_length, 16);
        assert_eq!(params.fixed_iv_length, 0);
        assert_eq!(params.mac_length, 20);
        assert_eq!(params.entity.peer(), ConnectionEnd::Server);
    }
}
