//! TLS 1.2 PRF (RFC 5246 Section 5).
//!
//! PRF(secret, label, seed) = P_SHA256(secret, label + seed)
//!
//! Where P_hash is defined as:
//! P_hash(secret, seed) = HMAC_hash(secret, A(1) + seed) +
//!                        HMAC_hash(secret, A(2) + seed) + ...
//!
//! A(0) = seed
//! A(i) = HMAC_hash(secret, A(i-1))

use siotls_crypto::{CryptoProvider, HashAlgorithm};
use zeroize::Zeroizing;

use crate::error::{Error, Result};

/// Length of the master secret in bytes.
pub const MASTER_SECRET_LENGTH: usize = 48;

/// Length of Finished verify data in bytes.
pub const VERIFY_DATA_LENGTH: usize = 12;

/// Compute the TLS 1.2 PRF.
///
/// # Arguments
/// * `provider` - Crypto provider for HMAC operations
/// * `secret` - The secret key material
/// * `label` - ASCII label (e.g. "master secret", "key expansion")
/// * `seed` - Random seed data
/// * `output_len` - Desired output length in bytes (0 yields empty output)
pub fn prf(
    provider: &dyn CryptoProvider,
    secret: &[u8],
    label: &[u8],
    seed: &[u8],
    output_len: usize,
) -> Result<Vec<u8>> {
    let mut label_seed = Vec::with_capacity(label.len() + seed.len());
    label_seed.extend_from_slice(label);
    label_seed.extend_from_slice(seed);

    let hash_len = HashAlgorithm::Sha256.output_size();
    let mut output = Vec::with_capacity(output_len);

    // A(0) = label + seed
    let mut a = label_seed.clone();

    while output.len() < output_len {
        // A(i) = HMAC(secret, A(i-1))
        a = hmac(provider, secret, &[&a])?;

        // HMAC(secret, A(i) + label_seed)
        let chunk = hmac(provider, secret, &[&a, &label_seed])?;

        let remaining = output_len - output.len();
        if remaining >= hash_len {
            output.extend_from_slice(&chunk);
        } else {
            output.extend_from_slice(&chunk[..remaining]);
        }
    }

    Ok(output)
}

fn hmac(provider: &dyn CryptoProvider, key: &[u8], parts: &[&[u8]]) -> Result<Vec<u8>> {
    let mut mac = provider.hmac(HashAlgorithm::Sha256, key)?;
    for part in parts {
        mac.update(part);
    }
    Ok(mac.finalize())
}

/// Compute the master secret from a premaster secret.
///
/// master_secret = PRF(pre_master_secret, "master secret",
///                     ClientHello.random + ServerHello.random)[0..47]
pub fn compute_master_secret(
    provider: &dyn CryptoProvider,
    premaster_secret: &[u8],
    client_random: &[u8; 32],
    server_random: &[u8; 32],
) -> Result<Zeroizing<Vec<u8>>> {
    let mut seed = Vec::with_capacity(64);
    seed.extend_from_slice(client_random);
    seed.extend_from_slice(server_random);

    prf(
        provider,
        premaster_secret,
        b"master secret",
        &seed,
        MASTER_SECRET_LENGTH,
    )
    .map(Zeroizing::new)
}

/// Compute the key block from the master secret.
///
/// key_block = PRF(master_secret, "key expansion",
///                 server_random + client_random)
///
/// Note the seed order is reversed relative to master-secret derivation.
pub fn compute_key_block(
    provider: &dyn CryptoProvider,
    master_secret: &[u8],
    server_random: &[u8; 32],
    client_random: &[u8; 32],
    key_block_len: usize,
) -> Result<Zeroizing<Vec<u8>>> {
    if master_secret.len() != MASTER_SECRET_LENGTH {
        return Err(Error::InternalError(format!(
            "master secret must be {} bytes, got {}",
            MASTER_SECRET_LENGTH,
            master_secret.len()
        )));
    }

    let mut seed = Vec::with_capacity(64);
    seed.extend_from_slice(server_random);
    seed.extend_from_slice(client_random);

    prf(
        provider,
        master_secret,
        b"key expansion",
        &seed,
        key_block_len,
    )
    .map(Zeroizing::new)
}

/// Compute Finished verify data.
///
/// verify_data = PRF(master_secret, finished_label,
///                   Hash(handshake_messages))[0..11]
///
/// `finished_label` is "client finished" or "server finished".
pub fn compute_verify_data(
    provider: &dyn CryptoProvider,
    master_secret: &[u8],
    finished_label: &[u8],
    transcript_hash: &[u8],
) -> Result<Vec<u8>> {
    prf(
        provider,
        master_secret,
        finished_label,
        transcript_hash,
        VERIFY_DATA_LENGTH,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use siotls_crypto_rustcrypto::RustCryptoProvider;

    #[test]
    fn test_prf_output_lengths() {
        let provider = RustCryptoProvider::new();
        for len in [0, 1, 12, 31, 32, 33, 48, 72, 104, 256] {
            let out = prf(&provider, b"secret", b"label", b"seed", len).unwrap();
            assert_eq!(out.len(), len);
        }
    }

    #[test]
    fn test_prf_deterministic_and_sensitive() {
        let provider = RustCryptoProvider::new();

        let a = prf(&provider, b"secret", b"label", b"seed", 32).unwrap();
        let b = prf(&provider, b"secret", b"label", b"seed", 32).unwrap();
        assert_eq!(a, b);

        let c = prf(&provider, b"secret2", b"label", b"seed", 32).unwrap();
        assert_ne!(a, c);
        let d = prf(&provider, b"secret", b"label2", b"seed", 32).unwrap();
        assert_ne!(a, d);
    }

    #[test]
    fn test_prf_known_answer() {
        // Widely circulated P_SHA256 test vector:
        // secret = 9b be 43 6b a9 40 f0 17 b1 76 52 84 9a 71 db 35
        // seed   = a0 ba 9f 93 6c da 31 18 27 a6 f7 96 ff d5 19 8c
        // label  = "test label", output (100 bytes) begins e3 f2 29 ba 72 7b e1 7b
        let secret = [
            0x9b, 0xbe, 0x43, 0x6b, 0xa9, 0x40, 0xf0, 0x17, 0xb1, 0x76, 0x52, 0x84, 0x9a, 0x71,
            0xdb, 0x35,
        ];
        let seed = [
            0xa0, 0xba, 0x9f, 0x93, 0x6c, 0xda, 0x31, 0x18, 0x27, 0xa6, 0xf7, 0x96, 0xff, 0xd5,
            0x19, 0x8c,
        ];
        let provider = RustCryptoProvider::new();
        let out = prf(&provider, &secret, b"test label", &seed, 100).unwrap();
        assert_eq!(
            &out[..8],
            &[0xe3, 0xf2, 0x29, 0xba, 0x72, 0x7b, 0xe1, 0x7b]
        );
    }

    #[test]
    fn test_master_secret_length() {
        let provider = RustCryptoProvider::new();
        let master =
            compute_master_secret(&provider, &[3u8; 48], &[1u8; 32], &[2u8; 32]).unwrap();
        assert_eq!(master.len(), 48);
    }

    #[test]
    fn test_key_block_requires_master_length() {
        let provider = RustCryptoProvider::new();
        assert!(compute_key_block(&provider, &[0u8; 47], &[0u8; 32], &[0u8; 32], 72).is_err());
        let kb = compute_key_block(&provider, &[0u8; 48], &[0u8; 32], &[0u8; 32], 72).unwrap();
        assert_eq!(kb.len(), 72);
    }

    #[test]
    fn test_verify_data_is_12_bytes() {
        let provider = RustCryptoProvider::new();
        let vd =
            compute_verify_data(&provider, &[0u8; 48], b"client finished", &[0u8; 32]).unwrap();
        assert_eq!(vd.len(), 12);
    }

    #[test]
    fn test_seed_order_matters() {
        let provider = RustCryptoProvider::new();
        let cr = [1u8; 32];
        let sr = [2u8; 32];
        let master = compute_master_secret(&provider, &[3u8; 48], &cr, &sr).unwrap();
        let swapped = compute_master_secret(&provider, &[3u8; 48], &sr, &cr).unwrap();
        assert_ne!(*master, *swapped);
    }
}
