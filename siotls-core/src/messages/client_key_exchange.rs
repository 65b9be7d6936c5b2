//! ClientKeyExchange message (RFC 5246 Section 7.4.7).
//!
//! For RSA key transport the body is the encrypted premaster secret behind
//! a u16 length prefix:
//!
//! ```text
//! struct {
//!     public-key-encrypted PreMasterSecret pre_master_secret;
//! } EncryptedPreMasterSecret;
//! ```

use bytes::{Buf, BytesMut};

use crate::codec;
use crate::error::{Error, Result};

/// ClientKeyExchange message for RSA key transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientKeyExchange {
    /// RSA-encrypted premaster secret.
    pub encrypted_premaster: Vec<u8>,
}

impl ClientKeyExchange {
    /// Create a ClientKeyExchange carrying the given ciphertext.
    pub fn new(encrypted_premaster: Vec<u8>) -> Self {
        Self {
            encrypted_premaster,
        }
    }

    /// Encode the message body.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut buf = BytesMut::new();
        codec::put_vec_u16(&mut buf, &self.encrypted_premaster)?;
        Ok(buf.to_vec())
    }

    /// Decode a message body.
    pub fn decode(mut data: &[u8]) -> Result<Self> {
        let encrypted_premaster = codec::get_vec_u16(&mut data)?;
        if data.has_remaining() {
            return Err(Error::InvalidMessage(
                "trailing bytes after encrypted premaster".into(),
            ));
        }
        if encrypted_premaster.is_empty() {
            return Err(Error::InvalidMessage("empty encrypted premaster".into()));
        }
        Ok(Self {
            encrypted_premaster,
        })
    }
}
