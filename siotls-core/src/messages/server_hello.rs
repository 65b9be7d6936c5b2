//! ServerHello message (RFC 5246 Section 7.4.1.3).

use bytes::{Buf, BufMut, BytesMut};

use crate::codec;
use crate::error::{Error, Result};
use crate::messages::extensions::Extensions;
use crate::protocol::ProtocolVersion;

/// ServerHello message.
///
/// ```text
/// struct {
///     ProtocolVersion server_version;
///     Random random;
///     SessionID session_id<0..32>;
///     CipherSuite cipher_suite;
///     CompressionMethod compression_method;
///     select (extensions_present) { ... };
/// } ServerHello;
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerHello {
    /// Negotiated version.
    pub server_version: ProtocolVersion,

    /// Server random.
    pub random: [u8; 32],

    /// Session id: echoed for resumption, fresh otherwise.
    pub session_id: Vec<u8>,

    /// Selected cipher suite (raw code).
    pub cipher_suite: u16,

    /// Selected compression method.
    pub compression_method: u8,

    /// Extensions (never produced by this engine, tolerated on decode).
    pub extensions: Extensions,
}

impl ServerHello {
    /// Create a ServerHello for the selected suite.
    pub fn new(random: [u8; 32], session_id: Vec<u8>, cipher_suite: u16) -> Self {
        Self {
            server_version: ProtocolVersion::Tls12,
            random,
            session_id,
            cipher_suite,
            compression_method: 0,
            extensions: Extensions::new(),
        }
    }

    /// Encode the message body.
    pub fn encode(&self) -> Result<Vec<u8>> {
        if self.session_id.len() > 32 {
            return Err(Error::InvalidMessage("session id longer than 32".into()));
        }

        let mut buf = BytesMut::new();
        buf.put_u16(self.server_version.to_u16());
        buf.put_slice(&self.random);
        codec::put_vec_u8(&mut buf, &self.session_id)?;
        buf.put_u16(self.cipher_suite);
        buf.put_u8(self.compression_method);
        self.extensions.encode(&mut buf)?;
        Ok(buf.to_vec())
    }

    /// Decode a message body.
    pub fn decode(mut data: &[u8]) -> Result<Self> {
        if data.remaining() < 38 {
            return Err(Error::InvalidMessage("ServerHello too short".into()));
        }

        let version_raw = data.get_u16();
        let server_version = ProtocolVersion::from_u16(version_raw)
            .ok_or(Error::UnsupportedVersion(version_raw))?;

        let mut random = [0u8; 32];
        data.copy_to_slice(&mut random);

        let session_id = codec::get_vec_u8(&mut data)?;
        if session_id.len() > 32 {
            return Err(Error::InvalidMessage("session id longer than 32".into()));
        }

        if data.remaining() < 3 {
            return Err(Error::InvalidMessage("ServerHello truncated".into()));
        }
        let cipher_suite = data.get_u16();
        let compression_method = data.get_u8();

        let extensions = Extensions::decode(&mut data)?;

        Ok(Self {
            server_version,
            random,
            session_id,
            cipher_suite,
            compression_method,
            extensions,
        })
    }
}
