//! ClientHello message (RFC 5246 Section 7.4.1.2).

use bytes::{Buf, BufMut, BytesMut};

use crate::codec;
use crate::error::{Error, Result};
use crate::messages::extensions::Extensions;
use crate::protocol::ProtocolVersion;

/// ClientHello message.
///
/// ```text
/// struct {
///     ProtocolVersion client_version;
///     Random random;
///     SessionID session_id<0..32>;
///     CipherSuite cipher_suites<2..2^16-2>;
///     CompressionMethod compression_methods<1..2^8-1>;
///     select (extensions_present) {
///         case false: struct {};
///         case true:  Extension extensions<0..2^16-1>;
///     };
/// } ClientHello;
/// ```
///
/// Cipher suites stay raw u16s: the offer may legitimately contain codes
/// this engine does not recognize.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientHello {
    /// Highest version the client supports.
    pub client_version: ProtocolVersion,

    /// Client random (gmt_unix_time + 28 random bytes).
    pub random: [u8; 32],

    /// Proposed session id (empty for a fresh session).
    pub session_id: Vec<u8>,

    /// Offered cipher suites, preference-ordered, raw codes.
    pub cipher_suites: Vec<u16>,

    /// Offered compression methods.
    pub compression_methods: Vec<u8>,

    /// Extensions.
    pub extensions: Extensions,
}

impl ClientHello {
    /// Create a ClientHello offering the given suites with null
    /// compression.
    pub fn new(random: [u8; 32], cipher_suites: Vec<u16>) -> Self {
        Self {
            client_version: ProtocolVersion::Tls12,
            random,
            session_id: Vec::new(),
            cipher_suites,
            compression_methods: vec![0],
            extensions: Extensions::new(),
        }
    }

    /// Set the proposed session id.
    pub fn with_session_id(mut self, session_id: Vec<u8>) -> Self {
        self.session_id = session_id;
        self
    }

    /// Set the extensions.
    pub fn with_extensions(mut self, extensions: Extensions) -> Self {
        self.extensions = extensions;
        self
    }

    /// Encode the message body.
    pub fn encode(&self) -> Result<Vec<u8>> {
        if self.session_id.len() > 32 {
            return Err(Error::InvalidMessage("session id longer than 32".into()));
        }
        if self.cipher_suites.is_empty() {
            return Err(Error::InvalidMessage("no cipher suites offered".into()));
        }
        if self.compression_methods.is_empty() {
            return Err(Error::InvalidMessage("no compression methods".into()));
        }

        let mut buf = BytesMut::new();
        buf.put_u16(self.client_version.to_u16());
        buf.put_slice(&self.random);
        codec::put_vec_u8(&mut buf, &self.session_id)?;

        let mut suites = BytesMut::with_capacity(self.cipher_suites.len() * 2);
        for suite in &self.cipher_suites {
            suites.put_u16(*suite);
        }
        codec::put_vec_u16(&mut buf, &suites)?;

        codec::put_vec_u8(&mut buf, &self.compression_methods)?;
        self.extensions.encode(&mut buf)?;
        Ok(buf.to_vec())
    }

    /// Decode a message body.
    pub fn decode(mut data: &[u8]) -> Result<Self> {
        if data.remaining() < 34 {
            return Err(Error::InvalidMessage("ClientHello too short".into()));
        }

        let version_raw = data.get_u16();
        let client_version = ProtocolVersion::from_u16(version_raw)
            .ok_or(Error::UnsupportedVersion(version_raw))?;

        let mut random = [0u8; 32];
        data.copy_to_slice(&mut random);

        let session_id = codec::get_vec_u8(&mut data)?;
        if session_id.len() > 32 {
            return Err(Error::InvalidMessage("session id longer than 32".into()));
        }

        let suites_raw = codec::get_vec_u16(&mut data)?;
        if suites_raw.is_empty() || suites_raw.len() % 2 != 0 {
            return Err(Error::InvalidMessage("malformed cipher suite list".into()));
        }
        let cipher_suites = suites_raw
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();

        let compression_methods = codec::get_vec_u8(&mut data)?;
        if compression_methods.is_empty() {
            return Err(Error::InvalidMessage("empty compression list".into()));
        }

        let extensions = Extensions::decode(&mut data)?;

        Ok(Self {
            client_version,
            random,
            session_id,
            cipher_suites,
            compression_methods,
            extensions,
        })
    }
}
