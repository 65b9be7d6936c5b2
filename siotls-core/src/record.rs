//! TLS record framing.
//!
//! Every record on the wire is
//! `type:u8 | version:u16_be | length:u16_be | payload[length]`.
//! The inbound side works incrementally over a caller-owned buffer: a peek
//! that yields nothing means "need more bytes", never an error, so partial
//! reads are handled without copying.

use crate::error::{Error, Result};
use crate::protocol::{ContentType, ProtocolVersion};

/// Maximum plaintext fragment size (2^14).
pub const MAX_FRAGMENT_SIZE: usize = 16384;

/// Maximum protected payload size (2^14 + 2048).
pub const MAX_CIPHERTEXT_SIZE: usize = MAX_FRAGMENT_SIZE + 2048;

/// Record header size in bytes.
pub const RECORD_HEADER_SIZE: usize = 5;

/// A parsed record header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
    /// Record content type.
    pub content_type: ContentType,

    /// Record-layer protocol version.
    pub version: ProtocolVersion,

    /// Payload length.
    pub length: usize,
}

impl RecordHeader {
    /// Total wire size of the record this header describes.
    pub fn record_size(&self) -> usize {
        RECORD_HEADER_SIZE + self.length
    }
}

/// Try to parse a record header from the front of `data`.
///
/// Returns `Ok(None)` when fewer than five bytes are available. Unknown
/// content types, versions outside TLS 1.x and oversized payloads are
/// errors (mapping to the unexpected_message / protocol_version /
/// record_overflow alerts respectively).
pub fn peek_header(data: &[u8]) -> Result<Option<RecordHeader>> {
    if data.len() < RECORD_HEADER_SIZE {
        return Ok(None);
    }

    let version_raw = u16::from_be_bytes([data[1], data[2]]);
    let version = ProtocolVersion::from_u16(version_raw)
        .ok_or(Error::UnsupportedVersion(version_raw))?;

    let content_type = ContentType::from_u8(data[0]).ok_or_else(|| {
        Error::UnexpectedMessage(format!("unknown record content type {}", data[0]))
    })?;

    let length = u16::from_be_bytes([data[3], data[4]]) as usize;
    if length > MAX_CIPHERTEXT_SIZE {
        return Err(Error::RecordOverflow);
    }

    Ok(Some(RecordHeader {
        content_type,
        version,
        length,
    }))
}

/// Frame a protected payload into a complete record.
pub fn encode_record(
    content_type: ContentType,
    version: ProtocolVersion,
    payload: &[u8],
) -> Result<Vec<u8>> {
    if payload.len() > MAX_CIPHERTEXT_SIZE {
        return Err(Error::RecordOverflow);
    }

    let mut record = Vec::with_capacity(RECORD_HEADER_SIZE + payload.len());
    record.push(content_type.to_u8());
    record.extend_from_slice(&version.to_u16().to_be_bytes());
    record.extend_from_slice(&(payload.len() as u16).to_be_bytes());
    record.extend_from_slice(payload);
    Ok(record)
}
