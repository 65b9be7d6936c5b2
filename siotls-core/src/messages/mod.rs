//! Handshake message codecs.
//!
//! Each handshake message on the wire is `type:u8 | length:u24_be | body`.
//! This module provides the header codec, the per-message body codecs, and
//! the reassembler that rebuilds messages from the handshake content-type
//! byte stream — messages may be split across records or share one, so
//! record boundaries mean nothing here.

pub mod certificate;
pub mod client_hello;
pub mod client_key_exchange;
pub mod extensions;
pub mod finished;
pub mod server_hello;
pub mod server_hello_done;

pub use certificate::Certificate;
pub use client_hello::ClientHello;
pub use client_key_exchange::ClientKeyExchange;
pub use extensions::{Extension, Extensions};
pub use finished::Finished;
pub use server_hello::ServerHello;
pub use server_hello_done::ServerHelloDone;

use crate::error::{Error, Result};
use crate::protocol::HandshakeType;
use crate::record::MAX_FRAGMENT_SIZE;

/// Handshake message header size (type + u24 length).
pub const HANDSHAKE_HEADER_SIZE: usize = 4;

/// Frame a message body with its handshake header.
pub fn encode_handshake(msg_type: HandshakeType, body: &[u8]) -> Result<Vec<u8>> {
    if body.len() > 0xFF_FFFF {
        return Err(Error::InvalidMessage(format!(
            "handshake body of {} bytes exceeds u24 length",
            body.len()
        )));
    }
    let mut msg = Vec::with_capacity(HANDSHAKE_HEADER_SIZE + body.len());
    msg.push(msg_type.to_u8());
    msg.extend_from_slice(&(body.len() as u32).to_be_bytes()[1..]);
    msg.extend_from_slice(body);
    Ok(msg)
}

/// A reassembled handshake message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandshakeMessage {
    /// Message type.
    pub msg_type: HandshakeType,

    /// Message body (without header).
    pub body: Vec<u8>,

    /// The complete raw message (header + body), as it must enter the
    /// transcript.
    pub raw: Vec<u8>,
}

/// Reassembles handshake messages from record fragments.
///
/// Fragments of the handshake content type are appended as they arrive;
/// complete messages are popped independently of how records carved up the
/// stream.
#[derive(Debug, Default)]
pub struct HandshakeReassembler {
    buffer: Vec<u8>,
}

impl HandshakeReassembler {
    /// Create an empty reassembler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record fragment of handshake content.
    pub fn push(&mut self, fragment: &[u8]) {
        self.buffer.extend_from_slice(fragment);
    }

    /// Pop the next complete message, if one is buffered.
    ///
    /// Unknown message types are an error: the engine recognizes the full
    /// TLS 1.2 static-RSA repertoire and anything else is unexpected.
    pub fn next_message(&mut self) -> Result<Option<HandshakeMessage>> {
        if self.buffer.len() < HANDSHAKE_HEADER_SIZE {
            return Ok(None);
        }

        let body_len = ((self.buffer[1] as usize) << 16)
            | ((self.buffer[2] as usize) << 8)
            | self.buffer[3] as usize;

        // a single handshake message may span records but is still bounded
        if body_len > MAX_FRAGMENT_SIZE * 4 {
            return Err(Error::InvalidMessage(format!(
                "handshake message of {} bytes is implausible",
                body_len
            )));
        }

        let total = HANDSHAKE_HEADER_SIZE + body_len;
        if self.buffer.len() < total {
            return Ok(None);
        }

        let msg_type = HandshakeType::from_u8(self.buffer[0]).ok_or_else(|| {
            Error::UnexpectedMessage(format!("unknown handshake type {}", self.buffer[0]))
        })?;

        let raw: Vec<u8> = self.buffer.drain(..total).collect();
        let body = raw[HANDSHAKE_HEADER_SIZE..].to_vec();

        Ok(Some(HandshakeMessage {
            msg_type,
            body,
            raw,
        }))
    }

    /// Whether partial message bytes are pending.
    pub fn has_partial(&self) -> bool {
        !self.buffer.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_roundtrip() {
        let msg = encode_handshake(HandshakeType::Finished, &[0xAB; 12]).unwrap();
        assert_eq!(msg.len(), 16);
        assert_eq!(msg[0], 20);
        assert_eq!(&msg[1..4], &[0, 0, 12]);

        let mut reassembler = HandshakeReassembler::new();
        reassembler.push(&msg);
        let out = reassembler.next_message().unwrap().unwrap();
        assert_eq!(out.msg_type, HandshakeType::Finished);
        assert_eq!(out.body, vec![0xAB; 12]);
        assert_eq!(out.raw, msg);
        assert!(!reassembler.has_partial());
    }

    #[test]
    fn test_reassembly_across_fragments() {
        let msg = encode_handshake(HandshakeType::ClientHello, &[0x11; 50]).unwrap();

        let mut reassembler = HandshakeReassembler::new();
        reassembler.push(&msg[..10]);
        assert!(reassembler.next_message().unwrap().is_none());
        assert!(reassembler.has_partial());

        reassembler.push(&msg[10..]);
        let out = reassembler.next_message().unwrap().unwrap();
        assert_eq!(out.raw, msg);
    }

    #[test]
    fn test_two_messages_in_one_fragment() {
        let mut stream = encode_handshake(HandshakeType::ServerHello, &[1, 2, 3]).unwrap();
        stream.extend(encode_handshake(HandshakeType::ServerHelloDone, &[]).unwrap());

        let mut reassembler = HandshakeReassembler::new();
        reassembler.push(&stream);

        let first = reassembler.next_message().unwrap().unwrap();
        assert_eq!(first.msg_type, HandshakeType::ServerHello);
        let second = reassembler.next_message().unwrap().unwrap();
        assert_eq!(second.msg_type, HandshakeType::ServerHelloDone);
        assert!(second.body.is_empty());
        assert!(reassembler.next_message().unwrap().is_none());
    }

    #[test]
    fn test_unknown_type_rejected() {
        let mut reassembler = HandshakeReassembler::new();
        reassembler.push(&[99, 0, 0, 0]);
        assert!(reassembler.next_message().is_err());
    }
}
