//! ServerHelloDone message (RFC 5246 Section 7.4.5).
//!
//! An empty message: the server has finished its half of the key exchange
//! setup and the client may proceed.

use crate::error::{Error, Result};

/// ServerHelloDone message (no payload).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ServerHelloDone;

impl ServerHelloDone {
    /// Create a ServerHelloDone.
    pub fn new() -> Self {
        ServerHelloDone
    }

    /// Encode the (empty) message body.
    pub fn encode(&self) -> Vec<u8> {
        Vec::new()
    }

    /// Decode a message body, which must be empty.
    pub fn decode(data: &[u8]) -> Result<Self> {
        if !data.is_empty() {
            return Err(Error::InvalidMessage(format!(
                "ServerHelloDone must be empty, got {} bytes",
                data.len()
            )));
        }
        Ok(ServerHelloDone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_hello_done() {
        let encoded = ServerHelloDone::new().encode();
        assert!(encoded.is_empty());
        ServerHelloDone::decode(&encoded).unwrap();
    }

    #[test]
    fn test_non_empty_rejected() {
        assert!(ServerHelloDone::decode(&[0]).is_err());
    }
}
