//! Finished message (RFC 5246 Section 7.4.9).

use crate::error::{Error, Result};
use crate::prf::VERIFY_DATA_LENGTH;

/// Finished message: exactly 12 bytes of PRF output authenticating the
/// handshake transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finished {
    /// Verify data.
    pub verify_data: Vec<u8>,
}

impl Finished {
    /// Create a Finished message.
    pub fn new(verify_data: Vec<u8>) -> Self {
        Self { verify_data }
    }

    /// Encode the message body.
    pub fn encode(&self) -> Result<Vec<u8>> {
        if self.verify_data.len() != VERIFY_DATA_LENGTH {
            return Err(Error::InternalError(format!(
                "verify data must be {} bytes, got {}",
                VERIFY_DATA_LENGTH,
                self.verify_data.len()
            )));
        }
        Ok(self.verify_data.clone())
    }

    /// Decode a message body.
    pub fn decode(data: &[u8]) -> Result<Self> {
        if data.len() != VERIFY_DATA_LENGTH {
            return Err(Error::InvalidMessage(format!(
                "Finished must be {} bytes, got {}",
                VERIFY_DATA_LENGTH,
                data.len()
            )));
        }
        Ok(Self {
            verify_data: data.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finished_roundtrip() {
        let finished = Finished::new(vec![7; 12]);
        let encoded = finished.encode().unwrap();
        assert_eq!(encoded.len(), 12);
        assert_eq!(Finished::decode(&encoded).unwrap(), finished);
    }

    #[test]
    fn test_wrong_length_rejected() {
        assert!(Finished::decode(&[0; 11]).is_err());
        assert!(Finished::decode(&[0; 13]).is_err());
        assert!(Finished::new(vec![0; 11]).encode().is_err());
    }
}
