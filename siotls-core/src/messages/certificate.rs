//! Certificate message (RFC 5246 Section 7.4.2).

use bytes::{Buf, BufMut, BytesMut};

use crate::codec;
use crate::error::{Error, Result};

/// Certificate message: a list of DER-encoded certificates, leaf first.
///
/// ```text
/// opaque ASN.1Cert<1..2^24-1>;
///
/// struct {
///     ASN.1Cert certificate_list<0..2^24-1>;
/// } Certificate;
/// ```
///
/// The engine sends a single certificate and, on receipt, only the leaf is
/// used; intermediates are carried for the caller's validation policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate {
    /// DER-encoded certificates, leaf first.
    pub certificate_list: Vec<Vec<u8>>,
}

impl Certificate {
    /// Create a Certificate message.
    pub fn new(certificate_list: Vec<Vec<u8>>) -> Self {
        Self { certificate_list }
    }

    /// The leaf certificate, if any.
    pub fn leaf(&self) -> Option<&[u8]> {
        self.certificate_list.first().map(|c| c.as_slice())
    }

    /// Encode the message body.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut list = BytesMut::new();
        for cert in &self.certificate_list {
            if cert.is_empty() {
                return Err(Error::InvalidMessage("empty certificate entry".into()));
            }
            codec::put_u24(&mut list, cert.len())?;
            list.put_slice(cert);
        }

        let mut buf = BytesMut::new();
        codec::put_u24(&mut buf, list.len())?;
        buf.put_slice(&list);
        Ok(buf.to_vec())
    }

    /// Decode a message body.
    pub fn decode(mut data: &[u8]) -> Result<Self> {
        let list = codec::get_vec_u24(&mut data)?;
        if data.has_remaining() {
            return Err(Error::InvalidMessage(
                "trailing bytes after certificate list".into(),
            ));
        }

        let mut list = list.as_slice();
        let mut certificate_list = Vec::new();
        while list.has_remaining() {
            let cert = codec::get_vec_u24(&mut list)?;
            if cert.is_empty() {
                return Err(Error::InvalidMessage("empty certificate entry".into()));
            }
            certificate_list.push(cert);
        }

        Ok(Self { certificate_list })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_certificate_roundtrip() {
        let leaf = vec![0x30, 0x82, 0x01, 0x00, 0xAA];
        let intermediate = vec![0x30, 0x82, 0x02, 0x00];
        let msg = Certificate::new(vec![leaf.clone(), intermediate.clone()]);

        let decoded = Certificate::decode(&msg.encode().unwrap()).unwrap();
        assert_eq!(decoded.certificate_list.len(), 2);
        assert_eq!(decoded.leaf(), Some(leaf.as_slice()));
        assert_eq!(decoded.certificate_list[1], intermediate);
    }

    #[test]
    fn test_empty_list() {
        let msg = Certificate::new(vec![]);
        let encoded = msg.encode().unwrap();
        assert_eq!(encoded, vec![0, 0, 0]);
        let decoded = Certificate::decode(&encoded).unwrap();
        assert_eq!(decoded.leaf(), None);
    }

    #[test]
    fn test_rejects_truncated_entry() {
        // list claims 10 bytes but carries 2
        let bad = [0, 0, 10, 0x30, 0x82];
        assert!(Certificate::decode(&bad).is_err());
    }
}
