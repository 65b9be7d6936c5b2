//! Minimal DER walk for X.509 certificates.
//!
//! The engine only ever needs one thing from a certificate: the
//! subjectPublicKeyInfo, so the server's RSA key can encrypt the premaster
//! secret. Rather than pulling in a full X.509 stack, this walks the DER
//! structure far enough to slice it out:
//!
//! ```text
//! Certificate ::= SEQUENCE {
//!     tbsCertificate      SEQUENCE {
//!         version         [0] EXPLICIT INTEGER OPTIONAL,
//!         serialNumber    INTEGER,
//!         signature       SEQUENCE,
//!         issuer          SEQUENCE,
//!         validity        SEQUENCE,
//!         subject         SEQUENCE,
//!         subjectPublicKeyInfo SEQUENCE,   <- extracted
//!         ... }
//!     signatureAlgorithm  SEQUENCE,
//!     signatureValue      BIT STRING }
//! ```
//!
//! Chain validation policy is a caller concern and happens elsewhere.

use siotls_crypto::{Error, Result};

const TAG_SEQUENCE: u8 = 0x30;
const TAG_CONTEXT_0: u8 = 0xA0;

/// Extract the subjectPublicKeyInfo TLV from a DER-encoded certificate.
///
/// Returns the complete SPKI element (tag, length and content), suitable
/// for SPKI-aware key decoders.
pub fn subject_public_key_info(cert: &[u8]) -> Result<&[u8]> {
    let mut outer = Reader::new(cert);
    let certificate = outer.expect(TAG_SEQUENCE)?;

    let mut cert_fields = Reader::new(certificate);
    let tbs = cert_fields.expect(TAG_SEQUENCE)?;

    let mut tbs_fields = Reader::new(tbs);

    // version is EXPLICIT [0] and optional (absent in v1 certificates)
    if tbs_fields.peek_tag() == Some(TAG_CONTEXT_0) {
        tbs_fields.skip()?;
    }

    // serialNumber, signature, issuer, validity, subject
    for _ in 0..5 {
        tbs_fields.skip()?;
    }

    let (tag, element) = tbs_fields.next_element()?;
    if tag != TAG_SEQUENCE {
        return Err(Error::InvalidInput(format!(
            "expected subjectPublicKeyInfo SEQUENCE, found tag {:#04x}",
            tag
        )));
    }
    Ok(element)
}

/// Cursor over one level of DER elements.
struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn peek_tag(&self) -> Option<u8> {
        self.data.get(self.pos).copied()
    }

    /// Read the next element, returning (tag, full element bytes) and
    /// advancing past it.
    fn next_element(&mut self) -> Result<(u8, &'a [u8])> {
        let start = self.pos;
        let tag = *self
            .data
            .get(self.pos)
            .ok_or_else(|| Error::InvalidInput("truncated DER: missing tag".into()))?;
        self.pos += 1;

        let len = self.read_length()?;
        let content_end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.data.len())
            .ok_or_else(|| Error::InvalidInput("truncated DER: content out of range".into()))?;

        let element = &self.data[start..content_end];
        self.pos = content_end;
        Ok((tag, element))
    }

    /// Read the next element, require the given tag, and return only the
    /// content bytes.
    fn expect(&mut self, tag: u8) -> Result<&'a [u8]> {
        let (found, element) = self.next_element()?;
        if found != tag {
            return Err(Error::InvalidInput(format!(
                "expected DER tag {:#04x}, found {:#04x}",
                tag, found
            )));
        }
        let header = element.len() - self.content_length(element)?;
        Ok(&element[header..])
    }

    fn skip(&mut self) -> Result<()> {
        self.next_element().map(|_| ())
    }

    fn read_length(&mut self) -> Result<usize> {
        let first = *self
            .data
            .get(self.pos)
            .ok_or_else(|| Error::InvalidInput("truncated DER: missing length".into()))?;
        self.pos += 1;

        if first < 0x80 {
            return Ok(first as usize);
        }
        let num_bytes = (first & 0x7F) as usize;
        if num_bytes == 0 || num_bytes > 4 {
            return Err(Error::InvalidInput(
                "unsupported DER length encoding".into(),
            ));
        }
        let mut len = 0usize;
        for _ in 0..num_bytes {
            let byte = *self
                .data
                .get(self.pos)
                .ok_or_else(|| Error::InvalidInput("truncated DER: short length".into()))?;
            self.pos += 1;
            len = (len << 8) | byte as usize;
        }
        Ok(len)
    }

    /// Content length of a complete element (for header-size computation).
    fn content_length(&self, element: &[u8]) -> Result<usize> {
        let mut r = Reader::new(element);
        r.pos = 1;
        r.read_length()
    }
}
