//! Wire codec primitives shared by the message codecs.
//!
//! TLS vectors are length-prefixed byte strings with 1-, 2- or 3-byte
//! big-endian length fields. These helpers sit on top of
//! `bytes::{Buf, BufMut}` so the per-message codecs stay declarative.

use bytes::{Buf, BufMut};

use crate::error::{Error, Result};

/// Write a 24-bit big-endian length.
pub fn put_u24(buf: &mut impl BufMut, value: usize) -> Result<()> {
    if value > 0xFF_FFFF {
        return Err(Error::InvalidMessage(format!(
            "value {} exceeds 24-bit range",
            value
        )));
    }
    buf.put_uint(value as u64, 3);
    Ok(())
}

/// Read a 24-bit big-endian length.
pub fn get_u24(buf: &mut impl Buf) -> Result<usize> {
    if buf.remaining() < 3 {
        return Err(Error::InvalidMessage("truncated u24".into()));
    }
    Ok(buf.get_uint(3) as usize)
}

/// Write a byte string with a one-byte length prefix.
pub fn put_vec_u8(buf: &mut impl BufMut, data: &[u8]) -> Result<()> {
    if data.len() > u8::MAX as usize {
        return Err(Error::InvalidMessage(format!(
            "vector of {} bytes exceeds u8 length prefix",
            data.len()
        )));
    }
    buf.put_u8(data.len() as u8);
    buf.put_slice(data);
    Ok(())
}

/// Write a byte string with a two-byte length prefix.
pub fn put_vec_u16(buf: &mut impl BufMut, data: &[u8]) -> Result<()> {
    if data.len() > u16::MAX as usize {
        return Err(Error::InvalidMessage(format!(
            "vector of {} bytes exceeds u16 length prefix",
            data.len()
        )));
    }
    buf.put_u16(data.len() as u16);
    buf.put_slice(data);
    Ok(())
}

/// Read a byte string with a one-byte length prefix.
pub fn get_vec_u8(buf: &mut &[u8]) -> Result<Vec<u8>> {
    if buf.remaining() < 1 {
        return Err(Error::InvalidMessage("truncated u8 vector".into()));
    }
    let len = buf.get_u8() as usize;
    get_exact(buf, len)
}

/// Read a byte string with a two-byte length prefix.
pub fn get_vec_u16(buf: &mut &[u8]) -> Result<Vec<u8>> {
    if buf.remaining() < 2 {
        return Err(Error::InvalidMessage("truncated u16 vector".into()));
    }
    let len = buf.get_u16() as usize;
    get_exact(buf, len)
}

/// Read a byte string with a three-byte length prefix.
pub fn get_vec_u24(buf: &mut &[u8]) -> Result<Vec<u8>> {
    let len = get_u24(buf)?;
    get_exact(buf, len)
}

/// Read exactly `len` bytes.
pub fn get_exact(buf: &mut &[u8], len: usize) -> Result<Vec<u8>> {
    if buf.remaining() < len {
        return Err(Error::InvalidMessage(format!(
            "expected {} bytes, {} available",
            len,
            buf.remaining()
        )));
    }
    let out = buf[..len].to_vec();
    buf.advance(len);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;

    #[test]
    fn test_u24_roundtrip() {
        let mut buf = BytesMut::new();
        put_u24(&mut buf, 0x012345).unwrap();
        assert_eq!(&buf[..], &[0x01, 0x23, 0x45]);

        let mut slice = &buf[..];
        assert_eq!(get_u24(&mut slice).unwrap(), 0x012345);
    }

    #[test]
    fn test_u24_overflow_rejected() {
        let mut buf = BytesMut::new();
        assert!(put_u24(&mut buf, 0x1_000_000).is_err());
    }

    #[test]
    fn test_vec_u8_roundtrip() {
        let mut buf = BytesMut::new();
        put_vec_u8(&mut buf, b"abc").unwrap();
        assert_eq!(&buf[..], &[3, b'a', b'b', b'c']);

        let mut slice = &buf[..];
        assert_eq!(get_vec_u8(&mut slice).unwrap(), b"abc");
        assert!(slice.is_empty());
    }

    #[test]
    fn test_vec_u16_roundtrip() {
        let mut buf = BytesMut::new();
        put_vec_u16(&mut buf, &[0xAA; 300]).unwrap();

        let mut slice = &buf[..];
        let out = get_vec_u16(&mut slice).unwrap();
        assert_eq!(out.len(), 300);
    }

    #[test]
    fn test_truncated_vectors_rejected() {
        let mut slice: &[u8] = &[5, 1, 2];
        assert!(get_vec_u8(&mut slice).is_err());

        let mut slice: &[u8] = &[0x00];
        assert!(get_vec_u16(&mut slice).is_err());

        let mut slice: &[u8] = &[0x00, 0x00, 0x05, 1];
        assert!(get_vec_u24(&mut slice).is_err());
    }
}
