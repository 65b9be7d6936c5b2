//! Hello extensions.
//!
//! The engine produces exactly one extension, server_name (RFC 6066), and
//! tolerates any other on decode by carrying it opaquely. Extension types
//! stay raw u16s so unknown values survive a decode/encode cycle.

use bytes::{Buf, BufMut, BytesMut};

use crate::codec;
use crate::error::{Error, Result};
use crate::protocol::ExtensionType;

const SNI_HOST_NAME: u8 = 0;

/// A single extension: type and opaque data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extension {
    /// Extension type (raw wire value).
    pub extension_type: u16,

    /// Extension data.
    pub data: Vec<u8>,
}

impl Extension {
    /// Create a new extension.
    pub fn new(extension_type: u16, data: Vec<u8>) -> Self {
        Self {
            extension_type,
            data,
        }
    }

    /// Build a server_name extension carrying one host_name entry.
    pub fn server_name(host: &str) -> Result<Self> {
        let name = host.as_bytes();

        let mut entry = BytesMut::new();
        entry.put_u8(SNI_HOST_NAME);
        codec::put_vec_u16(&mut entry, name)?;

        let mut data = BytesMut::new();
        codec::put_vec_u16(&mut data, &entry)?;

        Ok(Self {
            extension_type: ExtensionType::ServerName.to_u16(),
            data: data.to_vec(),
        })
    }

    /// Parse a server_name extension's first host_name entry.
    pub fn parse_server_name(&self) -> Result<Option<String>> {
        if self.extension_type != ExtensionType::ServerName.to_u16() {
            return Ok(None);
        }
        // a ServerHello may echo server_name empty
        if self.data.is_empty() {
            return Ok(None);
        }

        let mut buf = self.data.as_slice();
        let list = codec::get_vec_u16(&mut buf)?;
        let mut list = list.as_slice();
        while list.remaining() >= 1 {
            let name_type = list.get_u8();
            let name = codec::get_vec_u16(&mut list)?;
            if name_type == SNI_HOST_NAME {
                let host = String::from_utf8(name)
                    .map_err(|_| Error::InvalidMessage("host_name is not UTF-8".into()))?;
                return Ok(Some(host));
            }
        }
        Ok(None)
    }
}

/// Ordered extension list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extensions {
    extensions: Vec<Extension>,
}

impl Extensions {
    /// Create an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an extension.
    pub fn add(&mut self, extension: Extension) {
        self.extensions.push(extension);
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    /// Find an extension by raw type.
    pub fn get(&self, extension_type: u16) -> Option<&Extension> {
        self.extensions
            .iter()
            .find(|e| e.extension_type == extension_type)
    }

    /// The SNI host name, if a server_name extension is present.
    pub fn server_name(&self) -> Result<Option<String>> {
        match self.get(ExtensionType::ServerName.to_u16()) {
            Some(ext) => ext.parse_server_name(),
            None => Ok(None),
        }
    }

    /// Encode the extensions block (u16 total length + entries). An empty
    /// list encodes to nothing: hellos omit the block entirely.
    pub fn encode(&self, buf: &mut BytesMut) -> Result<()> {
        if self.extensions.is_empty() {
            return Ok(());
        }

        let mut body = BytesMut::new();
        for ext in &self.extensions {
            body.put_u16(ext.extension_type);
            codec::put_vec_u16(&mut body, &ext.data)?;
        }
        codec::put_vec_u16(buf, &body)?;
        Ok(())
    }

    /// Decode an extensions block from the remainder of a hello body.
    ///
    /// An absent block (no bytes left) is valid and yields an empty list.
    pub fn decode(buf: &mut &[u8]) -> Result<Self> {
        let mut extensions = Extensions::new();
        if buf.remaining() == 0 {
            return Ok(extensions);
        }

        let block = codec::get_vec_u16(buf)?;
        let mut block = block.as_slice();
        while block.remaining() > 0 {
            if block.remaining() < 4 {
                return Err(Error::InvalidMessage("truncated extension header".into()));
            }
            let extension_type = block.get_u16();
            let data = codec::get_vec_u16(&mut block)?;
            extensions.add(Extension::new(extension_type, data));
        }
        Ok(extensions)
    }
}
