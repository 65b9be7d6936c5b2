//! Error types for the protocol core.

use core::fmt;

/// Result type for protocol operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors that can occur while driving a TLS 1.2 connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A record or handshake message arrived that the current state does
    /// not admit.
    UnexpectedMessage(String),

    /// Record MAC verification or padding check failed.
    BadRecordMac,

    /// A record exceeded the permitted length.
    RecordOverflow,

    /// Handshake failure: Finished mismatch, no acceptable cipher suite,
    /// or an unimplementable key exchange.
    HandshakeFailure(String),

    /// The record layer saw a protocol version outside TLS 1.x, or the
    /// handshake negotiated something other than TLS 1.2.
    UnsupportedVersion(u16),

    /// A message failed to decode.
    InvalidMessage(String),

    /// The peer sent a fatal alert.
    AlertReceived(AlertDescription),

    /// The connection is shut down; the operation cannot proceed.
    ConnectionClosed,

    /// Backend failure or internal bug.
    InternalError(String),
}

impl Error {
    /// The alert description this error maps to on the wire.
    pub fn alert_description(&self) -> AlertDescription {
        match self {
            Error::UnexpectedMessage(_) => AlertDescription::UnexpectedMessage,
            Error::BadRecordMac => AlertDescription::BadRecordMac,
            Error::RecordOverflow => AlertDescription::RecordOverflow,
            Error::HandshakeFailure(_) => AlertDescription::HandshakeFailure,
            Error::UnsupportedVersion(_) => AlertDescription::ProtocolVersion,
            Error::InvalidMessage(_) => AlertDescription::DecodeError,
            Error::AlertReceived(desc) => *desc,
            Error::ConnectionClosed => AlertDescription::CloseNotify,
            Error::InternalError(_) => AlertDescription::InternalError,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnexpectedMessage(msg) => write!(f, "Unexpected message: {}", msg),
            Error::BadRecordMac => write!(f, "Bad record MAC"),
            Error::RecordOverflow => write!(f, "Record overflow"),
            Error::HandshakeFailure(msg) => write!(f, "Handshake failure: {}", msg),
            Error::UnsupportedVersion(v) => write!(f, "Unsupported protocol version {:#06x}", v),
            Error::InvalidMessage(msg) => write!(f, "Invalid message: {}", msg),
            Error::AlertReceived(desc) => write!(f, "Alert received: {:?}", desc),
            Error::ConnectionClosed => write!(f, "Connection closed"),
            Error::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

impl From<siotls_crypto::Error> for Error {
    fn from(e: siotls_crypto::Error) -> Self {
        Error::InternalError(format!("crypto backend: {}", e))
    }
}

/// TLS alert descriptions (RFC 5246 Section 7.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum AlertDescription {
    /// Close notify (0)
    CloseNotify = 0,

    /// Unexpected message (10)
    UnexpectedMessage = 10,

    /// Bad record MAC (20)
    BadRecordMac = 20,

    /// Decryption failed (21, reserved)
    DecryptionFailed = 21,

    /// Record overflow (22)
    RecordOverflow = 22,

    /// Decompression failure (30)
    DecompressionFailure = 30,

    /// Handshake failure (40)
    HandshakeFailure = 40,

    /// Bad certificate (42)
    BadCertificate = 42,

    /// Unsupported certificate (43)
    UnsupportedCertificate = 43,

    /// Certificate revoked (44)
    CertificateRevoked = 44,

    /// Certificate expired (45)
    CertificateExpired = 45,

    /// Certificate unknown (46)
    CertificateUnknown = 46,

    /// Illegal parameter (47)
    IllegalParameter = 47,

    /// Unknown CA (48)
    UnknownCa = 48,

    /// Access denied (49)
    AccessDenied = 49,

    /// Decode error (50)
    DecodeError = 50,

    /// Decrypt error (51)
    DecryptError = 51,

    /// Protocol version (70)
    ProtocolVersion = 70,

    /// Insufficient security (71)
    InsufficientSecurity = 71,

    /// Internal error (80)
    InternalError = 80,

    /// User canceled (90)
    UserCanceled = 90,

    /// No renegotiation (100)
    NoRenegotiation = 100,

    /// Unsupported extension (110)
    UnsupportedExtension = 110,
}

impl AlertDescription {
    /// Convert from wire format (u8).
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(AlertDescription::CloseNotify),
            10 => Some(AlertDescription::UnexpectedMessage),
            20 => Some(AlertDescription::BadRecordMac),
            21 => Some(AlertDescription::DecryptionFailed),
            22 => Some(AlertDescription::RecordOverflow),
            30 => Some(AlertDescription::DecompressionFailure),
            40 => Some(AlertDescription::HandshakeFailure),
            42 => Some(AlertDescription::BadCertificate),
            43 => Some(AlertDescription::UnsupportedCertificate),
            44 => Some(AlertDescription::CertificateRevoked),
            45 => Some(AlertDescription::CertificateExpired),
            46 => Some(AlertDescription::CertificateUnknown),
            47 => Some(AlertDescription::IllegalParameter),
            48 => Some(AlertDescription::UnknownCa),
            49 => Some(AlertDescription::AccessDenied),
            50 => Some(AlertDescription::DecodeError),
            51 => Some(AlertDescription::DecryptError),
            70 => Some(AlertDescription::ProtocolVersion),
            71 => Some(AlertDescription::InsufficientSecurity),
            80 => Some(AlertDescription::InternalError),
            90 => Some(AlertDescription::UserCanceled),
            100 => Some(AlertDescription::NoRenegotiation),
            110 => Some(AlertDescription::UnsupportedExtension),
            _ => None,
        }
    }

    /// Convert to wire format (u8).
    pub const fn to_u8(self) -> u8 {
        self as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alert_description_conversion() {
        assert_eq!(
            AlertDescription::from_u8(0),
            Some(AlertDescription::CloseNotify)
        );
        assert_eq!(
            AlertDescription::from_u8(40),
            Some(AlertDescription::HandshakeFailure)
        );
        assert_eq!(
            AlertDescription::from_u8(100),
            Some(AlertDescription::NoRenegotiation)
        );
        assert_eq!(AlertDescription::from_u8(255), None);
        assert_eq!(AlertDescription::BadRecordMac.to_u8(), 20);
    }

    #[test]
    fn test_error_alert_mapping() {
        assert_eq!(
            Error::UnexpectedMessage("x".into()).alert_description(),
            AlertDescription::UnexpectedMessage
        );
        assert_eq!(
            Error::BadRecordMac.alert_description(),
            AlertDescription::BadRecordMac
        );
        assert_eq!(
            Error::RecordOverflow.alert_description(),
            AlertDescription::RecordOverflow
        );
        assert_eq!(
            Error::HandshakeFailure("x".into()).alert_description(),
            AlertDescription::HandshakeFailure
        );
        assert_eq!(
            Error::UnsupportedVersion(0x0200).alert_description(),
            AlertDescription::ProtocolVersion
        );
        assert_eq!(
            Error::InternalError("x".into()).alert_description(),
            AlertDescription::InternalError
        );
    }
}
