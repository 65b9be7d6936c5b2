//! Error types for crypto providers.

use core::fmt;

/// Result type for provider operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors a cryptographic backend can report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The requested algorithm is not supported by this provider.
    UnsupportedAlgorithm(String),

    /// A key had the wrong length or format for the algorithm.
    InvalidKey(String),

    /// Input data was malformed (bad DER, wrong block size, ...).
    InvalidInput(String),

    /// An encryption or decryption operation failed.
    CipherFailed(String),

    /// The random number generator failed.
    RandomFailed(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnsupportedAlgorithm(msg) => write!(f, "Unsupported algorithm: {}", msg),
            Error::InvalidKey(msg) => write!(f, "Invalid key: {}", msg),
            Error::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            Error::CipherFailed(msg) => write!(f, "Cipher operation failed: {}", msg),
            Error::RandomFailed(msg) => write!(f, "Random generation failed: {}", msg),
        }
    }
}

impl std::error::Error for Error {}
