//! Hash function interface.

/// Hash algorithms used by TLS 1.2.
///
/// SHA-256 drives the PRF and transcript hashing; MD5 and SHA-1 appear only
/// as record MAC hashes of legacy cipher suites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashAlgorithm {
    /// MD5 (legacy record MACs only)
    Md5,

    /// SHA-1
    Sha1,

    /// SHA-256
    Sha256,
}

impl HashAlgorithm {
    /// Digest output size in bytes.
    pub const fn output_size(self) -> usize {
        match self {
            HashAlgorithm::Md5 => 16,
            HashAlgorithm::Sha1 => 20,
            HashAlgorithm::Sha256 => 32,
        }
    }
}

/// Incremental hash function.
pub trait Hash: Send {
    /// Update the hash state with more data.
    fn update(&mut self, data: &[u8]);

    /// Finalize the hash and return the digest.
    ///
    /// Consumes the hash state.
    fn finalize(self: Box<Self>) -> Vec<u8>;

    /// Digest output size in bytes.
    fn output_size(&self) -> usize;

    /// The algorithm this instance computes.
    fn algorithm(&self) -> HashAlgorithm;
}
