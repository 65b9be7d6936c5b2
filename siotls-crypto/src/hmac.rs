//! HMAC (Hash-based Message Authentication Code) interface.

use crate::HashAlgorithm;

/// Keyed HMAC instance.
///
/// Used by the record layer for MAC-then-encrypt protection and by the
/// TLS 1.2 PRF.
pub trait Hmac: Send {
    /// Update the HMAC state with more data.
    fn update(&mut self, data: &[u8]);

    /// Finalize the HMAC and return the authentication tag.
    ///
    /// Consumes the HMAC state.
    fn finalize(self: Box<Self>) -> Vec<u8>;

    /// Verify an HMAC tag in constant time.
    ///
    /// # Security
    ///
    /// Comparison is constant-time to prevent MAC-timing oracles.
    fn verify(self: Box<Self>, tag: &[u8]) -> bool {
        use subtle::ConstantTimeEq;
        let computed = self.finalize();
        computed.ct_eq(tag).into()
    }

    /// Tag size in bytes.
    fn output_size(&self) -> usize;

    /// The underlying hash algorithm.
    fn algorithm(&self) -> HashAlgorithm;
}
