//! OS-backed random number generation.

use rand::rngs::OsRng;
use rand::RngCore;
use siotls_crypto::{Error, Random, Result};

/// Random number generator drawing from the operating system CSPRNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsRandom;

impl Random for OsRandom {
    fn fill(&self, dest: &mut [u8]) -> Result<()> {
        OsRng
            .try_fill_bytes(dest)
            .map_err(|e| Error::RandomFailed(e.to_string()))
    }
}
