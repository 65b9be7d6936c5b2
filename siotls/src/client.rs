//! TLS client: mints connections, owns the session cache.

use std::sync::{Arc, Mutex};

use siotls_core::cipher_suites::default_cipher_suites;
use siotls_core::session::{SessionCache, SharedSessionCache};
use siotls_core::{CipherSuite, Connection, Result};
use siotls_crypto::CryptoProvider;
use siotls_crypto_rustcrypto::RustCryptoProvider;

/// TLS 1.2 client.
///
/// Holds the crypto provider, the configured cipher-suite offer and the
/// session cache shared across every connection it creates. Reconnecting
/// to a server name with a cached session proposes an abbreviated
/// handshake; the cache updates itself as handshakes complete.
pub struct Client {
    provider: Arc<dyn CryptoProvider>,
    cipher_suites: Vec<CipherSuite>,
    session_cache: SharedSessionCache,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("cipher_suites", &self.cipher_suites)
            .finish()
    }
}

impl Client {
    /// Create a client backed by the RustCrypto provider, offering the
    /// default cipher suites.
    pub fn new() -> Self {
        Self::with_provider(Arc::new(RustCryptoProvider::new()))
    }

    /// Create a client with a specific crypto provider.
    pub fn with_provider(provider: Arc<dyn CryptoProvider>) -> Self {
        Self {
            provider,
            cipher_suites: default_cipher_suites(),
            session_cache: Arc::new(Mutex::new(SessionCache::new())),
        }
    }

    /// Replace the cipher-suite offer for subsequent connections.
    pub fn set_cipher_suites(&mut self, cipher_suites: Vec<CipherSuite>) {
        self.cipher_suites = cipher_suites;
    }

    /// Open a connection to `server_name`.
    ///
    /// The returned connection already has its ClientHello queued; drain
    /// it with [`Connection::next_record`] and write it to the transport.
    /// Install callbacks before feeding server bytes.
    pub fn new_connection(&self, server_name: &str) -> Result<Connection> {
        Connection::client(
            self.provider.clone(),
            server_name,
            self.cipher_suites.clone(),
            self.session_cache.clone(),
        )
    }

    /// The session cache shared by this client's connections.
    pub fn session_cache(&self) -> SharedSessionCache {
        self.session_cache.clone()
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}
