//! TLS server: identity configuration and connection minting.

use std::sync::{Arc, Mutex};

use siotls_core::session::{SessionStore, SharedSessionStore};
use siotls_core::{Connection, Error, Result};
use siotls_crypto::CryptoProvider;
use siotls_crypto_rustcrypto::RustCryptoProvider;

/// Server configuration: the identity every connection presents.
#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
    /// DER-encoded X.509 certificate.
    pub certificate_der: Vec<u8>,

    /// DER-encoded RSA private key (PKCS#8 or PKCS#1).
    pub private_key_der: Vec<u8>,
}

impl ServerConfig {
    /// Create a configuration builder.
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::default()
    }
}

/// Builder for [`ServerConfig`].
#[derive(Debug, Default)]
pub struct ServerConfigBuilder {
    config: ServerConfig,
}

impl ServerConfigBuilder {
    /// Set the DER-encoded certificate.
    pub fn with_certificate(mut self, certificate_der: Vec<u8>) -> Self {
        self.config.certificate_der = certificate_der;
        self
    }

    /// Set the DER-encoded RSA private key.
    pub fn with_private_key(mut self, private_key_der: Vec<u8>) -> Self {
        self.config.private_key_der = private_key_der;
        self
    }

    /// Validate and build the configuration.
    pub fn build(self) -> Result<ServerConfig> {
        if self.config.certificate_der.is_empty() {
            return Err(Error::InternalError("no certificate configured".into()));
        }
        if self.config.private_key_der.is_empty() {
            return Err(Error::InternalError("no private key configured".into()));
        }
        Ok(self.config)
    }
}

/// TLS 1.2 server.
///
/// Holds the identity, the crypto provider and the session store shared
/// across every connection it accepts, enabling abbreviated handshakes for
/// returning clients.
pub struct Server {
    provider: Arc<dyn CryptoProvider>,
    config: ServerConfig,
    session_store: SharedSessionStore,
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("certificate_len", &self.config.certificate_der.len())
            .finish()
    }
}

impl Server {
    /// Create a server backed by the RustCrypto provider.
    ///
    /// The private key is loaded eagerly so a misconfigured identity fails
    /// here rather than on the first connection.
    pub fn new(config: ServerConfig) -> Result<Self> {
        Self::with_provider(config, Arc::new(RustCryptoProvider::new()))
    }

    /// Create a server with a specific crypto provider.
    pub fn with_provider(config: ServerConfig, provider: Arc<dyn CryptoProvider>) -> Result<Self> {
        provider
            .rsa_private_key(&config.private_key_der)
            .map_err(|e| Error::InternalError(format!("server private key: {}", e)))?;

        Ok(Self {
            provider,
            config,
            session_store: Arc::new(Mutex::new(SessionStore::new())),
        })
    }

    /// Accept a new connection; it waits for a ClientHello via
    /// [`Connection::feed`].
    pub fn new_connection(&self) -> Result<Connection> {
        Connection::server(
            self.provider.clone(),
            self.config.certificate_der.clone(),
            self.config.private_key_der.clone(),
            self.session_store.clone(),
        )
    }

    /// The session store shared by this server's connections.
    pub fn session_store(&self) -> SharedSessionStore {
        self.session_store.clone()
    }
}
