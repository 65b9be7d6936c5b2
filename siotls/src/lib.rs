//! # siotls — sans-I/O TLS 1.2
//!
//! A TLS 1.2 protocol engine that performs no socket I/O: feed it the bytes
//! you received, write out the records it queues. Static-RSA key transport,
//! CBC/stream cipher suites, session resumption and SNI.
//!
//! ## Client
//!
//! ```rust,no_run
//! use siotls::Client;
//!
//! let client = Client::new();
//! let mut conn = client.new_connection("example.com").unwrap();
//! conn.set_on_data(Box::new(|_conn, data| {
//!     println!("received {} bytes", data.len());
//! }));
//!
//! // wire the connection to your transport:
//! while let Some(record) = conn.next_record() {
//!     // socket.write_all(&record)
//! }
//! // let consumed = conn.feed(&received_bytes).unwrap();
//! ```
//!
//! ## Server
//!
//! ```rust,no_run
//! use siotls::{Server, ServerConfig};
//!
//! # let (cert_der, key_der) = (vec![0u8], vec![0u8]);
//! let config = ServerConfig::builder()
//!     .with_certificate(cert_der)
//!     .with_private_key(key_der)
//!     .build()
//!     .unwrap();
//! let server = Server::new(config).unwrap();
//! let mut conn = server.new_connection().unwrap();
//! ```
//!
//! The [`Client`] keeps a session cache keyed by server name; reconnecting
//! to the same name proposes an abbreviated handshake automatically.

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unused_qualifications
)]

mod client;
mod server;

pub use client::Client;
pub use server::{Server, ServerConfig, ServerConfigBuilder};

pub use siotls_core::{
    default_cipher_suites, Alert, AlertDescription, AlertLevel, CipherSuite, Connection,
    ConnectionEnd, ConnectionState, Error, ProtocolVersion, Result,
};
pub use siotls_crypto::CryptoProvider;
pub use siotls_crypto_rustcrypto::RustCryptoProvider;
