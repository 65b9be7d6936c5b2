//! # siotls-core
//!
//! Sans-I/O TLS 1.2 protocol engine: the record layer, the handshake state
//! machine, the cryptographic orchestration and the session cache. The
//! engine performs no socket I/O — the caller feeds received bytes into a
//! [`Connection`] and writes out the records it queues.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │         Public API (siotls)             │
//! └─────────────────┬───────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────┐
//! │      siotls-core (this crate)           │
//! │  ┌──────────────────────────────────┐   │
//! │  │   Connection state machine       │   │
//! │  ├──────────────────────────────────┤   │
//! │  │   Handshake message codecs       │   │
//! │  ├──────────────────────────────────┤   │
//! │  │   Record framing & protection    │   │
//! │  ├──────────────────────────────────┤   │
//! │  │   PRF & key derivation           │   │
//! │  └──────────────────────────────────┘   │
//! └─────────────────┬───────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────┐
//! │     siotls-crypto (trait interface)     │
//! └─────────────────────────────────────────┘
//! ```
//!
//! Inbound bytes flow: record framer → protection decode → content-type
//! demultiplexer → handshake codec / alert handler / application data
//! callback. Outbound messages flow the same path in reverse into a FIFO
//! of ready records.

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub,
    unused_qualifications
)]

pub mod alert;
pub mod cipher_suites;
pub mod codec;
pub mod connection;
pub mod error;
pub mod messages;
pub mod params;
pub mod prf;
pub mod protection;
pub mod protocol;
pub mod record;
pub mod session;
pub mod transcript;

mod client;
mod server;

pub use alert::{Alert, AlertLevel};
pub use cipher_suites::{default_cipher_suites, CipherSuite};
pub use connection::{Connection, ConnectionState};
pub use error::{AlertDescription, Error, Result};
pub use params::ConnectionEnd;
pub use protocol::{ContentType, ProtocolVersion};
pub use session::{
    SessionCache, SessionEntry, SessionStore, SharedSessionCache, SharedSessionStore,
};
