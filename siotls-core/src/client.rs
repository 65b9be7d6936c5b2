//! Client-side handshake driver.
//!
//! New session:
//!
//! ```text
//! send ClientHello                         -> HandshakeStart
//! recv ServerHello                         -> SessionNew
//! recv Certificate
//! recv ServerHelloDone                     -> HandshakeHalf
//!   send ClientKeyExchange, ChangeCipherSpec, Finished
//! recv ChangeCipherSpec
//! recv Finished (verified)                 -> HandshakeFull -> Open
//! ```
//!
//! Resumption: the cache holds a session for the server name, so the hello
//! proposes its id; if the server echoes it the flow collapses to
//!
//! ```text
//! recv ServerHello (id echoed)             -> SessionResume
//! recv ChangeCipherSpec, Finished (verified)
//!   send ChangeCipherSpec, Finished        -> Open
//! ```
//!
//! A differing id evicts the stale cache entry and rejoins the new-session
//! flow.

use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use crate::cipher_suites::CipherSuite;
use crate::connection::{generate_hello_random, Connection, ConnectionState};
use crate::error::{Error, Result};
use crate::messages::{
    Certificate, ClientHello, ClientKeyExchange, Extension, Extensions, Finished,
    HandshakeMessage, ServerHello, ServerHelloDone,
};
use crate::prf;
use crate::protocol::{HandshakeType, ProtocolVersion};
use crate::session::{SessionEntry, SharedSessionCache};

/// Client-side configuration and cache handle for one connection.
pub(crate) struct ClientDriver {
    server_name: String,
    configured_suites: Vec<CipherSuite>,
    cache: SharedSessionCache,
    offered_session: Option<SessionEntry>,
    /// The version advertised in ClientHello; the premaster secret must
    /// encode this one, not the negotiated one.
    proposed_version: ProtocolVersion,
}

impl std::fmt::Debug for ClientDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientDriver")
            .field("server_name", &self.server_name)
            .field("resuming", &self.offered_session.is_some())
            .finish()
    }
}

impl ClientDriver {
    pub(crate) fn new(
        server_name: &str,
        cipher_suites: Vec<CipherSuite>,
        cache: SharedSessionCache,
    ) -> Result<Self> {
        if cipher_suites.is_empty() {
            return Err(Error::HandshakeFailure("no cipher suites to offer".into()));
        }
        let offered_session = cache
            .lock()
            .map_err(|_| Error::InternalError("session cache lock poisoned".into()))?
            .get(server_name)
            .cloned();
        Ok(Self {
            server_name: server_name.to_string(),
            configured_suites: cipher_suites,
            cache,
            offered_session,
            proposed_version: ProtocolVersion::Tls12,
        })
    }
}

impl Connection {
    /// Build and queue the ClientHello.
    pub(crate) fn client_start(&mut self) -> Result<()> {
        let (offer, session_id, server_name) = {
            let driver = self.client_driver()?;
            match &driver.offered_session {
                // propose the cached session: its id, and a single-element
                // suite list matching what it negotiated
                Some(entry) => (
                    vec![entry.cipher_suite],
                    entry.session_id.clone(),
                    driver.server_name.clone(),
                ),
                None => (
                    driver.configured_suites.clone(),
                    Vec::new(),
                    driver.server_name.clone(),
                ),
            }
        };

        let provider = self.provider();
        let random = generate_hello_random(&*provider)?;
        self.pending.client_random = random;
        self.pending.session_id = session_id.clone();

        let mut extensions = Extensions::new();
        extensions.add(Extension::server_name(&server_name)?);

        let hello = ClientHello::new(random, offer.iter().map(|s| s.to_u16()).collect())
            .with_session_id(session_id)
            .with_extensions(extensions);

        let body = hello.encode()?;
        self.send_handshake(HandshakeType::ClientHello, &body)?;
        self.transition(ConnectionState::HandshakeStart);
        Ok(())
    }

    /// Dispatch one reassembled handshake message.
    pub(crate) fn client_handle_handshake(&mut self, message: HandshakeMessage) -> Result<()> {
        match (self.state(), message.msg_type) {
            (ConnectionState::HandshakeStart, HandshakeType::ServerHello) => {
                self.client_on_server_hello(message)
            }
            (ConnectionState::SessionNew, HandshakeType::Certificate) => {
                self.client_on_certificate(message)
            }
            (ConnectionState::SessionNew, HandshakeType::ServerHelloDone) => {
                self.client_on_server_hello_done(message)
            }
            (ConnectionState::HandshakeHalf, HandshakeType::Finished)
            | (ConnectionState::SessionResume, HandshakeType::Finished) => {
                self.client_on_finished(message)
            }
            (state, msg_type) => Err(Error::UnexpectedMessage(format!(
                "{:?} in client state {:?}",
                msg_type, state
            ))),
        }
    }

    fn client_on_server_hello(&mut self, message: HandshakeMessage) -> Result<()> {
        let hello = ServerHello::decode(&message.body)?;

        if hello.server_version != ProtocolVersion::Tls12 {
            return Err(Error::UnsupportedVersion(hello.server_version.to_u16()));
        }
        if hello.compression_method != 0 {
            return Err(Error::HandshakeFailure(
                "server selected a compression method".into(),
            ));
        }
        let suite = CipherSuite::from_u16(hello.cipher_suite).ok_or_else(|| {
            Error::HandshakeFailure(format!(
                "server selected unknown cipher suite {:#06x}",
                hello.cipher_suite
            ))
        })?;

        self.pending.transcript.update(&message.raw);
        self.pending.server_random = hello.random;
        self.pending.cipher_suite = Some(suite);
        self.set_session_id(hello.session_id.clone());

        let offered = self.client_driver()?.offered_session.clone();
        if let Some(entry) = offered {
            if !hello.session_id.is_empty() && entry.session_id == hello.session_id {
                if entry.cipher_suite != suite {
                    return Err(Error::HandshakeFailure(
                        "resumed session with a different cipher suite".into(),
                    ));
                }
                self.pending.master_secret = Some(entry.master_secret.clone());
                self.pending.resumed = true;
                self.transition(ConnectionState::SessionResume);
                return Ok(());
            }

            // server declined the proposal: drop the stale entry
            let (cache, name) = {
                let driver = self.client_driver()?;
                (driver.cache.clone(), driver.server_name.clone())
            };
            if let Ok(mut cache) = cache.lock() {
                cache.evict(&name);
            }
            self.client_driver_mut()?.offered_session = None;
        }

        self.transition(ConnectionState::SessionNew);
        Ok(())
    }

    fn client_on_certificate(&mut self, message: HandshakeMessage) -> Result<()> {
        let certificate = Certificate::decode(&message.body)?;
        let leaf = certificate
            .leaf()
            .ok_or_else(|| Error::HandshakeFailure("server sent no certificate".into()))?;
        self.pending.peer_certificate = Some(leaf.to_vec());
        self.pending.transcript.update(&message.raw);
        Ok(())
    }

    fn client_on_server_hello_done(&mut self, message: HandshakeMessage) -> Result<()> {
        ServerHelloDone::decode(&message.body)?;
        if self.pending.peer_certificate.is_none() {
            return Err(Error::UnexpectedMessage(
                "ServerHelloDone before Certificate".into(),
            ));
        }
        self.pending.transcript.update(&message.raw);
        self.transition(ConnectionState::HandshakeHalf);
        Ok(())
    }

    /// Entry action of HandshakeHalf: ClientKeyExchange, ChangeCipherSpec,
    /// Finished.
    pub(crate) fn client_send_flight(&mut self) -> Result<()> {
        let provider = self.provider();
        let certificate = self
            .pending
            .peer_certificate
            .clone()
            .ok_or_else(|| Error::InternalError("no server certificate retained".into()))?;
        let proposed_version = self.client_driver()?.proposed_version;

        // premaster: the version offered in ClientHello, then 46 random
        // bytes (downgrade protection lives in those two bytes)
        let mut premaster = Zeroizing::new(vec![0u8; 48]);
        premaster[..2].copy_from_slice(&proposed_version.to_u16().to_be_bytes());
        provider.random().fill(&mut premaster[2..])?;

        let master = prf::compute_master_secret(
            &*provider,
            &premaster,
            &self.pending.client_random,
            &self.pending.server_random,
        )?;
        self.pending.master_secret = Some(master);

        let public_key = provider
            .certificate_public_key(&certificate)
            .map_err(|e| Error::HandshakeFailure(format!("server certificate: {}", e)))?;
        let encrypted = public_key.encrypt_pkcs1(&premaster)?;

        let body = ClientKeyExchange::new(encrypted).encode()?;
        self.send_handshake(HandshakeType::ClientKeyExchange, &body)?;

        self.send_change_cipher_spec()?;

        let verify_data = self.verify_data(b"client finished")?;
        let body = Finished::new(verify_data).encode()?;
        self.send_handshake(HandshakeType::Finished, &body)?;
        Ok(())
    }

    fn client_on_finished(&mut self, message: HandshakeMessage) -> Result<()> {
        if !self.read_protection_active() {
            return Err(Error::UnexpectedMessage(
                "Finished before ChangeCipherSpec".into(),
            ));
        }

        let finished = Finished::decode(&message.body)?;
        let expected = self.verify_data(b"server finished")?;
        if !bool::from(expected.ct_eq(&finished.verify_data)) {
            return Err(Error::HandshakeFailure(
                "server Finished verify_data mismatch".into(),
            ));
        }
        self.pending.transcript.update(&message.raw);

        match self.state() {
            ConnectionState::SessionResume => {
                // answer in kind, then the session is live
                self.send_change_cipher_spec()?;
                let verify_data = self.verify_data(b"client finished")?;
                let body = Finished::new(verify_data).encode()?;
                self.send_handshake(HandshakeType::Finished, &body)?;
                self.transition(ConnectionState::Open);
            }
            _ => self.transition(ConnectionState::HandshakeFull),
        }
        Ok(())
    }

    /// Record the completed session in the shared cache.
    pub(crate) fn client_record_session(&mut self) {
        let entry = match self.session_entry() {
            Some(entry) => entry,
            None => return,
        };
        if let Ok(driver) = self.client_driver() {
            let cache = driver.cache.clone();
            let name = driver.server_name.clone();
            let lock_result = cache.lock();
            if let Ok(mut cache) = lock_result {
                cache.insert(&name, entry);
            }
        }
    }

    fn client_driver(&self) -> Result<&ClientDriver> {
        self.client
            .as_ref()
            .ok_or_else(|| Error::InternalError("not a client connection".into()))
    }

    fn client_driver_mut(&mut self) -> Result<&mut ClientDriver> {
        self.client
            .as_mut()
            .ok_or_else(|| Error::InternalError("not a client connection".into()))
    }
}
