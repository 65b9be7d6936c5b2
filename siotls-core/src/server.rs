//! Server-side handshake driver.
//!
//! New session:
//!
//! ```text
//! recv ClientHello                         -> HandshakeStart
//!   send ServerHello, Certificate, ServerHelloDone -> SessionNew
//! recv ClientKeyExchange (premaster decrypted)
//! recv ChangeCipherSpec                    -> HandshakeHalf
//! recv Finished (verified)                 -> HandshakeFull
//!   send ChangeCipherSpec, Finished        -> Open
//! ```
//!
//! Resumption: the hello proposes a session id found in the store, so the
//! server answers with its id echoed plus ChangeCipherSpec and Finished
//! immediately, then waits for the client's pair:
//!
//! ```text
//! recv ClientHello (known id)              -> HandshakeStart
//!   send ServerHello, ChangeCipherSpec, Finished -> SessionResume
//! recv ChangeCipherSpec, Finished (verified)     -> Open
//! ```

use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use crate::cipher_suites::select_cipher_suite;
use crate::connection::{generate_hello_random, Connection, ConnectionState};
use crate::error::{Error, Result};
use crate::messages::{
    Certificate, ClientHello, ClientKeyExchange, Finished, HandshakeMessage, ServerHello,
    ServerHelloDone,
};
use crate::prf;
use crate::protocol::{HandshakeType, ProtocolVersion};
use crate::session::SharedSessionStore;

/// Server-side identity and store handle for one connection.
pub(crate) struct ServerDriver {
    certificate_der: Vec<u8>,
    private_key_der: Vec<u8>,
    store: SharedSessionStore,
    /// Version the client advertised; the decrypted premaster must echo
    /// it.
    client_version: ProtocolVersion,
    sni: Option<String>,
}

impl std::fmt::Debug for ServerDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerDriver")
            .field("sni", &self.sni)
            .finish()
    }
}

impl ServerDriver {
    pub(crate) fn new(
        certificate_der: Vec<u8>,
        private_key_der: Vec<u8>,
        store: SharedSessionStore,
    ) -> Self {
        Self {
            certificate_der,
            private_key_der,
            store,
            client_version: ProtocolVersion::Tls12,
            sni: None,
        }
    }

    pub(crate) fn sni(&self) -> Option<&str> {
        self.sni.as_deref()
    }
}

impl Connection {
    /// Dispatch one reassembled handshake message.
    pub(crate) fn server_handle_handshake(&mut self, message: HandshakeMessage) -> Result<()> {
        match (self.state(), message.msg_type) {
            (ConnectionState::Idle, HandshakeType::ClientHello) => {
                self.server_on_client_hello(message)
            }
            (ConnectionState::SessionNew, HandshakeType::ClientKeyExchange) => {
                self.server_on_client_key_exchange(message)
            }
            (ConnectionState::HandshakeHalf, HandshakeType::Finished)
            | (ConnectionState::SessionResume, HandshakeType::Finished) => {
                self.server_on_finished(message)
            }
            (state, msg_type) => Err(Error::UnexpectedMessage(format!(
                "{:?} in server state {:?}",
                msg_type, state
            ))),
        }
    }

    fn server_on_client_hello(&mut self, message: HandshakeMessage) -> Result<()> {
        let hello = ClientHello::decode(&message.body)?;

        if hello.client_version != ProtocolVersion::Tls12 {
            return Err(Error::UnsupportedVersion(hello.client_version.to_u16()));
        }
        if !hello.compression_methods.contains(&0) {
            return Err(Error::HandshakeFailure(
                "client offered no null compression".into(),
            ));
        }

        let sni = hello.extensions.server_name()?;
        {
            let driver = self.server_driver_mut()?;
            driver.sni = sni;
            driver.client_version = hello.client_version;
        }

        self.pending.transcript.update(&message.raw);
        self.pending.client_random = hello.random;

        // honor a resumption proposal when the store still knows the
        // session and the client re-offered its suite
        let resumable = if hello.session_id.is_empty() {
            None
        } else {
            let store = self.server_driver()?.store.clone();
            let entry = store
                .lock()
                .map_err(|_| Error::InternalError("session store lock poisoned".into()))?
                .get(&hello.session_id)
                .cloned();
            entry.filter(|e| hello.cipher_suites.contains(&e.cipher_suite.to_u16()))
        };

        let provider = self.provider();
        match resumable {
            Some(entry) => {
                self.pending.cipher_suite = Some(entry.cipher_suite);
                self.pending.master_secret = Some(entry.master_secret.clone());
                self.pending.resumed = true;
                self.set_session_id(entry.session_id);
            }
            None => {
                let suite = select_cipher_suite(&hello.cipher_suites).ok_or_else(|| {
                    Error::HandshakeFailure("no mutually supported cipher suite".into())
                })?;
                self.pending.cipher_suite = Some(suite);
                let session_id = provider.random().generate(32)?;
                self.set_session_id(session_id);
            }
        }

        self.pending.server_random = generate_hello_random(&*provider)?;
        self.transition(ConnectionState::HandshakeStart);
        Ok(())
    }

    /// Entry action of HandshakeStart: the server flight.
    pub(crate) fn server_send_flight(&mut self) -> Result<()> {
        let suite = self
            .cipher_suite()
            .ok_or_else(|| Error::InternalError("no cipher suite selected".into()))?;

        let hello = ServerHello::new(
            self.pending.server_random,
            self.session_id().to_vec(),
            suite.to_u16(),
        );
        let body = hello.encode()?;
        self.send_handshake(HandshakeType::ServerHello, &body)?;

        if self.pending.resumed {
            self.send_change_cipher_spec()?;
            let verify_data = self.verify_data(b"server finished")?;
            let body = Finished::new(verify_data).encode()?;
            self.send_handshake(HandshakeType::Finished, &body)?;
            self.transition(ConnectionState::SessionResume);
        } else {
            let certificate_der = self.server_driver()?.certificate_der.clone();
            let body = Certificate::new(vec![certificate_der]).encode()?;
            self.send_handshake(HandshakeType::Certificate, &body)?;
            let body = ServerHelloDone::new().encode();
            self.send_handshake(HandshakeType::ServerHelloDone, &body)?;
            self.transition(ConnectionState::SessionNew);
        }
        Ok(())
    }

    fn server_on_client_key_exchange(&mut self, message: HandshakeMessage) -> Result<()> {
        self.pending.transcript.update(&message.raw);
        let exchange = ClientKeyExchange::decode(&message.body)?;

        let (key_der, client_version) = {
            let driver = self.server_driver()?;
            (driver.private_key_der.clone(), driver.client_version)
        };
        let provider = self.provider();
        let private_key = provider.rsa_private_key(&key_der)?;

        let version_bytes = client_version.to_u16().to_be_bytes();
        let premaster = match private_key.decrypt_pkcs1(&exchange.encrypted_premaster) {
            Ok(pm) if pm.len() == prf::MASTER_SECRET_LENGTH && pm[..2] == version_bytes => {
                Zeroizing::new(pm)
            }
            // RSA padding or version failures must not be observable here;
            // continue with a random premaster and let Finished fail
            _ => {
                let mut pm = Zeroizing::new(vec![0u8; prf::MASTER_SECRET_LENGTH]);
                pm[..2].copy_from_slice(&version_bytes);
                provider.random().fill(&mut pm[2..])?;
                pm
            }
        };

        let master = prf::compute_master_secret(
            &*provider,
            &premaster,
            &self.pending.client_random,
            &self.pending.server_random,
        )?;
        self.pending.master_secret = Some(master);
        Ok(())
    }

    fn server_on_finished(&mut self, message: HandshakeMessage) -> Result<()> {
        if !self.read_protection_active() {
            return Err(Error::UnexpectedMessage(
                "Finished before ChangeCipherSpec".into(),
            ));
        }

        let finished = Finished::decode(&message.body)?;
        let expected = self.verify_data(b"client finished")?;
        if !bool::from(expected.ct_eq(&finished.verify_data)) {
            return Err(Error::HandshakeFailure(
                "client Finished verify_data mismatch".into(),
            ));
        }
        self.pending.transcript.update(&message.raw);

        match self.state() {
            ConnectionState::SessionResume => {
                self.transition(ConnectionState::Open);
            }
            // new session: answer with our own flight
            _ => self.transition(ConnectionState::HandshakeFull),
        }
        Ok(())
    }

    /// Entry action of HandshakeFull: ChangeCipherSpec and the server
    /// Finished, whose transcript includes the client's Finished.
    pub(crate) fn server_send_final_flight(&mut self) -> Result<()> {
        self.send_change_cipher_spec()?;
        let verify_data = self.verify_data(b"server finished")?;
        let body = Finished::new(verify_data).encode()?;
        self.send_handshake(HandshakeType::Finished, &body)?;
        self.transition(ConnectionState::Open);
        Ok(())
    }

    /// Record the completed session in the shared store.
    pub(crate) fn server_record_session(&mut self) {
        let entry = match self.session_entry() {
            Some(entry) => entry,
            None => return,
        };
        if let Ok(driver) = self.server_driver() {
            let store = driver.store.clone();
            let lock_result = store.lock();
            if let Ok(mut store) = lock_result {
                store.insert(entry);
            }
        }
    }

    fn server_driver(&self) -> Result<&ServerDriver> {
        self.server
            .as_ref()
            .ok_or_else(|| Error::InternalError("not a server connection".into()))
    }

    fn server_driver_mut(&mut self) -> Result<&mut ServerDriver> {
        self.server
            .as_mut()
            .ok_or_else(|| Error::InternalError("not a server connection".into()))
    }
}
