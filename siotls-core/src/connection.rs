//! Connection engine: record demultiplexing, state machine and queues.
//!
//! A [`Connection`] is sans-I/O: the caller feeds raw transport bytes via
//! [`Connection::feed`] and drains fully-framed outbound records via
//! [`Connection::next_record`]. Processing is synchronous; application data
//! and handshake milestones surface through callbacks invoked re-entrantly
//! in the feeder's stack frame, and those callbacks may themselves call
//! [`Connection::send`] and [`Connection::close`].
//!
//! Endpoint-specific handshake logic lives in the client and server driver
//! modules; this file owns everything both share: framing, protection
//! state, the out-queue, alert handling and the state-entry dispatch.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use siotls_crypto::CryptoProvider;
use zeroize::Zeroizing;

use crate::alert::Alert;
use crate::cipher_suites::CipherSuite;
use crate::client::ClientDriver;
use crate::error::{AlertDescription, Error, Result};
use crate::messages::{self, HandshakeReassembler};
use crate::params::{ConnectionEnd, KeyBlock, SecurityParameters};
use crate::prf;
use crate::protection::RecordProtection;
use crate::protocol::{ContentType, HandshakeType, ProtocolVersion};
use crate::record::{self, RecordHeader, MAX_FRAGMENT_SIZE, RECORD_HEADER_SIZE};
use crate::server::ServerDriver;
use crate::session::{SessionEntry, SharedSessionCache, SharedSessionStore};
use crate::transcript::HandshakeTranscript;

/// Connection lifecycle states, in monotonic order: a connection never
/// moves backwards during a handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConnectionState {
    /// Server created, waiting for ClientHello.
    Idle,

    /// Hello exchange underway (client: ClientHello sent; server:
    /// ClientHello received, flight queued).
    HandshakeStart,

    /// Full handshake: negotiating a fresh session.
    SessionNew,

    /// Abbreviated handshake: the server echoed the proposed session id.
    SessionResume,

    /// One side's final flight is out; ChangeCipherSpec pivots apply.
    HandshakeHalf,

    /// Peer's Finished received and verified (client), or about to answer
    /// it (server).
    HandshakeFull,

    /// Handshake complete; application data flows.
    Open,

    /// Terminal: closed by alert, error or local close.
    Closed,
}

/// Callback invoked with each decrypted ApplicationData fragment.
pub type DataCallback = Box<dyn FnMut(&mut Connection, &[u8]) + Send>;

/// Callback invoked once when the handshake completes.
pub type HandshakeFinishedCallback = Box<dyn FnMut(&mut Connection) + Send>;

/// Callback invoked on every state transition with (previous, new).
pub type StateChangeCallback = Box<dyn FnMut(&mut Connection, ConnectionState, ConnectionState) + Send>;

/// Callback invoked with the alert description when the connection fails
/// or the peer sends a fatal alert.
pub type ErrorCallback = Box<dyn FnMut(AlertDescription) + Send>;

/// Parameters being negotiated by the current handshake. Applied to a
/// direction's protection state only by that direction's ChangeCipherSpec.
#[derive(Debug, Default)]
pub(crate) struct PendingParameters {
    pub(crate) cipher_suite: Option<CipherSuite>,
    pub(crate) session_id: Vec<u8>,
    pub(crate) client_random: [u8; 32],
    pub(crate) server_random: [u8; 32],
    pub(crate) master_secret: Option<Zeroizing<Vec<u8>>>,
    pub(crate) key_block: Option<KeyBlock>,
    pub(crate) peer_certificate: Option<Vec<u8>>,
    pub(crate) resumed: bool,
    pub(crate) transcript: HandshakeTranscript,
}

/// One TLS 1.2 connection endpoint.
pub struct Connection {
    provider: Arc<dyn CryptoProvider>,
    role: ConnectionEnd,
    state: ConnectionState,
    version: ProtocolVersion,
    session_id: Vec<u8>,
    pub(crate) pending: PendingParameters,
    read_protection: RecordProtection,
    write_protection: RecordProtection,
    reassembler: HandshakeReassembler,
    out_queue: VecDeque<Vec<u8>>,
    shutdown: bool,
    error: Option<AlertDescription>,
    handshake_finished: bool,
    renegotiation_refused: bool,

    pub(crate) client: Option<ClientDriver>,
    pub(crate) server: Option<ServerDriver>,

    on_data: Option<DataCallback>,
    on_handshake_finish: Option<HandshakeFinishedCallback>,
    on_change_state: Option<StateChangeCallback>,
    on_error: Option<ErrorCallback>,
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("role", &self.role)
            .field("state", &self.state)
            .field("session_id_len", &self.session_id.len())
            .field("queued_records", &self.out_queue.len())
            .field("shutdown", &self.shutdown)
            .field("error", &self.error)
            .finish()
    }
}

impl Connection {
    /// Create a client connection to `server_name` and enqueue its
    /// ClientHello. If the shared cache holds a session for the name, the
    /// hello proposes resuming it.
    pub fn client(
        provider: Arc<dyn CryptoProvider>,
        server_name: &str,
        cipher_suites: Vec<CipherSuite>,
        session_cache: SharedSessionCache,
    ) -> Result<Self> {
        let driver = ClientDriver::new(server_name, cipher_suites, session_cache)?;
        let mut conn = Self::new(provider, ConnectionEnd::Client);
        conn.client = Some(driver);
        conn.client_start()?;
        Ok(conn)
    }

    /// Create a server connection with the given identity, waiting for a
    /// ClientHello.
    pub fn server(
        provider: Arc<dyn CryptoProvider>,
        certificate_der: Vec<u8>,
        private_key_der: Vec<u8>,
        session_store: SharedSessionStore,
    ) -> Result<Self> {
        let mut conn = Self::new(provider, ConnectionEnd::Server);
        conn.server = Some(ServerDriver::new(
            certificate_der,
            private_key_der,
            session_store,
        ));
        Ok(conn)
    }

    fn new(provider: Arc<dyn CryptoProvider>, role: ConnectionEnd) -> Self {
        Self {
            provider,
            role,
            state: ConnectionState::Idle,
            version: ProtocolVersion::Tls12,
            session_id: Vec::new(),
            pending: PendingParameters::default(),
            read_protection: RecordProtection::new(),
            write_protection: RecordProtection::new(),
            reassembler: HandshakeReassembler::new(),
            out_queue: VecDeque::new(),
            shutdown: false,
            error: None,
            handshake_finished: false,
            renegotiation_refused: false,
            client: None,
            server: None,
            on_data: None,
            on_handshake_finish: None,
            on_change_state: None,
            on_error: None,
        }
    }

    // ---- public surface -------------------------------------------------

    /// Process transport bytes, returning how many were consumed.
    ///
    /// Zero or more whole records are processed synchronously; a trailing
    /// partial record is left unconsumed for the caller to re-present with
    /// more bytes appended. After shutdown all input is discarded.
    pub fn feed(&mut self, data: &[u8]) -> Result<usize> {
        if self.shutdown {
            return Ok(data.len());
        }

        let mut consumed = 0;
        while !self.shutdown {
            let remaining = &data[consumed..];
            let header = match record::peek_header(remaining) {
                Ok(Some(header)) => header,
                Ok(None) => break,
                Err(e) => return Err(self.fail(e)),
            };
            let total = header.record_size();
            if remaining.len() < total {
                break;
            }
            let payload = &remaining[RECORD_HEADER_SIZE..total];
            consumed += total;
            if let Err(e) = self.process_record(header, payload) {
                return Err(self.fail(e));
            }
        }

        if self.shutdown {
            consumed = data.len();
        }
        Ok(consumed)
    }

    /// Pop the next fully-framed outbound record, if any.
    pub fn next_record(&mut self) -> Option<Vec<u8>> {
        self.out_queue.pop_front()
    }

    /// Queue application data for transmission. Only valid while open;
    /// fragments larger than 2^14 are split across records.
    pub fn send(&mut self, data: &[u8]) -> Result<()> {
        if self.shutdown {
            return Err(Error::ConnectionClosed);
        }
        if self.state != ConnectionState::Open {
            return Err(Error::UnexpectedMessage(
                "cannot send application data before the handshake completes".into(),
            ));
        }

        if data.is_empty() {
            return self.send_record(ContentType::ApplicationData, &[]);
        }
        for chunk in data.chunks(MAX_FRAGMENT_SIZE) {
            self.send_record(ContentType::ApplicationData, chunk)?;
        }
        Ok(())
    }

    /// Close the connection: queue a close_notify and transition to
    /// Closed. Idempotent.
    pub fn close(&mut self) {
        if self.shutdown {
            return;
        }
        let _ = self.send_alert(Alert::close_notify());
        self.shutdown = true;
        self.transition(ConnectionState::Closed);
    }

    /// Whether the connection is closed and the out-queue drained.
    pub fn is_shutdown(&self) -> bool {
        self.shutdown && self.out_queue.is_empty()
    }

    /// Current state.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// This endpoint's role.
    pub fn role(&self) -> ConnectionEnd {
        self.role
    }

    /// The active session id.
    pub fn session_id(&self) -> &[u8] {
        &self.session_id
    }

    /// The negotiated cipher suite, once the hello exchange has selected
    /// one.
    pub fn cipher_suite(&self) -> Option<CipherSuite> {
        self.pending.cipher_suite
    }

    /// The alert description recorded when the connection failed.
    pub fn error(&self) -> Option<AlertDescription> {
        self.error
    }

    /// Records processed inbound since the last ChangeCipherSpec.
    pub fn read_sequence_number(&self) -> u64 {
        self.read_protection.sequence_number()
    }

    /// Records queued outbound since the last ChangeCipherSpec.
    pub fn write_sequence_number(&self) -> u64 {
        self.write_protection.sequence_number()
    }

    /// The server name the peer indicated via SNI (server role only).
    pub fn server_name_indication(&self) -> Option<&str> {
        self.server.as_ref().and_then(|s| s.sni())
    }

    /// Install the application-data callback.
    pub fn set_on_data(&mut self, callback: DataCallback) {
        self.on_data = Some(callback);
    }

    /// Install the handshake-completion callback.
    pub fn set_on_handshake_finish(&mut self, callback: HandshakeFinishedCallback) {
        self.on_handshake_finish = Some(callback);
    }

    /// Install the state-transition callback.
    pub fn set_on_change_state(&mut self, callback: StateChangeCallback) {
        self.on_change_state = Some(callback);
    }

    /// Install the error callback.
    pub fn set_on_error(&mut self, callback: ErrorCallback) {
        self.on_error = Some(callback);
    }

    // ---- record demultiplexing ------------------------------------------

    fn process_record(&mut self, header: RecordHeader, payload: &[u8]) -> Result<()> {
        let provider = self.provider.clone();
        // the MAC covers the version field as written on the wire
        let plaintext =
            self.read_protection
                .decode(&*provider, header.content_type, header.version, payload)?;
        // compression is the null method: decode is the identity

        match header.content_type {
            ContentType::Handshake => self.process_handshake_fragment(&plaintext),
            ContentType::ChangeCipherSpec => self.process_change_cipher_spec(&plaintext),
            ContentType::Alert => self.process_alert(&plaintext),
            ContentType::ApplicationData => self.process_application_data(&plaintext),
        }
    }

    fn process_handshake_fragment(&mut self, fragment: &[u8]) -> Result<()> {
        if self.state == ConnectionState::Open {
            // no renegotiation: refuse once, then ignore the stream
            if !self.renegotiation_refused {
                self.renegotiation_refused = true;
                self.send_alert(Alert::warning(AlertDescription::NoRenegotiation))?;
            }
            return Ok(());
        }

        self.reassembler.push(fragment);
        while let Some(message) = self.reassembler.next_message()? {
            if self.shutdown {
                break;
            }
            if message.msg_type == HandshakeType::HelloRequest {
                match self.role {
                    // a mid-handshake HelloRequest is ignored and kept out
                    // of the transcript
                    ConnectionEnd::Client => continue,
                    ConnectionEnd::Server => {
                        return Err(Error::UnexpectedMessage(
                            "HelloRequest sent to a server".into(),
                        ))
                    }
                }
            }
            match self.role {
                ConnectionEnd::Client => self.client_handle_handshake(message)?,
                ConnectionEnd::Server => self.server_handle_handshake(message)?,
            }
        }
        Ok(())
    }

    fn process_change_cipher_spec(&mut self, fragment: &[u8]) -> Result<()> {
        if fragment != [0x01] {
            return Err(Error::InvalidMessage(
                "ChangeCipherSpec must be a single 0x01 byte".into(),
            ));
        }
        if self.reassembler.has_partial() {
            return Err(Error::UnexpectedMessage(
                "ChangeCipherSpec interleaved with a fragmented handshake message".into(),
            ));
        }
        if self.pending.master_secret.is_none() {
            return Err(Error::UnexpectedMessage(
                "ChangeCipherSpec before key exchange".into(),
            ));
        }

        match (self.role, self.state) {
            (ConnectionEnd::Client, ConnectionState::HandshakeHalf)
            | (ConnectionEnd::Client, ConnectionState::SessionResume)
            | (ConnectionEnd::Server, ConnectionState::SessionResume) => self.activate_read(),
            (ConnectionEnd::Server, ConnectionState::SessionNew) => {
                self.activate_read()?;
                self.transition(ConnectionState::HandshakeHalf);
                Ok(())
            }
            _ => Err(Error::UnexpectedMessage(format!(
                "ChangeCipherSpec in state {:?}",
                self.state
            ))),
        }
    }

    fn process_alert(&mut self, fragment: &[u8]) -> Result<()> {
        let alert = Alert::decode(fragment)?;

        if alert.description == AlertDescription::CloseNotify {
            // answer the peer's closure, then stop
            let _ = self.send_alert(Alert::close_notify());
            self.shutdown = true;
            self.transition(ConnectionState::Closed);
            return Ok(());
        }

        if alert.is_closing() {
            self.error = Some(alert.description);
            self.shutdown = true;
            self.transition(ConnectionState::Closed);
            self.emit_error(alert.description);
            return Ok(());
        }

        // non-closing warnings carry no state
        Ok(())
    }

    fn process_application_data(&mut self, fragment: &[u8]) -> Result<()> {
        if self.state == ConnectionState::Open {
            self.emit_data(fragment);
            return Ok(());
        }
        if fragment.is_empty() {
            // empty records (traffic-analysis padding) are tolerated early
            return Ok(());
        }
        Err(Error::UnexpectedMessage(format!(
            "application data in state {:?}",
            self.state
        )))
    }

    // ---- outbound helpers (shared with the drivers) ---------------------

    pub(crate) fn send_record(&mut self, content_type: ContentType, fragment: &[u8]) -> Result<()> {
        let provider = self.provider.clone();
        // compression is the null method: encode is the identity
        let payload =
            self.write_protection
                .encode(&*provider, content_type, self.version, fragment)?;
        let framed = record::encode_record(content_type, self.version, &payload)?;
        self.out_queue.push_back(framed);
        Ok(())
    }

    pub(crate) fn send_handshake(&mut self, msg_type: HandshakeType, body: &[u8]) -> Result<()> {
        let message = messages::encode_handshake(msg_type, body)?;
        self.pending.transcript.update(&message);
        self.send_record(ContentType::Handshake, &message)
    }

    /// Queue a ChangeCipherSpec (under the old epoch) and pivot the write
    /// direction onto the pending parameters.
    pub(crate) fn send_change_cipher_spec(&mut self) -> Result<()> {
        self.send_record(ContentType::ChangeCipherSpec, &[0x01])?;
        self.activate_write()
    }

    pub(crate) fn send_alert(&mut self, alert: Alert) -> Result<()> {
        let encoded = alert.encode();
        self.send_record(ContentType::Alert, &encoded)
    }

    // ---- cipher pivot ---------------------------------------------------

    fn security_parameters(&self) -> Result<SecurityParameters> {
        let cipher_suite = self
            .pending
            .cipher_suite
            .ok_or_else(|| Error::InternalError("no cipher suite negotiated".into()))?;
        let master_secret = self
            .pending
            .master_secret
            .clone()
            .ok_or_else(|| Error::InternalError("no master secret".into()))?;
        Ok(SecurityParameters::new(
            self.role,
            cipher_suite,
            master_secret,
            self.pending.client_random,
            self.pending.server_random,
        ))
    }

    fn ensure_key_block(&mut self) -> Result<()> {
        if self.pending.key_block.is_some() {
            return Ok(());
        }
        let cipher_suite = self
            .pending
            .cipher_suite
            .ok_or_else(|| Error::InternalError("no cipher suite negotiated".into()))?;
        let master_secret = self
            .pending
            .master_secret
            .as_ref()
            .ok_or_else(|| Error::InternalError("no master secret".into()))?;

        let raw = prf::compute_key_block(
            &*self.provider,
            master_secret,
            &self.pending.server_random,
            &self.pending.client_random,
            cipher_suite.key_block_length(),
        )?;
        self.pending.key_block = Some(KeyBlock::split(cipher_suite, &raw)?);
        Ok(())
    }

    fn activate_write(&mut self) -> Result<()> {
        let params = self.security_parameters()?;
        self.ensure_key_block()?;
        let provider = self.provider.clone();
        let key_block = self
            .pending
            .key_block
            .as_ref()
            .ok_or_else(|| Error::InternalError("key block missing".into()))?;
        self.write_protection
            .activate(&*provider, &params, key_block, self.role)
    }

    fn activate_read(&mut self) -> Result<()> {
        let params = self.security_parameters()?;
        self.ensure_key_block()?;
        let provider = self.provider.clone();
        let key_block = self
            .pending
            .key_block
            .as_ref()
            .ok_or_else(|| Error::InternalError("key block missing".into()))?;
        self.read_protection
            .activate(&*provider, &params, key_block, self.role.peer())
    }

    // ---- state machine --------------------------------------------------

    /// Move to `new`, firing the transition callback and the new state's
    /// entry actions. States only ever advance.
    pub(crate) fn transition(&mut self, new: ConnectionState) {
        let prev = self.state;
        if new == prev {
            return;
        }
        debug_assert!(
            new > prev || new == ConnectionState::Closed,
            "state may not regress: {:?} -> {:?}",
            prev,
            new
        );
        self.state = new;
        self.emit_change_state(prev, new);
        if let Err(e) = self.enter_state(new) {
            // an entry action failing is a connection failure
            let _ = self.fail(e);
        }
    }

    fn enter_state(&mut self, state: ConnectionState) -> Result<()> {
        match (self.role, state) {
            // client: server's flight is complete, answer with ours
            (ConnectionEnd::Client, ConnectionState::HandshakeHalf) => self.client_send_flight(),
            // client: server Finished verified
            (ConnectionEnd::Client, ConnectionState::HandshakeFull) => {
                self.transition(ConnectionState::Open);
                Ok(())
            }
            // server: ClientHello processed, send our flight
            (ConnectionEnd::Server, ConnectionState::HandshakeStart) => self.server_send_flight(),
            // server: client Finished verified, answer and open
            (ConnectionEnd::Server, ConnectionState::HandshakeFull) => {
                self.server_send_final_flight()
            }
            (_, ConnectionState::Open) => {
                self.finish_handshake();
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn finish_handshake(&mut self) {
        if self.handshake_finished {
            return;
        }
        self.handshake_finished = true;

        match self.role {
            ConnectionEnd::Client => self.client_record_session(),
            ConnectionEnd::Server => self.server_record_session(),
        }
        self.emit_handshake_finish();
    }

    /// Session snapshot for the cache/store, once the handshake holds a
    /// suite and master secret.
    pub(crate) fn session_entry(&self) -> Option<SessionEntry> {
        if self.session_id.is_empty() {
            return None;
        }
        Some(SessionEntry {
            session_id: self.session_id.clone(),
            version: self.version,
            cipher_suite: self.pending.cipher_suite?,
            compression: Default::default(),
            master_secret: self.pending.master_secret.clone()?,
        })
    }

    pub(crate) fn set_session_id(&mut self, session_id: Vec<u8>) {
        self.session_id = session_id.clone();
        self.pending.session_id = session_id;
    }

    pub(crate) fn provider(&self) -> Arc<dyn CryptoProvider> {
        self.provider.clone()
    }

    /// Finished verify data over the transcript as recorded so far.
    ///
    /// The caller sequences this around transcript updates: an endpoint
    /// computes its own verify data before its Finished enters the
    /// transcript, and checks the peer's before recording the peer's.
    pub(crate) fn verify_data(&self, label: &[u8]) -> Result<Vec<u8>> {
        let master_secret = self
            .pending
            .master_secret
            .as_ref()
            .ok_or_else(|| Error::InternalError("no master secret".into()))?;
        let transcript_hash = self.pending.transcript.hash(&*self.provider)?;
        prf::compute_verify_data(&*self.provider, master_secret, label, &transcript_hash)
    }

    /// Whether the inbound direction has pivoted onto the pending cipher
    /// spec. Finished must be the first record of the new epoch.
    pub(crate) fn read_protection_active(&self) -> bool {
        self.read_protection.is_active()
    }

    // ---- failure --------------------------------------------------------

    /// Record a fatal failure: queue the mapped alert, surface the error
    /// and close.
    fn fail(&mut self, error: Error) -> Error {
        let description = error.alert_description();
        if !self.shutdown {
            let _ = self.send_alert(Alert::fatal(description));
        }
        self.error = Some(description);
        self.shutdown = true;
        if self.state != ConnectionState::Closed {
            self.transition(ConnectionState::Closed);
        }
        self.emit_error(description);
        error
    }

    // ---- callback plumbing ----------------------------------------------

    fn emit_data(&mut self, data: &[u8]) {
        if let Some(mut callback) = self.on_data.take() {
            callback(self, data);
            self.on_data = Some(callback);
        }
    }

    fn emit_handshake_finish(&mut self) {
        if let Some(mut callback) = self.on_handshake_finish.take() {
            callback(self);
            self.on_handshake_finish = Some(callback);
        }
    }

    fn emit_change_state(&mut self, prev: ConnectionState, new: ConnectionState) {
        if let Some(mut callback) = self.on_change_state.take() {
            callback(self, prev, new);
            self.on_change_state = Some(callback);
        }
    }

    fn emit_error(&mut self, description: AlertDescription) {
        if let Some(callback) = self.on_error.as_mut() {
            callback(description);
        }
    }
}

/// Hello random: 4 bytes of gmt_unix_time followed by 28 random bytes.
pub(crate) fn generate_hello_random(provider: &dyn CryptoProvider) -> Result<[u8; 32]> {
    let mut random = [0u8; 32];
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as u32)
        .unwrap_or(0);
    random[..4].copy_from_slice(&now.to_be_bytes());
    provider.random().fill(&mut random[4..])?;
    Ok(random)
}
