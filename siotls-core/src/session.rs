//! Session caching for abbreviated handshakes.
//!
//! The client remembers negotiated parameters per server name and offers
//! the old session id on reconnect; the server remembers issued sessions by
//! id so it can honor such offers. Entries are immutable snapshots: there
//! is no partial update, only insert and evict.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use zeroize::Zeroizing;

use crate::cipher_suites::CipherSuite;
use crate::protocol::{CompressionMethod, ProtocolVersion};

/// Snapshot of a completed session, sufficient to re-derive keys on
/// resumption with fresh randoms.
#[derive(Debug, Clone)]
pub struct SessionEntry {
    /// Session id issued by the server (1-32 bytes).
    pub session_id: Vec<u8>,

    /// Negotiated protocol version.
    pub version: ProtocolVersion,

    /// Negotiated cipher suite.
    pub cipher_suite: CipherSuite,

    /// Negotiated compression method.
    pub compression: CompressionMethod,

    /// Master secret of the session.
    pub master_secret: Zeroizing<Vec<u8>>,
}

/// Client-side session cache, keyed by server name.
///
/// Owned by the client driver object and shared by reference across its
/// connections.
#[derive(Debug, Default)]
pub struct SessionCache {
    entries: HashMap<String, SessionEntry>,
}

impl SessionCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the cached session for a server name.
    pub fn get(&self, server_name: &str) -> Option<&SessionEntry> {
        self.entries.get(server_name)
    }

    /// Record a session, replacing any previous entry for the name.
    pub fn insert(&mut self, server_name: &str, entry: SessionEntry) {
        self.entries.insert(server_name.to_string(), entry);
    }

    /// Drop the entry for a server name (the server invalidated it).
    pub fn evict(&mut self, server_name: &str) {
        self.entries.remove(server_name);
    }

    /// Number of cached sessions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Server-side session store, keyed by session id.
#[derive(Debug, Default)]
pub struct SessionStore {
    entries: HashMap<Vec<u8>, SessionEntry>,
}

impl SessionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a session by id.
    pub fn get(&self, session_id: &[u8]) -> Option<&SessionEntry> {
        self.entries.get(session_id)
    }

    /// Record an issued session.
    pub fn insert(&mut self, entry: SessionEntry) {
        self.entries.insert(entry.session_id.clone(), entry);
    }

    /// Number of stored sessions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Cache handle shared across a client's connections.
pub type SharedSessionCache = Arc<Mutex<SessionCache>>;

/// Store handle shared across a server's connections.
pub type SharedSessionStore = Arc<Mutex<SessionStore>>;

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &[u8]) -> SessionEntry {
        SessionEntry {
            session_id: id.to_vec(),
            version: ProtocolVersion::Tls12,
            cipher_suite: CipherSuite::RsaWithAes128CbcSha,
            compression: CompressionMethod::Null,
            master_secret: Zeroizing::new(vec![0x5C; 48]),
        }
    }

    #[test]
    fn test_cache_insert_get_evict() {
        let mut cache = SessionCache::new();
        assert!(cache.is_empty());

        cache.insert("example.com", entry(&[1; 32]));
        assert_eq!(cache.len(), 1);
        assert_eq!(
            cache.get("example.com").unwrap().session_id,
            vec![1; 32]
        );
        assert!(cache.get("other.com").is_none());

        cache.evict("example.com");
        assert!(cache.get("example.com").is_none());
    }

    #[test]
    fn test_cache_replaces_entry() {
        let mut cache = SessionCache::new();
        cache.insert("example.com", entry(&[1; 32]));
        cache.insert("example.com", entry(&[2; 32]));
        assert_eq!(cache.len(), 1);
        assert_eq!(
            cache.get("example.com").unwrap().session_id,
            vec![2; 32]
        );
    }

    #[test]
    fn test_store_keyed_by_id() {
        let mut store = SessionStore::new();
        store.insert(entry(&[7; 32]));
        assert!(store.get(&[7; 32]).is_some());
        assert!(store.get(&[8; 32]).is_none());
    }
}
