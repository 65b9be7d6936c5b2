//! Shared harness for the integration tests: fixtures and in-memory
//! record shuttling between two connection endpoints.

// each test binary uses a different subset of this module
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use siotls::{Connection, ConnectionState, Server, ServerConfig};

/// 2048-bit RSA self-signed certificate for CN=example.com.
pub const CERT_DER: &[u8] = include_bytes!("../testdata/server-cert.der");

/// Matching PKCS#8 private key.
pub const KEY_DER: &[u8] = include_bytes!("../testdata/server-key.der");

pub fn test_server() -> Server {
    let config = ServerConfig::builder()
        .with_certificate(CERT_DER.to_vec())
        .with_private_key(KEY_DER.to_vec())
        .build()
        .expect("test server config");
    Server::new(config).expect("test server")
}

/// Shuttle queued records between the endpoints until both go quiet.
/// Panics on any feed error; use manual shuttling for failure-path tests.
pub fn pump(client: &mut Connection, server: &mut Connection) {
    loop {
        let mut moved = false;
        while let Some(record) = client.next_record() {
            moved = true;
            let consumed = server.feed(&record).expect("server feed");
            assert_eq!(consumed, record.len());
        }
        while let Some(record) = server.next_record() {
            moved = true;
            let consumed = client.feed(&record).expect("client feed");
            assert_eq!(consumed, record.len());
        }
        if !moved {
            break;
        }
    }
}

/// Sink that records every ApplicationData delivery.
pub fn collecting_sink(conn: &mut Connection) -> Arc<Mutex<Vec<Vec<u8>>>> {
    let collected = Arc::new(Mutex::new(Vec::new()));
    let sink = collected.clone();
    conn.set_on_data(Box::new(move |_conn, data| {
        sink.lock().unwrap().push(data.to_vec());
    }));
    collected
}

/// Counter that records handshake completions.
pub fn finish_counter(conn: &mut Connection) -> Arc<Mutex<usize>> {
    let count = Arc::new(Mutex::new(0));
    let counter = count.clone();
    conn.set_on_handshake_finish(Box::new(move |_conn| {
        *counter.lock().unwrap() += 1;
    }));
    count
}

/// Recorder of every state the connection enters.
pub fn state_recorder(conn: &mut Connection) -> Arc<Mutex<Vec<ConnectionState>>> {
    let states = Arc::new(Mutex::new(Vec::new()));
    let recorder = states.clone();
    conn.set_on_change_state(Box::new(move |_conn, _prev, new| {
        recorder.lock().unwrap().push(new);
    }));
    states
}
