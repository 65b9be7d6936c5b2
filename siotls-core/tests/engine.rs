//! Engine-level tests for the record demultiplexer and failure paths,
//! driven without a peer: hand-crafted records go straight into `feed`.

use std::sync::{Arc, Mutex};

use siotls_core::session::SessionCache;
use siotls_core::{
    AlertDescription, CipherSuite, Connection, ConnectionState, Error,
};
use siotls_crypto_rustcrypto::RustCryptoProvider;

fn test_client() -> Connection {
    Connection::client(
        Arc::new(RustCryptoProvider::new()),
        "example.com",
        vec![CipherSuite::RsaWithAes128CbcSha],
        Arc::new(Mutex::new(SessionCache::new())),
    )
    .unwrap()
}

#[test]
fn test_client_starts_with_hello_queued() {
    let mut client = test_client();
    assert_eq!(client.state(), ConnectionState::HandshakeStart);

    let record = client.next_record().unwrap();
    // Handshake record carrying a ClientHello
    assert_eq!(record[0], 22);
    assert_eq!(&record[1..3], &[3, 3]);
    assert_eq!(record[5], 1);
    assert!(client.next_record().is_none());
    // one record queued in the initial epoch
    assert_eq!(client.write_sequence_number(), 1);
}

#[test]
fn test_partial_records_consume_nothing() {
    let mut client = test_client();

    assert_eq!(client.feed(&[]).unwrap(), 0);
    assert_eq!(client.feed(&[22]).unwrap(), 0);
    assert_eq!(client.feed(&[22, 3, 3]).unwrap(), 0);
    // header complete, payload missing
    assert_eq!(client.feed(&[22, 3, 3, 0, 10, 1, 2]).unwrap(), 0);
    assert_eq!(client.state(), ConnectionState::HandshakeStart);
    assert_eq!(client.read_sequence_number(), 0);
}

#[test]
fn test_change_cipher_spec_before_key_exchange() {
    let mut client = test_client();
    let result = client.feed(&[20, 3, 3, 0, 1, 1]);
    assert!(matches!(result, Err(Error::UnexpectedMessage(_))));
    assert_eq!(client.state(), ConnectionState::Closed);
    assert_eq!(client.error(), Some(AlertDescription::UnexpectedMessage));
}

#[test]
fn test_malformed_change_cipher_spec() {
    let mut client = test_client();
    assert!(client.feed(&[20, 3, 3, 0, 1, 2]).is_err());
    assert_eq!(client.error(), Some(AlertDescription::DecodeError));
}

#[test]
fn test_record_overflow_rejected() {
    let mut client = test_client();
    // length field 0x4801 = 16385 + 2048: one past the ciphertext bound
    let result = client.feed(&[23, 3, 3, 0x48, 0x01]);
    assert!(matches!(result, Err(Error::RecordOverflow)));
    assert_eq!(client.error(), Some(AlertDescription::RecordOverflow));

    // the queued alert closes out the connection
    let _hello = client.next_record().unwrap();
    let alert = client.next_record().unwrap();
    assert_eq!(alert, vec![21, 3, 3, 0, 2, 2, 22]);
}

#[test]
fn test_unknown_content_type_rejected() {
    let mut client = test_client();
    let result = client.feed(&[99, 3, 3, 0, 0]);
    assert!(matches!(result, Err(Error::UnexpectedMessage(_))));
    assert_eq!(client.error(), Some(AlertDescription::UnexpectedMessage));
}

#[test]
fn test_warning_alert_is_ignored() {
    let mut client = test_client();
    // user_canceled, warning level
    assert_eq!(client.feed(&[21, 3, 3, 0, 2, 1, 90]).unwrap(), 7);
    assert_eq!(client.state(), ConnectionState::HandshakeStart);
    assert!(client.error().is_none());
}

#[test]
fn test_fatal_alert_closes() {
    let mut client = test_client();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    client.set_on_error(Box::new(move |description| {
        sink.lock().unwrap().push(description);
    }));

    assert_eq!(client.feed(&[21, 3, 3, 0, 2, 2, 40]).unwrap(), 7);
    assert_eq!(client.state(), ConnectionState::Closed);
    assert_eq!(client.error(), Some(AlertDescription::HandshakeFailure));
    assert_eq!(
        *seen.lock().unwrap(),
        vec![AlertDescription::HandshakeFailure]
    );

    // no alert goes out in response to a fatal alert
    let _hello = client.next_record().unwrap();
    assert!(client.next_record().is_none());
}

#[test]
fn test_close_is_idempotent() {
    let mut client = test_client();
    client.close();
    client.close();

    assert_eq!(client.state(), ConnectionState::Closed);
    let _hello = client.next_record().unwrap();
    let alert = client.next_record().unwrap();
    // close_notify goes out at warning level
    assert_eq!(alert, vec![21, 3, 3, 0, 2, 1, 0]);
    assert!(client.next_record().is_none());
    assert!(client.is_shutdown());
}

#[test]
fn test_input_discarded_after_shutdown() {
    let mut client = test_client();
    client.close();

    // garbage that would otherwise be fatal is swallowed whole
    assert_eq!(client.feed(&[99, 0, 0, 0, 0, 0]).unwrap(), 6);
    assert_eq!(client.error(), None);
}

#[test]
fn test_send_after_close_refused() {
    let mut client = test_client();
    client.close();
    assert!(matches!(client.send(b"x"), Err(Error::ConnectionClosed)));
}
