//! Session resumption integration tests.

mod common;

use common::{finish_counter, pump, state_recorder, test_server};
use siotls::{CipherSuite, Client, ConnectionState};

#[test]
fn test_session_resumption_roundtrip() {
    let mut client_endpoint = Client::new();
    client_endpoint.set_cipher_suites(vec![CipherSuite::RsaWithAes128CbcSha]);
    let server_endpoint = test_server();

    // first connection: full handshake
    let mut client = client_endpoint.new_connection("example.com").unwrap();
    let mut server = server_endpoint.new_connection().unwrap();
    let first_finishes = finish_counter(&mut client);

    pump(&mut client, &mut server);
    assert_eq!(client.state(), ConnectionState::Open);
    assert_eq!(*first_finishes.lock().unwrap(), 1);

    let session_id = client.session_id().to_vec();
    assert_eq!(session_id.len(), 32);
    assert_eq!(server.session_id(), &session_id[..]);

    client.close();
    pump(&mut client, &mut server);

    // second connection to the same name: abbreviated handshake
    let mut client = client_endpoint.new_connection("example.com").unwrap();
    let mut server = server_endpoint.new_connection().unwrap();
    let second_finishes = finish_counter(&mut client);
    let client_states = state_recorder(&mut client);
    let server_finishes = finish_counter(&mut server);

    // the resuming server flight is ServerHello, ChangeCipherSpec,
    // Finished: no Certificate, no ServerHelloDone
    let hello = client.next_record().unwrap();
    server.feed(&hello).unwrap();
    let mut server_flight = Vec::new();
    while let Some(record) = server.next_record() {
        server_flight.push(record);
    }
    assert_eq!(server_flight.len(), 3);
    assert_eq!(server_flight[0][0], 22);
    assert_eq!(server_flight[1][0], 20);
    assert_eq!(server_flight[2][0], 22);

    for record in server_flight {
        client.feed(&record).unwrap();
    }
    pump(&mut client, &mut server);

    assert_eq!(client.state(), ConnectionState::Open);
    assert_eq!(server.state(), ConnectionState::Open);
    assert_eq!(client.session_id(), &session_id[..]);
    assert_eq!(
        *client_states.lock().unwrap(),
        vec![ConnectionState::SessionResume, ConnectionState::Open]
    );
    assert_eq!(*second_finishes.lock().unwrap(), 1);
    assert_eq!(*server_finishes.lock().unwrap(), 1);

    // application data still flows on the resumed session
    let echoed = common::collecting_sink(&mut server);
    client.send(b"again").unwrap();
    pump(&mut client, &mut server);
    assert_eq!(*echoed.lock().unwrap(), vec![b"again".to_vec()]);
}

#[test]
fn test_server_invalidates_session() {
    let mut client_endpoint = Client::new();
    client_endpoint.set_cipher_suites(vec![CipherSuite::RsaWithAes128CbcSha]);

    // first connection against one server instance
    let server_endpoint = test_server();
    let mut client = client_endpoint.new_connection("example.com").unwrap();
    let mut server = server_endpoint.new_connection().unwrap();
    pump(&mut client, &mut server);
    let old_session_id = client.session_id().to_vec();
    assert_eq!(client.state(), ConnectionState::Open);
    client.close();
    pump(&mut client, &mut server);

    // the second connection hits a fresh server with an empty session
    // store, which declines the proposal and issues a new id
    let fresh_endpoint = test_server();
    let mut client = client_endpoint.new_connection("example.com").unwrap();
    let mut server = fresh_endpoint.new_connection().unwrap();
    let client_states = state_recorder(&mut client);
    let finishes = finish_counter(&mut client);

    pump(&mut client, &mut server);

    assert_eq!(client.state(), ConnectionState::Open);
    let new_session_id = client.session_id().to_vec();
    assert_ne!(new_session_id, old_session_id);
    assert!(client_states
        .lock()
        .unwrap()
        .contains(&ConnectionState::SessionNew));
    assert_eq!(*finishes.lock().unwrap(), 1);

    // the cache now holds the replacement session
    let cache = client_endpoint.session_cache();
    let cache = cache.lock().unwrap();
    let entry = cache.get("example.com").expect("cache entry");
    assert_eq!(entry.session_id, new_session_id);
}

#[test]
fn test_resumption_not_offered_to_unknown_name() {
    let mut client_endpoint = Client::new();
    client_endpoint.set_cipher_suites(vec![CipherSuite::RsaWithAes128CbcSha]);
    let server_endpoint = test_server();

    let mut client = client_endpoint.new_connection("example.com").unwrap();
    let mut server = server_endpoint.new_connection().unwrap();
    pump(&mut client, &mut server);
    assert_eq!(client.state(), ConnectionState::Open);

    // a different name shares nothing with the cached session
    let mut client = client_endpoint.new_connection("other.test").unwrap();
    let mut server = server_endpoint.new_connection().unwrap();
    let client_states = state_recorder(&mut client);
    pump(&mut client, &mut server);

    assert_eq!(client.state(), ConnectionState::Open);
    assert!(client_states
        .lock()
        .unwrap()
        .contains(&ConnectionState::SessionNew));

    let cache = client_endpoint.session_cache();
    assert_eq!(cache.lock().unwrap().len(), 2);
}
