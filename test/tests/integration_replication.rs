//! Integration tests for server to client replication
//! These tests drive a server tick by tick and deliver its payloads to
//! client replicas through the wire encoding

use replica_client::{ErrorEvent, RemovedEvent, UpdatedEvent};
use replica_server::VisibilityGainedEvent;
use replica_shared::{Recipient, StateUnit};
use replica_test::{
    exchange_packets, init_logger, tick_and_exchange, IntUnit, PositionUnit, StringUnit,
    TestClient, TestServer,
};

fn replica_units() -> Vec<Box<dyn StateUnit>> {
    vec![IntUnit::boxed(0), Box::new(StringUnit::new("", ""))]
}

#[test]
fn test_full_sync_then_delta() {
    init_logger();

    let mut server = TestServer::new();
    let connection = server.connect(1);
    let object = server.spawn(
        vec![IntUnit::boxed(5), Box::new(StringUnit::new("title", "body"))],
        None,
    );

    let mut client = TestClient::new(connection);
    client.insert(object, replica_units());

    let applied = tick_and_exchange(&mut server, &mut [&mut client]).unwrap();
    assert_eq!(applied, 1);
    assert_eq!(client.unit::<IntUnit>(&object, 0).unwrap().get(), 5);
    let strings = client.unit::<StringUnit>(&object, 1).unwrap();
    assert_eq!(strings.title.get(), "title");
    assert_eq!(strings.body.get(), "body");

    let mut server_events = server.events();
    let gained: Vec<_> = server_events.read::<VisibilityGainedEvent>().collect();
    assert_eq!(gained, vec![(connection, object)]);

    server
        .server
        .unit_mut::<IntUnit>(&object, 0)
        .unwrap()
        .set(9);
    let applied = tick_and_exchange(&mut server, &mut [&mut client]).unwrap();
    assert_eq!(applied, 1);
    assert_eq!(client.unit::<IntUnit>(&object, 0).unwrap().get(), 9);
    assert_eq!(
        client.unit::<StringUnit>(&object, 1).unwrap().title.get(),
        "title"
    );

    let mut events = client.events();
    let updates: Vec<_> = events.read::<UpdatedEvent>().collect();
    assert_eq!(
        updates,
        vec![
            (object, Recipient::Observers, true),
            (object, Recipient::Observers, false)
        ]
    );
}

#[test]
fn test_delta_carries_only_changed_fields() {
    init_logger();

    let mut server = TestServer::new();
    let connection = server.connect(1);
    let object = server.spawn(replica_units(), None);
    let mut client = TestClient::new(connection);
    client.insert(object, replica_units());
    tick_and_exchange(&mut server, &mut [&mut client]).unwrap();

    server
        .server
        .unit_mut::<StringUnit>(&object, 1)
        .unwrap()
        .body
        .set("changed".to_string());
    server.tick().unwrap();

    let sent = server.transport.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].header.mask.bits(), 0b10);
    assert!(!sent[0].header.initial);

    exchange_packets(&mut server.transport, &mut [&mut client]);
    let strings = client.unit::<StringUnit>(&object, 1).unwrap();
    assert_eq!(strings.title.get(), "");
    assert_eq!(strings.body.get(), "changed");
}

#[test]
fn test_owner_and_observers_get_different_payloads() {
    init_logger();

    let mut server = TestServer::new();
    let owner = server.connect(1);
    let observer = server.connect(2);
    let object = server.spawn(
        vec![IntUnit::boxed(1), Box::new(IntUnit::owner_only(2))],
        Some(owner),
    );

    server.tick().unwrap();
    {
        let to_owner = server.transport.sent_to(owner);
        assert_eq!(to_owner.len(), 1);
        assert_eq!(to_owner[0].header.recipient, Recipient::Owner);
        assert_eq!(to_owner[0].header.mask.bits(), 0b11);
        assert_eq!(to_owner[0].header.bit_length, 64);

        let to_observer = server.transport.sent_to(observer);
        assert_eq!(to_observer.len(), 1);
        assert_eq!(to_observer[0].header.recipient, Recipient::Observers);
        assert_eq!(to_observer[0].header.mask.bits(), 0b01);
        assert_eq!(to_observer[0].header.bit_length, 32);
    }

    let mut owner_client = TestClient::new(owner);
    owner_client.insert(object, vec![IntUnit::boxed(0), Box::new(IntUnit::owner_only(0))]);
    let mut observer_client = TestClient::new(observer);
    observer_client.insert(object, vec![IntUnit::boxed(0), Box::new(IntUnit::owner_only(0))]);

    let applied = exchange_packets(
        &mut server.transport,
        &mut [&mut owner_client, &mut observer_client],
    );
    assert_eq!(applied, 2);
    assert_eq!(owner_client.unit::<IntUnit>(&object, 1).unwrap().get(), 2);
    assert_eq!(observer_client.unit::<IntUnit>(&object, 0).unwrap().get(), 1);
    assert_eq!(observer_client.unit::<IntUnit>(&object, 1).unwrap().get(), 0);

    // Owner-only change: nothing to send to plain observers
    server
        .server
        .unit_mut::<IntUnit>(&object, 1)
        .unwrap()
        .set(20);
    server.tick().unwrap();
    let sent = server.transport.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].recipients, vec![owner]);
    assert_eq!(sent[0].header.recipient, Recipient::Owner);

    exchange_packets(
        &mut server.transport,
        &mut [&mut owner_client, &mut observer_client],
    );
    assert_eq!(owner_client.unit::<IntUnit>(&object, 1).unwrap().get(), 20);
    assert_eq!(observer_client.unit::<IntUnit>(&object, 1).unwrap().get(), 0);
}

#[test]
fn test_ready_owner_gets_updates_outside_observer_set() {
    init_logger();

    let mut server = TestServer::new();
    let owner = server.connect(1);
    let observer = server.connect(2);
    let object = server.spawn(
        vec![IntUnit::boxed(1), Box::new(IntUnit::owner_only(2))],
        Some(owner),
    );
    server.tick().unwrap();
    server.transport.clear();

    server
        .server
        .remove_observer(&object, &owner, &mut server.transport)
        .unwrap();
    assert!(!server.server.object(&object).unwrap().is_observer(&owner));
    server.transport.clear();

    server.server.unit_mut::<IntUnit>(&object, 0).unwrap().set(4);
    server.server.unit_mut::<IntUnit>(&object, 1).unwrap().set(5);
    server.tick().unwrap();

    let to_owner = server.transport.sent_to(owner);
    assert_eq!(to_owner.len(), 1);
    assert_eq!(to_owner[0].header.recipient, Recipient::Owner);
    assert_eq!(to_owner[0].header.mask.bits(), 0b11);

    let to_observer = server.transport.sent_to(observer);
    assert_eq!(to_observer.len(), 1);
    assert_eq!(to_observer[0].header.recipient, Recipient::Observers);
    assert_eq!(to_observer[0].header.mask.bits(), 0b01);
    server.transport.clear();

    // Unready owners get nothing
    server.set_unready(owner);
    server.server.unit_mut::<IntUnit>(&object, 1).unwrap().set(6);
    server.tick().unwrap();
    assert!(server.transport.sent_to(owner).is_empty());
}

#[test]
fn test_quantized_position_replicates_within_precision() {
    init_logger();

    let mut server = TestServer::new();
    let connection = server.connect(1);
    let object = server.spawn(
        vec![Box::new(PositionUnit::new([12.5, -3.25, 99.0], -1))],
        None,
    );
    let mut client = TestClient::new(connection);
    client.insert(object, vec![Box::new(PositionUnit::new([0.0; 3], 0))]);

    tick_and_exchange(&mut server, &mut [&mut client]).unwrap();

    let replica = client.unit::<PositionUnit>(&object, 0).unwrap();
    assert_eq!(replica.heading, -1);
    for (actual, expected) in replica.position.iter().zip([12.5f32, -3.25, 99.0]) {
        assert!(
            (actual - expected).abs() <= replica.precision(),
            "{} too far from {}",
            actual,
            expected
        );
    }

    server
        .server
        .unit_mut::<PositionUnit>(&object, 0)
        .unwrap()
        .move_to([0.0, 0.0, 0.0], 1);
    server.tick().unwrap();
    let expected_bits = server
        .server
        .unit::<PositionUnit>(&object, 0)
        .unwrap()
        .bit_length();
    assert_eq!(server.transport.sent()[0].header.bit_length, expected_bits);

    exchange_packets(&mut server.transport, &mut [&mut client]);
    assert_eq!(client.unit::<PositionUnit>(&object, 0).unwrap().heading, 1);
}

#[test]
fn test_despawn_removes_replicas() {
    init_logger();

    let mut server = TestServer::new();
    let connection = server.connect(1);
    let object = server.spawn(replica_units(), None);
    let mut client = TestClient::new(connection);
    client.insert(object, replica_units());
    tick_and_exchange(&mut server, &mut [&mut client]).unwrap();
    client.events();

    let units = server
        .server
        .despawn_object(&object, &mut server.transport)
        .unwrap();
    assert_eq!(units.len(), 2);
    assert!(!server.server.has_object(&object));
    assert_eq!(server.transport.removals(), &[(connection, object)]);

    exchange_packets(&mut server.transport, &mut [&mut client]);
    assert!(!client.client.has_object(&object));

    let mut events = client.events();
    let removed: Vec<_> = events.read::<RemovedEvent>().collect();
    assert_eq!(removed.len(), 1);
    assert_eq!(removed[0].0, object);
    assert_eq!(removed[0].1.len(), 2);
}

#[test]
fn test_payload_for_unknown_replica_is_reported() {
    init_logger();

    let mut server = TestServer::new();
    let connection = server.connect(1);
    let object = server.spawn(replica_units(), None);
    let mut client = TestClient::new(connection);

    let applied = tick_and_exchange(&mut server, &mut [&mut client]).unwrap();
    assert_eq!(applied, 0);

    let mut events = client.events();
    let errors: Vec<_> = events.read::<ErrorEvent>().collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].object_id(), Some(object));
}
