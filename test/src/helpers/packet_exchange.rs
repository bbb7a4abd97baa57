use replica_shared::ReplicationError;

use crate::helpers::{LocalTransport, TestClient, TestServer};

/// Delivers everything queued on `transport` to the matching clients,
/// through the wire encoding. Returns how many payloads were applied.
pub fn exchange_packets(transport: &mut LocalTransport, clients: &mut [&mut TestClient]) -> usize {
    let mut applied = 0;

    for sent in transport.take_sent() {
        let bytes = sent.to_message_bytes();
        for client in clients.iter_mut() {
            if sent.recipients.contains(&client.id) {
                applied += client.client.receive_all(client.id, [bytes.as_slice()]);
            }
        }
    }

    for (recipient, object_id) in transport.take_removals() {
        for client in clients.iter_mut() {
            if client.id == recipient {
                client.client.receive_removal(&object_id);
            }
        }
    }

    applied
}

/// Runs one server update, then delivers what it sent
pub fn tick_and_exchange(
    server: &mut TestServer,
    clients: &mut [&mut TestClient],
) -> Result<usize, ReplicationError> {
    server.tick()?;
    Ok(exchange_packets(&mut server.transport, clients))
}
