//! # Replica Client
//! Keeps local replicas of server objects up to date from the owner &
//! observer payloads the server sends.

#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces
)]

pub mod shared {
    pub use replica_shared::{
        BitReader, BitWrite, BitWriter, ConnectionId, ObjectId, PayloadHeader, Recipient,
        ReplicationError, Serde, SerdeErr, StateUnit, SyncMode, SyncVar, UnitError, UnitIndex,
        UpdateMessage,
    };
}

mod client;
mod events;

pub use client::{ClientConfig, ReplicaClient};
pub use events::{ClientEvent, ClientEvents, ErrorEvent, RemovedEvent, UpdatedEvent};
