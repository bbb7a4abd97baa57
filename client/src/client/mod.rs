mod client_config;
mod replica_client;

pub use client_config::ClientConfig;
pub use replica_client::ReplicaClient;
