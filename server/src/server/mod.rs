mod replication_server;
mod server_config;

pub use replication_server::ReplicationServer;
pub use server_config::ServerConfig;
