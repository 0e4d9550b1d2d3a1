use palaver::connection::{ChannelConnection, ChannelPeer, ServerEvent};
use palaver::types::User;
use palaver::Client;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

/// A logged-in client wired to a scripted in-process server
#[allow(dead_code)]
pub fn logged_in_client() -> (Client, ChannelPeer) {
    let (conn, peer) = ChannelConnection::pair();
    let client = Client::new(
        User::new("me", "self"),
        Box::new(conn),
        "Home",
        Duration::from_secs(3),
    );
    (client, peer)
}

/// Push a batch of events and apply them all
#[allow(dead_code)]
pub async fn deliver(client: &mut Client, peer: &ChannelPeer, events: Vec<ServerEvent>) {
    for event in events {
        assert!(peer.push(event), "client connection went away");
    }
    client.drain_events().await.expect("event handling failed");
}
