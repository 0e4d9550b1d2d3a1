//! Call signaling relay
//!
//! The server relays opaque peer negotiation payloads between two users;
//! media itself flows peer-to-peer and is out of scope here. A
//! [`CallSession`] pins one counterpart and shuttles payloads between the
//! realtime channel and a [`PeerTransport`] (the media engine seam).

use crate::connection::ClientCommand;
use crate::error::Result;
use async_trait::async_trait;
use tracing::debug;

/// The media engine seam
///
/// Implementations consume remote negotiation payloads and surface local
/// ones back to the caller; the relay never inspects payload contents.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PeerTransport: Send + Sync {
    /// Apply a negotiation payload received from the counterpart
    async fn apply_remote_signal(&mut self, signal: serde_json::Value) -> Result<()>;

    /// Tear the peer connection down
    async fn close(&mut self) -> Result<()>;
}

/// One in-progress call with a single counterpart
pub struct CallSession {
    peer_id: String,
    transport: Box<dyn PeerTransport>,
}

impl CallSession {
    /// Creates a call session pinned to `peer_id`
    pub fn new(peer_id: impl Into<String>, transport: Box<dyn PeerTransport>) -> Self {
        Self {
            peer_id: peer_id.into(),
            transport,
        }
    }

    /// The counterpart's user id
    pub fn peer_id(&self) -> &str {
        &self.peer_id
    }

    /// Wrap a locally generated negotiation payload for the wire
    pub fn outbound(&self, signal: serde_json::Value) -> ClientCommand {
        ClientCommand::Signal {
            to: self.peer_id.clone(),
            signal,
        }
    }

    /// Feed an inbound relayed payload into the transport
    ///
    /// Payloads from anyone other than the pinned counterpart are dropped;
    /// only one call at a time is supported.
    pub async fn handle_signal(&mut self, from: &str, signal: serde_json::Value) -> Result<()> {
        if from != self.peer_id {
            debug!("Dropping signal from {} (in a call with {})", from, self.peer_id);
            return Ok(());
        }
        self.transport.apply_remote_signal(signal).await
    }

    /// End the call and release the transport
    pub async fn hang_up(mut self) -> Result<()> {
        debug!("Hanging up call with {}", self.peer_id);
        self.transport.close().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::eq;
    use serde_json::json;

    #[tokio::test]
    async fn test_signal_from_peer_reaches_transport() {
        let mut transport = MockPeerTransport::new();
        transport
            .expect_apply_remote_signal()
            .with(eq(json!({"type": "offer"})))
            .times(1)
            .returning(|_| Ok(()));

        let mut call = CallSession::new("u2", Box::new(transport));
        call.handle_signal("u2", json!({"type": "offer"})).await.unwrap();
    }

    #[tokio::test]
    async fn test_signal_from_stranger_is_dropped() {
        let mut transport = MockPeerTransport::new();
        transport.expect_apply_remote_signal().times(0);

        let mut call = CallSession::new("u2", Box::new(transport));
        call.handle_signal("u3", json!({"type": "offer"})).await.unwrap();
    }

    #[tokio::test]
    async fn test_outbound_addresses_peer() {
        let call = CallSession::new("u2", Box::new(MockPeerTransport::new()));
        match call.outbound(json!({"type": "answer"})) {
            ClientCommand::Signal { to, signal } => {
                assert_eq!(to, "u2");
                assert_eq!(signal["type"], "answer");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_hang_up_closes_transport() {
        let mut transport = MockPeerTransport::new();
        transport.expect_close().times(1).returning(|| Ok(()));

        let call = CallSession::new("u2", Box::new(transport));
        call.hang_up().await.unwrap();
    }
}
