//! In-process loopback connection
//!
//! Carries typed frames over tokio channels with no sockets involved, so
//! tests can script a server without binding ports.

use super::wire::{ClientCommand, ServerEvent};
use super::Connection;
use crate::error::{PalaverError, Result};
use async_trait::async_trait;
use tokio::sync::mpsc;

/// Client half of a loopback pair
pub struct ChannelConnection {
    outgoing: mpsc::UnboundedSender<ClientCommand>,
    incoming: mpsc::UnboundedReceiver<ServerEvent>,
}

/// Server half of a loopback pair, held by the test driving the session
pub struct ChannelPeer {
    events: mpsc::UnboundedSender<ServerEvent>,
    commands: mpsc::UnboundedReceiver<ClientCommand>,
}

impl ChannelConnection {
    /// Creates a connected client/server pair
    pub fn pair() -> (Self, ChannelPeer) {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        (
            Self {
                outgoing: cmd_tx,
                incoming: event_rx,
            },
            ChannelPeer {
                events: event_tx,
                commands: cmd_rx,
            },
        )
    }
}

#[async_trait]
impl Connection for ChannelConnection {
    async fn send(&mut self, command: ClientCommand) -> Result<()> {
        self.outgoing
            .send(command)
            .map_err(|_| PalaverError::ConnectionClosed)?;
        Ok(())
    }

    async fn next_event(&mut self) -> Option<ServerEvent> {
        self.incoming.recv().await
    }

    fn try_next_event(&mut self) -> Option<ServerEvent> {
        self.incoming.try_recv().ok()
    }
}

impl ChannelPeer {
    /// Push an event toward the client; returns false once the client half
    /// is gone.
    pub fn push(&self, event: ServerEvent) -> bool {
        self.events.send(event).is_ok()
    }

    /// Wait for the next command sent by the client
    pub async fn recv(&mut self) -> Option<ClientCommand> {
        self.commands.recv().await
    }

    /// Take a command without waiting, if one is pending
    pub fn try_recv(&mut self) -> Option<ClientCommand> {
        self.commands.try_recv().ok()
    }
}
