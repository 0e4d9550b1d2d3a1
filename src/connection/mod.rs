//! Realtime connection layer
//!
//! The [`Connection`] trait is the seam between the chat core and the
//! transport. The production implementation is [`TcpConnection`]
//! (newline-delimited JSON over TCP); [`ChannelConnection`] is an
//! in-process loopback used by tests.

mod channel;
mod tcp;
pub mod wire;

pub use channel::{ChannelConnection, ChannelPeer};
pub use tcp::TcpConnection;
pub use wire::{ClientCommand, RosterEntry, ServerEvent, WireMessage};

use crate::error::Result;
use async_trait::async_trait;

/// A bidirectional realtime channel to the chat server
///
/// Sending never blocks on the peer draining events; inbound events are
/// buffered until consumed. `next_event` resolves to `None` once the
/// channel is closed and the buffer is drained.
#[async_trait]
pub trait Connection: Send + Sync {
    /// Send a command to the server
    async fn send(&mut self, command: ClientCommand) -> Result<()>;

    /// Wait for the next server event
    ///
    /// # Returns
    ///
    /// Returns `None` when the connection has closed and no buffered
    /// events remain.
    async fn next_event(&mut self) -> Option<ServerEvent>;

    /// Take a buffered server event without waiting, if one is ready
    fn try_next_event(&mut self) -> Option<ServerEvent>;
}
