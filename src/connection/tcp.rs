//! TCP transport
//!
//! Frames are single lines of JSON. A background task owns the read half,
//! decodes events, and feeds them into an unbounded channel so slow
//! consumers never stall the socket.

use super::wire::{ClientCommand, ServerEvent};
use super::Connection;
use crate::error::{PalaverError, Result};
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::codec::{FramedRead, FramedWrite, LinesCodec};
use tracing::{debug, warn};

/// Connection to the realtime server over TCP
pub struct TcpConnection {
    writer: FramedWrite<OwnedWriteHalf, LinesCodec>,
    incoming: mpsc::UnboundedReceiver<ServerEvent>,
    reader_task: JoinHandle<()>,
}

impl TcpConnection {
    /// Connect to the realtime server
    ///
    /// # Arguments
    ///
    /// * `addr` - Server address as `host:port`
    ///
    /// # Errors
    ///
    /// Returns an error if the TCP connection cannot be established.
    pub async fn connect(addr: &str) -> Result<Self> {
        debug!("Connecting to realtime server at {}", addr);
        let stream = TcpStream::connect(addr)
            .await
            .map_err(|e| PalaverError::Transport(format!("connect to {}: {}", addr, e)))?;
        let (read_half, write_half) = stream.into_split();

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let reader_task = tokio::spawn(async move {
            let mut lines = FramedRead::new(read_half, LinesCodec::new());
            while let Some(line) = lines.next().await {
                let line = match line {
                    Ok(line) => line,
                    Err(e) => {
                        warn!("Realtime stream error: {}", e);
                        break;
                    }
                };
                match serde_json::from_str::<ServerEvent>(&line) {
                    Ok(event) => {
                        if event_tx.send(event).is_err() {
                            break;
                        }
                    }
                    // unknown events are skipped, not fatal
                    Err(e) => debug!("Ignoring undecodable event: {}", e),
                }
            }
            debug!("Realtime stream closed");
        });

        Ok(Self {
            writer: FramedWrite::new(write_half, LinesCodec::new()),
            incoming: event_rx,
            reader_task,
        })
    }
}

impl Drop for TcpConnection {
    fn drop(&mut self) {
        self.reader_task.abort();
    }
}

#[async_trait]
impl Connection for TcpConnection {
    async fn send(&mut self, command: ClientCommand) -> Result<()> {
        let line = serde_json::to_string(&command).map_err(PalaverError::Serialization)?;
        self.writer
            .send(line)
            .await
            .map_err(|e| PalaverError::Transport(format!("send failed: {}", e)))?;
        Ok(())
    }

    async fn next_event(&mut self) -> Option<ServerEvent> {
        self.incoming.recv().await
    }

    fn try_next_event(&mut self) -> Option<ServerEvent> {
        self.incoming.try_recv().ok()
    }
}
