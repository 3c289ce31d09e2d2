//! Adapter runtime integration.
//!
//! Bridges the synchronous game loop with the async TCP server: the server
//! queues validated commands on a bounded channel, the game loop drains it
//! with [`Adapter::try_recv`] and answers through [`Adapter::send`].

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::runtime::Runtime;
use tokio::sync::mpsc;

use crate::protocol::{AckMessage, ErrorMessage, ObservationMessage};
use crate::server::{run_server, ServerConfig};
use crate::types::Direction;

/// Command delivered to the game loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundCommand {
    pub client_id: usize,
    pub seq: u64,
    pub payload: InboundPayload,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundPayload {
    /// Controller command; answer with an ack
    Command(ClientCommand),
    /// A client finished its handshake and wants the current state
    SnapshotRequest,
}

/// Command payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientCommand {
    Move(Direction),
    Voice(String),
    NewGame,
}

/// Outbound message to be delivered by the server.
#[derive(Debug, Clone)]
pub enum OutboundMessage {
    ToClientAck { client_id: usize, ack: AckMessage },
    ToClientError { client_id: usize, err: ErrorMessage },
    ToClientObservation { client_id: usize, obs: ObservationMessage },
    BroadcastObservation { obs: ObservationMessage },
}

/// Connection counters shared between the server and the game loop.
#[derive(Debug, Default)]
pub struct AdapterStats {
    clients: AtomicUsize,
    /// Controller client id, 0 when there is none
    controller: AtomicUsize,
}

impl AdapterStats {
    pub fn client_count(&self) -> usize {
        self.clients.load(Ordering::Relaxed)
    }

    pub fn controller_id(&self) -> Option<usize> {
        match self.controller.load(Ordering::Relaxed) {
            0 => None,
            id => Some(id),
        }
    }

    pub(crate) fn set(&self, clients: usize, controller: Option<usize>) {
        self.clients.store(clients, Ordering::Relaxed);
        self.controller.store(controller.unwrap_or(0), Ordering::Relaxed);
    }
}

/// Running adapter instance.
pub struct Adapter {
    _rt: Runtime,
    cmd_rx: mpsc::Receiver<InboundCommand>,
    out_tx: mpsc::UnboundedSender<OutboundMessage>,
    stats: Arc<AdapterStats>,
}

impl Adapter {
    /// Start the adapter from environment variables.
    ///
    /// Returns `Ok(None)` if `TUI_2048_REMOTE_DISABLED` is set.
    pub fn start_from_env() -> Result<Option<Self>> {
        if ServerConfig::is_disabled() {
            log::info!("remote adapter disabled via TUI_2048_REMOTE_DISABLED");
            return Ok(None);
        }
        Self::start(ServerConfig::from_env()).map(Some)
    }

    pub fn start(config: ServerConfig) -> Result<Self> {
        let max_pending = config.max_pending_commands.max(1);
        let (cmd_tx, cmd_rx) = mpsc::channel::<InboundCommand>(max_pending);
        let (out_tx, out_rx) = mpsc::unbounded_channel::<OutboundMessage>();
        let stats = Arc::new(AdapterStats::default());

        let rt = Runtime::new().context("failed to create tokio runtime")?;
        let server_stats = Arc::clone(&stats);
        rt.spawn(async move {
            if let Err(e) = run_server(config, cmd_tx, out_rx, server_stats, None).await {
                log::error!("remote adapter stopped: {e:#}");
            }
        });

        Ok(Self {
            _rt: rt,
            cmd_rx,
            out_tx,
            stats,
        })
    }

    pub fn try_recv(&mut self) -> Option<InboundCommand> {
        self.cmd_rx.try_recv().ok()
    }

    pub fn send(&self, msg: OutboundMessage) {
        let _ = self.out_tx.send(msg);
    }

    pub fn stats(&self) -> &AdapterStats {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_controller_encoding() {
        let stats = AdapterStats::default();
        assert_eq!(stats.client_count(), 0);
        assert_eq!(stats.controller_id(), None);

        stats.set(2, Some(5));
        assert_eq!(stats.client_count(), 2);
        assert_eq!(stats.controller_id(), Some(5));

        stats.set(1, None);
        assert_eq!(stats.controller_id(), None);
    }
}
