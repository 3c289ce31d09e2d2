//! TCP server for the remote adapter
//!
//! Handles incoming connections and manages client lifecycle.
//! Uses tokio for async networking.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot, RwLock};

use crate::protocol::*;
use crate::runtime::{AdapterStats, ClientCommand, InboundCommand, InboundPayload, OutboundMessage};

/// Default TCP port
pub const DEFAULT_PORT: u16 = 7848;

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub protocol_version: String,
    /// Bound on commands queued for the game loop
    pub max_pending_commands: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            protocol_version: PROTOCOL_VERSION.to_string(),
            max_pending_commands: 10,
        }
    }
}

impl ServerConfig {
    /// Create from `TUI_2048_REMOTE_*` environment variables
    pub fn from_env() -> Self {
        use std::env;

        let defaults = Self::default();
        let host = env::var("TUI_2048_REMOTE_HOST").unwrap_or(defaults.host);
        let port = env::var("TUI_2048_REMOTE_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.port);
        let max_pending_commands = env::var("TUI_2048_REMOTE_MAX_PENDING")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.max_pending_commands);

        Self {
            host,
            port,
            protocol_version: defaults.protocol_version,
            max_pending_commands,
        }
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid socket address {}:{}", self.host, self.port))
    }

    /// Check if the adapter is disabled via environment
    pub fn is_disabled() -> bool {
        std::env::var("TUI_2048_REMOTE_DISABLED")
            .map(|v| v == "1" || v.to_lowercase() == "true")
            .unwrap_or(false)
    }
}

/// Handle to a connected client
struct ClientHandle {
    id: usize,
    handshaken: bool,
    stream_observations: bool,
    last_seq: Option<u64>,
    tx: mpsc::UnboundedSender<ClientOutbound>,
}

#[derive(Debug, Clone)]
enum ClientOutbound {
    Welcome(WelcomeMessage),
    Ack(AckMessage),
    Error(ErrorMessage),
    Observation(ObservationMessage),
}

#[derive(Default)]
struct Registry {
    clients: Vec<ClientHandle>,
    controller: Option<usize>,
}

impl Registry {
    fn get_mut(&mut self, client_id: usize) -> Option<&mut ClientHandle> {
        self.clients.iter_mut().find(|c| c.id == client_id)
    }

    fn is_handshaken(&self, client_id: usize) -> bool {
        self.clients
            .iter()
            .any(|c| c.id == client_id && c.handshaken)
    }

    /// Record `seq` if it is strictly greater than the last one seen.
    fn check_and_update_seq(&mut self, client_id: usize, seq: u64) -> bool {
        let Some(client) = self.get_mut(client_id) else {
            return true;
        };
        match client.last_seq {
            Some(prev) if seq <= prev => false,
            _ => {
                client.last_seq = Some(seq);
                true
            }
        }
    }
}

/// Shared server state
struct ServerState {
    config: ServerConfig,
    registry: RwLock<Registry>,
    stats: Arc<AdapterStats>,
}

impl ServerState {
    fn publish_stats(&self, registry: &Registry) {
        self.stats.set(registry.clients.len(), registry.controller);
    }
}

/// Start the TCP server.
///
/// `ready_tx` receives the bound address once the listener is up (useful with
/// port 0 in tests).
pub async fn run_server(
    config: ServerConfig,
    command_tx: mpsc::Sender<InboundCommand>,
    mut out_rx: mpsc::UnboundedReceiver<OutboundMessage>,
    stats: Arc<AdapterStats>,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
) -> anyhow::Result<()> {
    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    let bound = listener.local_addr()?;
    log::info!("remote adapter listening on {bound}");
    if let Some(tx) = ready_tx {
        let _ = tx.send(bound);
    }

    let state = Arc::new(ServerState {
        config,
        registry: RwLock::new(Registry::default()),
        stats,
    });

    // Outbound dispatcher.
    {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            while let Some(msg) = out_rx.recv().await {
                let registry = state.registry.read().await;
                let to_client = |client_id: usize, out: ClientOutbound| {
                    if let Some(c) = registry.clients.iter().find(|c| c.id == client_id) {
                        let _ = c.tx.send(out);
                    }
                };
                match msg {
                    OutboundMessage::ToClientAck { client_id, ack } => {
                        to_client(client_id, ClientOutbound::Ack(ack))
                    }
                    OutboundMessage::ToClientError { client_id, err } => {
                        to_client(client_id, ClientOutbound::Error(err))
                    }
                    OutboundMessage::ToClientObservation { client_id, obs } => {
                        to_client(client_id, ClientOutbound::Observation(obs))
                    }
                    OutboundMessage::BroadcastObservation { obs } => {
                        for c in registry
                            .clients
                            .iter()
                            .filter(|c| c.handshaken && c.stream_observations)
                        {
                            let _ = c.tx.send(ClientOutbound::Observation(obs.clone()));
                        }
                    }
                }
            }
        });
    }

    let mut client_id_counter = 0usize;
    loop {
        let (socket, addr) = listener.accept().await?;
        client_id_counter += 1;
        let client_id = client_id_counter;
        log::info!("client {client_id} connected from {addr}");

        let state = Arc::clone(&state);
        let command_tx = command_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_client(socket, client_id, state, command_tx).await {
                log::warn!("client {client_id} error: {e}");
            }
            log::info!("client {client_id} disconnected");
        });
    }
}

/// Handle a single client connection
async fn handle_client(
    socket: TcpStream,
    client_id: usize,
    state: Arc<ServerState>,
    command_tx: mpsc::Sender<InboundCommand>,
) -> anyhow::Result<()> {
    let (reader, mut writer) = tokio::io::split(socket);
    let mut reader = BufReader::new(reader);
    let (tx, mut rx) = mpsc::unbounded_channel::<ClientOutbound>();

    {
        let mut registry = state.registry.write().await;
        registry.clients.push(ClientHandle {
            id: client_id,
            handshaken: false,
            stream_observations: false,
            last_seq: None,
            tx: tx.clone(),
        });
        state.publish_stats(&registry);
    }

    let write_task = tokio::spawn(async move {
        let mut buf: Vec<u8> = Vec::with_capacity(4096);
        while let Some(msg) = rx.recv().await {
            buf.clear();
            let encoded = match &msg {
                ClientOutbound::Welcome(m) => serde_json::to_writer(&mut buf, m),
                ClientOutbound::Ack(m) => serde_json::to_writer(&mut buf, m),
                ClientOutbound::Error(m) => serde_json::to_writer(&mut buf, m),
                ClientOutbound::Observation(m) => serde_json::to_writer(&mut buf, m),
            };
            if encoded.is_err() {
                continue;
            }
            buf.push(b'\n');
            if writer.write_all(&buf).await.is_err() || writer.flush().await.is_err() {
                break;
            }
        }
    });

    let send_error = |seq: u64, code: ErrorCode, message: &str| {
        let _ = tx.send(ClientOutbound::Error(create_error(seq, code, message)));
    };

    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line).await? == 0 {
            break;
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        match parse_message(trimmed) {
            Ok(ParsedMessage::Hello(hello)) => {
                let mut registry = state.registry.write().await;
                if registry.is_handshaken(client_id)
                    && !registry.check_and_update_seq(client_id, hello.seq)
                {
                    send_error(hello.seq, ErrorCode::InvalidCommand, "seq must be strictly increasing");
                    continue;
                }

                if !same_major(&hello.protocol_version, &state.config.protocol_version) {
                    send_error(
                        hello.seq,
                        ErrorCode::ProtocolMismatch,
                        &format!("Protocol version {} not supported", hello.protocol_version),
                    );
                    break;
                }

                if let Some(client) = registry.get_mut(client_id) {
                    client.handshaken = true;
                    client.last_seq = Some(hello.seq);
                    client.stream_observations = hello.requested.stream_observations;
                }

                // First client to hello becomes controller.
                if registry.controller.is_none() {
                    registry.controller = Some(client_id);
                    log::info!("client {client_id} ({}) is now controller", hello.client.name);
                }
                let role = if registry.controller == Some(client_id) {
                    AssignedRole::Controller
                } else {
                    AssignedRole::Observer
                };
                state.publish_stats(&registry);

                let welcome = create_welcome(
                    hello.seq,
                    &state.config.protocol_version,
                    client_id as u64,
                    role,
                    registry.controller.map(|id| id as u64),
                );
                let _ = tx.send(ClientOutbound::Welcome(welcome));

                if hello.requested.stream_observations {
                    let _ = command_tx.try_send(InboundCommand {
                        client_id,
                        seq: hello.seq,
                        payload: InboundPayload::SnapshotRequest,
                    });
                }
            }

            Ok(ParsedMessage::Command(cmd)) => {
                {
                    let mut registry = state.registry.write().await;
                    if !registry.is_handshaken(client_id) {
                        send_error(cmd.seq, ErrorCode::HandshakeRequired, "Send hello before command");
                        continue;
                    }
                    if !registry.check_and_update_seq(client_id, cmd.seq) {
                        send_error(cmd.seq, ErrorCode::InvalidCommand, "seq must be strictly increasing");
                        continue;
                    }
                    if registry.controller != Some(client_id) {
                        send_error(cmd.seq, ErrorCode::NotController, "Only controller may send commands");
                        continue;
                    }
                }

                let mapped = match map_command(&cmd) {
                    Ok(c) => c,
                    Err(message) => {
                        send_error(cmd.seq, ErrorCode::InvalidCommand, &message);
                        continue;
                    }
                };

                // Ack is sent by the game loop once the command has been applied.
                let queued = command_tx.try_send(InboundCommand {
                    client_id,
                    seq: cmd.seq,
                    payload: InboundPayload::Command(mapped),
                });
                if queued.is_err() {
                    send_error(cmd.seq, ErrorCode::Backpressure, "Command queue is full");
                }
            }

            Ok(ParsedMessage::Unknown(unknown)) => {
                let mut registry = state.registry.write().await;
                if registry.is_handshaken(client_id)
                    && !registry.check_and_update_seq(client_id, unknown.seq)
                {
                    send_error(unknown.seq, ErrorCode::InvalidCommand, "seq must be strictly increasing");
                    continue;
                }
                send_error(unknown.seq, ErrorCode::InvalidCommand, "Unknown message type");
            }

            Err(e) => {
                let seq = extract_seq_best_effort(trimmed).unwrap_or(0);
                send_error(seq, ErrorCode::InvalidCommand, &format!("JSON parse error: {e}"));
            }
        }
    }

    // Remove the client and promote the next handshaken client if it was controller.
    {
        let mut registry = state.registry.write().await;
        registry.clients.retain(|c| c.id != client_id);
        if registry.controller == Some(client_id) {
            registry.controller = registry
                .clients
                .iter()
                .filter(|c| c.handshaken)
                .map(|c| c.id)
                .min();
            match registry.controller {
                Some(new_id) => log::info!("client {new_id} promoted to controller"),
                None => log::info!("controller {client_id} released"),
            }
        }
        state.publish_stats(&registry);
    }

    drop(send_error);
    drop(tx);
    let _ = write_task.await;
    Ok(())
}

fn same_major(requested: &str, ours: &str) -> bool {
    let major = |v: &str| v.split('.').next().map(str::to_string);
    major(requested).is_some_and(|m| !m.is_empty() && Some(m) == major(ours))
}

/// Map a protocol command into a game-loop command.
fn map_command(cmd: &CommandMessage) -> Result<ClientCommand, String> {
    match cmd.mode {
        CommandMode::Direction => cmd
            .direction
            .map(|d| ClientCommand::Move(d.into()))
            .ok_or_else(|| "Missing direction".to_string()),
        CommandMode::Voice => match cmd.text.as_deref().map(str::trim) {
            Some(text) if !text.is_empty() => Ok(ClientCommand::Voice(text.to_string())),
            _ => Err("Missing text".to_string()),
        },
        CommandMode::NewGame => Ok(ClientCommand::NewGame),
    }
}
