use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use tui_2048::adapter::protocol::{build_observation, create_ack, create_hello, AckStatus};
use tui_2048::adapter::{
    run_server, AdapterStats, ClientCommand, InboundCommand, InboundPayload, OutboundMessage,
    ServerConfig, PROTOCOL_VERSION,
};
use tui_2048::core::{GameSession, MemoryStore};
use tui_2048::types::Direction;

struct Harness {
    addr: SocketAddr,
    cmd_rx: mpsc::Receiver<InboundCommand>,
    out_tx: mpsc::UnboundedSender<OutboundMessage>,
    stats: Arc<AdapterStats>,
    server: JoinHandle<()>,
}

async fn start_server(max_pending_commands: usize) -> Harness {
    let config = ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        protocol_version: PROTOCOL_VERSION.to_string(),
        max_pending_commands,
    };

    let (cmd_tx, cmd_rx) = mpsc::channel::<InboundCommand>(max_pending_commands);
    let (out_tx, out_rx) = mpsc::unbounded_channel::<OutboundMessage>();
    let (ready_tx, ready_rx) = oneshot::channel();
    let stats = Arc::new(AdapterStats::default());

    let server_stats = Arc::clone(&stats);
    let server = tokio::spawn(async move {
        let _ = run_server(config, cmd_tx, out_rx, server_stats, Some(ready_tx)).await;
    });

    let addr = tokio::time::timeout(Duration::from_secs(2), ready_rx)
        .await
        .expect("server did not signal ready")
        .expect("ready channel dropped");

    Harness {
        addr,
        cmd_rx,
        out_tx,
        stats,
        server,
    }
}

struct Client {
    lines: Lines<BufReader<OwnedReadHalf>>,
    writer: OwnedWriteHalf,
}

impl Client {
    async fn connect(addr: SocketAddr) -> Self {
        let stream = TcpStream::connect(addr).await.expect("connect failed");
        let (read_half, writer) = stream.into_split();
        Self {
            lines: BufReader::new(read_half).lines(),
            writer,
        }
    }

    async fn send(&mut self, line: &str) {
        self.writer.write_all(line.as_bytes()).await.unwrap();
        self.writer.write_all(b"\n").await.unwrap();
        self.writer.flush().await.unwrap();
    }

    async fn hello(&mut self, seq: u64) -> serde_json::Value {
        let hello = serde_json::to_string(&create_hello(seq, "e2e-test", PROTOCOL_VERSION)).unwrap();
        self.send(&hello).await;
        self.recv().await
    }

    async fn recv_line(&mut self) -> Option<String> {
        tokio::time::timeout(Duration::from_secs(2), self.lines.next_line())
            .await
            .expect("timed out waiting for server")
            .unwrap()
    }

    async fn recv(&mut self) -> serde_json::Value {
        let line = self.recv_line().await.expect("connection closed");
        serde_json::from_str(&line).unwrap()
    }
}

async fn next_inbound(rx: &mut mpsc::Receiver<InboundCommand>) -> InboundCommand {
    tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .unwrap()
        .expect("expected inbound command")
}

#[tokio::test]
async fn adapter_hello_command_ack_and_observation() {
    let mut h = start_server(8).await;
    let mut client = Client::connect(h.addr).await;

    let welcome = client.hello(1).await;
    assert_eq!(welcome["type"], "welcome");
    assert_eq!(welcome["seq"], 1);
    assert_eq!(welcome["role"], "controller");
    assert_eq!(welcome["game_id"], "tui-2048");

    // Streaming clients ask for the current state right after the handshake.
    let request = next_inbound(&mut h.cmd_rx).await;
    assert_eq!(request.payload, InboundPayload::SnapshotRequest);

    client
        .send(r#"{"type":"command","seq":2,"ts":1,"mode":"direction","direction":"west"}"#)
        .await;
    let inbound = next_inbound(&mut h.cmd_rx).await;
    assert_eq!(inbound.seq, 2);
    assert_eq!(
        inbound.payload,
        InboundPayload::Command(ClientCommand::Move(Direction::West))
    );

    h.out_tx
        .send(OutboundMessage::ToClientAck {
            client_id: inbound.client_id,
            ack: create_ack(2, AckStatus::Applied),
        })
        .unwrap();
    let ack = client.recv().await;
    assert_eq!(ack["type"], "ack");
    assert_eq!(ack["seq"], 2);
    assert_eq!(ack["status"], "applied");

    let mut session = GameSession::new(MemoryStore::new(), 1);
    session.start_new_game();
    h.out_tx
        .send(OutboundMessage::BroadcastObservation {
            obs: build_observation(&session.snapshot(), 10),
        })
        .unwrap();
    let obs = client.recv().await;
    assert_eq!(obs["type"], "observation");
    assert_eq!(obs["seq"], 10);
    assert_eq!(obs["movements"].as_array().unwrap().len(), 2);
    assert_eq!(h.stats.controller_id(), Some(inbound.client_id));

    h.server.abort();
}

#[tokio::test]
async fn adapter_requires_handshake() {
    let h = start_server(8).await;
    let mut client = Client::connect(h.addr).await;

    client
        .send(r#"{"type":"command","seq":1,"ts":1,"mode":"new_game"}"#)
        .await;
    let err = client.recv().await;
    assert_eq!(err["type"], "error");
    assert_eq!(err["code"], "handshake_required");

    h.server.abort();
}

#[tokio::test]
async fn adapter_second_client_observes() {
    let mut h = start_server(8).await;
    let mut controller = Client::connect(h.addr).await;
    let mut observer = Client::connect(h.addr).await;

    assert_eq!(controller.hello(1).await["role"], "controller");
    let welcome = observer.hello(1).await;
    assert_eq!(welcome["role"], "observer");
    assert_eq!(welcome["controller_id"], 1);

    observer
        .send(r#"{"type":"command","seq":2,"ts":1,"mode":"direction","direction":"north"}"#)
        .await;
    let err = observer.recv().await;
    assert_eq!(err["code"], "not_controller");

    // Only the two snapshot requests reached the game loop.
    for _ in 0..2 {
        assert_eq!(
            next_inbound(&mut h.cmd_rx).await.payload,
            InboundPayload::SnapshotRequest
        );
    }
    assert!(h.cmd_rx.try_recv().is_err());

    h.server.abort();
}

#[tokio::test]
async fn adapter_controller_disconnect_promotes_observer() {
    let h = start_server(8).await;
    let mut first = Client::connect(h.addr).await;
    let mut second = Client::connect(h.addr).await;
    first.hello(1).await;
    second.hello(1).await;

    drop(first);
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while h.stats.controller_id() != Some(2) && tokio::time::Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(h.stats.controller_id(), Some(2));
    assert_eq!(h.stats.client_count(), 1);

    h.server.abort();
}

#[tokio::test]
async fn adapter_backpressure_returns_error() {
    let h = start_server(1).await;
    let mut client = Client::connect(h.addr).await;

    client
        .send(r#"{"type":"hello","seq":1,"ts":0,"client":{"name":"bp"},"protocol_version":"1.0.0","requested":{"stream_observations":false}}"#)
        .await;
    assert_eq!(client.recv().await["type"], "welcome");

    // Nobody drains the queue: the first command fills it, the second is refused.
    client
        .send(r#"{"type":"command","seq":2,"ts":1,"mode":"direction","direction":"east"}"#)
        .await;
    client
        .send(r#"{"type":"command","seq":3,"ts":1,"mode":"direction","direction":"east"}"#)
        .await;
    let err = client.recv().await;
    assert_eq!(err["code"], "backpressure");
    assert_eq!(err["seq"], 3);

    h.server.abort();
}

#[tokio::test]
async fn adapter_rejects_stale_seq_and_bad_commands() {
    let h = start_server(8).await;
    let mut client = Client::connect(h.addr).await;
    client.hello(5).await;

    client
        .send(r#"{"type":"command","seq":5,"ts":1,"mode":"new_game"}"#)
        .await;
    let err = client.recv().await;
    assert_eq!(err["code"], "invalid_command");
    assert_eq!(err["seq"], 5);

    client
        .send(r#"{"type":"command","seq":6,"ts":1,"mode":"direction"}"#)
        .await;
    let err = client.recv().await;
    assert_eq!(err["code"], "invalid_command");
    assert_eq!(err["message"], "Missing direction");

    client.send(r#"{"seq": 7, "oops""#).await;
    let err = client.recv().await;
    assert_eq!(err["code"], "invalid_command");
    assert_eq!(err["seq"], 7);

    h.server.abort();
}

#[tokio::test]
async fn adapter_protocol_mismatch_closes_connection() {
    let h = start_server(8).await;
    let mut client = Client::connect(h.addr).await;

    let hello = serde_json::to_string(&create_hello(1, "old", "0.9.0")).unwrap();
    client.send(&hello).await;
    let err = client.recv().await;
    assert_eq!(err["code"], "protocol_mismatch");
    assert_eq!(client.recv_line().await, None);

    h.server.abort();
}
