//! Adapter module - remote control via TCP socket with JSON protocol
//!
//! Lets an external program (a bot, a test harness, a speech pipeline on
//! another machine) drive the game and watch it.
//!
//! # Protocol Overview
//!
//! The adapter implements a **line-delimited JSON protocol** over TCP:
//!
//! 1. **Connection**: Client connects to TCP socket (default: 127.0.0.1:7848)
//! 2. **Handshake**: Client sends `hello`, server responds with `welcome`
//! 3. **Controller Assignment**: First client to hello becomes the controller;
//!    later clients observe. When the controller leaves, the oldest remaining
//!    client is promoted
//! 4. **Observation Streaming**: Server sends an observation after every change
//! 5. **Commanding**: Controller sends commands; each is answered with an `ack`
//!    once the game loop has processed it
//!
//! # Message Types
//!
//! ## Client → Server
//!
//! - **hello**: Handshake with client info and protocol version
//! - **command**: `mode` is `direction` (with `direction`), `voice` (with
//!   `text`, run through keyword extraction) or `new_game`
//!
//! ## Server → Client
//!
//! - **welcome**: Response to hello with client id and role
//! - **observation**: Grid values, scores, move count and the movement trace
//! - **ack**: `applied` when the game changed, `ignored` otherwise
//! - **error**: `handshake_required`, `protocol_mismatch`, `not_controller`,
//!   `invalid_command` or `backpressure`
//!
//! # Environment Variables
//!
//! - `TUI_2048_REMOTE_HOST`: Bind address (default: "127.0.0.1")
//! - `TUI_2048_REMOTE_PORT`: Port number (default: 7848)
//! - `TUI_2048_REMOTE_MAX_PENDING`: Command queue bound (default: 10)
//! - `TUI_2048_REMOTE_DISABLED`: Set to "1" or "true" to disable the adapter
//!
//! # Example Protocol Flow
//!
//! ```text
//! Client -> Server: {"type":"hello","seq":1,"ts":0,"client":{"name":"bot","version":"0.1.0"},"protocol_version":"1.0.0"}
//! Server -> Client: {"type":"welcome","seq":1,"ts":1700000000000,"protocol_version":"1.0.0","client_id":1,"role":"controller","controller_id":1,"game_id":"tui-2048"}
//! Server -> Client: {"type":"observation","seq":1,"ts":1700000000001,"playable":true,"game_over":false,"grid":[[2,0,0,0],...],...}
//! Client -> Server: {"type":"command","seq":2,"ts":0,"mode":"direction","direction":"west"}
//! Server -> Client: {"type":"ack","seq":2,"ts":1700000000002,"status":"applied"}
//! ```
//!
//! # Testing
//!
//! ```bash
//! nc 127.0.0.1 7848
//! {"type":"hello","seq":1,"ts":0,"client":{"name":"nc"},"protocol_version":"1.0.0"}
//! ```

pub mod protocol;
pub mod runtime;
pub mod server;

pub use tui_2048_core as core;
pub use tui_2048_types as types;

// Re-export protocol types for convenience
pub use protocol::*;
pub use runtime::{
    Adapter, AdapterStats, ClientCommand, InboundCommand, InboundPayload, OutboundMessage,
};
pub use server::{run_server, ServerConfig, DEFAULT_PORT};
