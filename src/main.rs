//! Terminal 2048 runner (default binary).
//!
//! Keyboard input through crossterm, optional voice transcripts from a FIFO,
//! optional remote control over TCP, all feeding one game session. Rendering
//! uses the canvas-based terminal renderer.

use std::fs::OpenOptions;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyEventKind};

use tui_2048::adapter::{Adapter, OutboundMessage};
use tui_2048::app::App;
use tui_2048::config::AppConfig;
use tui_2048::core::{GameSession, GameStore};
use tui_2048::input::{
    handle_key_event, open_direction_source, should_quit, DirectionSource, InputCommand,
    VoiceBackend,
};
use tui_2048::term::{
    Canvas, GameView, RemoteStatusView, StatusView, TerminalRenderer, Viewport, VoiceStatus,
};

/// How long to wait for a key before checking voice and remote input
const POLL_INTERVAL: Duration = Duration::from_millis(30);

fn main() -> Result<()> {
    let config = AppConfig::from_env();
    init_logging(config.log_path.as_deref())?;
    log::info!("starting with seed {} store {:?}", config.seed, config.store);

    let mut session = GameSession::new(config.store.open(), config.seed);
    session.resume();
    let mut app = App::new(session);

    let mut voice = open_direction_source(&config.voice);
    let voice_available = config.voice != VoiceBackend::Silent;

    let mut adapter = match Adapter::start_from_env() {
        Ok(adapter) => adapter,
        Err(e) => {
            log::warn!("remote adapter unavailable: {e:#}");
            None
        }
    };

    let mut term = TerminalRenderer::new();
    term.enter()?;

    let result = run(&mut term, &mut app, voice.as_mut(), voice_available, adapter.as_mut());

    // Always try to restore terminal state.
    let _ = term.exit();
    result
}

fn init_logging(log_path: Option<&Path>) -> Result<()> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if let Some(path) = log_path {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("failed to open log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}

fn run<S: GameStore>(
    term: &mut TerminalRenderer,
    app: &mut App<S>,
    voice: &mut dyn DirectionSource,
    voice_available: bool,
    mut adapter: Option<&mut Adapter>,
) -> Result<()> {
    let view = GameView::default();
    let mut canvas = Canvas::new(0, 0);
    let mut last_frame: Option<(Viewport, StatusView)> = None;

    loop {
        let mut changed = false;

        if event::poll(POLL_INTERVAL)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if should_quit(key) {
                        return Ok(());
                    }
                    match handle_key_event(key) {
                        Some(InputCommand::ToggleVoice) if voice_available => {
                            if voice.is_listening() {
                                voice.stop();
                            } else {
                                voice.start();
                            }
                            log::info!("{} listening: {}", voice.name(), voice.is_listening());
                        }
                        Some(command) => changed |= app.apply_input(command),
                        None => {}
                    }
                }
                Event::Resize(..) => last_frame = None,
                _ => {}
            }
        }

        if voice.is_listening() {
            voice.poll(&mut |text| {
                let recognized = app.apply_voice_text(text);
                changed |= recognized;
                recognized
            });
        }

        if let Some(adapter) = adapter.as_deref_mut() {
            while let Some(cmd) = adapter.try_recv() {
                changed |= app.handle_inbound(cmd, &mut |msg| adapter.send(msg));
            }
            if changed {
                adapter.send(OutboundMessage::BroadcastObservation {
                    obs: app.observation(),
                });
            }
        }

        let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
        let viewport = Viewport::new(w, h);
        let status = StatusView {
            voice: match (voice_available, voice.is_listening()) {
                (false, _) => VoiceStatus::Unavailable,
                (true, true) => VoiceStatus::Listening,
                (true, false) => VoiceStatus::Idle,
            },
            remote: adapter.as_deref().map(|a| RemoteStatusView {
                client_count: a.stats().client_count().min(u16::MAX as usize) as u16,
                controller_id: a.stats().controller_id(),
            }),
        };

        if changed || last_frame != Some((viewport, status)) {
            view.render_into(app.snapshot(), &status, viewport, &mut canvas);
            term.draw(&canvas)?;
            last_frame = Some((viewport, status));
        }
    }
}
