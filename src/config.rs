//! Runtime configuration from environment variables.

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::input::VoiceBackend;
use crate::store::StoreConfig;

/// Everything the binary reads from the environment at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Spawn RNG seed (`TUI_2048_SEED`, default: derived from the clock)
    pub seed: u32,
    /// Log file (`TUI_2048_LOG_PATH`); logs go to stderr when unset
    pub log_path: Option<PathBuf>,
    pub store: StoreConfig,
    pub voice: VoiceBackend,
}

impl AppConfig {
    pub fn from_env() -> Self {
        use std::env;

        let seed = env::var("TUI_2048_SEED")
            .ok()
            .and_then(|s| parse_seed(&s))
            .unwrap_or_else(clock_seed);

        let log_path = env::var("TUI_2048_LOG_PATH")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);

        Self {
            seed,
            log_path,
            store: StoreConfig::from_env(),
            voice: VoiceBackend::detect(),
        }
    }
}

fn parse_seed(s: &str) -> Option<u32> {
    s.trim().parse().ok()
}

fn clock_seed() -> u32 {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    // Fold the high bits in so consecutive launches differ.
    (nanos ^ (nanos >> 32)) as u32
}
