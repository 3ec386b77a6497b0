//! Shell configuration read from `SOCK_MATCH_*` environment variables.

use std::path::PathBuf;

use sock_match_core::types::HINT_DELAY_MS;

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// RNG seed; `None` derives one from the clock at startup.
    pub seed: Option<u32>,
    /// Level to play instead of the stored next level.
    pub level: Option<u32>,
    pub progress_path: PathBuf,
    pub log_path: Option<PathBuf>,
    pub hint_delay_ms: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            seed: None,
            level: None,
            progress_path: PathBuf::from("sock-match-progress.json"),
            log_path: None,
            hint_delay_ms: HINT_DELAY_MS,
        }
    }
}

impl AppConfig {
    /// Create from environment variables. Unparsable values fall back to defaults.
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build from any variable lookup.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let non_empty = |key: &str| {
            var(key)
                .map(|s| s.trim().to_string())
                .and_then(|s| if s.is_empty() { None } else { Some(s) })
        };

        let seed = non_empty("SOCK_MATCH_SEED").and_then(|s| s.parse().ok());
        let level = non_empty("SOCK_MATCH_LEVEL")
            .and_then(|s| s.parse().ok())
            .filter(|&l: &u32| l > 0);
        let progress_path = non_empty("SOCK_MATCH_PROGRESS_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.progress_path);
        let log_path = non_empty("SOCK_MATCH_LOG_PATH").map(PathBuf::from);
        let hint_delay_ms = non_empty("SOCK_MATCH_HINT_DELAY_MS")
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.hint_delay_ms);

        Self {
            seed,
            level,
            progress_path,
            log_path,
            hint_delay_ms,
        }
    }
}
