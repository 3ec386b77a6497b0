//! Progression persistence
//!
//! The shell keeps two counters in a key/value store:
//! [`LEVEL_UNLOCKED`] (highest playable level) and [`NEXT_LEVEL`] (the level
//! the next session starts on). Both default to 1.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::warn;

pub const LEVEL_UNLOCKED: &str = "LevelUnlocked";
pub const NEXT_LEVEL: &str = "NextLevel";

/// Persistent key/value store of scalar counters.
pub trait ProgressStore {
    fn get(&self, key: &str, default: u32) -> u32;
    fn set(&mut self, key: &str, value: u32) -> Result<()>;
}

/// Highest level the player may start.
pub fn unlocked_level(store: &dyn ProgressStore) -> u32 {
    store.get(LEVEL_UNLOCKED, 1).max(1)
}

/// Level the next session should start on.
pub fn next_level(store: &dyn ProgressStore) -> u32 {
    store.get(NEXT_LEVEL, 1).max(1)
}

/// Record a win on `level`: unlock the following level and point at it.
pub fn record_win(store: &mut dyn ProgressStore, level: u32) -> Result<()> {
    let unlocked = unlocked_level(store).max(level + 1);
    store.set(LEVEL_UNLOCKED, unlocked)?;
    store.set(NEXT_LEVEL, level + 1)
}

/// Point the next session back at `level`.
pub fn record_retry(store: &mut dyn ProgressStore, level: u32) -> Result<()> {
    store.set(NEXT_LEVEL, level.max(1))
}

/// In-memory store (tests, ephemeral sessions).
#[derive(Debug, Clone, Default)]
pub struct MemoryProgressStore {
    values: BTreeMap<String, u32>,
}

impl MemoryProgressStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressStore for MemoryProgressStore {
    fn get(&self, key: &str, default: u32) -> u32 {
        self.values.get(key).copied().unwrap_or(default)
    }

    fn set(&mut self, key: &str, value: u32) -> Result<()> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}

/// JSON object on disk, rewritten on every `set`.
///
/// A missing file is an empty store. A file that cannot be parsed is logged
/// and treated as empty; it is replaced on the next write.
#[derive(Debug, Clone)]
pub struct JsonFileProgressStore {
    path: PathBuf,
    values: BTreeMap<String, u32>,
}

impl JsonFileProgressStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let values = match fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str(&text) {
                Ok(values) => values,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "corrupt progress file, starting fresh");
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("failed to read progress file {}", path.display()))
            }
        };
        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<()> {
        let text = serde_json::to_string_pretty(&self.values)
            .context("failed to encode progress")?;
        fs::write(&self.path, text)
            .with_context(|| format!("failed to write progress file {}", self.path.display()))
    }
}

impl ProgressStore for JsonFileProgressStore {
    fn get(&self, key: &str, default: u32) -> u32 {
        self.values.get(key).copied().unwrap_or(default)
    }

    fn set(&mut self, key: &str, value: u32) -> Result<()> {
        self.values.insert(key.to_string(), value);
        self.flush()
    }
}
