//! Application shell around the puzzle core
//!
//! The core treats these as external collaborators; a complete product needs
//! them anyway:
//!
//! - [`config`]: `SOCK_MATCH_*` environment configuration
//! - [`progress`]: key/value progression store (memory or JSON file)
//! - [`powerups`]: lint roller, softener and basket inventory
//! - [`session`]: wires level resolution, engine, watchdog, power-ups and progress

pub mod config;
pub mod powerups;
pub mod progress;
pub mod session;

pub use config::AppConfig;
pub use powerups::{PowerupInventory, PowerupKind, PowerupOutcome};
pub use progress::{JsonFileProgressStore, MemoryProgressStore, ProgressStore};
pub use session::Session;
