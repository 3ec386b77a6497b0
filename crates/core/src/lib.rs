//! Core puzzle logic - pure, deterministic, and testable
//!
//! This crate contains the rules of the tile-matching puzzle: level
//! resolution, board generation, the swap/match/cascade state machine and the
//! stall watchdog. It has no UI or I/O dependencies; all randomness flows
//! through [`RandomSource`], so a seed reproduces a whole session.
//!
//! # Module Structure
//!
//! - [`level`]: level index to grid size, palette, obstacles, objective and stars
//! - [`generator`]: weighted board fill with a guaranteed adjacent pair
//! - [`board`]: flat-array grid with pair scans and column collapse
//! - [`engine`]: the session state machine and its event stream
//! - [`watchdog`]: hint and forced-shuffle timers
//! - [`scoring`]: combo scoring and star ratings
//! - [`rng`]: seeded LCG, weighted color sampling and a scripted source for tests
//!
//! # Rules
//!
//! - **Swap**: two adjacent tiles of the same color match when swapped; tiles
//!   of different colors swap back at no cost.
//! - **Cascade**: matched tiles are removed, survivors fall (obstacles stay
//!   put), refills drop in from the top, and every adjacent equal-color pair
//!   on the refilled board matches again with a growing combo.
//! - **Objective**: match `target_matches` tiles of the target color before
//!   the move budget runs out.
//!
//! # Example
//!
//! ```
//! use sock_match_core::{resolve_level, MatchEngine};
//! use sock_match_core::types::Phase;
//!
//! let config = resolve_level(1);
//! let mut engine = MatchEngine::with_seed(config, config.objective(), 12345).unwrap();
//!
//! // Generated boards always contain a pair.
//! let (a, b) = engine.find_hint().unwrap();
//! assert_eq!((a.x - b.x).abs() + (a.y - b.y).abs(), 1);
//!
//! assert_eq!(engine.phase(), Phase::Idle);
//! assert_eq!(engine.moves_remaining(), 25);
//! ```

pub mod board;
pub mod engine;
pub mod error;
pub mod generator;
pub mod level;
pub mod rng;
pub mod scoring;
pub mod snapshot;
pub mod watchdog;

pub use sock_match_types as types;

// Re-export commonly used types for convenience
pub use board::{CollapseReport, Grid};
pub use engine::{EngineSettings, MatchEngine, PlayerAction};
pub use error::{ConfigError, EngineError, GenerationError};
pub use generator::{fill_weights, force_adjacent_pair, generate, PairRepair};
pub use level::{
    resolve_level, LevelConfig, LevelConfigResolver, LevelObjective, ObjectiveGenerator,
    ObjectiveProgress, StarThresholds,
};
pub use rng::{ColorWeights, RandomSource, ScriptedRng, SimpleRng};
pub use scoring::{match_score, star_rating};
pub use snapshot::GameSnapshot;
pub use watchdog::{StallWatchdog, WatchdogSettings, WatchdogTick};
