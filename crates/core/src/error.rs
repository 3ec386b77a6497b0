//! Error types for level validation, board generation and resolution.

use crate::types::{ColorId, Position};

/// A level configuration that cannot produce a playable board.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("grid must have positive dimensions (got {width}x{height})")]
    EmptyGrid { width: u8, height: u8 },

    #[error("level must use at least one color")]
    NoColors,

    #[error("{obstacles} obstacles leave no free cell on a {cells}-cell grid")]
    TooManyObstacles { obstacles: u16, cells: usize },

    #[error("target color {target} is outside the {num_colors}-color palette")]
    TargetOutOfPalette { target: ColorId, num_colors: u8 },

    #[error("extra spawn rate must be finite and non-negative (got {0})")]
    InvalidSpawnRate(f32),

    #[error("grid is {actual_width}x{actual_height}, level expects {width}x{height}")]
    GridMismatch {
        width: u8,
        height: u8,
        actual_width: u8,
        actual_height: u8,
    },

    #[error("tile at {position:?} has color {color} outside the {num_colors}-color palette")]
    TileOutOfPalette {
        position: Position,
        color: ColorId,
        num_colors: u8,
    },
}

/// Board generation failures.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GenerationError {
    #[error(transparent)]
    InvalidConfig(#[from] ConfigError),

    /// Every color appears at most once among the active tiles, so no
    /// adjacent pair can be forced.
    #[error("no color repeats among {active_tiles} active tiles, cannot form a pair")]
    NoPairPossible { active_tiles: usize },
}

/// Errors surfaced by the match engine.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error("invalid level config: {0}")]
    Config(#[from] ConfigError),

    #[error("board generation failed: {0}")]
    Generation(#[from] GenerationError),

    /// A cascade kept rescanning past the safety bound.
    #[error("cascade exceeded {limit} steps (reached {steps})")]
    CascadeOverflow { steps: u32, limit: u32 },
}
