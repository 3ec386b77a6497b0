//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the application.
//! All types are plain data with no required dependencies, making them usable
//! from the core engine, the terminal front end and any external consumer of
//! engine events (renderer, audio, telemetry).
//!
//! # Coordinates
//!
//! Grids are addressed with `(x, y)` where `x` grows to the right and `y`
//! grows **upwards**. Row `y = 0` is the bottom row: gravity pulls tiles
//! towards it and refills enter from the top.
//!
//! # Scoring Constants
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `BASE_PAIR_SCORE` | 100 | Points for the first match of an action |
//! | `COMBO_BONUS_PCT` | 0.25 | Extra fraction of the base per combo step |
//! | `BASE_POINT_PER_MATCH` | 50 | Default per-match value behind star thresholds |
//!
//! # Timing Constants
//!
//! Timing values are in milliseconds:
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `TICK_MS` | 16 | Scheduler tick driving the stall watchdog |
//! | `HINT_DELAY_MS` | 5000 | Inactivity before a hint pair is offered |
//!
//! # Examples
//!
//! ```
//! use sock_match_types::{Cell, Direction, Position};
//!
//! let pos = Position::new(2, 3);
//! assert_eq!(pos.step(Direction::Up), Some(Position::new(2, 4)));
//!
//! let dir = Direction::from_str("left").unwrap();
//! assert_eq!(dir, Direction::Left);
//!
//! let cell = Cell::sock(4);
//! assert_eq!(cell.color_id(), 4);
//! assert_eq!(Cell::obstacle().color_id(), -1);
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Points awarded for the first match of an action.
pub const BASE_PAIR_SCORE: u32 = 100;

/// Bonus fraction of `BASE_PAIR_SCORE` added per combo step.
pub const COMBO_BONUS_PCT: f64 = 0.25;

/// Default per-match value used to derive star thresholds.
pub const BASE_POINT_PER_MATCH: u32 = 50;

/// Scheduler tick interval in milliseconds (16ms ≈ 60 FPS).
pub const TICK_MS: u32 = 16;

/// Inactivity before a hint is offered (5 seconds).
pub const HINT_DELAY_MS: u32 = 5000;

/// Largest number of distinct tile colors any level uses.
pub const MAX_COLORS: u8 = 8;

/// Tile color index in `[0, num_colors)`.
pub type ColorId = u8;

/// A grid coordinate. `y = 0` is the bottom row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Position {
    pub x: i16,
    pub y: i16,
}

impl Position {
    pub const fn new(x: i16, y: i16) -> Self {
        Self { x, y }
    }

    /// The neighbouring position one step in `dir` (may be off-grid).
    /// `None` when the coordinate would leave the `i16` range.
    pub fn step(self, dir: Direction) -> Option<Self> {
        let (dx, dy) = dir.delta();
        Some(Self {
            x: self.x.checked_add(dx)?,
            y: self.y.checked_add(dy)?,
        })
    }
}

/// Swap directions, four-connected only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Unit offset for this direction (`Up` is `+y`).
    pub const fn delta(self) -> (i16, i16) {
        match self {
            Direction::Up => (0, 1),
            Direction::Down => (0, -1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub const fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Direction from `a` to an adjacent `b`, `None` if not four-adjacent.
    pub fn between(a: Position, b: Position) -> Option<Self> {
        Self::ALL.into_iter().find(|&d| a.step(d) == Some(b))
    }

    /// Parse direction from string
    ///
    /// Accepts full names or single letters (case-insensitive):
    /// "up" | "u", "down" | "d", "left" | "l", "right" | "r"
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "up" | "u" => Some(Direction::Up),
            "down" | "d" => Some(Direction::Down),
            "left" | "l" => Some(Direction::Left),
            "right" | "r" => Some(Direction::Right),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

/// What occupies a grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Tile {
    /// A matchable tile of the given color.
    Sock(ColorId),
    /// A blocker: never matched by swaps, never swapped.
    Obstacle,
}

/// A single grid cell.
///
/// Obstacles have no color by construction; `color_id()` reports them as `-1`
/// for consumers that want the flat integer encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Cell {
    pub tile: Tile,
    /// Set while the cell is part of a match that has not been collapsed yet.
    pub matched: bool,
}

impl Cell {
    pub const fn sock(color: ColorId) -> Self {
        Self {
            tile: Tile::Sock(color),
            matched: false,
        }
    }

    pub const fn obstacle() -> Self {
        Self {
            tile: Tile::Obstacle,
            matched: false,
        }
    }

    pub fn is_obstacle(&self) -> bool {
        matches!(self.tile, Tile::Obstacle)
    }

    pub fn color(&self) -> Option<ColorId> {
        match self.tile {
            Tile::Sock(c) => Some(c),
            Tile::Obstacle => None,
        }
    }

    /// Flat integer encoding: the color, or `-1` for obstacles.
    pub fn color_id(&self) -> i32 {
        self.color().map_or(-1, i32::from)
    }

    /// A tile that can be swapped, hinted, shuffled or matched.
    pub fn is_active(&self) -> bool {
        !self.matched && !self.is_obstacle()
    }
}

/// Engine state machine phases.
///
/// `Idle` is both the initial phase and the phase after every completed
/// resolution. `Won` and `Lost` are terminal for the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Phase {
    #[default]
    Idle,
    Swapping,
    Resolving,
    Won,
    Lost,
}

impl Phase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Won | Phase::Lost)
    }

    /// An action is in flight; grid mutation from any other source is refused.
    pub fn is_busy(&self) -> bool {
        matches!(self, Phase::Swapping | Phase::Resolving)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Swapping => "swapping",
            Phase::Resolving => "resolving",
            Phase::Won => "won",
            Phase::Lost => "lost",
        }
    }
}

/// Why a swap or removal request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RejectReason {
    /// Another action is still resolving.
    Busy,
    /// The session already ended (won or lost).
    SessionOver,
    OutOfBounds,
    Obstacle,
    AlreadyMatched,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::Busy => "busy",
            RejectReason::SessionOver => "session_over",
            RejectReason::OutOfBounds => "out_of_bounds",
            RejectReason::Obstacle => "obstacle",
            RejectReason::AlreadyMatched => "already_matched",
        }
    }
}

/// Power-up removal targets selected outside the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Removal {
    /// Every active tile of this color.
    Color(ColorId),
    /// Every obstacle on the grid.
    AllObstacles,
    /// One active tile.
    Single(Position),
}

/// A tile that moved from one cell to another (shuffles).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TileMove {
    pub from: Position,
    pub to: Position,
}

/// A freshly spawned refill tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SpawnedTile {
    pub at: Position,
    pub color: ColorId,
}

/// Events emitted by the core for renderers, audio, UI and telemetry.
///
/// Events are buffered by the engine and drained by the caller after each
/// operation.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(tag = "type", rename_all = "snake_case")
)]
pub enum CoreEvent {
    SwapRejected {
        at: Position,
        direction: Direction,
        reason: RejectReason,
    },
    /// Both cells were exchanged (accepted swap).
    Swapped { a: Position, b: Position },
    /// The swap produced no match and was undone at no cost.
    SwapReverted { a: Position, b: Position },
    Matched {
        cells: Vec<Position>,
        score_gained: u32,
        combo: u32,
    },
    CascadeStep {
        collapsed_columns: Vec<i16>,
        new_cells: Vec<SpawnedTile>,
    },
    CascadeComplete,
    Hint { a: Position, b: Position },
    Shuffled { moves: Vec<TileMove> },
    Won {
        score: u32,
        stars: u8,
        moves_remaining: u32,
    },
    Lost { score: u32, matched_count: u32 },
}
