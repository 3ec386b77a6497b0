//! Level module - per-level configuration and objectives
//!
//! Both resolvers are pure and total over `level ∈ [1, max_levels]`; inputs
//! outside that range are clamped.
//!
//! # Objective ramp
//!
//! With `t = (level - 1) / (max_levels - 1)`:
//!
//! | Field | Level 1 | Last level |
//! |-------|---------|------------|
//! | `target_matches` | 5 | 20 |
//! | `move_limit` | 25 | 10 |
//!
//! Star thresholds derive from `base = target_matches * base_point_per_match`:
//! `one = round(0.5 base)`, `two = base + round(0.2 base)`, `three = round(1.5 base)`.
//!
//! # Level brackets
//!
//! | Levels | Grid | Colors | Obstacles |
//! |--------|------|--------|-----------|
//! | 1-5 | 6x8 | 4-5 | 0 |
//! | 6-10 | 7x8 | 5-6 | `(level - 5) / 3` |
//! | 11-20 | 8x9 | 6-8 | `(level - 5) / 3` |
//! | 21+ | 9x9 | 8 | `(level - 5) / 3`, at most 9 |
//!
//! The obstacle count is then nudged by one so the free cells pair up evenly.

use crate::error::ConfigError;
use crate::types::{ColorId, BASE_POINT_PER_MATCH, MAX_COLORS};

const MIN_TARGET_MATCHES: u32 = 5;
const MAX_TARGET_MATCHES: u32 = 20;
const MIN_MOVES: u32 = 10;
const MAX_MOVES: u32 = 25;

const BASE_COLORS: u8 = 4;
const MAX_OBSTACLES: u16 = 9;

const BASE_SHUFFLE_INTERVAL_MS: f64 = 20_000.0;
const MIN_SHUFFLE_INTERVAL_MS: f64 = 8_000.0;

/// Default number of levels in a campaign.
pub const DEFAULT_MAX_LEVELS: u32 = 30;

/// Per-match value the level resolver feeds into star thresholds.
pub const LEVEL_POINT_PER_MATCH: u32 = 30;

/// Bonus weight of the target color during fills.
pub const DEFAULT_EXTRA_SPAWN_RATE: f32 = 0.5;

/// Score thresholds for star ratings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct StarThresholds {
    pub one: u32,
    pub two: u32,
    pub three: u32,
}

impl StarThresholds {
    /// Thresholds for a level whose nominal score is `base`.
    pub fn from_base(base: u32) -> Self {
        let base_f = f64::from(base);
        Self {
            one: (base_f * 0.5).round() as u32,
            two: base + (base_f * 0.2).round() as u32,
            three: (base_f * 1.5).round() as u32,
        }
    }
}

/// A level's win condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LevelObjective {
    /// Level index after clamping.
    pub level: u32,
    pub target_color: ColorId,
    pub target_matches: u32,
    pub move_limit: u32,
    pub stars: StarThresholds,
}

/// Running progress towards the objective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ObjectiveProgress {
    pub target_color: ColorId,
    /// Target-color tiles matched so far (each tile counts once).
    pub matched_count: u32,
    pub target_matches: u32,
    pub move_limit: u32,
    pub stars: StarThresholds,
}

impl ObjectiveProgress {
    pub fn new(objective: &LevelObjective) -> Self {
        Self {
            target_color: objective.target_color,
            matched_count: 0,
            target_matches: objective.target_matches,
            move_limit: objective.move_limit,
            stars: objective.stars,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.matched_count >= self.target_matches
    }

    pub fn remaining(&self) -> u32 {
        self.target_matches.saturating_sub(self.matched_count)
    }
}

/// Maps a level index to its objective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectiveGenerator {
    /// Target colors rotate through `0..num_colors`.
    pub num_colors: u8,
    pub base_point_per_match: u32,
    pub max_levels: u32,
}

impl Default for ObjectiveGenerator {
    fn default() -> Self {
        Self {
            num_colors: MAX_COLORS,
            base_point_per_match: BASE_POINT_PER_MATCH,
            max_levels: DEFAULT_MAX_LEVELS,
        }
    }
}

impl ObjectiveGenerator {
    /// Objective for `level` (clamped into `[1, max_levels]`).
    ///
    /// A `max_levels` below 2 pins every level to the start of the ramp.
    pub fn objective(&self, level: u32) -> LevelObjective {
        let max_levels = self.max_levels.max(1);
        let level = level.clamp(1, max_levels);
        let span = max_levels.saturating_sub(1).max(1);
        let t = f64::from(level - 1) / f64::from(span);

        let target_matches = lerp(MIN_TARGET_MATCHES, MAX_TARGET_MATCHES, t);
        let move_limit = lerp(MAX_MOVES, MIN_MOVES, t);
        let target_color = ((level - 1) % u32::from(self.num_colors.max(1))) as ColorId;

        LevelObjective {
            level,
            target_color,
            target_matches,
            move_limit,
            stars: StarThresholds::from_base(target_matches * self.base_point_per_match),
        }
    }
}

fn lerp(from: u32, to: u32, t: f64) -> u32 {
    let v = f64::from(from) + (f64::from(to) - f64::from(from)) * t;
    v.round() as u32
}

/// Everything needed to build and play one level. Immutable once resolved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelConfig {
    pub level: u32,
    pub width: u8,
    pub height: u8,
    pub num_colors: u8,
    pub num_obstacles: u16,
    pub target_color: ColorId,
    pub target_matches: u32,
    pub move_limit: u32,
    pub stars: StarThresholds,
    /// Weight bonus of the target color during fills.
    pub extra_spawn_rate: f32,
    /// Forced-shuffle period; 0 disables it.
    pub stall_shuffle_interval_ms: u32,
}

impl LevelConfig {
    pub fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Number of tile pairs the free cells form.
    pub fn total_pairs(&self) -> usize {
        self.cell_count().saturating_sub(self.num_obstacles as usize) / 2
    }

    /// The objective embedded in this config.
    pub fn objective(&self) -> LevelObjective {
        LevelObjective {
            level: self.level,
            target_color: self.target_color,
            target_matches: self.target_matches,
            move_limit: self.move_limit,
            stars: self.stars,
        }
    }

    /// Replace the objective fields (level, target, budget, stars).
    pub fn with_objective(mut self, objective: &LevelObjective) -> Self {
        self.level = objective.level;
        self.target_color = objective.target_color;
        self.target_matches = objective.target_matches;
        self.move_limit = objective.move_limit;
        self.stars = objective.stars;
        self
    }

    /// Reject configs that cannot produce a board.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::EmptyGrid {
                width: self.width,
                height: self.height,
            });
        }
        if self.num_colors == 0 {
            return Err(ConfigError::NoColors);
        }
        if self.num_obstacles as usize >= self.cell_count() {
            return Err(ConfigError::TooManyObstacles {
                obstacles: self.num_obstacles,
                cells: self.cell_count(),
            });
        }
        if self.target_color >= self.num_colors {
            return Err(ConfigError::TargetOutOfPalette {
                target: self.target_color,
                num_colors: self.num_colors,
            });
        }
        if !self.extra_spawn_rate.is_finite() || self.extra_spawn_rate < 0.0 {
            return Err(ConfigError::InvalidSpawnRate(self.extra_spawn_rate));
        }
        Ok(())
    }
}

/// Maps a level index to its full [`LevelConfig`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelConfigResolver {
    pub max_levels: u32,
    pub base_point_per_match: u32,
    pub extra_spawn_rate: f32,
}

impl Default for LevelConfigResolver {
    fn default() -> Self {
        Self {
            max_levels: DEFAULT_MAX_LEVELS,
            base_point_per_match: LEVEL_POINT_PER_MATCH,
            extra_spawn_rate: DEFAULT_EXTRA_SPAWN_RATE,
        }
    }
}

impl LevelConfigResolver {
    pub fn resolve(&self, level: u32) -> LevelConfig {
        let max_levels = self.max_levels.max(1);
        let level = level.clamp(1, max_levels);

        let (width, height) = match level {
            0..=5 => (6, 8),
            6..=10 => (7, 8),
            11..=20 => (8, 9),
            _ => (9, 9),
        };
        let cells = width as usize * height as usize;

        let num_colors = (BASE_COLORS as u32 + (level - 1) / 4).min(MAX_COLORS as u32) as u8;

        let raw = if level <= 5 { 0 } else { (level - 5) / 3 };
        let mut num_obstacles = raw.min(MAX_OBSTACLES as u32) as u16;
        if (cells - num_obstacles as usize) % 2 != 0 {
            if num_obstacles > 0 {
                num_obstacles -= 1;
            } else {
                num_obstacles += 1;
            }
        }

        let objective = ObjectiveGenerator {
            num_colors,
            base_point_per_match: self.base_point_per_match,
            max_levels,
        }
        .objective(level);

        let interval = (BASE_SHUFFLE_INTERVAL_MS
            - f64::from(level - 1) * (BASE_SHUFFLE_INTERVAL_MS - MIN_SHUFFLE_INTERVAL_MS) / 29.0)
            .max(MIN_SHUFFLE_INTERVAL_MS);

        LevelConfig {
            level,
            width,
            height,
            num_colors,
            num_obstacles,
            target_color: objective.target_color,
            target_matches: objective.target_matches,
            move_limit: objective.move_limit,
            stars: objective.stars,
            extra_spawn_rate: self.extra_spawn_rate,
            stall_shuffle_interval_ms: interval.round() as u32,
        }
    }
}

/// Resolve with the default campaign settings.
pub fn resolve_level(level: u32) -> LevelConfig {
    LevelConfigResolver::default().resolve(level)
}
