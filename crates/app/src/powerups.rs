//! Power-up inventory
//!
//! Power-ups are selected, then applied to a tapped tile. The core only sees
//! the resulting [`Removal`].

use sock_match_core::types::{Cell, Position, Removal};
use sock_match_core::{EngineError, MatchEngine, RandomSource};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PowerupKind {
    /// Removes a single tile.
    LintRoller,
    /// Clears every obstacle.
    Softener,
    /// Removes every tile of the tapped color (not the objective color).
    Basket,
}

impl PowerupKind {
    pub const ALL: [PowerupKind; 3] = [
        PowerupKind::LintRoller,
        PowerupKind::Softener,
        PowerupKind::Basket,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PowerupKind::LintRoller => "lint_roller",
            PowerupKind::Softener => "softener",
            PowerupKind::Basket => "basket",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PowerupKind::LintRoller => "Lint roller",
            PowerupKind::Softener => "Softener",
            PowerupKind::Basket => "Basket",
        }
    }

    fn index(self) -> usize {
        match self {
            PowerupKind::LintRoller => 0,
            PowerupKind::Softener => 1,
            PowerupKind::Basket => 2,
        }
    }
}

/// Result of trying to use the selected power-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerupOutcome {
    Used { kind: PowerupKind, removed: u32 },
    NothingSelected,
    NoCharges,
    /// Obstacles, matched tiles and off-grid taps are ignored.
    InvalidTarget,
    /// The basket cannot take the objective's color.
    TargetColorProtected,
    /// The engine removed nothing (busy, finished, or no matching cells).
    NoEffect,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PowerupInventory {
    counts: [u32; 3],
    selected: Option<PowerupKind>,
}

impl Default for PowerupInventory {
    fn default() -> Self {
        Self {
            counts: [3, 2, 1],
            selected: None,
        }
    }
}

impl PowerupInventory {
    pub fn new(lint_rollers: u32, softeners: u32, baskets: u32) -> Self {
        Self {
            counts: [lint_rollers, softeners, baskets],
            selected: None,
        }
    }

    pub fn count(&self, kind: PowerupKind) -> u32 {
        self.counts[kind.index()]
    }

    pub fn selected(&self) -> Option<PowerupKind> {
        self.selected
    }

    /// Select `kind`, or deselect it if it is already active.
    pub fn toggle(&mut self, kind: PowerupKind) {
        self.selected = if self.selected == Some(kind) {
            None
        } else {
            Some(kind)
        };
    }

    /// Removal the selected power-up would perform on `tapped`.
    fn removal_for(kind: PowerupKind, at: Position, cell: Cell, target_color: u8) -> Result<Removal, PowerupOutcome> {
        match kind {
            PowerupKind::LintRoller => Ok(Removal::Single(at)),
            PowerupKind::Softener => Ok(Removal::AllObstacles),
            PowerupKind::Basket => match cell.color() {
                Some(c) if c == target_color => Err(PowerupOutcome::TargetColorProtected),
                Some(c) => Ok(Removal::Color(c)),
                None => Err(PowerupOutcome::InvalidTarget),
            },
        }
    }

    /// Apply the selected power-up to the tile at `at`.
    ///
    /// A charge is spent only when the engine removed something. The
    /// selection is cleared after any attempt on a valid tile.
    pub fn use_on<R: RandomSource>(
        &mut self,
        engine: &mut MatchEngine<R>,
        at: Position,
    ) -> Result<PowerupOutcome, EngineError> {
        let Some(kind) = self.selected else {
            return Ok(PowerupOutcome::NothingSelected);
        };
        let cell = match engine.grid().get(at) {
            Some(cell) if cell.is_active() => cell,
            _ => return Ok(PowerupOutcome::InvalidTarget),
        };
        self.selected = None;

        if self.count(kind) == 0 {
            return Ok(PowerupOutcome::NoCharges);
        }
        let removal = match Self::removal_for(kind, at, cell, engine.progress().target_color) {
            Ok(removal) => removal,
            Err(outcome) => {
                debug!(powerup = kind.as_str(), ?outcome, "power-up refused");
                return Ok(outcome);
            }
        };

        let removed = engine.apply(removal)?;
        if removed == 0 {
            return Ok(PowerupOutcome::NoEffect);
        }
        self.counts[kind.index()] -= 1;
        debug!(powerup = kind.as_str(), removed, "power-up used");
        Ok(PowerupOutcome::Used { kind, removed })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sock_match_core::{resolve_level, EngineSettings, Grid, LevelConfig, ScriptedRng};

    fn engine(rows: &[&[i32]]) -> MatchEngine<ScriptedRng> {
        let grid = Grid::from_rows(rows);
        let config = LevelConfig {
            width: grid.width(),
            height: grid.height(),
            num_obstacles: grid.obstacle_count() as u16,
            ..resolve_level(1)
        };
        MatchEngine::with_grid(
            config,
            config.objective(),
            EngineSettings::default(),
            ScriptedRng::default().with_colors(vec![1, 2, 3]),
            grid,
        )
        .unwrap()
    }

    #[test]
    fn test_starting_counts_and_toggle() {
        let mut inv = PowerupInventory::default();
        assert_eq!(inv.count(PowerupKind::LintRoller), 3);
        assert_eq!(inv.count(PowerupKind::Softener), 2);
        assert_eq!(inv.count(PowerupKind::Basket), 1);

        inv.toggle(PowerupKind::Basket);
        assert_eq!(inv.selected(), Some(PowerupKind::Basket));
        inv.toggle(PowerupKind::Basket);
        assert_eq!(inv.selected(), None);
    }

    #[test]
    fn test_lint_roller_removes_one_tile() {
        // Target color is 0 at level 1.
        let mut e = engine(&[&[1, 2], &[3, 1]]);
        let mut inv = PowerupInventory::default();
        inv.toggle(PowerupKind::LintRoller);
        let out = inv.use_on(&mut e, Position::new(0, 0)).unwrap();
        assert_eq!(
            out,
            PowerupOutcome::Used {
                kind: PowerupKind::LintRoller,
                removed: 1
            }
        );
        assert_eq!(inv.count(PowerupKind::LintRoller), 2);
        assert_eq!(inv.selected(), None);
        assert_eq!(e.moves_remaining(), e.objective().move_limit);
    }

    #[test]
    fn test_basket_refuses_target_color() {
        let mut e = engine(&[&[0, 2], &[3, 1]]);
        let mut inv = PowerupInventory::default();
        inv.toggle(PowerupKind::Basket);
        let out = inv.use_on(&mut e, Position::new(0, 1)).unwrap();
        assert_eq!(out, PowerupOutcome::TargetColorProtected);
        assert_eq!(inv.count(PowerupKind::Basket), 1);
        assert_eq!(inv.selected(), None);
    }

    #[test]
    fn test_obstacle_taps_are_ignored() {
        let mut e = engine(&[&[-1, 2], &[3, 1]]);
        let mut inv = PowerupInventory::default();
        inv.toggle(PowerupKind::Softener);
        let out = inv.use_on(&mut e, Position::new(0, 1)).unwrap();
        assert_eq!(out, PowerupOutcome::InvalidTarget);
        // Still selected; tapping a tile clears the obstacle.
        assert_eq!(inv.selected(), Some(PowerupKind::Softener));
        let out = inv.use_on(&mut e, Position::new(1, 0)).unwrap();
        assert_eq!(
            out,
            PowerupOutcome::Used {
                kind: PowerupKind::Softener,
                removed: 1
            }
        );
        assert_eq!(e.grid().obstacle_count(), 0);
    }

    #[test]
    fn test_empty_inventory() {
        let mut e = engine(&[&[1, 2], &[3, 1]]);
        let mut inv = PowerupInventory::new(0, 0, 0);
        assert_eq!(
            inv.use_on(&mut e, Position::new(0, 0)).unwrap(),
            PowerupOutcome::NothingSelected
        );
        inv.toggle(PowerupKind::LintRoller);
        assert_eq!(
            inv.use_on(&mut e, Position::new(0, 0)).unwrap(),
            PowerupOutcome::NoCharges
        );
    }
}
