//! Match engine - the swap/match/cascade state machine
//!
//! A session runs through these phases:
//!
//! ```text
//! Idle --try_swap--> Swapping --colors differ--> Idle (reverted, free)
//!                       |
//!                       +--colors equal--> Resolving --> Idle | Won | Lost
//! Idle --apply_removal / clear_obstacles--> Resolving --> Idle | Won | Lost
//! ```
//!
//! Every operation runs to completion before it returns, so the phase doubles
//! as the busy flag that serializes grid mutation. Resolution loops:
//! mark and score the matched cells, check the win and lose conditions,
//! collapse and refill, then rescan the whole grid for adjacent equal-color
//! pairs and treat every tile in one as the next match of the cascade.
//!
//! Events are buffered and drained with [`MatchEngine::take_events`].

use tracing::{debug, error, info, warn};

use crate::board::Grid;
use crate::error::{ConfigError, EngineError};
use crate::generator::{fill_weights, force_adjacent_pair, generate};
use crate::level::{LevelConfig, LevelObjective, ObjectiveProgress};
use crate::rng::{ColorWeights, RandomSource, SimpleRng};
use crate::scoring::{match_score, star_rating};
use crate::snapshot::GameSnapshot;
use crate::types::{
    Cell, CoreEvent, Direction, Phase, Position, RejectReason, Removal, TileMove,
    BASE_PAIR_SCORE, COMBO_BONUS_PCT,
};

/// Tunables that are not part of a level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineSettings {
    pub base_pair_score: u32,
    pub combo_bonus_pct: f64,
    /// Most match steps a single action may resolve. `None` scales with the
    /// grid (four steps per cell, at least 64).
    pub max_cascade_steps: Option<u32>,
    /// Random permutations a forced shuffle tries before repairing the board.
    pub shuffle_attempts: u32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            base_pair_score: BASE_PAIR_SCORE,
            combo_bonus_pct: COMBO_BONUS_PCT,
            max_cascade_steps: None,
            shuffle_attempts: 8,
        }
    }
}

/// The player action currently (or most recently) being resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerAction {
    Swap { a: Position, b: Position },
    /// Power-up removal of `cells` tiles.
    Removal { cells: u32 },
    ClearObstacles { cells: u32 },
}

/// One play session on one level.
#[derive(Debug, Clone)]
pub struct MatchEngine<R: RandomSource = SimpleRng> {
    config: LevelConfig,
    objective: LevelObjective,
    settings: EngineSettings,
    weights: ColorWeights,
    rng: R,
    grid: Grid,
    progress: ObjectiveProgress,
    moves_remaining: u32,
    score: u32,
    combo: u32,
    phase: Phase,
    stars: Option<u8>,
    last_action: Option<PlayerAction>,
    /// Accepted actions since the session started.
    actions_taken: u64,
    clock_ms: u64,
    last_action_ms: u64,
    events: Vec<CoreEvent>,
}

impl MatchEngine<SimpleRng> {
    /// Start a seeded session with default settings.
    pub fn with_seed(
        config: LevelConfig,
        objective: LevelObjective,
        seed: u32,
    ) -> Result<Self, EngineError> {
        Self::new(config, objective, SimpleRng::new(seed))
    }
}

impl<R: RandomSource> MatchEngine<R> {
    /// Start a session: generate a board for `config` and arm `objective`.
    pub fn new(config: LevelConfig, objective: LevelObjective, rng: R) -> Result<Self, EngineError> {
        Self::with_settings(config, objective, EngineSettings::default(), rng)
    }

    pub fn with_settings(
        config: LevelConfig,
        objective: LevelObjective,
        settings: EngineSettings,
        mut rng: R,
    ) -> Result<Self, EngineError> {
        let config = config.with_objective(&objective);
        let grid = generate(&config, &mut rng)?;
        Ok(Self::start(config, objective, settings, rng, grid))
    }

    /// Start a session on a prepared grid (puzzles, replays, tests).
    ///
    /// The grid must match the config's dimensions and palette. No adjacent
    /// pair is required.
    pub fn with_grid(
        config: LevelConfig,
        objective: LevelObjective,
        settings: EngineSettings,
        rng: R,
        grid: Grid,
    ) -> Result<Self, EngineError> {
        let config = config.with_objective(&objective);
        config.validate()?;
        if grid.width() != config.width || grid.height() != config.height {
            return Err(ConfigError::GridMismatch {
                width: config.width,
                height: config.height,
                actual_width: grid.width(),
                actual_height: grid.height(),
            }
            .into());
        }
        if let Some(position) = grid
            .raster()
            .find(|&p| grid.get(p).and_then(|c| c.color()).is_some_and(|c| c >= config.num_colors))
        {
            let color = grid.get(position).and_then(|c| c.color()).unwrap_or_default();
            return Err(ConfigError::TileOutOfPalette {
                position,
                color,
                num_colors: config.num_colors,
            }
            .into());
        }
        Ok(Self::start(config, objective, settings, rng, grid))
    }

    fn start(
        config: LevelConfig,
        objective: LevelObjective,
        settings: EngineSettings,
        rng: R,
        grid: Grid,
    ) -> Self {
        info!(
            level = config.level,
            width = config.width,
            height = config.height,
            colors = config.num_colors,
            obstacles = config.num_obstacles,
            target = objective.target_color,
            "session started"
        );
        Self {
            weights: fill_weights(&config),
            progress: ObjectiveProgress::new(&objective),
            moves_remaining: objective.move_limit,
            config,
            objective,
            settings,
            rng,
            grid,
            score: 0,
            combo: 0,
            phase: Phase::Idle,
            stars: None,
            last_action: None,
            actions_taken: 0,
            clock_ms: 0,
            last_action_ms: 0,
            events: Vec::new(),
        }
    }

    /// Replace the session with a fresh board for `config` and `objective`.
    ///
    /// On error the current session is left untouched.
    pub fn initialize(
        &mut self,
        config: LevelConfig,
        objective: LevelObjective,
    ) -> Result<(), EngineError> {
        let config = config.with_objective(&objective);
        let grid = generate(&config, &mut self.rng)?;
        self.weights = fill_weights(&config);
        self.progress = ObjectiveProgress::new(&objective);
        self.moves_remaining = objective.move_limit;
        self.config = config;
        self.objective = objective;
        self.grid = grid;
        self.score = 0;
        self.combo = 0;
        self.phase = Phase::Idle;
        self.stars = None;
        self.last_action = None;
        self.actions_taken = 0;
        self.clock_ms = 0;
        self.last_action_ms = 0;
        self.events.clear();
        info!(level = self.config.level, "session reinitialized");
        Ok(())
    }

    /// Retry the same level on a new board.
    pub fn restart(&mut self) -> Result<(), EngineError> {
        self.initialize(self.config, self.objective)
    }

    pub fn config(&self) -> &LevelConfig {
        &self.config
    }

    pub fn objective(&self) -> &LevelObjective {
        &self.objective
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn progress(&self) -> &ObjectiveProgress {
        &self.progress
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn moves_remaining(&self) -> u32 {
        self.moves_remaining
    }

    /// Matches scored in the current action.
    pub fn combo(&self) -> u32 {
        self.combo
    }

    /// Star rating once the level is won.
    pub fn stars(&self) -> Option<u8> {
        self.stars
    }

    pub fn last_action(&self) -> Option<PlayerAction> {
        self.last_action
    }

    pub fn actions_taken(&self) -> u64 {
        self.actions_taken
    }

    /// Active tiles still on the board, in pairs.
    pub fn pairs_remaining(&self) -> u32 {
        (self.grid.active_count() / 2) as u32
    }

    pub fn rng(&self) -> &R {
        &self.rng
    }

    // Session clock

    pub fn advance_clock(&mut self, elapsed_ms: u32) {
        self.clock_ms = self.clock_ms.saturating_add(u64::from(elapsed_ms));
    }

    pub fn clock_ms(&self) -> u64 {
        self.clock_ms
    }

    /// Clock time of the last accepted action (0 before the first).
    pub fn last_action_ms(&self) -> u64 {
        self.last_action_ms
    }

    pub fn idle_ms(&self) -> u64 {
        self.clock_ms.saturating_sub(self.last_action_ms)
    }

    // Events

    /// Drain buffered events in emission order.
    pub fn take_events(&mut self) -> Vec<CoreEvent> {
        std::mem::take(&mut self.events)
    }

    fn emit(&mut self, event: CoreEvent) {
        self.events.push(event);
    }

    // Snapshots

    pub fn snapshot(&self) -> GameSnapshot {
        let mut out = GameSnapshot::default();
        self.snapshot_into(&mut out);
        out
    }

    /// Fill `out` in place, reusing its cell buffer.
    pub fn snapshot_into(&self, out: &mut GameSnapshot) {
        out.level = self.config.level;
        out.width = self.grid.width();
        out.height = self.grid.height();
        out.cells.clear();
        out.cells.extend_from_slice(self.grid.cells());
        out.score = self.score;
        out.moves_remaining = self.moves_remaining;
        out.combo = self.combo;
        out.pairs_remaining = self.pairs_remaining();
        out.objective = self.progress;
        out.phase = self.phase;
        out.stars = self.stars;
    }

    // Player input

    fn check_ready(&self) -> Result<(), RejectReason> {
        if self.phase.is_terminal() {
            Err(RejectReason::SessionOver)
        } else if self.phase.is_busy() {
            Err(RejectReason::Busy)
        } else {
            Ok(())
        }
    }

    fn check_swappable(&self, pos: Position) -> Result<(), RejectReason> {
        match self.grid.get(pos) {
            None => Err(RejectReason::OutOfBounds),
            Some(cell) if cell.is_obstacle() => Err(RejectReason::Obstacle),
            Some(cell) if cell.matched => Err(RejectReason::AlreadyMatched),
            Some(_) => Ok(()),
        }
    }

    fn begin_action(&mut self, action: PlayerAction, phase: Phase) {
        self.phase = phase;
        self.combo = 0;
        self.last_action = Some(action);
        self.last_action_ms = self.clock_ms;
        self.actions_taken += 1;
    }

    /// Swap the tile at `at` with its neighbour in `direction`.
    ///
    /// Returns `Ok(false)` when the request is rejected (wrong phase, either
    /// cell off-grid, an obstacle or already matched); nothing changes then.
    /// An accepted swap of two different colors is reverted at no cost. A
    /// swap of two equal colors spends a move and resolves the match.
    pub fn try_swap(&mut self, at: Position, direction: Direction) -> Result<bool, EngineError> {
        let check = self
            .check_ready()
            .and_then(|()| self.check_swappable(at))
            .and_then(|()| at.step(direction).ok_or(RejectReason::OutOfBounds))
            .and_then(|target| self.check_swappable(target).map(|()| target));
        let target = match check {
            Ok(target) => target,
            Err(reason) => {
                debug!(?at, dir = direction.as_str(), reason = reason.as_str(), "swap rejected");
                self.emit(CoreEvent::SwapRejected {
                    at,
                    direction,
                    reason,
                });
                return Ok(false);
            }
        };

        self.begin_action(PlayerAction::Swap { a: at, b: target }, Phase::Swapping);
        self.grid.swap(at, target);
        self.emit(CoreEvent::Swapped { a: at, b: target });

        let equal = self.grid.active_color(at) == self.grid.active_color(target);
        if !equal {
            self.grid.swap(at, target);
            self.phase = Phase::Idle;
            debug!(?at, dir = direction.as_str(), "swap reverted");
            self.emit(CoreEvent::SwapReverted { a: at, b: target });
            return Ok(true);
        }

        self.phase = Phase::Resolving;
        self.moves_remaining = self.moves_remaining.saturating_sub(1);
        self.resolve(vec![at, target])?;
        Ok(true)
    }

    /// Remove every active tile satisfying `predicate` as one match.
    ///
    /// The removal scores, advances the objective and cascades exactly like a
    /// player match, but does not spend a move. Returns the number of tiles
    /// removed (0 when the engine is not idle or nothing matched).
    pub fn apply_removal<F>(&mut self, predicate: F) -> Result<u32, EngineError>
    where
        F: Fn(Position, &Cell) -> bool,
    {
        if let Err(reason) = self.check_ready() {
            debug!(reason = reason.as_str(), "removal refused");
            return Ok(0);
        }
        let cells: Vec<Position> = self
            .grid
            .raster()
            .filter(|&p| {
                self.grid
                    .get(p)
                    .is_some_and(|cell| cell.is_active() && predicate(p, &cell))
            })
            .collect();
        if cells.is_empty() {
            return Ok(0);
        }
        let count = cells.len() as u32;
        self.begin_action(PlayerAction::Removal { cells: count }, Phase::Resolving);
        debug!(count, "removal");
        self.resolve(cells)?;
        Ok(count)
    }

    /// Clear every obstacle. The freed cells fill like any other match.
    pub fn clear_obstacles(&mut self) -> Result<u32, EngineError> {
        if let Err(reason) = self.check_ready() {
            debug!(reason = reason.as_str(), "obstacle clear refused");
            return Ok(0);
        }
        let cells: Vec<Position> = self
            .grid
            .raster()
            .filter(|&p| self.grid.get(p).is_some_and(|c| c.is_obstacle() && !c.matched))
            .collect();
        if cells.is_empty() {
            return Ok(0);
        }
        let count = cells.len() as u32;
        self.begin_action(PlayerAction::ClearObstacles { cells: count }, Phase::Resolving);
        debug!(count, "clearing obstacles");
        self.resolve(cells)?;
        Ok(count)
    }

    /// Apply a power-up removal.
    pub fn apply(&mut self, removal: Removal) -> Result<u32, EngineError> {
        match removal {
            Removal::Color(color) => self.apply_removal(|_, cell| cell.color() == Some(color)),
            Removal::Single(at) => self.apply_removal(|p, _| p == at),
            Removal::AllObstacles => self.clear_obstacles(),
        }
    }

    fn cascade_limit(&self) -> u32 {
        self.settings
            .max_cascade_steps
            .unwrap_or_else(|| (self.grid.cell_count() as u32).saturating_mul(4).max(64))
    }

    fn resolve(&mut self, mut cells: Vec<Position>) -> Result<(), EngineError> {
        let limit = self.cascade_limit();
        let mut steps = 0u32;
        loop {
            steps += 1;
            if steps > limit {
                self.phase = Phase::Idle;
                error!(steps, limit, "cascade did not settle");
                return Err(EngineError::CascadeOverflow { steps, limit });
            }

            let target = self.progress.target_color;
            let target_hits = cells
                .iter()
                .filter(|&&p| self.grid.get(p).and_then(|c| c.color()) == Some(target))
                .count() as u32;
            self.grid.mark_matched(&cells);

            let gained = match_score(
                self.settings.base_pair_score,
                self.combo,
                self.settings.combo_bonus_pct,
            );
            self.score = self.score.saturating_add(gained);
            self.combo += 1;
            self.progress.matched_count += target_hits;
            debug!(
                step = steps,
                cells = cells.len(),
                gained,
                combo = self.combo,
                matched = self.progress.matched_count,
                "match"
            );
            self.emit(CoreEvent::Matched {
                cells,
                score_gained: gained,
                combo: self.combo,
            });

            if self.progress.is_complete() {
                self.finish_won();
                return Ok(());
            }
            if self.moves_remaining == 0 {
                self.finish_lost();
                return Ok(());
            }

            let weights = &self.weights;
            let rng = &mut self.rng;
            let report = self.grid.collapse_and_refill(|| rng.pick_color(weights));
            self.emit(CoreEvent::CascadeStep {
                collapsed_columns: report.columns,
                new_cells: report.spawned,
            });

            cells = self.grid.paired_cells();
            if cells.is_empty() {
                self.phase = Phase::Idle;
                self.emit(CoreEvent::CascadeComplete);
                return Ok(());
            }
        }
    }

    fn finish_won(&mut self) {
        let stars = star_rating(self.score, &self.progress.stars);
        self.phase = Phase::Won;
        self.stars = Some(stars);
        info!(
            level = self.config.level,
            score = self.score,
            stars,
            moves_remaining = self.moves_remaining,
            "level won"
        );
        self.emit(CoreEvent::Won {
            score: self.score,
            stars,
            moves_remaining: self.moves_remaining,
        });
    }

    fn finish_lost(&mut self) {
        self.phase = Phase::Lost;
        info!(
            level = self.config.level,
            score = self.score,
            matched = self.progress.matched_count,
            "level lost"
        );
        self.emit(CoreEvent::Lost {
            score: self.score,
            matched_count: self.progress.matched_count,
        });
    }

    // Stall helpers

    /// First adjacent equal-color pair of active tiles in raster order.
    pub fn find_hint(&self) -> Option<(Position, Position)> {
        self.grid.find_first_pair()
    }

    /// Find a hint pair and announce it. `None` when not idle or no pair.
    pub fn offer_hint(&mut self) -> Option<(Position, Position)> {
        if self.phase != Phase::Idle {
            return None;
        }
        let (a, b) = self.find_hint()?;
        debug!(?a, ?b, "hint");
        self.emit(CoreEvent::Hint { a, b });
        Some((a, b))
    }

    /// Randomly permute all active tiles.
    ///
    /// Obstacles and matched cells stay put. The permutation is retried up to
    /// `shuffle_attempts` times until an adjacent pair exists, then one is
    /// forced if needed. Returns false when the engine is not idle or there
    /// is nothing to shuffle.
    pub fn shuffle(&mut self) -> bool {
        if self.phase != Phase::Idle {
            return false;
        }
        let positions = self.grid.active_positions();
        if positions.len() < 2 {
            return false;
        }

        // origin[i]: where the tile now at positions[i] started.
        let mut origin = positions.clone();
        let mut perm: Vec<usize> = Vec::with_capacity(positions.len());
        for _ in 0..self.settings.shuffle_attempts.max(1) {
            perm.clear();
            perm.extend(0..positions.len());
            self.rng.shuffle(&mut perm);

            let cells: Vec<Cell> = positions.iter().filter_map(|&p| self.grid.get(p)).collect();
            let prev_origin = origin.clone();
            for (i, &src) in perm.iter().enumerate() {
                self.grid.set(positions[i], cells[src]);
                origin[i] = prev_origin[src];
            }
            if self.grid.has_adjacent_pair() {
                break;
            }
        }

        if !self.grid.has_adjacent_pair() {
            match force_adjacent_pair(&mut self.grid) {
                Ok(repair) => {
                    let n = positions.iter().position(|&p| p == repair.neighbour);
                    let b = positions.iter().position(|&p| p == repair.partner);
                    if let (Some(n), Some(b)) = (n, b) {
                        origin.swap(n, b);
                    }
                }
                Err(e) => warn!(error = %e, "shuffle left no adjacent pair"),
            }
        }

        let moves: Vec<TileMove> = positions
            .iter()
            .zip(&origin)
            .filter(|(to, from)| to != from)
            .map(|(&to, &from)| TileMove { from, to })
            .collect();
        debug!(tiles = positions.len(), moved = moves.len(), "shuffled");
        self.emit(CoreEvent::Shuffled { moves });
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::{resolve_level, StarThresholds};
    use crate::rng::ScriptedRng;

    fn level_for(grid: &Grid, num_colors: u8, target_matches: u32, moves: u32) -> (LevelConfig, LevelObjective) {
        let config = LevelConfig {
            width: grid.width(),
            height: grid.height(),
            num_colors,
            num_obstacles: grid.obstacle_count() as u16,
            ..resolve_level(1)
        };
        let objective = LevelObjective {
            level: 1,
            target_color: 0,
            target_matches,
            move_limit: moves,
            stars: StarThresholds {
                one: 250,
                two: 600,
                three: 750,
            },
        };
        (config, objective)
    }

    fn engine(rows: &[&[i32]], colors: Vec<u8>, target_matches: u32, moves: u32) -> MatchEngine<ScriptedRng> {
        let grid = Grid::from_rows(rows);
        let (config, objective) = level_for(&grid, 9, target_matches, moves);
        MatchEngine::with_grid(
            config,
            objective,
            EngineSettings::default(),
            ScriptedRng::default().with_colors(colors),
            grid,
        )
        .unwrap()
    }

    #[test]
    fn test_new_session_state() {
        let config = resolve_level(3);
        let e = MatchEngine::with_seed(config, config.objective(), 42).unwrap();
        assert_eq!(e.phase(), Phase::Idle);
        assert_eq!(e.score(), 0);
        assert_eq!(e.combo(), 0);
        assert_eq!(e.moves_remaining(), config.move_limit);
        assert_eq!(e.progress().matched_count, 0);
        assert!(e.find_hint().is_some());
        assert_eq!(e.pairs_remaining() as usize, e.grid().active_count() / 2);
    }

    #[test]
    fn test_reverted_swap_costs_nothing() {
        let mut e = engine(&[&[3, 4], &[1, 2]], vec![], 5, 10);
        let before = e.grid().clone();
        assert!(e.try_swap(Position::new(0, 0), Direction::Right).unwrap());
        assert_eq!(e.grid(), &before);
        assert_eq!(e.moves_remaining(), 10);
        assert_eq!(e.score(), 0);
        assert_eq!(e.phase(), Phase::Idle);
        assert_eq!(
            e.take_events(),
            vec![
                CoreEvent::Swapped {
                    a: Position::new(0, 0),
                    b: Position::new(1, 0)
                },
                CoreEvent::SwapReverted {
                    a: Position::new(0, 0),
                    b: Position::new(1, 0)
                },
            ]
        );
    }

    #[test]
    fn test_rejections_leave_state_unchanged() {
        let mut e = engine(&[&[-1, 4], &[1, 1]], vec![], 5, 10);
        e.grid.mark_matched(&[Position::new(1, 1)]);
        let before = e.snapshot();

        let cases = [
            (Position::new(1, 0), Direction::Right, RejectReason::OutOfBounds),
            (Position::new(5, 5), Direction::Up, RejectReason::OutOfBounds),
            (Position::new(i16::MAX, 0), Direction::Right, RejectReason::OutOfBounds),
            (Position::new(0, i16::MIN), Direction::Down, RejectReason::OutOfBounds),
            (Position::new(0, 1), Direction::Right, RejectReason::Obstacle),
            (Position::new(0, 0), Direction::Up, RejectReason::Obstacle),
            (Position::new(1, 0), Direction::Up, RejectReason::AlreadyMatched),
        ];
        for (at, dir, reason) in cases {
            assert!(!e.try_swap(at, dir).unwrap());
            assert_eq!(
                e.take_events(),
                vec![CoreEvent::SwapRejected {
                    at,
                    direction: dir,
                    reason
                }]
            );
        }
        assert_eq!(e.snapshot(), before);
        assert_eq!(e.actions_taken(), 0);
    }

    #[test]
    fn test_cascade_scores_with_combo() {
        // y2: 2 3
        // y1: 4 5
        // y0: 1 1
        // Refills: 7 7 (pair), 8 8 (pair), 6 0 (settles).
        let mut e = engine(
            &[&[2, 3], &[4, 5], &[1, 1]],
            vec![7, 7, 8, 8, 6, 0],
            99,
            10,
        );
        assert!(e.try_swap(Position::new(0, 0), Direction::Right).unwrap());
        assert_eq!(e.score(), 375);
        assert_eq!(e.combo(), 3);
        assert_eq!(e.moves_remaining(), 9);
        assert_eq!(e.phase(), Phase::Idle);
        assert_eq!(e.grid().to_rows(), vec![vec![6, 0], vec![2, 3], vec![4, 5]]);

        let gains: Vec<_> = e
            .take_events()
            .into_iter()
            .filter_map(|ev| match ev {
                CoreEvent::Matched {
                    score_gained,
                    combo,
                    ..
                } => Some((score_gained, combo)),
                _ => None,
            })
            .collect();
        assert_eq!(gains, vec![(100, 1), (125, 2), (150, 3)]);
    }

    #[test]
    fn test_combo_resets_on_next_action() {
        let mut e = engine(&[&[2, 3], &[4, 5], &[1, 1]], vec![7, 7, 6, 0], 99, 10);
        e.try_swap(Position::new(0, 0), Direction::Right).unwrap();
        assert_eq!(e.combo(), 2);
        // Reverted swap still counts as an action.
        e.try_swap(Position::new(0, 0), Direction::Up).unwrap();
        assert_eq!(e.combo(), 0);
    }

    #[test]
    fn test_target_tiles_count_individually_and_win() {
        // Target color 0; one pair of 0s needs 2 matches to win.
        let mut e = engine(&[&[2, 3], &[0, 0]], vec![5, 6], 2, 10);
        e.try_swap(Position::new(1, 0), Direction::Left).unwrap();
        assert_eq!(e.progress().matched_count, 2);
        assert_eq!(e.phase(), Phase::Won);
        assert_eq!(e.stars(), Some(1));
        assert_eq!(e.moves_remaining(), 9);
        let events = e.take_events();
        assert_eq!(
            events.last(),
            Some(&CoreEvent::Won {
                score: 100,
                stars: 1,
                moves_remaining: 9
            })
        );
        // No collapse after a win.
        assert!(!events
            .iter()
            .any(|ev| matches!(ev, CoreEvent::CascadeStep { .. })));
    }

    #[test]
    fn test_last_move_without_win_loses() {
        let mut e = engine(&[&[2, 3], &[1, 1]], vec![5, 6], 5, 1);
        e.try_swap(Position::new(0, 0), Direction::Right).unwrap();
        assert_eq!(e.phase(), Phase::Lost);
        assert_eq!(e.moves_remaining(), 0);
        assert_eq!(
            e.take_events().last(),
            Some(&CoreEvent::Lost {
                score: 100,
                matched_count: 0
            })
        );
        // Terminal: further swaps are refused.
        assert!(!e.try_swap(Position::new(0, 0), Direction::Up).unwrap());
        assert_eq!(
            e.take_events(),
            vec![CoreEvent::SwapRejected {
                at: Position::new(0, 0),
                direction: Direction::Up,
                reason: RejectReason::SessionOver
            }]
        );
    }

    #[test]
    fn test_removal_does_not_spend_moves() {
        let mut e = engine(&[&[1, 2, 1], &[3, 4, 3]], vec![5, 6, 7, 8], 99, 10);
        let removed = e.apply(Removal::Color(3)).unwrap();
        assert_eq!(removed, 2);
        assert_eq!(e.moves_remaining(), 10);
        assert_eq!(e.score(), 100);
        assert!(matches!(
            e.last_action(),
            Some(PlayerAction::Removal { cells: 2 })
        ));
        assert_eq!(e.apply(Removal::Color(8)).unwrap(), 0);
    }

    #[test]
    fn test_clear_obstacles_refills_slots() {
        let mut e = engine(&[&[1, 2], &[-1, 3]], vec![4], 99, 10);
        assert_eq!(e.grid().obstacle_count(), 1);
        assert_eq!(e.apply(Removal::AllObstacles).unwrap(), 1);
        assert_eq!(e.grid().obstacle_count(), 0);
        // The 1 falls into the freed slot, the refill lands on top.
        assert_eq!(e.grid().to_rows(), vec![vec![4, 2], vec![1, 3]]);
        assert_eq!(e.progress().matched_count, 0);
    }

    #[test]
    fn test_cascade_overflow_is_reported() {
        // Every refill is color 1, so the column keeps pairing forever.
        let grid = Grid::from_rows(&[&[1], &[1]]);
        let (config, objective) = level_for(&grid, 2, 99, 99);
        let settings = EngineSettings {
            max_cascade_steps: Some(5),
            ..EngineSettings::default()
        };
        let mut e = MatchEngine::with_grid(
            config,
            objective,
            settings,
            ScriptedRng::default().with_colors(vec![1]),
            grid,
        )
        .unwrap();
        let err = e.try_swap(Position::new(0, 0), Direction::Up).unwrap_err();
        assert_eq!(err, EngineError::CascadeOverflow { steps: 6, limit: 5 });
        assert_eq!(e.phase(), Phase::Idle);
    }

    #[test]
    fn test_shuffle_forces_a_pair_when_permutations_fail() {
        // y1: 1 0 2
        // y0: 0 2 1
        // An all-zero script always yields the same pair-free permutation.
        let grid = Grid::from_rows(&[&[1, 0, 2], &[0, 2, 1]]);
        let (config, objective) = level_for(&grid, 3, 5, 10);
        let settings = EngineSettings {
            shuffle_attempts: 1,
            ..EngineSettings::default()
        };
        let mut e =
            MatchEngine::with_grid(config, objective, settings, ScriptedRng::new(vec![0]), grid)
                .unwrap();
        let before = e.grid().clone();
        assert!(!before.has_adjacent_pair());

        assert!(e.shuffle());
        let after = e.grid().clone();
        assert_eq!(after.to_rows(), vec![vec![2, 0, 0], vec![1, 1, 2]]);
        assert_eq!(
            e.find_hint(),
            Some((Position::new(0, 0), Position::new(1, 0)))
        );
        for color in 0..3 {
            assert_eq!(before.color_count(color), after.color_count(color));
        }

        let events = e.take_events();
        let [CoreEvent::Shuffled { moves }] = events.as_slice() else {
            panic!("expected a single shuffle event, got {events:?}");
        };
        assert!(!moves.is_empty());
        for m in moves {
            assert_eq!(
                before.get(m.from).and_then(|c| c.color()),
                after.get(m.to).and_then(|c| c.color())
            );
        }
    }

    #[test]
    fn test_shuffle_keeps_obstacles_and_colors() {
        let config = resolve_level(20);
        let mut e = MatchEngine::with_seed(config, config.objective(), 9).unwrap();
        let before = e.grid().clone();
        e.take_events();
        assert!(e.shuffle());
        let after = e.grid().clone();
        for p in before.raster() {
            assert_eq!(
                before.get(p).map(|c| c.is_obstacle()),
                after.get(p).map(|c| c.is_obstacle())
            );
        }
        for color in 0..config.num_colors {
            assert_eq!(before.color_count(color), after.color_count(color));
        }
        assert!(after.has_adjacent_pair());

        let events = e.take_events();
        let [CoreEvent::Shuffled { moves }] = events.as_slice() else {
            panic!("expected a single shuffle event, got {events:?}");
        };
        for m in moves {
            assert_eq!(
                before.get(m.from).and_then(|c| c.color()),
                after.get(m.to).and_then(|c| c.color())
            );
        }
    }

    #[test]
    fn test_shuffle_refused_when_session_over() {
        let mut e = engine(&[&[2, 3], &[1, 1]], vec![5, 6], 5, 1);
        e.try_swap(Position::new(0, 0), Direction::Right).unwrap();
        assert!(!e.shuffle());
        assert!(e.offer_hint().is_none());
    }

    #[test]
    fn test_clock_and_idle_time() {
        let mut e = engine(&[&[3, 4], &[1, 2]], vec![], 5, 10);
        e.advance_clock(1000);
        assert_eq!(e.idle_ms(), 1000);
        e.try_swap(Position::new(0, 0), Direction::Right).unwrap();
        assert_eq!(e.last_action_ms(), 1000);
        e.advance_clock(250);
        assert_eq!(e.idle_ms(), 250);
    }

    #[test]
    fn test_grid_must_match_config() {
        let grid = Grid::from_rows(&[&[1, 2], &[3, 4]]);
        let (mut config, objective) = level_for(&grid, 9, 5, 10);
        config.width = 3;
        let err = MatchEngine::with_grid(
            config,
            objective,
            EngineSettings::default(),
            ScriptedRng::default(),
            grid.clone(),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::Config(ConfigError::GridMismatch { .. })));

        let (config, objective) = level_for(&grid, 3, 5, 10);
        let err = MatchEngine::with_grid(
            config,
            objective,
            EngineSettings::default(),
            ScriptedRng::default(),
            grid,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Config(ConfigError::TileOutOfPalette { color: 3, .. })
        ));
    }

    #[test]
    fn test_restart_resets_session() {
        let config = resolve_level(2);
        let mut e = MatchEngine::with_seed(config, config.objective(), 5).unwrap();
        let hint = e.find_hint().unwrap();
        e.try_swap(hint.0, Direction::between(hint.0, hint.1).unwrap())
            .unwrap();
        assert!(e.score() > 0);
        e.restart().unwrap();
        assert_eq!(e.score(), 0);
        assert_eq!(e.moves_remaining(), config.move_limit);
        assert_eq!(e.phase(), Phase::Idle);
        assert!(e.take_events().is_empty());
    }
}
