//! Board generation
//!
//! 1. Obstacle cells are drawn uniformly without replacement.
//! 2. Every other cell gets a color from [`ColorWeights`], biased towards the
//!    objective's target color.
//! 3. If the fill left no adjacent equal-color pair, one is forced by moving a
//!    tile next to another tile of its color.

use tracing::{debug, warn};

use crate::board::Grid;
use crate::error::GenerationError;
use crate::level::LevelConfig;
use crate::rng::{ColorWeights, RandomSource};
use crate::types::{Cell, ColorId, Position};

/// The fill distribution for a level.
pub fn fill_weights(config: &LevelConfig) -> ColorWeights {
    ColorWeights::new(
        config.num_colors,
        config.target_color,
        config.extra_spawn_rate,
    )
}

/// Generate a playable grid for `config`.
///
/// The result has exactly `num_obstacles` obstacles, every other cell holds a
/// color in `[0, num_colors)`, and at least one adjacent equal-color pair
/// exists.
pub fn generate<R: RandomSource>(
    config: &LevelConfig,
    rng: &mut R,
) -> Result<Grid, GenerationError> {
    config.validate()?;

    let mut grid = Grid::filled(config.width, config.height, Cell::sock(0));

    let mut free: Vec<usize> = (0..grid.cell_count()).collect();
    let mut obstacles = Vec::with_capacity(config.num_obstacles as usize);
    for _ in 0..config.num_obstacles {
        let pick = rng.next_range(free.len() as u32) as usize;
        obstacles.push(free.remove(pick));
    }

    let weights = fill_weights(config);
    for &idx in &free {
        let color = rng.pick_color(&weights);
        grid.set(grid.position_of(idx), Cell::sock(color));
    }
    for &idx in &obstacles {
        grid.set(grid.position_of(idx), Cell::obstacle());
    }

    if !grid.has_adjacent_pair() {
        let repair = force_adjacent_pair(&mut grid)?;
        debug!(
            level = config.level,
            a = ?repair.anchor,
            n = ?repair.neighbour,
            "forced adjacent pair after fill"
        );
    }

    Ok(grid)
}

/// The swap performed by [`force_adjacent_pair`].
///
/// `neighbour` took the color of `anchor` and `partner` received the tile
/// that used to sit at `neighbour`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairRepair {
    pub color: ColorId,
    pub anchor: Position,
    pub partner: Position,
    pub neighbour: Position,
}

/// Force one adjacent equal-color pair of active tiles.
///
/// Groups active tiles by color in raster order (colors in order of first
/// appearance). For the first color with two tiles `a, b` where `a` has an
/// active neighbour `n` (checked right, left, up, down), the tiles at `n` and
/// `b` trade places so `a` and `n` match. Tile colors are only moved, so the
/// color census is unchanged.
pub fn force_adjacent_pair(grid: &mut Grid) -> Result<PairRepair, GenerationError> {
    let mut groups: Vec<(ColorId, Vec<Position>)> = Vec::new();
    for p in grid.raster() {
        let Some(color) = grid.active_color(p) else {
            continue;
        };
        match groups.iter_mut().find(|(c, _)| *c == color) {
            Some((_, list)) => list.push(p),
            None => groups.push((color, vec![p])),
        }
    }

    for (color, list) in &groups {
        let [a, b, ..] = list.as_slice() else {
            continue;
        };
        let neighbour = grid
            .neighbours(*a)
            .into_iter()
            .find(|&n| grid.active_color(n).is_some());
        if let Some(n) = neighbour {
            grid.swap(n, *b);
            return Ok(PairRepair {
                color: *color,
                anchor: *a,
                partner: *b,
                neighbour: n,
            });
        }
    }

    let active_tiles = grid.active_count();
    warn!(active_tiles, "no repeated color, cannot force an adjacent pair");
    Err(GenerationError::NoPairPossible { active_tiles })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use crate::level::resolve_level;
    use crate::rng::{ScriptedRng, SimpleRng};

    #[test]
    fn test_generated_grid_is_complete() {
        for level in [1, 7, 14, 22, 30] {
            let config = resolve_level(level);
            let mut rng = SimpleRng::new(level * 31);
            let grid = generate(&config, &mut rng).unwrap();
            assert_eq!(grid.width(), config.width);
            assert_eq!(grid.height(), config.height);
            assert_eq!(grid.obstacle_count(), config.num_obstacles as usize);
            for cell in grid.cells() {
                assert!(!cell.matched);
                if let Some(c) = cell.color() {
                    assert!(c < config.num_colors);
                }
            }
            assert!(grid.has_adjacent_pair());
        }
    }

    #[test]
    fn test_checkerboard_fill_is_repaired() {
        // 2x2, two colors, scripted as a checkerboard (no pair).
        let mut config = resolve_level(1);
        config.width = 2;
        config.height = 2;
        config.num_colors = 2;
        config.target_color = 0;
        let mut rng = ScriptedRng::default().with_colors(vec![0, 1, 1, 0]);
        let grid = generate(&config, &mut rng).unwrap();
        assert!(grid.has_adjacent_pair());
        assert_eq!(grid.color_count(0), 2);
        assert_eq!(grid.color_count(1), 2);
    }

    #[test]
    fn test_repair_moves_neighbour_into_partner_slot() {
        // y=1: 1 0
        // y=0: 0 1
        let mut grid = Grid::from_rows(&[&[1, 0], &[0, 1]]);
        let repair = force_adjacent_pair(&mut grid).unwrap();
        // Color 0 appears first at (0,0); its partner is (1,1).
        assert_eq!(repair.color, 0);
        assert_eq!(repair.anchor, Position::new(0, 0));
        assert_eq!(repair.partner, Position::new(1, 1));
        assert_eq!(repair.neighbour, Position::new(1, 0));
        assert_eq!(grid.to_rows(), vec![vec![1, 1], vec![0, 0]]);
    }

    #[test]
    fn test_repair_skips_obstacle_neighbours() {
        // Color 0 is seen first but its anchor (0,1) is walled in by
        // obstacles, so color 2 gets paired instead.
        let mut grid = Grid::from_rows(&[
            &[-1, 1, 2],
            &[0, -1, 0],
            &[-1, 2, 1],
        ]);
        assert!(!grid.has_adjacent_pair());
        let repair = force_adjacent_pair(&mut grid).unwrap();
        assert_eq!(repair.color, 2);
        assert_eq!(repair.anchor, Position::new(1, 0));
        assert_eq!(repair.neighbour, Position::new(2, 0));
        assert!(grid.has_adjacent_pair());
    }

    #[test]
    fn test_all_distinct_colors_is_an_error() {
        let mut config = resolve_level(1);
        config.width = 2;
        config.height = 1;
        config.num_colors = 4;
        config.target_color = 0;
        let mut rng = ScriptedRng::default().with_colors(vec![0, 1]);
        let err = generate(&config, &mut rng).unwrap_err();
        assert_eq!(err, GenerationError::NoPairPossible { active_tiles: 2 });
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = resolve_level(1);
        config.num_colors = 0;
        let mut rng = SimpleRng::new(1);
        assert_eq!(
            generate(&config, &mut rng),
            Err(GenerationError::InvalidConfig(ConfigError::NoColors))
        );
    }

    #[test]
    fn test_same_seed_same_board() {
        let config = resolve_level(12);
        let a = generate(&config, &mut SimpleRng::new(77)).unwrap();
        let b = generate(&config, &mut SimpleRng::new(77)).unwrap();
        assert_eq!(a, b);
    }
}
