//! Board module - the tile grid
//!
//! A `width x height` grid stored as a flat array (`y * width + x`).
//! Coordinates: `x` grows to the right, `y` grows upwards, row `y = 0` is the
//! bottom row. Gravity pulls tiles towards `y = 0`; refills enter at the top.
//!
//! Pair scans walk the grid in raster order: columns left to right, and within
//! a column bottom to top, testing the right neighbour before the up neighbour.

use arrayvec::ArrayVec;

use crate::types::{Cell, ColorId, Position, SpawnedTile};

/// The tile grid.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Grid {
    width: u8,
    height: u8,
    /// Flat array of cells, row-major order (y * width + x)
    cells: Vec<Cell>,
}

/// What a collapse-and-refill pass changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollapseReport {
    /// Columns that lost at least one tile, ascending.
    pub columns: Vec<i16>,
    /// Refill tiles in spawn order (column by column, bottom gap first).
    pub spawned: Vec<SpawnedTile>,
}

impl Grid {
    /// Create a grid with every cell set to `fill`.
    pub fn filled(width: u8, height: u8, fill: Cell) -> Self {
        Self {
            width,
            height,
            cells: vec![fill; width as usize * height as usize],
        }
    }

    /// Build a grid from integer color codes, top row first (as drawn).
    ///
    /// `-1` is an obstacle, any other value is a tile color. Rows must all
    /// have the same length. Intended for fixtures and hand-made puzzles.
    pub fn from_rows(rows: &[&[i32]]) -> Self {
        let height = rows.len() as u8;
        let width = rows.first().map_or(0, |r| r.len()) as u8;
        let mut grid = Self::filled(width, height, Cell::obstacle());
        for (row_idx, row) in rows.iter().enumerate() {
            let y = (height as usize - 1 - row_idx) as i16;
            for (x, &code) in row.iter().enumerate().take(width as usize) {
                let cell = if code < 0 {
                    Cell::obstacle()
                } else {
                    Cell::sock(code as ColorId)
                };
                grid.set(Position::new(x as i16, y), cell);
            }
        }
        grid
    }

    /// Integer color codes, top row first (inverse of [`Grid::from_rows`]).
    pub fn to_rows(&self) -> Vec<Vec<i32>> {
        (0..self.height as i16)
            .rev()
            .map(|y| {
                (0..self.width as i16)
                    .map(|x| self.cells[self.flat(x, y)].color_id())
                    .collect()
            })
            .collect()
    }

    #[inline(always)]
    fn flat(&self, x: i16, y: i16) -> usize {
        (y as usize) * (self.width as usize) + (x as usize)
    }

    /// Calculate flat index for a position, `None` when off-grid.
    #[inline(always)]
    pub fn index(&self, pos: Position) -> Option<usize> {
        if self.in_bounds(pos) {
            Some(self.flat(pos.x, pos.y))
        } else {
            None
        }
    }

    /// Position of a flat index.
    pub fn position_of(&self, idx: usize) -> Position {
        let w = self.width.max(1) as usize;
        Position::new((idx % w) as i16, (idx / w) as i16)
    }

    pub fn width(&self) -> u8 {
        self.width
    }

    pub fn height(&self) -> u8 {
        self.height
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width as i16 && pos.y < self.height as i16
    }

    /// Get cell at position, `None` if out of bounds
    pub fn get(&self, pos: Position) -> Option<Cell> {
        self.index(pos).map(|idx| self.cells[idx])
    }

    pub fn get_mut(&mut self, pos: Position) -> Option<&mut Cell> {
        self.index(pos).map(move |idx| &mut self.cells[idx])
    }

    /// Set cell at position. Returns false if out of bounds.
    pub fn set(&mut self, pos: Position, cell: Cell) -> bool {
        match self.index(pos) {
            Some(idx) => {
                self.cells[idx] = cell;
                true
            }
            None => false,
        }
    }

    /// Exchange the contents of two cells. Returns false if either is off-grid.
    pub fn swap(&mut self, a: Position, b: Position) -> bool {
        match (self.index(a), self.index(b)) {
            (Some(ia), Some(ib)) => {
                self.cells.swap(ia, ib);
                true
            }
            _ => false,
        }
    }

    /// Color of an active tile, `None` for obstacles, matched cells and off-grid.
    pub fn active_color(&self, pos: Position) -> Option<ColorId> {
        self.get(pos).filter(Cell::is_active).and_then(|c| c.color())
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// All positions in raster order (x outer, y inner).
    pub fn raster(&self) -> impl Iterator<Item = Position> + '_ {
        let h = self.height as i16;
        (0..self.width as i16).flat_map(move |x| (0..h).map(move |y| Position::new(x, y)))
    }

    /// Active-tile positions in raster order.
    pub fn active_positions(&self) -> Vec<Position> {
        self.raster()
            .filter(|&p| self.get(p).is_some_and(|c| c.is_active()))
            .collect()
    }

    pub fn active_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_active()).count()
    }

    pub fn obstacle_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_obstacle()).count()
    }

    /// Number of tiles of one color (active only).
    pub fn color_count(&self, color: ColorId) -> usize {
        self.cells
            .iter()
            .filter(|c| c.is_active() && c.color() == Some(color))
            .count()
    }

    /// In-bounds four-neighbours in the order right, left, up, down.
    pub fn neighbours(&self, pos: Position) -> ArrayVec<Position, 4> {
        let mut out = ArrayVec::new();
        for (dx, dy) in [(1, 0), (-1, 0), (0, 1), (0, -1)] {
            let n = Position::new(pos.x + dx, pos.y + dy);
            if self.in_bounds(n) {
                out.push(n);
            }
        }
        out
    }

    fn pairs_with(&self, a: Position, b: Position) -> bool {
        match (self.active_color(a), self.active_color(b)) {
            (Some(ca), Some(cb)) => ca == cb,
            _ => false,
        }
    }

    /// First adjacent equal-color pair of active tiles in raster order.
    pub fn find_first_pair(&self) -> Option<(Position, Position)> {
        for p in self.raster() {
            if self.active_color(p).is_none() {
                continue;
            }
            let right = Position::new(p.x + 1, p.y);
            if self.pairs_with(p, right) {
                return Some((p, right));
            }
            let up = Position::new(p.x, p.y + 1);
            if self.pairs_with(p, up) {
                return Some((p, up));
            }
        }
        None
    }

    pub fn has_adjacent_pair(&self) -> bool {
        self.find_first_pair().is_some()
    }

    /// Every active tile that belongs to at least one adjacent equal-color
    /// pair, deduplicated, in raster order.
    pub fn paired_cells(&self) -> Vec<Position> {
        let mut hit = vec![false; self.cells.len()];
        for p in self.raster() {
            if self.active_color(p).is_none() {
                continue;
            }
            for q in [Position::new(p.x + 1, p.y), Position::new(p.x, p.y + 1)] {
                if self.pairs_with(p, q) {
                    hit[self.flat(p.x, p.y)] = true;
                    hit[self.flat(q.x, q.y)] = true;
                }
            }
        }
        self.raster()
            .filter(|p| hit[self.flat(p.x, p.y)])
            .collect()
    }

    /// Mark cells as matched. Off-grid positions are ignored.
    pub fn mark_matched(&mut self, cells: &[Position]) {
        for &p in cells {
            if let Some(cell) = self.get_mut(p) {
                cell.matched = true;
            }
        }
    }

    /// Let surviving tiles fall and refill the freed slots from the top.
    ///
    /// Unmatched obstacles stay where they are and tiles fall past them into
    /// the free slots below. Matched cells (tiles or cleared obstacles) are
    /// free slots. Within each column the survivors keep their relative order
    /// and pack into the lowest free slots; the remaining top slots receive
    /// tiles from `spawn`.
    pub fn collapse_and_refill(&mut self, mut spawn: impl FnMut() -> ColorId) -> CollapseReport {
        let mut report = CollapseReport::default();
        let mut slots: Vec<usize> = Vec::with_capacity(self.height as usize);
        let mut survivors: Vec<Cell> = Vec::with_capacity(self.height as usize);

        for x in 0..self.width as i16 {
            slots.clear();
            survivors.clear();
            for y in 0..self.height as i16 {
                let idx = self.flat(x, y);
                let cell = self.cells[idx];
                if cell.is_obstacle() && !cell.matched {
                    continue;
                }
                slots.push(idx);
                if !cell.matched {
                    survivors.push(cell);
                }
            }
            if survivors.len() == slots.len() {
                continue;
            }
            report.columns.push(x);
            for (i, &idx) in slots.iter().enumerate() {
                self.cells[idx] = match survivors.get(i) {
                    Some(&cell) => cell,
                    None => {
                        let color = spawn();
                        report.spawned.push(SpawnedTile {
                            at: self.position_of(idx),
                            color,
                        });
                        Cell::sock(color)
                    }
                };
            }
        }
        report
    }
}
