use crate::level::ObjectiveProgress;
use crate::types::{Cell, Phase, Position};

/// Read-only copy of a session for renderers and UI.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GameSnapshot {
    pub level: u32,
    pub width: u8,
    pub height: u8,
    /// Row-major cells (`y * width + x`), `y = 0` is the bottom row.
    pub cells: Vec<Cell>,
    pub score: u32,
    pub moves_remaining: u32,
    pub combo: u32,
    pub pairs_remaining: u32,
    pub objective: ObjectiveProgress,
    pub phase: Phase,
    pub stars: Option<u8>,
}

impl GameSnapshot {
    pub fn cell(&self, pos: Position) -> Option<Cell> {
        if pos.x < 0 || pos.y < 0 || pos.x >= self.width as i16 || pos.y >= self.height as i16 {
            return None;
        }
        self.cells
            .get(pos.y as usize * self.width as usize + pos.x as usize)
            .copied()
    }

    /// Accepts player input.
    pub fn playable(&self) -> bool {
        self.phase == Phase::Idle
    }

    /// FNV-1a over the cell contents, for cheap change detection.
    pub fn board_hash(&self) -> u64 {
        const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
        const PRIME: u64 = 0x0000_0100_0000_01b3;
        let mut h = OFFSET;
        for cell in &self.cells {
            let mut byte = u64::from(cell.color().map_or(0, |c| c.wrapping_add(1)));
            if cell.matched {
                byte |= 0x100;
            }
            h ^= byte;
            h = h.wrapping_mul(PRIME);
        }
        h
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot_of(cells: Vec<Cell>) -> GameSnapshot {
        GameSnapshot {
            width: 2,
            height: 2,
            cells,
            ..GameSnapshot::default()
        }
    }

    #[test]
    fn cell_lookup_is_bounds_checked() {
        let s = snapshot_of(vec![
            Cell::sock(0),
            Cell::sock(1),
            Cell::obstacle(),
            Cell::sock(3),
        ]);
        assert_eq!(s.cell(Position::new(1, 0)), Some(Cell::sock(1)));
        assert_eq!(s.cell(Position::new(0, 1)), Some(Cell::obstacle()));
        assert_eq!(s.cell(Position::new(2, 0)), None);
        assert_eq!(s.cell(Position::new(0, -1)), None);
    }

    #[test]
    fn board_hash_tracks_contents() {
        let a = snapshot_of(vec![Cell::sock(0); 4]);
        let mut b = a.clone();
        assert_eq!(a.board_hash(), b.board_hash());
        b.cells[3] = Cell::obstacle();
        assert_ne!(a.board_hash(), b.board_hash());
    }
}
