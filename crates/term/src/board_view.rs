//! BoardView: maps a [`GameSnapshot`] plus shell state into a framebuffer.
//!
//! Pure, no I/O. The grid is drawn top row first (`y = height - 1` at the top
//! of the frame), each tile two columns wide.

use crate::core::GameSnapshot;
use crate::fb::{FrameBuffer, Rgb, Style};
use crate::types::{Cell, ColorId, Phase, Position};

/// Terminal viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

/// One power-up line in the side panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerupSlot<'a> {
    pub label: &'a str,
    pub count: u32,
    pub selected: bool,
}

/// State owned by the shell rather than the engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellView<'a> {
    pub cursor: Option<Position>,
    pub hint: Option<(Position, Position)>,
    pub powerups: &'a [PowerupSlot<'a>],
}

const TILE_W: u16 = 2;
const PANEL_GAP: u16 = 3;
const PANEL_W: u16 = 24;
const PANEL_H: u16 = 18;
const BOARD_BG: Rgb = Rgb::new(28, 28, 38);

const PALETTE: [Rgb; 8] = [
    Rgb::new(230, 80, 80),
    Rgb::new(80, 160, 240),
    Rgb::new(100, 210, 110),
    Rgb::new(240, 210, 80),
    Rgb::new(190, 110, 220),
    Rgb::new(250, 150, 60),
    Rgb::new(80, 210, 210),
    Rgb::new(240, 130, 190),
];

/// Display color for a sock color id.
pub fn color_rgb(color: ColorId) -> Rgb {
    PALETTE[color as usize % PALETTE.len()]
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BoardView;

impl BoardView {
    pub fn new() -> Self {
        Self
    }

    /// Render into an existing framebuffer, resizing it to the viewport.
    pub fn render_into(
        &self,
        snap: &GameSnapshot,
        shell: &ShellView<'_>,
        viewport: Viewport,
        fb: &mut FrameBuffer,
    ) {
        fb.resize(viewport.width, viewport.height);
        fb.clear(Style::default());

        let frame_w = snap.width as u16 * TILE_W + 2;
        let frame_h = snap.height as u16 + 2;
        let start_x = viewport
            .width
            .saturating_sub(frame_w + PANEL_GAP + PANEL_W)
            / 2;
        let start_y = viewport.height.saturating_sub(frame_h.max(PANEL_H)) / 2;

        draw_border(fb, start_x, start_y, frame_w, frame_h);
        for y in 0..snap.height as i16 {
            for x in 0..snap.width as i16 {
                let pos = Position::new(x, y);
                if let Some(cell) = snap.cell(pos) {
                    let (sx, sy) = screen_of(snap, start_x, start_y, pos);
                    draw_tile(fb, sx, sy, cell, tile_marks(shell, pos));
                }
            }
        }

        self.draw_panel(fb, snap, shell, start_x + frame_w + PANEL_GAP, start_y);
    }

    /// Convenience helper that allocates a new framebuffer.
    pub fn render(&self, snap: &GameSnapshot, shell: &ShellView<'_>, viewport: Viewport) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);
        self.render_into(snap, shell, viewport, &mut fb);
        fb
    }

    fn draw_panel(
        &self,
        fb: &mut FrameBuffer,
        snap: &GameSnapshot,
        shell: &ShellView<'_>,
        x: u16,
        mut y: u16,
    ) {
        let label = Style::default().bold();
        let value = Style::default();

        fb.put_str(x, y, "LEVEL ", label);
        fb.put_u32(x + 6, y, snap.level, value);
        y += 2;

        fb.put_str(x, y, "SCORE ", label);
        fb.put_u32(x + 6, y, snap.score, value);
        y += 1;
        fb.put_str(x, y, "MOVES ", label);
        fb.put_u32(x + 6, y, snap.moves_remaining, value);
        y += 1;
        fb.put_str(x, y, "COMBO ", label);
        fb.put_u32(x + 6, y, snap.combo, value);
        y += 1;
        fb.put_str(x, y, "PAIRS ", label);
        fb.put_u32(x + 6, y, snap.pairs_remaining, value);
        y += 2;

        let objective = &snap.objective;
        fb.put_str(x, y, "MATCH ", label);
        fb.put_str(x + 6, y, "██", value.fg(color_rgb(objective.target_color)));
        let cx = fb.put_u32(x + 9, y, objective.matched_count.min(objective.target_matches), value);
        let cx = fb.put_str(cx, y, "/", value);
        fb.put_u32(cx, y, objective.target_matches, value);
        y += 2;

        for (i, slot) in shell.powerups.iter().enumerate() {
            let style = if slot.selected {
                value.reversed()
            } else {
                value
            };
            let cx = fb.put_u32(x, y, i as u32 + 1, label);
            let cx = fb.put_str(cx + 1, y, slot.label, style);
            let cx = fb.put_str(cx + 1, y, "x", value);
            fb.put_u32(cx, y, slot.count, value);
            y += 1;
        }

        y += 1;
        let banner = Style::default().fg(Rgb::new(255, 255, 255)).bold();
        match snap.phase {
            Phase::Won => {
                fb.put_str(x, y, "LEVEL CLEAR", banner);
                let gold = Style::default().fg(Rgb::new(250, 210, 60)).bold();
                if let Some(stars) = snap.stars {
                    for i in 0..3u8 {
                        let ch = if i < stars { '★' } else { '☆' };
                        fb.put(x + i as u16 * 2, y + 1, ch, gold);
                    }
                }
                fb.put_str(x, y + 2, "n: next level", value);
            }
            Phase::Lost => {
                fb.put_str(x, y, "OUT OF MOVES", banner);
                fb.put_str(x, y + 2, "r: retry", value);
            }
            _ => {}
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct TileMarks {
    cursor: bool,
    hint: bool,
}

fn tile_marks(shell: &ShellView<'_>, pos: Position) -> TileMarks {
    TileMarks {
        cursor: shell.cursor == Some(pos),
        hint: shell.hint.is_some_and(|(a, b)| a == pos || b == pos),
    }
}

/// Top-left terminal cell of the tile at `pos`.
fn screen_of(snap: &GameSnapshot, start_x: u16, start_y: u16, pos: Position) -> (u16, u16) {
    let row = snap.height as u16 - 1 - pos.y as u16;
    (start_x + 1 + pos.x as u16 * TILE_W, start_y + 1 + row)
}

fn draw_tile(fb: &mut FrameBuffer, x: u16, y: u16, cell: Cell, marks: TileMarks) {
    let base = Style::default().bg(BOARD_BG);
    let (text, mut style) = if cell.matched {
        ("··", base.fg(Rgb::new(120, 120, 130)))
    } else {
        match cell.color() {
            Some(color) => ("●", base.fg(color_rgb(color)).bold()),
            None => ("▓▓", base.fg(Rgb::new(110, 100, 90))),
        }
    };
    if marks.hint {
        style = style.bg(Rgb::new(70, 70, 30));
    }
    if marks.cursor {
        style = style.reversed();
    }
    fb.fill_rect(x, y, TILE_W, 1, ' ', style);
    fb.put_str(x, y, text, style);
}

fn draw_border(fb: &mut FrameBuffer, x: u16, y: u16, w: u16, h: u16) {
    if w < 2 || h < 2 {
        return;
    }
    let style = Style::default().fg(Rgb::new(190, 190, 200));
    fb.put(x, y, '┌', style);
    fb.put(x + w - 1, y, '┐', style);
    fb.put(x, y + h - 1, '└', style);
    fb.put(x + w - 1, y + h - 1, '┘', style);
    for dx in 1..w - 1 {
        fb.put(x + dx, y, '─', style);
        fb.put(x + dx, y + h - 1, '─', style);
    }
    for dy in 1..h - 1 {
        fb.put(x, y + dy, '│', style);
        fb.put(x + w - 1, y + dy, '│', style);
    }
}
