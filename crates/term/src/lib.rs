//! Terminal renderer for the sock board.
//!
//! Renders into a plain framebuffer (no widget toolkit) that is diffed and
//! flushed to the terminal each frame. Tiles are two columns wide to offset
//! the usual glyph aspect ratio.

pub mod board_view;
pub mod fb;
pub mod renderer;

pub use sock_match_core as core;
pub use sock_match_types as types;

pub use board_view::{color_rgb, BoardView, PowerupSlot, ShellView, Viewport};
pub use fb::{FrameBuffer, Glyph, Rgb, Style};
pub use renderer::{encode_diff_into, encode_full_into, TerminalRenderer};
