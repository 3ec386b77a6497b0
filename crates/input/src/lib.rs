//! Terminal input module.
//!
//! Maps `crossterm` key events into [`InputCommand`]s. The board is driven by
//! a cursor: arrows (or `hjkl`) move it, `wasd` swap the tile under it with a
//! neighbour, and `1`-`3` select a power-up that `Enter` or `Space` applies.

pub mod map;

pub use sock_match_types as types;

pub use map::{handle_key_event, should_quit, InputCommand};
