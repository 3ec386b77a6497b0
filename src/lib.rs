//! Sock Match (workspace facade crate).
//!
//! Re-exports the workspace crates under one name: `sock_match::{core, app,
//! input, term, types}`.

pub use sock_match_app as app;
pub use sock_match_core as core;
pub use sock_match_input as input;
pub use sock_match_term as term;
pub use sock_match_types as types;
