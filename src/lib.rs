//! Tetris lookahead placement search (workspace facade crate).
//!
//! The implementation lives in dedicated crates under `crates/`; this package
//! re-exports them as `tetris_lookahead::{types,core,engine}` and holds the
//! command-line driver.

pub mod driver;

pub use tetris_lookahead_core as core;
pub use tetris_lookahead_engine as engine;
pub use tetris_lookahead_types as types;
