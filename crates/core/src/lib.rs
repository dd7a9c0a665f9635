//! Core simulation module - pure, deterministic, and testable
//!
//! This crate contains the playfield simulation the search is built on. It has
//! no threads and no global state, making it:
//!
//! - **Deterministic**: the same board and rotation always land the same way
//! - **Cheap to clone**: a board is twenty `u32` rows plus a score
//! - **Shareable**: the piece catalog is immutable and `Sync`
//!
//! # Module Structure
//!
//! - [`board`]: bit-packed board with drop, line clear and feature extraction
//! - [`pieces`]: rotation bitmasks, placement enumeration, the piece catalog
//! - [`scoring`]: weighted linear score over board features
//! - [`rng`]: upcoming-piece queue and seeded piece generator
//! - [`snapshot`]: board/context text format and file I/O
//! - [`error`]: catalog and snapshot errors
//!
//! # Example
//!
//! ```
//! use tetris_lookahead_core::{Board, PieceCatalog, ScoreWeights};
//!
//! let catalog = PieceCatalog::standard();
//! let o = &catalog[catalog.find("O").unwrap()];
//!
//! let mut board = Board::new();
//! let placement = o.placements().next().unwrap();
//! let landing = board.place(&placement.shape).unwrap();
//! assert_eq!(landing.drop_height, 0);
//! assert_eq!(landing.lines_cleared, 0);
//!
//! let score = ScoreWeights::default().score(&board, 0, landing.drop_height, 2);
//! assert!(score.is_finite());
//! ```

pub mod board;
pub mod error;
pub mod pieces;
pub mod rng;
pub mod scoring;
pub mod snapshot;

pub use tetris_lookahead_types as types;

// Re-export commonly used types for convenience
pub use board::{Board, BoardFeatures, Landing};
pub use error::{CatalogError, SnapshotError};
pub use pieces::{Piece, PieceCatalog, PieceRotation, Placement};
pub use rng::{PieceQueue, RandomPieces, SimpleRng};
pub use scoring::{calculate_score, ScoreWeights};
pub use snapshot::Context;
