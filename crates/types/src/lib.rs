//! Core types module - shared constants and aliases
//!
//! This crate defines the board geometry and the search defaults used by the
//! rest of the workspace. It has no dependencies so every layer (simulation,
//! search, driver) can share it.
//!
//! # Board Geometry
//!
//! The playfield is packed one row per [`Row`] bitmask:
//!
//! - **Width**: 10 columns; column 0 (leftmost) is bit `BOARD_WIDTH - 1`
//! - **Height**: 20 rows; row 0 is the floor, rows are stored bottom to top
//! - **Row storage**: `u32`, so the width may never exceed [`MAX_ROW_WIDTH`]
//!
//! # Search Defaults
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `DEFAULT_LOOKAHEAD` | 3 | Pieces considered before scoring a branch |
//! | `MAX_LOOKAHEAD` | 6 | Upper bound accepted by configuration |
//! | `DEFAULT_CHANNEL_CAPACITY` | 512 | Bounded task/result channel size |
//!
//! # Examples
//!
//! ```
//! use tetris_lookahead_types::{full_row, BOARD_HEIGHT, BOARD_WIDTH};
//!
//! assert_eq!(BOARD_WIDTH, 10);
//! assert_eq!(BOARD_HEIGHT, 20);
//! assert_eq!(full_row().count_ones(), BOARD_WIDTH as u32);
//! ```

/// One playfield row packed as bits, one bit per column
pub type Row = u32;

/// Index of a piece inside the piece catalog
pub type PieceId = usize;

/// Number of bits available in a [`Row`]
pub const MAX_ROW_WIDTH: usize = Row::BITS as usize;

/// Board width in cells (10 columns)
pub const BOARD_WIDTH: usize = 10;

/// Board height in cells (20 rows)
pub const BOARD_HEIGHT: usize = 20;

/// Tallest rotation a catalog may contain
pub const MAX_PIECE_HEIGHT: usize = 4;

/// Default lookahead depth (1 means only the current piece)
pub const DEFAULT_LOOKAHEAD: usize = 3;

/// Largest lookahead depth accepted by configuration
pub const MAX_LOOKAHEAD: usize = 6;

/// Default capacity of the pipeline's bounded channels
pub const DEFAULT_CHANNEL_CAPACITY: usize = 512;

const _: () = assert!(BOARD_WIDTH <= MAX_ROW_WIDTH, "board width exceeds row storage");
const _: () = assert!(BOARD_WIDTH >= 2, "board needs at least two columns");
const _: () = assert!(MAX_PIECE_HEIGHT <= BOARD_HEIGHT);

/// Mask with every in-board column set
#[inline(always)]
pub const fn full_row() -> Row {
    if BOARD_WIDTH == MAX_ROW_WIDTH {
        Row::MAX
    } else {
        (1 << BOARD_WIDTH) - 1
    }
}

/// Bit for column `x` (0 = leftmost)
#[inline(always)]
pub const fn column_bit(x: usize) -> Row {
    1 << (BOARD_WIDTH - 1 - x)
}
