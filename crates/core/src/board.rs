//! Board module - bit-packed playfield
//!
//! The board is `BOARD_HEIGHT` row bitmasks stored bottom to top. Column 0 is
//! the highest in-board bit, so a rotation parsed from text can be OR-ed in
//! directly after shifting it to its offset.
//!
//! Besides gravity and line clears the board extracts the four features the
//! scorer combines: row transitions, column transitions, holes and well sums.
//! Feature extraction never mutates.

use std::fmt;
use std::hash::{Hash, Hasher};

use crate::pieces::PieceRotation;
use crate::types::{column_bit, full_row, Row, BOARD_HEIGHT, BOARD_WIDTH};

/// Result of dropping a rotation and clearing the rows it completed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Landing {
    /// Board row of the rotation's bottom row
    pub drop_height: usize,
    pub lines_cleared: usize,
}

/// Raw board features fed to the scorer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BoardFeatures {
    pub row_transitions: u32,
    pub column_transitions: u32,
    pub holes: u32,
    pub well_sums: u32,
}

/// The playfield plus the score of the search branch that produced it.
///
/// Equality and hashing look at the rows only; the score is ignored.
#[derive(Debug, Clone)]
pub struct Board {
    rows: [Row; BOARD_HEIGHT],
    score: f64,
}

impl Board {
    /// Create a new empty, unscored board
    pub fn new() -> Self {
        Self {
            rows: [0; BOARD_HEIGHT],
            score: f64::NEG_INFINITY,
        }
    }

    /// Create from row masks (bottom to top). Bits outside the board are dropped.
    pub fn from_rows(rows: [Row; BOARD_HEIGHT]) -> Self {
        let mut board = Self::new();
        for (dst, src) in board.rows.iter_mut().zip(rows) {
            *dst = src & full_row();
        }
        board
    }

    /// Parse a picture of the board for tests and fixtures.
    ///
    /// Lines are given top row first and fill the bottom of the board; `x`, `#`
    /// or `1` mark filled cells, anything else is empty.
    pub fn from_picture(picture: &str) -> Self {
        let lines: Vec<&str> = picture
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        debug_assert!(lines.len() <= BOARD_HEIGHT);

        let mut board = Self::new();
        for (y, line) in lines.iter().rev().enumerate().take(BOARD_HEIGHT) {
            let row = line
                .chars()
                .filter(|c| !c.is_whitespace())
                .take(BOARD_WIDTH)
                .enumerate()
                .filter(|&(_, c)| matches!(c, 'x' | '#' | '1'))
                .fold(0, |acc, (x, _)| acc | column_bit(x));
            board.rows[y] = row;
        }
        board
    }

    /// Get width of the board
    pub fn width(&self) -> usize {
        BOARD_WIDTH
    }

    /// Get height of the board
    pub fn height(&self) -> usize {
        BOARD_HEIGHT
    }

    /// Row masks, bottom to top
    pub fn rows(&self) -> &[Row; BOARD_HEIGHT] {
        &self.rows
    }

    pub fn row(&self, y: usize) -> Row {
        self.rows[y]
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn set_score(&mut self, score: f64) {
        self.score = score;
    }

    /// Builder-style variant of [`Board::set_score`]
    pub fn with_score(mut self, score: f64) -> Self {
        self.score = score;
        self
    }

    /// True when the score carries the game-over / unscored sentinel
    pub fn is_dead(&self) -> bool {
        self.score == f64::NEG_INFINITY
    }

    /// Check if cell (x, y) is filled; y counts from the floor
    pub fn is_occupied(&self, x: usize, y: usize) -> bool {
        x < BOARD_WIDTH && y < BOARD_HEIGHT && self.rows[y] & column_bit(x) != 0
    }

    /// Number of rows up to and including the highest filled one
    pub fn stack_height(&self) -> usize {
        self.rows
            .iter()
            .rposition(|row| *row != 0)
            .map_or(0, |y| y + 1)
    }

    /// Empty every row and reset the score sentinel
    pub fn clear(&mut self) {
        self.rows = [0; BOARD_HEIGHT];
        self.score = f64::NEG_INFINITY;
    }

    /// Check whether `rotation` overlaps filled cells with its bottom row at `bottom`
    #[inline(always)]
    fn collides(&self, rotation: &PieceRotation, bottom: usize) -> bool {
        rotation
            .rows()
            .iter()
            .enumerate()
            .any(|(dy, piece_row)| self.rows[bottom + dy] & piece_row != 0)
    }

    /// Drop `rotation` straight down from the top of the board and lock it.
    ///
    /// Returns the row of the rotation's bottom row, or `None` when the rotation
    /// already collides at the topmost position (the board tops out). The board
    /// is unchanged in that case.
    pub fn drop_rotation(&mut self, rotation: &PieceRotation) -> Option<usize> {
        let height = rotation.height();
        if height == 0 || height > BOARD_HEIGHT {
            return None;
        }

        let mut bottom = BOARD_HEIGHT - height;
        if self.collides(rotation, bottom) {
            return None;
        }
        while bottom > 0 && !self.collides(rotation, bottom - 1) {
            bottom -= 1;
        }

        for (dy, piece_row) in rotation.rows().iter().enumerate() {
            self.rows[bottom + dy] |= piece_row;
        }
        Some(bottom)
    }

    /// Remove row `y` and shift everything above it down by one
    fn remove_row(&mut self, y: usize) {
        self.rows.copy_within(y + 1.., y);
        self.rows[BOARD_HEIGHT - 1] = 0;
    }

    /// Clear full rows in the span a rotation just landed in.
    ///
    /// Scans `drop_height .. drop_height + rotation_height`; after a removal the
    /// same index is tested again since the row above moved into it.
    pub fn clear_lines(&mut self, drop_height: usize, rotation_height: usize) -> usize {
        let mut cleared = 0;
        let mut y = drop_height;
        for _ in 0..rotation_height {
            if y >= BOARD_HEIGHT {
                break;
            }
            if self.rows[y] == full_row() {
                self.remove_row(y);
                cleared += 1;
            } else {
                y += 1;
            }
        }
        cleared
    }

    /// Drop `rotation` and clear the lines it completes
    pub fn place(&mut self, rotation: &PieceRotation) -> Option<Landing> {
        let drop_height = self.drop_rotation(rotation)?;
        let lines_cleared = self.clear_lines(drop_height, rotation.height());
        Some(Landing {
            drop_height,
            lines_cleared,
        })
    }

    /// Value changes along each row, walls on both sides counted as filled
    pub fn row_transitions(&self) -> u32 {
        // W + 2 framed bits give W + 1 adjacent pairs.
        let pairs: u64 = (1 << (BOARD_WIDTH + 1)) - 1;
        self.rows
            .iter()
            .map(|&row| {
                let bits = framed(row);
                ((bits ^ (bits >> 1)) & pairs).count_ones()
            })
            .sum()
    }

    /// Value changes up each column, starting from a filled floor
    pub fn column_transitions(&self) -> u32 {
        let mut below = full_row();
        let mut transitions = 0;
        for &row in &self.rows {
            transitions += (row ^ below).count_ones();
            below = row;
        }
        transitions
    }

    /// Empty cells with at least one filled cell above them
    pub fn holes(&self) -> u32 {
        let mut covered: Row = 0;
        let mut holes = 0;
        for &row in self.rows.iter().rev() {
            holes += (!row & covered & full_row()).count_ones();
            covered |= row;
        }
        holes
    }

    /// Depth-weighted count of well cells.
    ///
    /// A well cell is empty with both horizontal neighbours filled (walls count).
    /// Each one adds 1 plus the run of empty cells directly below it.
    pub fn well_sums(&self) -> u32 {
        let mut sum = 0;
        for (y, &row) in self.rows.iter().enumerate() {
            let bits = framed(row);
            // Left neighbour of bit b is framed bit b + 2, right neighbour is framed bit b.
            let neighbours = ((bits >> 2) & bits) as Row;
            let mut wells = !row & neighbours & full_row();
            while wells != 0 {
                let bit = wells & wells.wrapping_neg();
                wells &= wells - 1;
                sum += 1;
                sum += self.rows[..y]
                    .iter()
                    .rev()
                    .take_while(|below| *below & bit == 0)
                    .count() as u32;
            }
        }
        sum
    }

    pub fn features(&self) -> BoardFeatures {
        BoardFeatures {
            row_transitions: self.row_transitions(),
            column_transitions: self.column_transitions(),
            holes: self.holes(),
            well_sums: self.well_sums(),
        }
    }
}

/// Row with a filled wall bit on each side: bit 0 and bit `BOARD_WIDTH + 1`
#[inline(always)]
fn framed(row: Row) -> u64 {
    (1 << (BOARD_WIDTH + 1)) | (u64::from(row) << 1) | 1
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Board {
    fn eq(&self, other: &Self) -> bool {
        self.rows == other.rows
    }
}

impl Eq for Board {}

impl Hash for Board {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rows.hash(state);
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in (0..BOARD_HEIGHT).rev() {
            for x in 0..BOARD_WIDTH {
                f.write_str(if self.is_occupied(x, y) { "x " } else { ". " })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
