//! RNG module - upcoming-piece queue and its random source
//!
//! The queue is a short FIFO of catalog ids: its length is the lookahead
//! depth, the search reads it front to back, and each game step consumes the
//! front piece and appends a fresh one.
//!
//! Pieces are drawn uniformly from the catalog with a simple LCG so games are
//! reproducible from a seed.

use std::collections::VecDeque;

use crate::types::PieceId;

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u32) -> Self {
        // Avoid 0 seed which would produce all zeros
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u32
    pub fn next_u32(&mut self) -> u32 {
        // a=1664525, c=1013904223, m=2^32
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Generate random value in range [0, max)
    pub fn next_range(&mut self, max: u32) -> u32 {
        // High bits of an LCG are far better distributed than the low ones.
        ((u64::from(self.next_u32()) * u64::from(max)) >> 32) as u32
    }
}

/// Uniform piece generator over `count` catalog ids
#[derive(Debug, Clone)]
pub struct RandomPieces {
    rng: SimpleRng,
    count: usize,
}

impl RandomPieces {
    pub fn new(seed: u32, count: usize) -> Self {
        debug_assert!(count > 0);
        Self {
            rng: SimpleRng::new(seed),
            count,
        }
    }

    /// Draw the next piece id
    pub fn next_piece(&mut self) -> PieceId {
        self.rng.next_range(self.count as u32) as PieceId
    }

    /// Build a queue of `len` freshly drawn pieces
    pub fn fill_queue(&mut self, len: usize) -> PieceQueue {
        PieceQueue::new((0..len).map(|_| self.next_piece()))
    }
}

/// Fixed-length FIFO of upcoming piece ids (front = current piece)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PieceQueue {
    pieces: VecDeque<PieceId>,
}

impl PieceQueue {
    pub fn new(pieces: impl IntoIterator<Item = PieceId>) -> Self {
        Self {
            pieces: pieces.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    /// Piece at lookahead depth `depth` (0 = current)
    pub fn get(&self, depth: usize) -> Option<PieceId> {
        self.pieces.get(depth).copied()
    }

    /// The current piece
    pub fn front(&self) -> Option<PieceId> {
        self.pieces.front().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = PieceId> + '_ {
        self.pieces.iter().copied()
    }

    /// Consume the current piece and append `next`; the length is unchanged
    pub fn advance(&mut self, next: PieceId) -> Option<PieceId> {
        let consumed = self.pieces.pop_front();
        self.pieces.push_back(next);
        consumed
    }
}

impl std::ops::Index<usize> for PieceQueue {
    type Output = PieceId;

    fn index(&self, depth: usize) -> &PieceId {
        &self.pieces[depth]
    }
}
