//! Lookahead search - sequential reference implementation
//!
//! Every `(rotation, offset)` of the current piece is dropped on a copy of the
//! board; when more pieces are visible the branch is scored by the best
//! continuation of the next piece, recursively, until the last visible piece
//! is scored with the weighted evaluation. Pure maximization, no pruning.
//!
//! The parallel orchestrator splits the same search at the top level: one
//! [`Lookahead::evaluate_placement`] call per candidate.

use log::debug;

use crate::core::{Board, Landing, Piece, PieceCatalog, PieceQueue, Placement, ScoreWeights};
use crate::error::SearchError;

/// Outcome of a search: the board after the chosen placement and its score
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreResult {
    /// Board after the top-level placement (lines already cleared)
    pub board: Board,
    /// Best score reachable from this placement; `-inf` = game over
    pub score: f64,
    /// Lines cleared by the top-level placement itself
    pub lines_cleared: usize,
    pub placement: Option<Placement>,
}

impl ScoreResult {
    /// The game-over sentinel for a search on `board`
    pub fn game_over(board: &Board) -> Self {
        Self {
            board: board.clone().with_score(f64::NEG_INFINITY),
            score: f64::NEG_INFINITY,
            lines_cleared: 0,
            placement: None,
        }
    }

    pub fn is_game_over(&self) -> bool {
        self.score == f64::NEG_INFINITY
    }
}

/// Depth-limited search over a fixed piece queue
#[derive(Debug, Clone, Copy)]
pub struct Lookahead<'a> {
    catalog: &'a PieceCatalog,
    weights: &'a ScoreWeights,
    max_depth: usize,
}

impl<'a> Lookahead<'a> {
    pub fn new(catalog: &'a PieceCatalog, weights: &'a ScoreWeights, max_depth: usize) -> Self {
        Self {
            catalog,
            weights,
            max_depth: max_depth.max(1),
        }
    }

    /// Pieces actually searched for `queue`
    pub fn effective_depth(&self, queue: &PieceQueue) -> usize {
        self.max_depth.min(queue.len())
    }

    /// Resolve the pieces the search will visit and return the current one
    pub fn check_queue(&self, queue: &PieceQueue) -> Result<&'a Piece, SearchError> {
        let current = queue.front().ok_or(SearchError::EmptyQueue)?;
        for id in queue.iter().take(self.effective_depth(queue)) {
            if self.catalog.get(id).is_none() {
                return Err(SearchError::UnknownPiece(id));
            }
        }
        Ok(&self.catalog[current])
    }

    /// Best placement of `queue[0]` on `board`, first-seen wins ties
    pub fn search(&self, board: &Board, queue: &PieceQueue) -> Result<ScoreResult, SearchError> {
        let piece = self.check_queue(queue)?;

        let mut best: Option<ScoreResult> = None;
        let mut best_score = f64::NEG_INFINITY;
        for placement in piece.placements() {
            if let Some(candidate) = self.evaluate_placement(board, placement, queue) {
                if candidate.score > best_score {
                    best_score = candidate.score;
                    best = Some(candidate);
                }
            }
        }

        let result = best.unwrap_or_else(|| ScoreResult::game_over(board));
        debug!(
            "search {} depth {}: score {:.3}",
            piece.name(),
            self.effective_depth(queue),
            result.score
        );
        Ok(result)
    }

    /// Drop one top-level placement and score it by its best continuation.
    ///
    /// `None` when the placement overflows. A legal placement whose every
    /// continuation overflows comes back with a `-inf` score.
    pub fn evaluate_placement(
        &self,
        board: &Board,
        placement: Placement,
        queue: &PieceQueue,
    ) -> Option<ScoreResult> {
        let mut next = board.clone();
        let landing = next.place(&placement.shape)?;
        let score = self.branch_score(&next, landing, placement.shape.height(), queue, 0);
        next.set_score(score);
        Some(ScoreResult {
            board: next,
            score,
            lines_cleared: landing.lines_cleared,
            placement: Some(placement),
        })
    }

    fn branch_score(
        &self,
        board: &Board,
        landing: Landing,
        rotation_height: usize,
        queue: &PieceQueue,
        depth: usize,
    ) -> f64 {
        if depth + 1 >= self.effective_depth(queue) {
            self.weights.score(
                board,
                landing.lines_cleared,
                landing.drop_height,
                rotation_height,
            )
        } else {
            self.best_score_at(board, queue, depth + 1)
        }
    }

    /// Best score over every placement of `queue[depth]`, `-inf` if none fits
    fn best_score_at(&self, board: &Board, queue: &PieceQueue, depth: usize) -> f64 {
        let Some(piece) = queue.get(depth).and_then(|id| self.catalog.get(id)) else {
            return f64::NEG_INFINITY;
        };

        let mut best = f64::NEG_INFINITY;
        for rotation in piece.rotations() {
            for offset in 0..=rotation.max_offset() {
                let shape = rotation.shifted(offset);
                let mut next = board.clone();
                if let Some(landing) = next.place(&shape) {
                    let score = self.branch_score(&next, landing, shape.height(), queue, depth);
                    if score > best {
                        best = score;
                    }
                }
            }
        }
        best
    }
}
