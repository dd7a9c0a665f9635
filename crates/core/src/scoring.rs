//! Scoring module - weighted linear evaluation of a board
//!
//! The score of a landed piece combines its landing height, the lines it
//! cleared and the four board features. Weights are plain data so they can be
//! tuned from a config file or pinned in tests.

use serde::{Deserialize, Serialize};

use crate::board::{Board, BoardFeatures};

/// Feature weights for [`ScoreWeights::score`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub landing_height: f64,
    pub lines_cleared: f64,
    pub row_transitions: f64,
    pub column_transitions: f64,
    pub holes: f64,
    pub well_sums: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            landing_height: -4.500158825082766,
            lines_cleared: 3.4181268101392694,
            row_transitions: -3.2178882868487753,
            column_transitions: -9.348695305445199,
            holes: -7.899265427351652,
            well_sums: -3.3855972247263626,
        }
    }
}

/// Landing height of a rotation whose bottom row rests at `drop_height`
///
/// Measured from the rotation's top row plus half its height (rounded down),
/// so a vertical I on the floor lands at 4 and a flat one at 0.
pub fn adjusted_height(drop_height: usize, rotation_height: usize) -> usize {
    let extent = rotation_height.saturating_sub(1);
    drop_height + extent + extent / 2
}

impl ScoreWeights {
    /// Combine pre-extracted features with the landing data
    pub fn combine(
        &self,
        features: &BoardFeatures,
        lines_cleared: usize,
        drop_height: usize,
        rotation_height: usize,
    ) -> f64 {
        adjusted_height(drop_height, rotation_height) as f64 * self.landing_height
            + lines_cleared as f64 * self.lines_cleared
            + features.row_transitions as f64 * self.row_transitions
            + features.column_transitions as f64 * self.column_transitions
            + features.holes as f64 * self.holes
            + features.well_sums as f64 * self.well_sums
    }

    /// Score `board` after a rotation landed at `drop_height` and cleared `lines_cleared`
    pub fn score(
        &self,
        board: &Board,
        lines_cleared: usize,
        drop_height: usize,
        rotation_height: usize,
    ) -> f64 {
        self.combine(&board.features(), lines_cleared, drop_height, rotation_height)
    }
}

/// Score with the default weights
pub fn calculate_score(
    board: &Board,
    lines_cleared: usize,
    drop_height: usize,
    rotation_height: usize,
) -> f64 {
    ScoreWeights::default().score(board, lines_cleared, drop_height, rotation_height)
}
