//! Game driver - search, apply, advance the queue, keep statistics
//!
//! A game never ends: when the search finds no legal placement the board is
//! reset, the death is counted and play continues with the next piece.

use std::sync::Arc;

use log::{debug, info};
use serde::Serialize;

use crate::config::SearchConfig;
use crate::core::{Board, Context, PieceCatalog, PieceQueue, RandomPieces};
use crate::error::SearchError;
use crate::orchestrator::{find_best_scoped, ParallelSearch};
use crate::pipeline::Canceller;
use crate::search::{Lookahead, ScoreResult};

/// Running totals across games
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GameStats {
    /// Pieces placed (or attempted) in total
    pub steps: u64,
    pub deaths: u64,
    pub pieces_this_game: u64,
    pub total_lines: u64,
    /// Sum of the scores of every successful placement
    pub total_score: f64,
}

impl GameStats {
    fn record_placement(&mut self, result: &ScoreResult) {
        self.steps += 1;
        self.pieces_this_game += 1;
        self.total_lines += result.lines_cleared as u64;
        self.total_score += result.score;
    }

    fn record_death(&mut self) {
        self.steps += 1;
        self.deaths += 1;
        self.pieces_this_game = 0;
    }

    /// Pieces per finished game; the running game counts when none has ended
    pub fn avg_pieces_per_game(&self) -> f64 {
        if self.deaths == 0 {
            self.steps as f64
        } else {
            self.steps as f64 / self.deaths as f64
        }
    }

    /// Mean score per step, `0.0` before the first step
    pub fn avg_score(&self) -> f64 {
        if self.steps == 0 {
            0.0
        } else {
            self.total_score / self.steps as f64
        }
    }
}

/// What happened in one [`Game::step`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepReport {
    pub step: u64,
    pub piece: String,
    pub rotation: Option<usize>,
    pub offset: Option<usize>,
    /// `None` on game over
    pub score: Option<f64>,
    pub lines_cleared: usize,
    pub game_over: bool,
    pub stack_height: usize,
    pub holes: u32,
}

pub struct Game {
    board: Board,
    queue: PieceQueue,
    source: RandomPieces,
    search: ParallelSearch,
    stats: GameStats,
}

impl Game {
    /// Start on an empty board with a queue of `config.lookahead` pieces
    pub fn new(catalog: Arc<PieceCatalog>, config: &SearchConfig, seed: u32) -> Result<Self, SearchError> {
        let mut source = RandomPieces::new(seed, catalog.len());
        let queue = source.fill_queue(config.lookahead);
        let search = ParallelSearch::new(catalog, config)?;
        info!(
            "game started: seed {seed}, lookahead {}, {} workers",
            search.lookahead(),
            search.workers()
        );
        Ok(Self {
            board: Board::new(),
            queue,
            source,
            search,
            stats: GameStats::default(),
        })
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn queue(&self) -> &PieceQueue {
        &self.queue
    }

    pub fn stats(&self) -> &GameStats {
        &self.stats
    }

    pub fn catalog(&self) -> &Arc<PieceCatalog> {
        self.search.catalog()
    }

    pub fn canceller(&self) -> Canceller {
        self.search.canceller()
    }

    /// Place the current piece, then advance the queue
    pub fn step(&mut self) -> Result<StepReport, SearchError> {
        let piece = self.queue.front().ok_or(SearchError::EmptyQueue)?;
        let result = self.search.find_best(&self.board, &self.queue)?;
        let game_over = result.is_game_over();

        if game_over {
            self.stats.record_death();
            info!(
                "game over after {} pieces (deaths: {})",
                self.stats.steps, self.stats.deaths
            );
            self.board.clear();
        } else {
            self.stats.record_placement(&result);
            self.board = result.board;
        }
        self.queue.advance(self.source.next_piece());

        let placement = result.placement.as_ref();
        let report = StepReport {
            step: self.stats.steps,
            piece: self.catalog()[piece].name().to_string(),
            rotation: placement.map(|p| p.rotation),
            offset: placement.map(|p| p.offset),
            score: (!game_over).then_some(result.score),
            lines_cleared: result.lines_cleared,
            game_over,
            stack_height: self.board.stack_height(),
            holes: self.board.holes(),
        };
        debug!("step {}: {:?}", report.step, report);
        Ok(report)
    }

    /// Search a saved context: its board with its piece in front of the
    /// current queue. The game itself is left untouched.
    ///
    /// Runs once on scoped threads rather than through the game's pool.
    pub fn debug_context(&self, context: &Context) -> Result<ScoreResult, SearchError> {
        let queue = PieceQueue::new(
            std::iter::once(context.piece).chain(self.queue.iter().skip(1)),
        );
        let search = Lookahead::new(
            self.search.catalog(),
            self.search.weights(),
            self.search.lookahead(),
        );
        let result = find_best_scoped(&search, &context.board, &queue, self.search.workers())?;
        info!(
            "context {}: score {:.3}, game over: {}",
            self.catalog()
                .get(context.piece)
                .map_or("?", |piece| piece.name()),
            result.score,
            result.is_game_over()
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ScoreWeights;

    fn game(seed: u32) -> Game {
        let config = SearchConfig::default().with_lookahead(2).with_workers(2);
        Game::new(Arc::new(PieceCatalog::standard()), &config, seed).unwrap()
    }

    #[test]
    fn test_step_places_piece() {
        let mut game = game(42);
        let queue_before: Vec<_> = game.queue().iter().collect();

        let report = game.step().unwrap();
        assert_eq!(report.step, 1);
        assert!(!report.game_over);
        assert!(report.score.is_some());
        assert_eq!(game.board().rows().iter().map(|r| r.count_ones()).sum::<u32>(), 4);

        let queue_after: Vec<_> = game.queue().iter().collect();
        assert_eq!(queue_after.len(), queue_before.len());
        assert_eq!(queue_after[0], queue_before[1]);
    }

    #[test]
    fn test_seeded_games_are_reproducible() {
        let mut a = game(7);
        let mut b = game(7);
        for _ in 0..20 {
            assert_eq!(a.step().unwrap(), b.step().unwrap());
        }
        assert_eq!(a.board(), b.board());
        assert_eq!(a.stats(), b.stats());
    }

    #[test]
    fn test_stats_accumulate() {
        let mut game = game(3);
        for _ in 0..10 {
            game.step().unwrap();
        }
        let stats = game.stats();
        assert_eq!(stats.steps, 10);
        assert_eq!(stats.deaths, 0);
        assert_eq!(stats.pieces_this_game, 10);
        assert!(stats.avg_score() < 0.0);
        assert_eq!(stats.avg_pieces_per_game(), 10.0);
    }

    #[test]
    fn test_debug_context_leaves_game_alone() {
        let game = game(11);
        let catalog = Arc::clone(game.catalog());
        let context = Context {
            board: Board::from_picture("xxxx.xxxxx"),
            piece: catalog.find("I").unwrap(),
        };
        let queue_before = game.queue().clone();

        let result = game.debug_context(&context).unwrap();
        assert!(!result.is_game_over());

        let weights = ScoreWeights::default();
        let queue = PieceQueue::new(
            std::iter::once(context.piece).chain(queue_before.iter().skip(1)),
        );
        let expected = Lookahead::new(&catalog, &weights, 2)
            .search(&context.board, &queue)
            .unwrap();
        assert_eq!(result, expected);
        assert_eq!(game.queue(), &queue_before);
        assert_eq!(game.board(), &Board::new());
        assert_eq!(game.stats().steps, 0);
    }

    #[test]
    fn test_report_serializes() {
        let mut game = game(5);
        let report = game.step().unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["step"], 1);
        assert_eq!(json["game_over"], false);
        assert!(json["score"].is_f64());
    }
}
