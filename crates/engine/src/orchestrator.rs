//! Parallel search - one pipeline task per top-level placement

use std::cmp::Ordering;
use std::sync::Arc;

use log::debug;

use crate::config::SearchConfig;
use crate::core::{Board, PieceCatalog, PieceQueue, Placement, ScoreWeights};
use crate::error::{PipelineError, SearchError};
use crate::pipeline::{reduce_scoped, Canceller, WorkerPool};
use crate::search::{Lookahead, ScoreResult};

/// Work unit: one top-level placement with its own copy of the board
#[derive(Debug, Clone)]
pub struct SearchTask {
    pub board: Board,
    pub placement: Placement,
    pub queue: PieceQueue,
}

/// Lookahead search spread over a [`WorkerPool`].
///
/// Produces the same result as [`Lookahead::search`] with the same settings.
pub struct ParallelSearch {
    catalog: Arc<PieceCatalog>,
    weights: ScoreWeights,
    lookahead: usize,
    pool: WorkerPool<SearchTask, Option<ScoreResult>>,
}

impl ParallelSearch {
    pub fn new(catalog: Arc<PieceCatalog>, config: &SearchConfig) -> Result<Self, PipelineError> {
        let weights = config.weights;
        let lookahead = config.lookahead;
        let worker_catalog = Arc::clone(&catalog);

        let pool = WorkerPool::new(config.workers, config.channel_capacity, move |task: SearchTask| {
            Lookahead::new(&worker_catalog, &weights, lookahead).evaluate_placement(
                &task.board,
                task.placement,
                &task.queue,
            )
        })?;

        Ok(Self {
            catalog,
            weights,
            lookahead,
            pool,
        })
    }

    pub fn catalog(&self) -> &Arc<PieceCatalog> {
        &self.catalog
    }

    pub fn lookahead(&self) -> usize {
        self.lookahead
    }

    pub fn weights(&self) -> &ScoreWeights {
        &self.weights
    }

    pub fn workers(&self) -> usize {
        self.pool.workers()
    }

    pub fn canceller(&self) -> Canceller {
        self.pool.canceller()
    }

    /// Best placement of `queue[0]` on `board`
    pub fn find_best(&mut self, board: &Board, queue: &PieceQueue) -> Result<ScoreResult, SearchError> {
        let search = Lookahead::new(&self.catalog, &self.weights, self.lookahead);
        let piece = search.check_queue(queue)?;

        let tasks: Vec<SearchTask> = piece
            .placements()
            .map(|placement| SearchTask {
                board: board.clone(),
                placement,
                queue: queue.clone(),
            })
            .collect();
        debug!("{}: {} candidate placements", piece.name(), tasks.len());

        let best = self.pool.reduce(tasks, compare_candidates)?;
        Ok(settle(board, best.flatten()))
    }
}

/// One-shot parallel search on scoped threads.
///
/// Workers borrow `board` and `queue` instead of receiving copies, and exit
/// when the call returns. Same result as [`Lookahead::search`].
pub fn find_best_scoped(
    search: &Lookahead<'_>,
    board: &Board,
    queue: &PieceQueue,
    workers: usize,
) -> Result<ScoreResult, SearchError> {
    let piece = search.check_queue(queue)?;
    let placements: Vec<Placement> = piece.placements().collect();
    debug!("{}: {} candidate placements (scoped)", piece.name(), placements.len());

    let best = reduce_scoped(
        placements,
        workers,
        |placement| search.evaluate_placement(board, placement, queue),
        compare_candidates,
    );
    Ok(settle(board, best.flatten()))
}

/// Winning candidate, or the game-over sentinel on `board` when nothing fits
fn settle(board: &Board, best: Option<ScoreResult>) -> ScoreResult {
    match best {
        Some(result) if !result.is_game_over() => result,
        _ => ScoreResult::game_over(board),
    }
}

/// Legal placements beat overflowing ones, then higher score wins
fn compare_candidates(a: &Option<ScoreResult>, b: &Option<ScoreResult>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.score.total_cmp(&b.score),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(lookahead: usize, workers: usize) -> SearchConfig {
        SearchConfig::default()
            .with_lookahead(lookahead)
            .with_workers(workers)
    }

    #[test]
    fn test_matches_sequential_search() {
        let catalog = Arc::new(PieceCatalog::standard());
        let config = config(2, 4);
        let mut parallel = ParallelSearch::new(Arc::clone(&catalog), &config).unwrap();
        let sequential = Lookahead::new(&catalog, &config.weights, config.lookahead);

        let board = Board::from_picture(
            "
            ....x.....
            xx.xxx.xxx
            xxxxxx.xxx
            ",
        );
        for first in 0..catalog.len() {
            let queue = PieceQueue::new([first, (first + 3) % catalog.len()]);
            let expected = sequential.search(&board, &queue).unwrap();
            let actual = parallel.find_best(&board, &queue).unwrap();
            assert_eq!(actual, expected, "piece {}", catalog[first].name());
        }
    }

    #[test]
    fn test_game_over_returns_input_board() {
        let catalog = Arc::new(PieceCatalog::standard());
        let mut search = ParallelSearch::new(Arc::clone(&catalog), &config(1, 2)).unwrap();
        let board = Board::from_rows([0b1010101010; 20]);
        let queue = PieceQueue::new([catalog.find("O").unwrap()]);

        let result = search.find_best(&board, &queue).unwrap();
        assert!(result.is_game_over());
        assert_eq!(result.board, board);
        assert!(result.placement.is_none());
    }

    #[test]
    fn test_empty_queue() {
        let catalog = Arc::new(PieceCatalog::standard());
        let mut search = ParallelSearch::new(catalog, &config(1, 1)).unwrap();
        assert!(matches!(
            search.find_best(&Board::new(), &PieceQueue::default()),
            Err(SearchError::EmptyQueue)
        ));
    }

    #[test]
    fn test_scoped_search_matches_pool_and_sequential() {
        let catalog = Arc::new(PieceCatalog::standard());
        let config = config(2, 3);
        let mut pooled = ParallelSearch::new(Arc::clone(&catalog), &config).unwrap();
        let sequential = Lookahead::new(&catalog, &config.weights, config.lookahead);

        let board = Board::from_picture(
            "
            x.........
            xx..xxx.xx
            xxx.xxxxxx
            ",
        );
        for first in 0..catalog.len() {
            let queue = PieceQueue::new([first, (first + 1) % catalog.len()]);
            let scoped = find_best_scoped(&sequential, &board, &queue, 3).unwrap();
            assert_eq!(scoped, sequential.search(&board, &queue).unwrap());
            assert_eq!(scoped, pooled.find_best(&board, &queue).unwrap());
        }
    }

    #[test]
    fn test_scoped_search_game_over_and_errors() {
        let catalog = PieceCatalog::standard();
        let weights = ScoreWeights::default();
        let search = Lookahead::new(&catalog, &weights, 1);
        let board = Board::from_rows([0b1010101010; 20]);
        let queue = PieceQueue::new([catalog.find("O").unwrap()]);

        let result = find_best_scoped(&search, &board, &queue, 4).unwrap();
        assert!(result.is_game_over());
        assert_eq!(result.board, board);
        assert!(matches!(
            find_best_scoped(&search, &board, &PieceQueue::default(), 4),
            Err(SearchError::EmptyQueue)
        ));
    }

    #[test]
    fn test_candidate_ordering() {
        let low = Some(ScoreResult {
            score: -10.0,
            ..ScoreResult::game_over(&Board::new())
        });
        let dead = Some(ScoreResult::game_over(&Board::new()));
        assert_eq!(compare_candidates(&low, &dead), Ordering::Greater);
        assert_eq!(compare_candidates(&dead, &None), Ordering::Greater);
        assert_eq!(compare_candidates(&None, &None), Ordering::Equal);
    }
}
