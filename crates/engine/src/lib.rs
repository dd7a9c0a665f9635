//! Search engine - lookahead search, worker pipeline and game driver
//!
//! Built on the pure simulation in `tetris-lookahead-core`:
//!
//! - [`search`]: sequential depth-limited lookahead over the piece queue
//! - [`pipeline`]: generic bounded producer → worker pool → reducer
//! - [`orchestrator`]: the lookahead search split over a worker pool
//! - [`game`]: endless game loop with statistics and step reports
//! - [`config`]: search settings from defaults and the environment

pub mod config;
pub mod error;
pub mod game;
pub mod orchestrator;
pub mod pipeline;
pub mod search;

pub use tetris_lookahead_core as core;
pub use tetris_lookahead_types as types;

pub use config::SearchConfig;
pub use error::{ConfigError, PipelineError, SearchError};
pub use game::{Game, GameStats, StepReport};
pub use orchestrator::{find_best_scoped, ParallelSearch, SearchTask};
pub use pipeline::{reduce_scoped, Canceller, WorkerPool};
pub use search::{Lookahead, ScoreResult};
