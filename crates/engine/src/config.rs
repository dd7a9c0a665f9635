//! Search configuration
//!
//! Defaults come from the types crate; every value can be overridden through
//! environment variables:
//!
//! - `TETRIS_LOOKAHEAD`: pieces considered per search (default 3)
//! - `TETRIS_WORKERS`: worker threads (default: number of CPUs)
//! - `TETRIS_CHANNEL_CAPACITY`: bounded channel size (default 512)
//! - `TETRIS_WEIGHTS`: path to a JSON file with score weights
//!
//! Unlike a best-effort parse, a value that is present but invalid is an error:
//! the process should not start searching with a configuration it was not given.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::core::ScoreWeights;
use crate::error::ConfigError;
use crate::types::{DEFAULT_CHANNEL_CAPACITY, DEFAULT_LOOKAHEAD, MAX_LOOKAHEAD};

pub const ENV_LOOKAHEAD: &str = "TETRIS_LOOKAHEAD";
pub const ENV_WORKERS: &str = "TETRIS_WORKERS";
pub const ENV_CHANNEL_CAPACITY: &str = "TETRIS_CHANNEL_CAPACITY";
pub const ENV_WEIGHTS: &str = "TETRIS_WEIGHTS";

#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    /// Pieces considered before scoring a branch (1 = no lookahead)
    pub lookahead: usize,
    pub workers: usize,
    pub channel_capacity: usize,
    pub weights: ScoreWeights,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            lookahead: DEFAULT_LOOKAHEAD,
            workers: num_cpus::get(),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            weights: ScoreWeights::default(),
        }
    }
}

impl SearchConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from an arbitrary variable lookup (the environment in production)
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let config = Self {
            lookahead: parse_var(&lookup, ENV_LOOKAHEAD)?.unwrap_or(defaults.lookahead),
            workers: parse_var(&lookup, ENV_WORKERS)?.unwrap_or(defaults.workers),
            channel_capacity: parse_var(&lookup, ENV_CHANNEL_CAPACITY)?
                .unwrap_or(defaults.channel_capacity),
            weights: match lookup(ENV_WEIGHTS).map(|s| s.trim().to_string()) {
                Some(path) if !path.is_empty() => load_weights(path)?,
                _ => defaults.weights,
            },
        };

        config.validate()?;
        Ok(config)
    }

    pub fn with_lookahead(mut self, lookahead: usize) -> Self {
        self.lookahead = lookahead;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lookahead == 0 || self.lookahead > MAX_LOOKAHEAD {
            return Err(ConfigError::Lookahead {
                value: self.lookahead,
                max: MAX_LOOKAHEAD,
            });
        }
        if self.workers == 0 {
            return Err(ConfigError::Zero("workers"));
        }
        if self.channel_capacity == 0 {
            return Err(ConfigError::Zero("channel_capacity"));
        }

        let w = &self.weights;
        for (name, value) in [
            ("landing_height", w.landing_height),
            ("lines_cleared", w.lines_cleared),
            ("row_transitions", w.row_transitions),
            ("column_transitions", w.column_transitions),
            ("holes", w.holes),
            ("well_sums", w.well_sums),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::NonFiniteWeight(name));
            }
        }
        Ok(())
    }
}

/// Read score weights from a JSON file; missing fields keep their defaults
pub fn load_weights(path: impl AsRef<Path>) -> Result<ScoreWeights, ConfigError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| ConfigError::WeightsIo {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| ConfigError::WeightsFormat {
        path: path.display().to_string(),
        source,
    })
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<T>, ConfigError> {
    match lookup(var) {
        None => Ok(None),
        Some(raw) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            trimmed
                .parse()
                .map(Some)
                .map_err(|_| ConfigError::InvalidValue { var, value: raw })
        }
    }
}
