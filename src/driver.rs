//! Command-line driver: argument parsing and the game loop behind the binary

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context as _, Result};
use log::{debug, info};

use crate::core::snapshot::{self, Context};
use crate::core::PieceCatalog;
use crate::engine::{Game, GameStats, SearchConfig};

/// How often the running loop logs statistics
const STATS_INTERVAL: Duration = Duration::from_secs(1);

pub const USAGE: &str = "\
usage: tetris-lookahead [options]

options:
  --steps N          stop after N pieces (default: run forever)
  --seed N           piece generator seed (default: time based)
  --pieces-dir DIR   load rotations from DIR/<piece>/<k>.txt
  --log FILE         write one JSON step report per line to FILE
  --dump-dir DIR     save the context of every game over into DIR
  --context FILE     search a saved context once and print the result

environment: TETRIS_LOOKAHEAD, TETRIS_WORKERS, TETRIS_CHANNEL_CAPACITY,
TETRIS_WEIGHTS (JSON file), RUST_LOG";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DriverConfig {
    pub steps: Option<u64>,
    pub seed: Option<u32>,
    pub pieces_dir: Option<PathBuf>,
    pub log_path: Option<PathBuf>,
    pub dump_dir: Option<PathBuf>,
    pub context: Option<PathBuf>,
}

/// Parse command-line arguments (without the program name).
///
/// `Ok(None)` when help was requested.
pub fn parse_driver_args(args: &[String]) -> Result<Option<DriverConfig>> {
    let mut config = DriverConfig::default();
    let mut i = 0usize;
    while i < args.len() {
        let flag = args[i].as_str();
        if matches!(flag, "-h" | "--help") {
            return Ok(None);
        }
        i += 1;
        let value = args
            .get(i)
            .ok_or_else(|| anyhow!("missing value for {}", flag));
        match flag {
            "--steps" => {
                let v = value?;
                config.steps = Some(
                    v.parse()
                        .map_err(|_| anyhow!("invalid --steps value: {}", v))?,
                );
            }
            "--seed" => {
                let v = value?;
                config.seed = Some(
                    v.parse()
                        .map_err(|_| anyhow!("invalid --seed value: {}", v))?,
                );
            }
            "--pieces-dir" => config.pieces_dir = Some(PathBuf::from(value?)),
            "--log" => config.log_path = Some(PathBuf::from(value?)),
            "--dump-dir" => config.dump_dir = Some(PathBuf::from(value?)),
            "--context" => config.context = Some(PathBuf::from(value?)),
            other => return Err(anyhow!("unknown argument: {}", other)),
        }
        i += 1;
    }
    Ok(Some(config))
}

/// Standard pieces, or the manifest loaded from `--pieces-dir`
pub fn load_catalog(config: &DriverConfig) -> Result<PieceCatalog> {
    match &config.pieces_dir {
        Some(dir) => PieceCatalog::load_dir(dir)
            .with_context(|| format!("failed to load pieces from {}", dir.display())),
        None => Ok(PieceCatalog::standard()),
    }
}

/// Run the configured mode to completion and return the final statistics
pub fn run(config: &DriverConfig, search: &SearchConfig) -> Result<GameStats> {
    let catalog = Arc::new(load_catalog(config)?);
    let seed = config.seed.unwrap_or_else(time_seed);
    let mut game = Game::new(Arc::clone(&catalog), search, seed).context("failed to start search")?;

    if let Some(path) = &config.context {
        let context = snapshot::load_context(path, &catalog)
            .with_context(|| format!("failed to load context {}", path.display()))?;
        let result = game.debug_context(&context)?;
        println!("{}", result.board);
        println!("score: {}", result.score);
        return Ok(game.stats().clone());
    }

    let mut log = match &config.log_path {
        Some(path) => Some(BufWriter::new(
            File::create(path).with_context(|| format!("failed to create {}", path.display()))?,
        )),
        None => None,
    };
    if let Some(dir) = &config.dump_dir {
        fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
    }

    let started = Instant::now();
    let mut last_report = Instant::now();
    let mut placed_since_report = 0u64;

    while config.steps.map_or(true, |steps| game.stats().steps < steps) {
        let before = config.dump_dir.as_ref().map(|_| Context {
            board: game.board().clone(),
            piece: game.queue().front().unwrap_or_default(),
        });

        let report = game.step()?;
        placed_since_report += 1;

        if let Some(writer) = log.as_mut() {
            serde_json::to_writer(&mut *writer, &report)?;
            writer.write_all(b"\n")?;
        }

        if report.game_over {
            if let (Some(dir), Some(context)) = (&config.dump_dir, before) {
                let path = dir.join(format!("death-{}.txt", game.stats().deaths));
                snapshot::save_context(&path, &context, &catalog)?;
                info!("saved game-over context to {}", path.display());
            }
        }

        if last_report.elapsed() >= STATS_INTERVAL {
            let rate = placed_since_report as f64 / last_report.elapsed().as_secs_f64();
            log_stats(game.stats(), rate);
            debug!("\n{}", game.board());
            last_report = Instant::now();
            placed_since_report = 0;
        }
    }

    if let Some(mut writer) = log {
        writer.flush()?;
    }
    let rate = game.stats().steps as f64 / started.elapsed().as_secs_f64().max(f64::EPSILON);
    log_stats(game.stats(), rate);
    Ok(game.stats().clone())
}

fn log_stats(stats: &GameStats, pieces_per_sec: f64) {
    info!(
        "{} pieces ({:.1}/s), {} deaths, {} lines, avg {:.1} pieces/game, avg score {:.3}",
        stats.steps,
        pieces_per_sec,
        stats.deaths,
        stats.total_lines,
        stats.avg_pieces_per_game(),
        stats.avg_score()
    );
}

fn time_seed() -> u32 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_or(1, |d| d.as_secs() as u32 ^ d.subsec_nanos())
}
