//! Autonomous Tetris runner (default binary).
//!
//! Plays an endless game with the parallel lookahead search and logs
//! statistics through `env_logger` (`RUST_LOG`, default `info`).

use std::process::ExitCode;

use anyhow::{Context, Result};
use log::error;

use tetris_lookahead::driver::{self, USAGE};
use tetris_lookahead::engine::SearchConfig;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(config) = driver::parse_driver_args(&args)? else {
        println!("{USAGE}");
        return Ok(());
    };
    let search = SearchConfig::from_env().context("invalid search configuration")?;
    driver::run(&config, &search)?;
    Ok(())
}
