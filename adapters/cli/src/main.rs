#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays Maze Escape levels headlessly.

mod config;
mod input;
mod levels;
mod logging;
mod session;

use std::{io, ops::ControlFlow, path::PathBuf};

use anyhow::Result;
use clap::Parser;
use maze_escape_rendering::{Palette, Presentation, RenderingBackend, TextBackend};

use crate::{
    input::MoveScript,
    session::{Session, SessionOptions, TICK_DURATION},
};

/// Escape tile mazes before the enemies or the clock catch you.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML file overriding gameplay tuning
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// TOML level pack replacing the built-in levels
    #[arg(long, value_name = "PATH")]
    levels: Option<PathBuf>,
    /// Zero-based index of the first level to play
    #[arg(long, default_value_t = 0)]
    level: usize,
    /// Seed for enemy decisions
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Maximum number of ticks to simulate
    #[arg(long, default_value_t = 36_000)]
    ticks: u64,
    /// Per-tick moves (U, D, L, R or . to idle), repeated when exhausted
    #[arg(long, default_value = ".")]
    moves: String,
    /// Print the final frame as text
    #[arg(long)]
    render: bool,
    /// Also print every Nth frame while playing
    #[arg(long, value_name = "N", default_value_t = 0)]
    render_every: u64,
    /// Advance to the next level on a win and retry on a loss
    #[arg(long)]
    campaign: bool,
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Entry point for the Maze Escape command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.verbose);

    let config = config::load(args.config.as_deref())?;
    let levels = match args.levels.as_deref() {
        Some(path) => levels::load_pack(path)?,
        None => levels::builtin()?,
    };
    let script = MoveScript::parse(&args.moves)?;
    let mut session = Session::new(
        config,
        levels,
        args.level,
        script,
        SessionOptions {
            seed: args.seed,
            max_ticks: args.ticks,
            campaign: args.campaign,
        },
    )?;

    if args.render || args.render_every > 0 {
        let presentation = Presentation::new(
            session.banner(),
            Palette::default().floor,
            session.scene()?,
        );
        let backend = TextBackend::new(io::stdout().lock(), TICK_DURATION, args.render_every);
        let mut failure = None;
        backend.run(presentation, |_, scene| match session.advance(scene) {
            Ok(flow) => flow,
            Err(error) => {
                failure = Some(error);
                ControlFlow::Break(())
            }
        })?;
        if let Some(error) = failure {
            return Err(error);
        }
    } else {
        while session.step()?.0.is_continue() {}
    }

    println!("{}", session.report());
    Ok(())
}
