//! p5magic CLI library — the cell-magic invocation surface.
//!
//! A notebook kernel wrapper calls `p5magic run <line>` / `p5magic gen
//! <line>` with the cell body on stdin and renders what comes back on stdout.

mod cli;
pub mod commands;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use commands::magic::{run_magic, MagicInvocation};
use p5magic_serve::DisplayMode;

/// Run the CLI — parses args and dispatches to the magic handlers.
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    p5magic_core::observability::init_tracing();

    match cli.command {
        Commands::Run {
            args,
            line,
            cell,
            json,
        } => run_magic(
            &MagicInvocation {
                args,
                line,
                cell,
                json,
            },
            DisplayMode::Frame,
        ),
        Commands::Gen {
            args,
            line,
            cell,
            json,
        } => run_magic(
            &MagicInvocation {
                args,
                line,
                cell,
                json,
            },
            DisplayMode::Preview,
        ),
    }
}
