//! missions - semester missions CLI
//!
//! Complete tasks for coins, follow progress toward the semester goal, and
//! redeem coins for rewards.

use clap::Parser;
use missions::cli::Cli;
use missions::output::{command_name, emit_error};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() {
    // Tracing is opt-in via RUST_LOG; ignore invalid or huge filters.
    let filter = std::env::var("RUST_LOG")
        .ok()
        .and_then(|raw| {
            let raw = raw.trim();
            if raw.is_empty() || raw.len() > 4096 {
                return None;
            }
            EnvFilter::try_new(raw).ok()
        })
        .unwrap_or_else(|| EnvFilter::new("off"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let command = command_name(std::env::args().skip(1));
    let cli = Cli::parse();
    let json = cli.wants_json();
    if let Err(err) = cli.run() {
        let _ = emit_error(&command, &err, json);
        std::process::exit(err.exit_code());
    }
}
