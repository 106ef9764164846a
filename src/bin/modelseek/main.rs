//! modelseek CLI binary.

mod args;
mod commands;
mod output;

use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::args::ModelseekArgs;

fn init_tracing(verbosity: u8) {
    let default_level = match verbosity {
        0 => "error",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let args = ModelseekArgs::parse();
    init_tracing(args.verbosity());

    if let Err(e) = commands::execute_command(args) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
