mod api;
mod cleanup;
mod cli;
mod config;
mod create;
mod goal;
mod model;
mod pattern;
mod retry;
mod storage;

use std::process;

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    init_tracing();

    if let Err(e) = cli::run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

/// Progress and failures go to stderr. `RUST_LOG` overrides the `info` default.
fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
