// src/main.rs
use clap::Parser;
use crossterm::style::Stylize;
use embr::app_state::AppState;
use embr::cli::args::Cli;
use embr::domain::instrumentation::TracingTracker;
use embr::exitcode;
use std::sync::Arc;
use tracing::{debug, info, instrument};
use tracing_subscriber::{
    filter::{filter_fn, LevelFilter},
    fmt::{self, format::FmtSpan},
    prelude::*,
};

#[instrument]
fn main() {
    // stdout carries vector output for downstream processes; all human
    // diagnostics go to stderr
    let cli = Cli::parse();

    setup_logging(cli.debug);

    // Load configuration with CLI overrides into the global state
    let config_path_ref = cli.config.as_deref();
    let app_state = AppState::new_with_config_file(Arc::new(TracingTracker), config_path_ref);
    if let Err(e) = AppState::update_global(app_state) {
        eprintln!("{}: {}", "Failed to initialize application state".red(), e);
        std::process::exit(exitcode::USAGE);
    }

    if let Err(e) = embr::cli::execute_command(cli) {
        eprintln!("{}", format!("Error: {}", e).red());
        std::process::exit(exitcode::USAGE);
    }
}

fn setup_logging(verbosity: u8) {
    debug!("INIT: Attempting logger init from main.rs");

    let filter = match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        3 => LevelFilter::TRACE,
        _ => {
            eprintln!("Don't be crazy, max is -d -d -d");
            LevelFilter::TRACE
        }
    };

    // Create a noisy module filter
    let noisy_modules = ["reqwest", "mio", "want", "hyper_util", "ort", "tokenizers"];
    let module_filter = filter_fn(move |metadata| {
        !noisy_modules
            .iter()
            .any(|name| metadata.target().starts_with(name))
    });

    // Create a subscriber with formatted output directed to stderr
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .with_span_events(FmtSpan::CLOSE);

    // Apply filters to the layer
    let filtered_layer = fmt_layer.with_filter(filter).with_filter(module_filter);

    tracing_subscriber::registry().with(filtered_layer).init();

    // Log initial debug level
    match filter {
        LevelFilter::INFO => info!("Debug mode: info"),
        LevelFilter::DEBUG => debug!("Debug mode: debug"),
        LevelFilter::TRACE => debug!("Debug mode: trace"),
        _ => {}
    }
}
