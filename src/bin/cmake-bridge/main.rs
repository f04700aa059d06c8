//! cmake-bridge CLI - build external CMake projects for a consuming build

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cmake_bridge::util::ExternalBuildError;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        if let Some(suggestion) = e
            .downcast_ref::<ExternalBuildError>()
            .and_then(ExternalBuildError::suggestion)
        {
            eprintln!();
            eprintln!("{}", suggestion);
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    // Parse CLI
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("cmake_bridge=debug")
    } else {
        EnvFilter::new("cmake_bridge=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    // Ctrl-C kills the running external process instead of orphaning it
    let cancel = Arc::new(AtomicBool::new(false));
    {
        let cancel = Arc::clone(&cancel);
        if let Err(e) = ctrlc::set_handler(move || cancel.store(true, Ordering::SeqCst)) {
            tracing::warn!("failed to install Ctrl-C handler: {}", e);
        }
    }

    // Execute command
    match cli.command {
        Commands::Build(args) => commands::build::execute(args, cancel),
        Commands::Manifest(args) => commands::manifest::execute(args),
        Commands::Toolchain(args) => commands::toolchain::execute(args),
        Commands::Clean(args) => commands::clean::execute(args),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
