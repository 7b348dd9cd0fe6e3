// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Lakeform CLI entry point

use clap::Parser;
use colored::Colorize;

mod cli;
use cli::{Cli, Commands};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // -v/--verbose wins over --log-level; RUST_LOG still applies per module
    let log_level = if cli.verbose {
        log::LevelFilter::Debug
    } else if let Some(level) = cli.log_level {
        level.to_level_filter()
    } else {
        log::LevelFilter::Warn
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    match cli.command {
        Commands::Version => {
            println!("{} {}", "Lakeform".bold().green(), lakeform::VERSION);
            println!("Declarative data lakes for S3, Glue and Lake Formation");
            Ok(())
        }

        Commands::Synth { manifest, out } => cli::handle_synth(manifest, out),

        Commands::Plan { manifest, format } => cli::handle_plan(manifest, format),

        Commands::Validate { manifest } => cli::handle_validate(manifest),

        Commands::Classifiers => cli::handle_classifiers(),
    }
}
