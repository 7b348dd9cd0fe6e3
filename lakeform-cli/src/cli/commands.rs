// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Command-line arguments

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "lakeform")]
#[command(version)]
#[command(about = "Compose AWS data lakes into CloudFormation templates")]
#[command(long_about = "Lakeform composes a data lake described in a JSON manifest \
(zones, datasets, roles and grants) into a CloudFormation template.

The target account and region come from the manifest's `environment` block, or \
from LAKEFORM_ACCOUNT, LAKEFORM_REGION, LAKEFORM_PARTITION and LAKEFORM_CATALOG_ID \
when the manifest has none.

EXAMPLES:
  lakeform validate --manifest demos/vre_data_lake.json
  lakeform plan --manifest demos/vre_data_lake.json
  lakeform synth --manifest demos/vre_data_lake.json --out template.json")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log_level: Option<log::Level>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compose the manifest and write the template
    Synth {
        /// Lake manifest (JSON)
        #[arg(short, long, value_name = "FILE")]
        manifest: PathBuf,

        /// Output file; the template goes to stdout when omitted
        #[arg(short, long, value_name = "FILE")]
        out: Option<PathBuf>,
    },

    /// Show the resources the manifest declares, in deployment order
    Plan {
        /// Lake manifest (JSON)
        #[arg(short, long, value_name = "FILE")]
        manifest: PathBuf,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Check a manifest without composing it
    Validate {
        /// Lake manifest (JSON)
        #[arg(short, long, value_name = "FILE")]
        manifest: PathBuf,
    },

    /// List supported dataset filetypes and their Glue classifiers
    Classifiers,

    /// Show version information
    Version,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}
