// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! CLI module for Lakeform
//!
//! Loads a lake manifest, composes it and writes or summarizes the resulting
//! CloudFormation template.

pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{Cli, Commands};
pub use handlers::{handle_classifiers, handle_plan, handle_synth, handle_validate};
