// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! lakeform - declarative AWS data lakes
//!
//! lakeform composes a data lake (S3 zones, Glue catalog databases, tables and
//! crawlers, Lake Formation grants and the IAM roles tying them together) into
//! a CloudFormation template. Nothing is deployed; the template is handed to
//! the provisioning engine.
//!
//! # Features
//!
//! - **Zones**: one bucket, one catalog database and one crawler role per zone
//! - **Datasets**: a prefix registered with Lake Formation, with an empty table
//!   and a crawler that discovers its schema
//! - **Symbolic grants**: database and table permissions compiled into the IAM
//!   statements each enforcement point needs
//! - **Explicit ordering**: dependencies are recorded as edges and checked for
//!   cycles before synthesis
//!
//! # Usage
//!
//! Most deployments are described in a JSON manifest and synthesized with the
//! CLI:
//!
//! ```bash
//! lakeform synth --manifest demos/vre_data_lake.json --out template.json
//! lakeform plan --manifest demos/vre_data_lake.json
//! ```

pub mod config;
pub mod dataset;
pub mod error;
pub mod filetype;
pub mod glue;
pub mod graph;
pub mod iam;
pub mod lakeformation;
pub mod manifest;
pub mod naming;
pub mod permissions;
pub mod stack;
pub mod storage;
pub mod template;
pub mod zone;

pub use config::{Environment, LakeConfig};
pub use dataset::{Dataset, DatasetProps};
pub use error::{LakeError, LakeResult};
pub use filetype::Filetype;
pub use glue::{Classifier, CrawlerSchedule, CsvClassifierProps};
pub use graph::DependencyGraph;
pub use iam::{ManagedPolicy, Policy, PolicyStatement, Principal, Role, RoleProps};
pub use manifest::LakeManifest;
pub use permissions::{DatabasePermission, TablePermission};
pub use stack::Stack;
pub use storage::{LifecycleRule, StorageClass};
pub use template::{LogicalId, Resource, Template};
pub use zone::Zone;

/// lakeform version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// lakeform crate name
pub const CRATE_NAME: &str = env!("CARGO_PKG_NAME");
