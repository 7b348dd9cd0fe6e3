// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Deployment configuration
//!
//! The account, region, partition and catalog id are supplied from outside the
//! composition and substituted into resource names and ARNs.

use crate::error::{LakeError, LakeResult};
use crate::naming::validate_catalog_name;
use serde::{Deserialize, Serialize};

pub const ENV_ACCOUNT: &str = "LAKEFORM_ACCOUNT";
pub const ENV_REGION: &str = "LAKEFORM_REGION";
pub const ENV_PARTITION: &str = "LAKEFORM_PARTITION";
pub const ENV_CATALOG_ID: &str = "LAKEFORM_CATALOG_ID";

/// Target AWS environment for a composed template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    /// 12-digit AWS account id
    pub account: String,

    /// Region, e.g. `us-east-1`
    pub region: String,

    /// ARN partition (`aws`, `aws-cn`, `aws-us-gov`)
    #[serde(default = "default_partition")]
    pub partition: String,

    /// Glue Data Catalog id; the account id unless stated otherwise
    #[serde(default)]
    pub catalog_id: Option<String>,
}

fn default_partition() -> String {
    "aws".to_string()
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            account: "123456789012".to_string(),
            region: "us-east-1".to_string(),
            partition: default_partition(),
            catalog_id: None,
        }
    }
}

impl Environment {
    pub fn new(account: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            region: region.into(),
            ..Self::default()
        }
    }

    pub fn with_catalog_id(mut self, catalog_id: impl Into<String>) -> Self {
        self.catalog_id = Some(catalog_id.into());
        self
    }

    /// Build from process environment variables, falling back to defaults
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            account: lookup(ENV_ACCOUNT).unwrap_or(defaults.account),
            region: lookup(ENV_REGION).unwrap_or(defaults.region),
            partition: lookup(ENV_PARTITION).unwrap_or(defaults.partition),
            catalog_id: lookup(ENV_CATALOG_ID).or(defaults.catalog_id),
        }
    }

    /// Effective Glue catalog id
    pub fn catalog_id(&self) -> &str {
        self.catalog_id.as_deref().unwrap_or(&self.account)
    }

    pub fn validate(&self) -> LakeResult<()> {
        if !is_account_id(&self.account) {
            return Err(LakeError::InvalidConfiguration(format!(
                "account must be a 12-digit id, got '{}'",
                self.account
            )));
        }
        if !is_account_id(self.catalog_id()) {
            return Err(LakeError::InvalidConfiguration(format!(
                "catalog id must be a 12-digit id, got '{}'",
                self.catalog_id()
            )));
        }
        if self.region.trim().is_empty() {
            return Err(LakeError::InvalidConfiguration(
                "region must not be empty".to_string(),
            ));
        }
        if self.partition.trim().is_empty() {
            return Err(LakeError::InvalidConfiguration(
                "partition must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

fn is_account_id(value: &str) -> bool {
    value.len() == 12 && value.bytes().all(|b| b.is_ascii_digit())
}

/// Top-level configuration of one data lake deployment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LakeConfig {
    /// Lake name; prefixes every zone's database name
    pub lake_name: String,

    /// Stack name used for construct paths and export names
    pub stack_name: String,

    /// Target environment
    pub environment: Environment,

    /// Template description
    pub description: Option<String>,
}

impl LakeConfig {
    pub fn new(lake_name: impl Into<String>) -> Self {
        let lake_name = lake_name.into();
        Self {
            stack_name: lake_name.replace('_', "-"),
            lake_name,
            environment: Environment::default(),
            description: None,
        }
    }

    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    pub fn with_stack_name(mut self, stack_name: impl Into<String>) -> Self {
        self.stack_name = stack_name.into();
        self
    }

    /// Full zone name for a zone suffix: `{lake_name}_{suffix}`
    pub fn zone_name(&self, suffix: &str) -> String {
        format!("{}_{}", self.lake_name, suffix)
    }

    pub fn validate(&self) -> LakeResult<()> {
        validate_catalog_name("lake", &self.lake_name)?;
        if self.stack_name.trim().is_empty() {
            return Err(LakeError::InvalidConfiguration(
                "stack name must not be empty".to_string(),
            ));
        }
        self.environment.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_environment_is_valid() {
        assert!(Environment::default().validate().is_ok());
    }

    #[test]
    fn test_catalog_id_defaults_to_account() {
        let env = Environment::new("111122223333", "eu-west-1");
        assert_eq!(env.catalog_id(), "111122223333");

        let env = env.with_catalog_id("444455556666");
        assert_eq!(env.catalog_id(), "444455556666");
    }

    #[test]
    fn test_from_lookup() {
        let vars: HashMap<&str, &str> = [
            (ENV_ACCOUNT, "265456890698"),
            (ENV_REGION, "ca-central-1"),
            (ENV_CATALOG_ID, "999988887777"),
        ]
        .into_iter()
        .collect();

        let env = Environment::from_lookup(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(env.account, "265456890698");
        assert_eq!(env.region, "ca-central-1");
        assert_eq!(env.partition, "aws");
        assert_eq!(env.catalog_id(), "999988887777");
    }

    #[test]
    fn test_invalid_account() {
        let env = Environment::new("12345", "us-east-1");
        assert!(matches!(
            env.validate(),
            Err(LakeError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_empty_region() {
        let env = Environment::new("123456789012", " ");
        assert!(env.validate().is_err());
    }

    #[test]
    fn test_lake_config_names() {
        let config = LakeConfig::new("vre_data_lake");
        assert_eq!(config.stack_name, "vre-data-lake");
        assert_eq!(config.zone_name("consume"), "vre_data_lake_consume");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_lake_config_rejects_bad_lake_name() {
        let config = LakeConfig::new("vre-data-lake");
        assert!(matches!(config.validate(), Err(LakeError::InvalidName(_))));
    }
}
