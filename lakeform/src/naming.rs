// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Naming contract and ARN construction
//!
//! Zone names and the lake name become Glue database identifiers that Athena
//! queries, so they are restricted to ASCII letters, digits and underscores and
//! must start with a letter.

use crate::config::Environment;
use crate::error::{LakeError, LakeResult};
use once_cell::sync::Lazy;
use regex::Regex;

static CATALOG_NAME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z][0-9A-Za-z_]+$").expect("catalog name pattern is a valid regex")
});

/// Returns true when `name` satisfies the catalog naming contract
pub fn is_valid_catalog_name(name: &str) -> bool {
    CATALOG_NAME_PATTERN.is_match(name)
}

/// Validate a name that will become a catalog database identifier
///
/// `kind` is only used for the error message ("zone", "lake", ...).
pub fn validate_catalog_name(kind: &str, name: &str) -> LakeResult<()> {
    if is_valid_catalog_name(name) {
        Ok(())
    } else {
        Err(LakeError::InvalidName(format!(
            "{} name must contain only alphanumerical characters and underscores \
             and start with a letter, got '{}'",
            kind, name
        )))
    }
}

/// Bucket name derived from a zone name: underscores become dashes, lowercase
pub fn bucket_name_for_zone(zone_name: &str) -> String {
    zone_name.replace('_', "-").to_lowercase()
}

/// ARN builders bound to one deployment environment
#[derive(Debug, Clone, Copy)]
pub struct Arns<'a> {
    env: &'a Environment,
}

impl<'a> Arns<'a> {
    pub fn new(env: &'a Environment) -> Self {
        Self { env }
    }

    pub fn bucket(&self, bucket: &str) -> String {
        format!("arn:{}:s3:::{}", self.env.partition, bucket)
    }

    pub fn bucket_objects(&self, bucket: &str, key_pattern: &str) -> String {
        format!("arn:{}:s3:::{}/{}", self.env.partition, bucket, key_pattern)
    }

    pub fn glue_database(&self, database: &str) -> String {
        format!(
            "arn:{}:glue:{}:{}:database/{}",
            self.env.partition, self.env.region, self.env.account, database
        )
    }

    pub fn role(&self, role_name: &str) -> String {
        format!(
            "arn:{}:iam::{}:role/{}",
            self.env.partition, self.env.account, role_name
        )
    }

    pub fn account_root(&self, account: &str) -> String {
        format!("arn:{}:iam::{}:root", self.env.partition, account)
    }

    pub fn customer_managed_policy(&self, policy_name: &str) -> String {
        format!(
            "arn:{}:iam::{}:policy/{}",
            self.env.partition, self.env.account, policy_name
        )
    }

    pub fn aws_managed_policy(&self, policy_name: &str) -> String {
        format!("arn:{}:iam::aws:policy/{}", self.env.partition, policy_name)
    }

    pub fn athena(&self, resource: &str) -> String {
        format!(
            "arn:{}:athena:{}:{}:{}",
            self.env.partition, self.env.region, self.env.account, resource
        )
    }
}

/// `s3://bucket/key` URL; an empty key yields the bucket root
pub fn s3_url(bucket: &str, key: &str) -> String {
    if key.is_empty() {
        format!("s3://{}", bucket)
    } else {
        format!("s3://{}/{}", bucket, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_catalog_names() {
        assert!(is_valid_catalog_name("vre_data_lake"));
        assert!(is_valid_catalog_name("Raw2"));
        assert!(is_valid_catalog_name("a_"));
    }

    #[test]
    fn test_invalid_catalog_names() {
        assert!(!is_valid_catalog_name(""));
        assert!(!is_valid_catalog_name("a"));
        assert!(!is_valid_catalog_name("1zone"));
        assert!(!is_valid_catalog_name("_zone"));
        assert!(!is_valid_catalog_name("vre-data-lake"));
        assert!(!is_valid_catalog_name("zone name"));
        assert!(!is_valid_catalog_name("zone\n"));
    }

    #[test]
    fn test_validate_reports_kind_and_name() {
        let err = validate_catalog_name("zone", "bad-zone").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("zone name"));
        assert!(message.contains("bad-zone"));
    }

    #[test]
    fn test_bucket_name_for_zone() {
        assert_eq!(bucket_name_for_zone("Vre_Data_consume"), "vre-data-consume");
    }

    #[test]
    fn test_arns() {
        let env = Environment::default();
        let arns = Arns::new(&env);
        assert_eq!(arns.bucket("b"), "arn:aws:s3:::b");
        assert_eq!(arns.bucket_objects("b", "a/*"), "arn:aws:s3:::b/a/*");
        assert_eq!(
            arns.glue_database("db"),
            format!("arn:aws:glue:{}:{}:database/db", env.region, env.account)
        );
        assert_eq!(
            arns.aws_managed_policy("AmazonAthenaFullAccess"),
            "arn:aws:iam::aws:policy/AmazonAthenaFullAccess"
        );
    }

    #[test]
    fn test_s3_url() {
        assert_eq!(s3_url("b", ""), "s3://b");
        assert_eq!(s3_url("b", "a/"), "s3://b/a/");
    }
}
