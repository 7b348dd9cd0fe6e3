// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! S3 buckets and lifecycle rules

use crate::error::LakeResult;
use crate::naming::s3_url;
use crate::stack::Stack;
use crate::template::{LogicalId, Resource};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

pub const BUCKET_RESOURCE_TYPE: &str = "AWS::S3::Bucket";

/// Key prefix ending in exactly one `/`
pub fn normalize_prefix(prefix: &str) -> String {
    format!("{}/", prefix.trim_end_matches('/'))
}

/// Storage tier objects can transition to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StorageClass {
    StandardIa,
    OnezoneIa,
    IntelligentTiering,
    Glacier,
    GlacierIr,
    DeepArchive,
}

impl StorageClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageClass::StandardIa => "STANDARD_IA",
            StorageClass::OnezoneIa => "ONEZONE_IA",
            StorageClass::IntelligentTiering => "INTELLIGENT_TIERING",
            StorageClass::Glacier => "GLACIER",
            StorageClass::GlacierIr => "GLACIER_IR",
            StorageClass::DeepArchive => "DEEP_ARCHIVE",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub storage_class: StorageClass,
    #[serde(default)]
    pub transition_after_days: u32,
}

/// Expiration and tiering rule for objects under a prefix
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleRule {
    pub id: Option<String>,
    pub enabled: bool,
    /// Key prefix the rule applies to; overwritten when attached to a dataset
    pub prefix: Option<String>,
    pub expiration_days: Option<u32>,
    pub noncurrent_version_expiration_days: Option<u32>,
    pub abort_incomplete_multipart_upload_days: Option<u32>,
    pub transitions: Vec<Transition>,
}

impl Default for LifecycleRule {
    fn default() -> Self {
        Self {
            id: None,
            enabled: true,
            prefix: None,
            expiration_days: None,
            noncurrent_version_expiration_days: None,
            abort_incomplete_multipart_upload_days: None,
            transitions: Vec::new(),
        }
    }
}

impl LifecycleRule {
    /// Move objects to `storage_class` after `days`
    pub fn transition(storage_class: StorageClass, days: u32) -> Self {
        Self {
            transitions: vec![Transition {
                storage_class,
                transition_after_days: days,
            }],
            ..Self::default()
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Rule entry for `LifecycleConfiguration.Rules`
    pub fn to_cfn(&self) -> Value {
        let mut rule = Map::new();
        if let Some(id) = &self.id {
            rule.insert("Id".to_string(), json!(id));
        }
        rule.insert(
            "Status".to_string(),
            json!(if self.enabled { "Enabled" } else { "Disabled" }),
        );
        if let Some(prefix) = &self.prefix {
            rule.insert("Prefix".to_string(), json!(prefix));
        }
        if let Some(days) = self.expiration_days {
            rule.insert("ExpirationInDays".to_string(), json!(days));
        }
        if let Some(days) = self.noncurrent_version_expiration_days {
            rule.insert(
                "NoncurrentVersionExpiration".to_string(),
                json!({ "NoncurrentDays": days }),
            );
        }
        if let Some(days) = self.abort_incomplete_multipart_upload_days {
            rule.insert(
                "AbortIncompleteMultipartUpload".to_string(),
                json!({ "DaysAfterInitiation": days }),
            );
        }
        if !self.transitions.is_empty() {
            let transitions: Vec<Value> = self
                .transitions
                .iter()
                .map(|t| {
                    json!({
                        "StorageClass": t.storage_class.as_str(),
                        "TransitionInDays": t.transition_after_days,
                    })
                })
                .collect();
            rule.insert("Transitions".to_string(), Value::Array(transitions));
        }
        Value::Object(rule)
    }
}

/// Declared S3 bucket
///
/// The bucket is deleted with the stack. Lifecycle rules accumulate and the
/// bucket resource is re-rendered each time one is added.
#[derive(Debug)]
pub struct Bucket {
    stack: Stack,
    logical_id: LogicalId,
    name: String,
    lifecycle_rules: RwLock<Vec<LifecycleRule>>,
}

impl Bucket {
    pub fn new(stack: &Stack, path: &str, name: impl Into<String>) -> LakeResult<Self> {
        let name = name.into();
        let resource =
            Resource::new(BUCKET_RESOURCE_TYPE, render(&name, &[])).destroy_on_removal();
        let logical_id = stack.add_resource(path, resource)?;
        Ok(Self {
            stack: stack.clone(),
            logical_id,
            name,
            lifecycle_rules: RwLock::new(Vec::new()),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn logical_id(&self) -> &LogicalId {
        &self.logical_id
    }

    pub fn arn(&self) -> String {
        self.stack.arns().bucket(&self.name)
    }

    pub fn arn_for_objects(&self, key_pattern: &str) -> String {
        self.stack.arns().bucket_objects(&self.name, key_pattern)
    }

    pub fn s3_url_for_object(&self, key: &str) -> String {
        s3_url(&self.name, key)
    }

    pub fn add_lifecycle_rule(&self, rule: LifecycleRule) -> LakeResult<()> {
        let mut rules = self.lifecycle_rules.write();
        rules.push(rule);
        self.stack
            .replace_properties(&self.logical_id, render(&self.name, &rules))
    }

    pub fn lifecycle_rules(&self) -> Vec<LifecycleRule> {
        self.lifecycle_rules.read().clone()
    }
}

fn render(name: &str, rules: &[LifecycleRule]) -> Value {
    let mut properties = json!({ "BucketName": name });
    if !rules.is_empty() {
        properties["LifecycleConfiguration"] = json!({
            "Rules": rules.iter().map(LifecycleRule::to_cfn).collect::<Vec<_>>(),
        });
    }
    properties
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Environment;

    #[test]
    fn test_normalize_prefix_is_idempotent() {
        assert_eq!(normalize_prefix("logs"), "logs/");
        assert_eq!(normalize_prefix("logs/"), "logs/");
        assert_eq!(normalize_prefix(&normalize_prefix("logs")), "logs/");
        assert_eq!(normalize_prefix("logs//"), "logs/");
    }

    #[test]
    fn test_rule_rendering() {
        let rule = LifecycleRule {
            id: Some("tiering".to_string()),
            expiration_days: Some(365),
            noncurrent_version_expiration_days: Some(30),
            ..LifecycleRule::transition(StorageClass::IntelligentTiering, 0)
        }
        .with_prefix("logs/");

        assert_eq!(
            rule.to_cfn(),
            json!({
                "Id": "tiering",
                "Status": "Enabled",
                "Prefix": "logs/",
                "ExpirationInDays": 365,
                "NoncurrentVersionExpiration": { "NoncurrentDays": 30 },
                "Transitions": [
                    { "StorageClass": "INTELLIGENT_TIERING", "TransitionInDays": 0 }
                ]
            })
        );
    }

    #[test]
    fn test_rule_deserializes_with_defaults() {
        let rule: LifecycleRule = serde_json::from_str(
            r#"{ "transitions": [{ "storage_class": "GLACIER", "transition_after_days": 90 }] }"#,
        )
        .unwrap();
        assert!(rule.enabled);
        assert_eq!(rule.prefix, None);
        assert_eq!(rule.transitions[0].storage_class, StorageClass::Glacier);
    }

    #[test]
    fn test_bucket_accumulates_rules() {
        let stack = Stack::new("s", Environment::default());
        let bucket = Bucket::new(&stack, &stack.path("bucket"), "my-bucket").unwrap();
        assert_eq!(bucket.arn(), "arn:aws:s3:::my-bucket");
        assert_eq!(bucket.arn_for_objects("a/*"), "arn:aws:s3:::my-bucket/a/*");
        assert_eq!(bucket.s3_url_for_object("a"), "s3://my-bucket/a");

        bucket
            .add_lifecycle_rule(LifecycleRule::default().with_prefix("a/"))
            .unwrap();
        bucket
            .add_lifecycle_rule(LifecycleRule::default().with_prefix("b/"))
            .unwrap();

        let resource = stack.resource(bucket.logical_id()).unwrap();
        let rules = resource.properties["LifecycleConfiguration"]["Rules"]
            .as_array()
            .unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[1]["Prefix"], "b/");
        assert_eq!(resource.deletion_policy, Some(crate::template::DeletionPolicy::Delete));
    }
}
