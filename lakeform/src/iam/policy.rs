// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! IAM policy statements and documents

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const POLICY_LANGUAGE_VERSION: &str = "2012-10-17";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Effect {
    Allow,
    Deny,
}

/// One statement of an IAM policy document
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyStatement {
    pub effect: Effect,

    #[serde(rename = "Action")]
    pub actions: Vec<String>,

    #[serde(rename = "Resource")]
    pub resources: Vec<String>,
}

impl PolicyStatement {
    pub fn allow<A, R>(actions: A, resources: R) -> Self
    where
        A: IntoIterator,
        A::Item: Into<String>,
        R: IntoIterator,
        R::Item: Into<String>,
    {
        Self {
            effect: Effect::Allow,
            actions: actions.into_iter().map(Into::into).collect(),
            resources: resources.into_iter().map(Into::into).collect(),
        }
    }

    pub fn has_action(&self, action: &str) -> bool {
        self.actions.iter().any(|a| a == action)
    }

    /// True when an allowed action pattern covers `action` (IAM `*` wildcards)
    pub fn allows_action(&self, action: &str) -> bool {
        self.effect == Effect::Allow && self.actions.iter().any(|a| wildcard_match(a, action))
    }
}

/// Match `value` against an IAM pattern where `*` stands for any sequence
///
/// Action names are case-insensitive in IAM, so matching ignores ASCII case.
pub fn wildcard_match(pattern: &str, value: &str) -> bool {
    let pattern = pattern.to_ascii_lowercase();
    let value = value.to_ascii_lowercase();
    let parts: Vec<&str> = pattern.split('*').collect();
    if parts.len() == 1 {
        return pattern == value;
    }

    let (first, last) = (parts[0], parts[parts.len() - 1]);
    if !value.starts_with(first) || value.len() < first.len() + last.len() {
        return false;
    }
    if !value[first.len()..].ends_with(last) {
        return false;
    }

    let mut rest = &value[first.len()..value.len() - last.len()];
    for part in &parts[1..parts.len() - 1] {
        match rest.find(part) {
            Some(pos) => rest = &rest[pos + part.len()..],
            None => return false,
        }
    }
    true
}

/// Policy document as IAM expects it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
    pub version: String,

    #[serde(rename = "Statement")]
    pub statements: Vec<PolicyStatement>,
}

impl PolicyDocument {
    pub fn new(statements: Vec<PolicyStatement>) -> Self {
        Self {
            version: POLICY_LANGUAGE_VERSION.to_string(),
            statements,
        }
    }
}

/// Inline policy; unnamed policies take their name from the declaring path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Policy {
    pub name: Option<String>,
    pub statements: Vec<PolicyStatement>,
}

impl Policy {
    pub fn new(statements: Vec<PolicyStatement>) -> Self {
        Self {
            name: None,
            statements,
        }
    }

    pub fn named(name: impl Into<String>, statements: Vec<PolicyStatement>) -> Self {
        Self {
            name: Some(name.into()),
            statements,
        }
    }

    pub fn document(&self) -> PolicyDocument {
        PolicyDocument::new(self.statements.clone())
    }

    /// Entry for a role's `Policies` property
    pub(crate) fn to_role_entry(&self, fallback_name: &str) -> Value {
        json!({
            "PolicyName": self.name.as_deref().unwrap_or(fallback_name),
            "PolicyDocument": self.document(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statement_serialization() {
        let statement = PolicyStatement::allow(["s3:ListBucket"], ["arn:aws:s3:::b"]);
        let value = serde_json::to_value(&statement).unwrap();
        assert_eq!(
            value,
            json!({
                "Effect": "Allow",
                "Action": ["s3:ListBucket"],
                "Resource": ["arn:aws:s3:::b"]
            })
        );
    }

    #[test]
    fn test_wildcard_match() {
        assert!(wildcard_match("glue:*Table*", "glue:UpdateTable"));
        assert!(wildcard_match("glue:*Table*", "glue:GetTables"));
        assert!(wildcard_match("s3:*", "s3:GetObject"));
        assert!(wildcard_match("*", "anything"));
        assert!(wildcard_match("s3:getobject", "s3:GetObject"));
        assert!(!wildcard_match("glue:*Table*", "glue:GetDatabase"));
        assert!(!wildcard_match("s3:GetObject", "s3:GetObjectVersion"));
        assert!(!wildcard_match("a*a", "a"));
    }

    #[test]
    fn test_allows_action() {
        let statement = PolicyStatement::allow(["glue:*Partition*"], ["*"]);
        assert!(statement.allows_action("glue:BatchGetPartition"));
        assert!(!statement.allows_action("glue:GetTable"));
    }

    #[test]
    fn test_document_version() {
        let doc = Policy::new(vec![PolicyStatement::allow(["s3:*"], ["*"])]).document();
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["Version"], "2012-10-17");
        assert_eq!(value["Statement"][0]["Action"][0], "s3:*");
    }

    #[test]
    fn test_role_entry_falls_back_to_given_name() {
        let unnamed = Policy::new(vec![PolicyStatement::allow(["s3:*"], ["*"])]);
        assert_eq!(unnamed.to_role_entry("Fallback")["PolicyName"], "Fallback");

        let named = Policy::named("Explicit", unnamed.statements.clone());
        assert_eq!(named.to_role_entry("Fallback")["PolicyName"], "Explicit");
    }
}
