// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Declaration document model
//!
//! A [`Template`] is the output of composition: a CloudFormation document the
//! external provisioning engine understands. Resources are keyed by logical id,
//! which is derived from the construct path of the declaring component.

use crate::error::{LakeError, LakeResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

pub const TEMPLATE_FORMAT_VERSION: &str = "2010-09-09";

/// Metadata key recording the construct path a resource was declared at
pub const PATH_METADATA_KEY: &str = "lakeform:path";

const MAX_HUMAN_PART: usize = 240;

/// CloudFormation logical id of a declared resource
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogicalId(String);

impl LogicalId {
    /// Derive a logical id from a construct path
    ///
    /// Non-alphanumeric characters are dropped and a CRC32 of the full path is
    /// appended, so distinct paths that sanitize to the same text stay distinct.
    pub fn from_path(path: &str) -> Self {
        let human: String = path
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .take(MAX_HUMAN_PART)
            .collect();
        let hash = crc32fast::hash(path.as_bytes());
        LogicalId(format!("{}{:08X}", human, hash))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LogicalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What happens to a resource when it leaves the template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeletionPolicy {
    Delete,
    Retain,
    Snapshot,
}

/// One declared resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Resource {
    #[serde(rename = "Type")]
    pub resource_type: String,

    pub properties: Value,

    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub depends_on: BTreeSet<LogicalId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deletion_policy: Option<DeletionPolicy>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_replace_policy: Option<DeletionPolicy>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, Value>,
}

impl Resource {
    pub fn new(resource_type: impl Into<String>, properties: Value) -> Self {
        Self {
            resource_type: resource_type.into(),
            properties,
            depends_on: BTreeSet::new(),
            deletion_policy: None,
            update_replace_policy: None,
            metadata: BTreeMap::new(),
        }
    }

    pub fn depends_on<'a, I>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = &'a LogicalId>,
    {
        self.depends_on.extend(ids.into_iter().cloned());
        self
    }

    /// Delete on removal and on replacement
    pub fn destroy_on_removal(mut self) -> Self {
        self.deletion_policy = Some(DeletionPolicy::Delete);
        self.update_replace_policy = Some(DeletionPolicy::Delete);
        self
    }

    /// Construct path recorded at declaration time
    pub fn path(&self) -> Option<&str> {
        self.metadata.get(PATH_METADATA_KEY).and_then(|v| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Export {
    pub name: String,
}

/// Template output value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Output {
    pub value: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export: Option<Export>,
}

/// CloudFormation template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Template {
    #[serde(rename = "AWSTemplateFormatVersion")]
    pub format_version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub resources: BTreeMap<LogicalId, Resource>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub outputs: BTreeMap<String, Output>,
}

impl Default for Template {
    fn default() -> Self {
        Self {
            format_version: TEMPLATE_FORMAT_VERSION.to_string(),
            description: None,
            resources: BTreeMap::new(),
            outputs: BTreeMap::new(),
        }
    }
}

impl Template {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a resource; a logical id may only be declared once
    pub fn insert(&mut self, id: LogicalId, resource: Resource) -> LakeResult<()> {
        if self.resources.contains_key(&id) {
            let path = resource.path().unwrap_or(id.as_str()).to_string();
            return Err(LakeError::DuplicateResource(path));
        }
        self.resources.insert(id, resource);
        Ok(())
    }

    pub fn get(&self, id: &LogicalId) -> Option<&Resource> {
        self.resources.get(id)
    }

    pub fn get_mut(&mut self, id: &LogicalId) -> LakeResult<&mut Resource> {
        self.resources
            .get_mut(id)
            .ok_or_else(|| LakeError::UnknownResource(id.to_string()))
    }

    pub fn contains(&self, id: &LogicalId) -> bool {
        self.resources.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// All resources of one CloudFormation type, in logical id order
    pub fn resources_of_type(&self, resource_type: &str) -> Vec<(&LogicalId, &Resource)> {
        self.resources
            .iter()
            .filter(|(_, r)| r.resource_type == resource_type)
            .collect()
    }

    /// Find the resource declared at `path`
    pub fn find_by_path(&self, path: &str) -> Option<(&LogicalId, &Resource)> {
        self.resources.iter().find(|(_, r)| r.path() == Some(path))
    }

    pub fn to_json_pretty(&self) -> LakeResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> LakeResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
