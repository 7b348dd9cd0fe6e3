// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Customer managed policies

use super::policy::{PolicyDocument, PolicyStatement};
use crate::error::{LakeError, LakeResult};
use crate::stack::Stack;
use crate::template::{LogicalId, Resource};
use serde_json::json;

pub const MANAGED_POLICY_RESOURCE_TYPE: &str = "AWS::IAM::ManagedPolicy";

const ATHENA_WORKGROUP_ACTIONS: [&str; 14] = [
    "athena:CreateNamedQuery",
    "athena:DeleteNamedQuery",
    "athena:GetNamedQuery",
    "athena:GetQueryExecution",
    "athena:GetQueryResults",
    "athena:GetQueryResultsStream",
    "athena:GetWorkGroup",
    "athena:ListNamedQueries",
    "athena:ListQueryExecutions",
    "athena:ListTagsForResource",
    "athena:StartQueryExecution",
    "athena:StopQueryExecution",
    "athena:TagResource",
    "athena:UntagResource",
];

const ATHENA_CATALOG_ACTIONS: [&str; 9] = [
    "athena:GetDataCatalog",
    "athena:GetDatabase",
    "athena:GetTableMetadata",
    "athena:ListDataCatalogs",
    "athena:ListDatabases",
    "athena:ListTableMetadata",
    "athena:ListTagsForResource",
    "athena:TagResource",
    "athena:UntagResource",
];

const ATHENA_LISTING_ACTIONS: [&str; 2] = ["athena:ListEngineVersions", "athena:ListWorkGroups"];

const GLUE_READ_ACTIONS: [&str; 7] = [
    "glue:GetDatabase",
    "glue:GetDatabases",
    "glue:GetTable",
    "glue:GetTables",
    "glue:GetPartition",
    "glue:GetPartitions",
    "glue:BatchGetPartition",
];

/// Standalone policy that any number of roles can reference by ARN
#[derive(Debug, Clone)]
pub struct ManagedPolicy {
    name: String,
    arn: String,
    logical_id: LogicalId,
    statements: Vec<PolicyStatement>,
}

impl ManagedPolicy {
    pub fn new(
        stack: &Stack,
        path: &str,
        name: impl Into<String>,
        description: Option<String>,
        statements: Vec<PolicyStatement>,
    ) -> LakeResult<Self> {
        let name = name.into();
        if statements.is_empty() {
            return Err(LakeError::InvalidConfiguration(format!(
                "managed policy '{}' has no statements",
                name
            )));
        }

        let mut properties = json!({
            "ManagedPolicyName": name,
            "PolicyDocument": PolicyDocument::new(statements.clone()),
        });
        if let Some(description) = description {
            properties["Description"] = json!(description);
        }
        let logical_id =
            stack.add_resource(path, Resource::new(MANAGED_POLICY_RESOURCE_TYPE, properties))?;

        Ok(Self {
            arn: stack.arns().customer_managed_policy(&name),
            name,
            logical_id,
            statements,
        })
    }

    /// Query access through any Athena workgroup and read access to the catalog
    ///
    /// Roles that query the lake with their own workgroup reference this policy.
    pub fn athena_access(stack: &Stack) -> LakeResult<Self> {
        let arns = stack.arns();
        Self::new(
            stack,
            &stack.path("iam.policy.athena-access"),
            format!("{}-Athena-Access", stack.name()),
            Some("Allows access to Athena for querying data.".to_string()),
            vec![
                PolicyStatement::allow(ATHENA_WORKGROUP_ACTIONS, [arns.athena("workgroup/*")]),
                PolicyStatement::allow(ATHENA_CATALOG_ACTIONS, [arns.athena("datacatalog/*")]),
                PolicyStatement::allow(ATHENA_LISTING_ACTIONS, ["*"]),
                PolicyStatement::allow(GLUE_READ_ACTIONS, ["*"]),
            ],
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arn(&self) -> &str {
        &self.arn
    }

    pub fn logical_id(&self) -> &LogicalId {
        &self.logical_id
    }

    pub fn statements(&self) -> &[PolicyStatement] {
        &self.statements
    }
}
