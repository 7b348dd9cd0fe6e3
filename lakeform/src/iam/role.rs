// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! IAM role identity
//!
//! A [`Role`] is a shared handle: zones and datasets that grant access to the
//! same identity all append to one ordered list of attached policies.

use super::managed_policy::ManagedPolicy;
use super::policy::{Policy, PolicyStatement};
use super::principal::Principal;
use crate::error::{LakeError, LakeResult};
use crate::stack::{child_path, Stack};
use crate::storage::Bucket;
use crate::template::{Export, LogicalId, Output, Resource};
use parking_lot::RwLock;
use serde_json::{json, Value};
use std::sync::Arc;

pub const ROLE_RESOURCE_TYPE: &str = "AWS::IAM::Role";
pub const POLICY_RESOURCE_TYPE: &str = "AWS::IAM::Policy";
pub const INSTANCE_PROFILE_RESOURCE_TYPE: &str = "AWS::IAM::InstanceProfile";
pub const WORKGROUP_RESOURCE_TYPE: &str = "AWS::Athena::WorkGroup";

pub const ATHENA_ENGINE_VERSION: &str = "Athena engine version 2";

const MAX_ROLE_NAME_LEN: usize = 64;
const MAX_POLICY_NAME_LEN: usize = 128;

/// Construction parameters of a role
#[derive(Debug, Clone)]
pub struct RoleProps {
    pub role_name: String,
    pub assumed_by: Principal,
    pub description: Option<String>,
    pub managed_policy_arns: Vec<String>,
    /// Policies embedded in the role resource itself
    pub inline_policies: Vec<Policy>,
}

impl RoleProps {
    pub fn new(role_name: impl Into<String>, assumed_by: Principal) -> Self {
        Self {
            role_name: role_name.into(),
            assumed_by,
            description: None,
            managed_policy_arns: Vec::new(),
            inline_policies: Vec::new(),
        }
    }

    pub fn with_managed_policy(mut self, arn: impl Into<String>) -> Self {
        self.managed_policy_arns.push(arn.into());
        self
    }

    pub fn with_inline_policy(mut self, policy: Policy) -> Self {
        self.inline_policies.push(policy);
        self
    }
}

/// A policy attached to a role after construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachedPolicy {
    pub logical_id: LogicalId,
    pub name: String,
    pub statements: Vec<PolicyStatement>,
}

struct RoleState {
    managed_policy_arns: Vec<String>,
    attached: Vec<AttachedPolicy>,
    athena_workgroup: Option<String>,
    instance_profile: Option<LogicalId>,
}

struct RoleInner {
    stack: Stack,
    id: String,
    path: String,
    logical_id: LogicalId,
    role_name: String,
    assumed_by: Principal,
    description: Option<String>,
    inline_policies: Vec<Policy>,
    state: RwLock<RoleState>,
}

/// Shared handle on a declared IAM role
#[derive(Clone)]
pub struct Role {
    inner: Arc<RoleInner>,
}

impl std::fmt::Debug for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Role")
            .field("role_name", &self.inner.role_name)
            .field("logical_id", &self.inner.logical_id)
            .field("attached_policies", &self.inner.state.read().attached.len())
            .finish()
    }
}

pub(crate) fn validate_role_name(name: &str) -> LakeResult<()> {
    let valid_chars = name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "+=,.@_-".contains(c));
    if name.is_empty() || name.len() > MAX_ROLE_NAME_LEN || !valid_chars {
        return Err(LakeError::InvalidName(format!(
            "role name must be 1-{} characters of [A-Za-z0-9+=,.@_-], got '{}'",
            MAX_ROLE_NAME_LEN, name
        )));
    }
    Ok(())
}

impl Role {
    /// Declare a role at `scope/id`
    pub fn new(stack: &Stack, scope: &str, id: &str, props: RoleProps) -> LakeResult<Self> {
        validate_role_name(&props.role_name)?;

        let path = child_path(scope, id);
        let logical_id = LogicalId::from_path(&path);
        let role = Self {
            inner: Arc::new(RoleInner {
                stack: stack.clone(),
                id: id.to_string(),
                path: path.clone(),
                logical_id,
                role_name: props.role_name,
                assumed_by: props.assumed_by,
                description: props.description,
                inline_policies: props.inline_policies,
                state: RwLock::new(RoleState {
                    managed_policy_arns: props.managed_policy_arns,
                    attached: Vec::new(),
                    athena_workgroup: None,
                    instance_profile: None,
                }),
            }),
        };

        let properties = role.render(&role.inner.state.read());
        stack.add_resource(&path, Resource::new(ROLE_RESOURCE_TYPE, properties))?;
        log::info!("Declared role '{}'", role.inner.role_name);
        Ok(role)
    }

    pub fn id(&self) -> &str {
        &self.inner.id
    }

    pub fn path(&self) -> &str {
        &self.inner.path
    }

    pub fn role_name(&self) -> &str {
        &self.inner.role_name
    }

    pub fn logical_id(&self) -> &LogicalId {
        &self.inner.logical_id
    }

    pub fn arn(&self) -> String {
        self.inner.stack.arns().role(&self.inner.role_name)
    }

    pub fn assumed_by(&self) -> &Principal {
        &self.inner.assumed_by
    }

    pub fn inline_policies(&self) -> &[Policy] {
        &self.inner.inline_policies
    }

    pub fn managed_policy_arns(&self) -> Vec<String> {
        self.inner.state.read().managed_policy_arns.clone()
    }

    /// Policies attached since construction, in attachment order
    pub fn attached_policies(&self) -> Vec<AttachedPolicy> {
        self.inner.state.read().attached.clone()
    }

    /// All statements of attached policies, in attachment order
    pub fn statements(&self) -> Vec<PolicyStatement> {
        self.inner
            .state
            .read()
            .attached
            .iter()
            .flat_map(|p| p.statements.iter().cloned())
            .collect()
    }

    pub fn athena_workgroup(&self) -> Option<String> {
        self.inner.state.read().athena_workgroup.clone()
    }

    /// Attach a new inline policy declared at `scope/id`
    ///
    /// Every call declares a separate policy resource; existing policies are
    /// never modified.
    pub fn attach_inline_policy(
        &self,
        scope: &str,
        id: &str,
        policy: Policy,
    ) -> LakeResult<LogicalId> {
        let path = child_path(scope, id);
        if policy.statements.is_empty() {
            return Err(LakeError::InvalidConfiguration(format!(
                "policy at '{}' has no statements",
                path
            )));
        }

        let name = policy.name.clone().unwrap_or_else(|| {
            LogicalId::from_path(&path)
                .as_str()
                .chars()
                .take(MAX_POLICY_NAME_LEN)
                .collect()
        });
        let properties = json!({
            "PolicyName": name,
            "PolicyDocument": policy.document(),
            "Roles": [self.inner.role_name],
        });

        // Hold the state lock across declaration so attachment order matches
        // declaration order.
        let mut state = self.inner.state.write();
        let logical_id = self.inner.stack.add_resource(
            &path,
            Resource::new(POLICY_RESOURCE_TYPE, properties).depends_on([&self.inner.logical_id]),
        )?;
        log::debug!(
            "Attached policy '{}' with {} statements to role '{}'",
            name,
            policy.statements.len(),
            self.inner.role_name
        );
        state.attached.push(AttachedPolicy {
            logical_id: logical_id.clone(),
            name,
            statements: policy.statements,
        });
        Ok(logical_id)
    }

    /// Add a managed policy by ARN; adding the same ARN twice has no effect
    pub fn add_managed_policy_arn(&self, arn: impl Into<String>) -> LakeResult<()> {
        let arn = arn.into();
        let mut state = self.inner.state.write();
        if state.managed_policy_arns.contains(&arn) {
            return Ok(());
        }
        state.managed_policy_arns.push(arn);
        self.inner
            .stack
            .replace_properties(&self.inner.logical_id, self.render(&state))
    }

    /// Add an AWS managed policy such as `service-role/AWSGlueServiceRole`
    pub fn add_aws_managed_policy(&self, policy_name: &str) -> LakeResult<()> {
        let arn = self.inner.stack.arns().aws_managed_policy(policy_name);
        self.add_managed_policy_arn(arn)
    }

    /// Add a managed policy declared in the same stack
    pub fn attach_managed_policy(&self, policy: &ManagedPolicy) -> LakeResult<()> {
        self.add_managed_policy_arn(policy.arn())?;
        self.inner
            .stack
            .add_dependency(&self.inner.logical_id, policy.logical_id())
    }

    /// Give the role its own Athena workgroup with a private results bucket
    pub fn create_athena_workgroup(&self) -> LakeResult<String> {
        let stack = &self.inner.stack;
        let id = &self.inner.id;
        let role_name = &self.inner.role_name;

        let bucket = Bucket::new(
            stack,
            &child_path(&self.inner.path, &format!("{}.s3.athena-output", id)),
            format!("{}.athena-output", role_name).to_lowercase(),
        )?;

        let workgroup_name = format!("{}-workgroup", role_name);
        let properties = json!({
            "Name": workgroup_name,
            "Description": format!("Athena workgroup for data lake queries by '{}'.", role_name),
            "RecursiveDeleteOption": true,
            "State": "ENABLED",
            "WorkGroupConfiguration": {
                "EnforceWorkGroupConfiguration": false,
                "PublishCloudWatchMetricsEnabled": true,
                "RequesterPaysEnabled": false,
                "ResultConfiguration": {
                    "OutputLocation": format!("{}/", bucket.s3_url_for_object("")),
                },
                "EngineVersion": {
                    "SelectedEngineVersion": ATHENA_ENGINE_VERSION,
                },
            },
        });
        stack.add_resource(
            &child_path(&self.inner.path, &format!("{}.athena.workgroup", id)),
            Resource::new(WORKGROUP_RESOURCE_TYPE, properties).depends_on([bucket.logical_id()]),
        )?;

        self.attach_inline_policy(
            &self.inner.path,
            &format!("{}.iam.athena-bucket-access", id),
            Policy::named(
                "Athena-S3-Access",
                vec![
                    PolicyStatement::allow(
                        ["s3:GetBucketLocation", "s3:ListAllMyBuckets"],
                        ["*"],
                    ),
                    PolicyStatement::allow(["s3:ListBucket"], [bucket.arn()]),
                    PolicyStatement::allow(["s3:*"], [bucket.arn_for_objects("*")]),
                ],
            ),
        )?;

        self.inner.state.write().athena_workgroup = Some(workgroup_name.clone());
        log::info!("Declared Athena workgroup '{}'", workgroup_name);
        Ok(workgroup_name)
    }

    /// Declare an instance profile for the role and export the role ARN
    pub fn create_instance_profile(&self) -> LakeResult<LogicalId> {
        let stack = &self.inner.stack;
        let role_name = &self.inner.role_name;

        let profile = stack.add_resource(
            &child_path(
                &self.inner.path,
                &format!("{}.iam.instance-profile", self.inner.id),
            ),
            Resource::new(
                INSTANCE_PROFILE_RESOURCE_TYPE,
                json!({
                    "InstanceProfileName": role_name,
                    "Roles": [role_name],
                }),
            )
            .depends_on([&self.inner.logical_id]),
        )?;

        let output_name: String = format!("{}RoleArn", self.inner.id)
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();
        stack.add_output(
            output_name,
            Output {
                value: self.arn(),
                description: Some(format!(
                    "ARN of the role behind instance profile '{}'.",
                    role_name
                )),
                export: Some(Export {
                    name: format!("{}-{}-role-arn", stack.name(), self.inner.id),
                }),
            },
        )?;

        self.inner.state.write().instance_profile = Some(profile.clone());
        Ok(profile)
    }

    pub fn instance_profile(&self) -> Option<LogicalId> {
        self.inner.state.read().instance_profile.clone()
    }

    fn render(&self, state: &RoleState) -> Value {
        let inner = &self.inner;
        let mut properties = json!({
            "RoleName": inner.role_name,
            "AssumeRolePolicyDocument": inner.assumed_by.assume_role_policy(&inner.stack.arns()),
        });
        if let Some(description) = &inner.description {
            properties["Description"] = json!(description);
        }
        if !state.managed_policy_arns.is_empty() {
            properties["ManagedPolicyArns"] = json!(state.managed_policy_arns);
        }
        if !inner.inline_policies.is_empty() {
            let policies: Vec<Value> = inner
                .inline_policies
                .iter()
                .enumerate()
                .map(|(i, p)| p.to_role_entry(&format!("{}-Policy{}", inner.role_name, i)))
                .collect();
            properties["Policies"] = Value::Array(policies);
        }
        properties
    }
}
