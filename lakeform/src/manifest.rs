// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Lake manifest: the declarative description a stack is composed from
//!
//! A manifest names roles, classifiers, zones and datasets and the grants
//! between them. [`LakeManifest::validate`] checks every cross reference
//! before [`LakeManifest::compose`] declares anything.

use crate::config::{Environment, LakeConfig};
use crate::dataset::{Dataset, DatasetProps};
use crate::error::{LakeError, LakeResult};
use crate::filetype::Filetype;
use crate::glue::{Classifier, CrawlerSchedule, CsvClassifierProps};
use crate::iam::role::validate_role_name;
use crate::iam::{ManagedPolicy, Policy, PolicyStatement, Principal, Role, RoleProps};
use crate::naming::validate_catalog_name;
use crate::permissions::{DatabasePermission, TablePermission};
use crate::stack::Stack;
use crate::storage::LifecycleRule;
use crate::zone::Zone;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

/// Id of the registration role created when the manifest names none
pub const DEFAULT_REGISTRATION_ROLE_ID: &str = "lake-service";

/// Inline policy attached to a role at composition time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlinePolicySpec {
    #[serde(default)]
    pub name: Option<String>,
    pub statements: Vec<PolicyStatement>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleSpec {
    pub id: String,
    /// Defaults to `{stack_name}-{id}`
    #[serde(default)]
    pub role_name: Option<String>,
    pub assumed_by: Principal,
    #[serde(default)]
    pub description: Option<String>,
    /// AWS managed policy names, e.g. `service-role/AmazonElasticMapReduceRole`
    #[serde(default)]
    pub managed_policies: Vec<String>,
    #[serde(default)]
    pub policies: Vec<InlinePolicySpec>,
    /// Give the role its own Athena workgroup and results bucket
    #[serde(default)]
    pub athena_workgroup: bool,
    /// Attach the stack's shared Athena access policy
    #[serde(default)]
    pub athena_access: bool,
    #[serde(default)]
    pub instance_profile: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseGrantSpec {
    pub role: String,
    #[serde(default)]
    pub permissions: Vec<DatabasePermission>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableGrantSpec {
    pub role: String,
    #[serde(default)]
    pub permissions: Vec<TablePermission>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneSpec {
    /// Suffix of the zone name: `{lake_name}_{name}`
    pub name: String,
    /// Construct id; defaults to `{stack_name}.zone.{name}`
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub database_grants: Vec<DatabaseGrantSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetSpec {
    pub id: String,
    /// Name of the owning zone as given in `zones[].name`
    pub zone: String,
    pub prefix: String,
    pub description: String,
    pub filetype: Filetype,
    #[serde(default)]
    pub lifecycle_rules: Vec<LifecycleRule>,
    #[serde(default)]
    pub schedule: Option<CrawlerSchedule>,
    /// Name of a classifier from `classifiers[]`
    #[serde(default)]
    pub classifier: Option<String>,
    #[serde(default)]
    pub grants: Vec<TableGrantSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LakeManifest {
    pub lake_name: String,
    #[serde(default)]
    pub stack_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub environment: Option<Environment>,
    /// Role id used to register locations with Lake Formation
    #[serde(default)]
    pub registration_role: Option<String>,
    #[serde(default)]
    pub roles: Vec<RoleSpec>,
    #[serde(default)]
    pub classifiers: Vec<CsvClassifierProps>,
    #[serde(default)]
    pub zones: Vec<ZoneSpec>,
    #[serde(default)]
    pub datasets: Vec<DatasetSpec>,
}

fn manifest_error(message: String) -> LakeError {
    LakeError::ManifestError(message)
}

fn ensure_unique<'a, I>(kind: &str, ids: I) -> LakeResult<()>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(LakeError::DuplicateResource(format!("{} '{}'", kind, id)));
        }
    }
    Ok(())
}

impl LakeManifest {
    pub fn new(lake_name: impl Into<String>) -> Self {
        Self {
            lake_name: lake_name.into(),
            stack_name: None,
            description: None,
            environment: None,
            registration_role: None,
            roles: Vec::new(),
            classifiers: Vec::new(),
            zones: Vec::new(),
            datasets: Vec::new(),
        }
    }

    pub fn from_json(json: &str) -> LakeResult<Self> {
        serde_json::from_str(json).map_err(|e| manifest_error(format!("invalid manifest: {}", e)))
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> LakeResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        log::debug!("Loaded manifest from {}", path.as_ref().display());
        Self::from_json(&content)
    }

    pub fn to_json_pretty(&self) -> LakeResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Use `environment` unless the manifest states its own
    pub fn with_default_environment(mut self, environment: Environment) -> Self {
        if self.environment.is_none() {
            self.environment = Some(environment);
        }
        self
    }

    pub fn lake_config(&self) -> LakeConfig {
        let mut config = LakeConfig::new(self.lake_name.clone())
            .with_environment(self.environment.clone().unwrap_or_default());
        if let Some(stack_name) = &self.stack_name {
            config = config.with_stack_name(stack_name.clone());
        }
        config.description = self.description.clone();
        config
    }

    fn role_name(&self, config: &LakeConfig, spec: &RoleSpec) -> String {
        spec.role_name
            .clone()
            .unwrap_or_else(|| format!("{}-{}", config.stack_name, spec.id))
    }

    fn zone_id(&self, config: &LakeConfig, spec: &ZoneSpec) -> String {
        spec.id
            .clone()
            .unwrap_or_else(|| format!("{}.zone.{}", config.stack_name, spec.name))
    }

    fn registration_role_id(&self) -> &str {
        self.registration_role
            .as_deref()
            .unwrap_or(DEFAULT_REGISTRATION_ROLE_ID)
    }

    /// Check names and cross references without declaring anything
    pub fn validate(&self) -> LakeResult<()> {
        let config = self.lake_config();
        config.validate()?;

        ensure_unique("role", self.roles.iter().map(|r| r.id.as_str()))?;
        let role_names: Vec<String> = self.roles.iter().map(|r| self.role_name(&config, r)).collect();
        for name in &role_names {
            validate_role_name(name)?;
        }
        ensure_unique("role name", role_names.iter().map(String::as_str))?;

        let role_ids: HashSet<&str> = self.roles.iter().map(|r| r.id.as_str()).collect();
        let has_role = |id: &str| {
            role_ids.contains(id) || (self.registration_role.is_none() && id == DEFAULT_REGISTRATION_ROLE_ID)
        };
        match &self.registration_role {
            Some(id) if !role_ids.contains(id.as_str()) => {
                return Err(manifest_error(format!(
                    "registration role '{}' is not defined",
                    id
                )));
            }
            None if role_ids.contains(DEFAULT_REGISTRATION_ROLE_ID) => {
                return Err(LakeError::DuplicateResource(format!(
                    "role '{}' is reserved for the generated registration role",
                    DEFAULT_REGISTRATION_ROLE_ID
                )));
            }
            _ => {}
        }

        ensure_unique("classifier", self.classifiers.iter().map(|c| c.name.as_str()))?;
        for classifier in &self.classifiers {
            classifier.validate()?;
        }

        ensure_unique("zone", self.zones.iter().map(|z| z.name.as_str()))?;
        let zone_ids: Vec<String> = self.zones.iter().map(|z| self.zone_id(&config, z)).collect();
        ensure_unique("zone id", zone_ids.iter().map(String::as_str))?;
        for (zone, zone_id) in self.zones.iter().zip(&zone_ids) {
            validate_catalog_name("zone", &config.zone_name(&zone.name))?;
            validate_role_name(&format!("{}-Crawler-Role", zone_id))?;
            ensure_unique(
                &format!("database grant role in zone '{}'", zone.name),
                zone.database_grants.iter().map(|g| g.role.as_str()),
            )?;
            for grant in &zone.database_grants {
                if !has_role(&grant.role) {
                    return Err(manifest_error(format!(
                        "zone '{}' grants to undefined role '{}'",
                        zone.name, grant.role
                    )));
                }
            }
        }

        ensure_unique("dataset", self.datasets.iter().map(|d| d.id.as_str()))?;
        let mut prefixes = HashSet::new();
        for dataset in &self.datasets {
            if !self.zones.iter().any(|z| z.name == dataset.zone) {
                return Err(manifest_error(format!(
                    "dataset '{}' refers to undefined zone '{}'",
                    dataset.id, dataset.zone
                )));
            }
            if let Some(classifier) = &dataset.classifier {
                if !self.classifiers.iter().any(|c| &c.name == classifier) {
                    return Err(manifest_error(format!(
                        "dataset '{}' refers to undefined classifier '{}'",
                        dataset.id, classifier
                    )));
                }
            }
            let key = dataset.prefix.trim_end_matches('/');
            if key.is_empty() || key.starts_with('/') {
                return Err(LakeError::InvalidConfiguration(format!(
                    "dataset '{}' has invalid prefix '{}'",
                    dataset.id, dataset.prefix
                )));
            }
            if !prefixes.insert((dataset.zone.as_str(), key)) {
                return Err(LakeError::DuplicatePrefix(format!(
                    "prefix '{}' is used twice in zone '{}'",
                    key, dataset.zone
                )));
            }
            ensure_unique(
                &format!("grant role in dataset '{}'", dataset.id),
                dataset.grants.iter().map(|g| g.role.as_str()),
            )?;
            for grant in &dataset.grants {
                if !has_role(&grant.role) {
                    return Err(manifest_error(format!(
                        "dataset '{}' grants to undefined role '{}'",
                        dataset.id, grant.role
                    )));
                }
            }
        }
        Ok(())
    }

    /// Declare everything the manifest describes into a new stack
    ///
    /// Roles come first, then classifiers, zones with their database grants and
    /// finally datasets with their table grants.
    pub fn compose(&self) -> LakeResult<Stack> {
        self.validate()?;
        let config = self.lake_config();
        let stack = Stack::from_config(&config)?;
        let iam_scope = stack.path("iam");

        let mut roles: BTreeMap<&str, Role> = BTreeMap::new();
        let mut athena_access: Option<ManagedPolicy> = None;
        for spec in &self.roles {
            let mut props = RoleProps::new(self.role_name(&config, spec), spec.assumed_by.clone());
            props.description = spec.description.clone();
            for name in &spec.managed_policies {
                props = props.with_managed_policy(stack.arns().aws_managed_policy(name));
            }
            let role = Role::new(&stack, &iam_scope, &spec.id, props)?;

            for (i, policy) in spec.policies.iter().enumerate() {
                let policy_id = format!("{}.policy.{}", spec.id, i);
                let policy = match &policy.name {
                    Some(name) => Policy::named(name.clone(), policy.statements.clone()),
                    None => Policy::new(policy.statements.clone()),
                };
                role.attach_inline_policy(&iam_scope, &policy_id, policy)?;
            }
            if spec.athena_workgroup {
                role.create_athena_workgroup()?;
            }
            if spec.athena_access {
                if athena_access.is_none() {
                    athena_access = Some(ManagedPolicy::athena_access(&stack)?);
                }
                if let Some(policy) = &athena_access {
                    role.attach_managed_policy(policy)?;
                }
            }
            if spec.instance_profile {
                role.create_instance_profile()?;
            }
            roles.insert(spec.id.as_str(), role);
        }

        if self.registration_role.is_none() {
            let role = Role::new(
                &stack,
                &iam_scope,
                DEFAULT_REGISTRATION_ROLE_ID,
                RoleProps::new(
                    format!("{}-lake-formation-service-role", config.stack_name),
                    Principal::Composite(vec![
                        Principal::service("glue.amazonaws.com"),
                        Principal::service("lakeformation.amazonaws.com"),
                    ]),
                ),
            )?;
            roles.insert(DEFAULT_REGISTRATION_ROLE_ID, role);
        }
        let role = |id: &str| {
            roles
                .get(id)
                .ok_or_else(|| manifest_error(format!("role '{}' is not defined", id)))
        };
        let registration_role = role(self.registration_role_id())?;

        let mut classifiers: BTreeMap<&str, Classifier> = BTreeMap::new();
        for props in &self.classifiers {
            let classifier = Classifier::csv(
                &stack,
                &stack.path(&format!("glue.classifier.{}", props.name)),
                props,
            )?;
            classifiers.insert(props.name.as_str(), classifier);
        }

        let mut zones: BTreeMap<&str, Zone> = BTreeMap::new();
        for spec in &self.zones {
            let zone = Zone::new(
                &stack,
                &self.zone_id(&config, spec),
                &config.zone_name(&spec.name),
                registration_role,
            )?;
            for grant in &spec.database_grants {
                zone.grant_db_access_to_role(role(&grant.role)?, &grant.permissions)?;
            }
            zones.insert(spec.name.as_str(), zone);
        }

        for spec in &self.datasets {
            let zone = zones
                .get(spec.zone.as_str())
                .ok_or_else(|| manifest_error(format!("zone '{}' is not defined", spec.zone)))?;
            let classifier = match &spec.classifier {
                Some(name) => Some(classifiers.get(name.as_str()).ok_or_else(|| {
                    manifest_error(format!("classifier '{}' is not defined", name))
                })?),
                None => None,
            };
            let dataset = Dataset::new(
                zone,
                DatasetProps {
                    description: spec.description.clone(),
                    filetype: spec.filetype,
                    prefix: spec.prefix.clone(),
                    lifecycle_rules: spec.lifecycle_rules.clone(),
                    classifier,
                    schedule: spec.schedule.clone(),
                },
            )?;
            for grant in &spec.grants {
                dataset.grant_access_to_role(role(&grant.role)?, &grant.permissions)?;
            }
        }

        log::info!(
            "Composed lake '{}': {} roles, {} zones, {} datasets, {} resources",
            self.lake_name,
            roles.len(),
            zones.len(),
            self.datasets.len(),
            stack.resource_count()
        );
        Ok(stack)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest() -> LakeManifest {
        LakeManifest::from_json(
            r#"{
                "lake_name": "test_lake",
                "roles": [
                    { "id": "analyst", "assumed_by": { "account": "123456789012" } }
                ],
                "zones": [
                    {
                        "name": "raw",
                        "database_grants": [{ "role": "analyst", "permissions": ["DESCRIBE"] }]
                    }
                ],
                "datasets": [
                    {
                        "id": "events",
                        "zone": "raw",
                        "prefix": "events",
                        "description": "Event stream",
                        "filetype": "JSON",
                        "grants": [{ "role": "analyst", "permissions": ["SELECT"] }]
                    }
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_defaults() {
        let manifest = manifest();
        let config = manifest.lake_config();
        assert_eq!(config.stack_name, "test-lake");
        assert_eq!(config.zone_name("raw"), "test_lake_raw");
        assert_eq!(manifest.role_name(&config, &manifest.roles[0]), "test-lake-analyst");
        assert!(manifest.validate().is_ok());
    }

    #[test]
    fn test_invalid_lake_name() {
        let mut manifest = manifest();
        manifest.lake_name = "test-lake".to_string();
        assert!(matches!(manifest.validate(), Err(LakeError::InvalidName(_))));
        assert!(manifest.compose().is_err());
    }

    #[test]
    fn test_undefined_references() {
        let mut manifest = manifest();
        manifest.datasets[0].zone = "curated".to_string();
        assert!(matches!(manifest.validate(), Err(LakeError::ManifestError(_))));

        let mut manifest = self::manifest();
        manifest.datasets[0].grants[0].role = "nobody".to_string();
        assert!(matches!(manifest.validate(), Err(LakeError::ManifestError(_))));

        let mut manifest = self::manifest();
        manifest.datasets[0].classifier = Some("tsv".to_string());
        assert!(matches!(manifest.validate(), Err(LakeError::ManifestError(_))));

        let mut manifest = self::manifest();
        manifest.registration_role = Some("missing".to_string());
        assert!(matches!(manifest.validate(), Err(LakeError::ManifestError(_))));
    }

    #[test]
    fn test_duplicates() {
        let mut manifest = manifest();
        let mut twin = manifest.datasets[0].clone();
        twin.id = "events_copy".to_string();
        twin.prefix = "events/".to_string();
        manifest.datasets.push(twin);
        assert!(matches!(manifest.validate(), Err(LakeError::DuplicatePrefix(_))));

        let mut manifest = self::manifest();
        let twin = manifest.roles[0].clone();
        manifest.roles.push(twin);
        assert!(matches!(manifest.validate(), Err(LakeError::DuplicateResource(_))));
    }

    #[test]
    fn test_repeated_grant_role_fails_validation() {
        let mut manifest = manifest();
        let grant = manifest.datasets[0].grants[0].clone();
        manifest.datasets[0].grants.push(grant);
        assert!(matches!(manifest.validate(), Err(LakeError::DuplicateResource(_))));
        assert!(matches!(manifest.compose(), Err(LakeError::DuplicateResource(_))));

        let mut manifest = self::manifest();
        let grant = manifest.zones[0].database_grants[0].clone();
        manifest.zones[0].database_grants.push(grant);
        assert!(matches!(manifest.validate(), Err(LakeError::DuplicateResource(_))));
    }

    #[test]
    fn test_generated_registration_role() {
        let stack = manifest().compose().unwrap();
        let roles = stack.resources_of_type(crate::iam::role::ROLE_RESOURCE_TYPE);
        let registration = roles
            .iter()
            .find(|(_, r)| r.properties["RoleName"] == "test-lake-lake-formation-service-role")
            .unwrap();
        assert_eq!(
            registration.1.properties["AssumeRolePolicyDocument"]["Statement"][0]["Principal"]
                ["Service"],
            serde_json::json!(["glue.amazonaws.com", "lakeformation.amazonaws.com"])
        );
    }

    #[test]
    fn test_environment_precedence() {
        let stated = Environment::new("111122223333", "eu-west-1");
        let manifest = manifest().with_default_environment(stated.clone());
        assert_eq!(manifest.environment.as_ref(), Some(&stated));

        let manifest = manifest.with_default_environment(Environment::default());
        assert_eq!(manifest.environment, Some(stated));
    }
}
