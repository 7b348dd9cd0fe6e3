// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Data lake zone
//!
//! A zone owns one bucket, one catalog database and one crawler role. Once
//! constructed it accepts any number of prefix registrations, tables, crawlers
//! and grants. Every grant attaches a fresh inline policy to the grantee.

use crate::error::{LakeError, LakeResult};
use crate::filetype::{Filetype, UNKNOWN_CLASSIFIER};
use crate::glue::{self, Classifier, CrawlerProps, CrawlerSchedule, Database};
use crate::iam::role::validate_role_name;
use crate::iam::{Policy, PolicyStatement, Principal, Role, RoleProps};
use crate::lakeformation::{self, DataLakeResource, DATA_LOCATION_ACCESS};
use crate::naming::{bucket_name_for_zone, s3_url, validate_catalog_name};
use crate::permissions::compiler::{DATA_ACCESS_RESOURCE, LAKE_FORMATION_DATA_ACCESS};
use crate::permissions::{
    compile_table_permissions, database_lake_formation_names, database_statement,
    table_lake_formation_names, DatabasePermission, TablePermission, TableScope,
};
use crate::stack::{child_path, Stack};
use crate::storage::{normalize_prefix, Bucket, LifecycleRule};
use crate::template::LogicalId;
use parking_lot::RwLock;
use std::collections::BTreeMap;

pub const GLUE_SERVICE: &str = "glue.amazonaws.com";
pub const GLUE_SERVICE_ROLE_POLICY: &str = "service-role/AWSGlueServiceRole";
pub const ATHENA_FULL_ACCESS_POLICY: &str = "AmazonAthenaFullAccess";

/// Permissions the crawler role holds on every crawled table
pub const CRAWLER_TABLE_PERMISSIONS: [TablePermission; 2] =
    [TablePermission::Alter, TablePermission::Describe];

const CRAWLER_DATABASE_PERMISSIONS: [DatabasePermission; 3] = [
    DatabasePermission::CreateTable,
    DatabasePermission::Alter,
    DatabasePermission::Describe,
];

/// Dataset key of a storage prefix, without trailing slashes
fn dataset_key(prefix: &str) -> LakeResult<&str> {
    let key = prefix.trim_end_matches('/');
    if key.is_empty() || key.starts_with('/') {
        return Err(LakeError::InvalidConfiguration(format!(
            "invalid storage prefix '{}'",
            prefix
        )));
    }
    Ok(key)
}

pub struct Zone {
    stack: Stack,
    id: String,
    path: String,
    name: String,
    bucket: Bucket,
    database: Database,
    crawler_role: Role,
    registration_role: Role,
    /// Registered prefix → registration record
    registrations: RwLock<BTreeMap<String, LogicalId>>,
    /// Prefix → table declaration
    tables: RwLock<BTreeMap<String, LogicalId>>,
}

impl std::fmt::Debug for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Zone")
            .field("name", &self.name)
            .field("bucket", &self.bucket.name())
            .field("prefixes", &self.prefixes())
            .finish()
    }
}

impl Zone {
    /// Declare a zone's bucket, database and crawler identity
    ///
    /// Names are validated before anything is declared.
    pub fn new(
        stack: &Stack,
        id: &str,
        zone_name: &str,
        location_registration_role: &Role,
    ) -> LakeResult<Self> {
        validate_catalog_name("zone", zone_name)?;
        let crawler_role_name = format!("{}-Crawler-Role", id);
        validate_role_name(&crawler_role_name)?;

        let path = stack.path(id);
        let bucket = Bucket::new(
            stack,
            &child_path(&path, &format!("{}.s3.bucket", id)),
            bucket_name_for_zone(zone_name),
        )?;

        location_registration_role.attach_inline_policy(
            &path,
            &format!("{}.registration-policy", id),
            Policy::new(vec![PolicyStatement::allow(["s3:ListBucket"], [bucket.arn()])]),
        )?;

        let database = Database::new(stack, &child_path(&path, &format!("{}.glue.db", id)), zone_name)?;

        let crawler_role = Role::new(
            stack,
            &path,
            &format!("{}.iam.role.glue", id),
            RoleProps::new(crawler_role_name, Principal::service(GLUE_SERVICE))
                .with_managed_policy(stack.arns().aws_managed_policy(GLUE_SERVICE_ROLE_POLICY))
                .with_managed_policy(stack.arns().aws_managed_policy(ATHENA_FULL_ACCESS_POLICY))
                .with_inline_policy(Policy::new(vec![
                    PolicyStatement::allow(["s3:*"], [bucket.arn()]),
                    PolicyStatement::allow(["s3:*"], [bucket.arn_for_objects("*")]),
                    PolicyStatement::allow([LAKE_FORMATION_DATA_ACCESS], [DATA_ACCESS_RESOURCE]),
                ])),
        )?;

        lakeformation::declare_permissions(
            stack,
            &child_path(&path, &format!("{}.lake.permissions.crawler.create_table", id)),
            &crawler_role.arn(),
            &DataLakeResource::Database {
                name: database.name().to_string(),
            },
            &database_lake_formation_names(&CRAWLER_DATABASE_PERMISSIONS),
            [crawler_role.logical_id(), database.logical_id()],
        )?;

        log::info!(
            "Declared zone '{}' with bucket '{}'",
            zone_name,
            bucket.name()
        );

        Ok(Self {
            stack: stack.clone(),
            id: id.to_string(),
            path,
            name: zone_name.to_string(),
            bucket,
            database,
            crawler_role,
            registration_role: location_registration_role.clone(),
            registrations: RwLock::new(BTreeMap::new()),
            tables: RwLock::new(BTreeMap::new()),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stack(&self) -> &Stack {
        &self.stack
    }

    pub fn bucket(&self) -> &Bucket {
        &self.bucket
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn database_name(&self) -> &str {
        self.database.name()
    }

    pub fn database_arn(&self) -> &str {
        self.database.arn()
    }

    pub fn crawler_role(&self) -> &Role {
        &self.crawler_role
    }

    pub fn registration_role(&self) -> &Role {
        &self.registration_role
    }

    /// Registered prefixes in sorted order
    pub fn prefixes(&self) -> Vec<String> {
        self.registrations.read().keys().cloned().collect()
    }

    pub fn is_registered(&self, prefix: &str) -> bool {
        dataset_key(prefix)
            .map(|key| self.registrations.read().contains_key(key))
            .unwrap_or(false)
    }

    /// Table declared for `prefix`, if any
    pub fn table(&self, prefix: &str) -> Option<LogicalId> {
        let key = dataset_key(prefix).ok()?;
        self.tables.read().get(key).cloned()
    }

    fn objects_arn(&self, key: &str) -> String {
        self.bucket.arn_for_objects(&format!("{}/*", key))
    }

    fn scoped(&self, id: &str) -> String {
        child_path(&self.path, id)
    }

    /// Make `prefix` a governed location
    ///
    /// The registration role may read, write and delete objects under the
    /// prefix and the location is registered with Lake Formation through it.
    pub fn register_resource(&self, prefix: &str) -> LakeResult<LogicalId> {
        let key = dataset_key(prefix)?;
        let mut registrations = self.registrations.write();
        if registrations.contains_key(key) {
            return Err(LakeError::DuplicatePrefix(format!(
                "prefix '{}' is already registered in zone '{}'",
                key, self.name
            )));
        }

        let resource_arn = self.objects_arn(key);
        let policy = self.registration_role.attach_inline_policy(
            &self.path,
            &format!("{}.{}.registration-policy", self.id, key),
            Policy::new(vec![PolicyStatement::allow(
                ["s3:PutObject", "s3:GetObject", "s3:DeleteObject"],
                [resource_arn.as_str()],
            )]),
        )?;

        let registration = lakeformation::declare_resource_registration(
            &self.stack,
            &self.scoped(&format!("{}.{}.lakeformation.resource", self.id, key)),
            &resource_arn,
            &self.registration_role.arn(),
            [self.registration_role.logical_id(), &policy],
        )?;

        log::debug!("Registered location {} in zone '{}'", resource_arn, self.name);
        registrations.insert(key.to_string(), registration.clone());
        Ok(registration)
    }

    /// Declare the catalog table for `prefix` with an undiscovered schema
    pub fn create_table(&self, prefix: &str, description: &str) -> LakeResult<LogicalId> {
        let key = dataset_key(prefix)?;
        let location = normalize_prefix(&s3_url(self.bucket.name(), key));
        let table = glue::declare_table(
            &self.stack,
            &self.scoped(&format!("{}.{}.glue.table", self.id, key)),
            &self.database,
            key,
            description,
            &location,
        )?;
        self.tables.write().insert(key.to_string(), table.clone());
        log::debug!("Declared table '{}' at {}", key, location);
        Ok(table)
    }

    /// Declare a crawler for `prefix` and authorize the crawler role on it
    ///
    /// The crawler uses `classifier` when given, otherwise the filetype's
    /// built-in classifier. `Filetype::Other` has none, so no classifier is
    /// named and Glue falls back to its default chain.
    pub fn create_crawler(
        &self,
        prefix: &str,
        filetype: Filetype,
        classifier: Option<&Classifier>,
        schedule: Option<CrawlerSchedule>,
    ) -> LakeResult<LogicalId> {
        let key = dataset_key(prefix)?;

        let classifiers = match classifier {
            Some(c) => vec![c.name().to_string()],
            None if filetype.glue_classifier() == UNKNOWN_CLASSIFIER => Vec::new(),
            None => vec![filetype.glue_classifier().to_string()],
        };

        let mut depends_on = vec![
            self.crawler_role.logical_id().clone(),
            self.database.logical_id().clone(),
        ];
        if let Some(c) = classifier {
            depends_on.push(c.logical_id().clone());
        }

        let crawler = glue::declare_crawler(
            &self.stack,
            &self.scoped(&format!("{}.{}.glue.crawler", self.id, key)),
            CrawlerProps {
                name: format!("{}-{}-crawler", self.name, key),
                description: format!("Crawls the data lake dataset named '{}'.", key),
                role_arn: self.crawler_role.arn(),
                database_name: self.database.name().to_string(),
                s3_target: s3_url(self.bucket.name(), key),
                classifiers,
                schedule,
            },
            depends_on.iter(),
        )?;

        self.authorize_crawling(key)?;
        log::info!("Declared crawler for '{}' in zone '{}' ({})", key, self.name, filetype);
        Ok(crawler)
    }

    fn authorize_crawling(&self, key: &str) -> LakeResult<()> {
        let mut depends_on = vec![self.crawler_role.logical_id().clone()];
        match self.registrations.read().get(key) {
            Some(registration) => depends_on.push(registration.clone()),
            None => log::warn!(
                "Crawler for '{}' in zone '{}' targets an unregistered location",
                key,
                self.name
            ),
        }

        lakeformation::declare_permissions(
            &self.stack,
            &self.scoped(&format!("{}.{}.lake.permissions.crawler.access_s3", self.id, key)),
            &self.crawler_role.arn(),
            &DataLakeResource::DataLocation {
                s3_arn: self.objects_arn(key),
            },
            &[DATA_LOCATION_ACCESS],
            depends_on.iter(),
        )?;

        self.grant_table_access_to_role(&self.crawler_role, key, &CRAWLER_TABLE_PERMISSIONS)?;
        Ok(())
    }

    /// Grant database permissions to `role`
    ///
    /// Declares one Lake Formation grant and attaches one policy to the role.
    /// An empty permission list declares nothing and returns `None`.
    pub fn grant_db_access_to_role(
        &self,
        role: &Role,
        permissions: &[DatabasePermission],
    ) -> LakeResult<Option<LogicalId>> {
        let statement = match database_statement(permissions, self.database.arn()) {
            Some(statement) => statement,
            None => return Ok(None),
        };
        let role_name = role.role_name();

        let grant = lakeformation::declare_permissions(
            &self.stack,
            &self.scoped(&format!("{}.lake.permissions.{}.db_permissions", self.id, role_name)),
            &role.arn(),
            &DataLakeResource::Database {
                name: self.database.name().to_string(),
            },
            &database_lake_formation_names(permissions),
            [role.logical_id(), self.database.logical_id()],
        )?;

        role.attach_inline_policy(
            &self.path,
            &format!("{}.{}.db.permissions", self.id, role_name),
            Policy::named(format!("{}-DB-Policy", self.name), vec![statement]),
        )?;

        log::debug!(
            "Granted {:?} on database '{}' to '{}'",
            permissions,
            self.name,
            role_name
        );
        Ok(Some(grant))
    }

    /// Grant table permissions on `prefix` to `role`
    ///
    /// Returns the Lake Formation grant record so callers can order it after
    /// other declarations. An empty permission list declares nothing.
    pub fn grant_table_access_to_role(
        &self,
        role: &Role,
        prefix: &str,
        permissions: &[TablePermission],
    ) -> LakeResult<Option<LogicalId>> {
        if permissions.is_empty() {
            return Ok(None);
        }
        let key = dataset_key(prefix)?;
        let role_name = role.role_name();

        if !self.registrations.read().contains_key(key) {
            log::warn!(
                "Granting access on '{}' in zone '{}' before the location was registered",
                key,
                self.name
            );
        }

        let mut depends_on = vec![role.logical_id().clone(), self.database.logical_id().clone()];
        if let Some(table) = self.tables.read().get(key) {
            depends_on.push(table.clone());
        }

        let grant = lakeformation::declare_permissions(
            &self.stack,
            &self.scoped(&format!("{}.{}.lake.permissions.{}", self.id, key, role_name)),
            &role.arn(),
            &DataLakeResource::Table {
                database: self.database.name().to_string(),
                name: key.to_string(),
            },
            &table_lake_formation_names(permissions),
            depends_on.iter(),
        )?;

        let statements = compile_table_permissions(permissions).statements(&TableScope {
            database_arn: self.database.arn().to_string(),
            bucket_arn: self.bucket.arn(),
            objects_arn: self.objects_arn(key),
        });
        if !statements.is_empty() {
            role.attach_inline_policy(
                &self.path,
                &format!("{}.{}.table.{}.permissions", self.id, role_name, key),
                Policy::named(format!("{}-{}-Table-Policy", self.name, key), statements),
            )?;
        }

        log::debug!(
            "Granted {:?} on table '{}' in zone '{}' to '{}'",
            permissions,
            key,
            self.name,
            role_name
        );
        Ok(Some(grant))
    }

    /// Attach lifecycle rules scoped to `prefix/`
    ///
    /// Any prefix already set on a rule is replaced.
    pub fn add_lifecycle_rules(&self, prefix: &str, rules: Vec<LifecycleRule>) -> LakeResult<()> {
        let scoped_prefix = normalize_prefix(dataset_key(prefix)?);
        for rule in rules {
            self.bucket.add_lifecycle_rule(rule.with_prefix(scoped_prefix.clone()))?;
        }
        Ok(())
    }
}
