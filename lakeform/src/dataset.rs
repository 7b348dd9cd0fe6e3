// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Dataset: one storage prefix within a zone

use crate::error::LakeResult;
use crate::filetype::Filetype;
use crate::glue::{Classifier, CrawlerSchedule};
use crate::iam::Role;
use crate::permissions::TablePermission;
use crate::storage::LifecycleRule;
use crate::template::LogicalId;
use crate::zone::Zone;

#[derive(Debug, Clone)]
pub struct DatasetProps<'c> {
    pub description: String,
    pub filetype: Filetype,
    pub prefix: String,
    pub lifecycle_rules: Vec<LifecycleRule>,
    pub classifier: Option<&'c Classifier>,
    pub schedule: Option<CrawlerSchedule>,
}

impl<'c> DatasetProps<'c> {
    pub fn new(prefix: impl Into<String>, filetype: Filetype, description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            filetype,
            prefix: prefix.into(),
            lifecycle_rules: Vec::new(),
            classifier: None,
            schedule: None,
        }
    }

    pub fn with_lifecycle_rule(mut self, rule: LifecycleRule) -> Self {
        self.lifecycle_rules.push(rule);
        self
    }

    pub fn with_classifier(mut self, classifier: &'c Classifier) -> Self {
        self.classifier = Some(classifier);
        self
    }

    pub fn with_schedule(mut self, schedule: CrawlerSchedule) -> Self {
        self.schedule = Some(schedule);
        self
    }
}

/// A prefix bound to its table and crawler
///
/// Borrows the owning zone, so a dataset cannot outlive it.
#[derive(Debug)]
pub struct Dataset<'z> {
    zone: &'z Zone,
    prefix: String,
    registration: LogicalId,
    table: LogicalId,
    crawler: LogicalId,
}

impl<'z> Dataset<'z> {
    /// Register the prefix, then declare the table, the crawler and the
    /// lifecycle rules, in that order
    pub fn new(zone: &'z Zone, props: DatasetProps<'_>) -> LakeResult<Self> {
        let registration = zone.register_resource(&props.prefix)?;
        let table = zone.create_table(&props.prefix, &props.description)?;
        let crawler =
            zone.create_crawler(&props.prefix, props.filetype, props.classifier, props.schedule)?;
        zone.add_lifecycle_rules(&props.prefix, props.lifecycle_rules)?;

        log::info!(
            "Declared dataset '{}' in zone '{}'",
            props.prefix,
            zone.name()
        );
        Ok(Self {
            zone,
            prefix: props.prefix,
            registration,
            table,
            crawler,
        })
    }

    pub fn zone(&self) -> &Zone {
        self.zone
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn registration(&self) -> &LogicalId {
        &self.registration
    }

    pub fn table(&self) -> &LogicalId {
        &self.table
    }

    pub fn crawler(&self) -> &LogicalId {
        &self.crawler
    }

    /// Grant table permissions on this dataset to `role`
    ///
    /// The grant record is ordered after the table declaration. Empty
    /// permissions declare nothing.
    pub fn grant_access_to_role(
        &self,
        role: &Role,
        permissions: &[TablePermission],
    ) -> LakeResult<Option<LogicalId>> {
        let grant = self
            .zone
            .grant_table_access_to_role(role, &self.prefix, permissions)?;
        if let Some(grant) = &grant {
            self.zone.stack().add_dependency(grant, &self.table)?;
        }
        Ok(grant)
    }
}
