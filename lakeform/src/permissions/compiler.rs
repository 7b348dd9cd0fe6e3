// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Permission-to-statement compiler
//!
//! A table grant is enforced at three points: the Glue catalog (metadata), Lake
//! Formation (data access credentials) and S3 (the objects themselves). Each
//! point has its own lookup table. All functions here are pure.

use super::{permission_set, DatabasePermission, TablePermission};
use crate::iam::PolicyStatement;

pub const LAKE_FORMATION_DATA_ACCESS: &str = "lakeformation:GetDataAccess";
pub const S3_LIST_BUCKET: &str = "s3:ListBucket";

/// Lake Formation only accepts `*` as the resource of GetDataAccess
pub const DATA_ACCESS_RESOURCE: &str = "*";

fn catalog_actions(permission: TablePermission) -> &'static [&'static str] {
    match permission {
        TablePermission::Alter => &["glue:UpdateTable"],
        TablePermission::Describe => &["glue:GetTable"],
        TablePermission::Drop => &["glue:DeleteTable"],
        TablePermission::Super => &["glue:*Table*", "glue:*Partition*"],
        TablePermission::Delete | TablePermission::Insert | TablePermission::Select => &[],
    }
}

fn data_access_actions(permission: TablePermission) -> &'static [&'static str] {
    match permission {
        TablePermission::Delete
        | TablePermission::Insert
        | TablePermission::Select
        | TablePermission::Super => &[LAKE_FORMATION_DATA_ACCESS],
        TablePermission::Alter | TablePermission::Describe | TablePermission::Drop => &[],
    }
}

fn storage_actions(permission: TablePermission) -> &'static [&'static str] {
    match permission {
        TablePermission::Delete => &["s3:DeleteObject"],
        TablePermission::Insert => &["s3:PutObject"],
        TablePermission::Select => &["s3:GetObject", "s3:GetObjectVersion"],
        TablePermission::Super => &[
            "s3:DeleteObject",
            "s3:PutObject",
            "s3:GetObject",
            "s3:GetObjectVersion",
        ],
        TablePermission::Alter | TablePermission::Describe | TablePermission::Drop => &[],
    }
}

fn database_actions(permission: DatabasePermission) -> &'static str {
    match permission {
        DatabasePermission::Alter => "glue:UpdateDatabase",
        DatabasePermission::CreateTable => "glue:CreateTable",
        DatabasePermission::Describe => "glue:GetDatabase",
        DatabasePermission::Drop => "glue:DeleteDatabase",
        DatabasePermission::Super => "glue:*Database*",
    }
}

fn push_unique(actions: &mut Vec<&'static str>, new: &[&'static str]) {
    for action in new {
        if !actions.contains(action) {
            actions.push(action);
        }
    }
}

/// Actions required to realise a table grant, one list per enforcement point
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableActions {
    /// Glue catalog metadata actions
    pub catalog: Vec<&'static str>,
    /// Lake Formation fine-grained access actions
    pub data_access: Vec<&'static str>,
    /// S3 object actions
    pub storage: Vec<&'static str>,
}

impl TableActions {
    pub fn is_empty(&self) -> bool {
        self.catalog.is_empty() && self.data_access.is_empty() && self.storage.is_empty()
    }

    /// Policy statements enforcing these actions on one table
    ///
    /// Object statements are always paired with a bucket listing statement.
    pub fn statements(&self, scope: &TableScope) -> Vec<PolicyStatement> {
        let mut statements = Vec::new();
        if !self.catalog.is_empty() {
            statements.push(PolicyStatement::allow(
                self.catalog.iter().copied(),
                [scope.database_arn.as_str()],
            ));
        }
        if !self.data_access.is_empty() {
            statements.push(PolicyStatement::allow(
                self.data_access.iter().copied(),
                [DATA_ACCESS_RESOURCE],
            ));
        }
        if !self.storage.is_empty() {
            statements.push(PolicyStatement::allow(
                self.storage.iter().copied(),
                [scope.objects_arn.as_str()],
            ));
            statements.push(PolicyStatement::allow(
                [S3_LIST_BUCKET],
                [scope.bucket_arn.as_str()],
            ));
        }
        statements
    }
}

/// Resources a table grant is scoped to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableScope {
    /// ARN of the catalog database holding the table
    pub database_arn: String,
    /// ARN of the bucket holding the table's objects
    pub bucket_arn: String,
    /// ARN pattern of the table's objects, `bucket/prefix/*`
    pub objects_arn: String,
}

/// Compile a table permission list
///
/// The list is treated as a set, so the result only depends on which
/// permissions are present. Actions are deduplicated and ordered by permission
/// declaration order, then lookup table order.
pub fn compile_table_permissions(permissions: &[TablePermission]) -> TableActions {
    let mut actions = TableActions::default();
    for permission in permission_set(permissions) {
        push_unique(&mut actions.catalog, catalog_actions(permission));
        push_unique(&mut actions.data_access, data_access_actions(permission));
        push_unique(&mut actions.storage, storage_actions(permission));
    }
    actions
}

/// Compile a database permission list into Glue actions
pub fn compile_database_permissions(permissions: &[DatabasePermission]) -> Vec<&'static str> {
    let mut actions = Vec::new();
    for permission in permission_set(permissions) {
        push_unique(&mut actions, &[database_actions(permission)]);
    }
    actions
}

/// The single statement realising a database grant, if any
pub fn database_statement(
    permissions: &[DatabasePermission],
    database_arn: &str,
) -> Option<PolicyStatement> {
    let actions = compile_database_permissions(permissions);
    if actions.is_empty() {
        None
    } else {
        Some(PolicyStatement::allow(actions, [database_arn]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::iam::wildcard_match;
    use std::collections::BTreeSet;

    fn scope() -> TableScope {
        TableScope {
            database_arn: "arn:aws:glue:us-east-1:123456789012:database/db".to_string(),
            bucket_arn: "arn:aws:s3:::bucket".to_string(),
            objects_arn: "arn:aws:s3:::bucket/a/*".to_string(),
        }
    }

    fn all_subsets() -> Vec<Vec<TablePermission>> {
        let all = TablePermission::ALL;
        (0u32..(1 << all.len()))
            .map(|mask| {
                all.iter()
                    .enumerate()
                    .filter(|(i, _)| mask & (1 << i) != 0)
                    .map(|(_, p)| *p)
                    .collect()
            })
            .collect()
    }

    #[test]
    fn test_select_only() {
        let actions = compile_table_permissions(&[TablePermission::Select]);
        assert!(actions.catalog.is_empty());
        assert_eq!(actions.data_access, vec![LAKE_FORMATION_DATA_ACCESS]);
        assert_eq!(actions.storage, vec!["s3:GetObject", "s3:GetObjectVersion"]);
    }

    #[test]
    fn test_metadata_only_permissions() {
        let actions = compile_table_permissions(&[
            TablePermission::Alter,
            TablePermission::Describe,
            TablePermission::Drop,
        ]);
        assert_eq!(
            actions.catalog,
            vec!["glue:UpdateTable", "glue:GetTable", "glue:DeleteTable"]
        );
        assert!(actions.data_access.is_empty());
        assert!(actions.storage.is_empty());
    }

    #[test]
    fn test_order_and_duplicates_do_not_matter() {
        for subset in all_subsets() {
            let forward = compile_table_permissions(&subset);

            let mut reversed = subset.clone();
            reversed.reverse();
            assert_eq!(compile_table_permissions(&reversed), forward);

            let mut doubled = subset.clone();
            doubled.extend(subset.iter().copied());
            assert_eq!(compile_table_permissions(&doubled), forward);
        }
    }

    #[test]
    fn test_super_covers_every_other_permission() {
        let sup = compile_table_permissions(&[TablePermission::Super]);
        let others: Vec<TablePermission> = TablePermission::ALL
            .iter()
            .copied()
            .filter(|p| *p != TablePermission::Super)
            .collect();
        let union = compile_table_permissions(&others);

        let covered = |patterns: &[&'static str], action: &str| {
            patterns.iter().any(|pattern| wildcard_match(pattern, action))
        };
        for action in &union.catalog {
            assert!(covered(&sup.catalog, action), "{} not covered", action);
        }
        for action in &union.data_access {
            assert!(covered(&sup.data_access, action), "{} not covered", action);
        }
        for action in &union.storage {
            assert!(covered(&sup.storage, action), "{} not covered", action);
        }

        // The literal sets also nest for data access and storage.
        let as_set = |v: &[&'static str]| v.iter().copied().collect::<BTreeSet<_>>();
        assert!(as_set(&sup.data_access).is_superset(&as_set(&union.data_access)));
        assert!(as_set(&sup.storage).is_superset(&as_set(&union.storage)));
    }

    #[test]
    fn test_empty_set_compiles_to_nothing() {
        let actions = compile_table_permissions(&[]);
        assert!(actions.is_empty());
        assert!(actions.statements(&scope()).is_empty());
        assert!(compile_database_permissions(&[]).is_empty());
        assert!(database_statement(&[], "arn").is_none());
    }

    #[test]
    fn test_select_statements() {
        let statements = compile_table_permissions(&[TablePermission::Select]).statements(&scope());
        assert_eq!(statements.len(), 3);

        assert_eq!(statements[0].actions, vec![LAKE_FORMATION_DATA_ACCESS]);
        assert_eq!(statements[0].resources, vec!["*"]);

        assert_eq!(statements[1].actions, vec!["s3:GetObject", "s3:GetObjectVersion"]);
        assert_eq!(statements[1].resources, vec!["arn:aws:s3:::bucket/a/*"]);

        assert_eq!(statements[2].actions, vec![S3_LIST_BUCKET]);
        assert_eq!(statements[2].resources, vec!["arn:aws:s3:::bucket"]);
    }

    #[test]
    fn test_describe_produces_single_catalog_statement() {
        let statements =
            compile_table_permissions(&[TablePermission::Describe]).statements(&scope());
        assert_eq!(statements.len(), 1);
        assert_eq!(statements[0].actions, vec!["glue:GetTable"]);
        assert_eq!(statements[0].resources, vec![scope().database_arn]);
    }

    #[test]
    fn test_database_permissions() {
        let actions = compile_database_permissions(&[
            DatabasePermission::Describe,
            DatabasePermission::CreateTable,
            DatabasePermission::Describe,
        ]);
        assert_eq!(actions, vec!["glue:CreateTable", "glue:GetDatabase"]);

        let statement = database_statement(&[DatabasePermission::Super], "arn:db").unwrap();
        assert_eq!(statement.actions, vec!["glue:*Database*"]);
        assert_eq!(statement.resources, vec!["arn:db"]);
    }
}
