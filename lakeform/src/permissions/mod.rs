// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Symbolic permission vocabulary
//!
//! Permissions are stated against catalog databases and tables without naming
//! any vendor action. [`compiler`] turns them into the IAM actions needed at each
//! enforcement point.

pub mod compiler;

pub use compiler::{
    compile_database_permissions, compile_table_permissions, database_statement, TableActions,
    TableScope,
};

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Capability on a catalog database
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DatabasePermission {
    Alter,
    CreateTable,
    Describe,
    Drop,
    Super,
}

impl DatabasePermission {
    pub const ALL: [DatabasePermission; 5] = [
        DatabasePermission::Alter,
        DatabasePermission::CreateTable,
        DatabasePermission::Describe,
        DatabasePermission::Drop,
        DatabasePermission::Super,
    ];

    /// Permission literal understood by Lake Formation
    pub fn lake_formation_name(&self) -> &'static str {
        match self {
            DatabasePermission::Alter => "ALTER",
            DatabasePermission::CreateTable => "CREATE_TABLE",
            DatabasePermission::Describe => "DESCRIBE",
            DatabasePermission::Drop => "DROP",
            DatabasePermission::Super => "ALL",
        }
    }
}

impl fmt::Display for DatabasePermission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DatabasePermission::Alter => "ALTER",
            DatabasePermission::CreateTable => "CREATE_TABLE",
            DatabasePermission::Describe => "DESCRIBE",
            DatabasePermission::Drop => "DROP",
            DatabasePermission::Super => "SUPER",
        };
        write!(f, "{}", s)
    }
}

/// Capability on a catalog table and the objects under it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TablePermission {
    Alter,
    Delete,
    Describe,
    Drop,
    Insert,
    Select,
    Super,
}

impl TablePermission {
    pub const ALL: [TablePermission; 7] = [
        TablePermission::Alter,
        TablePermission::Delete,
        TablePermission::Describe,
        TablePermission::Drop,
        TablePermission::Insert,
        TablePermission::Select,
        TablePermission::Super,
    ];

    /// Permission literal understood by Lake Formation
    pub fn lake_formation_name(&self) -> &'static str {
        match self {
            TablePermission::Alter => "ALTER",
            TablePermission::Delete => "DELETE",
            TablePermission::Describe => "DESCRIBE",
            TablePermission::Drop => "DROP",
            TablePermission::Insert => "INSERT",
            TablePermission::Select => "SELECT",
            TablePermission::Super => "ALL",
        }
    }
}

impl fmt::Display for TablePermission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TablePermission::Alter => "ALTER",
            TablePermission::Delete => "DELETE",
            TablePermission::Describe => "DESCRIBE",
            TablePermission::Drop => "DROP",
            TablePermission::Insert => "INSERT",
            TablePermission::Select => "SELECT",
            TablePermission::Super => "SUPER",
        };
        write!(f, "{}", s)
    }
}

/// Collapse a permission list into a set: order and duplicates are irrelevant
pub fn permission_set<P: Copy + Ord>(permissions: &[P]) -> BTreeSet<P> {
    permissions.iter().copied().collect()
}

/// Lake Formation literals for a table permission list, deduplicated
pub fn table_lake_formation_names(permissions: &[TablePermission]) -> Vec<&'static str> {
    permission_set(permissions)
        .into_iter()
        .map(|p| p.lake_formation_name())
        .collect()
}

/// Lake Formation literals for a database permission list, deduplicated
pub fn database_lake_formation_names(permissions: &[DatabasePermission]) -> Vec<&'static str> {
    permission_set(permissions)
        .into_iter()
        .map(|p| p.lake_formation_name())
        .collect()
}
