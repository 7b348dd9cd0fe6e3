// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Lake Formation grant records and location registration

use crate::error::{LakeError, LakeResult};
use crate::stack::Stack;
use crate::template::{LogicalId, Resource};
use serde_json::{json, Value};

pub const PERMISSIONS_RESOURCE_TYPE: &str = "AWS::LakeFormation::Permissions";
pub const REGISTRATION_RESOURCE_TYPE: &str = "AWS::LakeFormation::Resource";

/// Permission letting a principal use a registered location
pub const DATA_LOCATION_ACCESS: &str = "DATA_LOCATION_ACCESS";

/// Governed resource a grant applies to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataLakeResource {
    Database { name: String },
    Table { database: String, name: String },
    DataLocation { s3_arn: String },
}

impl DataLakeResource {
    fn to_cfn(&self, catalog_id: &str) -> Value {
        match self {
            DataLakeResource::Database { name } => json!({
                "DatabaseResource": { "CatalogId": catalog_id, "Name": name }
            }),
            DataLakeResource::Table { database, name } => json!({
                "TableResource": {
                    "CatalogId": catalog_id,
                    "DatabaseName": database,
                    "Name": name,
                }
            }),
            DataLakeResource::DataLocation { s3_arn } => json!({
                "DataLocationResource": { "CatalogId": catalog_id, "S3Resource": s3_arn }
            }),
        }
    }
}

/// Declare one grant of `permissions` on `resource` to `principal_arn`
pub fn declare_permissions<'a, I>(
    stack: &Stack,
    path: &str,
    principal_arn: &str,
    resource: &DataLakeResource,
    permissions: &[&str],
    depends_on: I,
) -> LakeResult<LogicalId>
where
    I: IntoIterator<Item = &'a LogicalId>,
{
    if permissions.is_empty() {
        return Err(LakeError::InvalidConfiguration(format!(
            "grant at '{}' has no permissions",
            path
        )));
    }
    let properties = json!({
        "DataLakePrincipal": { "DataLakePrincipalIdentifier": principal_arn },
        "Resource": resource.to_cfn(stack.environment().catalog_id()),
        "Permissions": permissions,
        "PermissionsWithGrantOption": [],
    });
    stack.add_resource(
        path,
        Resource::new(PERMISSIONS_RESOURCE_TYPE, properties).depends_on(depends_on),
    )
}

/// Register an S3 location with Lake Formation, accessed through `role_arn`
pub fn declare_resource_registration<'a, I>(
    stack: &Stack,
    path: &str,
    resource_arn: &str,
    role_arn: &str,
    depends_on: I,
) -> LakeResult<LogicalId>
where
    I: IntoIterator<Item = &'a LogicalId>,
{
    let properties = json!({
        "ResourceArn": resource_arn,
        "UseServiceLinkedRole": false,
        "RoleArn": role_arn,
    });
    stack.add_resource(
        path,
        Resource::new(REGISTRATION_RESOURCE_TYPE, properties).depends_on(depends_on),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Environment;

    fn no_deps<'a>() -> std::iter::Empty<&'a LogicalId> {
        std::iter::empty()
    }

    #[test]
    fn test_table_grant() {
        let stack = Stack::new("lake", Environment::default());
        let resource = DataLakeResource::Table {
            database: "lake_raw".to_string(),
            name: "a".to_string(),
        };
        let id = declare_permissions(
            &stack,
            "lake/grant",
            "arn:aws:iam::123456789012:role/r",
            &resource,
            &["SELECT", "DESCRIBE"],
            no_deps(),
        )
        .unwrap();

        let grant = stack.resource(&id).unwrap();
        assert_eq!(
            grant.properties["Resource"],
            json!({
                "TableResource": {
                    "CatalogId": "123456789012",
                    "DatabaseName": "lake_raw",
                    "Name": "a"
                }
            })
        );
        assert_eq!(grant.properties["Permissions"], json!(["SELECT", "DESCRIBE"]));
        assert_eq!(
            grant.properties["DataLakePrincipal"]["DataLakePrincipalIdentifier"],
            "arn:aws:iam::123456789012:role/r"
        );
    }

    #[test]
    fn test_empty_grant_is_not_declared() {
        let stack = Stack::new("lake", Environment::default());
        let resource = DataLakeResource::Database {
            name: "lake_raw".to_string(),
        };
        assert!(declare_permissions(&stack, "lake/g", "arn", &resource, &[], no_deps()).is_err());
        assert_eq!(stack.resource_count(), 0);
    }

    #[test]
    fn test_data_location_and_registration() {
        let stack = Stack::new("lake", Environment::default().with_catalog_id("999988887777"));
        let registration = declare_resource_registration(
            &stack,
            "lake/reg",
            "arn:aws:s3:::bucket/a/*",
            "arn:aws:iam::123456789012:role/registration",
            no_deps(),
        )
        .unwrap();
        let registered = stack.resource(&registration).unwrap();
        assert_eq!(registered.properties["UseServiceLinkedRole"], false);

        let grant = declare_permissions(
            &stack,
            "lake/access",
            "arn:aws:iam::123456789012:role/crawler",
            &DataLakeResource::DataLocation {
                s3_arn: "arn:aws:s3:::bucket/a/*".to_string(),
            },
            &[DATA_LOCATION_ACCESS],
            [&registration],
        )
        .unwrap();
        let grant = stack.resource(&grant).unwrap();
        assert_eq!(
            grant.properties["Resource"]["DataLocationResource"]["CatalogId"],
            "999988887777"
        );
        assert!(grant.depends_on.contains(&registration));
    }
}
