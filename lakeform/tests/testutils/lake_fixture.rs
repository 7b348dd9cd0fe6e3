//! Lake fixture for lakeform integration tests
//!
//! Uses only the public crate API.

use lakeform::lakeformation::PERMISSIONS_RESOURCE_TYPE;
use lakeform::{
    Environment, LogicalId, PolicyStatement, Principal, Resource, Role, RoleProps, Stack, Zone,
};
use std::path::PathBuf;

pub const LAKE_NAME: &str = "test_lake";
pub const ACCOUNT: &str = "123456789012";

pub struct LakeFixture {
    pub stack: Stack,
    pub registration: Role,
    pub analyst: Role,
}

impl LakeFixture {
    pub fn new() -> Self {
        let stack = Stack::new("test-lake", Environment::new(ACCOUNT, "us-east-1"));
        let registration = Role::new(
            &stack,
            &stack.path("iam"),
            "registration",
            RoleProps::new(
                "test-lake-registration",
                Principal::Composite(vec![
                    Principal::service("glue.amazonaws.com"),
                    Principal::service("lakeformation.amazonaws.com"),
                ]),
            ),
        )
        .expect("registration role");
        let analyst = Role::new(
            &stack,
            &stack.path("iam"),
            "analyst",
            RoleProps::new("test-lake-analyst", Principal::account(ACCOUNT)),
        )
        .expect("analyst role");

        Self {
            stack,
            registration,
            analyst,
        }
    }

    /// Zone named `{LAKE_NAME}_{suffix}`
    pub fn zone(&self, suffix: &str) -> Zone {
        Zone::new(
            &self.stack,
            &format!("zone.{}", suffix),
            &format!("{}_{}", LAKE_NAME, suffix),
            &self.registration,
        )
        .expect("zone")
    }

    pub fn role(&self, id: &str) -> Role {
        Role::new(
            &self.stack,
            &self.stack.path("iam"),
            id,
            RoleProps::new(format!("test-lake-{}", id), Principal::account(ACCOUNT)),
        )
        .expect("role")
    }

    pub fn resource(&self, id: &LogicalId) -> Resource {
        self.stack.resource(id).expect("declared resource")
    }

    /// Lake Formation grant records, in logical id order
    pub fn grants(&self) -> Vec<(LogicalId, Resource)> {
        self.stack.resources_of_type(PERMISSIONS_RESOURCE_TYPE)
    }
}

/// Find a statement with exactly these actions
pub fn find_statement<'a>(
    statements: &'a [PolicyStatement],
    actions: &[&str],
) -> Option<&'a PolicyStatement> {
    statements.iter().find(|s| s.actions == actions)
}

/// Path of a manifest shipped in the workspace `demos/` directory
pub fn demo_manifest(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("demos")
        .join(name)
}
