//! Integration tests for composing the demo manifest
//!
//! The demo manifest describes three zones, four roles and four datasets.
//! These tests synthesize it end to end.

#[path = "testutils/mod.rs"]
mod testutils;

use lakeform::glue::{CLASSIFIER_RESOURCE_TYPE, CRAWLER_RESOURCE_TYPE, DATABASE_RESOURCE_TYPE};
use lakeform::iam::role::{INSTANCE_PROFILE_RESOURCE_TYPE, ROLE_RESOURCE_TYPE, WORKGROUP_RESOURCE_TYPE};
use lakeform::lakeformation::PERMISSIONS_RESOURCE_TYPE;
use lakeform::storage::BUCKET_RESOURCE_TYPE;
use lakeform::{DependencyGraph, Environment, Filetype, LakeError, LakeManifest, Template};
use std::str::FromStr;
use tempfile::TempDir;
use testutils::lake_fixture::demo_manifest;

fn load_demo() -> LakeManifest {
    LakeManifest::from_path(demo_manifest("vre_data_lake.json")).expect("demo manifest parses")
}

#[test]
fn test_demo_manifest_composes() {
    let manifest = load_demo();
    manifest.validate().unwrap();

    let stack = manifest.compose().unwrap();
    assert_eq!(stack.name(), "vre-data-lake");
    assert_eq!(stack.environment().region, "ca-central-1");

    assert_eq!(stack.resources_of_type(BUCKET_RESOURCE_TYPE).len(), 4);
    assert_eq!(stack.resources_of_type(DATABASE_RESOURCE_TYPE).len(), 3);
    assert_eq!(stack.resources_of_type(CRAWLER_RESOURCE_TYPE).len(), 4);
    assert_eq!(stack.resources_of_type(CLASSIFIER_RESOURCE_TYPE).len(), 1);
    assert_eq!(stack.resources_of_type(WORKGROUP_RESOURCE_TYPE).len(), 1);
    assert_eq!(stack.resources_of_type(INSTANCE_PROFILE_RESOURCE_TYPE).len(), 1);

    // four manifest roles plus one crawler role per zone
    assert_eq!(stack.resources_of_type(ROLE_RESOURCE_TYPE).len(), 7);

    let buckets: Vec<String> = stack
        .resources_of_type(BUCKET_RESOURCE_TYPE)
        .into_iter()
        .map(|(_, r)| r.properties["BucketName"].as_str().unwrap().to_string())
        .collect();
    for bucket in [
        "vre-data-lake-raw",
        "vre-data-lake-structured",
        "vre-data-lake-consume",
        "vre-data-lake-dataengineer.athena-output",
    ] {
        assert!(buckets.iter().any(|b| b == bucket), "missing bucket {}", bucket);
    }
}

#[test]
fn test_demo_synth_is_acyclic_and_ordered() {
    let stack = load_demo().compose().unwrap();
    let template = stack.synth().unwrap();

    let graph = DependencyGraph::from_template(&template).unwrap();
    let order = graph.deployment_order().unwrap();
    assert_eq!(order.len(), template.len());

    let position = |id: &lakeform::LogicalId| order.iter().position(|o| o == id).unwrap();
    for (id, resource) in &template.resources {
        for dependency in &resource.depends_on {
            assert!(
                position(dependency) < position(id),
                "{} is deployed before its dependency {}",
                id,
                dependency
            );
        }
    }
}

#[test]
fn test_demo_grants_and_outputs() {
    let stack = load_demo().compose().unwrap();
    let template = stack.template();

    let wkt_insert = template
        .resources_of_type(PERMISSIONS_RESOURCE_TYPE)
        .into_iter()
        .any(|(_, r)| {
            r.properties["DataLakePrincipal"]["DataLakePrincipalIdentifier"]
                == "arn:aws:iam::123456789012:role/vre-data-lake-emr-ec2-task-role"
                && r.properties["Resource"]["TableResource"]["DatabaseName"]
                    == "vre_data_lake_structured"
                && r.properties["Permissions"]
                    == serde_json::json!(["DESCRIBE", "SELECT", "INSERT"])
        });
    assert!(wkt_insert);

    let output = template.outputs.get("emrtaskRoleArn").expect("role arn output");
    assert_eq!(
        output.value,
        "arn:aws:iam::123456789012:role/vre-data-lake-emr-ec2-task-role"
    );
    assert_eq!(
        output.export.as_ref().unwrap().name,
        "vre-data-lake-emr-task-role-arn"
    );
}

#[test]
fn test_template_round_trips_through_file() {
    let stack = load_demo().compose().unwrap();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("template.json");

    stack.synth_to_file(&path).unwrap();
    let written = std::fs::read_to_string(&path).unwrap();
    let template = Template::from_json(&written).unwrap();

    assert_eq!(template, stack.synth().unwrap());
    assert_eq!(
        template.description.as_deref(),
        Some("VRE data lake: raw, structured and consume zones with example datasets.")
    );
}

#[test]
fn test_manifest_environment_wins_over_default() {
    let manifest = load_demo().with_default_environment(Environment::new("999999999999", "eu-west-1"));
    let stack = manifest.compose().unwrap();
    assert_eq!(stack.environment().account, "123456789012");

    let mut manifest = load_demo();
    manifest.environment = None;
    let stack = manifest
        .with_default_environment(Environment::new("999999999999", "eu-west-1"))
        .compose()
        .unwrap();
    assert_eq!(stack.environment().account, "999999999999");
}

#[test]
fn test_manifest_json_errors() {
    assert!(matches!(
        LakeManifest::from_json("{ \"roles\": [] }"),
        Err(LakeError::ManifestError(_))
    ));
    assert!(matches!(
        LakeManifest::from_path(demo_manifest("missing.json")),
        Err(LakeError::IoError(_))
    ));
}

#[test]
fn test_every_filetype_has_a_classifier_entry() {
    for filetype in Filetype::ALL {
        let classifier = filetype.glue_classifier();
        assert!(!classifier.is_empty());
        assert_eq!(Filetype::from_str(filetype.name()).unwrap(), filetype);
    }
    assert!(Filetype::from_str("SPREADSHEET").is_err());
}
