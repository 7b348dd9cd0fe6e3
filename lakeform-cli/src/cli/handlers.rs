// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! CLI command handlers for Lakeform

use colored::Colorize;
use std::path::{Path, PathBuf};

use super::commands::OutputFormat;
use super::output::PlanFormatter;
use lakeform::{Environment, LakeManifest, Stack};

/// Load a manifest, filling in the environment from the process when the
/// manifest states none
fn load_manifest(path: &Path) -> Result<LakeManifest, Box<dyn std::error::Error>> {
    if !path.exists() {
        return Err(format!("Manifest not found at {:?}", path).into());
    }
    let manifest = LakeManifest::from_path(path)
        .map_err(|e| format!("Failed to load manifest: {}", e))?
        .with_default_environment(Environment::from_env());
    log::debug!("Loaded manifest for lake '{}'", manifest.lake_name);
    Ok(manifest)
}

fn compose(path: &Path) -> Result<(LakeManifest, Stack), Box<dyn std::error::Error>> {
    let manifest = load_manifest(path)?;
    let stack = manifest
        .compose()
        .map_err(|e| format!("Failed to compose lake '{}': {}", manifest.lake_name, e))?;
    Ok((manifest, stack))
}

/// Handle the synth command
pub fn handle_synth(manifest: PathBuf, out: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let (_, stack) = compose(&manifest)?;

    match out {
        Some(path) => {
            stack.synth_to_file(&path)?;
            eprintln!(
                "{}",
                format!(
                    "Wrote {} resources for stack '{}' to {:?}",
                    stack.resource_count(),
                    stack.name(),
                    path
                )
                .green()
            );
        }
        None => {
            let json = stack.synth()?.to_json_pretty()?;
            println!("{}", json);
        }
    }
    Ok(())
}

/// Handle the plan command
pub fn handle_plan(manifest: PathBuf, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let (_, stack) = compose(&manifest)?;
    let template = stack.synth()?;
    let rendered = PlanFormatter::format(stack.name(), &template, format)?;
    print!("{}", rendered);
    Ok(())
}

/// Handle the validate command
pub fn handle_validate(manifest: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let lake = load_manifest(&manifest)?;
    match lake.validate() {
        Ok(()) => {
            println!(
                "{}",
                format!(
                    "✅ Manifest for lake '{}' is valid: {} roles, {} zones, {} datasets",
                    lake.lake_name,
                    lake.roles.len(),
                    lake.zones.len(),
                    lake.datasets.len()
                )
                .green()
            );
            Ok(())
        }
        Err(e) => {
            println!("{}", format!("❌ {}", e).red());
            Err(e.into())
        }
    }
}

/// Handle the classifiers command
pub fn handle_classifiers() -> Result<(), Box<dyn std::error::Error>> {
    print!("{}", PlanFormatter::format_classifiers());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn demo() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("demos")
            .join("vre_data_lake.json")
    }

    #[test]
    fn test_synth_writes_template() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("template.json");

        handle_synth(demo(), Some(out.clone())).unwrap();

        let template = lakeform::Template::from_json(&std::fs::read_to_string(&out).unwrap()).unwrap();
        assert!(!template.is_empty());
    }

    #[test]
    fn test_missing_manifest() {
        let dir = TempDir::new().unwrap();
        let result = handle_validate(dir.path().join("nope.json"));
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_manifest_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, r#"{ "lake_name": "bad-name" }"#).unwrap();

        assert!(handle_validate(path.clone()).is_err());
        assert!(handle_synth(path, None).is_err());
    }
}
