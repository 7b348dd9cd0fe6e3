// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Plan formatting for CLI output

use colored::*;
use comfy_table::{presets::UTF8_FULL, Cell, Color, Table};
use lakeform::{DependencyGraph, Filetype, LakeResult, Template};

use super::commands::OutputFormat;

/// Renders a synthesized template as a deployment plan
pub struct PlanFormatter;

impl PlanFormatter {
    pub fn format(stack_name: &str, template: &Template, format: OutputFormat) -> LakeResult<String> {
        match format {
            OutputFormat::Table => Self::format_table(stack_name, template),
            OutputFormat::Json => Self::format_json(stack_name, template),
        }
    }

    /// One row per resource, in deployment order
    fn format_table(stack_name: &str, template: &Template) -> LakeResult<String> {
        if template.is_empty() {
            return Ok(format!("{}\n", "No resources declared".yellow()));
        }

        let order = DependencyGraph::from_template(template)?.deployment_order()?;

        let mut output = String::new();
        output.push_str(&format!("{}\n", format!("Plan for stack '{}'", stack_name).bold().green()));
        output.push_str(&format!("Resources: {}\n", template.len()));
        output.push_str(&format!("Outputs: {}\n\n", template.outputs.len()));

        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(vec![
            Cell::new("#").fg(Color::Green),
            Cell::new("Logical ID").fg(Color::Green),
            Cell::new("Type").fg(Color::Green),
            Cell::new("Path").fg(Color::Green),
            Cell::new("Depends On").fg(Color::Green),
        ]);

        for (i, id) in order.iter().enumerate() {
            let Some(resource) = template.get(id) else {
                continue;
            };
            let depends_on: Vec<&str> = resource.depends_on.iter().map(|d| d.as_str()).collect();
            table.add_row(vec![
                (i + 1).to_string(),
                id.to_string(),
                resource.resource_type.clone(),
                resource.path().unwrap_or("").to_string(),
                depends_on.join("\n"),
            ]);
        }

        output.push_str(&table.to_string());
        output.push('\n');

        if !template.outputs.is_empty() {
            output.push_str(&format!("\n{}\n", "Outputs:".bold()));
            for (name, value) in &template.outputs {
                let export = value
                    .export
                    .as_ref()
                    .map(|e| format!(" (export {})", e.name))
                    .unwrap_or_default();
                output.push_str(&format!("  {} = {}{}\n", name.cyan(), value.value, export));
            }
        }

        Ok(output)
    }

    fn format_json(stack_name: &str, template: &Template) -> LakeResult<String> {
        let order = DependencyGraph::from_template(template)?.deployment_order()?;
        let steps: Vec<serde_json::Value> = order
            .iter()
            .filter_map(|id| template.get(id).map(|r| (id, r)))
            .map(|(id, resource)| {
                serde_json::json!({
                    "logical_id": id,
                    "type": resource.resource_type,
                    "path": resource.path(),
                    "depends_on": resource.depends_on,
                })
            })
            .collect();

        let plan = serde_json::json!({
            "stack": stack_name,
            "resources": steps,
            "outputs": template.outputs.keys().collect::<Vec<_>>(),
        });
        Ok(format!("{}\n", serde_json::to_string_pretty(&plan)?))
    }

    /// Filetypes and the Glue classifier each one maps to
    pub fn format_classifiers() -> String {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(vec![
            Cell::new("Filetype").fg(Color::Green),
            Cell::new("Glue Classifier").fg(Color::Green),
        ]);
        for filetype in Filetype::ALL {
            let classifier = if filetype.has_builtin_classifier() {
                Cell::new(filetype.glue_classifier())
            } else {
                Cell::new(filetype.glue_classifier()).fg(Color::Yellow)
            };
            table.add_row(vec![Cell::new(filetype.name()), classifier]);
        }
        format!("{}\n", table)
    }
}
