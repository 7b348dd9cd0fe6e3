// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Composition root
//!
//! A [`Stack`] is a cheap-to-clone handle on the template being composed. Zones,
//! roles and datasets hold a clone and append their declarations to it; nothing
//! is ever removed once declared.

use crate::config::{Environment, LakeConfig};
use crate::error::{LakeError, LakeResult};
use crate::graph::DependencyGraph;
use crate::naming::Arns;
use crate::template::{LogicalId, Output, Resource, Template, PATH_METADATA_KEY};
use parking_lot::RwLock;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;

struct StackInner {
    name: String,
    environment: Environment,
    template: RwLock<Template>,
}

/// Shared handle on one composition pass
#[derive(Clone)]
pub struct Stack {
    inner: Arc<StackInner>,
}

impl std::fmt::Debug for Stack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stack")
            .field("name", &self.inner.name)
            .field("resources", &self.inner.template.read().len())
            .finish()
    }
}

impl Stack {
    pub fn new(name: impl Into<String>, environment: Environment) -> Self {
        let name = name.into();
        log::info!(
            "Composing stack '{}' for account {} in {}",
            name,
            environment.account,
            environment.region
        );
        Self {
            inner: Arc::new(StackInner {
                name,
                environment,
                template: RwLock::new(Template::new()),
            }),
        }
    }

    /// Create a stack from a validated lake configuration
    pub fn from_config(config: &LakeConfig) -> LakeResult<Self> {
        config.validate()?;
        let stack = Self::new(config.stack_name.clone(), config.environment.clone());
        if let Some(description) = &config.description {
            stack.set_description(description.clone());
        }
        Ok(stack)
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn environment(&self) -> &Environment {
        &self.inner.environment
    }

    pub fn arns(&self) -> Arns<'_> {
        Arns::new(&self.inner.environment)
    }

    /// Construct path of a top-level component
    pub fn path(&self, id: &str) -> String {
        child_path(&self.inner.name, id)
    }

    pub fn set_description(&self, description: impl Into<String>) {
        self.inner.template.write().description = Some(description.into());
    }

    /// Declare a resource at `path`
    pub fn add_resource(&self, path: &str, mut resource: Resource) -> LakeResult<LogicalId> {
        let id = LogicalId::from_path(path);
        resource
            .metadata
            .insert(PATH_METADATA_KEY.to_string(), Value::String(path.to_string()));

        let resource_type = resource.resource_type.clone();
        self.inner.template.write().insert(id.clone(), resource)?;
        log::debug!("Declared {} {} at {}", resource_type, id, path);
        Ok(id)
    }

    /// Replace the properties of an already declared resource
    pub fn replace_properties(&self, id: &LogicalId, properties: Value) -> LakeResult<()> {
        let mut template = self.inner.template.write();
        template.get_mut(id)?.properties = properties;
        Ok(())
    }

    /// Record that `dependent` may only be created after `dependency`
    pub fn add_dependency(&self, dependent: &LogicalId, dependency: &LogicalId) -> LakeResult<()> {
        let mut template = self.inner.template.write();
        if !template.contains(dependency) {
            return Err(LakeError::UnknownResource(dependency.to_string()));
        }
        template
            .get_mut(dependent)?
            .depends_on
            .insert(dependency.clone());
        log::debug!("{} depends on {}", dependent, dependency);
        Ok(())
    }

    pub fn add_output(&self, name: impl Into<String>, output: Output) -> LakeResult<()> {
        let name: String = name.into();
        let mut template = self.inner.template.write();
        if template.outputs.contains_key(&name) {
            return Err(LakeError::DuplicateResource(format!("output '{}'", name)));
        }
        template.outputs.insert(name, output);
        Ok(())
    }

    pub fn resource(&self, id: &LogicalId) -> Option<Resource> {
        self.inner.template.read().get(id).cloned()
    }

    pub fn contains(&self, id: &LogicalId) -> bool {
        self.inner.template.read().contains(id)
    }

    pub fn resources_of_type(&self, resource_type: &str) -> Vec<(LogicalId, Resource)> {
        self.inner
            .template
            .read()
            .resources_of_type(resource_type)
            .into_iter()
            .map(|(id, r)| (id.clone(), r.clone()))
            .collect()
    }

    pub fn resource_count(&self) -> usize {
        self.inner.template.read().len()
    }

    /// Snapshot of the template without validation
    pub fn template(&self) -> Template {
        self.inner.template.read().clone()
    }

    /// Validate dependency ordering and return the finished template
    pub fn synth(&self) -> LakeResult<Template> {
        let template = self.template();
        let order = DependencyGraph::from_template(&template)?.deployment_order()?;
        log::info!(
            "Synthesized stack '{}' with {} resources and {} outputs",
            self.inner.name,
            order.len(),
            template.outputs.len()
        );
        Ok(template)
    }

    pub fn synth_to_file<P: AsRef<Path>>(&self, path: P) -> LakeResult<()> {
        let json = self.synth()?.to_json_pretty()?;
        std::fs::write(path.as_ref(), json)?;
        log::info!("Wrote template to {}", path.as_ref().display());
        Ok(())
    }
}

/// Join a construct path with a child id
pub fn child_path(parent: &str, id: &str) -> String {
    format!("{}/{}", parent, id)
}
