// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Resource dependency graph
//!
//! Ordering between declared resources is expressed as explicit `DependsOn`
//! edges. The provisioning engine resolves them at apply time; this module
//! resolves them locally so composition can reject cycles and report the order
//! resources will be created in.

use crate::error::{LakeError, LakeResult};
use crate::template::{LogicalId, Template};
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::collections::HashMap;

/// Directed graph with an edge from each dependency to its dependent
#[derive(Debug)]
pub struct DependencyGraph {
    graph: DiGraph<LogicalId, ()>,
    node_indices: HashMap<LogicalId, NodeIndex>,
}

impl DependencyGraph {
    /// Build the graph from a template's `DependsOn` edges
    ///
    /// Fails with `UnknownResource` when an edge targets an undeclared resource.
    pub fn from_template(template: &Template) -> LakeResult<Self> {
        let mut graph = DiGraph::new();
        let mut node_indices = HashMap::new();

        for id in template.resources.keys() {
            let index = graph.add_node(id.clone());
            node_indices.insert(id.clone(), index);
        }

        for (id, resource) in &template.resources {
            let dependent = node_indices[id];
            for dependency in &resource.depends_on {
                let dependency_index = node_indices.get(dependency).ok_or_else(|| {
                    LakeError::UnknownResource(format!(
                        "'{}' depends on undeclared resource '{}'",
                        id, dependency
                    ))
                })?;
                graph.add_edge(*dependency_index, dependent, ());
            }
        }

        Ok(Self {
            graph,
            node_indices,
        })
    }

    /// Resources in an order where every dependency precedes its dependents
    pub fn deployment_order(&self) -> LakeResult<Vec<LogicalId>> {
        toposort(&self.graph, None)
            .map(|order| {
                order
                    .into_iter()
                    .map(|index| self.graph[index].clone())
                    .collect()
            })
            .map_err(|cycle| LakeError::DependencyCycle(self.graph[cycle.node_id()].to_string()))
    }

    /// Direct dependencies of `id`
    pub fn dependencies_of(&self, id: &LogicalId) -> Vec<LogicalId> {
        let Some(index) = self.node_indices.get(id) else {
            return Vec::new();
        };
        let mut ids: Vec<LogicalId> = self
            .graph
            .neighbors_directed(*index, Direction::Incoming)
            .map(|n| self.graph[n].clone())
            .collect();
        ids.sort();
        ids
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}
