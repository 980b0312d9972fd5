//! petgraph-based directed graph over a compiled workflow's navigation.

use std::collections::HashMap;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;

use crate::keywords::is_terminal;
use crate::model::Workflow;

/// One node per task and one per terminal result that is navigated to. Edges
/// carry the result label.
pub struct NavigationGraph {
    pub graph: DiGraph<String, String>,
    pub node_indices: HashMap<String, NodeIndex>,
}

impl NavigationGraph {
    /// Build the graph. Targets that are neither a task nor a terminal result
    /// are left out; `dangling_targets` reports them.
    pub fn build(workflow: &Workflow) -> Self {
        let mut graph = DiGraph::new();
        let mut node_indices = HashMap::new();

        for task in &workflow.tasks {
            let idx = graph.add_node(task.name.clone());
            node_indices.entry(task.name.clone()).or_insert(idx);
        }

        for task in &workflow.tasks {
            let source = node_indices[&task.name];
            for (label, target) in &task.navigation {
                let target_idx = match node_indices.get(target) {
                    Some(&idx) => idx,
                    None if is_terminal(target) => {
                        let idx = graph.add_node(target.clone());
                        node_indices.insert(target.clone(), idx);
                        idx
                    }
                    None => continue,
                };
                graph.add_edge(source, target_idx, label.clone());
            }
        }

        NavigationGraph { graph, node_indices }
    }

    /// `(task, label, target)` for every navigation entry whose target names
    /// neither a task nor a terminal result.
    pub fn dangling_targets<'w>(&self, workflow: &'w Workflow) -> Vec<(&'w str, &'w str, &'w str)> {
        workflow
            .tasks
            .iter()
            .flat_map(|task| {
                task.navigation
                    .iter()
                    .map(move |(label, target)| (task.name.as_str(), label.as_str(), target.as_str()))
            })
            .filter(|(_, _, target)| !self.node_indices.contains_key(*target))
            .collect()
    }

    pub fn successors(&self, name: &str) -> Vec<(&str, &str)> {
        let Some(&idx) = self.node_indices.get(name) else {
            return vec![];
        };
        self.graph
            .edges(idx)
            .map(|edge| (edge.weight().as_str(), self.graph[edge.target()].as_str()))
            .collect()
    }

    pub fn incoming_count(&self, name: &str) -> usize {
        let Some(&idx) = self.node_indices.get(name) else {
            return 0;
        };
        self.graph
            .neighbors_directed(idx, petgraph::Direction::Incoming)
            .count()
    }
}
