//! Navigation rules (V001–V003).

use std::collections::HashSet;

use petgraph::visit::Bfs;

use super::ValidationError;
use super::graph::NavigationGraph;
use crate::keywords::{FAILURE_RESULT, SUCCESS_RESULT};
use crate::model::Workflow;

/// Run all navigation rules. Returns all errors found.
pub fn validate_structural(workflow: &Workflow, graph: &NavigationGraph) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    v001_targets_exist(workflow, graph, &mut errors);
    v002_all_reachable_from_first_task(workflow, graph, &mut errors);
    v003_success_and_failure_handled(workflow, &mut errors);

    errors
}

fn v001_targets_exist(workflow: &Workflow, graph: &NavigationGraph, errors: &mut Vec<ValidationError>) {
    for (task, label, target) in graph.dangling_targets(workflow) {
        errors.push(ValidationError::new(
            "V001",
            format!(
                "Task '{}' navigates '{}' to '{}', which is neither a task nor a result",
                task, label, target
            ),
            Some(task),
        ));
    }
}

fn v002_all_reachable_from_first_task(
    workflow: &Workflow,
    graph: &NavigationGraph,
    errors: &mut Vec<ValidationError>,
) {
    let Some(first) = workflow.first() else { return };
    let Some(&start) = graph.node_indices.get(&first.name) else {
        return;
    };

    let mut reachable = HashSet::new();
    let mut bfs = Bfs::new(&graph.graph, start);
    while let Some(nx) = bfs.next(&graph.graph) {
        reachable.insert(nx);
    }

    for task in &workflow.tasks {
        let Some(&idx) = graph.node_indices.get(&task.name) else {
            continue;
        };
        if !reachable.contains(&idx) {
            errors.push(ValidationError::new(
                "V002",
                format!("Task '{}' is not reachable from '{}'", task.name, first.name),
                Some(task.name.as_str()),
            ));
        }
    }
}

fn v003_success_and_failure_handled(workflow: &Workflow, errors: &mut Vec<ValidationError>) {
    for task in &workflow.tasks {
        for label in [SUCCESS_RESULT, FAILURE_RESULT] {
            if task.next(label).is_none() {
                errors.push(ValidationError::new(
                    "V003",
                    format!("Task '{}' has no navigation for '{}'", task.name, label),
                    Some(task.name.as_str()),
                ));
            }
        }
    }
}
