//! Navigation validation over a compiled workflow.
//!
//! Optional: the builder runs it only when `BuilderConfig::validate_navigation`
//! is set; `wasm::validate_source` always runs it.

pub mod graph;
pub mod structural;

pub use graph::NavigationGraph;

use serde::Serialize;

use crate::model::Workflow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub code: &'static str,
    pub message: String,
    /// Offending task, when the rule is about a single task.
    pub task: Option<String>,
}

impl ValidationError {
    pub fn new(code: &'static str, message: impl Into<String>, task: Option<&str>) -> Self {
        ValidationError {
            code,
            message: message.into(),
            task: task.map(str::to_string),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Validate every task's navigation. Returns all errors found.
pub fn validate_workflow(workflow: &Workflow) -> Vec<ValidationError> {
    let graph = NavigationGraph::build(workflow);
    structural::validate_structural(workflow, &graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FieldMap, Navigation, Task};

    fn task(name: &str, nav: &[(&str, &str)]) -> Task {
        Task {
            name: name.into(),
            ref_id: format!("pkg.{}", name),
            navigation: nav
                .iter()
                .map(|(l, t)| (l.to_string(), t.to_string()))
                .collect::<Navigation>(),
            pre_task_data: FieldMap::new(),
            post_task_data: FieldMap::new(),
        }
    }

    fn codes(errors: &[ValidationError]) -> Vec<&'static str> {
        errors.iter().map(|e| e.code).collect()
    }

    #[test]
    fn linear_flow_is_clean() {
        let workflow = Workflow {
            tasks: vec![
                task("a", &[("SUCCESS", "b"), ("FAILURE", "FAILURE")]),
                task("b", &[("SUCCESS", "SUCCESS"), ("FAILURE", "FAILURE")]),
            ],
        };
        assert!(validate_workflow(&workflow).is_empty());
    }

    #[test]
    fn unknown_target_is_reported() {
        let workflow = Workflow {
            tasks: vec![task("a", &[("SUCCESS", "nowhere"), ("FAILURE", "FAILURE")])],
        };
        let errors = validate_workflow(&workflow);
        assert_eq!(codes(&errors), vec!["V001"]);
        assert_eq!(errors[0].task.as_deref(), Some("a"));
    }

    #[test]
    fn unreachable_task_is_reported() {
        let workflow = Workflow {
            tasks: vec![
                task("a", &[("SUCCESS", "SUCCESS"), ("FAILURE", "FAILURE")]),
                task("orphan", &[("SUCCESS", "SUCCESS"), ("FAILURE", "FAILURE")]),
            ],
        };
        let errors = validate_workflow(&workflow);
        assert_eq!(codes(&errors), vec!["V002"]);
        assert_eq!(errors[0].task.as_deref(), Some("orphan"));
    }

    #[test]
    fn missing_failure_label_is_reported() {
        let workflow = Workflow {
            tasks: vec![task("a", &[("SUCCESS", "SUCCESS")])],
        };
        let errors = validate_workflow(&workflow);
        assert_eq!(codes(&errors), vec!["V003"]);
    }

    #[test]
    fn graph_links_terminals_once() {
        let workflow = Workflow {
            tasks: vec![
                task("a", &[("SUCCESS", "b"), ("FAILURE", "FAILURE")]),
                task("b", &[("SUCCESS", "SUCCESS"), ("FAILURE", "FAILURE")]),
            ],
        };
        let graph = NavigationGraph::build(&workflow);
        assert_eq!(graph.graph.node_count(), 4);
        assert_eq!(graph.incoming_count("FAILURE"), 2);
        assert_eq!(graph.successors("a").len(), 2);
    }
}
