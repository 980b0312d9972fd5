//! Direct dependencies of a compiled flow.

use crate::model::{Dependencies, DependencyKind, Workflow};

/// Every distinct callee of the workflow's tasks, main body and error chain
/// alike. Callees of callees are not followed.
pub fn direct_dependencies(workflow: &Workflow) -> Dependencies {
    workflow
        .tasks
        .iter()
        .map(|task| (task.ref_id.clone(), DependencyKind::Executable))
        .collect()
}
