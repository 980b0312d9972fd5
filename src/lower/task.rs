//! Compile one raw task entry into a `Task` node.

use serde_json::Value;
use tracing::trace;

use super::Scope;
use super::reference::{resolve_ref_id, resolve_system_properties};
use crate::error::CompilerError;
use crate::extract::{Stage, run_stage, validate_keys};
use crate::keywords::*;
use crate::model::{FieldValue, Navigation, Task};
use crate::parse::RawMap;

/// Build a task from its (already loop-unwrapped) body.
///
/// `default_success` / `default_failure` become the navigation map unless the
/// task authors a non-empty `navigate` section, which then replaces them
/// wholesale.
pub fn compile_task(
    scope: &Scope<'_>,
    name: &str,
    raw: &RawMap,
    default_success: &str,
    default_failure: &str,
) -> Result<Task, CompilerError> {
    if raw.is_empty() {
        return Err(CompilerError::missing(
            "T001",
            name,
            format!("Task '{}' has no data", name),
        ));
    }

    let registry = scope.registry;
    validate_keys(
        name,
        raw,
        &registry.stages(&[Stage::BeforeTask, Stage::AfterTask]),
        TASK_ADDITIONAL_KEYWORDS,
    )?;

    let mut pre_task_data = run_stage(name, raw, &registry.stage(Stage::BeforeTask))?;
    let post_task_data = run_stage(name, raw, &registry.stage(Stage::AfterTask))?;

    if let Some(FieldValue::Inputs(inputs)) = pre_task_data.get_mut(DO_KEY) {
        resolve_system_properties(inputs, scope.imports).map_err(|e| e.in_unit(name))?;
    }

    let reference = callee_reference(name, raw)?;
    let ref_id = resolve_ref_id(reference, scope.imports).map_err(|e| e.in_unit(name))?;

    let navigation = match post_task_data
        .get(NAVIGATION_KEY)
        .and_then(FieldValue::as_navigation)
    {
        Some(authored) if !authored.is_empty() => authored.clone(),
        _ => default_navigation(default_success, default_failure),
    };

    trace!(task = name, ref_id = %ref_id, ?navigation, "compiled task");

    Ok(Task {
        name: name.to_string(),
        ref_id,
        navigation,
        pre_task_data,
        post_task_data,
    })
}

fn default_navigation(success: &str, failure: &str) -> Navigation {
    Navigation::from([
        (SUCCESS_RESULT.to_string(), success.to_string()),
        (FAILURE_RESULT.to_string(), failure.to_string()),
    ])
}

/// The single key under `do`.
fn callee_reference<'a>(name: &str, raw: &'a RawMap) -> Result<&'a str, CompilerError> {
    let callee = match raw.get(DO_KEY) {
        Some(Value::Object(map)) => map,
        None | Some(Value::Null) => {
            return Err(CompilerError::missing(
                "T004",
                name,
                format!("Task '{}' has no reference information", name),
            ));
        }
        Some(_) => {
            return Err(CompilerError::shape(
                "T005",
                name,
                format!("Task '{}': '{}' must map one executable reference to its bindings", name, DO_KEY),
            ));
        }
    };

    let mut keys = callee.keys();
    match (keys.next(), keys.next()) {
        (Some(reference), None) => Ok(reference.as_str()),
        (None, _) => Err(CompilerError::missing(
            "T004",
            name,
            format!("Task '{}' has no reference information", name),
        )),
        (Some(_), Some(_)) => Err(CompilerError::shape(
            "T005",
            name,
            format!("Task '{}': '{}' must reference exactly one executable", name, DO_KEY),
        )),
    }
}
