//! Workflow builder: walk the authored task map in order, compute default
//! navigation, and splice the error-handling chain after the main body.

use serde_json::Value;
use tracing::{debug, warn};

use super::Scope;
use super::task::compile_task;
use crate::error::CompilerError;
use crate::keywords::*;
use crate::model::Workflow;
use crate::parse::{RawMap, value_type_name};

/// Compile an ordered task map.
///
/// Defaults per task:
/// - `SUCCESS` goes to the next authored task; the last task ends in
///   `SUCCESS`, or in `FAILURE` when compiling an error chain.
/// - `FAILURE` goes to the first task of `error_chain` when compiling a main
///   body, and ends in `FAILURE` otherwise.
///
/// An `on_failure` section still present in `raw_tasks` is removed and
/// compiled as this call's error chain.
pub fn compile_workflow(
    scope: &Scope<'_>,
    mut raw_tasks: RawMap,
    error_chain: Option<Workflow>,
    is_error_chain: bool,
) -> Result<Workflow, CompilerError> {
    let error_chain = match (error_chain, take_error_section(scope.unit, &mut raw_tasks)?) {
        (Some(_), Some(_)) => {
            return Err(CompilerError::shape(
                "W004",
                scope.unit,
                format!("'{}' is declared more than once", ON_FAILURE_KEY),
            ));
        }
        (Some(chain), None) => Some(chain),
        (None, Some(section)) => Some(compile_workflow(scope, section, None, true)?),
        (None, None) => None,
    };

    if raw_tasks.is_empty() {
        return Err(CompilerError::missing(
            "W001",
            scope.unit,
            "A workflow must have tasks",
        ));
    }

    let default_failure = match (&error_chain, is_error_chain) {
        (Some(chain), false) => chain
            .first()
            .map(|t| t.name.clone())
            .unwrap_or_else(|| FAILURE_RESULT.to_string()),
        _ => FAILURE_RESULT.to_string(),
    };

    let next_names: Vec<Option<String>> = raw_tasks
        .keys()
        .skip(1)
        .map(|k| Some(k.clone()))
        .chain(std::iter::once(None))
        .collect();

    let mut tasks = Vec::with_capacity(raw_tasks.len());
    for ((name, body), next) in raw_tasks.into_iter().zip(next_names) {
        let default_success = match next.as_deref() {
            Some(next) => next,
            None if is_error_chain => FAILURE_RESULT,
            None => SUCCESS_RESULT,
        };
        let body = unwrap_task_body(&name, body)?;
        tasks.push(compile_task(scope, &name, &body, default_success, &default_failure)?);
    }

    if let Some(chain) = error_chain {
        debug!(
            unit = scope.unit,
            main_tasks = tasks.len(),
            chain_tasks = chain.len(),
            "splicing error-handling chain"
        );
        tasks.extend(chain.tasks);
    }

    Ok(Workflow { tasks })
}

/// Remove the `on_failure` section from a task map. Absent, null and empty
/// sections all yield `None`.
pub fn take_error_section(unit: &str, raw_tasks: &mut RawMap) -> Result<Option<RawMap>, CompilerError> {
    match raw_tasks.shift_remove(ON_FAILURE_KEY) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(section)) if section.is_empty() => Ok(None),
        Some(Value::Object(section)) => Ok(Some(section)),
        Some(other) => Err(CompilerError::shape(
            "W003",
            unit,
            format!(
                "Below '{}' there should be a map of tasks, found {}",
                ON_FAILURE_KEY,
                value_type_name(&other)
            ),
        )),
    }
}

/// The body a task's fields are extracted from: the task map itself, or the
/// map under its `loop` key. Keys beside `loop` are dropped.
fn unwrap_task_body(name: &str, body: Value) -> Result<RawMap, CompilerError> {
    let mut body = match body {
        Value::Object(map) => map,
        Value::Null => return Ok(RawMap::new()),
        other => {
            return Err(CompilerError::shape(
                "T002",
                name,
                format!(
                    "Task '{}' must be a map holding '{}: {{op_name: ...}}', found {}",
                    name,
                    DO_KEY,
                    value_type_name(&other)
                ),
            ));
        }
    };

    if !body.contains_key(LOOP_KEY) {
        return Ok(body);
    }

    if body.len() > 1 {
        let ignored: Vec<&str> = body
            .keys()
            .map(String::as_str)
            .filter(|k| *k != LOOP_KEY)
            .collect();
        warn!(task = name, ?ignored, "keys beside '{}' are ignored", LOOP_KEY);
    }

    match body.shift_remove(LOOP_KEY) {
        Some(Value::Object(inner)) => Ok(inner),
        Some(Value::Null) | None => Ok(RawMap::new()),
        Some(other) => Err(CompilerError::shape(
            "T003",
            name,
            format!(
                "Task '{}': '{}' must be a map holding '{}' and '{}', found {}",
                name,
                LOOP_KEY,
                FOR_KEY,
                DO_KEY,
                value_type_name(&other)
            ),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::ExtractorRegistry;
    use crate::parse::Imports;
    use serde_json::json;

    fn raw(value: Value) -> RawMap {
        match value {
            Value::Object(map) => map,
            other => panic!("expected a map, got {:?}", other),
        }
    }

    fn with_scope<T>(f: impl FnOnce(&Scope<'_>) -> T) -> T {
        let imports = Imports::from([("ns".to_string(), "pkg".to_string())]);
        let scope = Scope {
            registry: ExtractorRegistry::global(),
            imports: Some(&imports),
            unit: "flow",
        };
        f(&scope)
    }

    #[test]
    fn error_chain_defaults_end_in_failure() {
        let chain = with_scope(|scope| {
            compile_workflow(
                scope,
                raw(json!({
                    "R1": {"do": {"ns.log": {}}},
                    "R2": {"do": {"ns.alert": {}}}
                })),
                None,
                true,
            )
        })
        .unwrap();

        assert_eq!(chain.tasks[0].next(SUCCESS_RESULT), Some("R2"));
        assert_eq!(chain.tasks[0].next(FAILURE_RESULT), Some(FAILURE_RESULT));
        assert_eq!(chain.tasks[1].next(SUCCESS_RESULT), Some(FAILURE_RESULT));
        assert_eq!(chain.tasks[1].next(FAILURE_RESULT), Some(FAILURE_RESULT));
    }

    #[test]
    fn inline_on_failure_section_is_spliced() {
        let workflow = with_scope(|scope| {
            compile_workflow(
                scope,
                raw(json!({
                    "T1": {"do": {"ns.op1": {}}},
                    "on_failure": {"R1": {"do": {"ns.recover": {}}}}
                })),
                None,
                false,
            )
        })
        .unwrap();

        let names: Vec<&str> = workflow.tasks.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["T1", "R1"]);
        assert_eq!(workflow.tasks[0].next(FAILURE_RESULT), Some("R1"));
    }

    #[test]
    fn nested_error_section_keeps_failure_terminal() {
        let chain = with_scope(|scope| {
            compile_workflow(
                scope,
                raw(json!({
                    "R1": {"do": {"ns.recover": {}}},
                    "on_failure": {"Z1": {"do": {"ns.last_resort": {}}}}
                })),
                None,
                true,
            )
        })
        .unwrap();

        let names: Vec<&str> = chain.tasks.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["R1", "Z1"]);
        for task in &chain.tasks {
            assert_eq!(task.next(SUCCESS_RESULT), Some(FAILURE_RESULT));
            assert_eq!(task.next(FAILURE_RESULT), Some(FAILURE_RESULT));
        }
    }

    #[test]
    fn null_and_empty_error_sections_are_absent() {
        for section in [Value::Null, json!({})] {
            let mut tasks = raw(json!({"T1": {"do": {"ns.op1": {}}}}));
            tasks.insert(ON_FAILURE_KEY.into(), section);
            let workflow = with_scope(|scope| compile_workflow(scope, tasks, None, false)).unwrap();

            assert_eq!(workflow.len(), 1);
            assert_eq!(workflow.tasks[0].next(FAILURE_RESULT), Some(FAILURE_RESULT));
        }
    }

    #[test]
    fn chain_given_twice_is_rejected() {
        let err = with_scope(|scope| {
            let chain = compile_workflow(scope, raw(json!({"R1": {"do": {"ns.recover": {}}}})), None, true)?;
            compile_workflow(
                scope,
                raw(json!({
                    "T1": {"do": {"ns.op1": {}}},
                    "on_failure": {"R2": {"do": {"ns.alert": {}}}}
                })),
                Some(chain),
                false,
            )
        })
        .unwrap_err();
        assert_eq!(err.code(), "W004");
    }

    #[test]
    fn loop_body_is_unwrapped() {
        let workflow = with_scope(|scope| {
            compile_workflow(
                scope,
                raw(json!({
                    "each": {"loop": {"for": "h in hosts", "do": {"ns.ping": {"host": "${h}"}}}}
                })),
                None,
                false,
            )
        })
        .unwrap();

        let task = &workflow.tasks[0];
        assert_eq!(task.ref_id, "pkg.ping");
        assert_eq!(task.loop_statement().map(|l| l.collection.as_str()), Some("hosts"));
    }

    #[test]
    fn loop_as_list_is_rejected() {
        let err = with_scope(|scope| {
            compile_workflow(scope, raw(json!({"each": {"loop": ["x"]}})), None, false)
        })
        .unwrap_err();
        assert_eq!(err.code(), "T003");
        assert_eq!(err.unit(), Some("each"));
    }

    #[test]
    fn loop_siblings_are_ignored() {
        let workflow = with_scope(|scope| {
            compile_workflow(
                scope,
                raw(json!({
                    "each": {
                        "loop": {"for": "h in hs", "do": {"ns.op1": {}}},
                        "navigate": {"SUCCESS": "elsewhere", "FAILURE": "FAILURE"}
                    },
                    "T2": {"do": {"ns.op2": {}}}
                })),
                None,
                false,
            )
        })
        .unwrap();

        let task = &workflow.tasks[0];
        assert_eq!(task.ref_id, "pkg.op1");
        assert_eq!(task.next(SUCCESS_RESULT), Some("T2"));
        assert!(task.post_task_data.is_empty());
    }

    #[test]
    fn task_as_list_is_rejected() {
        let err = with_scope(|scope| {
            compile_workflow(scope, raw(json!({"T1": ["do"]})), None, false)
        })
        .unwrap_err();
        assert_eq!(err.code(), "T002");
    }

    #[test]
    fn only_error_section_is_not_a_workflow() {
        let err = with_scope(|scope| {
            compile_workflow(
                scope,
                raw(json!({"on_failure": {"R1": {"do": {"ns.r": {}}}}})),
                None,
                false,
            )
        })
        .unwrap_err();
        assert_eq!(err.code(), "W001");
    }

    #[test]
    fn error_section_as_list_is_rejected() {
        let err = with_scope(|scope| {
            compile_workflow(
                scope,
                raw(json!({"T1": {"do": {"ns.op": {}}}, "on_failure": ["R1"]})),
                None,
                false,
            )
        })
        .unwrap_err();
        assert_eq!(err.code(), "W003");
    }
}
