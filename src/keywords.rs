//! Reserved words of the flow DSL and the result labels used in navigation.

// =============================================================================
// SOURCE FILE
// =============================================================================

pub const NAMESPACE_KEY: &str = "namespace";
pub const IMPORTS_KEY: &str = "imports";
pub const FLOW_TYPE: &str = "flow";
pub const OPERATION_TYPE: &str = "operation";
pub const SYSTEM_PROPERTY_TYPE: &str = "system_property";

// =============================================================================
// EXECUTABLE
// =============================================================================

pub const EXECUTABLE_NAME_KEY: &str = "name";
pub const INPUTS_KEY: &str = "inputs";
pub const OUTPUTS_KEY: &str = "outputs";
pub const RESULTS_KEY: &str = "results";
pub const WORKFLOW_KEY: &str = "workflow";
pub const ACTION_KEY: &str = "action";
pub const ON_FAILURE_KEY: &str = "on_failure";

// =============================================================================
// TASK
// =============================================================================

pub const DO_KEY: &str = "do";
pub const LOOP_KEY: &str = "loop";
pub const FOR_KEY: &str = "for";
pub const PUBLISH_KEY: &str = "publish";
pub const NAVIGATION_KEY: &str = "navigate";

// =============================================================================
// INPUT PROPERTIES
// =============================================================================

pub const DEFAULT_KEY: &str = "default";
pub const REQUIRED_KEY: &str = "required";
pub const ENCRYPTED_KEY: &str = "encrypted";
pub const OVERRIDE_KEY: &str = "override";
pub const SYSTEM_PROPERTY_KEY: &str = "system_property";

// =============================================================================
// ACTION
// =============================================================================

pub const JAVA_ACTION_KEY: &str = "java_action";
pub const PYTHON_SCRIPT_KEY: &str = "python_script";
pub const CLASS_NAME_KEY: &str = "className";
pub const METHOD_NAME_KEY: &str = "methodName";

// =============================================================================
// RESULTS
// =============================================================================

/// Result label and terminal marker for a successful outcome.
pub const SUCCESS_RESULT: &str = "SUCCESS";
/// Result label and terminal marker for a failed outcome.
pub const FAILURE_RESULT: &str = "FAILURE";

/// Keys a task body may carry besides those claimed by task-stage extractors.
pub const TASK_ADDITIONAL_KEYWORDS: &[&str] = &[LOOP_KEY, DO_KEY, NAVIGATION_KEY];

/// Keys an executable document may carry besides those claimed by
/// executable-stage extractors.
pub const EXECUTABLE_ADDITIONAL_KEYWORDS: &[&str] = &[ACTION_KEY, WORKFLOW_KEY, EXECUTABLE_NAME_KEY];

/// Returns true for the terminal markers `SUCCESS` and `FAILURE`.
pub fn is_terminal(target: &str) -> bool {
    target == SUCCESS_RESULT || target == FAILURE_RESULT
}
