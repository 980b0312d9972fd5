//! Builder options.

use serde::{Deserialize, Serialize};

use crate::error::CompilerError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BuilderConfig {
    /// Reject a flow whose main body and error-handling chain share a task name.
    pub unique_task_names: bool,
    /// Run the navigation-graph checks on every compiled flow and fail on the
    /// first diagnostic.
    pub validate_navigation: bool,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            unique_task_names: true,
            validate_navigation: false,
        }
    }
}

impl BuilderConfig {
    /// Deserialize options from JSON. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, CompilerError> {
        serde_json::from_str(json).map_err(|e| {
            CompilerError::invalid_source("P004", format!("Failed to parse builder config JSON: {}", e))
        })
    }
}
