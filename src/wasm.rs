//! WASM entry points for browser use.

use wasm_bindgen::prelude::*;

use crate::config::BuilderConfig;
use crate::error::CompilerError;
use crate::extract::ExtractorRegistry;
use crate::lower::ExecutableBuilder;
use crate::model::Executable;
use crate::validate::ValidationError;

/// Full pipeline with default options: parse → assemble.
/// Returns a JSON object with either `executable` (success) or `errors` (failure).
#[wasm_bindgen]
pub fn compile_executable(json: &str) -> JsValue {
    let result = compile_inner(json, BuilderConfig::default());
    serde_wasm_bindgen::to_value(&result).unwrap_or(JsValue::NULL)
}

/// Same as `compile_executable`, with builder options given as JSON.
#[wasm_bindgen]
pub fn compile_executable_with(json: &str, config_json: &str) -> JsValue {
    let result = match BuilderConfig::from_json(config_json) {
        Ok(config) => compile_inner(json, config),
        Err(e) => CompileResult::Errors {
            errors: vec![ErrorDto::from(e)],
        },
    };
    serde_wasm_bindgen::to_value(&result).unwrap_or(JsValue::NULL)
}

/// Compile a flow and run the navigation checks.
/// Returns a JSON array of error objects, empty when the flow is sound.
#[wasm_bindgen]
pub fn validate_source(json: &str) -> JsValue {
    let result = validate_inner(json);
    serde_wasm_bindgen::to_value(&result).unwrap_or(JsValue::NULL)
}

fn compile_inner(json: &str, config: BuilderConfig) -> CompileResult {
    match compile(json, config) {
        Ok(executable) => CompileResult::Success {
            executable: Box::new(executable),
        },
        Err(e) => CompileResult::Errors {
            errors: vec![ErrorDto::from(e)],
        },
    }
}

fn validate_inner(json: &str) -> Vec<ErrorDto> {
    let config = BuilderConfig {
        validate_navigation: false,
        ..BuilderConfig::default()
    };
    let executable = match compile(json, config) {
        Ok(executable) => executable,
        Err(e) => return vec![ErrorDto::from(e)],
    };

    match executable.workflow() {
        Some(workflow) => crate::validate::validate_workflow(workflow)
            .into_iter()
            .map(ErrorDto::from)
            .collect(),
        None => vec![],
    }
}

fn compile(json: &str, config: BuilderConfig) -> Result<Executable, CompilerError> {
    let source = crate::parse::parse_source(json)?;
    ExecutableBuilder::new(ExtractorRegistry::global(), config).compile_source(source)
}

// ---------------------------------------------------------------------------
// DTOs for serialization to JS
// ---------------------------------------------------------------------------

#[derive(serde::Serialize)]
struct ErrorDto {
    code: String,
    kind: String,
    message: String,
    unit: Option<String>,
}

impl From<CompilerError> for ErrorDto {
    fn from(e: CompilerError) -> Self {
        ErrorDto {
            code: e.code().to_string(),
            kind: e.kind().to_string(),
            message: e.to_string(),
            unit: e.unit().map(str::to_string),
        }
    }
}

impl From<ValidationError> for ErrorDto {
    fn from(e: ValidationError) -> Self {
        ErrorDto {
            code: e.code.to_string(),
            kind: crate::error::ErrorKind::Structure.to_string(),
            message: e.message,
            unit: e.task,
        }
    }
}

#[derive(serde::Serialize)]
#[serde(tag = "status")]
enum CompileResult {
    #[serde(rename = "success")]
    Success { executable: Box<Executable> },
    #[serde(rename = "errors")]
    Errors { errors: Vec<ErrorDto> },
}
