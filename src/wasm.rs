//! WASM entry points for browser use.
//!
//! Each function takes JSON strings and returns a JS object tagged with
//! `status: "success" | "errors"`.

use std::sync::OnceLock;

use wasm_bindgen::prelude::*;

use crate::engine::Engine;
use crate::error::{EngineError, Phase, Warning};
use crate::parse::{self, CanvasView};

/// Seed document → enforced, laid-out canvas graph.
#[wasm_bindgen]
pub fn seed_workflow(json: &str) -> JsValue {
    to_js(&seed_workflow_inner(json))
}

fn seed_workflow_inner(json: &str) -> WasmResult<CanvasView> {
    let engine = engine()?;
    let seed = parse::parse_seed(json)?;
    Ok(engine.seed("wasm", &seed)?)
}

/// `{nodes, edges}` graph + domain → graph with every required step present.
#[wasm_bindgen]
pub fn enforce_workflow(graph_json: &str, domain: &str) -> JsValue {
    to_js(&enforce_workflow_inner(graph_json, domain))
}

fn enforce_workflow_inner(graph_json: &str, domain: &str) -> WasmResult<CanvasView> {
    let engine = engine()?;
    let graph = parse::parse_graph(graph_json)?.into_graph("wasm");
    Ok(engine.enforce(&graph, domain)?)
}

/// `{nodes, edges}` graph → external execution-engine document.
#[wasm_bindgen]
pub fn translate_workflow(graph_json: &str) -> JsValue {
    to_js(&translate_workflow_inner(graph_json))
}

fn translate_workflow_inner(graph_json: &str) -> WasmResult<TranslationDto> {
    let engine = engine()?;
    let graph = parse::parse_graph(graph_json)?.into_graph("wasm");
    graph.validate()?;
    let translation = engine.translate(&graph);
    Ok(TranslationDto {
        document: serde_json::to_value(&translation.document)
            .map_err(|e| ErrorDto::internal(Phase::Translate, e))?,
        warnings: translation.warnings,
    })
}

/// `{nodes, edges}` graph + domain → compliance report.
#[wasm_bindgen]
pub fn check_workflow(graph_json: &str, domain: &str) -> JsValue {
    to_js(&check_workflow_inner(graph_json, domain))
}

fn check_workflow_inner(graph_json: &str, domain: &str) -> WasmResult<crate::enforce::ComplianceReport> {
    let engine = engine()?;
    let graph = parse::parse_graph(graph_json)?.into_graph("wasm");
    graph.validate()?;
    Ok(engine.report(&graph, domain))
}

/// Built-in rules are parsed on the first call and shared afterwards.
fn engine() -> Result<&'static Engine, Vec<ErrorDto>> {
    static ENGINE: OnceLock<Engine> = OnceLock::new();
    if let Some(engine) = ENGINE.get() {
        return Ok(engine);
    }
    let engine = Engine::builtin()?;
    Ok(ENGINE.get_or_init(|| engine))
}

fn to_js<T: serde::Serialize>(result: &WasmResult<T>) -> JsValue {
    let dto = match result {
        Ok(data) => ResultDto::Success { data },
        Err(errors) => ResultDto::Errors { errors },
    };
    serde_wasm_bindgen::to_value(&dto).unwrap_or(JsValue::NULL)
}

// ---------------------------------------------------------------------------
// DTOs for serialization to JS
// ---------------------------------------------------------------------------

type WasmResult<T> = Result<T, Vec<ErrorDto>>;

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorDto {
    code: String,
    phase: String,
    message: String,
    node_id: Option<String>,
    edge_id: Option<String>,
}

impl ErrorDto {
    fn internal(phase: Phase, e: impl std::fmt::Display) -> Vec<ErrorDto> {
        vec![ErrorDto {
            code: "E000".into(),
            phase: phase.to_string(),
            message: e.to_string(),
            node_id: None,
            edge_id: None,
        }]
    }
}

impl From<EngineError> for Vec<ErrorDto> {
    fn from(e: EngineError) -> Self {
        let single = |code: &str, phase: Phase, node_id: Option<String>, edge_id: Option<String>| {
            vec![ErrorDto {
                code: code.into(),
                phase: phase.to_string(),
                message: e.to_string(),
                node_id,
                edge_id,
            }]
        };
        match &e {
            EngineError::Validation(issues) => issues
                .iter()
                .map(|i| ErrorDto {
                    code: i.code.into(),
                    phase: Phase::Validate.to_string(),
                    message: i.message.clone(),
                    node_id: i.node_id.clone(),
                    edge_id: i.edge_id.clone(),
                })
                .collect(),
            EngineError::LockedNode { node_id, .. } => {
                single("E001", Phase::Validate, Some(node_id.clone()), None)
            }
            EngineError::DanglingReference { edge_id, node_id } => single(
                "E002",
                Phase::Validate,
                Some(node_id.clone()),
                Some(edge_id.clone()),
            ),
            EngineError::DuplicateNode(id) | EngineError::NodeNotFound(id) => {
                single("E003", Phase::Validate, Some(id.clone()), None)
            }
            EngineError::EdgeNotFound(id) => single("E004", Phase::Validate, None, Some(id.clone())),
            EngineError::SessionNotFound(_) => single("E005", Phase::Parse, None, None),
            EngineError::Parse { .. } => single("P001", Phase::Parse, None, None),
            EngineError::Rules(_) | EngineError::Config(_) => single("C001", Phase::Parse, None, None),
        }
    }
}

#[derive(serde::Serialize)]
struct TranslationDto {
    document: serde_json::Value,
    warnings: Vec<Warning>,
}

#[derive(serde::Serialize)]
#[serde(tag = "status")]
enum ResultDto<'a, T: serde::Serialize> {
    #[serde(rename = "success")]
    Success { data: &'a T },
    #[serde(rename = "errors")]
    Errors { errors: &'a [ErrorDto] },
}
