//! Parse phase: JSON → wire documents.

pub mod types;

pub use types::*;

use crate::error::{EngineError, EngineResult};

pub fn parse_seed(json: &str) -> EngineResult<SeedDocument> {
    serde_json::from_str::<SeedDocument>(json).map_err(|e| EngineError::parse("seed document", e))
}

pub fn parse_edit(json: &str) -> EngineResult<EditDocument> {
    serde_json::from_str::<EditDocument>(json).map_err(|e| EngineError::parse("edit document", e))
}

/// A bare `{nodes, edges}` graph.
pub fn parse_graph(json: &str) -> EngineResult<GraphDocument> {
    serde_json::from_str::<GraphDocument>(json).map_err(|e| EngineError::parse("graph", e))
}
