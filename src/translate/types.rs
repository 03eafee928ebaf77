//! Shape of the exported execution-engine document (n8n-style).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Warning;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5678";
pub const DEFAULT_WORKFLOW_NAME: &str = "Generated Compliant Workflow";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TranslatorConfig {
    /// Root of the execution engine, used for example endpoint URLs.
    pub base_url: String,
    pub workflow_name: String,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        TranslatorConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            workflow_name: DEFAULT_WORKFLOW_NAME.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalWorkflow {
    pub name: String,
    pub nodes: Vec<ExternalNode>,
    /// Keyed by node *name*, not id.
    pub connections: BTreeMap<String, NodeConnections>,
    pub meta: ExportMeta,
    pub deployment_requirements: Vec<String>,
    pub example_endpoints: Vec<ExampleEndpoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalNode {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: String,
    pub type_version: u32,
    pub position: [f64; 2],
    pub parameters: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NodeConnections {
    /// One output slot holding every downstream target.
    pub main: Vec<Vec<ConnectionTarget>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionTarget {
    pub node: String,
    #[serde(rename = "type")]
    pub connection_type: &'static str,
    pub index: u32,
}

impl ConnectionTarget {
    pub fn main(node: impl Into<String>) -> Self {
        ConnectionTarget {
            node: node.into(),
            connection_type: "main",
            index: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportMeta {
    pub locked_nodes: Vec<String>,
    pub compliance_validated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EndpointKind {
    Webhook,
    Schedule,
    Manual,
}

/// How to invoke one trigger of the exported workflow.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExampleEndpoint {
    pub node_id: String,
    pub node_name: String,
    pub kind: EndpointKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_payload: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Translation {
    pub document: ExternalWorkflow,
    pub warnings: Vec<Warning>,
}
