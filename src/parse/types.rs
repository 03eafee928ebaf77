//! Wire documents exchanged with the interpretation collaborator and the
//! canvas.
//!
//! Field names are camelCase to match the canvas JSON.

use serde::{Deserialize, Serialize};

use crate::enforce::ComplianceInfo;
use crate::error::{EngineError, EngineResult, Warning};
use crate::model::{Edge, Graph, Node, NodeKind};

// =============================================================================
// SEED
// =============================================================================

/// Raw step list produced by the interpretation collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedDocument {
    #[serde(alias = "domain")]
    pub domain_tag: String,
    #[serde(default)]
    pub steps: Vec<SeedStep>,
    /// Absent links chain the steps in order; an empty list leaves them
    /// unconnected.
    #[serde(default)]
    pub links: Option<Vec<SeedLink>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedStep {
    #[serde(default)]
    pub id: Option<String>,
    pub label: String,
    #[serde(default = "default_kind")]
    pub kind: NodeKind,
    #[serde(default)]
    pub description: String,
}

fn default_kind() -> NodeKind {
    NodeKind::Action
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedLink {
    pub from_index: usize,
    pub to_index: usize,
}

impl SeedDocument {
    /// Build the unenforced graph. Steps without an id become `step_<n>`,
    /// numbered from 1.
    pub fn to_graph(&self, session_key: &str) -> EngineResult<Graph> {
        let mut graph = Graph::new(session_key);
        let mut ids = Vec::with_capacity(self.steps.len());

        for (i, step) in self.steps.iter().enumerate() {
            let id = match step.id.as_deref().map(str::trim) {
                Some(id) if !id.is_empty() => id.to_string(),
                _ => graph.unique_node_id(&format!("step_{}", i + 1)),
            };
            let node = Node::new(id.clone(), step.kind, step.label.clone())
                .with_description(step.description.clone());
            graph.add_node(node)?;
            ids.push(id);
        }

        match &self.links {
            Some(links) => {
                for link in links {
                    let endpoint = |idx: usize| {
                        ids.get(idx).ok_or_else(|| EngineError::DanglingReference {
                            edge_id: format!("link_{}_{}", link.from_index, link.to_index),
                            node_id: format!("#{}", idx),
                        })
                    };
                    let source = endpoint(link.from_index)?.clone();
                    let target = endpoint(link.to_index)?.clone();
                    graph.add_edge(&source, &target)?;
                }
            }
            None => {
                for pair in ids.windows(2) {
                    graph.add_edge(&pair[0], &pair[1])?;
                }
            }
        }

        Ok(graph)
    }
}

// =============================================================================
// EDIT
// =============================================================================

/// A full graph as sent by the canvas. Nothing is checked on parse.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphDocument {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl GraphDocument {
    pub fn into_graph(self, session_key: &str) -> Graph {
        Graph::from_parts(session_key, self.nodes, self.edges)
    }
}

impl From<&Graph> for GraphDocument {
    fn from(graph: &Graph) -> Self {
        GraphDocument {
            nodes: graph.nodes().to_vec(),
            edges: graph.edges().to_vec(),
        }
    }
}

/// Whole-graph replacement submitted after a canvas edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditDocument {
    pub graph: GraphDocument,
}

// =============================================================================
// CANVAS
// =============================================================================

/// What the canvas receives after every accepted seed or edit.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasView {
    pub graph: Graph,
    pub compliance_info: ComplianceInfo,
    pub warnings: Vec<Warning>,
}
