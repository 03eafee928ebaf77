//! The session-owned workflow graph and its mutation primitives.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult, ValidationIssue};

use super::index::GraphIndex;
use super::node::{Edge, Node, Position};
use super::validate::validate_structure;

/// Who is asking for a mutation. Only the enforcer may remove locked nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    Editor,
    Enforcer,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Graph {
    #[serde(default)]
    session_key: String,
    #[serde(default)]
    nodes: Vec<Node>,
    #[serde(default)]
    edges: Vec<Edge>,
}

impl Graph {
    pub fn new(session_key: impl Into<String>) -> Self {
        Graph {
            session_key: session_key.into(),
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    /// Assemble a graph without checking it. Call `validate` before trusting it.
    pub fn from_parts(session_key: impl Into<String>, nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        Graph {
            session_key: session_key.into(),
            nodes,
            edges,
        }
    }

    pub fn session_key(&self) -> &str {
        &self.session_key
    }

    pub fn set_session_key(&mut self, key: impl Into<String>) {
        self.session_key = key.into();
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.node(id).is_some()
    }

    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id == id)
    }

    pub fn find_edge(&self, source: &str, target: &str) -> Option<&Edge> {
        self.edges
            .iter()
            .find(|e| e.source_node_id == source && e.target_node_id == target)
    }

    // -------------------------------------------------------------------------
    // Mutation
    // -------------------------------------------------------------------------

    pub fn add_node(&mut self, node: Node) -> EngineResult<()> {
        if self.contains_node(&node.id) {
            return Err(EngineError::DuplicateNode(node.id));
        }
        let blank_reason = node
            .compliance_reason
            .as_deref()
            .is_none_or(|r| r.trim().is_empty());
        if node.locked && blank_reason {
            return Err(EngineError::Validation(vec![ValidationIssue::node(
                "G005",
                format!("Locked node '{}' has no compliance reason", node.label),
                &node.id,
            )]));
        }
        self.nodes.push(node);
        Ok(())
    }

    /// Remove a node and its incident edges, reconnecting every predecessor
    /// to every successor so the progression stays intact.
    pub fn remove_node(&mut self, id: &str, actor: Actor) -> EngineResult<Node> {
        let Some(pos) = self.nodes.iter().position(|n| n.id == id) else {
            return Err(EngineError::NodeNotFound(id.to_string()));
        };
        if self.nodes[pos].locked && actor == Actor::Editor {
            return Err(EngineError::LockedNode {
                node_id: id.to_string(),
                reason: self.nodes[pos].lock_reason(),
            });
        }

        let preds: Vec<String> = self.predecessors(id).into_iter().map(String::from).collect();
        let succs: Vec<String> = self.successors(id).into_iter().map(String::from).collect();

        let removed = self.nodes.remove(pos);
        self.edges.retain(|e| !e.touches(id));

        for p in preds.iter().filter(|p| p.as_str() != id) {
            for s in succs.iter().filter(|s| s.as_str() != id) {
                if p != s {
                    self.add_edge(p, s)?;
                }
            }
        }

        Ok(removed)
    }

    /// Connect `source → target`, returning the edge id. Connecting an
    /// already-connected pair returns the existing id.
    pub fn add_edge(&mut self, source: &str, target: &str) -> EngineResult<String> {
        if let Some(existing) = self.find_edge(source, target) {
            return Ok(existing.id.clone());
        }
        let id = self.next_edge_id(source, target);
        self.insert_edge(Edge::new(id.clone(), source, target))?;
        Ok(id)
    }

    /// Insert an edge with a caller-chosen id.
    pub fn insert_edge(&mut self, edge: Edge) -> EngineResult<()> {
        for endpoint in [&edge.source_node_id, &edge.target_node_id] {
            if !self.contains_node(endpoint) {
                return Err(EngineError::DanglingReference {
                    edge_id: edge.id.clone(),
                    node_id: endpoint.clone(),
                });
            }
        }
        if edge.source_node_id == edge.target_node_id {
            return Err(EngineError::Validation(vec![ValidationIssue::edge(
                "G004",
                format!("Self-loop detected on node '{}'", edge.source_node_id),
                &edge.id,
            )]));
        }
        if self.edge(&edge.id).is_some() {
            return Err(EngineError::Validation(vec![ValidationIssue::edge(
                "G002",
                format!("Duplicate edge id '{}'", edge.id),
                &edge.id,
            )]));
        }
        self.edges.push(edge);
        Ok(())
    }

    pub fn remove_edge(&mut self, edge_id: &str) -> EngineResult<Edge> {
        let Some(pos) = self.edges.iter().position(|e| e.id == edge_id) else {
            return Err(EngineError::EdgeNotFound(edge_id.to_string()));
        };
        Ok(self.edges.remove(pos))
    }

    /// Remove the `source → target` edge if present.
    pub fn disconnect(&mut self, source: &str, target: &str) -> EngineResult<Option<Edge>> {
        for endpoint in [source, target] {
            if !self.contains_node(endpoint) {
                return Err(EngineError::DanglingReference {
                    edge_id: format!("{}->{}", source, target),
                    node_id: endpoint.to_string(),
                });
            }
        }
        let pos = self
            .edges
            .iter()
            .position(|e| e.source_node_id == source && e.target_node_id == target);
        Ok(pos.map(|p| self.edges.remove(p)))
    }

    pub fn set_position(&mut self, id: &str, position: Position) -> bool {
        match self.node_mut(id) {
            Some(node) => {
                node.position = position;
                true
            }
            None => false,
        }
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    pub fn incoming_edges(&self, id: &str) -> Vec<&Edge> {
        self.edges.iter().filter(|e| e.target_node_id == id).collect()
    }

    pub fn outgoing_edges(&self, id: &str) -> Vec<&Edge> {
        self.edges.iter().filter(|e| e.source_node_id == id).collect()
    }

    pub fn predecessors(&self, id: &str) -> Vec<&str> {
        self.incoming_edges(id)
            .into_iter()
            .map(|e| e.source_node_id.as_str())
            .collect()
    }

    pub fn successors(&self, id: &str) -> Vec<&str> {
        self.outgoing_edges(id)
            .into_iter()
            .map(|e| e.target_node_id.as_str())
            .collect()
    }

    /// Nodes with no incoming edges, in insertion order.
    pub fn entry_nodes(&self) -> Vec<&str> {
        self.nodes
            .iter()
            .filter(|n| !self.edges.iter().any(|e| e.target_node_id == n.id))
            .map(|n| n.id.as_str())
            .collect()
    }

    /// Nodes with no outgoing edges, in insertion order.
    pub fn terminal_nodes(&self) -> Vec<&str> {
        self.nodes
            .iter()
            .filter(|n| !self.edges.iter().any(|e| e.source_node_id == n.id))
            .map(|n| n.id.as_str())
            .collect()
    }

    pub fn locked_nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|n| n.locked)
    }

    /// Fails with every structural issue found; an empty graph is valid.
    pub fn validate(&self) -> EngineResult<()> {
        let issues = validate_structure(self);
        if issues.is_empty() {
            Ok(())
        } else {
            Err(EngineError::Validation(issues))
        }
    }

    pub fn index(&self) -> GraphIndex {
        GraphIndex::build(self)
    }

    // -------------------------------------------------------------------------
    // Id allocation
    // -------------------------------------------------------------------------

    pub fn next_edge_id(&self, source: &str, target: &str) -> String {
        let base = format!("edge_{}_{}", source, target);
        let mut candidate = base.clone();
        let mut n = 1;
        while self.edge(&candidate).is_some() {
            candidate = format!("{}_{}", base, n);
            n += 1;
        }
        candidate
    }

    pub fn unique_node_id(&self, base: &str) -> String {
        let mut candidate = base.to_string();
        let mut n = 1;
        while self.contains_node(&candidate) {
            candidate = format!("{}_{}", base, n);
            n += 1;
        }
        candidate
    }
}
