//! Graph-level structural rules (G001–G005) and progression checks.

use std::collections::{HashMap, HashSet};

use crate::error::{Phase, ValidationIssue, Warning, WarningKind};

use super::graph::Graph;

/// Run all structural rules. Returns every issue found.
pub fn validate_structure(graph: &Graph) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    g001_unique_node_ids(graph, &mut issues);
    g002_unique_edge_ids(graph, &mut issues);
    g003_edges_reference_existing_nodes(graph, &mut issues);
    g004_no_self_loops(graph, &mut issues);
    g005_locked_nodes_have_reason(graph, &mut issues);

    issues
}

fn g001_unique_node_ids(graph: &Graph, issues: &mut Vec<ValidationIssue>) {
    let mut seen = HashSet::new();
    for node in graph.nodes() {
        if !seen.insert(node.id.as_str()) {
            issues.push(ValidationIssue::node(
                "G001",
                format!("Duplicate node id '{}'", node.id),
                &node.id,
            ));
        }
    }
}

fn g002_unique_edge_ids(graph: &Graph, issues: &mut Vec<ValidationIssue>) {
    let mut seen = HashSet::new();
    for edge in graph.edges() {
        if !seen.insert(edge.id.as_str()) {
            issues.push(ValidationIssue::edge(
                "G002",
                format!("Duplicate edge id '{}'", edge.id),
                &edge.id,
            ));
        }
    }
}

fn g003_edges_reference_existing_nodes(graph: &Graph, issues: &mut Vec<ValidationIssue>) {
    let ids: HashMap<&str, ()> = graph.nodes().iter().map(|n| (n.id.as_str(), ())).collect();
    for edge in graph.edges() {
        if !ids.contains_key(edge.source_node_id.as_str()) {
            issues.push(ValidationIssue::edge(
                "G003",
                format!(
                    "Edge '{}' references unknown source node '{}'",
                    edge.id, edge.source_node_id
                ),
                &edge.id,
            ));
        }
        if !ids.contains_key(edge.target_node_id.as_str()) {
            issues.push(ValidationIssue::edge(
                "G003",
                format!(
                    "Edge '{}' references unknown target node '{}'",
                    edge.id, edge.target_node_id
                ),
                &edge.id,
            ));
        }
    }
}

fn g004_no_self_loops(graph: &Graph, issues: &mut Vec<ValidationIssue>) {
    for edge in graph.edges() {
        if edge.source_node_id == edge.target_node_id {
            issues.push(ValidationIssue::edge(
                "G004",
                format!("Self-loop detected on node '{}'", edge.source_node_id),
                &edge.id,
            ));
        }
    }
}

fn g005_locked_nodes_have_reason(graph: &Graph, issues: &mut Vec<ValidationIssue>) {
    for node in graph.nodes() {
        let blank = node
            .compliance_reason
            .as_deref()
            .is_none_or(|r| r.trim().is_empty());
        if node.locked && blank {
            issues.push(ValidationIssue::node(
                "G005",
                format!("Locked node '{}' has no compliance reason", node.label),
                &node.id,
            ));
        }
    }
}

/// Progression checks. A graph without an entry or terminal node is still
/// accepted; the caller only gets a warning.
pub fn progression_warnings(graph: &Graph) -> Vec<Warning> {
    let mut warnings = Vec::new();
    if graph.nodes().is_empty() {
        return warnings;
    }
    if graph.entry_nodes().is_empty() {
        warnings.push(Warning::new(
            WarningKind::NoEntryNode,
            Phase::Validate,
            "Every node has an incoming edge; the workflow has no entry point",
            None,
        ));
    }
    if graph.terminal_nodes().is_empty() {
        warnings.push(Warning::new(
            WarningKind::NoTerminalNode,
            Phase::Validate,
            "Every node has an outgoing edge; the workflow never terminates",
            None,
        ));
    }
    warnings
}
