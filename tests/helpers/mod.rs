#![allow(dead_code)]

use std::sync::Arc;

use flowguard::engine::Engine;
use flowguard::layout::{rects_overlap, LayoutParams};
use flowguard::model::{Graph, Node, NodeKind};
use flowguard::parse::SeedDocument;
use flowguard::rules::{Anchor, DomainRules, RequiredStep, RuleSet};
use flowguard::EngineConfig;

// =============================================================================
// Rule builders
// =============================================================================

/// Fraud screening before the payment, audit after it.
pub fn finance_rules() -> DomainRules {
    DomainRules::new(
        "finance",
        vec![
            RequiredStep::new(
                "Fraud Risk Assessment",
                "FRAUD_DETECTION",
                Anchor::before("payment"),
                "Fraud screening is mandatory before any payment is executed",
            ),
            RequiredStep::new(
                "Transaction Audit",
                "FINANCIAL_AUDIT",
                Anchor::after("payment"),
                "All financial transactions must be audited",
            ),
        ],
    )
}

pub fn rule_set(rules: DomainRules) -> RuleSet {
    RuleSet::new("general").with(rules)
}

pub fn engine_with(rules: DomainRules) -> Engine {
    Engine::new(EngineConfig::default(), Arc::new(rule_set(rules)))
}

// =============================================================================
// Graph builders
// =============================================================================

/// Nodes connected in the given order.
pub fn chain(steps: &[(&str, NodeKind, &str)]) -> Graph {
    let mut g = Graph::new("test");
    for (id, kind, label) in steps {
        g.add_node(Node::new(*id, *kind, *label)).unwrap();
    }
    for pair in steps.windows(2) {
        g.add_edge(pair[0].0, pair[1].0).unwrap();
    }
    g
}

/// Invoice Received → Process Payment.
pub fn invoice_payment() -> Graph {
    chain(&[
        ("invoice", NodeKind::Trigger, "Invoice Received"),
        ("payment", NodeKind::Action, "Process Payment"),
    ])
}

pub fn seed(domain: &str, steps: &[(&str, &str)]) -> SeedDocument {
    let steps: Vec<serde_json::Value> = steps
        .iter()
        .map(|(kind, label)| serde_json::json!({ "kind": kind, "label": label }))
        .collect();
    serde_json::from_value(serde_json::json!({ "domainTag": domain, "steps": steps })).unwrap()
}

// =============================================================================
// Assertions
// =============================================================================

/// Sorted `(source, target)` pairs.
pub fn edge_pairs(g: &Graph) -> Vec<(String, String)> {
    let mut pairs: Vec<_> = g
        .edges()
        .iter()
        .map(|e| (e.source_node_id.clone(), e.target_node_id.clone()))
        .collect();
    pairs.sort();
    pairs
}

pub fn pair(a: &str, b: &str) -> (String, String) {
    (a.to_string(), b.to_string())
}

pub fn assert_no_overlap(g: &Graph, params: &LayoutParams) {
    let nodes = g.nodes();
    for (i, a) in nodes.iter().enumerate() {
        for b in &nodes[i + 1..] {
            let ra = rect(params, a);
            let rb = rect(params, b);
            assert!(
                !rects_overlap(&ra, &rb, params.min_spacing),
                "'{}' at {:?} overlaps '{}' at {:?}",
                a.id,
                a.position,
                b.id,
                b.position
            );
        }
    }
}

pub fn rect(params: &LayoutParams, node: &Node) -> flowguard::layout::Rect {
    flowguard::layout::Rect {
        x: node.position.x,
        y: node.position.y,
        width: params.footprint.width,
        height: params.footprint.height,
    }
}
