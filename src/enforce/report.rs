//! Read-only compliance check: which required steps are missing, unlocked or
//! out of order, without changing the graph.

use serde::Serialize;

use crate::error::Warning;
use crate::model::{progression_warnings, Graph, GraphIndex};
use crate::rules::{AnchorMode, DomainRules, RequiredStep};

use super::anchor::find_label_match;
use super::matching::{find_satisfying, StepMatch};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ViolationKind {
    /// No node satisfies the step.
    Missing,
    /// A node matches the step but is not locked with the step's reason.
    Unlocked,
    /// The compliance node exists but not on the required side of its anchor.
    Misplaced,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    pub kind: ViolationKind,
    pub compliance_type: String,
    pub label: String,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceReport {
    pub domain: String,
    pub is_compliant: bool,
    pub violations: Vec<Violation>,
    pub warnings: Vec<Warning>,
    pub explanation: String,
    pub restrictions: Vec<String>,
}

pub fn check_compliance(graph: &Graph, rules: &DomainRules) -> ComplianceReport {
    let index = graph.index();
    let violations: Vec<Violation> = rules
        .required_steps
        .iter()
        .filter_map(|step| check_step(graph, &index, step))
        .collect();

    ComplianceReport {
        domain: rules.domain.clone(),
        is_compliant: violations.is_empty(),
        violations,
        warnings: progression_warnings(graph),
        explanation: rules.explanation.clone(),
        restrictions: rules.restrictions.clone(),
    }
}

fn check_step(graph: &Graph, index: &GraphIndex, step: &RequiredStep) -> Option<Violation> {
    let violation = |kind, node_id: Option<String>| Violation {
        kind,
        compliance_type: step.compliance_type.clone(),
        label: step.label.clone(),
        reason: step.reason.clone(),
        node_id,
    };

    let node_id = match find_satisfying(graph, step) {
        None => return Some(violation(ViolationKind::Missing, None)),
        Some(StepMatch::Adoptable(id)) => return Some(violation(ViolationKind::Unlocked, Some(id))),
        Some(StepMatch::Satisfied(id)) => id,
    };

    // Only label anchors constrain order; a missing anchor node means the
    // fallback placement was the best available.
    let keyword = step.anchor.match_keyword.as_deref().unwrap_or_default();
    let in_order = match step.anchor.mode {
        AnchorMode::BeforeLabelMatch => find_label_match(graph, keyword)
            .is_none_or(|anchor| anchor == node_id || index.has_path(&node_id, &anchor)),
        AnchorMode::AfterLabelMatch => find_label_match(graph, keyword)
            .is_none_or(|anchor| anchor == node_id || index.has_path(&anchor, &node_id)),
        AnchorMode::AtStart | AnchorMode::AtEnd => true,
    };

    if in_order {
        None
    } else {
        Some(violation(ViolationKind::Misplaced, Some(node_id)))
    }
}
