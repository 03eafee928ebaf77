//! Enforcement phase: (Graph, DomainRules) → compliant Graph.
//!
//! Every required step of the domain ends up as a locked node at its anchor.
//! Steps that are already satisfied are skipped, which makes the pass
//! idempotent and lets it restore compliance nodes an edit dropped.

pub mod anchor;
pub mod matching;
pub mod report;
pub mod splice;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{EngineResult, Phase, Warning, WarningKind};
use crate::model::{Graph, Node};
use crate::rules::{DomainRules, RequiredStep};
use crate::text::slugify;

pub use report::{check_compliance, ComplianceReport, Violation, ViolationKind};

use anchor::ResolvedAnchor;
use matching::StepMatch;

/// A compliance node synthesized by this pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertedNode {
    pub node_id: String,
    pub compliance_type: String,
    /// The node it was spliced next to; `None` for an isolated insert into an
    /// empty graph.
    pub anchor_node_id: Option<String>,
}

/// What one enforcement pass did, without the graph itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnforcementSummary {
    pub domain: String,
    pub inserted: Vec<InsertedNode>,
    /// Pre-existing unlocked nodes that were locked as compliance steps.
    pub adopted: Vec<String>,
    /// Compliance types of every required step, in rule order.
    pub rules_applied: Vec<String>,
    pub warnings: Vec<Warning>,
}

impl EnforcementSummary {
    pub fn inserted_ids(&self) -> impl Iterator<Item = &str> {
        self.inserted.iter().map(|n| n.node_id.as_str())
    }

    pub fn info(&self) -> ComplianceInfo {
        ComplianceInfo {
            domain: self.domain.clone(),
            nodes_added: self.inserted.len(),
            rules_applied: self.rules_applied.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Enforcement {
    pub graph: Graph,
    pub summary: EnforcementSummary,
}

/// Canvas-facing metadata attached to every enforced graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceInfo {
    pub domain: String,
    pub nodes_added: usize,
    pub rules_applied: Vec<String>,
}

/// Enforce on a copy; the input graph is left untouched.
pub fn enforce(graph: &Graph, rules: &DomainRules) -> EngineResult<Enforcement> {
    let mut graph = graph.clone();
    let summary = enforce_in_place(&mut graph, rules)?;
    Ok(Enforcement { graph, summary })
}

/// Enforce directly on `graph`. On error the graph may hold a partial result;
/// callers that need atomicity should use [`enforce`].
pub fn enforce_in_place(graph: &mut Graph, rules: &DomainRules) -> EngineResult<EnforcementSummary> {
    // 1. Reject structurally broken input before touching it
    graph.validate()?;

    let mut summary = EnforcementSummary {
        domain: rules.domain.clone(),
        ..EnforcementSummary::default()
    };

    for (position, step) in rules.required_steps.iter().enumerate() {
        summary.rules_applied.push(step.compliance_type.clone());

        // 2. Already present?
        match matching::find_satisfying(graph, step) {
            Some(StepMatch::Satisfied(id)) => {
                debug!(step = %step.label, node = %id, "required step already satisfied");
                continue;
            }
            Some(StepMatch::Adoptable(id)) => {
                matching::adopt(graph, &id, step, &rules.domain);
                info!(step = %step.label, node = %id, "locked existing node as compliance step");
                summary.warnings.push(Warning::new(
                    WarningKind::AdoptedNode,
                    Phase::Enforce,
                    format!("Existing node was locked as required step '{}'", step.label),
                    Some(id.clone()),
                ));
                summary.adopted.push(id);
                continue;
            }
            None => {}
        }

        // 3. Resolve the anchor against the graph as it stands
        let (resolved, fallback) = anchor::resolve(graph, step);
        if let Some(w) = fallback {
            warn!(step = %step.label, "{}", w.message);
            summary.warnings.push(w);
        }
        let resolved = anchor::settle(graph, resolved, &rules.required_steps, position);

        // 4. Synthesize and splice
        let node = synthesize(graph, step, &rules.domain, &resolved);
        let node_id = node.id.clone();
        graph.add_node(node)?;
        splice::splice(graph, &node_id, &resolved)?;

        // 5. Every splice must leave a valid graph
        graph.validate()?;

        info!(
            step = %step.label,
            node = %node_id,
            anchor = ?resolved.anchor_node(),
            "inserted compliance node"
        );
        summary.inserted.push(InsertedNode {
            node_id,
            compliance_type: step.compliance_type.clone(),
            anchor_node_id: resolved.anchor_node().map(String::from),
        });
    }

    debug!(
        domain = %summary.domain,
        inserted = summary.inserted.len(),
        adopted = summary.adopted.len(),
        "enforcement pass complete"
    );
    Ok(summary)
}

/// Ids are `compliance_<slug>`, so re-inserting a removed step yields the
/// same id it had before.
fn synthesize(graph: &Graph, step: &RequiredStep, domain: &str, at: &ResolvedAnchor) -> Node {
    let slug = slugify(&step.compliance_type);
    let base = if slug.is_empty() {
        "compliance_step".to_string()
    } else {
        format!("compliance_{}", slug)
    };

    let mut node = Node::new(graph.unique_node_id(&base), step.node_kind(), step.label.clone())
        .with_description(step.description.clone().unwrap_or_else(|| step.reason.clone()))
        .locked_by(step.compliance_type.clone(), step.reason.clone());
    if !domain.is_empty() {
        node.domain_tag = Some(domain.to_string());
    }
    // Position hint only; the layout solver resolves overlaps.
    if let Some(pos) = at.anchor_node().and_then(|id| graph.node(id)).map(|n| n.position) {
        node.position = pos;
    }
    node
}
