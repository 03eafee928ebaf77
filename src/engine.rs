//! The full pipeline: seed or edit → validate → enforce → layout, and
//! export through the translator.
//!
//! The engine holds no per-session state; one instance is shared by every
//! session.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::enforce::{self, ComplianceReport, EnforcementSummary};
use crate::error::{EngineError, EngineResult};
use crate::layout::LayoutSolver;
use crate::model::{progression_warnings, Graph, Node};
use crate::parse::{CanvasView, GraphDocument, SeedDocument};
use crate::rules::{DomainRules, RuleSet};
use crate::translate::{Translation, Translator};

#[derive(Debug, Clone)]
pub struct Engine {
    config: EngineConfig,
    rules: Arc<RuleSet>,
    layout: LayoutSolver,
    translator: Translator,
}

impl Engine {
    pub fn new(config: EngineConfig, rules: Arc<RuleSet>) -> Self {
        Engine {
            layout: LayoutSolver::new(config.layout.clone()),
            translator: Translator::new(config.translator.clone()),
            config,
            rules,
        }
    }

    /// Load the rule set named by `config` and build an engine over it.
    pub fn from_config(config: EngineConfig) -> EngineResult<Self> {
        config.check()?;
        let rules = config.load_rules()?;
        Ok(Engine::new(config, Arc::new(rules)))
    }

    /// Defaults with the built-in packs.
    pub fn builtin() -> EngineResult<Self> {
        Engine::from_config(EngineConfig::default())
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn rules_for(&self, domain: &str) -> &DomainRules {
        self.rules.for_domain(domain)
    }

    pub fn layout(&self) -> &LayoutSolver {
        &self.layout
    }

    /// Build, enforce and fully lay out a fresh graph.
    pub fn seed(&self, session_key: &str, seed: &SeedDocument) -> EngineResult<CanvasView> {
        let graph = seed.to_graph(session_key)?;
        let rules = self.rules_for(&seed.domain_tag);
        let enforce::Enforcement { mut graph, summary } = enforce::enforce(&graph, rules)?;
        self.layout.arrange_graph(&mut graph);
        info!(
            session = %session_key,
            domain = %rules.domain,
            nodes = graph.nodes().len(),
            inserted = summary.inserted.len(),
            "seeded workflow"
        );
        Ok(view(graph, summary))
    }

    /// Enforce an arbitrary graph and place only the nodes the pass added.
    pub fn enforce(&self, graph: &Graph, domain: &str) -> EngineResult<CanvasView> {
        let enforce::Enforcement { mut graph, summary } =
            enforce::enforce(graph, self.rules_for(domain))?;
        let inserted: Vec<String> = summary.inserted_ids().map(String::from).collect();
        self.layout.place_new(&mut graph, &inserted);
        Ok(view(graph, summary))
    }

    /// Validate and re-enforce a whole-graph replacement.
    ///
    /// Locked nodes may be moved but not otherwise changed. A locked node
    /// missing from the edit is restored where it was. On error the caller
    /// keeps `previous`.
    pub fn accept_edit(
        &self,
        previous: &Graph,
        domain: &str,
        edit: GraphDocument,
    ) -> EngineResult<CanvasView> {
        let mut candidate = edit.into_graph(previous.session_key());

        // 1. Structural validation
        if let Err(e) = candidate.validate() {
            warn!(session = %previous.session_key(), error = %e, "edit rejected");
            return Err(e);
        }

        // 2. Locked nodes only move
        for before in previous.locked_nodes() {
            if let Some(after) = candidate.node(&before.id) {
                if !same_except_position(before, after) {
                    warn!(node = %before.id, "edit to locked node rejected");
                    return Err(EngineError::LockedNode {
                        node_id: before.id.clone(),
                        reason: before.lock_reason(),
                    });
                }
            }
        }

        // 3. Reconnect around locked nodes the edit dropped
        bridge_dropped_locked(previous, &mut candidate)?;

        // 4. Re-enforce
        let summary = enforce::enforce_in_place(&mut candidate, self.rules_for(domain))?;
        for restored in &summary.inserted {
            if previous.contains_node(&restored.node_id) {
                info!(node = %restored.node_id, "restored removed compliance node");
            }
        }

        // 5. Lay out what the old graph did not have, plus restored nodes
        let fresh: Vec<String> = candidate
            .nodes()
            .iter()
            .filter(|n| {
                !previous.contains_node(&n.id) || summary.inserted_ids().any(|id| id == n.id)
            })
            .map(|n| n.id.clone())
            .collect();
        self.layout.place_new(&mut candidate, &fresh);

        debug!(
            session = %previous.session_key(),
            nodes = candidate.nodes().len(),
            "edit accepted"
        );
        Ok(view(candidate, summary))
    }

    pub fn report(&self, graph: &Graph, domain: &str) -> ComplianceReport {
        enforce::check_compliance(graph, self.rules_for(domain))
    }

    pub fn translate(&self, graph: &Graph) -> Translation {
        self.translator.translate(graph)
    }

    /// Translate, marking the document validated only if the graph fully
    /// satisfies `domain`.
    pub fn export(&self, graph: &Graph, domain: &str) -> Translation {
        let report = self.report(graph, domain);
        let mut translation = self.translator.translate(graph);
        let meta = &mut translation.document.meta;
        meta.compliance_validated = meta.compliance_validated && report.is_compliant;
        meta.domain = Some(report.domain);
        translation
    }
}

fn view(graph: Graph, summary: EnforcementSummary) -> CanvasView {
    let mut warnings = summary.warnings.clone();
    warnings.extend(progression_warnings(&graph));
    CanvasView {
        compliance_info: summary.info(),
        graph,
        warnings,
    }
}

fn same_except_position(a: &Node, b: &Node) -> bool {
    let mut b = b.clone();
    b.position = a.position;
    *a == b
}

/// For every locked node of `previous` that `candidate` lacks, connect its
/// surviving predecessors to its surviving successors. The enforcer then
/// re-splices the node between them.
fn bridge_dropped_locked(previous: &Graph, candidate: &mut Graph) -> EngineResult<()> {
    let dropped: Vec<&Node> = previous
        .locked_nodes()
        .filter(|n| !candidate.contains_node(&n.id))
        .collect();

    for node in dropped {
        let mut preds = surviving_neighbours(previous, candidate, &node.id, Direction::Up);
        let mut succs = surviving_neighbours(previous, candidate, &node.id, Direction::Down);
        preds.sort();
        preds.dedup();
        succs.sort();
        succs.dedup();
        for p in &preds {
            for s in &succs {
                if p != s {
                    candidate.add_edge(p, s)?;
                }
            }
        }
        debug!(node = %node.id, preds = preds.len(), succs = succs.len(), "bridged dropped locked node");
    }
    Ok(())
}

#[derive(Clone, Copy)]
enum Direction {
    Up,
    Down,
}

/// Nearest neighbours of `id` in `previous` that still exist in `candidate`,
/// walking through other dropped nodes.
fn surviving_neighbours(
    previous: &Graph,
    candidate: &Graph,
    id: &str,
    direction: Direction,
) -> Vec<String> {
    let mut found = Vec::new();
    let mut stack = vec![id.to_string()];
    let mut seen = vec![id.to_string()];
    while let Some(current) = stack.pop() {
        let next = match direction {
            Direction::Up => previous.predecessors(&current),
            Direction::Down => previous.successors(&current),
        };
        for n in next {
            if seen.iter().any(|s| s == n) {
                continue;
            }
            seen.push(n.to_string());
            if candidate.contains_node(n) {
                found.push(n.to_string());
            } else {
                stack.push(n.to_string());
            }
        }
    }
    found
}
