//! Decide whether a required step is already present in the graph.

use crate::model::{Graph, Node};
use crate::rules::RequiredStep;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepMatch {
    /// A locked node carries the step's marker and reason.
    Satisfied(String),
    /// A node carries the step's marker without its lock or reason, or an
    /// ordinary node carries the step's label; lock it in place.
    Adoptable(String),
}

/// Marker match wins over label match, so a renamed-but-marked node is
/// never duplicated. Label matches only consider ordinary nodes: a locked
/// node without the marker belongs to some other rule.
pub fn find_satisfying(graph: &Graph, step: &RequiredStep) -> Option<StepMatch> {
    if let Some(node) = graph
        .nodes()
        .iter()
        .find(|n| n.has_marker(&step.compliance_type))
    {
        return Some(classify(node, step));
    }

    graph
        .nodes()
        .iter()
        .filter(|n| !n.locked)
        .find(|n| n.label.trim().eq_ignore_ascii_case(step.label.trim()))
        .map(|n| StepMatch::Adoptable(n.id.clone()))
}

fn classify(node: &Node, step: &RequiredStep) -> StepMatch {
    if node.locked && node.compliance_reason.as_deref() == Some(step.reason.as_str()) {
        StepMatch::Satisfied(node.id.clone())
    } else {
        StepMatch::Adoptable(node.id.clone())
    }
}

/// Lock an existing node as the step's compliance node.
pub fn adopt(graph: &mut Graph, node_id: &str, step: &RequiredStep, domain: &str) -> bool {
    let Some(node) = graph.node_mut(node_id) else {
        return false;
    };
    node.locked = true;
    node.compliance_reason = Some(step.reason.clone());
    node.compliance_type = Some(step.compliance_type.clone());
    if node.domain_tag.is_none() && !domain.is_empty() {
        node.domain_tag = Some(domain.to_string());
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NodeKind;
    use crate::rules::Anchor;

    fn audit_step() -> RequiredStep {
        RequiredStep::new(
            "Transaction Audit",
            "FINANCIAL_AUDIT",
            Anchor::after("payment"),
            "All transactions must be audited",
        )
    }

    #[test]
    fn locked_marker_satisfies() {
        let mut g = Graph::new("s");
        g.add_node(
            Node::new("x", NodeKind::Audit, "Ledger entry")
                .locked_by("financial_audit", "All transactions must be audited"),
        )
        .unwrap();
        assert_eq!(
            find_satisfying(&g, &audit_step()),
            Some(StepMatch::Satisfied("x".into()))
        );
    }

    #[test]
    fn unlocked_label_match_is_adoptable() {
        let mut g = Graph::new("s");
        g.add_node(Node::new("y", NodeKind::Action, "transaction audit")).unwrap();
        let step = audit_step();
        assert_eq!(
            find_satisfying(&g, &step),
            Some(StepMatch::Adoptable("y".into()))
        );
        assert!(adopt(&mut g, "y", &step, "finance"));
        let node = g.node("y").unwrap();
        assert!(node.locked);
        assert!(node.has_marker("FINANCIAL_AUDIT"));
        assert_eq!(node.domain_tag.as_deref(), Some("finance"));
    }

    #[test]
    fn locked_label_match_without_marker_is_ignored() {
        let mut g = Graph::new("s");
        let mut decoy = Node::new("fake", NodeKind::Audit, "Transaction Audit");
        decoy.locked = true;
        decoy.compliance_reason = Some("not really".into());
        g.add_node(decoy).unwrap();
        assert_eq!(find_satisfying(&g, &audit_step()), None);
    }

    #[test]
    fn marker_with_foreign_reason_is_readopted() {
        let mut g = Graph::new("s");
        g.add_node(Node::new("x", NodeKind::Audit, "Ledger").locked_by("FINANCIAL_AUDIT", "later"))
            .unwrap();
        let step = audit_step();
        assert_eq!(
            find_satisfying(&g, &step),
            Some(StepMatch::Adoptable("x".into()))
        );
        adopt(&mut g, "x", &step, "finance");
        assert_eq!(
            find_satisfying(&g, &step),
            Some(StepMatch::Satisfied("x".into()))
        );
    }

    #[test]
    fn unrelated_nodes_do_not_match() {
        let mut g = Graph::new("s");
        g.add_node(Node::new("p", NodeKind::Action, "Process Payment")).unwrap();
        assert_eq!(find_satisfying(&g, &audit_step()), None);
    }
}
