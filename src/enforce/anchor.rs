//! Resolve a step's anchor to concrete nodes of the current graph.

use crate::error::Warning;
use crate::model::Graph;
use crate::rules::{AnchorMode, RequiredStep};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedAnchor {
    Before(String),
    After(String),
    /// Precede every listed entry node.
    Start(Vec<String>),
    /// Follow every listed terminal node.
    End(Vec<String>),
}

impl ResolvedAnchor {
    /// The node the new step is attached to, if it has a single one.
    pub fn anchor_node(&self) -> Option<&str> {
        match self {
            ResolvedAnchor::Before(id) | ResolvedAnchor::After(id) => Some(id),
            ResolvedAnchor::Start(ids) | ResolvedAnchor::End(ids) => {
                ids.first().map(String::as_str)
            }
        }
    }
}

/// Must run before the new node is added, so boundary sets and label search
/// only see pre-existing nodes.
pub fn resolve(graph: &Graph, step: &RequiredStep) -> (ResolvedAnchor, Option<Warning>) {
    let keyword = step.anchor.match_keyword.as_deref().unwrap_or_default();
    match step.anchor.mode {
        AnchorMode::BeforeLabelMatch => match find_label_match(graph, keyword) {
            Some(id) => (ResolvedAnchor::Before(id), None),
            None => (
                start(graph),
                Some(Warning::anchor_not_found(&step.label, keyword, "at start")),
            ),
        },
        AnchorMode::AfterLabelMatch => match find_label_match(graph, keyword) {
            Some(id) => (ResolvedAnchor::After(id), None),
            None => (
                end(graph),
                Some(Warning::anchor_not_found(&step.label, keyword, "at end")),
            ),
        },
        AnchorMode::AtStart => (start(graph), None),
        AnchorMode::AtEnd => (end(graph), None),
    }
}

/// First node, in insertion order, whose label contains `keyword`
/// (case-insensitive). Ordinary steps are preferred over compliance nodes.
pub fn find_label_match(graph: &Graph, keyword: &str) -> Option<String> {
    if keyword.trim().is_empty() {
        return None;
    }
    let keyword = keyword.trim();
    graph
        .nodes()
        .iter()
        .filter(|n| !n.locked)
        .find(|n| n.label_contains(keyword))
        .or_else(|| graph.nodes().iter().find(|n| n.label_contains(keyword)))
        .map(|n| n.id.clone())
}

/// Keep rule order among steps that attach at the same place. On the `after`
/// side earlier steps sit closer to the anchor, on the `before` side later
/// ones do, so a restored node lands back in the slot it was removed from.
/// `position` is the step's index in `steps`.
pub fn settle(
    graph: &Graph,
    resolved: ResolvedAnchor,
    steps: &[RequiredStep],
    position: usize,
) -> ResolvedAnchor {
    if position >= steps.len() {
        return resolved;
    }
    let home = resolved.side();
    let earlier = siblings(graph, &home, &steps[..position]);
    let later = siblings(graph, &home, &steps[position + 1..]);
    let is_earlier = |id: &str| is_locked_as(graph, id, &earlier);
    let is_later = |id: &str| is_locked_as(graph, id, &later);

    match resolved {
        ResolvedAnchor::After(a) => ResolvedAnchor::After(walk(graph, a, Walk::Forward, is_earlier)),
        ResolvedAnchor::Before(a) => ResolvedAnchor::Before(walk(graph, a, Walk::Back, is_later)),
        ResolvedAnchor::Start(entries) => {
            let single = match entries.as_slice() {
                [only] if is_earlier(only.as_str()) => Some(only.clone()),
                _ => None,
            };
            match single {
                Some(entry) => ResolvedAnchor::After(walk(graph, entry, Walk::Forward, is_earlier)),
                None => ResolvedAnchor::Start(entries),
            }
        }
        ResolvedAnchor::End(terminals) => {
            let single = match terminals.as_slice() {
                [only] if is_later(only.as_str()) => Some(only.clone()),
                _ => None,
            };
            match single {
                Some(terminal) => ResolvedAnchor::Before(walk(graph, terminal, Walk::Back, is_later)),
                None => ResolvedAnchor::End(terminals),
            }
        }
    }
}

/// Where a step attaches, ignoring the boundary node lists.
#[derive(Debug, PartialEq, Eq)]
enum Side {
    Before(String),
    After(String),
    Start,
    End,
}

impl ResolvedAnchor {
    fn side(&self) -> Side {
        match self {
            ResolvedAnchor::Before(id) => Side::Before(id.clone()),
            ResolvedAnchor::After(id) => Side::After(id.clone()),
            ResolvedAnchor::Start(_) => Side::Start,
            ResolvedAnchor::End(_) => Side::End,
        }
    }
}

/// Compliance types of the steps in `steps` that attach at `home`.
fn siblings<'s>(graph: &Graph, home: &Side, steps: &'s [RequiredStep]) -> Vec<&'s str> {
    steps
        .iter()
        .filter(|s| resolve(graph, s).0.side() == *home)
        .map(|s| s.compliance_type.as_str())
        .collect()
}

fn is_locked_as(graph: &Graph, id: &str, compliance_types: &[&str]) -> bool {
    graph
        .node(id)
        .is_some_and(|n| n.locked && compliance_types.iter().any(|t| n.has_marker(t)))
}

#[derive(Clone, Copy)]
enum Walk {
    Forward,
    Back,
}

/// Follow single-neighbour links while the neighbour is in the run.
fn walk(graph: &Graph, from: String, direction: Walk, in_run: impl Fn(&str) -> bool) -> String {
    let mut current = from;
    for _ in 0..graph.nodes().len() {
        let next = match direction {
            Walk::Forward => graph.successors(&current),
            Walk::Back => graph.predecessors(&current),
        };
        match next.as_slice() {
            [only] if in_run(*only) => current = only.to_string(),
            _ => break,
        }
    }
    current
}

fn start(graph: &Graph) -> ResolvedAnchor {
    ResolvedAnchor::Start(graph.entry_nodes().into_iter().map(String::from).collect())
}

fn end(graph: &Graph) -> ResolvedAnchor {
    ResolvedAnchor::End(graph.terminal_nodes().into_iter().map(String::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WarningKind;
    use crate::model::{Node, NodeKind};
    use crate::rules::Anchor;

    fn graph() -> Graph {
        let mut g = Graph::new("s");
        g.add_node(Node::new("a", NodeKind::Trigger, "Invoice Received")).unwrap();
        g.add_node(
            Node::new("lock", NodeKind::Audit, "Payment Audit").locked_by("PAY_AUDIT", "r"),
        )
        .unwrap();
        g.add_node(Node::new("b", NodeKind::Action, "Process PAYMENT")).unwrap();
        g.add_edge("a", "b").unwrap();
        g
    }

    #[test]
    fn label_match_prefers_unlocked_nodes() {
        assert_eq!(find_label_match(&graph(), "payment"), Some("b".into()));
        assert_eq!(find_label_match(&graph(), "audit"), Some("lock".into()));
        assert_eq!(find_label_match(&graph(), "  "), None);
    }

    fn locked(id: &str, ty: &str) -> Node {
        Node::new(id, NodeKind::Validation, id).locked_by(ty, "r")
    }

    fn steps_at(anchor: Anchor) -> Vec<RequiredStep> {
        ["ONE", "TWO", "THREE"]
            .iter()
            .map(|t| RequiredStep::new(*t, *t, anchor.clone(), "r"))
            .collect()
    }

    fn steps() -> Vec<RequiredStep> {
        steps_at(Anchor::after("patient"))
    }

    #[test]
    fn after_anchor_skips_earlier_steps() {
        // p → one → x
        let mut g = Graph::new("s");
        g.add_node(Node::new("p", NodeKind::Trigger, "Patient")).unwrap();
        g.add_node(locked("one", "ONE")).unwrap();
        g.add_node(locked("three", "THREE")).unwrap();
        g.add_node(Node::new("x", NodeKind::Terminal, "Done")).unwrap();
        g.add_edge("p", "one").unwrap();
        g.add_edge("one", "three").unwrap();
        g.add_edge("three", "x").unwrap();

        let settled = settle(&g, ResolvedAnchor::After("p".into()), &steps(), 1);
        assert_eq!(settled, ResolvedAnchor::After("one".into()));
        let settled = settle(&g, ResolvedAnchor::After("p".into()), &steps(), 0);
        assert_eq!(settled, ResolvedAnchor::After("p".into()));
    }

    #[test]
    fn before_anchor_skips_later_steps() {
        let mut g = Graph::new("s");
        g.add_node(Node::new("i", NodeKind::Trigger, "In")).unwrap();
        g.add_node(locked("two", "TWO")).unwrap();
        g.add_node(Node::new("a", NodeKind::Action, "Record update")).unwrap();
        g.add_edge("i", "two").unwrap();
        g.add_edge("two", "a").unwrap();

        let steps = steps_at(Anchor::before("record"));
        let settled = settle(&g, ResolvedAnchor::Before("a".into()), &steps, 0);
        assert_eq!(settled, ResolvedAnchor::Before("two".into()));
        let settled = settle(&g, ResolvedAnchor::Before("a".into()), &steps, 2);
        assert_eq!(settled, ResolvedAnchor::Before("a".into()));
    }

    #[test]
    fn steps_attached_elsewhere_are_not_skipped() {
        let mut g = Graph::new("s");
        g.add_node(Node::new("p", NodeKind::Trigger, "Patient")).unwrap();
        g.add_node(locked("one", "ONE")).unwrap();
        g.add_edge("p", "one").unwrap();

        let mut steps = steps();
        steps[0].anchor = Anchor::at_end();
        let settled = settle(&g, ResolvedAnchor::After("p".into()), &steps, 1);
        assert_eq!(settled, ResolvedAnchor::After("p".into()));
    }

    #[test]
    fn different_keywords_on_one_node_share_a_run() {
        // "Charge card payment" anchors both a `card` and a `payment` step.
        let mut g = Graph::new("s");
        g.add_node(Node::new("i", NodeKind::Trigger, "Invoice")).unwrap();
        g.add_node(locked("fraud", "FRAUD")).unwrap();
        g.add_node(Node::new("c", NodeKind::Action, "Charge card payment")).unwrap();
        g.add_edge("i", "fraud").unwrap();
        g.add_edge("fraud", "c").unwrap();

        let steps = vec![
            RequiredStep::new("PCI", "PCI", Anchor::before("card"), "r"),
            RequiredStep::new("Fraud", "FRAUD", Anchor::before("payment"), "r"),
        ];
        let settled = settle(&g, ResolvedAnchor::Before("c".into()), &steps, 0);
        assert_eq!(settled, ResolvedAnchor::Before("fraud".into()));
    }

    #[test]
    fn boundaries_held_by_a_single_step_follow_rule_order() {
        let mut g = Graph::new("s");
        g.add_node(locked("one", "ONE")).unwrap();
        let starts = steps_at(Anchor::at_start());
        let settled = settle(&g, ResolvedAnchor::Start(vec!["one".into()]), &starts, 1);
        assert_eq!(settled, ResolvedAnchor::After("one".into()));

        let ends = steps_at(Anchor::at_end());
        let settled = settle(&g, ResolvedAnchor::End(vec!["one".into()]), &ends, 1);
        assert_eq!(settled, ResolvedAnchor::End(vec!["one".into()]));

        let mut g = Graph::new("s");
        g.add_node(locked("three", "THREE")).unwrap();
        let settled = settle(&g, ResolvedAnchor::End(vec!["three".into()]), &ends, 1);
        assert_eq!(settled, ResolvedAnchor::Before("three".into()));
    }

    #[test]
    fn missing_keyword_falls_back_with_warning() {
        let step = RequiredStep::new("PCI", "PCI_DSS", Anchor::before("card"), "r");
        let (anchor, warning) = resolve(&graph(), &step);
        assert_eq!(
            anchor,
            ResolvedAnchor::Start(vec!["a".to_string(), "lock".to_string()])
        );
        assert_eq!(warning.unwrap().kind, WarningKind::AnchorNotFound);

        let step = RequiredStep::new("Audit", "X", Anchor::after("card"), "r");
        let (anchor, _) = resolve(&graph(), &step);
        assert_eq!(
            anchor,
            ResolvedAnchor::End(vec!["lock".to_string(), "b".to_string()])
        );
    }
}
