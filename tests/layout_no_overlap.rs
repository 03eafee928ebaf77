mod helpers;

use flowguard::layout::{Footprint, LayoutMode, LayoutParams, LayoutSolver};
use flowguard::model::{Graph, Node, NodeKind, Position};
use helpers::*;
use proptest::prelude::*;

fn tight_params() -> LayoutParams {
    LayoutParams {
        footprint: Footprint::new(150.0, 80.0),
        min_spacing: 10.0,
        margin: 0.0,
        ..LayoutParams::default()
    }
}

#[test]
fn six_nodes_full_rearrangement() {
    let mut g = chain(&[
        ("t", NodeKind::Trigger, "Start"),
        ("a1", NodeKind::Action, "Collect"),
        ("a2", NodeKind::Action, "Review"),
        ("c", NodeKind::Condition, "Approved?"),
        ("v", NodeKind::Validation, "Check fields"),
        ("end", NodeKind::Terminal, "Done"),
    ]);
    let solver = LayoutSolver::new(tight_params());
    let placements = solver.arrange_graph(&mut g);

    assert_eq!(placements.len(), 6);
    assert_no_overlap(&g, solver.params());
}

#[test]
fn bands_follow_role_order() {
    let mut g = chain(&[
        ("t", NodeKind::Trigger, "Start"),
        ("a", NodeKind::Action, "Work"),
        ("n", NodeKind::Notification, "Tell"),
        ("end", NodeKind::Terminal, "Done"),
    ]);
    g.add_node(
        Node::new("lock", NodeKind::Audit, "Audit").locked_by("AUDIT", "Keep a trail"),
    )
    .unwrap();
    g.add_edge("end", "lock").unwrap();

    let solver = LayoutSolver::new(tight_params());
    solver.arrange_graph(&mut g);
    let y = |id: &str| g.node(id).unwrap().position.y;
    let x = |id: &str| g.node(id).unwrap().position.x;

    assert!(y("t") < y("a"));
    assert!(y("a") < y("n"));
    assert!(y("n") < y("end"));
    for id in ["t", "a", "n", "end"] {
        assert!(x("lock") > x(id));
    }
}

#[test]
fn flow_band_uses_topological_order() {
    let mut g = Graph::new("s");
    // Inserted out of order; edges say a3 → a1 → a2.
    for id in ["a1", "a2", "a3"] {
        g.add_node(Node::new(id, NodeKind::Action, id)).unwrap();
    }
    g.add_edge("a3", "a1").unwrap();
    g.add_edge("a1", "a2").unwrap();

    let solver = LayoutSolver::new(LayoutParams {
        max_columns: 1,
        ..tight_params()
    });
    solver.arrange_graph(&mut g);
    let y = |id: &str| g.node(id).unwrap().position.y;
    assert!(y("a3") < y("a1"));
    assert!(y("a1") < y("a2"));
}

#[test]
fn incremental_mode_leaves_existing_nodes_alone() {
    let mut g = chain(&[
        ("a", NodeKind::Trigger, "A"),
        ("b", NodeKind::Action, "B"),
    ]);
    let solver = LayoutSolver::new(tight_params());
    solver.arrange_graph(&mut g);
    let before: Vec<Position> = g.nodes().iter().map(|n| n.position).collect();

    let pos_a = g.node("a").unwrap().position;
    g.add_node(Node::new("c", NodeKind::Action, "C").at(pos_a.x, pos_a.y))
        .unwrap();
    let placed = solver.place_new(&mut g, &["c".to_string()]);

    assert_eq!(placed.len(), 1);
    assert_eq!(g.nodes()[0].position, before[0]);
    assert_eq!(g.nodes()[1].position, before[1]);
    assert_ne!(g.node("c").unwrap().position, pos_a);
    assert_no_overlap(&g, solver.params());
}

#[test]
fn place_with_explicit_mode() {
    let solver = LayoutSolver::new(tight_params());
    let fixed = Node::new("fixed", NodeKind::Action, "F").at(100.0, 100.0);
    let fresh = Node::new("fresh", NodeKind::Action, "N").at(900.0, 900.0);
    let out = solver.place(&[&fresh], &[&fixed], LayoutMode::Incremental);
    assert_eq!(out[0].position, Position::new(900.0, 900.0));
}

fn arb_kind() -> impl Strategy<Value = NodeKind> {
    prop_oneof![
        Just(NodeKind::Trigger),
        Just(NodeKind::Action),
        Just(NodeKind::Condition),
        Just(NodeKind::Validation),
        Just(NodeKind::Audit),
        Just(NodeKind::Terminal),
        Just(NodeKind::Generic),
    ]
}

fn arb_nodes() -> impl Strategy<Value = Vec<(NodeKind, bool, f64, f64)>> {
    proptest::collection::vec(
        (arb_kind(), any::<bool>(), 0.0..1200.0f64, 0.0..900.0f64),
        1..40,
    )
}

fn build(specs: &[(NodeKind, bool, f64, f64)]) -> Graph {
    let mut g = Graph::new("prop");
    for (i, (kind, locked, x, y)) in specs.iter().enumerate() {
        let mut node = Node::new(format!("n{}", i), *kind, "N").at(*x, *y);
        if *locked {
            node = node.locked_by("X", "required");
        }
        g.add_node(node).unwrap();
    }
    g
}

proptest! {
    #[test]
    fn full_layout_never_overlaps(
        specs in arb_nodes(),
        spacing in 0u32..40,
        margin in 0u32..60,
        cols in 1usize..6,
    ) {
        let params = LayoutParams {
            min_spacing: spacing as f64,
            margin: margin as f64,
            max_columns: cols,
            ..tight_params()
        };
        let mut g = build(&specs);
        LayoutSolver::new(params.clone()).arrange_graph(&mut g);
        assert_no_overlap(&g, &params);
    }

    #[test]
    fn incremental_layout_never_overlaps(
        specs in arb_nodes(),
        spacing in 0u32..40,
    ) {
        let params = LayoutParams {
            min_spacing: spacing as f64,
            ..tight_params()
        };
        let solver = LayoutSolver::new(params.clone());
        let mut g = build(&specs);
        // Start from a clean arrangement, then drop every node back at its
        // random coordinate and place them one batch at a time.
        solver.arrange_graph(&mut g);
        let ids: Vec<String> = g.nodes().iter().map(|n| n.id.clone()).collect();
        let half = ids.len() / 2;
        for (i, (_, _, x, y)) in specs.iter().enumerate().skip(half) {
            g.set_position(&format!("n{}", i), Position::new(*x, *y));
        }
        solver.place_new(&mut g, &ids[half..]);
        assert_no_overlap(&g, &params);
    }
}
