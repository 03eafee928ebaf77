//! Layout phase: collision-free canvas coordinates for graph nodes.
//!
//! Positions are top-left corners. Every node occupies the same footprint,
//! and two nodes collide when their footprints, each grown by `min_spacing`,
//! intersect.

pub mod arrange;
pub mod incremental;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::model::{Graph, Node, Position};

pub use arrange::Band;

// =============================================================================
// PARAMETERS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Footprint {
    pub width: f64,
    pub height: f64,
}

impl Footprint {
    pub fn new(width: f64, height: f64) -> Self {
        Footprint { width, height }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutParams {
    pub footprint: Footprint,
    pub min_spacing: f64,
    pub margin: f64,
    pub section_gap: f64,
    pub max_columns: usize,
    pub canvas: Footprint,
    pub max_spiral_radius: f64,
    pub origin: Position,
}

impl Default for LayoutParams {
    fn default() -> Self {
        LayoutParams {
            footprint: Footprint::new(200.0, 80.0),
            min_spacing: 20.0,
            margin: 40.0,
            section_gap: 120.0,
            max_columns: 4,
            canvas: Footprint::new(1600.0, 1200.0),
            max_spiral_radius: 800.0,
            origin: Position::new(50.0, 50.0),
        }
    }
}

impl LayoutParams {
    pub fn check(&self) -> EngineResult<()> {
        let positive = |v: f64| v.is_finite() && v > 0.0;
        let non_negative = |v: f64| v.is_finite() && v >= 0.0;
        if !positive(self.footprint.width) || !positive(self.footprint.height) {
            return Err(EngineError::Config("layout footprint must be positive".into()));
        }
        if !positive(self.canvas.width) || !positive(self.canvas.height) {
            return Err(EngineError::Config("layout canvas must be positive".into()));
        }
        for (name, v) in [
            ("minSpacing", self.min_spacing),
            ("margin", self.margin),
            ("sectionGap", self.section_gap),
            ("maxSpiralRadius", self.max_spiral_radius),
        ] {
            if !non_negative(v) {
                return Err(EngineError::Config(format!(
                    "layout {} must be a non-negative number",
                    name
                )));
            }
        }
        if self.max_columns == 0 {
            return Err(EngineError::Config("layout maxColumns must be at least 1".into()));
        }
        Ok(())
    }

    pub(crate) fn rect_at(&self, position: Position) -> Rect {
        Rect {
            x: position.x,
            y: position.y,
            width: self.footprint.width,
            height: self.footprint.height,
        }
    }

    /// True if a node at `position` keeps `min_spacing` clear of every rect.
    pub(crate) fn is_free(&self, position: Position, occupied: &[Rect]) -> bool {
        let candidate = self.rect_at(position);
        !occupied
            .iter()
            .any(|r| rects_overlap(&candidate, r, self.min_spacing))
    }
}

// =============================================================================
// GEOMETRY
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

/// Both rects are grown by `margin` on every side; touching edges do not
/// count as overlap.
pub fn rects_overlap(a: &Rect, b: &Rect, margin: f64) -> bool {
    let ax1 = a.x - margin;
    let ay1 = a.y - margin;
    let ax2 = a.right() + margin;
    let ay2 = a.bottom() + margin;

    let bx1 = b.x - margin;
    let by1 = b.y - margin;
    let bx2 = b.right() + margin;
    let by2 = b.bottom() + margin;

    ax1 < bx2 && ax2 > bx1 && ay1 < by2 && ay2 > by1
}

// =============================================================================
// SOLVER
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutMode {
    /// Place only the given nodes, leaving every existing node where it is.
    Incremental,
    /// Recompute every position from scratch.
    Full,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    pub node_id: String,
    pub position: Position,
}

#[derive(Debug, Clone, Default)]
pub struct LayoutSolver {
    params: LayoutParams,
}

impl LayoutSolver {
    pub fn new(params: LayoutParams) -> Self {
        LayoutSolver { params }
    }

    pub fn params(&self) -> &LayoutParams {
        &self.params
    }

    /// Positions for `nodes`. In incremental mode a node's current position
    /// is its preferred coordinate and `existing` nodes are obstacles; in full
    /// mode `nodes` should come in topological order and `existing` is ignored.
    pub fn place(&self, nodes: &[&Node], existing: &[&Node], mode: LayoutMode) -> Vec<Placement> {
        match mode {
            LayoutMode::Incremental => incremental::place(&self.params, nodes, existing),
            LayoutMode::Full => arrange::arrange(&self.params, nodes),
        }
    }

    /// Full rearrangement of the whole graph, applied in place.
    pub fn arrange_graph(&self, graph: &mut Graph) -> Vec<Placement> {
        let order = graph.index().topo_order();
        let ordered: Vec<&Node> = order.iter().filter_map(|id| graph.node(id)).collect();
        let placements = self.place(&ordered, &[], LayoutMode::Full);
        apply(graph, &placements);
        debug!(nodes = placements.len(), "full layout applied");
        placements
    }

    /// Place only `new_ids`, keeping every other node fixed, applied in place.
    pub fn place_new(&self, graph: &mut Graph, new_ids: &[String]) -> Vec<Placement> {
        let is_new = |n: &&Node| new_ids.iter().any(|id| *id == n.id);
        let fresh: Vec<&Node> = graph.nodes().iter().filter(is_new).collect();
        if fresh.is_empty() {
            return Vec::new();
        }
        let fixed: Vec<&Node> = graph.nodes().iter().filter(|n| !is_new(n)).collect();
        let placements = self.place(&fresh, &fixed, LayoutMode::Incremental);
        apply(graph, &placements);
        debug!(nodes = placements.len(), "incremental layout applied");
        placements
    }
}

fn apply(graph: &mut Graph, placements: &[Placement]) {
    for p in placements {
        graph.set_position(&p.node_id, p.position);
    }
}
