//! Full rearrangement: horizontal bands by role, locked nodes in their own
//! column to the right.

use crate::model::{Node, NodeKind, Position};

use super::{LayoutParams, Placement};

/// Vertical sections of a full layout, top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Band {
    Trigger,
    Flow,
    Other,
    Terminal,
}

impl Band {
    pub const ALL: [Band; 4] = [Band::Trigger, Band::Flow, Band::Other, Band::Terminal];

    /// `None` for locked nodes, which go to the compliance column.
    pub fn of(node: &Node) -> Option<Band> {
        if node.locked {
            return None;
        }
        Some(match node.kind {
            NodeKind::Trigger => Band::Trigger,
            NodeKind::Action | NodeKind::Condition => Band::Flow,
            NodeKind::Terminal => Band::Terminal,
            NodeKind::Validation | NodeKind::Notification | NodeKind::Audit | NodeKind::Generic => {
                Band::Other
            }
        })
    }
}

/// Near-square grid: `ceil(sqrt(n))` columns, clamped to `[1, max_columns]`.
pub fn columns_for(count: usize, max_columns: usize) -> usize {
    let root = (count as f64).sqrt().ceil() as usize;
    root.clamp(1, max_columns.max(1))
}

pub fn arrange(params: &LayoutParams, nodes: &[&Node]) -> Vec<Placement> {
    // A cell keeps a node at least 2 * min_spacing from its neighbours.
    let gutter = params.min_spacing + params.margin.max(params.min_spacing);
    let cell_w = params.footprint.width + gutter;
    let cell_h = params.footprint.height + gutter;
    let section_gap = params.section_gap.max(0.0);

    let mut placements = Vec::with_capacity(nodes.len());
    let mut y = params.origin.y;
    let mut right = params.origin.x;

    for band in Band::ALL {
        let members: Vec<&Node> = nodes
            .iter()
            .copied()
            .filter(|n| Band::of(n) == Some(band))
            .collect();
        if members.is_empty() {
            continue;
        }
        let cols = columns_for(members.len(), params.max_columns);
        let rows = members.len().div_ceil(cols);

        for (i, node) in members.iter().enumerate() {
            let col = (i % cols) as f64;
            let row = (i / cols) as f64;
            placements.push(Placement {
                node_id: node.id.clone(),
                position: Position::new(params.origin.x + col * cell_w, y + row * cell_h),
            });
        }

        right = right.max(params.origin.x + cols as f64 * cell_w);
        y += rows as f64 * cell_h + section_gap;
    }

    let column_x = right + section_gap;
    for (i, node) in nodes.iter().filter(|n| n.locked).enumerate() {
        placements.push(Placement {
            node_id: node.id.clone(),
            position: Position::new(column_x, params.origin.y + i as f64 * cell_h),
        });
    }
    placements
}
