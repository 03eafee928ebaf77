//! Incremental placement: new nodes find a free spot without moving anyone.
//!
//! Candidates, in order: preferred coordinate, grid scan of the canvas,
//! spiral around the preferred coordinate, then a seeded random spot past
//! the right edge of everything already placed.

use std::f64::consts::FRAC_PI_4;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::model::{Node, Position};

use super::{LayoutParams, Placement, Rect};

pub fn place(params: &LayoutParams, nodes: &[&Node], existing: &[&Node]) -> Vec<Placement> {
    let mut occupied: Vec<Rect> = existing.iter().map(|n| params.rect_at(n.position)).collect();
    let mut placements = Vec::with_capacity(nodes.len());

    for node in nodes {
        let position = find_free(params, node, &occupied);
        occupied.push(params.rect_at(position));
        placements.push(Placement {
            node_id: node.id.clone(),
            position,
        });
    }
    placements
}

fn find_free(params: &LayoutParams, node: &Node, occupied: &[Rect]) -> Position {
    let preferred = node.position;
    if params.is_free(preferred, occupied) {
        return preferred;
    }
    if let Some(p) = grid_scan(params, occupied) {
        return p;
    }
    if let Some(p) = spiral(params, preferred, occupied) {
        return p;
    }
    debug!(node = %node.id, "canvas full; placing past occupied extent");
    beyond_extent(params, &node.id, occupied)
}

fn grid_scan(params: &LayoutParams, occupied: &[Rect]) -> Option<Position> {
    let step_x = params.footprint.width + params.min_spacing + params.margin;
    let step_y = params.footprint.height + params.min_spacing + params.margin;
    let max_x = params.origin.x + params.canvas.width - params.footprint.width;
    let max_y = params.origin.y + params.canvas.height - params.footprint.height;

    let mut y = params.origin.y;
    while y <= max_y {
        let mut x = params.origin.x;
        while x <= max_x {
            let candidate = Position::new(x, y);
            if params.is_free(candidate, occupied) {
                return Some(candidate);
            }
            x += step_x;
        }
        y += step_y;
    }
    None
}

/// Eight directions per ring, starting east and turning 45° at a time.
fn spiral(params: &LayoutParams, center: Position, occupied: &[Rect]) -> Option<Position> {
    let ring_step = params.footprint.height + params.min_spacing;
    let mut radius = ring_step;
    while radius <= params.max_spiral_radius {
        for k in 0..8 {
            let angle = k as f64 * FRAC_PI_4;
            let candidate = center.offset(radius * angle.cos(), radius * angle.sin());
            if params.is_free(candidate, occupied) {
                return Some(candidate);
            }
        }
        radius += ring_step;
    }
    None
}

/// Always free: the x coordinate clears every occupied rect by twice the
/// spacing. The jitter is seeded by node id, so reruns agree.
fn beyond_extent(params: &LayoutParams, node_id: &str, occupied: &[Rect]) -> Position {
    let right = occupied
        .iter()
        .map(Rect::right)
        .fold(params.origin.x, f64::max);

    let mut rng = StdRng::seed_from_u64(id_seed(node_id));

    let jitter_x = rng.gen_range(0.0..=params.footprint.width);
    let jitter_y = rng.gen_range(0.0..=params.canvas.height);
    Position::new(
        right + 2.0 * params.min_spacing + jitter_x,
        params.origin.y + jitter_y,
    )
}

const FNV1A_OFFSET: u64 = 0xcbf29ce484222325;
const FNV1A_PRIME: u64 = 0x100000001b3;

/// FNV-1a over the id bytes; stable across builds and toolchains.
fn id_seed(node_id: &str) -> u64 {
    node_id.bytes().fold(FNV1A_OFFSET, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(FNV1A_PRIME)
    })
}
