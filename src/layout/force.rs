use std::collections::HashMap;
use std::f32::consts::PI;

use crate::config::LayoutConfig;
use crate::ir::Structure;

use super::types::PositionedNode;

/// Fruchterman-Reingold spring embedding with a fixed iteration count.
///
/// Starts from a circle so the result only depends on input order. Returns
/// `false` without touching the nodes when the solver is disabled or produces a
/// non-finite position; the caller then falls back to [`place_grid`].
pub(super) fn place_spring(
    structure: &Structure,
    nodes: &mut [PositionedNode],
    config: &LayoutConfig,
) -> bool {
    let force = &config.force;
    let count = nodes.len();
    if !force.enabled || force.iterations == 0 || force.ideal_edge_length <= 0.0 {
        return false;
    }
    if count == 1 {
        nodes[0].set_center(0.0, 0.0);
        return true;
    }

    let index: HashMap<&str, usize> = nodes
        .iter()
        .enumerate()
        .map(|(idx, node)| (node.id(), idx))
        .collect();
    let edges: Vec<(usize, usize)> = structure
        .edges
        .iter()
        .filter(|edge| !edge.is_self_loop())
        .filter_map(|edge| Some((*index.get(edge.from.as_str())?, *index.get(edge.to.as_str())?)))
        .collect();

    let k = force.ideal_edge_length;
    let start_radius = (k * count as f32 / (2.0 * PI)).max(k);
    let mut pos: Vec<(f32, f32)> = (0..count)
        .map(|idx| {
            let angle = 2.0 * PI * idx as f32 / count as f32;
            (start_radius * angle.cos(), start_radius * angle.sin())
        })
        .collect();

    let initial_temperature = start_radius / 2.0;
    for iteration in 0..force.iterations {
        let temperature =
            initial_temperature * (1.0 - iteration as f32 / force.iterations as f32);
        let mut disp = vec![(0.0f32, 0.0f32); count];

        for i in 0..count {
            for j in (i + 1)..count {
                let (dx, dy, dist) = separation(pos[i], pos[j], i, j);
                let push = k * k / dist;
                let (fx, fy) = (dx / dist * push, dy / dist * push);
                disp[i].0 += fx;
                disp[i].1 += fy;
                disp[j].0 -= fx;
                disp[j].1 -= fy;
            }
        }

        for &(a, b) in &edges {
            let (dx, dy, dist) = separation(pos[a], pos[b], a, b);
            let pull = dist * dist / k;
            let (fx, fy) = (dx / dist * pull, dy / dist * pull);
            disp[a].0 -= fx;
            disp[a].1 -= fy;
            disp[b].0 += fx;
            disp[b].1 += fy;
        }

        for (p, d) in pos.iter_mut().zip(&disp) {
            let len = d.0.hypot(d.1);
            if len > 0.0 {
                let step = len.min(temperature);
                p.0 += d.0 / len * step;
                p.1 += d.1 / len * step;
            }
        }
    }

    if pos.iter().any(|(x, y)| !x.is_finite() || !y.is_finite()) {
        return false;
    }
    for (node, (cx, cy)) in nodes.iter_mut().zip(pos) {
        node.set_center(cx, cy);
    }
    true
}

/// Distance vector from `b` to `a`, with a deterministic nudge for
/// coincident points.
fn separation(a: (f32, f32), b: (f32, f32), i: usize, j: usize) -> (f32, f32, f32) {
    let (mut dx, mut dy) = (a.0 - b.0, a.1 - b.1);
    let mut dist = dx.hypot(dy);
    if dist < 0.01 {
        let angle = (i * 31 + j * 17) as f32;
        dx = angle.cos() * 0.01;
        dy = angle.sin() * 0.01;
        dist = 0.01;
    }
    (dx, dy, dist)
}

/// Row-major grid with `ceil(sqrt(n))` columns.
pub(super) fn place_grid(nodes: &mut [PositionedNode], config: &LayoutConfig) {
    let count = nodes.len();
    if count == 0 {
        return;
    }
    let cols = (count as f32).sqrt().ceil() as usize;
    let cell_w = nodes.iter().map(|n| n.width).fold(0.0f32, f32::max) + config.node_spacing;
    let cell_h = nodes.iter().map(|n| n.height).fold(0.0f32, f32::max) + config.rank_spacing;
    for (idx, node) in nodes.iter_mut().enumerate() {
        node.x = (idx % cols) as f32 * cell_w;
        node.y = (idx / cols) as f32 * cell_h;
    }
}

/// Pushes overlapping boxes apart along whichever axis needs the smaller move.
pub(super) fn resolve_overlaps(nodes: &mut [PositionedNode], min_gap: f32) {
    if nodes.len() < 2 {
        return;
    }
    for _ in 0..8 {
        let mut moved = false;
        for i in 0..nodes.len() {
            for j in (i + 1)..nodes.len() {
                let (a, b) = (&nodes[i], &nodes[j]);
                let overlap_x = a.right().min(b.right()) - a.x.max(b.x);
                let overlap_y = a.bottom().min(b.bottom()) - a.y.max(b.y);
                if overlap_x <= 0.0 || overlap_y <= 0.0 {
                    continue;
                }
                let (ca, cb) = (a.center(), b.center());
                if overlap_x <= overlap_y {
                    let sign = if cb.0 >= ca.0 { 1.0 } else { -1.0 };
                    nodes[j].x += sign * (overlap_x + min_gap);
                } else {
                    let sign = if cb.1 >= ca.1 { 1.0 } else { -1.0 };
                    nodes[j].y += sign * (overlap_y + min_gap);
                }
                moved = true;
            }
        }
        if !moved {
            break;
        }
    }
}
