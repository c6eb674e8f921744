use std::f32::consts::PI;

use crate::config::LayoutConfig;
use crate::shape::ShapeKind;

use super::types::{NodeRole, PositionedNode};

const MAX_IMPLICIT_SETS: usize = 4;
/// Distance between neighbouring set centres as a fraction of the diameter.
const SET_CENTER_SPACING: f32 = 0.6;

/// Nodes hinted as ellipse/circle/set are the sets; without any such hint the
/// first (up to four) nodes are.
pub(super) fn set_indices(nodes: &[PositionedNode]) -> Vec<usize> {
    let hinted: Vec<usize> = nodes
        .iter()
        .enumerate()
        .filter(|(_, node)| {
            node.node
                .shape_hint
                .as_deref()
                .and_then(ShapeKind::from_hint)
                == Some(ShapeKind::Ellipse)
        })
        .map(|(idx, _)| idx)
        .collect();
    if !hinted.is_empty() {
        return hinted;
    }
    (0..nodes.len().min(MAX_IMPLICIT_SETS)).collect()
}

/// Overlapping circles for the sets, the remaining elements in a centred grid
/// below them.
pub(super) fn place(nodes: &mut [PositionedNode], config: &LayoutConfig) {
    if nodes.is_empty() {
        return;
    }
    let sets = set_indices(nodes);
    let diameter = (config.node_width.max(config.node_height) * 1.75).max(300.0);

    let set_count = sets.len();
    let ring_radius = if set_count <= 1 {
        0.0
    } else {
        diameter * SET_CENTER_SPACING / (2.0 * (PI / set_count as f32).sin())
    };
    // Two sets sit side by side; more start from the top.
    let start_angle = if set_count == 2 { PI } else { -PI / 2.0 };
    for (pos, &idx) in sets.iter().enumerate() {
        let angle = start_angle + 2.0 * PI * pos as f32 / set_count as f32;
        let node = &mut nodes[idx];
        node.shape = ShapeKind::Ellipse;
        node.width = diameter;
        node.height = diameter;
        node.role = NodeRole::VennSet;
        node.set_center(ring_radius * angle.cos(), ring_radius * angle.sin());
    }

    let circles_bottom = sets
        .iter()
        .map(|&idx| nodes[idx].bottom())
        .fold(f32::NEG_INFINITY, f32::max);
    let elements: Vec<usize> = (0..nodes.len()).filter(|idx| !sets.contains(idx)).collect();
    if elements.is_empty() {
        return;
    }

    let cols = (elements.len() as f32).sqrt().ceil() as usize;
    let cell_w = elements.iter().map(|&i| nodes[i].width).fold(0.0f32, f32::max) + config.node_spacing;
    let cell_h = elements.iter().map(|&i| nodes[i].height).fold(0.0f32, f32::max) + config.node_spacing;
    let top = if circles_bottom.is_finite() {
        circles_bottom + config.rank_spacing
    } else {
        0.0
    };
    for (pos, &idx) in elements.iter().enumerate() {
        let row = pos / cols;
        let col = pos % cols;
        let in_row = (elements.len() - row * cols).min(cols);
        let row_width = in_row as f32 * cell_w - config.node_spacing;
        let node = &mut nodes[idx];
        node.x = -row_width / 2.0 + col as f32 * cell_w;
        node.y = top + row as f32 * cell_h;
        node.role = NodeRole::VennElement;
    }
}
