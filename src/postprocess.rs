//! Global geometric corrections applied after a layout strategy has run.

use crate::config::PostProcessConfig;
use crate::ir::{DiagramKind, Edge, LayoutStrategy};
use crate::layout::{NodeRole, PositionedNode};

/// Repairs spacing, optionally balances crowded rows and flattens tall
/// layouts, then centres the result on x = 0 with the top edge at y = 0.
///
/// Node order is preserved. Venn set circles are left where they are by the
/// row passes since they are meant to overlap.
pub fn process(
    mut nodes: Vec<PositionedNode>,
    _edges: &[Edge],
    kind: &DiagramKind,
    config: &PostProcessConfig,
) -> Vec<PositionedNode> {
    if nodes.is_empty() {
        return nodes;
    }
    let strategy = kind.strategy();

    if strategy != LayoutStrategy::Venn {
        if let Some(limit) = config.max_nodes_per_row.filter(|&limit| limit > 0) {
            balance_rows(&mut nodes, limit, config);
        }
    }
    repair_spacing(&mut nodes, config);
    if strategy != LayoutStrategy::Venn {
        correct_aspect_ratio(&mut nodes, config);
    }
    center(&mut nodes);
    nodes
}

/// Groups row-participating nodes into rows by top edge, top to bottom.
/// A node joins the current row when its y lies within `tolerance` of the
/// row's first node.
fn group_rows(nodes: &[PositionedNode], tolerance: f32) -> Vec<Vec<usize>> {
    let mut order: Vec<usize> = (0..nodes.len())
        .filter(|&idx| nodes[idx].role != NodeRole::VennSet)
        .collect();
    order.sort_by(|&a, &b| nodes[a].y.total_cmp(&nodes[b].y).then(a.cmp(&b)));

    let mut rows: Vec<Vec<usize>> = Vec::new();
    let mut anchor = f32::NEG_INFINITY;
    for idx in order {
        let y = nodes[idx].y;
        match rows.last_mut() {
            Some(row) if (y - anchor).abs() <= tolerance => row.push(idx),
            _ => {
                anchor = y;
                rows.push(vec![idx]);
            }
        }
    }
    for row in &mut rows {
        row.sort_by(|&a, &b| nodes[a].x.total_cmp(&nodes[b].x).then(a.cmp(&b)));
    }
    rows
}

/// Pushes each node right until it clears its left neighbour by `min_spacing`.
fn repair_spacing(nodes: &mut [PositionedNode], config: &PostProcessConfig) {
    let mut pushed = 0usize;
    for row in group_rows(nodes, config.row_tolerance) {
        for pair in row.windows(2) {
            let (left, right) = (pair[0], pair[1]);
            let min_x = nodes[left].right() + config.min_spacing;
            if nodes[right].x < min_x {
                nodes[right].x = min_x;
                pushed += 1;
            }
        }
    }
    if pushed > 0 {
        log::debug!(pushed = pushed; "separated crowded row neighbours");
    }
}

/// Wraps rows longer than `limit` onto extra rows inserted directly below,
/// shifting everything underneath down to make room.
fn balance_rows(nodes: &mut [PositionedNode], limit: usize, config: &PostProcessConfig) {
    let rows = group_rows(nodes, config.row_tolerance);
    let mut shift = 0.0f32;
    for row in rows {
        for &idx in &row {
            nodes[idx].y += shift;
        }
        if row.len() <= limit {
            continue;
        }

        let left = row.iter().map(|&idx| nodes[idx].x).fold(f32::INFINITY, f32::min);
        let right = row.iter().map(|&idx| nodes[idx].right()).fold(f32::NEG_INFINITY, f32::max);
        let mid = (left + right) / 2.0;
        let top = row.iter().map(|&idx| nodes[idx].y).fold(f32::INFINITY, f32::min);
        let row_height = row.iter().map(|&idx| nodes[idx].height).fold(0.0f32, f32::max);
        let step = row_height + config.min_level_spacing;

        let chunks: Vec<&[usize]> = row.chunks(limit).collect();
        for (line, chunk) in chunks.iter().enumerate() {
            let width: f32 = chunk.iter().map(|&idx| nodes[idx].width).sum::<f32>()
                + config.min_spacing * chunk.len().saturating_sub(1) as f32;
            let mut cursor = mid - width / 2.0;
            for &idx in chunk.iter() {
                nodes[idx].x = cursor;
                nodes[idx].y = top + step * line as f32;
                cursor += nodes[idx].width + config.min_spacing;
            }
        }
        shift += step * (chunks.len() - 1) as f32;
        log::debug!(nodes = row.len(), lines = chunks.len(); "wrapped crowded row");
    }
}

/// Compresses the vertical gaps between rows when the layout is more than
/// `max_aspect_ratio` times taller than wide. Gaps never shrink below
/// `min_level_spacing`.
fn correct_aspect_ratio(nodes: &mut [PositionedNode], config: &PostProcessConfig) {
    let (width, height) = extent(nodes);
    if width <= 0.0 || height <= config.max_aspect_ratio * width {
        return;
    }
    let rows = group_rows(nodes, config.row_tolerance);
    if rows.len() < 2 {
        return;
    }

    let tops: Vec<f32> = rows
        .iter()
        .map(|row| row.iter().map(|&idx| nodes[idx].y).fold(f32::INFINITY, f32::min))
        .collect();
    let bottoms: Vec<f32> = rows
        .iter()
        .map(|row| row.iter().map(|&idx| nodes[idx].bottom()).fold(f32::NEG_INFINITY, f32::max))
        .collect();
    let slack: Vec<f32> = (1..rows.len())
        .map(|i| (tops[i] - bottoms[i - 1] - config.min_level_spacing).max(0.0))
        .collect();
    let total_slack: f32 = slack.iter().sum();
    if total_slack <= 0.0 {
        return;
    }
    let excess = height - config.max_aspect_ratio * width;
    let ratio = (excess / total_slack).min(1.0);

    let mut lift = 0.0f32;
    for (i, row) in rows.iter().enumerate() {
        if i > 0 {
            lift += slack[i - 1] * ratio;
        }
        for &idx in row {
            nodes[idx].y -= lift;
        }
    }
    log::debug!(lifted = lift; "compressed row gaps for aspect ratio");
}

fn extent(nodes: &[PositionedNode]) -> (f32, f32) {
    let (min_x, min_y, max_x, max_y) = bounds(nodes);
    (max_x - min_x, max_y - min_y)
}

fn bounds(nodes: &[PositionedNode]) -> (f32, f32, f32, f32) {
    nodes.iter().fold(
        (f32::INFINITY, f32::INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
        |(min_x, min_y, max_x, max_y), node| {
            (
                min_x.min(node.x),
                min_y.min(node.y),
                max_x.max(node.right()),
                max_y.max(node.bottom()),
            )
        },
    )
}

/// Horizontal bounding-box midpoint to x = 0, topmost edge to y = 0.
fn center(nodes: &mut [PositionedNode]) {
    let (min_x, min_y, max_x, _) = bounds(nodes);
    let dx = -(min_x + max_x) / 2.0;
    let dy = -min_y;
    for node in nodes.iter_mut() {
        node.x += dx;
        node.y += dy;
    }
}
