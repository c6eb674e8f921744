use std::f32::consts::PI;

use crate::config::LayoutConfig;

use super::types::PositionedNode;

/// Centre node (the first one) at the origin, every other node evenly spaced
/// on one ring. The ring grows past the configured radius when the nodes would
/// otherwise touch each other or the centre.
pub(super) fn place(nodes: &mut [PositionedNode], config: &LayoutConfig) {
    let Some((center, ring)) = nodes.split_first_mut() else {
        return;
    };
    center.set_center(0.0, 0.0);
    center.layer = Some(0);
    if ring.is_empty() {
        return;
    }

    let diagonal = |node: &PositionedNode| node.width.hypot(node.height);
    let widest = ring.iter().map(diagonal).fold(0.0f32, f32::max);
    let clearance = diagonal(center) / 2.0 + widest / 2.0 + config.node_spacing;
    let mut radius = config.radial.radius.max(clearance);
    let count = ring.len();
    if count > 1 {
        let chord_needed = widest + config.node_spacing;
        let fit = chord_needed / (2.0 * (PI / count as f32).sin());
        radius = radius.max(fit);
    }

    let step = 2.0 * PI / count as f32;
    for (idx, node) in ring.iter_mut().enumerate() {
        // Start at twelve o'clock and go clockwise (y grows downward).
        let angle = -PI / 2.0 + step * idx as f32;
        node.set_center(radius * angle.cos(), radius * angle.sin());
        node.layer = Some(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Node;
    use crate::shape::ShapeKind;

    fn ring(count: usize) -> Vec<PositionedNode> {
        (0..count)
            .map(|idx| PositionedNode::new(Node::new(format!("n{idx}"), "n"), ShapeKind::Rectangle, 200.0, 80.0))
            .collect()
    }

    #[test]
    fn center_sits_on_origin() {
        let mut nodes = ring(1);
        place(&mut nodes, &LayoutConfig::default());
        assert_eq!(nodes[0].center(), (0.0, 0.0));
    }

    #[test]
    fn ring_nodes_never_overlap() {
        for count in 2..=24 {
            let mut nodes = ring(count);
            place(&mut nodes, &LayoutConfig::default());
            for i in 0..count {
                for j in (i + 1)..count {
                    let (a, b) = (&nodes[i], &nodes[j]);
                    let overlap_x = a.right().min(b.right()) - a.x.max(b.x);
                    let overlap_y = a.bottom().min(b.bottom()) - a.y.max(b.y);
                    assert!(
                        overlap_x <= 0.0 || overlap_y <= 0.0,
                        "{count} nodes: {i} and {j} overlap"
                    );
                }
            }
        }
    }

    #[test]
    fn default_radius_is_kept_for_small_maps() {
        let mut nodes = ring(4);
        place(&mut nodes, &LayoutConfig::default());
        let (cx, cy) = nodes[1].center();
        assert!((cx.hypot(cy) - 400.0).abs() < 0.01);
    }
}
