mod force;
pub mod layered;
mod radial;
mod ranking;
pub(crate) mod types;
mod venn;
pub use types::*;

use crate::config::LayoutConfig;
use crate::ir::{LayoutStrategy, Structure};
use crate::shape::infer_shape;

use layered::LayeredLayout;

/// Positions every node of `structure`, in input order.
pub fn compute_layout(structure: &Structure, config: &LayoutConfig) -> Vec<PositionedNode> {
    compute_layout_with_stats(structure, config).nodes
}

pub fn compute_layout_with_stats(structure: &Structure, config: &LayoutConfig) -> LayoutResult {
    let strategy = structure.kind.strategy();
    if structure.nodes.is_empty() {
        return LayoutResult::empty(strategy);
    }

    let mut result = LayoutResult::empty(strategy);
    let mut nodes = initial_nodes(structure, config);
    match strategy {
        LayoutStrategy::Layered => {
            let layered = LayeredLayout::build(structure, config.order_passes);
            layered.place(&mut nodes, config);
            result.layer_count = layered.layer_count();
            result.dummy_count = layered.dummy_count();
        }
        LayoutStrategy::Radial => {
            radial::place(&mut nodes, config);
            result.layer_count = if nodes.len() > 1 { 2 } else { 1 };
        }
        LayoutStrategy::ForceDirected => {
            if !force::place_spring(structure, &mut nodes, config) {
                log::warn!(nodes = nodes.len(); "force-directed layout unavailable, using grid");
                force::place_grid(&mut nodes, config);
                result.used_fallback = true;
            }
            force::resolve_overlaps(&mut nodes, config.node_spacing);
        }
        LayoutStrategy::Venn => venn::place(&mut nodes, config),
    }

    log::debug!(
        kind = structure.kind.as_str(),
        strategy:? = strategy,
        nodes = nodes.len(),
        layers = result.layer_count,
        dummies = result.dummy_count;
        "computed layout"
    );
    result.nodes = nodes;
    result
}

/// Unplaced nodes with their resolved shape and footprint.
fn initial_nodes(structure: &Structure, config: &LayoutConfig) -> Vec<PositionedNode> {
    structure
        .nodes
        .iter()
        .map(|node| {
            let shape = infer_shape(&node.label, node.kind_hint(), node.shape_hint.as_deref());
            let (width, height) =
                shape.footprint(config.node_width, config.node_height, config.diamond_min_size);
            PositionedNode::new(node.clone(), shape, width, height)
        })
        .collect()
}

#[cfg(test)]
pub(crate) fn make_structure(ids: &[&str], edges: &[(&str, &str)]) -> Structure {
    let mut structure = Structure::default();
    for id in ids {
        structure.push_node(id, id);
    }
    for (from, to) in edges {
        structure.push_edge(from, to);
    }
    structure
}

#[cfg(test)]
pub(crate) fn positioned(structure: &Structure) -> Vec<PositionedNode> {
    structure
        .nodes
        .iter()
        .map(|node| {
            PositionedNode::new(node.clone(), crate::shape::ShapeKind::Rectangle, 200.0, 80.0)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{DiagramKind, Node};
    use crate::shape::ShapeKind;

    fn by_id<'a>(nodes: &'a [PositionedNode], id: &str) -> &'a PositionedNode {
        nodes.iter().find(|n| n.id() == id).unwrap()
    }

    #[test]
    fn empty_structure_lays_out_to_nothing() {
        for kind in ["flowchart", "mindmap", "network", "venn"] {
            let structure = Structure::new(DiagramKind::from_token(kind));
            assert!(compute_layout(&structure, &LayoutConfig::default()).is_empty());
        }
    }

    #[test]
    fn start_end_flowchart_stacks_vertically() {
        let mut structure = Structure::new(DiagramKind::Flowchart);
        structure.push_node("a", "Start");
        structure.push_node("b", "End");
        structure.push_edge("a", "b");
        let nodes = compute_layout(&structure, &LayoutConfig::default());
        let (a, b) = (by_id(&nodes, "a"), by_id(&nodes, "b"));
        assert_eq!(a.layer, Some(0));
        assert_eq!(b.layer, Some(1));
        assert!(b.y > a.y);
        assert_eq!(a.shape, ShapeKind::Ellipse);
    }

    #[test]
    fn nodes_come_back_in_input_order() {
        let structure = make_structure(&["z", "y", "x"], &[("x", "y"), ("y", "z")]);
        let nodes = compute_layout(&structure, &LayoutConfig::default());
        let ids: Vec<&str> = nodes.iter().map(PositionedNode::id).collect();
        assert_eq!(ids, vec!["z", "y", "x"]);
    }

    #[test]
    fn layered_rows_keep_spacing() {
        let structure = make_structure(
            &["root", "a", "b", "c", "leaf"],
            &[("root", "a"), ("root", "b"), ("root", "c"), ("a", "leaf"), ("root", "leaf")],
        );
        let config = LayoutConfig::default();
        let result = compute_layout_with_stats(&structure, &config);
        assert_eq!(result.layer_count, 3);
        assert_eq!(result.dummy_count, 1);
        let mut row: Vec<&PositionedNode> =
            result.nodes.iter().filter(|n| n.layer == Some(1)).collect();
        row.sort_by(|a, b| a.x.total_cmp(&b.x));
        for pair in row.windows(2) {
            assert!(pair[1].x >= pair[0].right() + config.node_spacing - 0.01);
        }
    }

    #[test]
    fn diamonds_are_grown_before_placement() {
        let mut structure = Structure::new(DiagramKind::Flowchart);
        structure.nodes.push(Node::new("q", "Ready?"));
        let nodes = compute_layout(&structure, &LayoutConfig::default());
        assert_eq!(nodes[0].shape, ShapeKind::Diamond);
        assert_eq!((nodes[0].width, nodes[0].height), (200.0, 120.0));
    }

    #[test]
    fn force_fallback_is_reported() {
        let mut structure = make_structure(&["a", "b", "c"], &[("a", "b")]);
        structure.kind = DiagramKind::Network;
        let mut config = LayoutConfig::default();
        config.force.enabled = false;
        let result = compute_layout_with_stats(&structure, &config);
        assert!(result.used_fallback);
        assert_eq!(result.nodes.len(), 3);
    }
}
