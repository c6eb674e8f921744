//! Maps positioned nodes and edges onto themed drawing elements.

use std::collections::HashMap;

use crate::config::BuildConfig;
use crate::element::{
    Binding, ConnectorElement, ConnectorLabel, Element, Roundness, ShapeElement, ShapeLabel,
    TextElement,
};
use crate::ir::{DiagramKind, Edge, LayoutStrategy, Structure};
use crate::layout::{NodeRole, PositionedNode};
use crate::shape::ShapeKind;
use crate::theme::{Theme, VENN_SET_FILLS};

const VENN_SET_STROKE_WIDTH: f32 = 3.0;
const CONNECTOR_ROUNDNESS: u8 = 2;

/// Hands out `prefix-0001`, `prefix-0002`, ... per prefix.
#[derive(Debug, Default)]
struct IdGen {
    counters: HashMap<&'static str, usize>,
}

impl IdGen {
    fn next(&mut self, prefix: &'static str) -> String {
        let counter = self.counters.entry(prefix).or_insert(0);
        *counter += 1;
        format!("{prefix}-{counter:04}")
    }
}

pub fn build(
    structure: &Structure,
    nodes: &[PositionedNode],
    edges: &[Edge],
    theme: &Theme,
    config: &BuildConfig,
) -> Vec<Element> {
    let mut ids = IdGen::default();
    let mut elements = Vec::with_capacity(nodes.len() + edges.len());
    let mut bound: HashMap<&str, (String, &PositionedNode)> = HashMap::with_capacity(nodes.len());

    for node in nodes {
        let element = node_element(node, &mut ids, theme, config);
        bound
            .entry(node.id())
            .or_insert_with(|| (element.id().to_string(), node));
        elements.push(element);
    }

    if structure.kind.strategy() == LayoutStrategy::Venn {
        if !edges.is_empty() {
            log::debug!(edges = edges.len(); "venn diagram, skipping connectors");
        }
        return elements;
    }

    for edge in edges {
        let (Some((from_id, from)), Some((to_id, to))) =
            (bound.get(edge.from.as_str()), bound.get(edge.to.as_str()))
        else {
            continue;
        };
        elements.push(connector_element(
            &structure.kind,
            edge,
            (from_id.as_str(), *from),
            (to_id.as_str(), *to),
            &mut ids,
            theme,
            config,
        ));
    }

    log::debug!(elements = elements.len(); "built diagram elements");
    elements
}

fn node_element(
    node: &PositionedNode,
    ids: &mut IdGen,
    theme: &Theme,
    config: &BuildConfig,
) -> Element {
    let id = ids.next("node");
    if node.shape == ShapeKind::Text {
        return Element::Text(TextElement {
            id,
            x: node.x,
            y: node.y,
            width: node.width.max(1.0),
            height: node.height.max(1.0),
            text: node.node.label.clone(),
            font_size: config.text_font_size,
            stroke_color: theme.text_color.clone(),
        });
    }

    let (width, height) = node
        .shape
        .footprint(node.width, node.height, config.diamond_min_size);
    let mut shape = ShapeElement {
        id,
        x: node.x,
        y: node.y,
        width: width.max(1.0),
        height: height.max(1.0),
        background_color: theme.shape_color(node.shape).to_string(),
        stroke_color: theme.primary_color.clone(),
        stroke_width: theme.line_width,
        fill_style: "hachure".to_string(),
        roundness: None,
        label: Some(ShapeLabel {
            text: node.node.label.clone(),
            font_size: config.label_font_size,
            stroke_color: theme.text_color.clone(),
            text_align: "center".to_string(),
            vertical_align: "middle".to_string(),
        }),
    };
    if node.role == NodeRole::VennSet {
        shape.background_color = venn_fill(node.id()).to_string();
        shape.fill_style = "solid".to_string();
        shape.stroke_width = VENN_SET_STROKE_WIDTH;
    }

    match node.shape {
        ShapeKind::Ellipse => Element::Ellipse(shape),
        ShapeKind::Diamond => Element::Diamond(shape),
        ShapeKind::Rectangle | ShapeKind::Text => {
            shape.roundness = theme.rectangle_roundness().map(|kind| Roundness { kind });
            Element::Rectangle(shape)
        }
    }
}

/// Picks one of the translucent set fills from the node id.
fn venn_fill(id: &str) -> &'static str {
    let hash = id
        .bytes()
        .fold(0usize, |acc, byte| acc.wrapping_mul(31).wrapping_add(byte as usize));
    VENN_SET_FILLS[hash % VENN_SET_FILLS.len()]
}

fn connector_element(
    kind: &DiagramKind,
    edge: &Edge,
    (from_id, from): (&str, &PositionedNode),
    (to_id, to): (&str, &PositionedNode),
    ids: &mut IdGen,
    theme: &Theme,
    config: &BuildConfig,
) -> Element {
    let (start, end) = if edge.is_self_loop() {
        ((from.right(), from.center().1), (from.center().0, from.y))
    } else {
        (boundary_point(from, to.center()), boundary_point(to, from.center()))
    };
    let (dx, dy) = (end.0 - start.0, end.1 - start.1);
    let undirected = *kind == DiagramKind::Mindmap || !edge.directed();

    let connector = ConnectorElement {
        id: ids.next(if undirected { "line" } else { "arrow" }),
        x: start.0,
        y: start.1,
        width: nudge_span(dx),
        height: nudge_span(dy),
        stroke_color: theme.line_color.clone(),
        stroke_width: theme.line_width,
        stroke_style: "solid".to_string(),
        roundness: Some(Roundness {
            kind: CONNECTOR_ROUNDNESS,
        }),
        points: vec![[0.0, 0.0], [dx, dy]],
        start: Binding {
            id: from_id.to_string(),
        },
        end: Binding {
            id: to_id.to_string(),
        },
        end_arrowhead: (!undirected).then(|| "arrow".to_string()),
        label: edge
            .label
            .as_deref()
            .filter(|text| !text.is_empty())
            .map(|text| ConnectorLabel {
                text: text.to_string(),
                font_size: config.edge_label_font_size,
                stroke_color: theme.line_color.clone(),
            }),
    };
    if undirected {
        Element::Line(connector)
    } else {
        Element::Arrow(connector)
    }
}

/// Zero spans break downstream geometry; keep at least one unit.
pub(crate) fn nudge_span(span: f32) -> f32 {
    if span.abs() < 1.0 && span >= 0.0 {
        1.0
    } else if span.abs() < 1.0 {
        -1.0
    } else {
        span
    }
}

/// Where the ray from the node's centre toward `target` leaves its bounding box.
pub fn boundary_point(node: &PositionedNode, target: (f32, f32)) -> (f32, f32) {
    let (cx, cy) = node.center();
    let (dx, dy) = (target.0 - cx, target.1 - cy);
    if dx == 0.0 && dy == 0.0 {
        return (cx, cy);
    }
    let half_w = node.width / 2.0;
    let half_h = node.height / 2.0;
    let scale_x = if dx != 0.0 { half_w / dx.abs() } else { f32::INFINITY };
    let scale_y = if dy != 0.0 { half_h / dy.abs() } else { f32::INFINITY };
    let scale = scale_x.min(scale_y);
    (cx + dx * scale, cy + dy * scale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Node;

    fn placed(id: &str, label: &str, shape: ShapeKind, x: f32, y: f32) -> PositionedNode {
        let mut node = PositionedNode::new(Node::new(id, label), shape, 200.0, 80.0);
        node.x = x;
        node.y = y;
        node
    }

    fn flowchart(nodes: &[&PositionedNode], edges: &[(&str, &str)]) -> Structure {
        let mut structure = Structure::new(DiagramKind::Flowchart);
        structure.nodes = nodes.iter().map(|n| n.node.clone()).collect();
        structure.edges = edges.iter().map(|(f, t)| Edge::new(*f, *t)).collect();
        structure
    }

    #[test]
    fn connectors_bind_to_emitted_element_ids() {
        let a = placed("a", "Start", ShapeKind::Ellipse, 0.0, 0.0);
        let b = placed("b", "End", ShapeKind::Ellipse, 0.0, 200.0);
        let structure = flowchart(&[&a, &b], &[("a", "b"), ("a", "ghost")]);
        let elements = build(
            &structure,
            &[a, b],
            &structure.edges,
            &Theme::default(),
            &BuildConfig::default(),
        );
        assert_eq!(elements.len(), 3);
        let arrow = elements[2].connector().unwrap();
        assert_eq!(arrow.start.id, elements[0].id());
        assert_eq!(arrow.end.id, elements[1].id());
        assert_eq!(elements[2].type_name(), "arrow");
        // bottom-centre of a to top-centre of b
        assert_eq!((arrow.x, arrow.y), (100.0, 80.0));
        assert_eq!(arrow.height, 120.0);
        assert_eq!(arrow.width, 1.0);
    }

    #[test]
    fn venn_structures_get_no_connectors() {
        let mut s1 = placed("s1", "Set", ShapeKind::Ellipse, 0.0, 0.0);
        s1.role = NodeRole::VennSet;
        let e1 = placed("e1", "Item", ShapeKind::Rectangle, 0.0, 400.0);
        let mut structure = flowchart(&[&s1, &e1], &[("e1", "s1")]);
        structure.kind = DiagramKind::Venn;
        let elements = build(
            &structure,
            &[s1, e1],
            &structure.edges,
            &Theme::default(),
            &BuildConfig::default(),
        );
        assert_eq!(elements.len(), 2);
        assert!(elements.iter().all(|e| !e.is_connector()));
        let Element::Ellipse(set) = &elements[0] else {
            panic!("set should be an ellipse");
        };
        assert_eq!(set.fill_style, "solid");
        assert!(VENN_SET_FILLS.contains(&set.background_color.as_str()));
    }

    #[test]
    fn diamonds_keep_minimum_footprint() {
        let mut q = placed("q", "ok?", ShapeKind::Diamond, 0.0, 0.0);
        q.height = 40.0;
        let structure = flowchart(&[&q], &[]);
        let elements = build(&structure, &[q], &[], &Theme::default(), &BuildConfig::default());
        let Element::Diamond(diamond) = &elements[0] else {
            panic!("expected a diamond");
        };
        assert_eq!((diamond.width, diamond.height), (200.0, 120.0));
    }

    #[test]
    fn text_nodes_and_rounded_rectangles() {
        let note = placed("n", "just a note", ShapeKind::Text, 0.0, 0.0);
        let step = placed("s", "Step", ShapeKind::Rectangle, 300.0, 0.0);
        let structure = flowchart(&[&note, &step], &[]);
        let elements = build(
            &structure,
            &[note, step],
            &[],
            &Theme::business(),
            &BuildConfig::default(),
        );
        let Element::Text(text) = &elements[0] else {
            panic!("expected text");
        };
        assert_eq!(text.font_size, 20.0);
        assert_eq!((text.width, text.height), (200.0, 80.0));
        let Element::Rectangle(rect) = &elements[1] else {
            panic!("expected rectangle");
        };
        assert_eq!(rect.roundness, Some(Roundness { kind: 3 }));
        assert_eq!(rect.background_color, "#4A90E2");
    }

    #[test]
    fn mindmap_and_undirected_edges_become_lines() {
        let a = placed("a", "Root", ShapeKind::Rectangle, 0.0, 0.0);
        let b = placed("b", "Leaf", ShapeKind::Rectangle, 400.0, 0.0);
        let mut structure = flowchart(&[&a, &b], &[("a", "b")]);
        structure.kind = DiagramKind::Mindmap;
        let elements = build(
            &structure,
            &[a, b],
            &structure.edges,
            &Theme::default(),
            &BuildConfig::default(),
        );
        let Element::Line(line) = &elements[2] else {
            panic!("expected a line");
        };
        assert!(line.end_arrowhead.is_none());
        assert_eq!((line.x, line.y), (200.0, 40.0));
        assert_eq!(line.width, 200.0);
    }

    #[test]
    fn boundary_point_hits_the_box_edge() {
        let node = placed("n", "n", ShapeKind::Rectangle, 0.0, 0.0);
        assert_eq!(boundary_point(&node, (1000.0, 40.0)), (200.0, 40.0));
        assert_eq!(boundary_point(&node, (100.0, -500.0)), (100.0, 0.0));
        let corner = boundary_point(&node, (300.0, 120.0));
        assert!((corner.0 - 200.0).abs() < 0.01 && (corner.1 - 80.0).abs() < 0.01);
    }
}
