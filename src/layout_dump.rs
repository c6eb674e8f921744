use crate::ir::Edge;
use crate::layout::{LayoutResult, NodeRole, PositionedNode};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub strategy: String,
    pub layer_count: usize,
    pub dummy_count: usize,
    pub used_fallback: bool,
    pub width: f32,
    pub height: f32,
    pub nodes: Vec<NodeDump>,
    pub edges: Vec<EdgeDump>,
}

#[derive(Debug, Serialize)]
pub struct NodeDump {
    pub id: String,
    pub shape: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub layer: Option<usize>,
    pub role: NodeRole,
}

#[derive(Debug, Serialize)]
pub struct EdgeDump {
    pub from: String,
    pub to: String,
    pub directed: bool,
    pub label: Option<String>,
}

impl LayoutDump {
    /// Dumps `nodes` (usually the post-processed ones) alongside the layout
    /// run's bookkeeping.
    pub fn from_layout(layout: &LayoutResult, nodes: &[PositionedNode], edges: &[Edge]) -> Self {
        let (mut min_x, mut min_y) = (f32::INFINITY, f32::INFINITY);
        let (mut max_x, mut max_y) = (f32::NEG_INFINITY, f32::NEG_INFINITY);
        for node in nodes {
            min_x = min_x.min(node.x);
            min_y = min_y.min(node.y);
            max_x = max_x.max(node.right());
            max_y = max_y.max(node.bottom());
        }
        let (width, height) = if nodes.is_empty() {
            (0.0, 0.0)
        } else {
            (max_x - min_x, max_y - min_y)
        };

        let nodes = nodes
            .iter()
            .map(|node| NodeDump {
                id: node.id().to_string(),
                shape: node.shape.as_str().to_string(),
                x: node.x,
                y: node.y,
                width: node.width,
                height: node.height,
                layer: node.layer,
                role: node.role,
            })
            .collect();

        let edges = edges
            .iter()
            .map(|edge| EdgeDump {
                from: edge.from.clone(),
                to: edge.to.clone(),
                directed: edge.directed(),
                label: edge.label.clone(),
            })
            .collect();

        LayoutDump {
            strategy: format!("{:?}", layout.strategy),
            layer_count: layout.layer_count,
            dummy_count: layout.dummy_count,
            used_fallback: layout.used_fallback,
            width,
            height,
            nodes,
            edges,
        }
    }
}

pub fn write_layout_dump(
    path: &Path,
    layout: &LayoutResult,
    nodes: &[PositionedNode],
    edges: &[Edge],
) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_layout(layout, nodes, edges);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}
