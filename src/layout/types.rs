use serde::Serialize;

use crate::ir::{LayoutStrategy, Node};
use crate::shape::ShapeKind;

/// How the layout treats a node, beyond its geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeRole {
    #[default]
    Regular,
    /// A set container in a Venn layout. Sets overlap on purpose.
    VennSet,
    VennElement,
}

/// A node with its resolved shape and a top-left anchored box.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionedNode {
    #[serde(flatten)]
    pub node: Node,
    #[serde(rename = "shapeKind")]
    pub shape: ShapeKind,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layer: Option<usize>,
    pub role: NodeRole,
}

impl PositionedNode {
    pub fn new(node: Node, shape: ShapeKind, width: f32, height: f32) -> Self {
        Self {
            node,
            shape,
            x: 0.0,
            y: 0.0,
            width,
            height,
            layer: None,
            role: NodeRole::Regular,
        }
    }

    pub fn id(&self) -> &str {
        &self.node.id
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn set_center(&mut self, cx: f32, cy: f32) {
        self.x = cx - self.width / 2.0;
        self.y = cy - self.height / 2.0;
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

/// Result of one layout run plus the bookkeeping a debug dump wants.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutResult {
    pub strategy: LayoutStrategy,
    pub nodes: Vec<PositionedNode>,
    pub layer_count: usize,
    pub dummy_count: usize,
    /// Set when the force-directed solver was skipped or diverged.
    pub used_fallback: bool,
}

impl LayoutResult {
    pub fn empty(strategy: LayoutStrategy) -> Self {
        Self {
            strategy,
            nodes: Vec::new(),
            layer_count: 0,
            dummy_count: 0,
            used_fallback: false,
        }
    }
}
