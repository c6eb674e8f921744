//! Sugiyama-style layered layout: longest-path layering, dummy chains for long
//! edges, barycenter ordering and row-by-row coordinate assignment.

use std::collections::HashMap;

use crate::config::LayoutConfig;
use crate::ir::Structure;

use super::ranking::{assign_layers, order_layers};
use super::types::PositionedNode;

/// A position inside a layer row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Real(usize),
    /// Placeholder for edge `edge` passing through a layer.
    Dummy { edge: usize },
}

/// The ordered layer grid before coordinates are assigned.
#[derive(Debug, Clone)]
pub struct LayeredLayout {
    /// Layer of each real node, indexed like `Structure::nodes`.
    pub layer_of: Vec<usize>,
    /// Slot table; indices below `real_count` are real nodes.
    pub slots: Vec<Slot>,
    pub rows: Vec<Vec<usize>>,
    /// For every edge, the slot path from its source to its target.
    pub routes: Vec<Vec<usize>>,
    pub real_count: usize,
}

impl LayeredLayout {
    pub fn build(structure: &Structure, order_passes: usize) -> Self {
        let real_count = structure.nodes.len();
        let index: HashMap<&str, usize> = structure
            .nodes
            .iter()
            .enumerate()
            .map(|(idx, node)| (node.id.as_str(), idx))
            .collect();
        let edges: Vec<(usize, usize)> = structure
            .edges
            .iter()
            .filter_map(|edge| Some((*index.get(edge.from.as_str())?, *index.get(edge.to.as_str())?)))
            .collect();

        let layer_of = assign_layers(real_count, &edges);
        let layer_count = layer_of.iter().copied().max().map_or(0, |max| max + 1);

        let mut slots: Vec<Slot> = (0..real_count).map(Slot::Real).collect();
        let mut rows: Vec<Vec<usize>> = vec![Vec::new(); layer_count];
        for (idx, &layer) in layer_of.iter().enumerate() {
            rows[layer].push(idx);
        }

        let mut routes = Vec::with_capacity(edges.len());
        let mut segments = Vec::new();
        for (edge_idx, &(from, to)) in edges.iter().enumerate() {
            let (from_layer, to_layer) = (layer_of[from], layer_of[to]);
            if from_layer == to_layer {
                routes.push(vec![from, to]);
                continue;
            }
            // Back edges are routed from their upper end so the chain still
            // walks one layer at a time.
            let (upper, lower, reversed) = if from_layer < to_layer {
                (from, to, false)
            } else {
                (to, from, true)
            };
            let mut path = vec![upper];
            for layer in layer_of[upper] + 1..layer_of[lower] {
                let slot = slots.len();
                slots.push(Slot::Dummy { edge: edge_idx });
                rows[layer].push(slot);
                path.push(slot);
            }
            path.push(lower);
            for pair in path.windows(2) {
                segments.push((pair[0], pair[1]));
            }
            if reversed {
                path.reverse();
            }
            routes.push(path);
        }

        order_layers(&mut rows, slots.len(), &segments, order_passes);

        Self {
            layer_of,
            slots,
            rows,
            routes,
            real_count,
        }
    }

    pub fn layer_count(&self) -> usize {
        self.rows.len()
    }

    pub fn dummy_count(&self) -> usize {
        self.slots.len() - self.real_count
    }

    /// Lays every row out left to right and centres it on x = 0. Rows are
    /// top-aligned and stacked with `rank_spacing` between the tallest box of
    /// one layer and the next.
    pub fn place(&self, nodes: &mut [PositionedNode], config: &LayoutConfig) {
        let slot_width = |slot: usize| match self.slots[slot] {
            Slot::Real(idx) => nodes[idx].width,
            Slot::Dummy { .. } => config.dummy_width,
        };
        let mut xs = vec![0.0f32; self.slots.len()];
        let mut row_heights = Vec::with_capacity(self.rows.len());
        for row in &self.rows {
            let total: f32 = row.iter().map(|&slot| slot_width(slot)).sum::<f32>()
                + config.node_spacing * row.len().saturating_sub(1) as f32;
            let mut cursor = -total / 2.0;
            for &slot in row {
                xs[slot] = cursor;
                cursor += slot_width(slot) + config.node_spacing;
            }
            let height = row
                .iter()
                .filter_map(|&slot| match self.slots[slot] {
                    Slot::Real(idx) => Some(nodes[idx].height),
                    Slot::Dummy { .. } => None,
                })
                .fold(0.0f32, f32::max);
            row_heights.push(if height > 0.0 { height } else { config.node_height });
        }

        let mut row_tops = Vec::with_capacity(self.rows.len());
        let mut top = 0.0f32;
        for height in &row_heights {
            row_tops.push(top);
            top += height + config.rank_spacing;
        }

        for (idx, node) in nodes.iter_mut().enumerate().take(self.real_count) {
            let layer = self.layer_of[idx];
            node.x = xs[idx];
            node.y = row_tops[layer];
            node.layer = Some(layer);
        }
    }
}
