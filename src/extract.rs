//! Rebuilds a coordinate-free [`Structure`] from an existing element list, so
//! a drawing can be edited at the graph level and laid out again.

use std::collections::{HashMap, HashSet};
use std::fmt::Write as _;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::ir::{DiagramKind, Edge, Node, Structure};

static NON_WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w]+").unwrap());

const MAX_ID_CHARS: usize = 30;
const SUMMARY_EDGE_LIMIT: usize = 10;

/// Shapes and free text with a label become nodes; arrows and lines bound to
/// two such nodes become edges. Returns `None` when no labelled node exists.
pub fn extract_structure(elements: &[Value]) -> Option<Structure> {
    let mut structure = Structure::new(DiagramKind::Flowchart);
    let mut by_element: HashMap<&str, String> = HashMap::new();
    let mut used: HashSet<String> = HashSet::new();

    for element in elements {
        let kind = element.get("type").and_then(Value::as_str).unwrap_or_default();
        if !matches!(kind, "rectangle" | "ellipse" | "diamond" | "text") {
            continue;
        }
        let Some(element_id) = element.get("id").and_then(Value::as_str) else {
            continue;
        };
        let label = if kind == "text" {
            element.get("text").and_then(Value::as_str)
        } else {
            label_text(element)
        };
        let Some(label) = label.map(str::trim).filter(|label| !label.is_empty()) else {
            continue;
        };

        let base = logical_id(label, structure.nodes.len());
        let mut id = base.clone();
        let mut suffix = 1;
        while used.contains(&id) {
            id = format!("{base}_{suffix}");
            suffix += 1;
        }
        used.insert(id.clone());
        by_element.insert(element_id, id.clone());
        structure.nodes.push(Node::new(id, label).with_shape(kind));
    }

    if structure.nodes.is_empty() {
        return None;
    }

    for element in elements {
        let kind = element.get("type").and_then(Value::as_str).unwrap_or_default();
        if !matches!(kind, "arrow" | "line") {
            continue;
        }
        let endpoint = |end: &str| {
            let id = element.get(end)?.get("id")?.as_str()?;
            by_element.get(id).cloned()
        };
        let (Some(from), Some(to)) = (endpoint("start"), endpoint("end")) else {
            continue;
        };
        let mut edge = Edge::new(from, to);
        if let Some(label) = label_text(element).map(str::trim).filter(|l| !l.is_empty()) {
            edge.label = Some(label.to_string());
        }
        if kind == "line" {
            edge.props.insert("directed".to_string(), Value::Bool(false));
        }
        structure.edges.push(edge);
    }

    log::debug!(
        nodes = structure.nodes.len(),
        edges = structure.edges.len();
        "extracted structure from elements"
    );
    Some(structure)
}

/// Parses `code` as an element array first.
pub fn extract_structure_json(code: &str) -> Option<Structure> {
    match serde_json::from_str::<Value>(code) {
        Ok(Value::Array(elements)) => extract_structure(&elements),
        _ => None,
    }
}

fn label_text(element: &Value) -> Option<&str> {
    match element.get("label")? {
        Value::String(text) => Some(text),
        Value::Object(label) => label.get("text")?.as_str(),
        _ => None,
    }
}

/// Lower-cased label with runs of non-word characters collapsed to `_`,
/// capped at thirty characters.
fn logical_id(label: &str, index: usize) -> String {
    let cleaned = NON_WORD_RE.replace_all(label, "_");
    let cleaned = cleaned.trim_matches('_');
    if cleaned.is_empty() {
        return format!("node_{index}");
    }
    cleaned.chars().take(MAX_ID_CHARS).collect::<String>().to_lowercase()
}

/// Short plain-text description of a structure, listing nodes and the first
/// few edges by label.
pub fn summarize(structure: &Structure) -> String {
    if structure.nodes.is_empty() {
        return "empty diagram".to_string();
    }
    let mut out = format!(
        "diagram with {} nodes and {} edges\nnodes:\n",
        structure.nodes.len(),
        structure.edges.len()
    );
    for (idx, node) in structure.nodes.iter().enumerate() {
        let shape = node.shape_hint.as_deref().unwrap_or("rectangle");
        let _ = writeln!(out, "  {}. [{shape}] {}", idx + 1, node.label);
    }
    if !structure.edges.is_empty() {
        out.push_str("edges:\n");
        let label_of = |id: &str| {
            structure
                .node(id)
                .map(|node| node.label.clone())
                .unwrap_or_else(|| id.to_string())
        };
        for edge in structure.edges.iter().take(SUMMARY_EDGE_LIMIT) {
            let _ = writeln!(out, "  - {} -> {}", label_of(&edge.from), label_of(&edge.to));
        }
        if structure.edges.len() > SUMMARY_EDGE_LIMIT {
            let _ = writeln!(out, "  ... {} more", structure.edges.len() - SUMMARY_EDGE_LIMIT);
        }
    }
    out
}
