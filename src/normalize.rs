//! Structure normalizer: turns whatever the generator produced into a
//! well-formed [`Structure`] with unique node ids and resolvable edges.

use std::collections::HashSet;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::ir::{DiagramKind, Edge, Node, Structure};
use crate::recover;

/// Counts of the repairs made while normalizing one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NormalizeReport {
    /// The text held no parseable JSON; the result is the empty structure.
    pub unparsable: bool,
    pub synthesized_ids: usize,
    pub renamed_ids: usize,
    pub synthesized_labels: usize,
    pub dropped_nodes: usize,
    pub dropped_edges: usize,
}

impl NormalizeReport {
    pub fn is_clean(&self) -> bool {
        *self == Self::default()
    }

    fn log_summary(&self) {
        if self.is_clean() {
            return;
        }
        log::info!(
            unparsable = self.unparsable,
            synthesized_ids = self.synthesized_ids,
            renamed_ids = self.renamed_ids,
            synthesized_labels = self.synthesized_labels,
            dropped_nodes = self.dropped_nodes,
            dropped_edges = self.dropped_edges;
            "normalized structure with repairs"
        );
    }
}

/// Normalizes raw generator text. Never fails; unrecoverable text yields an
/// empty flowchart.
pub fn normalize(raw: &str) -> Structure {
    normalize_with_report(raw).0
}

pub fn normalize_with_report(raw: &str) -> (Structure, NormalizeReport) {
    match recover::recover_document(raw) {
        Some(value) => normalize_value_with_report(value),
        None => {
            log::warn!("no JSON document found in input");
            let report = NormalizeReport {
                unparsable: true,
                ..NormalizeReport::default()
            };
            report.log_summary();
            (Structure::default(), report)
        }
    }
}

/// Normalizes an already-parsed document.
pub fn normalize_value(value: Value) -> Structure {
    normalize_value_with_report(value).0
}

/// Re-checks a typed structure, e.g. one assembled by a library caller.
pub fn normalize_structure(structure: Structure) -> Structure {
    match serde_json::to_value(&structure) {
        Ok(value) => normalize_value(value),
        Err(_) => Structure::new(structure.kind),
    }
}

pub fn normalize_value_with_report(value: Value) -> (Structure, NormalizeReport) {
    let mut report = NormalizeReport::default();
    let mut document = match value {
        Value::Object(map) => map,
        Value::Array(items) => {
            let mut map = Map::new();
            map.insert("nodes".to_string(), Value::Array(items));
            map
        }
        _ => {
            log::warn!("document is neither an object nor a list");
            report.unparsable = true;
            report.log_summary();
            return (Structure::default(), report);
        }
    };

    let kind = match document.get("type") {
        Some(Value::String(token)) => DiagramKind::from_token(token),
        _ => DiagramKind::default(),
    };
    let mut structure = Structure::new(kind);

    let raw_nodes = take_sequence(&mut document, "nodes");
    let mut used: HashSet<String> = HashSet::with_capacity(raw_nodes.len());
    for (index, raw) in raw_nodes.into_iter().enumerate() {
        let Some(node) = normalize_node(index, raw, &mut used, &mut report) else {
            continue;
        };
        structure.nodes.push(node);
    }

    let raw_edges = take_sequence(&mut document, "edges");
    for (index, raw) in raw_edges.into_iter().enumerate() {
        if let Some(edge) = normalize_edge(index, raw, &used, &mut report) {
            structure.edges.push(edge);
        }
    }

    report.log_summary();
    (structure, report)
}

fn take_sequence(document: &mut Map<String, Value>, key: &str) -> Vec<Value> {
    match document.remove(key) {
        Some(Value::Array(items)) => items,
        Some(Value::Null) | None => Vec::new(),
        Some(_) => {
            log::warn!(field = key; "field is not a list, treating as empty");
            Vec::new()
        }
    }
}

fn normalize_node(
    index: usize,
    raw: Value,
    used: &mut HashSet<String>,
    report: &mut NormalizeReport,
) -> Option<Node> {
    let mut fields = match raw {
        Value::Object(map) => map,
        Value::String(text) if !text.trim().is_empty() => {
            let text = text.trim().to_string();
            let mut map = Map::new();
            map.insert("id".to_string(), Value::String(text.clone()));
            map.insert("label".to_string(), Value::String(text));
            map
        }
        other => {
            log::warn!(index = index, value:% = other; "dropping node that is not an object");
            report.dropped_nodes += 1;
            return None;
        }
    };

    let declared = match fields.remove("id") {
        Some(Value::String(id)) if !id.trim().is_empty() => Some(id.trim().to_string()),
        _ => None,
    };
    let base = match declared {
        Some(id) => id,
        None => {
            let id = format!("node_{index}");
            log::warn!(index = index, id = id.as_str(); "synthesized missing node id");
            report.synthesized_ids += 1;
            id
        }
    };
    let id = unique_id(&base, used);
    if id != base {
        log::warn!(original = base.as_str(), renamed = id.as_str(); "renamed duplicate node id");
        report.renamed_ids += 1;
    }
    used.insert(id.clone());

    let label = match fields.remove("label").as_ref().and_then(scalar_text) {
        Some(label) => label,
        None => match fields.get("content").and_then(scalar_text) {
            Some(content) => content,
            None => {
                report.synthesized_labels += 1;
                format!("Node {}", index + 1)
            }
        },
    };

    let shape_hint = match fields.remove("shape") {
        Some(Value::String(shape)) if !shape.trim().is_empty() => Some(shape.trim().to_string()),
        _ => None,
    };

    Some(Node {
        id,
        label,
        shape_hint,
        props: fields,
    })
}

fn normalize_edge(
    index: usize,
    raw: Value,
    known: &HashSet<String>,
    report: &mut NormalizeReport,
) -> Option<Edge> {
    let Value::Object(mut fields) = raw else {
        log::warn!(index = index; "dropping edge that is not an object");
        report.dropped_edges += 1;
        return None;
    };

    let endpoint = |value: Option<Value>| match value {
        Some(Value::String(id)) => Some(id.trim().to_string()),
        _ => None,
    };
    let from = endpoint(fields.remove("from"));
    let to = endpoint(fields.remove("to"));
    let (Some(from), Some(to)) = (from, to) else {
        log::warn!(index = index; "dropping edge without string endpoints");
        report.dropped_edges += 1;
        return None;
    };
    if !known.contains(&from) || !known.contains(&to) {
        log::warn!(
            index = index,
            from = from.as_str(),
            to = to.as_str();
            "dropping edge that references an unknown node"
        );
        report.dropped_edges += 1;
        return None;
    }

    let label = match fields.remove("label") {
        Some(value) => match scalar_text(&value) {
            Some(label) => Some(label),
            None if value.is_null() => None,
            None => {
                fields.insert("label".to_string(), value);
                None
            }
        },
        None => None,
    };

    Some(Edge {
        from,
        to,
        label,
        props: fields,
    })
}

/// First of `base`, `base_1`, `base_2`, ... not yet taken.
fn unique_id(base: &str, used: &HashSet<String>) -> String {
    if !used.contains(base) {
        return base.to_string();
    }
    (1..)
        .map(|suffix| format!("{base}_{suffix}"))
        .find(|candidate| !used.contains(candidate))
        .unwrap_or_else(|| base.to_string())
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}
