//! Connector optimizer: re-docks every bound connector on an edge midpoint of
//! the elements it joins, working on final JSON element geometry.

use std::collections::HashMap;

use serde_json::{Value, json};

use crate::builder::nudge_span;
use crate::recover::coerce_text_field;

/// Size assumed for an element that does not state its own.
const DEFAULT_EXTENT: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Rect {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

impl Rect {
    fn of(element: &Value) -> Option<Self> {
        let number = |key: &str| element.get(key).and_then(Value::as_f64);
        Some(Self {
            x: number("x")?,
            y: number("y")?,
            width: number("width").unwrap_or(DEFAULT_EXTENT),
            height: number("height").unwrap_or(DEFAULT_EXTENT),
        })
    }

    fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    fn dock(&self, side: Side) -> (f64, f64) {
        let (cx, cy) = self.center();
        match side {
            Side::Left => (self.x, cy),
            Side::Right => (self.x + self.width, cy),
            Side::Top => (cx, self.y),
            Side::Bottom => (cx, self.y + self.height),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Right,
    Top,
    Bottom,
}

/// Chooses the start and end sides for a connector between two boxes.
///
/// The dominant axis of the centre offset decides: purely horizontal or
/// vertical offsets pick their own axis, otherwise `|dx| > |dy|` picks the
/// horizontal one. Coincident centres dock right-to-left.
fn dock_sides(start: &Rect, end: &Rect) -> (Side, Side) {
    let (sx, sy) = start.center();
    let (ex, ey) = end.center();
    let (dx, dy) = (ex - sx, ey - sy);
    if dx == 0.0 && dy == 0.0 {
        return (Side::Right, Side::Left);
    }
    let horizontal = dy == 0.0 || (dx != 0.0 && dx.abs() > dy.abs());
    if horizontal {
        if dx > 0.0 {
            (Side::Right, Side::Left)
        } else {
            (Side::Left, Side::Right)
        }
    } else if dy > 0.0 {
        (Side::Bottom, Side::Top)
    } else {
        (Side::Top, Side::Bottom)
    }
}

fn bound_id(connector: &Value, end: &str) -> Option<String> {
    connector
        .get(end)?
        .get("id")?
        .as_str()
        .map(str::to_string)
}

/// Re-docks connectors and cleans text elements. Elements that are not
/// connectors or text pass through untouched, in order.
pub fn optimize(elements: Vec<Value>) -> Vec<Value> {
    let rects: HashMap<String, Rect> = elements
        .iter()
        .filter(|element| !is_connector(element))
        .filter_map(|element| {
            let id = element.get("id")?.as_str()?.to_string();
            Some((id, Rect::of(element)?))
        })
        .collect();

    let mut redocked = 0usize;
    let mut dropped = 0usize;
    let mut out = Vec::with_capacity(elements.len());
    for mut element in elements {
        match element.get("type").and_then(Value::as_str) {
            Some("text") => {
                if !coerce_text_field(&mut element) {
                    dropped += 1;
                    continue;
                }
            }
            Some("arrow") | Some("line") => {
                if redock(&mut element, &rects) {
                    redocked += 1;
                }
            }
            _ => {}
        }
        out.push(element);
    }
    log::debug!(redocked = redocked, dropped_text = dropped; "optimized connectors");
    out
}

fn is_connector(element: &Value) -> bool {
    matches!(
        element.get("type").and_then(Value::as_str),
        Some("arrow") | Some("line")
    )
}

fn redock(connector: &mut Value, rects: &HashMap<String, Rect>) -> bool {
    let start_id = bound_id(connector, "start");
    let end_id = bound_id(connector, "end");
    let self_loop = start_id.is_some() && start_id == end_id;
    let start = start_id.and_then(|id| rects.get(&id).copied());
    let end = end_id.and_then(|id| rects.get(&id).copied());
    let Some(object) = connector.as_object_mut() else {
        return false;
    };

    let (Some(start), Some(end)) = (start, end) else {
        if let Some(width) = object.get("width").and_then(Value::as_f64) {
            if width == 0.0 {
                object.insert("width".to_string(), json!(1.0));
            }
        }
        return false;
    };

    // A loop leaves the right midpoint and re-enters at the top midpoint.
    let (start_side, end_side) = if self_loop {
        (Side::Right, Side::Top)
    } else {
        dock_sides(&start, &end)
    };
    let (sx, sy) = start.dock(start_side);
    let (ex, ey) = end.dock(end_side);
    let (dx, dy) = (ex - sx, ey - sy);
    object.insert("x".to_string(), json!(sx));
    object.insert("y".to_string(), json!(sy));
    object.insert("width".to_string(), json!(nudge_span(dx as f32)));
    object.insert("height".to_string(), json!(nudge_span(dy as f32)));
    if object.contains_key("points") {
        object.insert("points".to_string(), json!([[0.0, 0.0], [dx, dy]]));
    }
    true
}

/// Text-level entry: returns the input unchanged when it is not a JSON array.
pub fn optimize_json(code: &str) -> String {
    match serde_json::from_str::<Value>(code) {
        Ok(Value::Array(elements)) => {
            let optimized = optimize(elements);
            serde_json::to_string_pretty(&optimized).unwrap_or_else(|_| code.to_string())
        }
        _ => code.to_string(),
    }
}
