//! Drawing elements in the flat whiteboard wire shape.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Element {
    Rectangle(ShapeElement),
    Ellipse(ShapeElement),
    Diamond(ShapeElement),
    Text(TextElement),
    Line(ConnectorElement),
    Arrow(ConnectorElement),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeElement {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub background_color: String,
    pub stroke_color: String,
    pub stroke_width: f32,
    pub fill_style: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roundness: Option<Roundness>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<ShapeLabel>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeLabel {
    pub text: String,
    pub font_size: f32,
    pub stroke_color: String,
    pub text_align: String,
    pub vertical_align: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roundness {
    #[serde(rename = "type")]
    pub kind: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextElement {
    pub id: String,
    pub x: f32,
    pub y: f32,
    /// Footprint the text was laid out in; connectors dock on it.
    #[serde(default)]
    pub width: f32,
    #[serde(default)]
    pub height: f32,
    pub text: String,
    pub font_size: f32,
    pub stroke_color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectorElement {
    pub id: String,
    pub x: f32,
    pub y: f32,
    /// Signed horizontal span from start to end.
    pub width: f32,
    /// Signed vertical span from start to end.
    pub height: f32,
    pub stroke_color: String,
    pub stroke_width: f32,
    pub stroke_style: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roundness: Option<Roundness>,
    /// Poly-line relative to (`x`, `y`).
    #[serde(default)]
    pub points: Vec<[f32; 2]>,
    pub start: Binding,
    pub end: Binding,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_arrowhead: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<ConnectorLabel>,
}

/// Connector endpoint attached to an element by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectorLabel {
    pub text: String,
    pub font_size: f32,
    pub stroke_color: String,
}

impl Element {
    pub fn id(&self) -> &str {
        match self {
            Self::Rectangle(shape) | Self::Ellipse(shape) | Self::Diamond(shape) => &shape.id,
            Self::Text(text) => &text.id,
            Self::Line(connector) | Self::Arrow(connector) => &connector.id,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Rectangle(_) => "rectangle",
            Self::Ellipse(_) => "ellipse",
            Self::Diamond(_) => "diamond",
            Self::Text(_) => "text",
            Self::Line(_) => "line",
            Self::Arrow(_) => "arrow",
        }
    }

    pub fn is_connector(&self) -> bool {
        matches!(self, Self::Line(_) | Self::Arrow(_))
    }

    pub fn connector(&self) -> Option<&ConnectorElement> {
        match self {
            Self::Line(connector) | Self::Arrow(connector) => Some(connector),
            _ => None,
        }
    }
}

/// Converts typed elements into the JSON objects later stages operate on.
pub fn elements_to_values(elements: &[Element]) -> Vec<Value> {
    elements
        .iter()
        .filter_map(|element| serde_json::to_value(element).ok())
        .collect()
}
