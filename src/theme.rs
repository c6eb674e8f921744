use serde::{Deserialize, Serialize};

use crate::shape::ShapeKind;

pub const THEME_NAMES: [&str; 7] = [
    "default",
    "business",
    "vibrant",
    "dark",
    "flat",
    "handdrawn",
    "industrial",
];

/// Translucent fills cycled through for Venn set circles.
pub const VENN_SET_FILLS: [&str; 4] = ["#ff000020", "#00ff0020", "#0000ff20", "#ffff0020"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    pub name: String,
    pub primary_color: String,
    pub secondary_color: String,
    pub accent_color: String,
    pub background: String,
    pub text_color: String,
    pub line_color: String,
    pub line_width: f32,
    pub corner_radius: f32,
}

impl Default for Theme {
    fn default() -> Self {
        Self::standard()
    }
}

impl Theme {
    pub fn standard() -> Self {
        Self {
            name: "default".to_string(),
            primary_color: "#1976d2".to_string(),
            secondary_color: "#34a853".to_string(),
            accent_color: "#fb8c00".to_string(),
            background: "#FFFFFF".to_string(),
            text_color: "#202124".to_string(),
            line_color: "#1976d2".to_string(),
            line_width: 2.0,
            corner_radius: 8.0,
        }
    }

    pub fn business() -> Self {
        Self {
            name: "business".to_string(),
            primary_color: "#4A90E2".to_string(),
            secondary_color: "#7B8A95".to_string(),
            accent_color: "#50C878".to_string(),
            background: "#FFFFFF".to_string(),
            text_color: "#2C3E50".to_string(),
            line_color: "#4A90E2".to_string(),
            line_width: 2.0,
            corner_radius: 8.0,
        }
    }

    pub fn vibrant() -> Self {
        Self {
            name: "vibrant".to_string(),
            primary_color: "#FF6B6B".to_string(),
            secondary_color: "#4ECDC4".to_string(),
            accent_color: "#FFE66D".to_string(),
            background: "#FFFFFF".to_string(),
            text_color: "#2C3E50".to_string(),
            line_color: "#4ECDC4".to_string(),
            line_width: 2.0,
            corner_radius: 10.0,
        }
    }

    pub fn dark() -> Self {
        Self {
            name: "dark".to_string(),
            primary_color: "#6C5CE7".to_string(),
            secondary_color: "#A29BFE".to_string(),
            accent_color: "#00B894".to_string(),
            background: "#2D3436".to_string(),
            text_color: "#FFFFFF".to_string(),
            line_color: "#6C5CE7".to_string(),
            line_width: 2.0,
            corner_radius: 8.0,
        }
    }

    pub fn flat() -> Self {
        Self {
            name: "flat".to_string(),
            primary_color: "#3498DB".to_string(),
            secondary_color: "#E74C3C".to_string(),
            accent_color: "#F39C12".to_string(),
            background: "#FFFFFF".to_string(),
            text_color: "#34495E".to_string(),
            line_color: "#95A5A6".to_string(),
            line_width: 2.0,
            corner_radius: 0.0,
        }
    }

    pub fn handdrawn() -> Self {
        Self {
            name: "handdrawn".to_string(),
            primary_color: "#2C3E50".to_string(),
            secondary_color: "#34495E".to_string(),
            accent_color: "#E67E22".to_string(),
            background: "#FDF6E3".to_string(),
            text_color: "#2C3E50".to_string(),
            line_color: "#2C3E50".to_string(),
            line_width: 3.0,
            corner_radius: 5.0,
        }
    }

    pub fn industrial() -> Self {
        Self {
            name: "industrial".to_string(),
            primary_color: "#000000".to_string(),
            secondary_color: "#FFD700".to_string(),
            accent_color: "#FF6B35".to_string(),
            background: "#FFFFFF".to_string(),
            text_color: "#000000".to_string(),
            line_color: "#000000".to_string(),
            line_width: 3.0,
            corner_radius: 0.0,
        }
    }

    pub fn by_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "default" | "base" => Some(Self::standard()),
            "business" => Some(Self::business()),
            "vibrant" => Some(Self::vibrant()),
            "dark" => Some(Self::dark()),
            "flat" => Some(Self::flat()),
            "handdrawn" | "hand-drawn" | "sketch" => Some(Self::handdrawn()),
            "industrial" => Some(Self::industrial()),
            _ => None,
        }
    }

    /// Fill color for a shape: rectangles take the primary color, ellipses the
    /// secondary, diamonds the accent and free text the text color.
    pub fn shape_color(&self, shape: ShapeKind) -> &str {
        match shape {
            ShapeKind::Rectangle => &self.primary_color,
            ShapeKind::Ellipse => &self.secondary_color,
            ShapeKind::Diamond => &self.accent_color,
            ShapeKind::Text => &self.text_color,
        }
    }

    /// Roundness level for rectangles, if the theme rounds corners at all.
    pub fn rectangle_roundness(&self) -> Option<u8> {
        if self.corner_radius <= 0.0 {
            return None;
        }
        Some(((self.corner_radius / 2.0).floor() as u8).clamp(1, 3))
    }
}
