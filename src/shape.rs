use serde::Serialize;

/// Drawable form a node resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Rectangle,
    Ellipse,
    Diamond,
    Text,
}

// CJK keywords match as substrings; latin keywords must be whole words so
// "backend" is not read as "end".
const START_END_CJK: [&str; 2] = ["开始", "结束"];
const START_END_WORDS: [&str; 5] = ["start", "end", "begin", "finish", "stop"];
const DECISION_CJK: [&str; 3] = ["判断", "是否", "？"];
const DECISION_WORDS: [&str; 2] = ["decision", "if"];
const STORAGE_CJK: [&str; 2] = ["数据库", "存储"];
const STORAGE_WORDS: [&str; 3] = ["database", "storage", "db"];

fn mentions(label: &str, cjk: &[&str], words: &[&str]) -> bool {
    cjk.iter().any(|needle| label.contains(needle))
        || label
            .split(|c: char| !c.is_ascii_alphanumeric())
            .any(|token| words.contains(&token))
}

impl ShapeKind {
    /// Parses an explicit shape hint, accepting a few common aliases.
    pub fn from_hint(hint: &str) -> Option<Self> {
        match hint.trim().to_ascii_lowercase().as_str() {
            "rectangle" | "rect" | "box" | "square" | "process" => Some(Self::Rectangle),
            "ellipse" | "circle" | "oval" | "round" | "set" => Some(Self::Ellipse),
            "diamond" | "rhombus" | "decision" => Some(Self::Diamond),
            "text" | "label" => Some(Self::Text),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rectangle => "rectangle",
            Self::Ellipse => "ellipse",
            Self::Diamond => "diamond",
            Self::Text => "text",
        }
    }

    /// Footprint for a box of the given nominal size. Diamonds are grown to a
    /// minimum so the label fits inside the rotated square.
    pub fn footprint(self, width: f32, height: f32, diamond_min: f32) -> (f32, f32) {
        match self {
            Self::Diamond => (width.max(diamond_min), height.max(diamond_min)),
            _ => (width, height),
        }
    }
}

/// Resolves a node's shape.
///
/// An explicit, recognised `shape_hint` wins. Otherwise the semantic `kind_hint`
/// and then keywords in the label decide: start/end words give an ellipse,
/// decision words or a question mark give a diamond, storage words give an
/// ellipse. Everything else is a rectangle.
pub fn infer_shape(label: &str, kind_hint: Option<&str>, shape_hint: Option<&str>) -> ShapeKind {
    if let Some(shape) = shape_hint.and_then(ShapeKind::from_hint) {
        return shape;
    }

    if let Some(kind) = kind_hint.map(|kind| kind.trim().to_ascii_lowercase()) {
        match kind.as_str() {
            "decision" | "condition" => return ShapeKind::Diamond,
            "database" | "storage" | "start" | "end" | "terminal" => return ShapeKind::Ellipse,
            _ => {}
        }
    }

    let lowered = label.to_lowercase();
    if mentions(&lowered, &START_END_CJK, &START_END_WORDS) {
        return ShapeKind::Ellipse;
    }
    if lowered.contains('?') || mentions(&lowered, &DECISION_CJK, &DECISION_WORDS) {
        return ShapeKind::Diamond;
    }
    if mentions(&lowered, &STORAGE_CJK, &STORAGE_WORDS) {
        return ShapeKind::Ellipse;
    }
    ShapeKind::Rectangle
}
