use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Open key/value bag carried through the pipeline untouched.
pub type Props = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DiagramKind {
    #[default]
    Flowchart,
    Tree,
    OrgChart,
    Mindmap,
    Network,
    Architecture,
    Dataflow,
    Venn,
    Other(String),
}

/// Which placement algorithm a diagram kind is laid out with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutStrategy {
    Layered,
    Radial,
    ForceDirected,
    Venn,
}

impl DiagramKind {
    pub fn from_token(token: &str) -> Self {
        match token.trim().to_ascii_lowercase().as_str() {
            "" | "flowchart" | "flow" => Self::Flowchart,
            "tree" => Self::Tree,
            "orgchart" | "org" => Self::OrgChart,
            "mindmap" => Self::Mindmap,
            "network" => Self::Network,
            "architecture" => Self::Architecture,
            "dataflow" => Self::Dataflow,
            "venn" => Self::Venn,
            _ => Self::Other(token.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Flowchart => "flowchart",
            Self::Tree => "tree",
            Self::OrgChart => "orgchart",
            Self::Mindmap => "mindmap",
            Self::Network => "network",
            Self::Architecture => "architecture",
            Self::Dataflow => "dataflow",
            Self::Venn => "venn",
            Self::Other(token) => token.as_str(),
        }
    }

    pub fn strategy(&self) -> LayoutStrategy {
        match self {
            Self::Mindmap => LayoutStrategy::Radial,
            Self::Network | Self::Architecture | Self::Dataflow => LayoutStrategy::ForceDirected,
            Self::Venn => LayoutStrategy::Venn,
            Self::Flowchart | Self::Tree | Self::OrgChart | Self::Other(_) => {
                LayoutStrategy::Layered
            }
        }
    }
}

impl From<String> for DiagramKind {
    fn from(value: String) -> Self {
        Self::from_token(&value)
    }
}

impl From<DiagramKind> for String {
    fn from(value: DiagramKind) -> Self {
        value.as_str().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub label: String,
    #[serde(rename = "shape", default, skip_serializing_if = "Option::is_none")]
    pub shape_hint: Option<String>,
    #[serde(flatten)]
    pub props: Props,
}

impl Node {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            shape_hint: None,
            props: Props::new(),
        }
    }

    pub fn with_shape(mut self, shape: impl Into<String>) -> Self {
        self.shape_hint = Some(shape.into());
        self
    }

    /// Semantic role such as `decision` or `database`, when the generator supplied one.
    pub fn kind_hint(&self) -> Option<&str> {
        self.props
            .get("kind")
            .or_else(|| self.props.get("type"))
            .and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub from: String,
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(flatten)]
    pub props: Props,
}

impl Edge {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            label: None,
            props: Props::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn is_self_loop(&self) -> bool {
        self.from == self.to
    }

    /// Edges are directed unless the payload explicitly says otherwise.
    pub fn directed(&self) -> bool {
        self.props
            .get("directed")
            .and_then(Value::as_bool)
            .unwrap_or(true)
    }
}

/// Coordinate-free graph handed from the normalizer to the layout engine.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Structure {
    #[serde(rename = "type", default)]
    pub kind: DiagramKind,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl Structure {
    pub fn new(kind: DiagramKind) -> Self {
        Self {
            kind,
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.node(id).is_some()
    }

    pub fn push_node(&mut self, id: &str, label: &str) -> &mut Node {
        self.nodes.push(Node::new(id, label));
        let last = self.nodes.len() - 1;
        &mut self.nodes[last]
    }

    pub fn push_edge(&mut self, from: &str, to: &str) -> &mut Edge {
        self.edges.push(Edge::new(from, to));
        let last = self.edges.len() - 1;
        &mut self.edges[last]
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
