//! End-to-end generation: raw text in, validated element list out.

use serde::Serialize;
use serde_json::Value;

use crate::builder;
use crate::config::Config;
use crate::element::elements_to_values;
use crate::ir::Structure;
use crate::layout::{self, LayoutResult, PositionedNode};
use crate::normalize::{self, NormalizeReport};
use crate::optimize;
use crate::postprocess;
use crate::validate::{self, Validation};

#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    pub config: Config,
}

impl GenerateOptions {
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

/// Everything one generation run produced.
#[derive(Debug, Clone, Serialize)]
pub struct Generated {
    pub structure: Structure,
    pub report: NormalizeReport,
    pub nodes: Vec<PositionedNode>,
    #[serde(skip)]
    pub layout: LayoutResult,
    pub elements: Vec<Value>,
    pub validation: Validation,
}

impl Generated {
    pub fn elements_json(&self) -> String {
        serde_json::to_string_pretty(&self.elements).unwrap_or_else(|_| "[]".to_string())
    }
}

/// Runs the full pipeline on generator text. Never fails: unusable input
/// produces an empty, vacuously valid element list.
pub fn generate(raw: &str, options: &GenerateOptions) -> Generated {
    let (structure, report) = normalize::normalize_with_report(raw);
    run(structure, report, options)
}

/// Runs the pipeline on a structure assembled in code. It is normalized first.
pub fn generate_from_structure(structure: Structure, options: &GenerateOptions) -> Generated {
    let value = serde_json::to_value(&structure).unwrap_or(Value::Null);
    let (structure, report) = normalize::normalize_value_with_report(value);
    run(structure, report, options)
}

fn run(structure: Structure, report: NormalizeReport, options: &GenerateOptions) -> Generated {
    let config = &options.config;
    let layout = layout::compute_layout_with_stats(&structure, &config.layout);
    let nodes = postprocess::process(
        layout.nodes.clone(),
        &structure.edges,
        &structure.kind,
        &config.postprocess,
    );
    let built = builder::build(
        &structure,
        &nodes,
        &structure.edges,
        &config.theme,
        &config.build,
    );
    let elements = optimize::optimize(elements_to_values(&built));
    let validation = validate::validate(
        &serde_json::to_string(&elements).unwrap_or_else(|_| "[]".to_string()),
    );
    if !validation.passed {
        log::warn!(errors = validation.errors.len(); "generated elements failed validation");
    }

    log::info!(
        kind = structure.kind.as_str(),
        nodes = nodes.len(),
        edges = structure.edges.len(),
        elements = elements.len();
        "generated diagram"
    );
    Generated {
        structure,
        report,
        nodes,
        layout,
        elements,
        validation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::DiagramKind;

    #[test]
    fn garbage_generates_an_empty_valid_diagram() {
        let generated = generate("nothing to see", &GenerateOptions::default());
        assert!(generated.elements.is_empty());
        assert!(generated.validation.passed);
        assert!(generated.report.unparsable);
        assert_eq!(generated.elements_json(), "[]");
    }

    #[test]
    fn typed_structures_are_normalized_before_layout() {
        let mut structure = Structure::new(DiagramKind::Tree);
        structure.push_node("root", "Root");
        structure.push_node("root", "Again");
        structure.push_edge("root", "missing");
        let generated = generate_from_structure(structure, &GenerateOptions::default());
        assert_eq!(generated.structure.nodes[1].id, "root_1");
        assert!(generated.structure.edges.is_empty());
        assert_eq!(generated.elements.len(), 2);
        assert_eq!(generated.report.renamed_ids, 1);
    }
}
