use std::collections::HashSet;
use std::path::Path;

use drawgen::config::{LayoutConfig, PostProcessConfig};
use drawgen::layout::{NodeRole, compute_layout_with_stats};
use drawgen::normalize::{normalize_structure, normalize_with_report};
use drawgen::{GenerateOptions, Generated, generate, validate};
use pretty_assertions::assert_eq;
use serde_json::Value;

fn kind_of(element: &Value) -> &str {
    element["type"].as_str().unwrap_or_default()
}

fn connectors(generated: &Generated) -> Vec<&Value> {
    generated
        .elements
        .iter()
        .filter(|e| matches!(kind_of(e), "arrow" | "line"))
        .collect()
}

fn assert_sound(generated: &Generated, fixture: &str) {
    assert!(
        generated.validation.passed,
        "{fixture}: validation failed: {:?}",
        generated.validation.errors
    );

    let mut ids = HashSet::new();
    for element in &generated.elements {
        let id = element["id"].as_str().expect("element id");
        assert!(ids.insert(id.to_string()), "{fixture}: duplicate element id {id}");
    }
    for connector in connectors(generated) {
        for end in ["start", "end"] {
            let bound = connector[end]["id"].as_str().expect("bound connector");
            assert!(ids.contains(bound), "{fixture}: {end} binding {bound} is dangling");
        }
    }

    let node_ids: HashSet<&str> = generated.structure.nodes.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(node_ids.len(), generated.structure.nodes.len(), "{fixture}: node ids repeat");
    for edge in &generated.structure.edges {
        assert!(node_ids.contains(edge.from.as_str()), "{fixture}: edge from {}", edge.from);
        assert!(node_ids.contains(edge.to.as_str()), "{fixture}: edge to {}", edge.to);
    }

    let shapes = generated.elements.len() - connectors(generated).len();
    assert_eq!(shapes, generated.structure.nodes.len(), "{fixture}: one element per node");
}

/// Groups nodes into rows the way the post-processor does: a node joins the
/// current row when its top edge lies within the row tolerance of the row's
/// first node. Each row comes back sorted left to right.
fn rows_of(generated: &Generated, tolerance: f32) -> Vec<Vec<usize>> {
    let nodes = &generated.nodes;
    let mut order: Vec<usize> = (0..nodes.len())
        .filter(|&idx| nodes[idx].role != NodeRole::VennSet)
        .collect();
    order.sort_by(|&a, &b| nodes[a].y.total_cmp(&nodes[b].y).then(a.cmp(&b)));

    let mut rows: Vec<Vec<usize>> = Vec::new();
    let mut anchor = f32::NEG_INFINITY;
    for idx in order {
        match rows.last_mut() {
            Some(row) if (nodes[idx].y - anchor).abs() <= tolerance => row.push(idx),
            _ => {
                anchor = nodes[idx].y;
                rows.push(vec![idx]);
            }
        }
    }
    for row in &mut rows {
        row.sort_by(|&a, &b| nodes[a].x.total_cmp(&nodes[b].x).then(a.cmp(&b)));
    }
    rows
}

/// Neighbours within a row must be separated by at least the minimum gap.
fn assert_rows_clear(generated: &Generated, fixture: &str) {
    let config = PostProcessConfig::default();
    for row in rows_of(generated, config.row_tolerance) {
        for pair in row.windows(2) {
            let (a, b) = (&generated.nodes[pair[0]], &generated.nodes[pair[1]]);
            assert!(
                b.x >= a.right() + config.min_spacing - 0.01,
                "{fixture}: {} at {} crowds {} ending at {}",
                b.id(),
                b.x,
                a.id(),
                a.right()
            );
        }
    }
}

fn generate_fixture(path: &Path) -> Generated {
    let input = std::fs::read_to_string(path).expect("fixture read failed");
    generate(&input, &GenerateOptions::default())
}

#[test]
fn generate_all_fixtures() {
    let root = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures");

    // Keep this list explicit so new fixtures must be added intentionally.
    let candidates = [
        ("flowchart/basic.json", 6, 6),
        ("flowchart/fenced.txt", 5, 5),
        ("flowchart/messy.json", 6, 4),
        ("tree/truncated.txt", 4, 3),
        ("mindmap/basic.json", 8, 7),
        ("network/services.json5", 6, 6),
        ("venn/basic.json", 5, 2),
    ];

    for (rel, nodes, edges) in candidates {
        let path = root.join(rel);
        assert!(path.exists(), "fixture missing: {}", rel);
        let generated = generate_fixture(&path);
        assert_eq!(generated.structure.nodes.len(), nodes, "{rel}: node count");
        assert_eq!(generated.structure.edges.len(), edges, "{rel}: edge count");
        assert_sound(&generated, rel);
        assert_rows_clear(&generated, rel);
    }
}

#[test]
fn force_and_radial_layouts_keep_approximate_rows_clear() {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures");
    for rel in ["network/services.json5", "mindmap/basic.json"] {
        let generated = generate_fixture(&root.join(rel));
        let rows = rows_of(&generated, PostProcessConfig::default().row_tolerance);
        let grouped: usize = rows.iter().map(Vec::len).sum();
        assert_eq!(grouped, generated.nodes.len(), "{rel}: every node sits in a row");
        assert_rows_clear(&generated, rel);
    }
}

#[test]
fn start_end_flowchart_stacks_and_validates() {
    let generated = generate(
        r#"{"type":"flowchart","nodes":[{"id":"a","label":"Start"},{"id":"b","label":"End"}],
           "edges":[{"from":"a","to":"b"}]}"#,
        &GenerateOptions::default(),
    );
    let a = &generated.nodes[0];
    let b = &generated.nodes[1];
    assert_eq!(a.layer, Some(0));
    assert_eq!(b.layer, Some(1));
    assert!(b.y > a.y);

    let kinds: Vec<&str> = generated.elements.iter().map(kind_of).collect();
    assert_eq!(kinds, vec!["ellipse", "ellipse", "arrow"]);
    assert!(generated.validation.passed);
    assert!(generated.validation.errors.is_empty());
}

#[test]
fn dangling_edge_is_dropped() {
    let generated = generate(
        r#"{"nodes":[{"id":"a","label":"Alpha"}],"edges":[{"from":"a","to":"zzz"}]}"#,
        &GenerateOptions::default(),
    );
    assert!(generated.structure.edges.is_empty());
    assert!(connectors(&generated).is_empty());
    assert_eq!(generated.report.dropped_edges, 1);
}

#[test]
fn duplicate_ids_are_suffixed_and_both_drawn() {
    let generated = generate(
        r#"{"nodes":[{"id":"x","label":"First"},{"id":"x","label":"Second"}],"edges":[]}"#,
        &GenerateOptions::default(),
    );
    let ids: Vec<&str> = generated.structure.nodes.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, vec!["x", "x_1"]);
    assert_eq!(generated.elements.len(), 2);
}

#[test]
fn venn_output_has_no_connectors() {
    let generated = generate(
        r#"{"type":"venn","nodes":[{"id":"s1","shape":"ellipse"},{"id":"e1","shape":"rectangle"}],
           "edges":[{"from":"e1","to":"s1"}]}"#,
        &GenerateOptions::default(),
    );
    assert_eq!(generated.structure.edges.len(), 1);
    assert_eq!(generated.elements.len(), 2);
    assert!(connectors(&generated).is_empty());
    assert_eq!(kind_of(&generated.elements[0]), "ellipse");
    assert_eq!(kind_of(&generated.elements[1]), "rectangle");
}

#[test]
fn skip_edge_gets_one_dummy_and_stays_bound_to_its_ends() {
    let input = r#"{"type":"flowchart","nodes":["a","b","d"],
        "edges":[{"from":"a","to":"b"},{"from":"b","to":"d"},{"from":"a","to":"d"}]}"#;
    let (structure, _) = normalize_with_report(input);
    let layout = compute_layout_with_stats(&structure, &LayoutConfig::default());
    assert_eq!(layout.dummy_count, 1);
    assert_eq!(layout.layer_count, 3);
    assert_eq!(layout.nodes.len(), 3);

    let generated = generate(input, &GenerateOptions::default());
    let arrows = connectors(&generated);
    assert_eq!(generated.elements.len() - arrows.len(), 3);
    assert_eq!(arrows.len(), 3);
    let node_a = generated.elements[0]["id"].as_str().unwrap();
    let node_d = generated.elements[2]["id"].as_str().unwrap();
    assert_eq!(arrows[2]["start"]["id"].as_str(), Some(node_a));
    assert_eq!(arrows[2]["end"]["id"].as_str(), Some(node_d));
}

#[test]
fn empty_nodes_are_vacuously_valid() {
    let generated = generate(r#"{"type":"flowchart","nodes":[]}"#, &GenerateOptions::default());
    assert!(generated.nodes.is_empty());
    assert!(generated.elements.is_empty());
    assert_eq!(generated.elements_json(), "[]");
    assert!(validate(&generated.elements_json()).passed);
}

#[test]
fn normalization_is_idempotent_on_fixtures() {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures");
    for rel in ["flowchart/messy.json", "network/services.json5", "tree/truncated.txt"] {
        let input = std::fs::read_to_string(root.join(rel)).unwrap();
        let (once, _) = normalize_with_report(&input);
        let twice = normalize_structure(once.clone());
        assert_eq!(once, twice, "{rel}");
    }
}

#[test]
fn tree_layers_descend_along_edges() {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures");
    let generated = generate_fixture(&root.join("tree/truncated.txt"));
    let layer = |id: &str| {
        generated
            .nodes
            .iter()
            .find(|n| n.id() == id)
            .and_then(|n| n.layer)
            .unwrap()
    };
    for edge in &generated.structure.edges {
        assert!(layer(&edge.to) > layer(&edge.from), "{} -> {}", edge.from, edge.to);
    }
}

#[test]
fn undirected_edges_become_lines() {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures");
    let generated = generate_fixture(&root.join("network/services.json5"));
    let kinds: Vec<&str> = connectors(&generated).into_iter().map(kind_of).collect();
    assert_eq!(kinds.iter().filter(|k| **k == "line").count(), 1);
    assert_eq!(kinds.iter().filter(|k| **k == "arrow").count(), 5);

    let mindmap = generate_fixture(&root.join("mindmap/basic.json"));
    assert!(connectors(&mindmap).iter().all(|c| kind_of(c) == "line"));
}
