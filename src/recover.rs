//! Text-level recovery for near-JSON documents produced by an unreliable generator.
//!
//! Generators wrap their payload in reasoning tags, prose and code fences, leave
//! brackets unbalanced and sprinkle unescaped quotes inside strings. The helpers
//! here peel that decoration off and try progressively more forgiving parses.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static REASONING_BLOCK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<(thinking|reasoning|think|thought|analysis)\b[^>]*>.*?</(thinking|reasoning|think|thought|analysis)\s*>")
        .unwrap()
});
static REASONING_TAG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)</?[a-z_]*(thinking|reasoning|redacted|thought|analysis)[^>]*>").unwrap()
});
static HTML_COMMENT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap());
static FENCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*(```|~~~)[A-Za-z0-9_-]*[ \t]*$").unwrap());
static STRAY_STRING_BEFORE_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\},\s*"[^"]+",\s*"id""#).unwrap());
static STRAY_STRING_AT_END_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\},\s*"[^"]+"\s*\]"#).unwrap());

/// Element types a whiteboard consumer accepts from generated arrays.
pub const SUPPORTED_ELEMENT_TYPES: [&str; 6] =
    ["rectangle", "ellipse", "diamond", "text", "line", "arrow"];

/// Removes reasoning wrappers, HTML comments and code-fence lines.
pub fn strip_decoration(text: &str) -> String {
    let text = REASONING_BLOCK_RE.replace_all(text, "");
    let text = REASONING_TAG_RE.replace_all(&text, "");
    let text = HTML_COMMENT_RE.replace_all(&text, "");
    let text = FENCE_RE.replace_all(&text, "");
    text.trim().to_string()
}

/// Returns the outermost JSON container starting at the first `{` or `[`.
///
/// The scan tracks string literals so brackets inside labels do not count. When
/// the container never closes, the remainder is returned with the missing
/// closers appended in nesting order.
pub fn extract_json_container(text: &str) -> Option<String> {
    let start = text.find(['{', '['])?;
    container_at(text, start)
}

fn container_at(text: &str, start: usize) -> Option<String> {
    let body = &text[start..];
    let mut stack: Vec<char> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for (idx, ch) in body.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => stack.push('}'),
            '[' => stack.push(']'),
            '}' | ']' => {
                if stack.last() == Some(&ch) {
                    stack.pop();
                }
                if stack.is_empty() {
                    return Some(body[..idx + ch.len_utf8()].to_string());
                }
            }
            _ => {}
        }
    }

    let open = body.chars().next()?;
    let close = if open == '{' { '}' } else { ']' };
    if let Some(last) = body.rfind(close) {
        if serde_json::from_str::<Value>(&body[..=last]).is_ok() {
            return Some(body[..=last].to_string());
        }
    }

    let mut repaired = body.trim_end().to_string();
    if in_string {
        repaired.push('"');
    }
    while let Some(closer) = stack.pop() {
        repaired.push(closer);
    }
    Some(repaired)
}

/// Strict JSON first, then JSON5 for trailing commas, comments and single quotes.
pub fn parse_relaxed(candidate: &str) -> Option<Value> {
    if let Ok(value) = serde_json::from_str::<Value>(candidate) {
        return Some(value);
    }
    if let Ok(value) = json5::from_str::<Value>(candidate) {
        return Some(value);
    }
    None
}

/// Full recovery of a single JSON document from generator output.
///
/// The first object is preferred. A leading array only wins when it encloses
/// that object; a bracket pair that closes earlier is prose like `[v2]`.
pub fn recover_document(raw: &str) -> Option<Value> {
    let cleaned = strip_decoration(raw);
    let object = cleaned
        .find('{')
        .and_then(|start| Some((start, container_at(&cleaned, start)?)));
    let array = cleaned
        .find('[')
        .and_then(|start| Some((start, container_at(&cleaned, start)?)));

    let ordered: Vec<(usize, String)> = match (object, array) {
        (Some(object), Some(array)) if array.0 < object.0 && array.0 + array.1.len() > object.0 => {
            vec![array, object]
        }
        (object, array) => object.into_iter().chain(array).collect(),
    };
    ordered
        .into_iter()
        .find_map(|(_, candidate)| repair_document(&candidate))
}

fn repair_document(candidate: &str) -> Option<Value> {
    if let Some(value) = parse_relaxed(candidate) {
        return Some(value);
    }
    let repaired = balance_brackets(&escape_inner_quotes(candidate));
    if let Some(value) = parse_relaxed(&repaired) {
        return Some(value);
    }
    let cut = last_complete_position(candidate);
    if cut > 0 {
        let truncated = balance_brackets(&candidate[..cut]);
        return parse_relaxed(&truncated);
    }
    None
}

/// Recovers a drawing-element array, keeping only supported, well-formed elements.
pub fn recover_elements(raw: &str) -> Vec<Value> {
    let cleaned = strip_decoration(raw);
    let Some(mut candidate) = extract_json_container(&cleaned) else {
        return Vec::new();
    };
    if candidate.starts_with('{') {
        candidate = format!("[{candidate}]");
    }
    let candidate = STRAY_STRING_BEFORE_ID_RE.replace_all(&candidate, "}, {\"id\"");
    let candidate = STRAY_STRING_AT_END_RE.replace_all(&candidate, "}]");

    let parsed = parse_relaxed(&candidate)
        .or_else(|| parse_relaxed(&balance_brackets(&escape_inner_quotes(&candidate))))
        .or_else(|| {
            let cut = last_complete_position(&candidate);
            (cut > 0).then(|| parse_relaxed(&balance_brackets(&candidate[..cut])))?
        });

    let Some(Value::Array(items)) = parsed else {
        log::warn!("element array could not be recovered");
        return Vec::new();
    };

    let total = items.len();
    let kept: Vec<Value> = items
        .into_iter()
        .filter_map(|mut item| {
            let element_type = item.get("type").and_then(Value::as_str)?.to_string();
            if !SUPPORTED_ELEMENT_TYPES.contains(&element_type.as_str()) {
                log::warn!(element_type = element_type.as_str(); "skipping unsupported element type");
                return None;
            }
            if element_type == "text" && !coerce_text_field(&mut item) {
                log::warn!("skipping text element without text");
                return None;
            }
            Some(item)
        })
        .collect();
    if kept.len() < total {
        log::info!(kept = kept.len(), dropped = total - kept.len(); "filtered recovered elements");
    }
    kept
}

/// Makes a `text` element's payload a non-empty string; returns false when it cannot.
pub(crate) fn coerce_text_field(element: &mut Value) -> bool {
    let Some(object) = element.as_object_mut() else {
        return false;
    };
    let replacement = match object.get("text") {
        None | Some(Value::Null) => return false,
        Some(Value::String(text)) => {
            return !text.is_empty();
        }
        Some(Value::Number(number)) => number.to_string(),
        Some(Value::Bool(flag)) => flag.to_string(),
        Some(other) => other.to_string(),
    };
    object.insert("text".to_string(), Value::String(replacement));
    true
}

/// Escapes quotes that sit inside a string literal but are not followed by a
/// structural character, the usual symptom of a generator quoting a label.
pub fn escape_inner_quotes(json: &str) -> String {
    let chars: Vec<char> = json.chars().collect();
    let mut out = String::with_capacity(json.len() + 8);
    let mut in_string = false;
    let mut escaped = false;

    for (idx, &ch) in chars.iter().enumerate() {
        if escaped {
            out.push(ch);
            escaped = false;
            continue;
        }
        if ch == '\\' {
            out.push(ch);
            escaped = true;
            continue;
        }
        if ch != '"' {
            out.push(ch);
            continue;
        }
        if !in_string {
            in_string = true;
            out.push(ch);
            continue;
        }
        let next = chars[idx + 1..].iter().find(|c| !c.is_whitespace());
        match next {
            None | Some(':') | Some(',') | Some('}') | Some(']') => {
                in_string = false;
                out.push(ch);
            }
            Some(_) => out.push_str("\\\""),
        }
    }
    out
}

/// Appends closers for every unbalanced `{`/`[` outside string literals.
pub fn balance_brackets(json: &str) -> String {
    let mut stack: Vec<char> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;
    for ch in json.chars() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => stack.push('}'),
            '[' => stack.push(']'),
            '}' | ']' => {
                if stack.last() == Some(&ch) {
                    stack.pop();
                }
            }
            _ => {}
        }
    }
    let mut out = json.trim_end().trim_end_matches(',').to_string();
    if in_string {
        out.push('"');
    }
    while let Some(closer) = stack.pop() {
        out.push(closer);
    }
    out
}

/// Byte offset just past the last object that closed at depth one.
fn last_complete_position(json: &str) -> usize {
    let mut depth = 0i32;
    let mut in_string = false;
    let mut escaped = false;
    let mut last = 0usize;
    for (idx, ch) in json.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' | '[' => depth += 1,
            '}' | ']' => {
                depth -= 1;
                if depth <= 1 {
                    last = idx + ch.len_utf8();
                }
                if depth <= 0 {
                    break;
                }
            }
            _ => {}
        }
    }
    last
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_reasoning_and_fences() {
        let raw = "<think>I should draw\n a box {not json}</think>\nHere you go:\n```json\n{\"nodes\": []}\n```\nDone.";
        let cleaned = strip_decoration(raw);
        assert!(!cleaned.contains("think"));
        assert!(!cleaned.contains("```"));
        assert_eq!(
            extract_json_container(&cleaned).as_deref(),
            Some("{\"nodes\": []}")
        );
    }

    #[test]
    fn container_scan_ignores_brackets_in_strings() {
        let text = r#"prefix {"label": "a } b", "n": [1, 2]} trailing }"#;
        assert_eq!(
            extract_json_container(text).as_deref(),
            Some(r#"{"label": "a } b", "n": [1, 2]}"#)
        );
    }

    #[test]
    fn unterminated_container_is_closed() {
        let text = r#"{"nodes": [{"id": "a"}, {"id": "b""#;
        let repaired = extract_json_container(text).unwrap();
        let value: Value = serde_json::from_str(&repaired).unwrap();
        assert_eq!(value["nodes"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn json5_handles_trailing_commas() {
        let value = parse_relaxed("{nodes: [{id: 'a',},],}").unwrap();
        assert_eq!(value["nodes"][0]["id"], "a");
    }

    #[test]
    fn inner_quotes_are_escaped() {
        let broken = r#"{"label": "the "best" path", "id": "a"}"#;
        let fixed = escape_inner_quotes(broken);
        let value: Value = serde_json::from_str(&fixed).unwrap();
        assert_eq!(value["label"], "the \"best\" path");
    }

    #[test]
    fn recover_elements_filters_unsupported_and_empty_text() {
        let raw = r#"Sure! [
            {"id": "a", "type": "rectangle", "x": 0, "y": 0},
            {"id": "b", "type": "frame", "children": []},
            {"id": "c", "type": "text", "x": 1, "y": 1, "text": ""},
            {"id": "d", "type": "text", "x": 1, "y": 1, "text": 42}
        ]"#;
        let elements = recover_elements(raw);
        let ids: Vec<&str> = elements.iter().filter_map(|e| e["id"].as_str()).collect();
        assert_eq!(ids, vec!["a", "d"]);
        assert_eq!(elements[1]["text"], "42");
    }

    #[test]
    fn recover_elements_wraps_single_object_and_truncates_garbage() {
        let single = recover_elements(r#"{"id": "a", "type": "ellipse", "x": 0, "y": 0}"#);
        assert_eq!(single.len(), 1);

        let truncated = recover_elements(
            r#"[{"id": "a", "type": "rectangle", "x": 0, "y": 0}, {"id": "b", "type": "arr"#,
        );
        assert_eq!(truncated.len(), 1);
        assert_eq!(truncated[0]["id"], "a");
    }

    #[test]
    fn document_prefers_object_over_earlier_prose_brackets() {
        let value = recover_document("Graph [v2] below, see [notes]:\n{\"nodes\": [\"a\"]}").unwrap();
        assert_eq!(value["nodes"][0], "a");

        let listed = recover_document("Nodes: [{\"id\": \"a\"}, {\"id\": \"b\"}]").unwrap();
        assert_eq!(listed.as_array().map(Vec::len), Some(2));

        let only_array = recover_document("[1, 2, 3]").unwrap();
        assert_eq!(only_array.as_array().map(Vec::len), Some(3));
    }

    #[test]
    fn hopeless_input_recovers_nothing() {
        assert!(recover_elements("no json here").is_empty());
        assert!(recover_document("still nothing").is_none());
    }
}
