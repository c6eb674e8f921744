use serde::Serialize;
use serde_json::Value;

/// Pass/fail verdict with every problem found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Validation {
    pub passed: bool,
    pub errors: Vec<String>,
}

impl Validation {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            passed: errors.is_empty(),
            errors,
        }
    }
}

/// Validates a serialized element list. Only a parse failure or a non-array
/// document stops the scan early.
pub fn validate(code: &str) -> Validation {
    let parsed: Value = match serde_json::from_str(code) {
        Ok(value) => value,
        Err(err) => return Validation::from_errors(vec![format!("invalid JSON: {err}")]),
    };
    let Value::Array(elements) = parsed else {
        return Validation::from_errors(vec!["element list must be a JSON array".to_string()]);
    };
    Validation::from_errors(validate_elements(&elements))
}

pub fn validate_elements(elements: &[Value]) -> Vec<String> {
    elements
        .iter()
        .enumerate()
        .flat_map(|(index, element)| validate_element(index, element))
        .collect()
}

fn validate_element(index: usize, element: &Value) -> Vec<String> {
    let mut errors = Vec::new();
    let Some(object) = element.as_object() else {
        errors.push(format!("element {index}: not an object"));
        return errors;
    };
    let Some(kind) = object.get("type") else {
        errors.push(format!("element {index}: missing type"));
        return errors;
    };
    let kind = kind.as_str().unwrap_or("?");

    if !object.contains_key("x") || !object.contains_key("y") {
        errors.push(format!("element {index} ({kind}): missing x or y coordinate"));
    }

    match kind {
        "text" => {
            let has_text = match object.get("text") {
                None | Some(Value::Null) => false,
                Some(Value::String(text)) => !text.is_empty(),
                Some(_) => true,
            };
            if !has_text {
                errors.push(format!("element {index} (text): missing text"));
            }
        }
        "arrow" => {
            if let Some(start) = object.get("start") {
                let bound = start
                    .as_object()
                    .is_some_and(|binding| binding.contains_key("type") || binding.contains_key("id"));
                if !bound {
                    errors.push(format!(
                        "element {index} (arrow): start binding needs a type or id"
                    ));
                }
            }
        }
        "frame" => match object.get("children") {
            None => errors.push(format!("element {index} (frame): missing children")),
            Some(Value::Array(_)) => {}
            Some(_) => errors.push(format!("element {index} (frame): children must be an array")),
        },
        _ => {}
    }
    errors
}
