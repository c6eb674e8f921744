use drawgen::{Config, GenerateOptions, generate, parse_config, validate};
use serde::Deserialize;
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DrawOptions {
    theme: Option<String>,
    /// Full config document, same format as the CLI config file.
    config: Option<serde_json::Value>,
}

fn build_options(options: DrawOptions) -> Result<GenerateOptions, String> {
    let mut config = match options.config {
        Some(raw) => parse_config(&raw.to_string()).map_err(|error| error.to_string())?,
        None => Config::default(),
    };
    if let Some(theme) = options.theme.as_deref() {
        config = config.with_theme_name(theme).map_err(|error| error.to_string())?;
    }
    Ok(GenerateOptions::new(config))
}

/// Returns the element list as JSON text.
#[wasm_bindgen]
pub fn generate_elements(code: &str, options_json: Option<String>) -> Result<String, JsValue> {
    let options = if let Some(raw_options) = options_json {
        serde_json::from_str::<DrawOptions>(&raw_options)
            .map_err(|error| JsValue::from_str(&error.to_string()))?
    } else {
        DrawOptions::default()
    };

    let options = build_options(options).map_err(|error| JsValue::from_str(&error))?;
    Ok(generate(code, &options).elements_json())
}

/// Returns `{"passed": bool, "errors": [...]}` as JSON text.
#[wasm_bindgen]
pub fn validate_elements(code: &str) -> Result<String, JsValue> {
    serde_json::to_string(&validate(code)).map_err(|error| JsValue::from_str(&error.to_string()))
}
