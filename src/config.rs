use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },
    #[error("unknown theme `{0}`")]
    UnknownTheme(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    pub node_width: f32,
    pub node_height: f32,
    /// Horizontal gap between neighbouring boxes in one layer.
    pub node_spacing: f32,
    /// Vertical gap between the bottom of one layer and the top of the next.
    pub rank_spacing: f32,
    pub dummy_width: f32,
    pub order_passes: usize,
    pub diamond_min_size: f32,
    pub radial: RadialLayoutConfig,
    pub force: ForceLayoutConfig,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_width: 200.0,
            node_height: 80.0,
            node_spacing: 80.0,
            rank_spacing: 120.0,
            dummy_width: 40.0,
            order_passes: 4,
            diamond_min_size: 120.0,
            radial: RadialLayoutConfig::default(),
            force: ForceLayoutConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RadialLayoutConfig {
    pub radius: f32,
}

impl Default for RadialLayoutConfig {
    fn default() -> Self {
        Self { radius: 400.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ForceLayoutConfig {
    pub enabled: bool,
    pub iterations: usize,
    pub ideal_edge_length: f32,
}

impl Default for ForceLayoutConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            iterations: 50,
            ideal_edge_length: 300.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PostProcessConfig {
    /// Minimum gap between the right edge of a node and the left edge of its
    /// right-hand neighbour in the same row.
    pub min_spacing: f32,
    pub row_tolerance: f32,
    pub max_nodes_per_row: Option<usize>,
    /// Height over width above which inter-row gaps are compressed.
    pub max_aspect_ratio: f32,
    pub min_level_spacing: f32,
}

impl Default for PostProcessConfig {
    fn default() -> Self {
        Self {
            min_spacing: 40.0,
            row_tolerance: 10.0,
            max_nodes_per_row: None,
            max_aspect_ratio: 1.6,
            min_level_spacing: 60.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BuildConfig {
    pub diamond_min_size: f32,
    pub label_font_size: f32,
    pub edge_label_font_size: f32,
    pub text_font_size: f32,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            diamond_min_size: 120.0,
            label_font_size: 16.0,
            edge_label_font_size: 14.0,
            text_font_size: 20.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub postprocess: PostProcessConfig,
    pub build: BuildConfig,
}

impl Config {
    /// Swaps in a named palette, keeping every other setting.
    pub fn with_theme_name(mut self, name: &str) -> Result<Self, ConfigError> {
        self.theme = Theme::by_name(name).ok_or_else(|| ConfigError::UnknownTheme(name.to_string()))?;
        Ok(self)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    primary_color: Option<String>,
    secondary_color: Option<String>,
    accent_color: Option<String>,
    background: Option<String>,
    text_color: Option<String>,
    line_color: Option<String>,
    line_width: Option<f32>,
    corner_radius: Option<f32>,
}

impl ThemeVariables {
    fn apply(self, theme: &mut Theme) {
        if let Some(v) = self.primary_color {
            theme.primary_color = v;
        }
        if let Some(v) = self.secondary_color {
            theme.secondary_color = v;
        }
        if let Some(v) = self.accent_color {
            theme.accent_color = v;
        }
        if let Some(v) = self.background {
            theme.background = v;
        }
        if let Some(v) = self.text_color {
            theme.text_color = v;
        }
        if let Some(v) = self.line_color {
            theme.line_color = v;
        }
        if let Some(v) = self.line_width {
            theme.line_width = v;
        }
        if let Some(v) = self.corner_radius {
            theme.corner_radius = v;
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    layout: Option<LayoutConfig>,
    #[serde(alias = "postProcess")]
    postprocess: Option<PostProcessConfig>,
    build: Option<BuildConfig>,
}

pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&contents).map_err(|err| match err {
        ConfigError::Parse { message, .. } => ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        },
        other => other,
    })
}

/// Parses config text: strict JSON first, then JSON5 for comments and
/// trailing commas.
pub fn parse_config(contents: &str) -> Result<Config, ConfigError> {
    let raw: serde_json::Value = match serde_json::from_str(contents) {
        Ok(raw) => raw,
        Err(json_err) => json5::from_str(contents).map_err(|json5_err| ConfigError::Parse {
            path: PathBuf::new(),
            message: format!("{json_err}; as json5: {json5_err}"),
        })?,
    };
    let diamond_in_build = raw.pointer("/build/diamondMinSize").is_some();
    let diamond_in_layout = raw.pointer("/layout/diamondMinSize").is_some();
    let parsed: ConfigFile = serde_json::from_value(raw).map_err(|err| ConfigError::Parse {
        path: PathBuf::new(),
        message: err.to_string(),
    })?;

    let mut config = Config::default();
    if let Some(theme_name) = parsed.theme.as_deref() {
        config = config.with_theme_name(theme_name)?;
    }
    if let Some(vars) = parsed.theme_variables {
        vars.apply(&mut config.theme);
    }
    if let Some(layout) = parsed.layout {
        config.layout = layout;
    }
    if let Some(postprocess) = parsed.postprocess {
        config.postprocess = postprocess;
    }
    if let Some(build) = parsed.build {
        config.build = build;
    }
    // Layout sizing and element sizing share one diamond footprint; the
    // section that names it wins, `build` when both do.
    if diamond_in_build {
        config.layout.diamond_min_size = config.build.diamond_min_size;
    } else if diamond_in_layout {
        config.build.diamond_min_size = config.layout.diamond_min_size;
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_object_gives_defaults() {
        let config = parse_config("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.layout.order_passes, 4);
        assert_eq!(config.postprocess.row_tolerance, 10.0);
    }

    #[test]
    fn theme_and_variables_overlay() {
        let config = parse_config(
            r##"{"theme":"dark","themeVariables":{"lineColor":"#123456","lineWidth":4}}"##,
        )
        .unwrap();
        assert_eq!(config.theme.name, "dark");
        assert_eq!(config.theme.line_color, "#123456");
        assert_eq!(config.theme.line_width, 4.0);
        assert_eq!(config.theme.primary_color, Theme::dark().primary_color);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = parse_config(
            r#"{
                // relaxed syntax is accepted
                layout: {nodeSpacing: 120, force: {enabled: false}},
                postProcess: {maxNodesPerRow: 3,},
            }"#,
        )
        .unwrap();
        assert_eq!(config.layout.node_spacing, 120.0);
        assert_eq!(config.layout.node_width, 200.0);
        assert!(!config.layout.force.enabled);
        assert_eq!(config.layout.force.iterations, 50);
        assert_eq!(config.postprocess.max_nodes_per_row, Some(3));
    }

    #[test]
    fn diamond_size_follows_the_section_that_sets_it() {
        let layout_only = parse_config(r#"{"layout":{"diamondMinSize":300}}"#).unwrap();
        assert_eq!(layout_only.layout.diamond_min_size, 300.0);
        assert_eq!(layout_only.build.diamond_min_size, 300.0);

        let build_only = parse_config(r#"{"build":{"diamondMinSize":90}}"#).unwrap();
        assert_eq!(build_only.layout.diamond_min_size, 90.0);
        assert_eq!(build_only.build.diamond_min_size, 90.0);

        let both = parse_config(
            r#"{"layout":{"diamondMinSize":300},"build":{"diamondMinSize":150}}"#,
        )
        .unwrap();
        assert_eq!(both.layout.diamond_min_size, 150.0);
        assert_eq!(both.build.diamond_min_size, 150.0);
    }

    #[test]
    fn unknown_theme_is_an_error() {
        let err = parse_config(r#"{"theme":"neon"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownTheme(name) if name == "neon"));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load_config(Some(Path::new("/definitely/not/here.json"))).unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.json"));
    }
}
