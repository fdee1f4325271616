// Library exports for pictograph

pub mod backend;
pub mod bar;
pub mod data;
pub mod error;
pub mod graph;
pub mod layout;
pub mod parser;
pub mod shapes;
pub mod style;

use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

pub use data::{CategoryDatum, ChartData};
pub use error::{GraphError, Result};
pub use graph::{Chart, Graph, Outcome};

/// Requested output kind. Selects the backend: vector, raster or text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum OutputKind {
    #[default]
    Svg,
    Png,
    Jpg,
    Gif,
    Txt,
}

impl OutputKind {
    pub fn is_raster(self) -> bool {
        matches!(self, OutputKind::Png | OutputKind::Jpg | OutputKind::Gif)
    }
}

impl FromStr for OutputKind {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "svg" => Ok(OutputKind::Svg),
            "png" => Ok(OutputKind::Png),
            "jpg" | "jpeg" => Ok(OutputKind::Jpg),
            "gif" => Ok(OutputKind::Gif),
            "txt" => Ok(OutputKind::Txt),
            other => Err(GraphError::Configuration(format!(
                "unknown output type '{}' (expected svg, png, jpg, gif or txt)",
                other
            ))),
        }
    }
}

impl TryFrom<String> for OutputKind {
    type Error = GraphError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputKind::Svg => "svg",
            OutputKind::Png => "png",
            OutputKind::Jpg => "jpg",
            OutputKind::Gif => "gif",
            OutputKind::Txt => "txt",
        };
        f.write_str(name)
    }
}

/// Requested chart style. Ignored for text output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum ChartStyle {
    #[default]
    Circle,
    Cross,
    Manikin,
    Bar,
    Pie,
}

impl FromStr for ChartStyle {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "circle" => Ok(ChartStyle::Circle),
            "cross" => Ok(ChartStyle::Cross),
            "manikin" => Ok(ChartStyle::Manikin),
            "bar" => Ok(ChartStyle::Bar),
            "pie" => Ok(ChartStyle::Pie),
            other => Err(GraphError::Configuration(format!(
                "unknown style '{}' (expected circle, cross, manikin, bar or pie)",
                other
            ))),
        }
    }
}

impl TryFrom<String> for ChartStyle {
    type Error = GraphError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

/// Every option a graph understands. Keys outside this struct are dropped
/// when deserializing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GraphOptions {
    #[serde(default, rename = "type")]
    pub kind: OutputKind,
    #[serde(default)]
    pub style: ChartStyle,
    /// Column-wrap limit; `None` or 0 keeps every item on one row
    pub columns: Option<usize>,
    #[serde(default = "default_item_size")]
    pub item_width: u32,
    #[serde(default = "default_item_size")]
    pub item_height: u32,
    /// Extra inset on top of the fixed base inset of every cell
    #[serde(default)]
    pub inner_margin: u32,
    pub width: Option<u32>,
    pub height: Option<u32>,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub group_labels: Vec<String>,
    pub title: Option<String>,
    pub background_color: Option<String>,
    pub filename: Option<PathBuf>,
    /// Glyphs used by text output, one per category
    #[serde(default)]
    pub symbols: Vec<String>,
    /// Bar track length and pie diameter
    #[serde(default = "default_track_length")]
    pub track_length: u32,
}

fn default_item_size() -> u32 { 20 }
fn default_track_length() -> u32 { 200 }

impl Default for GraphOptions {
    fn default() -> Self {
        Self {
            kind: OutputKind::Svg,
            style: ChartStyle::Circle,
            columns: None,
            item_width: 20,
            item_height: 20,
            inner_margin: 0,
            width: None,
            height: None,
            colors: Vec::new(),
            labels: Vec::new(),
            group_labels: Vec::new(),
            title: None,
            background_color: None,
            filename: None,
            symbols: Vec::new(),
            track_length: 200,
        }
    }
}

impl GraphOptions {
    /// Build options from a JSON object, ignoring unknown keys.
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        GraphOptions::deserialize(value)
            .map_err(|e| GraphError::Configuration(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_output_kind_parse() {
        assert_eq!("svg".parse::<OutputKind>().unwrap(), OutputKind::Svg);
        assert_eq!("PNG".parse::<OutputKind>().unwrap(), OutputKind::Png);
        assert_eq!("jpeg".parse::<OutputKind>().unwrap(), OutputKind::Jpg);
        assert!(OutputKind::Gif.is_raster());
        assert!(!OutputKind::Txt.is_raster());
    }

    #[test]
    fn test_unknown_output_kind_names_value() {
        let err = "bmp".parse::<OutputKind>().unwrap_err();
        assert!(matches!(err, GraphError::Configuration(_)));
        assert!(err.to_string().contains("bmp"));
    }

    #[test]
    fn test_unknown_style_names_value() {
        let err = "hexagon".parse::<ChartStyle>().unwrap_err();
        assert!(err.to_string().contains("hexagon"));
    }

    #[test]
    fn test_options_defaults() {
        let options = GraphOptions::from_json(&json!({})).unwrap();
        assert_eq!(options, GraphOptions::default());
        assert_eq!(options.item_width, 20);
        assert_eq!(options.item_height, 20);
        assert_eq!(options.columns, None);
    }

    #[test]
    fn test_options_drop_unknown_keys() {
        let options = GraphOptions::from_json(&json!({
            "type": "png",
            "style": "cross",
            "filename": "some_file.png",
            "colors": ["blue", "green"],
            "columns": 7,
            "item_width": 111,
            "item_height": 222,
            "background_color": "Silver",
            "bogus_option": "123123"
        }))
        .unwrap();
        assert_eq!(options.kind, OutputKind::Png);
        assert_eq!(options.style, ChartStyle::Cross);
        assert_eq!(options.filename, Some(PathBuf::from("some_file.png")));
        assert_eq!(options.colors, vec!["blue", "green"]);
        assert_eq!(options.columns, Some(7));
        assert_eq!(options.item_width, 111);
        assert_eq!(options.item_height, 222);
        assert_eq!(options.background_color.as_deref(), Some("Silver"));
    }

    #[test]
    fn test_options_bad_type_is_configuration_error() {
        let err = GraphOptions::from_json(&json!({ "type": "tiff" })).unwrap_err();
        assert!(matches!(err, GraphError::Configuration(_)));
        assert!(err.to_string().contains("tiff"));
    }
}
