//! Style attributes passed to every primitive, plus color handling.

use plotters::style::RGBColor;

/// Color used when neither the options nor the category label name one
pub const DEFAULT_COLOR: &str = "black";

/// Attribute bag handed to every backend primitive.
///
/// `class` only has meaning for vector output; the raster backend drops it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Style {
    pub stroke: Option<String>,
    pub fill: Option<String>,
    pub stroke_width: Option<f64>,
    pub class: Option<String>,
}

impl Style {
    pub fn stroke(color: &str) -> Self {
        Style {
            stroke: Some(color.to_string()),
            ..Style::default()
        }
    }

    pub fn fill(color: &str) -> Self {
        Style {
            fill: Some(color.to_string()),
            ..Style::default()
        }
    }

    pub fn with_stroke_width(mut self, width: f64) -> Self {
        self.stroke_width = Some(width);
        self
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.class = Some(class.to_string());
        self
    }
}

// === Color Parsing ===

/// Parse a color string into RGBColor, supporting hex (#RRGGBB, #RGB) and named colors
pub fn parse_color(color_str: &str) -> Option<RGBColor> {
    let color_str = color_str.trim();

    if color_str.starts_with('#') {
        return parse_hex_color(color_str);
    }

    match color_str.to_lowercase().as_str() {
        "white" => Some(RGBColor(255, 255, 255)),
        "black" => Some(RGBColor(0, 0, 0)),
        "red" => Some(RGBColor(255, 0, 0)),
        "green" => Some(RGBColor(0, 128, 0)),
        "lime" => Some(RGBColor(0, 255, 0)),
        "blue" => Some(RGBColor(0, 0, 255)),
        "navy" => Some(RGBColor(0, 0, 128)),
        "yellow" => Some(RGBColor(255, 255, 0)),
        "cyan" | "aqua" => Some(RGBColor(0, 255, 255)),
        "magenta" | "fuchsia" => Some(RGBColor(255, 0, 255)),
        "orange" => Some(RGBColor(255, 165, 0)),
        "purple" => Some(RGBColor(128, 0, 128)),
        "pink" => Some(RGBColor(255, 192, 203)),
        "brown" => Some(RGBColor(139, 69, 19)),
        "teal" => Some(RGBColor(0, 128, 128)),
        "olive" => Some(RGBColor(128, 128, 0)),
        "maroon" => Some(RGBColor(128, 0, 0)),
        "silver" => Some(RGBColor(192, 192, 192)),
        "gray" | "grey" => Some(RGBColor(128, 128, 128)),
        "darkgray" | "darkgrey" => Some(RGBColor(64, 64, 64)),
        "lightgray" | "lightgrey" => Some(RGBColor(211, 211, 211)),
        _ => None,
    }
}

/// Parse hex color (#RRGGBB or #RGB)
fn parse_hex_color(hex: &str) -> Option<RGBColor> {
    let hex = hex.trim_start_matches('#');
    if !hex.is_ascii() {
        return None;
    }
    match hex.len() {
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some(RGBColor(r, g, b))
        }
        3 => {
            let r = u8::from_str_radix(&hex[0..1], 16).ok()? * 17;
            let g = u8::from_str_radix(&hex[1..2], 16).ok()? * 17;
            let b = u8::from_str_radix(&hex[2..3], 16).ok()? * 17;
            Some(RGBColor(r, g, b))
        }
        _ => None,
    }
}

/// True for the literal `none`, which both backends treat as "no paint".
pub fn is_none_color(color_str: &str) -> bool {
    color_str.trim().eq_ignore_ascii_case("none")
}

// === Palette ===

/// Maps a category index to its color.
///
/// Explicit colors cycle when there are more categories than colors. Without
/// explicit colors a label that is itself a color is used verbatim.
#[derive(Debug, Clone, Default)]
pub struct Palette {
    colors: Vec<String>,
}

impl Palette {
    pub fn new(colors: &[String]) -> Self {
        Palette {
            colors: colors.to_vec(),
        }
    }

    pub fn color_for(&self, index: usize, label: Option<&str>) -> String {
        if !self.colors.is_empty() {
            return self.colors[index % self.colors.len()].clone();
        }
        match label {
            Some(label) if parse_color(label).is_some() => label.to_string(),
            _ => DEFAULT_COLOR.to_string(),
        }
    }
}
