// Drawing backends
//
// Shapes talk to `Backend` only; `Renderable` covers the output side.

pub mod raster;
pub mod text;
pub mod vector;

pub use raster::RasterBackend;
pub use text::TextGrid;
pub use vector::VectorBackend;

use crate::error::{GraphError, Result};
use crate::style::Style;
use std::fs;
use std::path::Path;
use tracing::info;

/// Primitive drawing contract shared by the vector and raster targets.
pub trait Backend {
    fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, style: &Style);
    fn circle(&mut self, cx: f64, cy: f64, radius: f64, style: &Style);
    fn rect(&mut self, x: f64, y: f64, width: f64, height: f64, style: &Style);
    /// Closed filled outline; only pie wedges need it
    fn polygon(&mut self, points: &[(f64, f64)], style: &Style);
}

/// Encoded output of a finished drawing
#[derive(Debug, Clone, PartialEq)]
pub enum Rendered {
    Text(String),
    Binary(Vec<u8>),
}

impl Rendered {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Rendered::Text(text) => text.as_bytes(),
            Rendered::Binary(bytes) => bytes,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Rendered::Text(text) => Some(text),
            Rendered::Binary(_) => None,
        }
    }
}

pub trait Renderable {
    fn render(&self) -> Result<Rendered>;

    fn save(&self, path: &Path) -> Result<()> {
        let rendered = self.render()?;
        write_file(path, rendered.as_bytes())
    }
}

pub(crate) fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    fs::write(path, bytes).map_err(|e| GraphError::io(path, e))?;
    info!(path = %path.display(), bytes = bytes.len(), "saved graph");
    Ok(())
}

/// A graphical backend chosen by output kind.
#[derive(Debug, Clone)]
pub enum GraphicBackend {
    Vector(VectorBackend),
    Raster(RasterBackend),
}

impl Backend for GraphicBackend {
    fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, style: &Style) {
        match self {
            GraphicBackend::Vector(b) => b.line(x1, y1, x2, y2, style),
            GraphicBackend::Raster(b) => b.line(x1, y1, x2, y2, style),
        }
    }

    fn circle(&mut self, cx: f64, cy: f64, radius: f64, style: &Style) {
        match self {
            GraphicBackend::Vector(b) => b.circle(cx, cy, radius, style),
            GraphicBackend::Raster(b) => b.circle(cx, cy, radius, style),
        }
    }

    fn rect(&mut self, x: f64, y: f64, width: f64, height: f64, style: &Style) {
        match self {
            GraphicBackend::Vector(b) => b.rect(x, y, width, height, style),
            GraphicBackend::Raster(b) => b.rect(x, y, width, height, style),
        }
    }

    fn polygon(&mut self, points: &[(f64, f64)], style: &Style) {
        match self {
            GraphicBackend::Vector(b) => b.polygon(points, style),
            GraphicBackend::Raster(b) => b.polygon(points, style),
        }
    }
}

impl Renderable for GraphicBackend {
    fn render(&self) -> Result<Rendered> {
        match self {
            GraphicBackend::Vector(b) => b.render(),
            GraphicBackend::Raster(b) => b.render(),
        }
    }

    fn save(&self, path: &Path) -> Result<()> {
        match self {
            GraphicBackend::Vector(b) => b.save(path),
            GraphicBackend::Raster(b) => b.save(path),
        }
    }
}

/// Whatever a graph drew on: a graphical backend or a text grid.
#[derive(Debug, Clone)]
pub enum Surface {
    Graphic(GraphicBackend),
    Text(TextGrid),
}

impl Renderable for Surface {
    fn render(&self) -> Result<Rendered> {
        match self {
            Surface::Graphic(b) => b.render(),
            Surface::Text(grid) => grid.render(),
        }
    }

    fn save(&self, path: &Path) -> Result<()> {
        match self {
            Surface::Graphic(b) => b.save(path),
            Surface::Text(grid) => grid.save(path),
        }
    }
}

/// Backend that records every call, for layout and drawer tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingBackend {
    pub calls: Vec<Call>,
}

#[cfg(test)]
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    Line(f64, f64, f64, f64, Style),
    Circle(f64, f64, f64, Style),
    Rect(f64, f64, f64, f64, Style),
    Polygon(Vec<(f64, f64)>, Style),
}

#[cfg(test)]
impl Backend for RecordingBackend {
    fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, style: &Style) {
        self.calls.push(Call::Line(x1, y1, x2, y2, style.clone()));
    }

    fn circle(&mut self, cx: f64, cy: f64, radius: f64, style: &Style) {
        self.calls.push(Call::Circle(cx, cy, radius, style.clone()));
    }

    fn rect(&mut self, x: f64, y: f64, width: f64, height: f64, style: &Style) {
        self.calls.push(Call::Rect(x, y, width, height, style.clone()));
    }

    fn polygon(&mut self, points: &[(f64, f64)], style: &Style) {
        self.calls.push(Call::Polygon(points.to_vec(), style.clone()));
    }
}
