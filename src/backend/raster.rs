use super::{write_file, Backend, Renderable, Rendered};
use crate::error::{GraphError, Result};
use crate::style::{is_none_color, parse_color, Style};
use image::{DynamicImage, ImageFormat, ImageOutputFormat, RgbImage};
use plotters::prelude::*;
use std::io::Cursor;
use std::path::Path;
use tracing::warn;

/// Pen paint: either nothing or an RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Paint {
    None,
    Rgb(u8, u8, u8),
}

impl Paint {
    fn from_option(color: Option<&str>) -> Paint {
        match color {
            None => Paint::None,
            Some(c) if is_none_color(c) => Paint::None,
            Some(c) => match parse_color(c) {
                Some(RGBColor(r, g, b)) => Paint::Rgb(r, g, b),
                None => {
                    warn!(color = c, "unknown color, drawing in black");
                    Paint::Rgb(0, 0, 0)
                }
            },
        }
    }

    fn color(self) -> Option<RGBColor> {
        match self {
            Paint::None => None,
            Paint::Rgb(r, g, b) => Some(RGBColor(r, g, b)),
        }
    }
}

/// One imperative command against the canvas. State ops change the pen,
/// shape ops draw with whatever the pen currently holds.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Stroke(Paint),
    Fill(Paint),
    StrokeWidth(u32),
    Line { from: (i32, i32), to: (i32, i32) },
    Circle { center: (i32, i32), radius: i32 },
    Rectangle { top_left: (i32, i32), bottom_right: (i32, i32) },
    Polygon(Vec<(i32, i32)>),
}

#[derive(Debug, Clone, Copy)]
struct Pen {
    stroke: Paint,
    fill: Paint,
    stroke_width: u32,
}

impl Default for Pen {
    fn default() -> Self {
        Pen {
            stroke: Paint::None,
            fill: Paint::None,
            stroke_width: 1,
        }
    }
}

impl Pen {
    fn stroke_style(&self) -> Option<ShapeStyle> {
        self.stroke.color().map(|c| c.stroke_width(self.stroke_width))
    }

    fn fill_style(&self) -> Option<ShapeStyle> {
        self.fill.color().map(|c| c.filled())
    }
}

/// Bitmap canvas. Draw calls queue up as ops and are replayed onto a
/// plotters bitmap buffer when rendering, then encoded with `image`.
#[derive(Debug, Clone)]
pub struct RasterBackend {
    width: u32,
    height: u32,
    format: ImageFormat,
    background: RGBColor,
    ops: Vec<DrawOp>,
}

impl RasterBackend {
    pub fn new(width: u32, height: u32, format: ImageFormat) -> Self {
        RasterBackend {
            width,
            height,
            format,
            background: WHITE,
            ops: Vec::new(),
        }
    }

    pub fn with_background(mut self, color: RGBColor) -> Self {
        self.background = color;
        self
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Pixel size of the encoded image; encoders reject empty images, so
    /// never smaller than 1x1
    pub fn pixel_size(&self) -> (u32, u32) {
        (self.width.max(1), self.height.max(1))
    }

    /// The canvas pen is stateful: every primitive is preceded by the full
    /// pen state so nothing carries over from the previous shape.
    fn apply_style(&mut self, style: &Style) {
        self.ops.push(DrawOp::Stroke(Paint::from_option(style.stroke.as_deref())));
        self.ops.push(DrawOp::Fill(Paint::from_option(style.fill.as_deref())));
        let width = style.stroke_width.unwrap_or(1.0).round().max(1.0) as u32;
        self.ops.push(DrawOp::StrokeWidth(width));
    }

    /// Replay the queued ops into an RGB buffer
    fn rasterize(&self) -> Result<Vec<u8>> {
        let (width, height) = self.pixel_size();
        let len = pixel_buffer_len(width, height).ok_or_else(|| {
            GraphError::Encode(format!("{}x{} pixel buffer overflows", width, height))
        })?;
        let mut buffer = vec![0u8; len];
        {
            let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
            root.fill(&self.background).map_err(draw_error)?;

            let mut pen = Pen::default();
            for op in &self.ops {
                match op {
                    DrawOp::Stroke(paint) => pen.stroke = *paint,
                    DrawOp::Fill(paint) => pen.fill = *paint,
                    DrawOp::StrokeWidth(width) => pen.stroke_width = *width,
                    DrawOp::Line { from, to } => {
                        if let Some(style) = pen.stroke_style() {
                            root.draw(&PathElement::new(vec![*from, *to], style))
                                .map_err(draw_error)?;
                        }
                    }
                    DrawOp::Circle { center, radius } => {
                        if let Some(style) = pen.fill_style() {
                            root.draw(&Circle::new(*center, *radius, style))
                                .map_err(draw_error)?;
                        }
                        if let Some(style) = pen.stroke_style() {
                            root.draw(&Circle::new(*center, *radius, style))
                                .map_err(draw_error)?;
                        }
                    }
                    DrawOp::Rectangle { top_left, bottom_right } => {
                        if let Some(style) = pen.fill_style() {
                            root.draw(&Rectangle::new([*top_left, *bottom_right], style))
                                .map_err(draw_error)?;
                        }
                        if let Some(style) = pen.stroke_style() {
                            root.draw(&Rectangle::new([*top_left, *bottom_right], style))
                                .map_err(draw_error)?;
                        }
                    }
                    DrawOp::Polygon(points) => {
                        if let Some(style) = pen.fill_style() {
                            root.draw(&Polygon::new(points.clone(), style))
                                .map_err(draw_error)?;
                        }
                        if let Some(style) = pen.stroke_style() {
                            let mut outline = points.clone();
                            if let Some(first) = points.first() {
                                outline.push(*first);
                            }
                            root.draw(&PathElement::new(outline, style))
                                .map_err(draw_error)?;
                        }
                    }
                }
            }

            root.present().map_err(draw_error)?;
        }
        Ok(buffer)
    }

    fn encode(&self, format: ImageFormat) -> Result<Vec<u8>> {
        let (width, height) = self.pixel_size();
        let buffer = self.rasterize()?;
        let image = RgbImage::from_raw(width, height, buffer)
            .ok_or_else(|| GraphError::Encode("pixel buffer does not match canvas size".to_string()))?;

        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(image)
            .write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::from(format))
            .map_err(|e| GraphError::Encode(e.to_string()))?;
        Ok(bytes)
    }
}

impl Backend for RasterBackend {
    fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, style: &Style) {
        self.apply_style(style);
        self.ops.push(DrawOp::Line {
            from: pixel(x1, y1),
            to: pixel(x2, y2),
        });
    }

    fn circle(&mut self, cx: f64, cy: f64, radius: f64, style: &Style) {
        self.apply_style(style);
        self.ops.push(DrawOp::Circle {
            center: pixel(cx, cy),
            radius: radius.round() as i32,
        });
    }

    fn rect(&mut self, x: f64, y: f64, width: f64, height: f64, style: &Style) {
        self.apply_style(style);
        self.ops.push(DrawOp::Rectangle {
            top_left: pixel(x, y),
            bottom_right: pixel(x + width, y + height),
        });
    }

    fn polygon(&mut self, points: &[(f64, f64)], style: &Style) {
        self.apply_style(style);
        self.ops.push(DrawOp::Polygon(
            points.iter().map(|&(x, y)| pixel(x, y)).collect(),
        ));
    }
}

impl Renderable for RasterBackend {
    fn render(&self) -> Result<Rendered> {
        Ok(Rendered::Binary(self.encode(self.format)?))
    }

    /// The file extension picks the encoding when it names a supported
    /// format, otherwise the backend's own format is used.
    fn save(&self, path: &Path) -> Result<()> {
        let format = ImageFormat::from_path(path)
            .ok()
            .filter(|f| matches!(f, ImageFormat::Png | ImageFormat::Jpeg | ImageFormat::Gif))
            .unwrap_or(self.format);
        let bytes = self.encode(format)?;
        write_file(path, &bytes)
    }
}

/// Bytes of an RGB buffer for a canvas, counted on the 1x1 minimum
pub fn pixel_buffer_len(width: u32, height: u32) -> Option<usize> {
    let width = usize::try_from(width.max(1)).ok()?;
    let height = usize::try_from(height.max(1)).ok()?;
    width.checked_mul(height)?.checked_mul(3)
}

fn pixel(x: f64, y: f64) -> (i32, i32) {
    (x.round() as i32, y.round() as i32)
}

fn draw_error<E: std::fmt::Display>(e: E) -> GraphError {
    GraphError::Encode(e.to_string())
}
