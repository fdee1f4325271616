//! Shape drawers: turn one cell interior into primitive draw calls.

use crate::backend::{Backend, TextGrid};
use crate::layout::{GridLayout, Rect};
use crate::style::Style;

/// Glyphs used for text output when no symbols are configured
pub const GLYPHS: [char; 8] = ['#', '*', 'o', '+', 'x', '@', '%', '='];

/// Pictogram shape drawn once per counted item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Circle,
    Cross,
    Manikin,
}

impl Shape {
    pub fn draw(&self, backend: &mut dyn Backend, area: Rect, color: &str) {
        match self {
            Shape::Circle => draw_circle(backend, area, color),
            Shape::Cross => draw_cross(backend, area, color),
            Shape::Manikin => draw_manikin(backend, area, color),
        }
    }
}

/// Filled circle centered in the area, touching its shorter side
pub fn draw_circle(backend: &mut dyn Backend, area: Rect, color: &str) {
    let (cx, cy) = area.center();
    let radius = area.width.min(area.height) / 2.0;
    backend.circle(cx, cy, radius, &Style::fill(color).with_class("circle"));
}

/// Two diagonals, top-left to bottom-right first
pub fn draw_cross(backend: &mut dyn Backend, area: Rect, color: &str) {
    let style = Style::stroke(color).with_class("cross");
    backend.line(area.x, area.y, area.right(), area.bottom(), &style);
    backend.line(area.x, area.bottom(), area.right(), area.y, &style);
}

/// Stick figure: head, body, two arms and two legs, scaled to the area
pub fn draw_manikin(backend: &mut dyn Backend, area: Rect, color: &str) {
    let Rect { x, y, width: w, height: h } = area;
    let cx = x + w / 2.0;

    let head_radius = w.min(h) * 0.15;
    let neck = y + 2.0 * head_radius;
    let shoulders = neck + h * 0.08;
    let hips = y + h * 0.62;
    let stroke_width = (w.min(h) / 12.0).max(1.0);

    backend.circle(cx, y + head_radius, head_radius, &Style::fill(color).with_class("manikin"));

    let limb = Style::stroke(color)
        .with_stroke_width(stroke_width)
        .with_class("manikin");
    backend.line(cx, neck, cx, hips, &limb);
    backend.line(cx, shoulders, x + w * 0.15, y + h * 0.55, &limb);
    backend.line(cx, shoulders, x + w * 0.85, y + h * 0.55, &limb);
    backend.line(cx, hips, x + w * 0.25, y + h, &limb);
    backend.line(cx, hips, x + w * 0.75, y + h, &limb);
}

/// Glyph for a category: configured symbol if any, else the glyph table
pub fn symbol_for(category: usize, symbols: &[String]) -> char {
    if !symbols.is_empty() {
        if let Some(c) = symbols[category % symbols.len()].chars().next() {
            return c;
        }
    }
    GLYPHS[category % GLYPHS.len()]
}

/// Write one glyph per placed item at its (row, col)
pub fn draw_symbols(layout: &GridLayout, symbols: &[String]) -> TextGrid {
    let mut grid = TextGrid::new();
    for item in &layout.items {
        grid.put(item.row, item.col, symbol_for(item.category, symbols));
    }
    grid
}
