//! Bar and pie layouts: values map to proportional lengths or angles
//! instead of grid cells.

use crate::layout::{Canvas, Rect};
use crate::style::Palette;
use std::f64::consts::PI;
use tracing::debug;

/// Space between adjacent bars of a group
pub const BAR_SPACING: f64 = 4.0;

/// Largest angular step, in degrees, between sampled arc points
const ARC_STEP_DEGREES: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarSpec {
    /// Bar thickness, also the extra gap between groups
    pub bar_width: f64,
    /// Length of a bar holding the largest value
    pub track_length: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub group: usize,
    pub series: usize,
    pub value: f64,
    pub color: String,
    pub rect: Rect,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarLayout {
    pub bars: Vec<Bar>,
    pub canvas: Canvas,
}

/// Lay out vertical bars growing up from the bottom of the track.
///
/// Bars inside a group sit side by side `BAR_SPACING` apart; each new group
/// starts one extra bar width further right.
pub fn layout_bars(groups: &[Vec<f64>], palette: &Palette, labels: &[String], spec: &BarSpec) -> BarLayout {
    let max = groups
        .iter()
        .flatten()
        .copied()
        .fold(0.0_f64, f64::max);

    let mut bars = Vec::new();
    let mut cursor = 0.0;
    for (group, values) in groups.iter().enumerate() {
        if group > 0 {
            cursor += spec.bar_width;
        }
        for (series, &value) in values.iter().enumerate() {
            let length = if max > 0.0 {
                value / max * spec.track_length
            } else {
                0.0
            };
            bars.push(Bar {
                group,
                series,
                value,
                color: palette.color_for(series, labels.get(series).map(String::as_str)),
                rect: Rect::new(cursor, spec.track_length - length, spec.bar_width, length),
            });
            cursor += spec.bar_width + BAR_SPACING;
        }
    }

    let canvas = bar_canvas(groups, spec).unwrap_or(Canvas::new(u32::MAX, u32::MAX));
    debug!(bars = bars.len(), max, width = canvas.width, height = canvas.height, "bar layout");

    BarLayout { bars, canvas }
}

/// Canvas reaching the right edge of the last bar, or `None` when it does
/// not fit in `u32`
pub fn bar_canvas(groups: &[Vec<f64>], spec: &BarSpec) -> Option<Canvas> {
    let Some(last_group) = groups.iter().rposition(|g| !g.is_empty()) else {
        return Some(Canvas::default());
    };
    let bars: usize = groups.iter().map(Vec::len).sum();
    let width = (bars - 1) as f64 * (spec.bar_width + BAR_SPACING)
        + last_group as f64 * spec.bar_width
        + spec.bar_width;

    let (width, height) = (width.ceil(), spec.track_length.ceil());
    if width > u32::MAX as f64 || height > u32::MAX as f64 {
        return None;
    }
    Some(Canvas::new(width as u32, height as u32))
}

#[derive(Debug, Clone, PartialEq)]
pub struct Wedge {
    pub index: usize,
    pub value: f64,
    pub color: String,
    /// Degrees clockwise from 12 o'clock
    pub start_angle: f64,
    pub sweep: f64,
    /// Closed outline: center followed by the sampled arc
    pub points: Vec<(f64, f64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PieLayout {
    pub wedges: Vec<Wedge>,
    pub canvas: Canvas,
}

/// Split a circle of `diameter` into wedges proportional to `values`, in
/// order, clockwise from the top. Zero values keep their color slot but get
/// no wedge.
pub fn layout_pie(values: &[f64], palette: &Palette, labels: &[String], diameter: f64) -> PieLayout {
    let total: f64 = values.iter().sum();
    let radius = diameter / 2.0;
    let center = (radius, radius);

    let mut wedges = Vec::new();
    let mut start_angle = 0.0;
    if total > 0.0 {
        for (index, &value) in values.iter().enumerate() {
            if value <= 0.0 {
                continue;
            }
            let sweep = value / total * 360.0;
            wedges.push(Wedge {
                index,
                value,
                color: palette.color_for(index, labels.get(index).map(String::as_str)),
                start_angle,
                sweep,
                points: wedge_outline(center, radius, start_angle, sweep),
            });
            start_angle += sweep;
        }
    }

    let canvas = if wedges.is_empty() {
        Canvas::default()
    } else {
        let side = diameter.ceil() as u32;
        Canvas::new(side, side)
    };
    debug!(wedges = wedges.len(), total, "pie layout");

    PieLayout { wedges, canvas }
}

fn wedge_outline(center: (f64, f64), radius: f64, start: f64, sweep: f64) -> Vec<(f64, f64)> {
    let steps = (sweep / ARC_STEP_DEGREES).ceil().max(1.0) as usize;
    let mut points = Vec::with_capacity(steps + 2);
    points.push(center);
    for step in 0..=steps {
        let degrees = start + sweep * step as f64 / steps as f64;
        points.push(point_on_circle(center, radius, degrees));
    }
    points
}

fn point_on_circle(center: (f64, f64), radius: f64, degrees: f64) -> (f64, f64) {
    let radians = degrees * PI / 180.0;
    (center.0 + radius * radians.sin(), center.1 - radius * radians.cos())
}
