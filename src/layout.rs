//! Grid layout for count pictograms.
//!
//! Categories are flattened into one item per unit of count, in category
//! order, and placed row-major into cells of `item_width` × `item_height`.
//! Each cell is then inset to give the drawable interior a shape is drawn in.

use crate::data::CategoryDatum;
use crate::style::Palette;
use tracing::debug;

/// Inset applied on every side of a cell before any configurable margin
pub const BASE_INSET: f64 = 4.0;

/// Axis-aligned rectangle in canvas units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Rect { x, y, width, height }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Shrink by `amount` on every side, never below zero size
    pub fn inset(&self, amount: f64) -> Rect {
        let width = (self.width - 2.0 * amount).max(0.0);
        let height = (self.height - 2.0 * amount).max(0.0);
        Rect {
            x: self.x + amount.min(self.width / 2.0),
            y: self.y + amount.min(self.height / 2.0),
            width,
            height,
        }
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x - 1e-9 && x <= self.right() + 1e-9 && y >= self.y - 1e-9 && y <= self.bottom() + 1e-9
    }
}

/// Final canvas dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Canvas { width, height }
    }

    /// Canvas from exact sizes, `None` when a side does not fit in `u32`
    pub fn checked(width: u64, height: u64) -> Option<Self> {
        Some(Canvas::new(u32::try_from(width).ok()?, u32::try_from(height).ok()?))
    }

    /// Explicit sizes replace the computed ones outright
    pub fn with_override(self, width: Option<u32>, height: Option<u32>) -> Self {
        Canvas {
            width: width.unwrap_or(self.width),
            height: height.unwrap_or(self.height),
        }
    }
}

/// Grid parameters taken from the graph options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSpec {
    pub columns: Option<usize>,
    pub item_width: u32,
    pub item_height: u32,
}

/// One item assigned to a grid cell
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedItem {
    pub category: usize,
    pub color: String,
    pub row: usize,
    pub col: usize,
    pub cell: Rect,
}

impl PlacedItem {
    /// Drawable interior: the base inset plus any extra margin
    pub fn interior(&self, inner_margin: f64) -> Rect {
        self.cell.inset(BASE_INSET + inner_margin)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridLayout {
    pub items: Vec<PlacedItem>,
    pub canvas: Canvas,
    pub columns: usize,
    pub rows: usize,
}

/// Column count actually used for wrapping `total` items
fn wrap_columns(total: usize, spec: &GridSpec) -> usize {
    match spec.columns {
        Some(c) if c >= 1 => c,
        _ => total.max(1),
    }
}

/// Canvas holding `total` items, or `None` when it does not fit in `u32`
pub fn grid_canvas(total: usize, spec: &GridSpec) -> Option<Canvas> {
    if total == 0 {
        return Some(Canvas::default());
    }
    let columns = wrap_columns(total, spec);
    let rows = total.div_ceil(columns) as u64;
    let used_columns = columns.min(total) as u64;
    Canvas::checked(
        used_columns.checked_mul(u64::from(spec.item_width))?,
        rows.checked_mul(u64::from(spec.item_height))?,
    )
}

/// Place every unit of every category into the grid.
///
/// Sizes whose canvas overflows `u32` are refused by `Graph::new`; called
/// directly, such a grid gets a saturated canvas.
pub fn layout_grid(data: &[CategoryDatum], palette: &Palette, spec: &GridSpec) -> GridLayout {
    let total = data
        .iter()
        .fold(0usize, |acc, d| acc.saturating_add(usize::try_from(d.count).unwrap_or(usize::MAX)));
    let columns = wrap_columns(total, spec);

    let item_width = spec.item_width as f64;
    let item_height = spec.item_height as f64;

    let mut items = Vec::with_capacity(total);
    for (category, datum) in data.iter().enumerate() {
        let color = palette.color_for(category, Some(&datum.label));
        for _ in 0..datum.count {
            let index = items.len();
            let row = index / columns;
            let col = index % columns;
            items.push(PlacedItem {
                category,
                color: color.clone(),
                row,
                col,
                cell: Rect::new(col as f64 * item_width, row as f64 * item_height, item_width, item_height),
            });
        }
    }

    let (rows, used_columns) = if total == 0 {
        (0, 0)
    } else {
        (total.div_ceil(columns), columns.min(total))
    };

    let canvas = grid_canvas(total, spec).unwrap_or(Canvas::new(u32::MAX, u32::MAX));
    debug!(items = total, columns, rows, width = canvas.width, height = canvas.height, "grid layout");

    GridLayout {
        items,
        canvas,
        columns: used_columns,
        rows,
    }
}
