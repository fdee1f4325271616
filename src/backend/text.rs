use super::{Renderable, Rendered};
use crate::error::Result;

/// Character grid for text output. Cells that were never written are blank.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextGrid {
    rows: Vec<Vec<char>>,
}

impl TextGrid {
    pub fn new() -> Self {
        TextGrid::default()
    }

    pub fn put(&mut self, row: usize, col: usize, glyph: char) {
        if self.rows.len() <= row {
            self.rows.resize_with(row + 1, Vec::new);
        }
        let cells = &mut self.rows[row];
        if cells.len() <= col {
            cells.resize(col + 1, ' ');
        }
        cells[col] = glyph;
    }

    pub fn glyph_count(&self) -> usize {
        self.rows
            .iter()
            .flatten()
            .filter(|c| !c.is_whitespace())
            .count()
    }

    pub fn to_text(&self) -> String {
        self.rows
            .iter()
            .map(|row| row.iter().collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Renderable for TextGrid {
    fn render(&self) -> Result<Rendered> {
        Ok(Rendered::Text(self.to_text()))
    }
}
