//! Grid Cell
//!
//! Represents a single cell in the grid. A cell only stores the id of its
//! highlight; colors are resolved against the highlight table at render time
//! so a later redefinition of the id recolors every cell that uses it.

use serde::{Deserialize, Serialize};

/// Highlight id of the default colors
pub const DEFAULT_HL_ID: u64 = 0;

/// A single cell in the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    /// The character in this cell. `None` for blank cells and for the
    /// continuation cell of a double-width character.
    pub ch: Option<char>,
    /// Highlight id, resolved through the highlight table
    pub hl_id: u64,
    /// Whether this cell changed since the last render pass
    pub needs_redraw: bool,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: None,
            hl_id: DEFAULT_HL_ID,
            needs_redraw: false,
        }
    }
}

impl Cell {
    /// Create a new cell holding a character
    pub fn new(ch: char, hl_id: u64) -> Self {
        Self {
            ch: Some(ch),
            hl_id,
            needs_redraw: false,
        }
    }

    /// Check if this cell is empty (no content)
    pub fn is_empty(&self) -> bool {
        self.ch.is_none()
    }

    /// Whether a glyph has to be drawn for this cell
    pub fn has_glyph(&self) -> bool {
        matches!(self.ch, Some(c) if c != ' ' && !c.is_control())
    }

    /// Overwrite the content, flagging the cell for redraw
    pub fn set(&mut self, ch: Option<char>, hl_id: u64) {
        self.ch = ch;
        self.hl_id = hl_id;
        self.needs_redraw = true;
    }

    /// Reset to an empty default-highlighted cell, flagged for redraw
    pub fn clear(&mut self) {
        self.set(None, DEFAULT_HL_ID);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_default() {
        let cell = Cell::default();
        assert!(cell.is_empty());
        assert_eq!(cell.hl_id, DEFAULT_HL_ID);
        assert!(!cell.needs_redraw);
    }

    #[test]
    fn test_cell_glyph() {
        assert!(Cell::new('A', 1).has_glyph());
        assert!(!Cell::new(' ', 1).has_glyph());
        assert!(!Cell::default().has_glyph());
    }

    #[test]
    fn test_cell_clear() {
        let mut cell = Cell::new('A', 7);
        cell.clear();
        assert!(cell.is_empty());
        assert_eq!(cell.hl_id, DEFAULT_HL_ID);
        assert!(cell.needs_redraw);
    }
}
