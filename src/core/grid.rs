//! Cell Grid
//!
//! A 2D grid of cells representing the visible character matrix, plus the
//! per-row damage flags the renderer consumes.

use serde::{Deserialize, Serialize};

use super::cell::Cell;

/// A row of cells in the grid
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Row {
    /// The cells in this row
    pub cells: Vec<Cell>,
    /// Whether any cell in this row changed since the last render pass
    pub dirty: bool,
}

impl Row {
    pub fn new(cols: usize) -> Self {
        Self {
            cells: vec![Cell::default(); cols],
            dirty: false,
        }
    }

    /// A row whose every cell still has to be drawn
    fn damaged(cols: usize) -> Self {
        let mut row = Self::new(cols);
        row.damage_span(0, cols);
        row
    }

    fn damage_span(&mut self, start: usize, end: usize) {
        let end = end.min(self.cells.len());
        if start >= end {
            return;
        }
        for cell in &mut self.cells[start..end] {
            cell.needs_redraw = true;
        }
        self.dirty = true;
    }

    /// Reset cells in `start..end` to blank default cells
    fn clear_span(&mut self, start: usize, end: usize) {
        let end = end.min(self.cells.len());
        for cell in self.cells.iter_mut().take(end).skip(start) {
            cell.clear();
        }
        self.dirty = true;
    }

    /// The row's characters, blanks rendered as spaces and trailing blanks trimmed
    pub fn text(&self) -> String {
        let text: String = self.cells.iter().map(|c| c.ch.unwrap_or(' ')).collect();
        text.trim_end().to_string()
    }
}

/// Rectangular region `[top, bottom) x [left, right)` of the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub top: usize,
    pub bottom: usize,
    pub left: usize,
    pub right: usize,
}

impl Region {
    pub fn new(top: usize, bottom: usize, left: usize, right: usize) -> Self {
        Self {
            top,
            bottom,
            left,
            right,
        }
    }

    /// Clip the region to a `rows x cols` grid
    pub fn clipped(self, rows: usize, cols: usize) -> Self {
        let bottom = self.bottom.min(rows);
        let right = self.right.min(cols);
        Self {
            top: self.top.min(bottom),
            bottom,
            left: self.left.min(right),
            right,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.top >= self.bottom || self.left >= self.right
    }

    pub fn height(&self) -> usize {
        self.bottom.saturating_sub(self.top)
    }
}

/// The grid - a 2D array of cells stored row-major
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grid {
    /// The rows in the grid
    rows: Vec<Row>,
    /// Number of columns
    cols: usize,
    /// Number of rows
    num_rows: usize,
}

impl Grid {
    /// Create a blank grid. Nothing is damaged until content is written.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows: (0..rows).map(|_| Row::new(cols)).collect(),
            cols,
            num_rows: rows,
        }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.num_rows
    }

    /// Total number of cells, always `rows * cols`
    pub fn cell_count(&self) -> usize {
        self.rows.iter().map(|r| r.cells.len()).sum()
    }

    /// Get a reference to a cell
    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.rows.get(row).and_then(|r| r.cells.get(col))
    }

    /// Get a reference to a row
    pub fn row(&self, row: usize) -> Option<&Row> {
        self.rows.get(row)
    }

    /// Write a cell and damage it. Returns false if out of bounds.
    pub fn set_cell(&mut self, row: usize, col: usize, ch: Option<char>, hl_id: u64) -> bool {
        match self.rows.get_mut(row) {
            Some(r) if col < r.cells.len() => {
                r.cells[col].set(ch, hl_id);
                r.dirty = true;
                true
            },
            _ => false,
        }
    }

    /// Resize the grid, keeping the overlapping top-left region.
    ///
    /// Cells that did not exist before are damaged. Returns false (and
    /// touches nothing) when the size is unchanged.
    pub fn resize(&mut self, rows: usize, cols: usize) -> bool {
        if rows == self.num_rows && cols == self.cols {
            return false;
        }

        self.rows.truncate(rows);
        for row in &mut self.rows {
            let old_cols = row.cells.len();
            row.cells.resize(cols, Cell::default());
            row.damage_span(old_cols, cols);
        }
        while self.rows.len() < rows {
            self.rows.push(Row::damaged(cols));
        }

        self.cols = cols;
        self.num_rows = rows;
        true
    }

    /// Reset every cell to blank default and damage every row
    pub fn clear(&mut self) {
        let cols = self.cols;
        for row in &mut self.rows {
            row.clear_span(0, cols);
        }
    }

    /// Shift the contents of `region` vertically by `delta` rows.
    ///
    /// Positive deltas move text up (row `i` receives row `i + delta`),
    /// negative deltas move it down. Rows vacated inside the region are
    /// cleared, and the whole region is damaged. The region is clipped to the
    /// grid first so nothing outside the grid or the region is touched.
    pub fn scroll(&mut self, region: Region, delta: i64) {
        let region = region.clipped(self.num_rows, self.cols);
        if region.is_empty() || delta == 0 {
            return;
        }

        let Region {
            top,
            bottom,
            left,
            right,
        } = region;
        let shift = usize::try_from(delta.unsigned_abs()).unwrap_or(usize::MAX);
        let height = region.height();

        if delta > 0 {
            if shift < height {
                for dst in top..bottom - shift {
                    self.copy_span(dst + shift, dst, left, right);
                }
            }
            for row in bottom.saturating_sub(shift).max(top)..bottom {
                self.rows[row].clear_span(left, right);
            }
        } else {
            if shift < height {
                for dst in (top + shift..bottom).rev() {
                    self.copy_span(dst - shift, dst, left, right);
                }
            }
            for row in top..top.saturating_add(shift).min(bottom) {
                self.rows[row].clear_span(left, right);
            }
        }

        for row in &mut self.rows[top..bottom] {
            row.damage_span(left, right);
        }
    }

    fn copy_span(&mut self, src: usize, dst: usize, left: usize, right: usize) {
        if src == dst {
            return;
        }
        let (src_row, dst_row) = if src < dst {
            let (head, tail) = self.rows.split_at_mut(dst);
            (&head[src], &mut tail[0])
        } else {
            let (head, tail) = self.rows.split_at_mut(src);
            (&tail[0], &mut head[dst])
        };
        dst_row.cells[left..right].copy_from_slice(&src_row.cells[left..right]);
    }

    /// Check if any row needs a redraw
    pub fn is_dirty(&self) -> bool {
        self.rows.iter().any(|r| r.dirty)
    }

    /// Check if a single row needs a redraw
    pub fn is_row_dirty(&self, row: usize) -> bool {
        self.rows.get(row).is_some_and(|r| r.dirty)
    }

    /// Indices of rows that need a redraw
    pub fn dirty_rows(&self) -> impl Iterator<Item = usize> + '_ {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, r)| r.dirty)
            .map(|(i, _)| i)
    }

    /// Damage a single cell without changing its content
    pub fn mark_cell_dirty(&mut self, row: usize, col: usize) {
        if let Some(r) = self.rows.get_mut(row) {
            r.damage_span(col, col + 1);
        }
    }

    /// Damage every cell
    pub fn mark_all_dirty(&mut self) {
        let cols = self.cols;
        for row in &mut self.rows {
            row.damage_span(0, cols);
        }
    }

    /// Clear all damage after a render pass consumed it
    pub fn mark_clean(&mut self) {
        for row in self.rows.iter_mut().filter(|r| r.dirty) {
            row.dirty = false;
            for cell in &mut row.cells {
                cell.needs_redraw = false;
            }
        }
    }
}
