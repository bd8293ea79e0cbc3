//! Damage-aware vertex batcher
//!
//! Walks the damaged cells of the grid and emits background and glyph quads
//! for them, followed by the cursor overlay. Undamaged cells produce no
//! geometry; the sink keeps whatever it drew last.

use std::collections::HashSet;

use tracing::{trace, warn};
use unicode_width::UnicodeWidthChar;

use super::atlas::{GlyphKey, GlyphSource, UvRect};
use super::vertex::{push_quad, PixelRect, Vertex, QUAD_VERTICES};
use crate::core::{Cell, Cursor, CursorShape, Grid, HighlightTable, Region, ResolvedColors, Rgb};

/// Pixel size of one cell, supplied by the font layer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellMetrics {
    pub width: f32,
    pub height: f32,
}

impl CellMetrics {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Thickness of underline and strikethrough strokes
    fn stroke(&self) -> f32 {
        (self.height / 16.0).round().max(1.0)
    }

    fn cell_rect(&self, row: usize, col: usize, span: usize) -> PixelRect {
        PixelRect::new(
            col as f32 * self.width,
            row as f32 * self.height,
            span as f32 * self.width,
            self.height,
        )
    }
}

/// External consumer of frames
pub trait DrawSink {
    /// Upload vertices. `reallocate` is set when the count differs from the
    /// previous upload, so storage must be resized rather than updated.
    fn upload(&mut self, vertices: &[Vertex], reallocate: bool);

    /// Draw the first `vertex_count` uploaded vertices as a triangle list
    fn draw(&mut self, vertex_count: usize);
}

/// Output of one `build_frame` call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    pub vertices: Vec<Vertex>,
    /// The vertex count differs from the previous non-empty frame
    pub size_changed: bool,
}

impl Frame {
    /// Nothing to draw; the sink should skip the draw call
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn quad_count(&self) -> usize {
        self.vertices.len() / QUAD_VERTICES
    }
}

/// Everything that determines how the cursor looks on screen
#[derive(Debug, Clone, Copy, PartialEq)]
struct CursorOverlay {
    rect: PixelRect,
    fill: Rgb,
    alpha: f32,
    /// Glyph re-drawn on top of a settled block cursor, with its color
    glyph: Option<(GlyphKey, Rgb)>,
    /// Cells the overlay paints over
    covers: Region,
}

/// Builds vertex frames from grid damage and cursor state
pub struct Renderer<G> {
    glyphs: G,
    metrics: CellMetrics,
    background_alpha: f32,
    /// Vertex count of the last non-empty frame
    last_vertex_count: usize,
    drawn_cursor: Option<CursorOverlay>,
    /// Glyph keys already reported as missing
    missing_glyphs: HashSet<GlyphKey>,
}

impl<G: GlyphSource> Renderer<G> {
    pub fn new(glyphs: G, metrics: CellMetrics) -> Self {
        Self {
            glyphs,
            metrics,
            background_alpha: 1.0,
            last_vertex_count: 0,
            drawn_cursor: None,
            missing_glyphs: HashSet::new(),
        }
    }

    /// Set the alpha of background quads, clamped to `0..=1`
    pub fn with_background_alpha(mut self, alpha: f32) -> Self {
        self.background_alpha = alpha.clamp(0.0, 1.0);
        self
    }

    pub fn background_alpha(&self) -> f32 {
        self.background_alpha
    }

    pub fn metrics(&self) -> CellMetrics {
        self.metrics
    }

    /// Change the cell size. The caller must damage the whole grid.
    pub fn set_metrics(&mut self, metrics: CellMetrics) {
        self.metrics = metrics;
        self.drawn_cursor = None;
    }

    pub fn glyphs(&self) -> &G {
        &self.glyphs
    }

    pub fn glyphs_mut(&mut self) -> &mut G {
        &mut self.glyphs
    }

    /// Build the vertices for everything that changed since the last frame
    /// and clear the grid's damage.
    ///
    /// Returns an empty frame when no cell is damaged and the cursor looks
    /// the same as when it was last drawn.
    pub fn build_frame(
        &mut self,
        grid: &mut Grid,
        highlights: &HighlightTable,
        cursor: &Cursor,
    ) -> Frame {
        let overlay = self.cursor_overlay(grid, highlights, cursor);
        let cursor_changed = overlay != self.drawn_cursor;
        if cursor_changed {
            if let Some(prev) = self.drawn_cursor.take() {
                for row in prev.covers.top..prev.covers.bottom {
                    for col in prev.covers.left..prev.covers.right {
                        grid.mark_cell_dirty(row, col);
                    }
                }
            }
        }

        if !grid.is_dirty() && !cursor_changed {
            return Frame::default();
        }

        let mut vertices = Vec::with_capacity(self.last_vertex_count);
        let dirty: Vec<usize> = grid.dirty_rows().collect();
        for &row in &dirty {
            self.push_row(&mut vertices, grid, highlights, row);
        }
        if let Some(overlay) = &overlay {
            self.push_cursor(&mut vertices, overlay);
        }

        grid.mark_clean();
        self.drawn_cursor = overlay;

        if vertices.is_empty() {
            return Frame::default();
        }
        let size_changed = vertices.len() != self.last_vertex_count;
        self.last_vertex_count = vertices.len();
        trace!(
            rows = dirty.len(),
            vertices = vertices.len(),
            size_changed,
            "frame built"
        );
        Frame {
            vertices,
            size_changed,
        }
    }

    fn push_row(
        &mut self,
        out: &mut Vec<Vertex>,
        grid: &Grid,
        highlights: &HighlightTable,
        row: usize,
    ) {
        let Some(cells) = grid.row(row).map(|r| r.cells.as_slice()) else {
            return;
        };
        let mut col = 0;
        while col < cells.len() {
            let cell = cells[col];
            let wide = cell.ch.and_then(|ch| ch.width()) == Some(2) && col + 1 < cells.len();
            let span = if wide { 2 } else { 1 };
            if cells[col..col + span].iter().any(|c| c.needs_redraw) {
                let colors = highlights.resolve(cell.hl_id);
                let bg = colors.background.to_f32(self.background_alpha);
                push_quad(out, self.metrics.cell_rect(row, col, 1), None, bg);
                if wide {
                    let next = highlights.resolve(cells[col + 1].hl_id);
                    let next_bg = next.background.to_f32(self.background_alpha);
                    push_quad(out, self.metrics.cell_rect(row, col + 1, 1), None, next_bg);
                }
                self.push_foreground(out, &cell, &colors, row, col, span);
            }
            col += span;
        }
    }

    fn push_foreground(
        &mut self,
        out: &mut Vec<Vertex>,
        cell: &Cell,
        colors: &ResolvedColors,
        row: usize,
        col: usize,
        span: usize,
    ) {
        let rect = self.metrics.cell_rect(row, col, span);
        if let Some(ch) = cell.ch.filter(|_| cell.has_glyph()) {
            let key = GlyphKey {
                ch,
                bold: colors.bold,
                italic: colors.italic,
            };
            if let Some(uv) = self.lookup(key) {
                push_quad(out, rect, Some(uv), colors.foreground.to_f32(1.0));
            }
        }

        let stroke = self.metrics.stroke();
        let special = colors.special.to_f32(1.0);
        if colors.underline {
            let y = rect.y + rect.h - stroke;
            push_quad(out, PixelRect::new(rect.x, y, rect.w, stroke), None, special);
        }
        if colors.strikethrough {
            let y = rect.y + ((rect.h - stroke) / 2.0).floor();
            push_quad(out, PixelRect::new(rect.x, y, rect.w, stroke), None, special);
        }
    }

    fn lookup(&mut self, key: GlyphKey) -> Option<UvRect> {
        let uv = self.glyphs.glyph_uv(key.ch, key.bold, key.italic);
        if uv.is_none() && self.missing_glyphs.insert(key) {
            warn!(ch = ?key.ch, bold = key.bold, italic = key.italic, "glyph not available");
        }
        uv
    }

    fn cursor_overlay(
        &self,
        grid: &Grid,
        highlights: &HighlightTable,
        cursor: &Cursor,
    ) -> Option<CursorOverlay> {
        if !cursor.visible || grid.rows() == 0 || grid.cols() == 0 {
            return None;
        }

        let CellMetrics { width, height } = self.metrics;
        let (vrow, vcol) = cursor.visual_position();
        let (x, y) = (vcol * width, vrow * height);

        // reverse video of the cursor highlight
        let colors = highlights.resolve(cursor.hl_id);
        let mut span = 1;
        let glyph = match grid.cell(cursor.row, cursor.col) {
            Some(cell)
                if cursor.shape == CursorShape::Block
                    && !cursor.is_animating()
                    && cell.has_glyph() =>
            {
                let under = highlights.resolve(cell.hl_id);
                cell.ch.map(|ch| {
                    if ch.width() == Some(2) && cursor.col + 1 < grid.cols() {
                        span = 2;
                    }
                    let key = GlyphKey {
                        ch,
                        bold: under.bold,
                        italic: under.italic,
                    };
                    (key, colors.background)
                })
            },
            _ => None,
        };

        let pct = f32::from(cursor.cell_percentage.clamp(1, 100)) / 100.0;
        let rect = match cursor.shape {
            CursorShape::Block => PixelRect::new(x, y, width * span as f32, height),
            CursorShape::Vertical => PixelRect::new(x, y, (width * pct).max(1.0), height),
            CursorShape::Horizontal => {
                let h = (height * pct).max(1.0);
                PixelRect::new(x, y + height - h, width, h)
            },
        };

        let covers = Region::new(
            (rect.y / height).floor().max(0.0) as usize,
            ((rect.y + rect.h) / height).ceil().max(0.0) as usize,
            (rect.x / width).floor().max(0.0) as usize,
            ((rect.x + rect.w) / width).ceil().max(0.0) as usize,
        )
        .clipped(grid.rows(), grid.cols());

        Some(CursorOverlay {
            rect,
            fill: colors.foreground,
            alpha: cursor.blink_alpha(),
            glyph,
            covers,
        })
    }

    fn push_cursor(&mut self, out: &mut Vec<Vertex>, overlay: &CursorOverlay) {
        push_quad(out, overlay.rect, None, overlay.fill.to_f32(overlay.alpha));
        if let Some((key, color)) = overlay.glyph {
            if overlay.alpha > 0.0 {
                if let Some(uv) = self.lookup(key) {
                    push_quad(out, overlay.rect, Some(uv), color.to_f32(overlay.alpha));
                }
            }
        }
    }
}
