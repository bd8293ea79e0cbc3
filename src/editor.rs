//! Editor Client
//!
//! Ties the batch queue, the event processor and the renderer together.
//! Each tick drains every pending batch, applies it, advances the cursor
//! and hands a frame to the draw sink. Outbound requests (resize, keys,
//! mouse) go through a `UiClient`.

use std::time::Duration;

use tracing::{debug, trace};

use crate::app::Config;
use crate::core::{Cursor, Grid, HighlightTable};
use crate::redraw::{BatchReceiver, EventProcessor, UiState};
use crate::render::{CellMetrics, DrawSink, GlyphSource, Renderer};

/// Mouse button of a mouse input request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Wheel,
}

impl MouseButton {
    pub fn as_str(self) -> &'static str {
        match self {
            MouseButton::Left => "left",
            MouseButton::Right => "right",
            MouseButton::Middle => "middle",
            MouseButton::Wheel => "wheel",
        }
    }
}

/// What happened to the button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseAction {
    Press,
    Drag,
    Release,
    /// Wheel directions, only valid with `MouseButton::Wheel`
    Up,
    Down,
    Left,
    Right,
}

impl MouseAction {
    pub fn as_str(self) -> &'static str {
        match self {
            MouseAction::Press => "press",
            MouseAction::Drag => "drag",
            MouseAction::Release => "release",
            MouseAction::Up => "up",
            MouseAction::Down => "down",
            MouseAction::Left => "left",
            MouseAction::Right => "right",
        }
    }
}

/// Mouse input forwarded to the editor, in grid coordinates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MouseInput {
    pub button: MouseButton,
    pub action: MouseAction,
    /// Modifier prefix such as `"C"` or `"S-A"`, empty for none
    pub modifiers: String,
    pub row: usize,
    pub col: usize,
}

/// Outbound side of the editor connection
pub trait UiClient {
    /// Ask the editor to resize its grid
    fn resize(&mut self, rows: usize, cols: usize);
    /// Send keys in the editor's key notation
    fn send_keys(&mut self, keys: &str);
    fn send_mouse(&mut self, input: &MouseInput);
}

/// What one tick did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Batches drained from the queue
    pub batches: usize,
    /// Events applied
    pub applied: usize,
    /// Events skipped as malformed or unknown
    pub skipped: usize,
    /// Vertices handed to the sink, 0 if nothing was drawn
    pub vertices: usize,
    /// The sink had to reallocate its buffer
    pub reallocated: bool,
}

/// The grid client: UI state, renderer and editor connection
pub struct Editor<G, C> {
    state: UiState,
    renderer: Renderer<G>,
    client: C,
    events: BatchReceiver,
    /// The last applied event was a flush
    consistent: bool,
    /// A resize was requested and its grid_resize has not arrived yet
    waiting_resize: bool,
}

impl<G: GlyphSource, C: UiClient> Editor<G, C> {
    pub fn new(config: &Config, glyphs: G, client: C, events: BatchReceiver) -> Self {
        let grid = Grid::new(config.rows, config.cols);
        let highlights = HighlightTable::new(config.colors.into());
        let cursor = Cursor::new(config.cursor.animation_time, config.cursor.blink);
        let metrics = CellMetrics::new(config.cell_width, config.cell_height);
        Self {
            state: UiState::new(grid, highlights, cursor),
            renderer: Renderer::new(glyphs, metrics).with_background_alpha(config.transparency),
            client,
            events,
            consistent: true,
            waiting_resize: false,
        }
    }

    pub fn state(&self) -> &UiState {
        &self.state
    }

    pub fn renderer(&self) -> &Renderer<G> {
        &self.renderer
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn client_mut(&mut self) -> &mut C {
        &mut self.client
    }

    pub fn is_waiting_resize(&self) -> bool {
        self.waiting_resize
    }

    /// The last applied event was a flush, so the grid is safe to draw
    pub fn is_consistent(&self) -> bool {
        self.consistent
    }

    /// The producer is gone and every batch it sent was applied
    pub fn is_closed(&self) -> bool {
        self.events.is_closed()
    }

    /// Run one tick: apply pending batches, animate, render
    pub fn tick(&mut self, dt: Duration, sink: &mut impl DrawSink) -> TickReport {
        let mut report = TickReport::default();
        for batch in self.events.drain() {
            report.batches += 1;
            let outcome = EventProcessor::new(&mut self.state).apply_batch(&batch);
            report.applied += outcome.applied;
            report.skipped += outcome.skipped;
            if !batch.is_empty() {
                self.consistent = outcome.ends_with_flush;
            }
            if let Some((rows, cols)) = outcome.resized {
                if self.waiting_resize {
                    debug!(rows, cols, "resize acknowledged");
                }
                self.waiting_resize = false;
            }
        }

        if self.waiting_resize {
            return report;
        }

        self.state.cursor.advance(dt.as_secs_f32());
        if !self.consistent {
            trace!("batch still open, skipping render");
            return report;
        }

        let UiState {
            grid,
            highlights,
            cursor,
            ..
        } = &mut self.state;
        let frame = self.renderer.build_frame(grid, highlights, cursor);
        if !frame.is_empty() {
            sink.upload(&frame.vertices, frame.size_changed);
            sink.draw(frame.vertices.len());
            report.vertices = frame.vertices.len();
            report.reallocated = frame.size_changed;
        }
        report
    }

    /// Grid size that fits a window of `width` x `height` pixels
    pub fn grid_size_for_window(&self, width: u32, height: u32) -> (usize, usize) {
        let metrics = self.renderer.metrics();
        let rows = (height as f32 / metrics.height).floor().max(1.0) as usize;
        let cols = (width as f32 / metrics.width).floor().max(1.0) as usize;
        (rows, cols)
    }

    /// Cell under a pixel position, clamped to the grid
    pub fn cell_at_pixel(&self, x: f32, y: f32) -> (usize, usize) {
        let metrics = self.renderer.metrics();
        let grid = &self.state.grid;
        let row = (y / metrics.height).floor().max(0.0) as usize;
        let col = (x / metrics.width).floor().max(0.0) as usize;
        (
            row.min(grid.rows().saturating_sub(1)),
            col.min(grid.cols().saturating_sub(1)),
        )
    }

    /// Ask the editor for a new grid size. Rendering pauses until the
    /// editor answers with a grid_resize.
    pub fn request_resize(&mut self, rows: usize, cols: usize) {
        let (rows, cols) = (rows.max(1), cols.max(1));
        if (rows, cols) == (self.state.grid.rows(), self.state.grid.cols()) {
            return;
        }
        debug!(rows, cols, "requesting resize");
        self.client.resize(rows, cols);
        self.waiting_resize = true;
    }

    /// Resize to whatever fits a window of the given pixel size
    pub fn request_resize_for_window(&mut self, width: u32, height: u32) {
        let (rows, cols) = self.grid_size_for_window(width, height);
        self.request_resize(rows, cols);
    }

    /// Change the cell size after a font change. Everything is redrawn.
    pub fn set_cell_metrics(&mut self, metrics: CellMetrics) {
        self.renderer.set_metrics(metrics);
        self.state.grid.mark_all_dirty();
    }

    pub fn send_keys(&mut self, keys: &str) {
        if !keys.is_empty() {
            self.client.send_keys(keys);
        }
    }

    pub fn send_mouse(&mut self, input: MouseInput) {
        self.client.send_mouse(&input);
    }
}
