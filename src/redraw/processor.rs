//! Event processor
//!
//! Applies decoded redraw events to the UI state, strictly in order. Every
//! event either applies or is skipped with a warning; nothing aborts a batch
//! and nothing can break the grid's size or bounds invariants.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::{debug, trace, warn};

use super::event::{LineCell, RedrawEvent};
use crate::core::{Cursor, Grid, HighlightAttribute, HighlightTable, ModeInfo, ModeTable, Region};

/// Largest grid side a resize may ask for
const MAX_GRID_SIDE: usize = 65535;
/// Largest cell count a resize may ask for
const MAX_GRID_CELLS: usize = 1 << 24;

/// Everything the redraw stream mutates
#[derive(Debug, Clone)]
pub struct UiState {
    pub grid: Grid,
    pub highlights: HighlightTable,
    pub cursor: Cursor,
    pub modes: ModeTable,
    /// Window title requested by the editor
    pub title: String,
    /// UI options (`guifont`, `linespace`, ...) for the presentation layer
    pub options: BTreeMap<String, Value>,
}

impl UiState {
    pub fn new(grid: Grid, highlights: HighlightTable, cursor: Cursor) -> Self {
        Self {
            grid,
            highlights,
            cursor,
            modes: ModeTable::new(),
            title: String::new(),
            options: BTreeMap::new(),
        }
    }
}

/// What applying a batch did, for the tick that drained it
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Events applied
    pub applied: usize,
    /// Events skipped as malformed or unknown
    pub skipped: usize,
    /// The last event was a flush, so the state is consistent
    pub ends_with_flush: bool,
    /// Latest grid size set by a resize event, as (rows, cols)
    pub resized: Option<(usize, usize)>,
}

/// Applies redraw events to a `UiState`
pub struct EventProcessor<'a> {
    state: &'a mut UiState,
    /// Coordinates outside the grid were already reported for this batch
    clamp_reported: bool,
}

impl<'a> EventProcessor<'a> {
    pub fn new(state: &'a mut UiState) -> Self {
        Self {
            state,
            clamp_reported: false,
        }
    }

    /// Apply one batch in arrival order
    pub fn apply_batch(&mut self, batch: &[RedrawEvent]) -> BatchOutcome {
        self.clamp_reported = false;
        let mut outcome = BatchOutcome::default();
        for event in batch {
            let applied = self.apply(event);
            if applied {
                outcome.applied += 1;
            } else {
                outcome.skipped += 1;
            }
            if let (true, RedrawEvent::GridResize { .. }) = (applied, event) {
                outcome.resized = Some((self.state.grid.rows(), self.state.grid.cols()));
            }
            outcome.ends_with_flush = matches!(event, RedrawEvent::Flush);
        }
        outcome
    }

    /// Apply a single event. Returns false if it was skipped.
    pub fn apply(&mut self, event: &RedrawEvent) -> bool {
        match event {
            RedrawEvent::GridResize { rows, cols, .. } => {
                let cells = rows.checked_mul(*cols);
                if *rows > MAX_GRID_SIDE
                    || *cols > MAX_GRID_SIDE
                    || cells.map_or(true, |n| n > MAX_GRID_CELLS)
                {
                    warn!(rows, cols, "skipping grid_resize to an impossible size");
                    return false;
                }
                if self.state.grid.resize(*rows, *cols) {
                    debug!(rows, cols, "grid resized");
                }
                let (row, col) = self.clamp_to_grid(self.state.cursor.row, self.state.cursor.col);
                if (row, col) != (self.state.cursor.row, self.state.cursor.col) {
                    self.state.cursor.set_target(row, col);
                }
            },
            RedrawEvent::DefaultColorsSet { fg, bg, sp } => {
                self.state.highlights.set_default_colors(*fg, *bg, *sp);
                self.state.grid.mark_all_dirty();
            },
            RedrawEvent::HlAttrDefine { id, attrs } => self.define_highlight(*id, attrs),
            RedrawEvent::HlGroupSet { .. } => {},
            RedrawEvent::GridLine {
                row,
                col_start,
                cells,
                ..
            } => return self.grid_line(*row, *col_start, cells),
            RedrawEvent::GridClear { .. } => self.state.grid.clear(),
            RedrawEvent::GridDestroy { .. } => {},
            RedrawEvent::GridCursorGoto { row, col, .. } => {
                let (r, c) = self.clamp_to_grid(*row, *col);
                if (r, c) != (*row, *col) {
                    self.report_clamp("grid_cursor_goto", *row, *col);
                }
                self.state.cursor.set_target(r, c);
            },
            RedrawEvent::GridScroll {
                top,
                bottom,
                left,
                right,
                rows,
                ..
            } => {
                let region = Region::new(*top, *bottom, *left, *right);
                let grid = &self.state.grid;
                if region.clipped(grid.rows(), grid.cols()) != region {
                    self.report_clamp("grid_scroll", *bottom, *right);
                }
                self.state.grid.scroll(region, *rows);
            },
            RedrawEvent::ModeInfoSet {
                cursor_style_enabled,
                modes,
            } => self.mode_info_set(*cursor_style_enabled, modes),
            RedrawEvent::ModeChange { mode, index } => self.mode_change(mode, *index),
            RedrawEvent::BusyStart => self.state.cursor.visible = false,
            RedrawEvent::BusyStop => self.state.cursor.visible = true,
            RedrawEvent::SetTitle(title) => {
                debug!(%title, "title changed");
                self.state.title.clone_from(title);
            },
            RedrawEvent::OptionSet { name, value } => {
                debug!(%name, %value, "ui option set");
                self.state.options.insert(name.clone(), value.clone());
            },
            RedrawEvent::Flush => {},
            RedrawEvent::Ignored(name) => trace!(%name, "ignoring redraw event"),
            RedrawEvent::Unknown(name) => {
                warn!(%name, "skipping unknown redraw event");
                return false;
            },
        }
        true
    }

    fn define_highlight(&mut self, id: u64, attrs: &HighlightAttribute) {
        let highlights = &mut self.state.highlights;
        // a first definition also changes cells drawn with the fallback colors
        let changed = highlights.get(id) != Some(attrs);
        highlights.define(id, attrs.clone());
        if changed {
            // Cells only store the id, so a redefinition recolors them on redraw.
            let grid = &mut self.state.grid;
            for row in 0..grid.rows() {
                for col in 0..grid.cols() {
                    if grid.cell(row, col).is_some_and(|c| c.hl_id == id) {
                        grid.mark_cell_dirty(row, col);
                    }
                }
            }
        }
    }

    /// Write a run of cells, decoding omitted highlight ids and repeats
    fn grid_line(&mut self, row: usize, col_start: usize, cells: &[LineCell]) -> bool {
        let cols = self.state.grid.cols();
        if row >= self.state.grid.rows() || col_start >= cols {
            if !cells.is_empty() {
                self.report_clamp("grid_line", row, col_start);
            }
            return cells.is_empty();
        }

        let mut col = col_start;
        let mut hl_id = 0;
        let mut repeat = 1;
        for cell in cells {
            if let Some(id) = cell.hl_id {
                hl_id = id;
            }
            if let Some(n) = cell.repeat {
                repeat = n;
            }
            let ch = cell.text.chars().next();
            for _ in 0..repeat {
                if col >= cols {
                    self.report_clamp("grid_line", row, col);
                    return true;
                }
                self.state.grid.set_cell(row, col, ch, hl_id);
                col += 1;
            }
        }
        true
    }

    fn mode_info_set(&mut self, cursor_style_enabled: bool, modes: &[ModeInfo]) {
        debug!(count = modes.len(), cursor_style_enabled, "mode table set");
        self.state.modes.set(cursor_style_enabled, modes.to_vec());
        if cursor_style_enabled {
            if let Some(info) = self.state.modes.current() {
                self.state.cursor.apply_mode(info);
            }
        }
    }

    fn mode_change(&mut self, mode: &str, index: usize) {
        let style_enabled = self.state.modes.cursor_style_enabled;
        match self.state.modes.switch(index) {
            Some(info) if style_enabled => self.state.cursor.apply_mode(info),
            Some(_) => {},
            None => warn!(mode, index, "mode index outside the mode table"),
        }
        debug!(mode, index, "mode changed");
        self.state.cursor.mode = mode.to_string();
    }

    fn clamp_to_grid(&self, row: usize, col: usize) -> (usize, usize) {
        let grid = &self.state.grid;
        (
            row.min(grid.rows().saturating_sub(1)),
            col.min(grid.cols().saturating_sub(1)),
        )
    }

    fn report_clamp(&mut self, event: &str, row: usize, col: usize) {
        if self.clamp_reported {
            return;
        }
        self.clamp_reported = true;
        warn!(
            event,
            row,
            col,
            rows = self.state.grid.rows(),
            cols = self.state.grid.cols(),
            "coordinates outside the grid, clamping"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CursorShape, Rgb};

    fn state(rows: usize, cols: usize) -> UiState {
        UiState::new(
            Grid::new(rows, cols),
            HighlightTable::default(),
            Cursor::default(),
        )
    }

    fn line(row: usize, col_start: usize, cells: Vec<LineCell>) -> RedrawEvent {
        RedrawEvent::GridLine {
            grid: 1,
            row,
            col_start,
            cells,
        }
    }

    #[test]
    fn test_grid_line_run_length() {
        let mut ui = state(3, 10);
        EventProcessor::new(&mut ui).apply_batch(&[line(
            1,
            2,
            vec![
                LineCell::new("a", Some(4), Some(3)),
                LineCell::new("b", None, None),
                LineCell::new("c", Some(5), None),
            ],
        )]);

        // "c" keeps the repeat of 3 but is clamped at the last column
        assert_eq!(ui.grid.row(1).unwrap().text(), "  aaabbbcc");
        assert_eq!(ui.grid.cell(1, 7).unwrap().hl_id, 4);
        assert_eq!(ui.grid.cell(1, 8).unwrap().hl_id, 5);
        assert_eq!(ui.grid.dirty_rows().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn test_grid_line_repeat_carries_forward() {
        let mut ui = state(1, 8);
        EventProcessor::new(&mut ui).apply(&line(
            0,
            0,
            vec![
                LineCell::new("a", Some(1), Some(3)),
                LineCell::new("b", None, None),
                LineCell::new("c", None, Some(1)),
                LineCell::new("d", None, None),
            ],
        ));
        assert_eq!(ui.grid.row(0).unwrap().text(), "aaabbbcd");
        assert!((0..8).all(|col| ui.grid.cell(0, col).unwrap().hl_id == 1));
    }

    #[test]
    fn test_grid_line_clamps_at_cols() {
        let mut ui = state(2, 4);
        let outcome = EventProcessor::new(&mut ui).apply_batch(&[line(
            0,
            2,
            vec![LineCell::new("x", Some(1), Some(10))],
        )]);
        assert_eq!(outcome.applied, 1);
        assert_eq!(ui.grid.row(0).unwrap().text(), "  xx");
        assert_eq!(ui.grid.cell_count(), 8);
    }

    #[test]
    fn test_grid_line_outside_rows_skipped() {
        let mut ui = state(2, 4);
        let outcome = EventProcessor::new(&mut ui).apply_batch(&[
            line(5, 0, vec![LineCell::new("x", Some(1), None)]),
            RedrawEvent::Flush,
        ]);
        assert_eq!(outcome.skipped, 1);
        assert_eq!(outcome.applied, 1);
        assert!(!ui.grid.is_dirty());
    }

    #[test]
    fn test_wide_char_continuation_is_empty() {
        let mut ui = state(1, 4);
        EventProcessor::new(&mut ui).apply_batch(&[line(
            0,
            0,
            vec![LineCell::new("中", Some(1), None), LineCell::new("", None, None)],
        )]);
        assert_eq!(ui.grid.cell(0, 0).unwrap().ch, Some('中'));
        assert!(ui.grid.cell(0, 1).unwrap().is_empty());
        assert!(ui.grid.cell(0, 1).unwrap().needs_redraw);
    }

    #[test]
    fn test_unknown_event_does_not_abort_batch() {
        let mut ui = state(2, 2);
        let outcome = EventProcessor::new(&mut ui).apply_batch(&[
            RedrawEvent::Unknown("msg_show".into()),
            RedrawEvent::GridCursorGoto {
                grid: 1,
                row: 1,
                col: 1,
            },
            RedrawEvent::Flush,
        ]);
        assert_eq!(outcome.skipped, 1);
        assert!(outcome.ends_with_flush);
        assert_eq!((ui.cursor.row, ui.cursor.col), (1, 1));
    }

    #[test]
    fn test_cursor_goto_clamped() {
        let mut ui = state(3, 3);
        EventProcessor::new(&mut ui).apply(&RedrawEvent::GridCursorGoto {
            grid: 1,
            row: 10,
            col: 1,
        });
        assert_eq!((ui.cursor.row, ui.cursor.col), (2, 1));
    }

    #[test]
    fn test_resize_reports_size_and_clamps_cursor() {
        let mut ui = state(10, 10);
        ui.cursor.set_target(9, 9);
        let outcome = EventProcessor::new(&mut ui).apply_batch(&[RedrawEvent::GridResize {
            grid: 1,
            rows: 4,
            cols: 5,
        }]);
        assert_eq!(outcome.resized, Some((4, 5)));
        assert!(!outcome.ends_with_flush);
        assert_eq!((ui.cursor.row, ui.cursor.col), (3, 4));
    }

    #[test]
    fn test_hl_redefinition_damages_users() {
        let mut ui = state(2, 3);
        let mut processor = EventProcessor::new(&mut ui);
        processor.apply(&RedrawEvent::HlAttrDefine {
            id: 3,
            attrs: HighlightAttribute::default(),
        });
        processor.apply(&line(1, 0, vec![LineCell::new("q", Some(3), None)]));
        drop(processor);
        ui.grid.mark_clean();

        EventProcessor::new(&mut ui).apply(&RedrawEvent::HlAttrDefine {
            id: 3,
            attrs: HighlightAttribute {
                foreground: Some(Rgb::new(1, 1, 1)),
                ..Default::default()
            },
        });
        assert!(ui.grid.cell(1, 0).unwrap().needs_redraw);
        assert!(!ui.grid.cell(1, 1).unwrap().needs_redraw);
        assert!(!ui.grid.is_row_dirty(0));
        assert_eq!(ui.highlights.resolve(3).foreground, Rgb::new(1, 1, 1));
    }

    #[test]
    fn test_first_hl_definition_damages_users() {
        let mut ui = state(1, 3);
        EventProcessor::new(&mut ui).apply(&line(0, 1, vec![LineCell::new("q", Some(5), None)]));
        ui.grid.mark_clean();

        EventProcessor::new(&mut ui).apply(&RedrawEvent::HlAttrDefine {
            id: 5,
            attrs: HighlightAttribute {
                background: Some(Rgb::new(255, 0, 0)),
                ..Default::default()
            },
        });
        assert!(ui.grid.cell(0, 1).unwrap().needs_redraw);
        assert!(!ui.grid.cell(0, 0).unwrap().needs_redraw);
    }

    #[test]
    fn test_identical_hl_definition_damages_nothing() {
        let mut ui = state(1, 2);
        let define = RedrawEvent::HlAttrDefine {
            id: 2,
            attrs: HighlightAttribute::default(),
        };
        EventProcessor::new(&mut ui).apply(&define);
        EventProcessor::new(&mut ui).apply(&line(0, 0, vec![LineCell::new("q", Some(2), None)]));
        ui.grid.mark_clean();

        EventProcessor::new(&mut ui).apply(&define);
        assert!(!ui.grid.is_dirty());
    }

    #[test]
    fn test_oversized_resize_skipped() {
        let mut ui = state(3, 4);
        let outcome = EventProcessor::new(&mut ui).apply_batch(&[
            RedrawEvent::GridResize {
                grid: 1,
                rows: usize::MAX,
                cols: 1,
            },
            RedrawEvent::GridResize {
                grid: 1,
                rows: 40_000,
                cols: 40_000,
            },
            RedrawEvent::Flush,
        ]);
        assert_eq!(outcome.skipped, 2);
        assert_eq!(outcome.resized, None);
        assert!(outcome.ends_with_flush);
        assert_eq!((ui.grid.rows(), ui.grid.cols()), (3, 4));
        assert_eq!(ui.grid.cell_count(), 12);
    }

    #[test]
    fn test_mode_change_applies_cursor_style() {
        let mut ui = state(2, 2);
        EventProcessor::new(&mut ui).apply_batch(&[
            RedrawEvent::ModeInfoSet {
                cursor_style_enabled: true,
                modes: vec![
                    ModeInfo {
                        name: "normal".into(),
                        cursor_shape: Some(CursorShape::Block),
                        ..Default::default()
                    },
                    ModeInfo {
                        name: "insert".into(),
                        cursor_shape: Some(CursorShape::Vertical),
                        cell_percentage: Some(25),
                        ..Default::default()
                    },
                ],
            },
            RedrawEvent::ModeChange {
                mode: "insert".into(),
                index: 1,
            },
        ]);
        assert_eq!(ui.cursor.shape, CursorShape::Vertical);
        assert_eq!(ui.cursor.cell_percentage, 25);
        assert_eq!(ui.cursor.mode, "insert");
    }

    #[test]
    fn test_busy_title_and_options() {
        let mut ui = state(1, 1);
        EventProcessor::new(&mut ui).apply_batch(&[
            RedrawEvent::BusyStart,
            RedrawEvent::SetTitle("main.rs".into()),
            RedrawEvent::OptionSet {
                name: "guifont".into(),
                value: Value::String("Mono:h12".into()),
            },
        ]);
        assert!(!ui.cursor.visible);
        assert_eq!(ui.title, "main.rs");
        assert_eq!(ui.options["guifont"], "Mono:h12");
    }

    #[test]
    fn test_default_colors_damage_everything() {
        let mut ui = state(3, 2);
        EventProcessor::new(&mut ui).apply(&RedrawEvent::DefaultColorsSet {
            fg: Some(Rgb::new(9, 9, 9)),
            bg: None,
            sp: None,
        });
        assert_eq!(ui.grid.dirty_rows().count(), 3);
        assert_eq!(ui.highlights.resolve(0).foreground, Rgb::new(9, 9, 9));
    }
}
