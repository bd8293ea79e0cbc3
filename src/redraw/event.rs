//! Redraw events
//!
//! The closed set of UI events the core understands, decoded once at the
//! transport boundary (see `decode`).

use serde_json::Value;

use crate::core::{HighlightAttribute, ModeInfo, Rgb};

/// One entry of a grid line update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineCell {
    /// Cell text; empty for the right half of a double-width character
    pub text: String,
    /// Highlight id, reusing the previous entry's id when absent
    pub hl_id: Option<u64>,
    /// Number of consecutive cells to fill, 1 when absent
    pub repeat: Option<usize>,
}

impl LineCell {
    pub fn new(text: impl Into<String>, hl_id: Option<u64>, repeat: Option<usize>) -> Self {
        Self {
            text: text.into(),
            hl_id,
            repeat,
        }
    }
}

/// A decoded UI event
#[derive(Debug, Clone, PartialEq)]
pub enum RedrawEvent {
    GridResize {
        grid: u64,
        rows: usize,
        cols: usize,
    },
    DefaultColorsSet {
        fg: Option<Rgb>,
        bg: Option<Rgb>,
        sp: Option<Rgb>,
    },
    HlAttrDefine {
        id: u64,
        attrs: HighlightAttribute,
    },
    HlGroupSet {
        name: String,
        id: u64,
    },
    GridLine {
        grid: u64,
        row: usize,
        col_start: usize,
        cells: Vec<LineCell>,
    },
    GridClear {
        grid: u64,
    },
    GridDestroy {
        grid: u64,
    },
    GridCursorGoto {
        grid: u64,
        row: usize,
        col: usize,
    },
    /// Scroll `[top, bottom) x [left, right)` by `rows`; positive moves text up
    GridScroll {
        grid: u64,
        top: usize,
        bottom: usize,
        left: usize,
        right: usize,
        rows: i64,
    },
    ModeInfoSet {
        cursor_style_enabled: bool,
        modes: Vec<ModeInfo>,
    },
    ModeChange {
        mode: String,
        index: usize,
    },
    BusyStart,
    BusyStop,
    SetTitle(String),
    OptionSet {
        name: String,
        value: Value,
    },
    /// End of an atomic update
    Flush,
    /// Known event without rendering impact (mouse_on, bell, ...)
    Ignored(String),
    /// Event name this client does not know
    Unknown(String),
}

impl RedrawEvent {
    /// Protocol name of the event
    pub fn name(&self) -> &str {
        match self {
            RedrawEvent::GridResize { .. } => "grid_resize",
            RedrawEvent::DefaultColorsSet { .. } => "default_colors_set",
            RedrawEvent::HlAttrDefine { .. } => "hl_attr_define",
            RedrawEvent::HlGroupSet { .. } => "hl_group_set",
            RedrawEvent::GridLine { .. } => "grid_line",
            RedrawEvent::GridClear { .. } => "grid_clear",
            RedrawEvent::GridDestroy { .. } => "grid_destroy",
            RedrawEvent::GridCursorGoto { .. } => "grid_cursor_goto",
            RedrawEvent::GridScroll { .. } => "grid_scroll",
            RedrawEvent::ModeInfoSet { .. } => "mode_info_set",
            RedrawEvent::ModeChange { .. } => "mode_change",
            RedrawEvent::BusyStart => "busy_start",
            RedrawEvent::BusyStop => "busy_stop",
            RedrawEvent::SetTitle(_) => "set_title",
            RedrawEvent::OptionSet { .. } => "option_set",
            RedrawEvent::Flush => "flush",
            RedrawEvent::Ignored(name) | RedrawEvent::Unknown(name) => name,
        }
    }
}

/// Events delivered together by one redraw notification, in order
pub type Batch = Vec<RedrawEvent>;
