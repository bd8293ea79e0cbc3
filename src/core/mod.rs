//! Grid Core Module
//!
//! Platform-independent UI state driven by redraw events. This module contains:
//! - Cell grid with per-row damage tracking
//! - Highlight table resolving ids to colors
//! - Cursor position, shape, animation and blink
//! - Mode table announcing per-mode cursor styles
//!
//! Nothing here blocks or performs I/O; all inputs are decoded events.

mod cell;
mod cursor;
mod grid;
mod highlight;
mod mode;

pub use cell::{Cell, DEFAULT_HL_ID};
pub use cursor::{BlinkTimings, Cursor};
pub use grid::{Grid, Region, Row};
pub use highlight::{DefaultColors, HighlightAttribute, HighlightTable, ResolvedColors, Rgb};
pub use mode::{CursorShape, ModeInfo, ModeTable};
