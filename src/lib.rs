//! Gridray Grid Client Library
//!
//! Draws the character grid of an external editor that describes its UI
//! through "redraw" notifications. This crate provides:
//!
//! - `core`: Grid, cells, highlight table, cursor and mode table
//! - `redraw`: Event decoding, the event processor and the batch queue
//! - `render`: Damage-aware vertex batching and the glyph atlas
//! - `editor`: The tick loop tying queue, state and renderer together
//! - `app`: Configuration

pub mod app;
pub mod core;
pub mod editor;
pub mod redraw;
pub mod render;
