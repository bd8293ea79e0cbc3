//! Rendering Module
//!
//! Turns grid damage and cursor state into a triangle list:
//! - Vertex layout and quad emission
//! - Glyph lookup and the lazily filled glyph atlas
//! - The damage-aware batcher and the draw sink it feeds

mod atlas;
mod batcher;
mod vertex;

pub use atlas::{GlyphAtlas, GlyphBitmap, GlyphKey, GlyphSource, Rasterizer, UvRect};
pub use batcher::{CellMetrics, DrawSink, Frame, Renderer};
pub use vertex::{push_quad, PixelRect, Vertex, QUAD_VERTICES, VERTEX_SIZE};
