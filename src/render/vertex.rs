//! Vertex layout handed to the draw sink
//!
//! Quads are two triangles of a non-indexed triangle list, so every quad is
//! six vertices.

use bytemuck::{Pod, Zeroable};

use super::atlas::UvRect;

/// Vertices per quad
pub const QUAD_VERTICES: usize = 6;

/// One vertex of the frame's triangle list
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    /// Position in pixels, origin top-left
    pub pos: [f32; 2],
    /// Atlas texture coordinates
    pub uv: [f32; 2],
    /// Background color when untextured, glyph tint when textured
    pub color: [f32; 4],
    /// 1.0 samples the atlas, 0.0 fills with `color`
    pub use_texture: f32,
    /// Vertical pixel offset applied by the vertex shader
    pub scroll_offset: f32,
}

/// Stride of one vertex in bytes
pub const VERTEX_SIZE: usize = std::mem::size_of::<Vertex>();

/// Axis-aligned rectangle in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelRect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl PixelRect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }
}

/// Push the six vertices of a quad covering `rect`
pub fn push_quad(out: &mut Vec<Vertex>, rect: PixelRect, uv: Option<UvRect>, color: [f32; 4]) {
    let (u, textured) = match uv {
        Some(uv) => (uv, 1.0),
        None => (UvRect::default(), 0.0),
    };
    let (x0, y0, x1, y1) = (rect.x, rect.y, rect.x + rect.w, rect.y + rect.h);
    let corners = [
        ([x0, y0], [u.u0, u.v0]),
        ([x0, y1], [u.u0, u.v1]),
        ([x1, y1], [u.u1, u.v1]),
        ([x1, y1], [u.u1, u.v1]),
        ([x1, y0], [u.u1, u.v0]),
        ([x0, y0], [u.u0, u.v0]),
    ];
    out.extend(corners.iter().map(|&(pos, uv)| Vertex {
        pos,
        uv,
        color,
        use_texture: textured,
        scroll_offset: 0.0,
    }));
}
