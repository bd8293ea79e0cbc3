//! Glyph atlas
//!
//! The renderer only needs texture coordinates for a (character, bold,
//! italic) key. `GlyphAtlas` answers that by packing bitmaps from an
//! external rasterizer into a single-channel texture on first use.

use std::collections::HashMap;

/// Texture coordinates of a glyph in the atlas
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct UvRect {
    pub u0: f32,
    pub v0: f32,
    pub u1: f32,
    pub v1: f32,
}

impl UvRect {
    pub fn new(u0: f32, v0: f32, u1: f32, v1: f32) -> Self {
        Self { u0, v0, u1, v1 }
    }
}

/// Lookup key of a glyph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GlyphKey {
    pub ch: char,
    pub bold: bool,
    pub italic: bool,
}

/// Source of glyph texture coordinates
pub trait GlyphSource {
    /// `None` means the glyph is unavailable; the cell is drawn without it.
    fn glyph_uv(&mut self, ch: char, bold: bool, italic: bool) -> Option<UvRect>;
}

/// Coverage bitmap of one rasterized glyph, row-major, one byte per pixel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlyphBitmap {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl GlyphBitmap {
    /// A fully covered bitmap
    pub fn solid(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0xff; (width * height) as usize],
        }
    }
}

/// Font layer capability: rasterize a glyph into a cell-sized bitmap
pub trait Rasterizer {
    fn rasterize(&mut self, ch: char, bold: bool, italic: bool) -> Option<GlyphBitmap>;
}

impl<F> Rasterizer for F
where
    F: FnMut(char, bool, bool) -> Option<GlyphBitmap>,
{
    fn rasterize(&mut self, ch: char, bold: bool, italic: bool) -> Option<GlyphBitmap> {
        self(ch, bold, italic)
    }
}

/// Row-packed glyph atlas, filled lazily from a rasterizer
pub struct GlyphAtlas<R> {
    rasterizer: R,
    /// Cached lookups, misses included so the rasterizer is asked only once
    entries: HashMap<GlyphKey, Option<UvRect>>,
    width: u32,
    height: u32,
    data: Vec<u8>,
    cursor_x: u32,
    cursor_y: u32,
    row_height: u32,
    dirty: bool,
}

impl<R: Rasterizer> GlyphAtlas<R> {
    pub fn new(width: u32, height: u32, rasterizer: R) -> Self {
        Self {
            rasterizer,
            entries: HashMap::with_capacity(256),
            width,
            height,
            data: vec![0u8; (width * height) as usize],
            cursor_x: 0,
            cursor_y: 0,
            row_height: 0,
            dirty: false,
        }
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Atlas pixels, one byte per texel
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Whether pixels changed since the last `take_dirty`
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Reset the dirty flag, returning whether the sink must re-upload
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Pack a bitmap, returning its UV rectangle or `None` if the atlas is full
    pub fn insert(&mut self, bitmap: &GlyphBitmap) -> Option<UvRect> {
        let (glyph_w, glyph_h) = (bitmap.width, bitmap.height);
        if glyph_w == 0 || glyph_h == 0 {
            return Some(UvRect::default());
        }

        let padding = 1u32;
        let padded_w = glyph_w + padding;
        let padded_h = glyph_h + padding;

        if self.cursor_x + padded_w > self.width {
            self.cursor_x = 0;
            self.cursor_y += self.row_height;
            self.row_height = 0;
        }
        if padded_w > self.width || self.cursor_y + padded_h > self.height {
            return None;
        }

        let x = self.cursor_x;
        let y = self.cursor_y;
        for row in 0..glyph_h {
            let dst_start = ((y + row) * self.width + x) as usize;
            let src_start = (row * glyph_w) as usize;
            let len = glyph_w as usize;
            if dst_start + len <= self.data.len() && src_start + len <= bitmap.data.len() {
                self.data[dst_start..dst_start + len]
                    .copy_from_slice(&bitmap.data[src_start..src_start + len]);
            }
        }

        let fw = self.width as f32;
        let fh = self.height as f32;
        self.cursor_x += padded_w;
        self.row_height = self.row_height.max(padded_h);
        self.dirty = true;

        Some(UvRect::new(
            x as f32 / fw,
            y as f32 / fh,
            (x + glyph_w) as f32 / fw,
            (y + glyph_h) as f32 / fh,
        ))
    }

    /// Forget every glyph, e.g. after a font change
    pub fn clear(&mut self) {
        self.entries.clear();
        self.data.fill(0);
        self.cursor_x = 0;
        self.cursor_y = 0;
        self.row_height = 0;
        self.dirty = true;
    }
}

impl<R: Rasterizer> GlyphSource for GlyphAtlas<R> {
    fn glyph_uv(&mut self, ch: char, bold: bool, italic: bool) -> Option<UvRect> {
        let key = GlyphKey { ch, bold, italic };
        if let Some(entry) = self.entries.get(&key) {
            return *entry;
        }
        let uv = self
            .rasterizer
            .rasterize(ch, bold, italic)
            .and_then(|bitmap| self.insert(&bitmap));
        self.entries.insert(key, uv);
        uv
    }
}
