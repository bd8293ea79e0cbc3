//! Highlight Table
//!
//! Maps highlight ids to attribute sets. Id 0 is always present and holds
//! the default colors; lookups of unknown ids silently fall back to it.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::cell::DEFAULT_HL_ID;

/// 24-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Unpack a `0xRRGGBB` integer
    pub const fn from_u24(color: u32) -> Self {
        Self {
            r: ((color >> 16) & 0xff) as u8,
            g: ((color >> 8) & 0xff) as u8,
            b: (color & 0xff) as u8,
        }
    }

    /// Pack into a `0xRRGGBB` integer
    pub const fn to_u24(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    /// Normalized RGBA components with the given alpha
    pub fn to_f32(self, alpha: f32) -> [f32; 4] {
        [
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
            alpha,
        ]
    }
}

/// Attribute set of one highlight id
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightAttribute {
    pub foreground: Option<Rgb>,
    pub background: Option<Rgb>,
    /// Stroke color for underline and strikethrough
    pub special: Option<Rgb>,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub undercurl: bool,
    pub strikethrough: bool,
    pub reverse: bool,
}

/// Colors and flags of a highlight after resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedColors {
    pub foreground: Rgb,
    pub background: Rgb,
    pub special: Rgb,
    pub bold: bool,
    pub italic: bool,
    /// Underline or undercurl
    pub underline: bool,
    pub strikethrough: bool,
}

/// Built-in default colors, restored on `clear`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultColors {
    pub foreground: Rgb,
    pub background: Rgb,
    pub special: Rgb,
}

impl Default for DefaultColors {
    fn default() -> Self {
        Self {
            foreground: Rgb::WHITE,
            background: Rgb::BLACK,
            special: Rgb::WHITE,
        }
    }
}

/// Highlight id to attribute mapping
#[derive(Debug, Clone)]
pub struct HighlightTable {
    attrs: HashMap<u64, HighlightAttribute>,
    builtin: DefaultColors,
}

impl Default for HighlightTable {
    fn default() -> Self {
        Self::new(DefaultColors::default())
    }
}

impl HighlightTable {
    pub fn new(builtin: DefaultColors) -> Self {
        let mut table = Self {
            attrs: HashMap::new(),
            builtin,
        };
        table.clear();
        table
    }

    /// Insert or overwrite the attributes of `id`
    pub fn define(&mut self, id: u64, attrs: HighlightAttribute) {
        self.attrs.insert(id, attrs);
    }

    /// Get the raw attributes of `id`, if defined
    pub fn get(&self, id: u64) -> Option<&HighlightAttribute> {
        self.attrs.get(&id)
    }

    /// Number of defined ids, including id 0
    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    /// Update the default colors held by id 0. `None` keeps the current value.
    pub fn set_default_colors(&mut self, fg: Option<Rgb>, bg: Option<Rgb>, sp: Option<Rgb>) {
        let default = self.attrs.entry(DEFAULT_HL_ID).or_default();
        if fg.is_some() {
            default.foreground = fg;
        }
        if bg.is_some() {
            default.background = bg;
        }
        if sp.is_some() {
            default.special = sp;
        }
    }

    /// Drop every definition and restore id 0 to the built-in colors
    pub fn clear(&mut self) {
        self.attrs.clear();
        self.attrs.insert(
            DEFAULT_HL_ID,
            HighlightAttribute {
                foreground: Some(self.builtin.foreground),
                background: Some(self.builtin.background),
                special: Some(self.builtin.special),
                ..Default::default()
            },
        );
    }

    fn defaults(&self) -> (Rgb, Rgb) {
        let default = self.attrs.get(&DEFAULT_HL_ID);
        (
            default
                .and_then(|a| a.foreground)
                .unwrap_or(self.builtin.foreground),
            default
                .and_then(|a| a.background)
                .unwrap_or(self.builtin.background),
        )
    }

    /// Resolve `id` to concrete colors.
    ///
    /// Reverse swaps the highlight's own foreground and background first;
    /// anything still unset then comes from id 0. The special color falls
    /// back to the resolved foreground.
    pub fn resolve(&self, id: u64) -> ResolvedColors {
        let (default_fg, default_bg) = self.defaults();
        let Some(attr) = self.attrs.get(&id) else {
            return ResolvedColors {
                foreground: default_fg,
                background: default_bg,
                special: default_fg,
                bold: false,
                italic: false,
                underline: false,
                strikethrough: false,
            };
        };

        let (fg, bg) = if attr.reverse {
            (attr.background, attr.foreground)
        } else {
            (attr.foreground, attr.background)
        };
        let foreground = fg.unwrap_or(default_fg);

        ResolvedColors {
            foreground,
            background: bg.unwrap_or(default_bg),
            special: attr.special.unwrap_or(foreground),
            bold: attr.bold,
            italic: attr.italic,
            underline: attr.underline || attr.undercurl,
            strikethrough: attr.strikethrough,
        }
    }
}
