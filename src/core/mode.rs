//! Editor mode table
//!
//! The editor announces a table of modes (normal, insert, visual, ...) once
//! and then switches between them by index. Each entry carries the cursor
//! style to use while that mode is active.

use serde::{Deserialize, Serialize};

/// Cursor shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CursorShape {
    /// Filled cell
    #[default]
    Block,
    /// Bar along the bottom of the cell
    Horizontal,
    /// Bar along the left edge of the cell
    Vertical,
}

impl CursorShape {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "block" => Some(CursorShape::Block),
            "horizontal" => Some(CursorShape::Horizontal),
            "vertical" => Some(CursorShape::Vertical),
            _ => None,
        }
    }
}

/// Cursor style of one mode. Unset fields leave the cursor unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeInfo {
    pub name: String,
    pub short_name: String,
    pub cursor_shape: Option<CursorShape>,
    /// Size of a bar cursor, 0-100
    pub cell_percentage: Option<u8>,
    /// Blink timings in milliseconds; 0 in any of them disables blinking
    pub blinkwait: Option<u64>,
    pub blinkon: Option<u64>,
    pub blinkoff: Option<u64>,
    /// Highlight of the cursor, 0 meaning reversed default colors
    pub attr_id: Option<u64>,
}

/// Mode-indexed table of cursor styles
#[derive(Debug, Clone, Default)]
pub struct ModeTable {
    /// Whether the editor wants the UI to style the cursor per mode
    pub cursor_style_enabled: bool,
    modes: Vec<ModeInfo>,
    current: Option<usize>,
}

impl ModeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the table
    pub fn set(&mut self, cursor_style_enabled: bool, modes: Vec<ModeInfo>) {
        self.cursor_style_enabled = cursor_style_enabled;
        self.modes = modes;
        if self.current.is_some_and(|i| i >= self.modes.len()) {
            self.current = None;
        }
    }

    pub fn get(&self, index: usize) -> Option<&ModeInfo> {
        self.modes.get(index)
    }

    pub fn len(&self) -> usize {
        self.modes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modes.is_empty()
    }

    /// Switch to `index`, returning its entry if it exists
    pub fn switch(&mut self, index: usize) -> Option<&ModeInfo> {
        let info = self.modes.get(index)?;
        self.current = Some(index);
        Some(info)
    }

    pub fn current(&self) -> Option<&ModeInfo> {
        self.current.and_then(|i| self.modes.get(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_from_name() {
        assert_eq!(CursorShape::from_name("block"), Some(CursorShape::Block));
        assert_eq!(CursorShape::from_name("vertical"), Some(CursorShape::Vertical));
        assert_eq!(CursorShape::from_name("round"), None);
    }

    #[test]
    fn test_mode_switch() {
        let mut table = ModeTable::new();
        table.set(
            true,
            vec![
                ModeInfo {
                    name: "normal".into(),
                    ..Default::default()
                },
                ModeInfo {
                    name: "insert".into(),
                    ..Default::default()
                },
            ],
        );
        assert_eq!(table.switch(1).map(|m| m.name.as_str()), Some("insert"));
        assert_eq!(table.current().map(|m| m.name.as_str()), Some("insert"));
        assert!(table.switch(5).is_none());
        assert_eq!(table.current().map(|m| m.name.as_str()), Some("insert"));
    }

    #[test]
    fn test_reset_drops_stale_index() {
        let mut table = ModeTable::new();
        table.set(true, vec![ModeInfo::default(), ModeInfo::default()]);
        table.switch(1);
        table.set(true, vec![ModeInfo::default()]);
        assert!(table.current().is_none());
    }
}
