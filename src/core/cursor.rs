//! Cursor state management
//!
//! The cursor tracks its target cell, shape and blink timings from the
//! active mode, and the animation that carries its visual position from
//! wherever it was drawn towards the target.

use super::mode::{CursorShape, ModeInfo};

/// Length of the fade at each blink edge, in milliseconds
const BLINK_FADE_MS: f32 = 100.0;

/// Blink timings in milliseconds. Any zero disables blinking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BlinkTimings {
    pub wait: u64,
    pub on: u64,
    pub off: u64,
}

impl BlinkTimings {
    pub fn enabled(&self) -> bool {
        self.wait > 0 && self.on > 0 && self.off > 0
    }
}

/// Cursor position, shape and animation state
#[derive(Debug, Clone, PartialEq)]
pub struct Cursor {
    /// Target row (0-indexed)
    pub row: usize,
    /// Target column (0-indexed)
    pub col: usize,
    pub shape: CursorShape,
    /// Size of bar shapes relative to the cell, 0-100
    pub cell_percentage: u8,
    /// Highlight id used to color the cursor
    pub hl_id: u64,
    /// Name of the active mode
    pub mode: String,
    pub blink: BlinkTimings,
    /// Hidden while the editor is busy
    pub visible: bool,
    /// Global switch over mode blink timings
    pub blink_enabled: bool,
    /// Seconds a move takes; 0 snaps
    anim_duration: f32,
    /// Animation progress, 0 = at `from`, 1 = at the target
    anim_t: f32,
    /// Visual position the current animation started from
    from: (f32, f32),
    /// Seconds since the blink cycle restarted
    blink_elapsed: f32,
}

impl Default for Cursor {
    fn default() -> Self {
        Self::new(0.0, true)
    }
}

impl Cursor {
    pub fn new(anim_duration: f32, blink_enabled: bool) -> Self {
        Self {
            row: 0,
            col: 0,
            shape: CursorShape::Block,
            cell_percentage: 100,
            hl_id: 0,
            mode: String::new(),
            blink: BlinkTimings::default(),
            visible: true,
            blink_enabled,
            anim_duration: anim_duration.max(0.0),
            anim_t: 1.0,
            from: (0.0, 0.0),
            blink_elapsed: 0.0,
        }
    }

    pub fn animation_enabled(&self) -> bool {
        self.anim_duration > 0.0
    }

    pub fn set_animation_duration(&mut self, seconds: f32) {
        self.anim_duration = seconds.max(0.0);
        if !self.animation_enabled() {
            self.anim_t = 1.0;
        }
    }

    /// Animation progress in `0..=1`
    pub fn anim_t(&self) -> f32 {
        self.anim_t
    }

    pub fn is_animating(&self) -> bool {
        self.anim_t < 1.0
    }

    /// Move the target. The animation restarts from the current visual
    /// position, so a second move mid-animation continues smoothly.
    pub fn set_target(&mut self, row: usize, col: usize) {
        if self.animation_enabled() {
            self.from = self.visual_position();
            self.anim_t = 0.0;
        } else {
            self.from = (row as f32, col as f32);
            self.anim_t = 1.0;
        }
        self.row = row;
        self.col = col;
        self.blink_elapsed = 0.0;
    }

    /// Advance animation and blink clocks by `dt` seconds
    pub fn advance(&mut self, dt: f32) {
        let dt = dt.max(0.0);
        if self.is_animating() {
            self.anim_t = (self.anim_t + dt / self.anim_duration).min(1.0);
        }
        self.blink_elapsed += dt;
    }

    /// Interpolated (row, col) between the animation start and the target
    pub fn visual_position(&self) -> (f32, f32) {
        let lerp = |a: f32, b: f32| a + self.anim_t * (b - a);
        (
            lerp(self.from.0, self.row as f32),
            lerp(self.from.1, self.col as f32),
        )
    }

    /// Take over the cursor style of a mode
    pub fn apply_mode(&mut self, info: &ModeInfo) {
        self.mode.clone_from(&info.name);
        if let Some(shape) = info.cursor_shape {
            self.shape = shape;
        }
        if let Some(pct) = info.cell_percentage {
            self.cell_percentage = pct.min(100);
        }
        if let Some(wait) = info.blinkwait {
            self.blink.wait = wait;
        }
        if let Some(on) = info.blinkon {
            self.blink.on = on;
        }
        if let Some(off) = info.blinkoff {
            self.blink.off = off;
        }
        if let Some(id) = info.attr_id {
            self.hl_id = id;
        }
        self.blink_elapsed = 0.0;
    }

    /// Whether the cursor blinks at all right now
    pub fn blinks(&self) -> bool {
        self.blink_enabled && self.blink.enabled() && !self.is_animating()
    }

    /// Opacity of the cursor in the blink cycle.
    ///
    /// Solid during the initial wait, then alternating on/off phases with a
    /// short linear fade at each edge. Always 1 while moving.
    pub fn blink_alpha(&self) -> f32 {
        if !self.blinks() {
            return 1.0;
        }
        let elapsed_ms = self.blink_elapsed * 1000.0;
        let wait = self.blink.wait as f32;
        if elapsed_ms < wait {
            return 1.0;
        }

        let on = self.blink.on as f32;
        let off = self.blink.off as f32;
        let phase = (elapsed_ms - wait) % (on + off);
        if phase < on {
            let fade = BLINK_FADE_MS.min(on / 2.0);
            let left = on - phase;
            if left < fade {
                left / fade
            } else {
                1.0
            }
        } else {
            let fade = BLINK_FADE_MS.min(off / 2.0);
            let left = on + off - phase;
            if left < fade {
                1.0 - left / fade
            } else {
                0.0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: (f32, f32), b: (f32, f32)) {
        assert!(
            (a.0 - b.0).abs() < 1e-4 && (a.1 - b.1).abs() < 1e-4,
            "{:?} != {:?}",
            a,
            b
        );
    }

    #[test]
    fn test_snap_without_animation() {
        let mut cursor = Cursor::new(0.0, true);
        cursor.set_target(3, 7);
        assert!(!cursor.is_animating());
        assert_close(cursor.visual_position(), (3.0, 7.0));
    }

    #[test]
    fn test_animation_progress() {
        let mut cursor = Cursor::new(0.1, true);
        cursor.set_target(0, 10);
        assert_close(cursor.visual_position(), (0.0, 0.0));
        cursor.advance(0.05);
        assert_close(cursor.visual_position(), (0.0, 5.0));
        cursor.advance(1.0);
        assert_eq!(cursor.anim_t(), 1.0);
        assert_close(cursor.visual_position(), (0.0, 10.0));
    }

    #[test]
    fn test_retarget_starts_from_visual_position() {
        let mut cursor = Cursor::new(0.1, true);
        cursor.set_target(0, 10);
        cursor.advance(0.05);
        cursor.set_target(4, 10);
        assert_close(cursor.visual_position(), (0.0, 5.0));
        cursor.advance(0.05);
        assert_close(cursor.visual_position(), (2.0, 7.5));
    }

    #[test]
    fn test_apply_mode() {
        let mut cursor = Cursor::default();
        cursor.apply_mode(&ModeInfo {
            name: "insert".into(),
            cursor_shape: Some(CursorShape::Vertical),
            cell_percentage: Some(25),
            blinkwait: Some(700),
            attr_id: Some(9),
            ..Default::default()
        });
        assert_eq!(cursor.mode, "insert");
        assert_eq!(cursor.shape, CursorShape::Vertical);
        assert_eq!(cursor.cell_percentage, 25);
        assert_eq!(cursor.blink.wait, 700);
        assert_eq!(cursor.hl_id, 9);
    }

    #[test]
    fn test_blink_cycle() {
        let mut cursor = Cursor::default();
        cursor.blink = BlinkTimings {
            wait: 500,
            on: 400,
            off: 400,
        };
        assert_eq!(cursor.blink_alpha(), 1.0);
        cursor.advance(0.6);
        assert_eq!(cursor.blink_alpha(), 1.0);
        cursor.advance(0.4);
        assert_eq!(cursor.blink_alpha(), 0.0);
        cursor.advance(0.25);
        let fading_in = cursor.blink_alpha();
        assert!(fading_in > 0.0 && fading_in < 1.0);
    }

    #[test]
    fn test_blink_suppressed_while_animating() {
        let mut cursor = Cursor::new(0.5, true);
        cursor.blink = BlinkTimings {
            wait: 1,
            on: 1,
            off: 1000,
        };
        cursor.advance(0.1);
        assert_eq!(cursor.blink_alpha(), 0.0);
        cursor.set_target(5, 5);
        cursor.advance(0.1);
        assert!(cursor.is_animating());
        assert_eq!(cursor.blink_alpha(), 1.0);
    }

    #[test]
    fn test_blink_disabled_globally() {
        let mut cursor = Cursor::new(0.0, false);
        cursor.blink = BlinkTimings {
            wait: 1,
            on: 1,
            off: 1000,
        };
        cursor.advance(0.5);
        assert_eq!(cursor.blink_alpha(), 1.0);
    }
}
