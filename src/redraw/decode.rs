//! Redraw notification decoding
//!
//! A redraw notification carries a list of updates, each an array headed by
//! an event name followed by one argument tuple per invocation:
//!
//! ```text
//! [["grid_line", [1, 0, 0, [["a", 1, 3]]], [1, 1, 0, [["b"]]]], ["flush", []]]
//! ```
//!
//! Extra trailing arguments are ignored so newer editors stay compatible.
//! Malformed invocations are logged and dropped; they never fail the batch.

use serde_json::{Map, Value};
use tracing::warn;

use super::event::{Batch, LineCell, RedrawEvent};
use crate::core::{CursorShape, HighlightAttribute, ModeInfo, Rgb};

/// Decoding error for a single event invocation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("update is not an array headed by an event name")]
    MalformedUpdate,
    #[error("{event}: arguments are not an array")]
    NotAnArray { event: String },
    #[error("{event}: missing argument {index}")]
    MissingArgument { event: String, index: usize },
    #[error("{event}: argument {index} has the wrong type")]
    WrongType { event: String, index: usize },
}

/// Decode the parameters of one redraw notification into a batch.
pub fn decode_batch(updates: &[Value]) -> Batch {
    let mut batch = Vec::with_capacity(updates.len());
    for update in updates {
        let Some((name, invocations)) = split_update(update) else {
            warn!(error = %DecodeError::MalformedUpdate, "skipping redraw update");
            continue;
        };
        for args in invocations {
            match decode_event(name, args) {
                Ok(event) => batch.push(event),
                Err(err) => warn!(error = %err, "skipping malformed redraw event"),
            }
        }
    }
    batch
}

fn split_update(update: &Value) -> Option<(&str, &[Value])> {
    let (head, rest) = update.as_array()?.split_first()?;
    Some((head.as_str()?, rest))
}

/// Decode one invocation of `name`
pub fn decode_event(name: &str, args: &Value) -> Result<RedrawEvent, DecodeError> {
    let values = args.as_array().ok_or_else(|| DecodeError::NotAnArray {
        event: name.to_string(),
    })?;
    let args = Args { event: name, values };

    let event = match name {
        "grid_resize" => RedrawEvent::GridResize {
            grid: args.u64(0)?,
            cols: args.usize(1)?,
            rows: args.usize(2)?,
        },
        "default_colors_set" => RedrawEvent::DefaultColorsSet {
            fg: args.color(0)?,
            bg: args.color(1)?,
            sp: args.color(2)?,
        },
        "hl_attr_define" => RedrawEvent::HlAttrDefine {
            id: args.u64(0)?,
            attrs: decode_hl_attrs(args.map(1)?),
        },
        "hl_group_set" => RedrawEvent::HlGroupSet {
            name: args.string(0)?,
            id: args.u64(1)?,
        },
        "grid_line" => RedrawEvent::GridLine {
            grid: args.u64(0)?,
            row: args.usize(1)?,
            col_start: args.usize(2)?,
            cells: decode_line_cells(&args, 3)?,
        },
        "grid_clear" => RedrawEvent::GridClear { grid: args.u64(0)? },
        "grid_destroy" => RedrawEvent::GridDestroy { grid: args.u64(0)? },
        "grid_cursor_goto" => RedrawEvent::GridCursorGoto {
            grid: args.u64(0)?,
            row: args.usize(1)?,
            col: args.usize(2)?,
        },
        "grid_scroll" => RedrawEvent::GridScroll {
            grid: args.u64(0)?,
            top: args.usize(1)?,
            bottom: args.usize(2)?,
            left: args.usize(3)?,
            right: args.usize(4)?,
            rows: args.i64(5)?,
        },
        "mode_info_set" => RedrawEvent::ModeInfoSet {
            cursor_style_enabled: args.bool(0)?,
            modes: args
                .array(1)?
                .iter()
                .filter_map(Value::as_object)
                .map(decode_mode_info)
                .collect(),
        },
        "mode_change" => RedrawEvent::ModeChange {
            mode: args.string(0)?,
            index: args.usize(1)?,
        },
        "busy_start" => RedrawEvent::BusyStart,
        "busy_stop" => RedrawEvent::BusyStop,
        "set_title" => RedrawEvent::SetTitle(args.string(0)?),
        "option_set" => RedrawEvent::OptionSet {
            name: args.string(0)?,
            value: args.get(1)?.clone(),
        },
        "flush" => RedrawEvent::Flush,
        "mouse_on" | "mouse_off" | "bell" | "visual_bell" | "set_icon" | "update_menu"
        | "suspend" => RedrawEvent::Ignored(name.to_string()),
        _ => RedrawEvent::Unknown(name.to_string()),
    };
    Ok(event)
}

fn decode_line_cells(args: &Args<'_>, index: usize) -> Result<Vec<LineCell>, DecodeError> {
    let wrong_type = || DecodeError::WrongType {
        event: args.event.to_string(),
        index,
    };
    args.array(index)?
        .iter()
        .map(|entry| {
            let entry = entry.as_array().ok_or_else(wrong_type)?;
            let text = entry
                .first()
                .and_then(Value::as_str)
                .ok_or_else(wrong_type)?;
            let hl_id = entry.get(1).and_then(Value::as_u64);
            let repeat = entry
                .get(2)
                .and_then(Value::as_u64)
                .and_then(|n| usize::try_from(n).ok());
            Ok(LineCell::new(text, hl_id, repeat))
        })
        .collect()
}

fn decode_hl_attrs(map: &Map<String, Value>) -> HighlightAttribute {
    let color = |key: &str| map.get(key).and_then(value_to_color);
    let flag = |key: &str| map.get(key).is_some_and(value_to_bool);
    HighlightAttribute {
        foreground: color("foreground"),
        background: color("background"),
        special: color("special"),
        bold: flag("bold"),
        italic: flag("italic"),
        underline: flag("underline"),
        undercurl: flag("undercurl"),
        strikethrough: flag("strikethrough"),
        reverse: flag("reverse"),
    }
}

fn decode_mode_info(map: &Map<String, Value>) -> ModeInfo {
    let text = |key: &str| {
        map.get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };
    let number = |key: &str| map.get(key).and_then(Value::as_u64);
    ModeInfo {
        name: text("name"),
        short_name: text("short_name"),
        cursor_shape: map
            .get("cursor_shape")
            .and_then(Value::as_str)
            .and_then(CursorShape::from_name),
        cell_percentage: number("cell_percentage").map(|n| n.min(100) as u8),
        blinkwait: number("blinkwait"),
        blinkon: number("blinkon"),
        blinkoff: number("blinkoff"),
        attr_id: number("attr_id"),
    }
}

/// Negative integers mean "unset"
fn value_to_color(value: &Value) -> Option<Rgb> {
    let raw = value.as_i64()?;
    u32::try_from(raw).ok().map(Rgb::from_u24)
}

fn value_to_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_i64().is_some_and(|n| n != 0),
        _ => false,
    }
}

/// Positional argument accessor with typed errors
struct Args<'a> {
    event: &'a str,
    values: &'a [Value],
}

impl<'a> Args<'a> {
    fn get(&self, index: usize) -> Result<&'a Value, DecodeError> {
        self.values
            .get(index)
            .ok_or_else(|| DecodeError::MissingArgument {
                event: self.event.to_string(),
                index,
            })
    }

    fn typed<T>(&self, index: usize, f: impl FnOnce(&'a Value) -> Option<T>) -> Result<T, DecodeError> {
        f(self.get(index)?).ok_or_else(|| DecodeError::WrongType {
            event: self.event.to_string(),
            index,
        })
    }

    fn u64(&self, index: usize) -> Result<u64, DecodeError> {
        self.typed(index, Value::as_u64)
    }

    fn usize(&self, index: usize) -> Result<usize, DecodeError> {
        self.typed(index, |v| v.as_u64().and_then(|n| usize::try_from(n).ok()))
    }

    fn i64(&self, index: usize) -> Result<i64, DecodeError> {
        self.typed(index, Value::as_i64)
    }

    fn bool(&self, index: usize) -> Result<bool, DecodeError> {
        self.typed(index, |v| match v {
            Value::Bool(_) | Value::Number(_) => Some(value_to_bool(v)),
            _ => None,
        })
    }

    fn string(&self, index: usize) -> Result<String, DecodeError> {
        self.typed(index, |v| v.as_str().map(str::to_string))
    }

    fn color(&self, index: usize) -> Result<Option<Rgb>, DecodeError> {
        self.typed(index, |v| v.as_i64().map(|_| value_to_color(v)))
    }

    fn array(&self, index: usize) -> Result<&'a Vec<Value>, DecodeError> {
        self.typed(index, Value::as_array)
    }

    fn map(&self, index: usize) -> Result<&'a Map<String, Value>, DecodeError> {
        self.typed(index, Value::as_object)
    }
}
