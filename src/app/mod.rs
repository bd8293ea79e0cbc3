//! Application glue module
//!
//! Configuration shared by the editor and the replay harness.

mod config;

pub use config::{ColorConfig, Config, ConfigError, CursorConfig};
