//! # Host Configuration
//!
//! ```toml
//! keep_screen_on = true
//! enable_back_button_events = false
//! enable_menu_button_events = false
//! input_queue_capacity = 256
//!
//! [loop]
//! target_frame_period_ms = 30
//! overrun_warn_ms = 15
//! ```
//!
//! Leaving out `[loop]` or any of its keys keeps the loop defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};
use sgl_android_core::{ConfigError, LoopConfig};

/// Default input queue capacity.
pub const DEFAULT_INPUT_QUEUE_CAPACITY: usize = 256;

/// Activity-level settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HostConfig {
    /// Keep the display awake while the activity is shown.
    pub keep_screen_on: bool,
    /// Deliver back presses to the engine instead of the OS.
    pub enable_back_button_events: bool,
    /// Deliver the menu key to the engine.
    pub enable_menu_button_events: bool,
    /// Capacity of the input queue.
    pub input_queue_capacity: usize,
    /// Game loop settings.
    #[serde(rename = "loop")]
    pub game_loop: LoopConfig,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            keep_screen_on: true,
            enable_back_button_events: false,
            enable_menu_button_events: false,
            input_queue_capacity: DEFAULT_INPUT_QUEUE_CAPACITY,
            game_loop: LoopConfig::default(),
        }
    }
}

impl HostConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns a parse error or a validation error.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.game_loop.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an I/O, parse or validation error.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }
}
