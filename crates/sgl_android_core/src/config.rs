//! # Loop Configuration
//!
//! Immutable settings of a render cycle driver, loaded once at startup.
//!
//! ```toml
//! target_frame_period_ms = 30
//! overrun_warn_ms = 15
//! thread_name = "sgl-game-loop"
//! ```
//!
//! Every key is optional and falls back to [`LoopConfig::default`], so a
//! missing table and an empty one mean the same thing. TOML has no null;
//! an uncapped loop is written as `uncapped = true` instead of a period.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default target frame period (~33 FPS).
pub const DEFAULT_FRAME_PERIOD_MS: u64 = 30;

/// Default overrun length above which a warning is logged.
pub const DEFAULT_OVERRUN_WARN_MS: u64 = 15;

/// Default render thread name prefix.
pub const DEFAULT_THREAD_NAME: &str = "sgl-game-loop";

/// Configuration for one render cycle driver.
///
/// Never mutated after a driver is constructed from it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "LoopConfigDocument", into = "LoopConfigDocument")]
pub struct LoopConfig {
    /// Target frame period. `None` runs uncapped.
    pub target_frame_period_ms: Option<u64>,
    /// Overruns longer than this are logged at warn level.
    pub overrun_warn_ms: u64,
    /// Render thread name prefix; the instance number is appended.
    pub thread_name: String,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            target_frame_period_ms: Some(DEFAULT_FRAME_PERIOD_MS),
            overrun_warn_ms: DEFAULT_OVERRUN_WARN_MS,
            thread_name: DEFAULT_THREAD_NAME.to_string(),
        }
    }
}

/// On-disk form of [`LoopConfig`].
#[derive(Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct LoopConfigDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    target_frame_period_ms: Option<u64>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    uncapped: bool,
    overrun_warn_ms: u64,
    thread_name: String,
}

impl Default for LoopConfigDocument {
    fn default() -> Self {
        Self {
            target_frame_period_ms: None,
            uncapped: false,
            overrun_warn_ms: DEFAULT_OVERRUN_WARN_MS,
            thread_name: DEFAULT_THREAD_NAME.to_string(),
        }
    }
}

impl TryFrom<LoopConfigDocument> for LoopConfig {
    type Error = ConfigError;

    fn try_from(document: LoopConfigDocument) -> Result<Self, Self::Error> {
        let target_frame_period_ms = match (document.uncapped, document.target_frame_period_ms) {
            (true, Some(_)) => return Err(ConfigError::ConflictingFramePeriod),
            (true, None) => None,
            (false, period) => Some(period.unwrap_or(DEFAULT_FRAME_PERIOD_MS)),
        };
        Ok(Self {
            target_frame_period_ms,
            overrun_warn_ms: document.overrun_warn_ms,
            thread_name: document.thread_name,
        })
    }
}

impl From<LoopConfig> for LoopConfigDocument {
    fn from(config: LoopConfig) -> Self {
        Self {
            uncapped: config.target_frame_period_ms.is_none(),
            target_frame_period_ms: config.target_frame_period_ms,
            overrun_warn_ms: config.overrun_warn_ms,
            thread_name: config.thread_name,
        }
    }
}

impl LoopConfig {
    /// A loop that never sleeps between iterations.
    #[must_use]
    pub fn uncapped() -> Self {
        Self {
            target_frame_period_ms: None,
            ..Self::default()
        }
    }

    /// A loop targeting `fps` frames per second (period rounded down).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroFps`] for a zero rate and
    /// [`ConfigError::ZeroFramePeriod`] for rates above 1000 FPS.
    pub fn with_target_fps(fps: u32) -> Result<Self, ConfigError> {
        if fps == 0 {
            return Err(ConfigError::ZeroFps);
        }
        let config = Self {
            target_frame_period_ms: Some(1000 / u64::from(fps)),
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns a parse error or a validation error.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
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

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroFramePeriod`] for a zero frame period.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target_frame_period_ms == Some(0) {
            return Err(ConfigError::ZeroFramePeriod);
        }
        Ok(())
    }

    /// Target frame period as a [`Duration`].
    #[must_use]
    pub fn target_frame_period(&self) -> Option<Duration> {
        self.target_frame_period_ms.map(Duration::from_millis)
    }
}
