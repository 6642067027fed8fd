//! # Error Types
//!
//! All errors that can occur around the game loop.
//!
//! None of these cross the loop boundary as a return value of a lifecycle
//! callback. Engine and surface failures end the loop instance and are
//! reported through [`LoopExit`](crate::LoopExit) in the driver report.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the engine through its entry points.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The engine's update/render call failed.
    #[error("engine update failed: {0}")]
    Update(String),

    /// The starting screen could not be pushed.
    #[error("engine initialization failed: {0}")]
    Initialization(String),

    /// Any other engine-side error.
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// Fatal drawing-target failures.
///
/// A target that is merely unavailable this iteration is NOT an error; the
/// provider reports it as `Ok(None)`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SurfaceError {
    /// The surface was lost for good (not a teardown race).
    #[error("surface lost: {0}")]
    Lost(String),

    /// The platform refused the lock for a reason that will not go away.
    #[error("surface lock rejected: {0}")]
    LockRejected(String),
}

/// Invalid or unreadable configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The configuration is not valid TOML for this schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A frame period of zero milliseconds was configured.
    #[error("target frame period must be at least 1ms")]
    ZeroFramePeriod,

    /// Both `uncapped = true` and a target frame period were given.
    #[error("uncapped loop cannot also set target_frame_period_ms")]
    ConflictingFramePeriod,

    /// A target rate of zero frames per second was requested.
    #[error("target fps must be greater than zero")]
    ZeroFps,
}

/// Errors surfaced to the host by lifecycle operations.
#[derive(Error, Debug)]
pub enum LoopError {
    /// The OS refused to start the render thread.
    #[error("failed to spawn render thread: {0}")]
    Spawn(#[from] std::io::Error),

    /// Invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type for engine entry points.
pub type EngineResult<T> = Result<T, EngineError>;

/// Result type for lifecycle operations.
pub type LoopResult<T> = Result<T, LoopError>;
