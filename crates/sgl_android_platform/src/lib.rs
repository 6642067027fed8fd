//! # SGL Android Platform
//!
//! The proxies the Android host hands to the engine.
//!
//! ```text
//! ┌──────────────────────────── PlatformProxy ────────────────────────────┐
//! │ window   : WindowMetrics  (size, density)                             │
//! │ system   : AssetSystem    (time, exit, text/binary assets)            │
//! │ resources: ResourcePath   (both roots empty on Android)               │
//! │ input    : InputSender    (touch + system actions -> loop thread)     │
//! └───────────────────────────────────────────────────────────────────────┘
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod error;
pub mod input;
pub mod queue;
pub mod resource;
pub mod system;
pub mod window;

use std::sync::Arc;

pub use error::{PlatformError, PlatformResult};
pub use input::{translate, translate_into, InputEvent, MotionAction, MotionEvent, SystemAction, TouchListener, TouchPointer};
pub use queue::{input_queue, InputReceiver, InputSender};
pub use resource::ResourcePath;
pub use system::{AssetSystem, SystemProxy};
pub use window::{WindowMetrics, WindowProxy};

/// Everything the engine reaches the platform through.
#[derive(Debug, Clone)]
pub struct PlatformProxy {
    window: Arc<WindowMetrics>,
    system: Arc<AssetSystem>,
    input: InputSender,
}

impl PlatformProxy {
    /// Bundles the proxies.
    #[must_use]
    pub fn new(window: Arc<WindowMetrics>, system: Arc<AssetSystem>, input: InputSender) -> Self {
        Self { window, system, input }
    }

    /// Window metrics.
    #[must_use]
    pub fn window(&self) -> &Arc<WindowMetrics> {
        &self.window
    }

    /// System services.
    #[must_use]
    pub fn system(&self) -> &Arc<AssetSystem> {
        &self.system
    }

    /// Sender feeding the engine's input queue.
    #[must_use]
    pub fn input(&self) -> &InputSender {
        &self.input
    }

    /// Root of the bundled resources.
    #[must_use]
    pub fn resources_root(&self) -> ResourcePath {
        ResourcePath::root()
    }

    /// Root of the density-specific resources.
    #[must_use]
    pub fn multi_dpi_resources_root(&self) -> ResourcePath {
        ResourcePath::root()
    }
}
