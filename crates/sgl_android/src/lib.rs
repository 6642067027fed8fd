//! # SGL Android
//!
//! The Android activity host of the SGL game framework.
//!
//! [`GameActivity`] receives the host-framework callbacks and drives the
//! game loop from `sgl_android_core` with the proxies from
//! `sgl_android_platform`. The [`headless`] backend runs the same loop
//! without a display.
//!
//! ## Example
//!
//! ```rust,ignore
//! use sgl_android::{GameActivity, HostConfig};
//! use sgl_android::headless::{DemoGame, HeadlessSurface};
//!
//! let activity = GameActivity::new(HostConfig::default(), HeadlessSurface::new(320, 240), "assets", |_, input| {
//!     DemoGame::new().with_input(input)
//! })?;
//!
//! activity.on_resume()?;
//! activity.on_surface_created();
//! // ...
//! activity.on_pause();
//! activity.on_surface_destroyed();
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod activity;
pub mod config;
pub mod headless;

pub use activity::{GameActivity, KeyCode};
pub use config::{HostConfig, DEFAULT_INPUT_QUEUE_CAPACITY};
