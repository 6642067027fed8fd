//! # System Proxy
//!
//! Time, exit requests and asset loading for the engine.
//!
//! The engine may ask to exit from the loop thread; the host polls
//! [`SystemProxy::exit_requested`] on the UI thread and finishes the
//! activity itself.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use crate::error::{PlatformError, PlatformResult};
use crate::resource::ResourcePath;

/// System services exposed to the engine.
pub trait SystemProxy: Send + Sync {
    /// Wall-clock milliseconds since the Unix epoch.
    fn current_time_millis(&self) -> u64;

    /// Monotonic nanoseconds, only meaningful as differences.
    fn nano_time(&self) -> u64;

    /// Requests the application to exit.
    fn exit(&self);

    /// Whether [`exit`](Self::exit) has been called.
    fn exit_requested(&self) -> bool;

    /// Loads a text resource as lines.
    ///
    /// # Errors
    ///
    /// Returns an error if the resource cannot be resolved or read.
    fn load_text(&self, path: &ResourcePath) -> PlatformResult<Vec<String>>;

    /// Loads a binary resource.
    ///
    /// # Errors
    ///
    /// Returns an error if the resource cannot be resolved or read.
    fn load_binary(&self, path: &ResourcePath) -> PlatformResult<Vec<u8>>;
}

/// [`SystemProxy`] reading resources from a directory.
#[derive(Debug)]
pub struct AssetSystem {
    asset_root: PathBuf,
    origin: Instant,
    exit_requested: AtomicBool,
}

impl AssetSystem {
    /// Serves resources from `asset_root`.
    #[must_use]
    pub fn new(asset_root: impl Into<PathBuf>) -> Self {
        Self {
            asset_root: asset_root.into(),
            origin: Instant::now(),
            exit_requested: AtomicBool::new(false),
        }
    }

    /// Directory resources are resolved against.
    #[must_use]
    pub fn asset_root(&self) -> &Path {
        &self.asset_root
    }

    /// Maps a resource path to a file under the asset root.
    ///
    /// # Errors
    ///
    /// Rejects empty paths and parts that would leave the asset root.
    pub fn resolve(&self, path: &ResourcePath) -> PlatformResult<PathBuf> {
        if path.parts().is_empty() {
            return Err(PlatformError::InvalidPath(String::from("<empty>")));
        }

        let mut resolved = self.asset_root.clone();
        for part in path.parts() {
            if part.is_empty() || part == "." || part == ".." || part.contains(['/', '\\']) {
                return Err(PlatformError::InvalidPath(path.to_string()));
            }
            resolved.push(part);
        }
        Ok(resolved)
    }

    fn read(&self, path: &ResourcePath) -> PlatformResult<Vec<u8>> {
        let file = self.resolve(path)?;
        let bytes = std::fs::read(&file).map_err(|source| PlatformError::Asset { path: file, source })?;
        tracing::debug!(resource = %path, bytes = bytes.len(), "asset loaded");
        Ok(bytes)
    }
}

impl SystemProxy for AssetSystem {
    fn current_time_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| elapsed.as_millis() as u64)
    }

    fn nano_time(&self) -> u64 {
        self.origin.elapsed().as_nanos() as u64
    }

    fn exit(&self) {
        if !self.exit_requested.swap(true, Ordering::AcqRel) {
            tracing::info!("exit requested by the engine");
        }
    }

    fn exit_requested(&self) -> bool {
        self.exit_requested.load(Ordering::Acquire)
    }

    fn load_text(&self, path: &ResourcePath) -> PlatformResult<Vec<String>> {
        let file = self.resolve(path)?;
        let bytes = self.read(path)?;
        let text = String::from_utf8(bytes).map_err(|source| {
            tracing::warn!(resource = %path, error = %source, "text asset is not valid UTF-8");
            PlatformError::InvalidText { path: file, source }
        })?;
        Ok(text.lines().map(str::to_owned).collect())
    }

    fn load_binary(&self, path: &ResourcePath) -> PlatformResult<Vec<u8>> {
        self.read(path)
    }
}
