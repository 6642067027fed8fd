//! # Window Metrics
//!
//! Size and density of the game view.
//!
//! Written by the UI thread (surface changed, configuration changes), read
//! by the loop thread. Floats are stored as their bit patterns.

use std::sync::atomic::{AtomicU32, Ordering};

/// Window dimensions and density read by the engine.
pub trait WindowProxy: Send + Sync {
    /// Width in pixels.
    fn width(&self) -> u32;
    /// Height in pixels.
    fn height(&self) -> u32;
    /// Horizontal pixels per inch.
    fn xppi(&self) -> f32;
    /// Vertical pixels per inch.
    fn yppi(&self) -> f32;
    /// Pixels per inch.
    fn ppi(&self) -> f32;
    /// Pixels per inch the engine scales its assets against.
    fn logical_ppi(&self) -> f32;
}

/// Atomic [`WindowProxy`] backing store.
#[derive(Debug)]
pub struct WindowMetrics {
    width: AtomicU32,
    height: AtomicU32,
    xdpi: AtomicU32,
    ydpi: AtomicU32,
    density_dpi: AtomicU32,
}

impl WindowMetrics {
    /// Metrics for a display of the given densities, with no size yet.
    #[must_use]
    pub fn new(xdpi: f32, ydpi: f32, density_dpi: u32) -> Self {
        Self {
            width: AtomicU32::new(0),
            height: AtomicU32::new(0),
            xdpi: AtomicU32::new(xdpi.to_bits()),
            ydpi: AtomicU32::new(ydpi.to_bits()),
            density_dpi: AtomicU32::new(density_dpi),
        }
    }

    /// Records a new surface size.
    pub fn set_size(&self, width: u32, height: u32) {
        self.width.store(width, Ordering::Release);
        self.height.store(height, Ordering::Release);
        tracing::debug!(width, height, "window resized");
    }

    /// Records new display densities.
    pub fn set_density(&self, xdpi: f32, ydpi: f32, density_dpi: u32) {
        self.xdpi.store(xdpi.to_bits(), Ordering::Release);
        self.ydpi.store(ydpi.to_bits(), Ordering::Release);
        self.density_dpi.store(density_dpi, Ordering::Release);
    }

    /// Density bucket of the display.
    #[must_use]
    pub fn density_dpi(&self) -> u32 {
        self.density_dpi.load(Ordering::Acquire)
    }
}

impl Default for WindowMetrics {
    /// Android's baseline density (mdpi).
    fn default() -> Self {
        Self::new(160.0, 160.0, 160)
    }
}

impl WindowProxy for WindowMetrics {
    fn width(&self) -> u32 {
        self.width.load(Ordering::Acquire)
    }

    fn height(&self) -> u32 {
        self.height.load(Ordering::Acquire)
    }

    fn xppi(&self) -> f32 {
        f32::from_bits(self.xdpi.load(Ordering::Acquire))
    }

    fn yppi(&self) -> f32 {
        f32::from_bits(self.ydpi.load(Ordering::Acquire))
    }

    fn ppi(&self) -> f32 {
        self.density_dpi() as f32
    }

    fn logical_ppi(&self) -> f32 {
        self.density_dpi() as f32
    }
}
