//! # Game Activity
//!
//! Host-framework entry points. Every method here is called on the UI
//! thread, in the order the platform delivers the callbacks.
//!
//! ```text
//! on_resume            -> coordinator.on_foreground   (new loop thread)
//! on_pause             -> coordinator.on_background   (stop, no wait)
//! on_surface_created   -> bridge.on_surface_created   (gate ready)
//! on_surface_changed   -> window metrics              (size only)
//! on_surface_destroyed -> bridge.on_surface_destroyed (stop + JOIN)
//! on_destroy           -> coordinator.stop_and_join   (no thread outlives us)
//! ```
//!
//! Resume and surface creation can arrive in either order. The loop polls
//! the gate, so it does not matter which comes first.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use sgl_android_core::{
    DriverReport, DriverStats, GameApp, LifecycleCoordinator, LoopControl, LoopResult, LoopShared,
    SurfaceEventBridge, SurfaceProvider,
};
use sgl_android_platform::{
    input_queue, AssetSystem, InputEvent, InputReceiver, MotionEvent, PlatformProxy, SystemAction,
    TouchListener, WindowMetrics,
};

use crate::config::HostConfig;

/// Key codes the activity reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCode {
    /// Back key.
    Back,
    /// Menu key.
    Menu,
    /// Anything else, by platform key code.
    Other(i32),
}

/// The activity hosting one game.
pub struct GameActivity<A, S> {
    config: HostConfig,
    loops: Arc<LifecycleCoordinator<A, S>>,
    bridge: SurfaceEventBridge<LifecycleCoordinator<A, S>>,
    platform: PlatformProxy,
    touch: Mutex<TouchListener>,
    resumed: AtomicBool,
}

impl<A, S> GameActivity<A, S>
where
    S: SurfaceProvider + 'static,
    A: GameApp<S::Target> + 'static,
{
    /// Creates the activity. No thread runs until [`on_resume`](Self::on_resume).
    ///
    /// `make_app` builds the engine from the platform proxies and the
    /// receiving end of the input queue.
    ///
    /// # Errors
    ///
    /// Returns [`LoopError::Config`](sgl_android_core::LoopError::Config) for
    /// an invalid loop configuration.
    pub fn new<F>(config: HostConfig, surface: S, asset_root: impl Into<PathBuf>, make_app: F) -> LoopResult<Self>
    where
        F: FnOnce(&PlatformProxy, InputReceiver) -> A,
    {
        Self::with_window(config, surface, asset_root, WindowMetrics::default(), make_app)
    }

    /// Same as [`new`](Self::new) with explicit display metrics.
    ///
    /// # Errors
    ///
    /// Returns [`LoopError::Config`](sgl_android_core::LoopError::Config) for
    /// an invalid loop configuration.
    pub fn with_window<F>(
        config: HostConfig,
        surface: S,
        asset_root: impl Into<PathBuf>,
        window: WindowMetrics,
        make_app: F,
    ) -> LoopResult<Self>
    where
        F: FnOnce(&PlatformProxy, InputReceiver) -> A,
    {
        config.game_loop.validate()?;

        let (sender, receiver) = input_queue(config.input_queue_capacity);
        let platform = PlatformProxy::new(Arc::new(window), Arc::new(AssetSystem::new(asset_root)), sender.clone());
        let app = make_app(&platform, receiver);

        let shared = LoopShared::new(app, surface);
        let gate = Arc::clone(&shared.gate);
        let loops = Arc::new(LifecycleCoordinator::new(config.game_loop.clone(), shared)?);
        let bridge = SurfaceEventBridge::new(gate, Arc::clone(&loops));

        tracing::info!(
            keep_screen_on = config.keep_screen_on,
            back_events = config.enable_back_button_events,
            menu_events = config.enable_menu_button_events,
            "activity created"
        );

        Ok(Self {
            config,
            loops,
            bridge,
            platform,
            touch: Mutex::new(TouchListener::new(sender)),
            resumed: AtomicBool::new(false),
        })
    }

    /// The activity became visible and interactive.
    ///
    /// # Errors
    ///
    /// Returns [`LoopError::Spawn`](sgl_android_core::LoopError::Spawn) if
    /// the render thread cannot be created.
    pub fn on_resume(&self) -> LoopResult<()> {
        self.resumed.store(true, Ordering::Release);
        let instance = self.loops.on_foreground()?;
        tracing::info!(instance, "activity resumed");
        Ok(())
    }

    /// The activity lost the foreground.
    pub fn on_pause(&self) {
        self.resumed.store(false, Ordering::Release);
        self.loops.on_background();
        tracing::info!("activity paused");
    }

    /// The surface exists.
    pub fn on_surface_created(&self) {
        self.bridge.on_surface_created();
    }

    /// The surface changed size.
    pub fn on_surface_changed(&self, width: u32, height: u32) {
        self.platform.window().set_size(width, height);
    }

    /// The surface is about to go away. Returns once no render thread is left.
    pub fn on_surface_destroyed(&self) {
        self.bridge.on_surface_destroyed();
    }

    /// Touch listener callback. Always consumes the event.
    pub fn on_touch(&self, event: &MotionEvent) -> bool {
        self.touch.lock().on_touch(event)
    }

    /// Back press. Returns `true` when the engine takes it, `false` to let
    /// the platform apply its default (finish the activity).
    pub fn on_back_pressed(&self) -> bool {
        self.config.enable_back_button_events && self.send_system_action(SystemAction::Back)
    }

    /// Key press. Returns `true` when consumed.
    pub fn on_key_down(&self, key: KeyCode) -> bool {
        match key {
            KeyCode::Menu if self.config.enable_menu_button_events => self.send_system_action(SystemAction::Menu),
            KeyCode::Back => self.on_back_pressed(),
            KeyCode::Menu | KeyCode::Other(_) => false,
        }
    }

    /// The activity is being destroyed.
    pub fn on_destroy(&self) {
        self.resumed.store(false, Ordering::Release);
        let joined = self.loops.stop_and_join();
        tracing::info!(joined, "activity destroyed");
    }

    fn send_system_action(&self, action: SystemAction) -> bool {
        self.platform.input().send(InputEvent::System(action));
        true
    }

    /// Between `on_resume` and `on_pause`.
    #[must_use]
    pub fn is_resumed(&self) -> bool {
        self.resumed.load(Ordering::Acquire)
    }

    /// Whether the host should keep the display awake.
    #[must_use]
    pub fn keep_screen_on(&self) -> bool {
        self.config.keep_screen_on
    }

    /// Proxies for the engine.
    #[must_use]
    pub fn platform(&self) -> &PlatformProxy {
        &self.platform
    }

    /// The game loop coordinator.
    #[must_use]
    pub fn loops(&self) -> &LifecycleCoordinator<A, S> {
        &self.loops
    }

    /// Counters of the most recently ended loop instance.
    #[must_use]
    pub fn last_loop_stats(&self) -> Option<DriverStats> {
        self.loops.last_stats()
    }

    /// Report of the most recently ended loop instance.
    pub fn take_last_loop_report(&self) -> Option<DriverReport> {
        self.loops.take_last_report()
    }
}
