//! # Headless Backend
//!
//! An in-memory surface and a small demo game. Used by the simulation
//! binary and by tests to run the real loop without a display.
//!
//! ```text
//! HeadlessSurface            DemoGame
//! ┌──────────────┐  lock     ┌──────────────────────────────┐
//! │ FrameBuffer  │ ────────> │ drain input, move the square │
//! │ (one, owned) │ <──────── │ clear + draw into the buffer │
//! └──────────────┘  release  └──────────────────────────────┘
//! ```
//!
//! The surface owns exactly one buffer. Locking takes it out; releasing puts
//! it back. A second lock before the release would find it missing.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::Mutex;
use sgl_android_core::{EngineError, EngineResult, GameApp, SurfaceError, SurfaceProvider};
use sgl_android_platform::{InputEvent, InputReceiver, SystemAction};

/// Pixel storage handed to the engine for one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
}

impl FrameBuffer {
    /// A black buffer.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize],
        }
    }

    /// Width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Fills the whole buffer.
    pub fn clear(&mut self, color: u32) {
        self.pixels.fill(color);
    }

    /// Fills a rectangle, clipped to the buffer.
    pub fn fill_rect(&mut self, x: i32, y: i32, w: u32, h: u32, color: u32) {
        let x0 = x.clamp(0, self.width as i32) as usize;
        let y0 = y.clamp(0, self.height as i32) as usize;
        let x1 = (x + w as i32).clamp(0, self.width as i32) as usize;
        let y1 = (y + h as i32).clamp(0, self.height as i32) as usize;

        for row in y0..y1 {
            let start = row * self.width as usize;
            self.pixels[start + x0..start + x1].fill(color);
        }
    }

    /// Pixel at (`x`, `y`).
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get(y as usize * self.width as usize + x as usize).copied()
    }
}

/// Counters of a [`HeadlessSurface`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SurfaceCounters {
    /// Successful locks.
    pub locks: u64,
    /// Releases.
    pub releases: u64,
    /// Releases that posted the frame.
    pub posted: u64,
    /// Lock attempts answered with "unavailable".
    pub unavailable: u64,
}

/// In-memory [`SurfaceProvider`].
#[derive(Debug)]
pub struct HeadlessSurface {
    buffer: Mutex<Option<FrameBuffer>>,
    last_posted: Mutex<Option<FrameBuffer>>,
    available: AtomicBool,
    lost: AtomicBool,
    locks: AtomicU64,
    releases: AtomicU64,
    posted: AtomicU64,
    unavailable: AtomicU64,
}

impl HeadlessSurface {
    /// A surface of the given size.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            buffer: Mutex::new(Some(FrameBuffer::new(width, height))),
            last_posted: Mutex::new(None),
            available: AtomicBool::new(true),
            lost: AtomicBool::new(false),
            locks: AtomicU64::new(0),
            releases: AtomicU64::new(0),
            posted: AtomicU64::new(0),
            unavailable: AtomicU64::new(0),
        }
    }

    /// Makes locks come back empty (`false`) or succeed (`true`).
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::Release);
    }

    /// Makes every further lock fail with [`SurfaceError::Lost`].
    pub fn mark_lost(&self) {
        self.lost.store(true, Ordering::Release);
    }

    /// Whether the buffer is currently handed out.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.buffer.lock().is_none()
    }

    /// Copy of the last posted frame.
    #[must_use]
    pub fn last_posted(&self) -> Option<FrameBuffer> {
        self.last_posted.lock().clone()
    }

    /// Snapshot of the counters.
    #[must_use]
    pub fn counters(&self) -> SurfaceCounters {
        SurfaceCounters {
            locks: self.locks.load(Ordering::Acquire),
            releases: self.releases.load(Ordering::Acquire),
            posted: self.posted.load(Ordering::Acquire),
            unavailable: self.unavailable.load(Ordering::Acquire),
        }
    }
}

impl SurfaceProvider for HeadlessSurface {
    type Target = FrameBuffer;

    fn try_lock(&self) -> Result<Option<FrameBuffer>, SurfaceError> {
        if self.lost.load(Ordering::Acquire) {
            return Err(SurfaceError::Lost(String::from("headless surface marked lost")));
        }
        if !self.available.load(Ordering::Acquire) {
            self.unavailable.fetch_add(1, Ordering::AcqRel);
            return Ok(None);
        }

        match self.buffer.lock().take() {
            Some(buffer) => {
                self.locks.fetch_add(1, Ordering::AcqRel);
                Ok(Some(buffer))
            }
            None => Err(SurfaceError::LockRejected(String::from("buffer already locked"))),
        }
    }

    fn release(&self, target: FrameBuffer, commit: bool) {
        if commit {
            *self.last_posted.lock() = Some(target.clone());
            self.posted.fetch_add(1, Ordering::AcqRel);
        }
        *self.buffer.lock() = Some(target);
        self.releases.fetch_add(1, Ordering::AcqRel);
    }
}

const BACKGROUND: u32 = 0xFF10_1018;
const SQUARE: u32 = 0xFFE0_6030;
const SQUARE_SIZE: u32 = 16;

/// Game that bounces a square and follows touches.
#[derive(Debug)]
pub struct DemoGame {
    screens: Vec<&'static str>,
    input: Option<InputReceiver>,
    position: (i32, i32),
    velocity: (i32, i32),
    elapsed_ms: u64,
    frames: u64,
    touches: u64,
    system_actions: Vec<SystemAction>,
    fail_at_frame: Option<u64>,
}

impl DemoGame {
    /// A game with no screen yet.
    #[must_use]
    pub fn new() -> Self {
        Self {
            screens: Vec::new(),
            input: None,
            position: (0, 0),
            velocity: (120, 80),
            elapsed_ms: 0,
            frames: 0,
            touches: 0,
            system_actions: Vec::new(),
            fail_at_frame: None,
        }
    }

    /// Drains `input` at the start of every frame.
    #[must_use]
    pub fn with_input(mut self, input: InputReceiver) -> Self {
        self.input = Some(input);
        self
    }

    /// Fails the update of frame `frame` (1-based).
    #[must_use]
    pub fn failing_at_frame(mut self, frame: u64) -> Self {
        self.fail_at_frame = Some(frame);
        self
    }

    /// Frames updated.
    #[must_use]
    pub const fn frames(&self) -> u64 {
        self.frames
    }

    /// Game time accumulated from deltas.
    #[must_use]
    pub const fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    /// Touch-down events consumed.
    #[must_use]
    pub const fn touches(&self) -> u64 {
        self.touches
    }

    /// System actions consumed, in order.
    #[must_use]
    pub fn system_actions(&self) -> &[SystemAction] {
        &self.system_actions
    }

    /// Screens pushed so far.
    #[must_use]
    pub fn screens(&self) -> &[&'static str] {
        &self.screens
    }

    /// Square position.
    #[must_use]
    pub const fn position(&self) -> (i32, i32) {
        self.position
    }

    fn handle_input(&mut self) {
        let Some(input) = &self.input else {
            return;
        };
        for event in input.drain() {
            match event {
                InputEvent::TouchDown { x, y, .. } => {
                    self.touches += 1;
                    self.position = (x, y);
                }
                InputEvent::TouchMoved { x, y, .. } => self.position = (x, y),
                InputEvent::TouchUp { .. } => {}
                InputEvent::System(action) => self.system_actions.push(action),
            }
        }
    }

    fn step(&mut self, delta_ms: u64, bounds: (u32, u32)) {
        // Deltas after a long not-ready wait can be huge
        let dt = i64::try_from(delta_ms).unwrap_or(i64::MAX);
        let (x, vx) = bounce(self.position.0, self.velocity.0, dt, bounds.0);
        let (y, vy) = bounce(self.position.1, self.velocity.1, dt, bounds.1);
        self.position = (x, y);
        self.velocity = (vx, vy);
    }
}

/// Moves one axis by `velocity` px/s over `dt_ms`, reflecting off the edges.
fn bounce(position: i32, velocity: i32, dt_ms: i64, extent: u32) -> (i32, i32) {
    let max = i64::from(extent.saturating_sub(SQUARE_SIZE));
    let moved = i64::from(position).saturating_add(i64::from(velocity).saturating_mul(dt_ms) / 1000);
    if (0..=max).contains(&moved) {
        return (i32::try_from(moved).unwrap_or(i32::MAX), velocity);
    }
    let clamped = moved.clamp(0, max);
    (i32::try_from(clamped).unwrap_or(i32::MAX), -velocity)
}

impl Default for DemoGame {
    fn default() -> Self {
        Self::new()
    }
}

impl GameApp<FrameBuffer> for DemoGame {
    fn update(&mut self, delta_ms: u64, target: &mut FrameBuffer) -> EngineResult<()> {
        self.frames += 1;
        if self.fail_at_frame == Some(self.frames) {
            return Err(EngineError::Update(format!("demo failure at frame {}", self.frames)));
        }

        self.elapsed_ms = self.elapsed_ms.saturating_add(delta_ms);
        self.handle_input();
        self.step(delta_ms, (target.width(), target.height()));

        target.clear(BACKGROUND);
        target.fill_rect(self.position.0, self.position.1, SQUARE_SIZE, SQUARE_SIZE, SQUARE);
        Ok(())
    }

    fn is_screen_stack_empty(&self) -> bool {
        self.screens.is_empty()
    }

    fn push_starting_screen(&mut self) -> EngineResult<()> {
        self.screens.push("main");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sgl_android_platform::input_queue;

    #[test]
    fn test_fill_rect_clips() {
        let mut buffer = FrameBuffer::new(8, 4);
        buffer.fill_rect(-2, 2, 4, 10, 7);

        assert_eq!(buffer.pixel(0, 2), Some(7));
        assert_eq!(buffer.pixel(1, 3), Some(7));
        assert_eq!(buffer.pixel(2, 2), Some(0));
        assert_eq!(buffer.pixel(0, 1), Some(0));
        assert_eq!(buffer.pixel(8, 0), None);
    }

    #[test]
    fn test_surface_lock_release_cycle() {
        let surface = HeadlessSurface::new(4, 4);

        let buffer = surface.try_lock().unwrap().unwrap();
        assert!(surface.is_locked());
        assert!(matches!(surface.try_lock(), Err(SurfaceError::LockRejected(_))));

        surface.release(buffer, true);
        assert!(!surface.is_locked());
        assert!(surface.last_posted().is_some());

        let counters = surface.counters();
        assert_eq!(counters.locks, 1);
        assert_eq!(counters.releases, 1);
        assert_eq!(counters.posted, 1);
    }

    #[test]
    fn test_surface_unavailable_and_lost() {
        let surface = HeadlessSurface::new(4, 4);
        surface.set_available(false);
        assert!(matches!(surface.try_lock(), Ok(None)));
        assert_eq!(surface.counters().unavailable, 1);

        surface.set_available(true);
        surface.mark_lost();
        assert!(matches!(surface.try_lock(), Err(SurfaceError::Lost(_))));
    }

    #[test]
    fn test_discarded_frame_is_not_posted() {
        let surface = HeadlessSurface::new(4, 4);
        let buffer = surface.try_lock().unwrap().unwrap();
        surface.release(buffer, false);

        assert_eq!(surface.counters().posted, 0);
        assert!(surface.last_posted().is_none());
        assert!(!surface.is_locked());
    }

    #[test]
    fn test_demo_game_draws_and_moves() {
        let mut game = DemoGame::new();
        let mut buffer = FrameBuffer::new(64, 64);

        assert!(game.is_screen_stack_empty());
        game.push_starting_screen().unwrap();
        assert_eq!(game.screens(), ["main"]);

        game.update(100, &mut buffer).unwrap();
        assert_eq!(game.position(), (12, 8));
        assert_eq!(buffer.pixel(12, 8), Some(SQUARE));
        assert_eq!(buffer.pixel(0, 0), Some(BACKGROUND));
        assert_eq!(game.elapsed_ms(), 100);
    }

    #[test]
    fn test_demo_game_bounces() {
        let mut game = DemoGame::new();
        let mut buffer = FrameBuffer::new(32, 32);

        // 120px/s for 1s overshoots a 16px track
        game.update(1000, &mut buffer).unwrap();
        assert_eq!(game.position().0, 16);
        assert!(game.velocity.0 < 0);
    }

    #[test]
    fn test_demo_game_survives_huge_delta() {
        let mut game = DemoGame::new();
        let mut buffer = FrameBuffer::new(32, 32);

        // ~49 days in one frame; i32 math would overflow
        game.update(u64::from(u32::MAX), &mut buffer).unwrap();
        assert_eq!(game.position(), (16, 16));

        game.update(u64::MAX, &mut buffer).unwrap();
        assert_eq!(game.position(), (0, 0));
        assert_eq!(game.elapsed_ms(), u64::MAX);
    }

    #[test]
    fn test_demo_game_consumes_input() {
        let (sender, receiver) = input_queue(8);
        let mut game = DemoGame::new().with_input(receiver);
        let mut buffer = FrameBuffer::new(64, 64);

        sender.send(InputEvent::TouchDown { x: 30, y: 40, pointer: 0 });
        sender.send(InputEvent::System(SystemAction::Back));
        game.update(0, &mut buffer).unwrap();

        assert_eq!(game.touches(), 1);
        assert_eq!(game.position(), (30, 40));
        assert_eq!(game.system_actions(), [SystemAction::Back]);
    }

    #[test]
    fn test_demo_game_scripted_failure() {
        let mut game = DemoGame::new().failing_at_frame(2);
        let mut buffer = FrameBuffer::new(8, 8);

        assert!(game.update(10, &mut buffer).is_ok());
        assert!(matches!(game.update(10, &mut buffer), Err(EngineError::Update(_))));
        assert_eq!(game.frames(), 2);
    }
}
