//! # Frame Pacing Benchmark
//!
//! Per-frame bookkeeping cost of the render loop. All of it runs once per
//! iteration on the render thread, so it must stay in the nanoseconds.
//!
//! Run with: `cargo bench --package sgl_android_core`

// Benchmarks don't need strict docs
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use sgl_android_core::{
    compute_sleep, EngineResult, FrameClock, GameApp, LoopConfig, LoopShared, PacingController,
    RenderCycleDriver, RunToken, SurfaceError, SurfaceProvider,
};

struct NullSurface;

impl SurfaceProvider for NullSurface {
    type Target = ();

    fn try_lock(&self) -> Result<Option<()>, SurfaceError> {
        Ok(Some(()))
    }

    fn release(&self, _target: (), _commit: bool) {}
}

struct NullGame {
    frames: u64,
}

impl GameApp<()> for NullGame {
    fn update(&mut self, delta_ms: u64, _target: &mut ()) -> EngineResult<()> {
        self.frames = self.frames.wrapping_add(delta_ms + 1);
        Ok(())
    }

    fn is_screen_stack_empty(&self) -> bool {
        false
    }

    fn push_starting_screen(&mut self) -> EngineResult<()> {
        Ok(())
    }
}

/// Benchmark: drift-corrected delta computation.
fn bench_frame_clock(c: &mut Criterion) {
    c.bench_function("frame_clock_tick", |b| {
        let mut clock = FrameClock::starting_at(0);
        let mut now = 0u64;
        b.iter(|| {
            now += 16_600_000;
            black_box(clock.tick(black_box(now)))
        });
    });
}

/// Benchmark: pacing decisions.
fn bench_pacing(c: &mut Criterion) {
    let mut group = c.benchmark_group("pacing");

    group.bench_function("compute_sleep", |b| {
        b.iter(|| black_box(compute_sleep(black_box(Some(30)), black_box(12))));
    });

    group.bench_function("controller_pace", |b| {
        let mut pacing = PacingController::new(Some(30), 15);
        let mut work = 0u64;
        b.iter(|| {
            work = (work + 7) % 40;
            black_box(pacing.pace(black_box(work)))
        });
    });

    group.finish();
}

/// Benchmark: one driver frame without pacing.
fn bench_driver_frame(c: &mut Criterion) {
    let shared = LoopShared::new(NullGame { frames: 0 }, NullSurface);
    shared.gate.set_ready();
    let mut driver = RenderCycleDriver::new(1, LoopConfig::uncapped(), RunToken::new(), shared);

    c.bench_function("driver_render_frame", |b| {
        b.iter(|| black_box(driver.render_frame().is_ok()));
    });
}

criterion_group!(benches, bench_frame_clock, bench_pacing, bench_driver_frame);
criterion_main!(benches);
