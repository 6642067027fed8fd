//! # SGL Android Simulator
//!
//! Runs the headless backend through a scripted activity lifecycle.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=debug sgl_android_sim [host.toml]
//! ```

use std::process::ExitCode;
use std::thread;
use std::time::Duration;

use sgl_android::headless::{DemoGame, FrameBuffer, HeadlessSurface};
use sgl_android::{GameActivity, HostConfig, KeyCode};
use sgl_android_platform::{MotionAction, MotionEvent, TouchPointer};
use tracing_subscriber::EnvFilter;

const SURFACE_WIDTH: u32 = 320;
const SURFACE_HEIGHT: u32 = 240;

type SimActivity = GameActivity<DemoGame, HeadlessSurface>;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_thread_names(true)
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => match HostConfig::from_toml_file(&path) {
            Ok(config) => config,
            Err(err) => {
                tracing::error!(%path, error = %err, "invalid host config");
                return ExitCode::FAILURE;
            }
        },
        None => HostConfig::default(),
    };

    let surface = HeadlessSurface::new(SURFACE_WIDTH, SURFACE_HEIGHT);
    let activity = match GameActivity::new(config, surface, "assets", |_, input| DemoGame::new().with_input(input)) {
        Ok(activity) => activity,
        Err(err) => {
            tracing::error!(error = %err, "failed to create activity");
            return ExitCode::FAILURE;
        }
    };

    match run_script(&activity) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "simulation aborted");
            activity.on_destroy();
            ExitCode::FAILURE
        }
    }
}

fn run_script(activity: &SimActivity) -> sgl_android_core::LoopResult<()> {
    // Cold start: surface first, then resume
    activity.on_surface_created();
    activity.on_surface_changed(SURFACE_WIDTH, SURFACE_HEIGHT);
    activity.on_resume()?;
    thread::sleep(Duration::from_millis(200));

    let tap = TouchPointer::new(0, 160.0, 120.0);
    activity.on_touch(&MotionEvent::new(MotionAction::Down, vec![tap.clone()]));
    activity.on_touch(&MotionEvent::new(MotionAction::Up, vec![tap]));
    let back_consumed = activity.on_back_pressed();
    let menu_consumed = activity.on_key_down(KeyCode::Menu);
    tracing::info!(back_consumed, menu_consumed, "system keys delivered");
    thread::sleep(Duration::from_millis(100));

    // Home button: pause, then the surface goes away
    activity.on_pause();
    activity.on_surface_destroyed();
    report(activity);

    // Back to the app: resume before the surface exists, with flicker
    activity.on_resume()?;
    thread::sleep(Duration::from_millis(50));
    for _ in 0..3 {
        activity.on_surface_created();
        thread::sleep(Duration::from_millis(40));
        activity.on_surface_destroyed();
        activity.on_resume()?;
    }
    activity.on_surface_created();
    thread::sleep(Duration::from_millis(200));

    activity.on_pause();
    activity.on_surface_destroyed();
    report(activity);

    activity.on_destroy();
    summarize(activity);
    Ok(())
}

fn report(activity: &SimActivity) {
    let Some(report) = activity.take_last_loop_report() else {
        tracing::warn!("no loop report available");
        return;
    };
    let stats = report.stats;
    tracing::info!(
        instance = report.instance,
        exit = ?report.exit,
        iterations = stats.iterations,
        frames = stats.frames_rendered,
        skipped_not_ready = stats.skipped_not_ready,
        skipped_unavailable = stats.skipped_unavailable,
        overruns = stats.pacing.overruns,
        "loop instance report"
    );
}

fn summarize(activity: &SimActivity) {
    let shared = activity.loops().shared();
    let counters = shared.surface.counters();
    let game = shared.app.lock();
    let last_frame = shared.surface.last_posted().map(|frame: FrameBuffer| (frame.width(), frame.height()));

    tracing::info!(
        locks = counters.locks,
        releases = counters.releases,
        posted = counters.posted,
        game_frames = game.frames(),
        game_time_ms = game.elapsed_ms(),
        touches = game.touches(),
        system_actions = game.system_actions().len(),
        screens = game.screens().len(),
        last_frame = ?last_frame,
        "simulation finished"
    );
}
