//! Integration tests for the activity host on the headless backend.

use std::thread;
use std::time::{Duration, Instant};

use sgl_android::headless::{DemoGame, HeadlessSurface};
use sgl_android::{GameActivity, HostConfig, KeyCode};
use sgl_android_core::{LoopConfig, LoopExit, SurfaceError};
use sgl_android_platform::{MotionAction, MotionEvent, SystemAction, TouchPointer, WindowMetrics, WindowProxy};

type TestActivity = GameActivity<DemoGame, HeadlessSurface>;

fn test_config() -> HostConfig {
    HostConfig {
        game_loop: LoopConfig {
            target_frame_period_ms: Some(2),
            ..LoopConfig::default()
        },
        ..HostConfig::default()
    }
}

fn activity(config: HostConfig) -> TestActivity {
    GameActivity::new(config, HeadlessSurface::new(64, 48), "assets", |_, input| {
        DemoGame::new().with_input(input)
    })
    .unwrap()
}

fn wait_for(mut condition: impl FnMut() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !condition() {
        assert!(Instant::now() < deadline, "condition not reached in time");
        thread::sleep(Duration::from_millis(1));
    }
}

fn game_frames(activity: &TestActivity) -> u64 {
    activity.loops().shared().app.lock().frames()
}

#[test]
fn test_resume_before_surface_renders_after_create() {
    let activity = activity(test_config());

    activity.on_resume().unwrap();
    assert!(activity.is_resumed());
    thread::sleep(Duration::from_millis(20));
    assert_eq!(game_frames(&activity), 0);

    activity.on_surface_created();
    wait_for(|| game_frames(&activity) >= 5);

    activity.on_pause();
    activity.on_surface_destroyed();
    assert!(!activity.is_resumed());

    let surface = &activity.loops().shared().surface;
    let counters = surface.counters();
    assert_eq!(counters.locks, counters.releases);
    assert!(!surface.is_locked());
    assert!(surface.last_posted().is_some());
}

#[test]
fn test_surface_destroyed_joins_render_thread() {
    let activity = activity(test_config());
    activity.on_surface_created();
    activity.on_resume().unwrap();
    wait_for(|| game_frames(&activity) >= 3);

    // Surface goes away while still resumed
    activity.on_surface_destroyed();
    assert_eq!(activity.loops().live_threads(), 0);

    let frames = game_frames(&activity);
    let locks = activity.loops().shared().surface.counters().locks;
    thread::sleep(Duration::from_millis(20));
    assert_eq!(game_frames(&activity), frames);
    assert_eq!(activity.loops().shared().surface.counters().locks, locks);
}

#[test]
fn test_starting_screen_pushed_once_across_sessions() {
    let activity = activity(test_config());
    activity.on_surface_created();

    for _ in 0..3 {
        activity.on_resume().unwrap();
        let before = game_frames(&activity);
        wait_for(|| game_frames(&activity) > before + 2);
        activity.on_pause();
    }
    activity.on_destroy();

    assert_eq!(activity.loops().shared().app.lock().screens(), ["main"]);
}

#[test]
fn test_touches_reach_the_game() {
    let activity = activity(test_config());
    activity.on_surface_created();
    activity.on_resume().unwrap();

    let pointer = TouchPointer::new(0, 20.0, 10.0);
    assert!(activity.on_touch(&MotionEvent::new(MotionAction::Down, vec![pointer.clone()])));
    assert!(activity.on_touch(&MotionEvent::new(MotionAction::Up, vec![pointer])));

    wait_for(|| activity.loops().shared().app.lock().touches() == 1);
    activity.on_destroy();
}

#[test]
fn test_system_keys_disabled_by_default() {
    let activity = activity(test_config());
    assert!(!activity.on_back_pressed());
    assert!(!activity.on_key_down(KeyCode::Menu));
    assert!(!activity.on_key_down(KeyCode::Other(24)));
    assert!(activity.keep_screen_on());
}

#[test]
fn test_system_keys_delivered_when_enabled() {
    let activity = activity(HostConfig {
        enable_back_button_events: true,
        enable_menu_button_events: true,
        ..test_config()
    });
    activity.on_surface_created();
    activity.on_resume().unwrap();

    assert!(activity.on_back_pressed());
    assert!(activity.on_key_down(KeyCode::Menu));
    assert!(activity.on_key_down(KeyCode::Back));

    wait_for(|| activity.loops().shared().app.lock().system_actions().len() == 3);
    activity.on_destroy();

    assert_eq!(
        activity.loops().shared().app.lock().system_actions(),
        [SystemAction::Back, SystemAction::Menu, SystemAction::Back]
    );
}

#[test]
fn test_engine_failure_ends_instance_and_releases() {
    let activity = GameActivity::new(test_config(), HeadlessSurface::new(8, 8), "assets", |_, input| {
        DemoGame::new().with_input(input).failing_at_frame(3)
    })
    .unwrap();

    activity.on_surface_created();
    activity.on_resume().unwrap();
    wait_for(|| !activity.loops().is_loop_active());
    activity.on_surface_destroyed();

    let report = activity.take_last_loop_report().unwrap();
    assert!(matches!(report.exit, LoopExit::EngineFailure(_)));

    let counters = activity.loops().shared().surface.counters();
    assert_eq!(counters.locks, 3);
    assert_eq!(counters.releases, 3);
    assert_eq!(counters.posted, 2);
}

#[test]
fn test_lost_surface_ends_instance() {
    let activity = activity(test_config());
    activity.loops().shared().surface.mark_lost();

    activity.on_surface_created();
    activity.on_resume().unwrap();
    wait_for(|| !activity.loops().is_loop_active());
    activity.on_destroy();

    let report = activity.take_last_loop_report().unwrap();
    assert!(matches!(report.exit, LoopExit::SurfaceFailure(SurfaceError::Lost(_))));
    assert_eq!(report.stats.locks_acquired, 0);
}

#[test]
fn test_unavailable_surface_skips_frames() {
    let activity = activity(test_config());
    let surface = &activity.loops().shared().surface;
    surface.set_available(false);

    activity.on_surface_created();
    activity.on_resume().unwrap();
    wait_for(|| surface.counters().unavailable >= 3);
    assert_eq!(game_frames(&activity), 0);

    surface.set_available(true);
    wait_for(|| game_frames(&activity) >= 1);
    activity.on_destroy();

    let stats = activity.last_loop_stats().unwrap();
    assert!(stats.skipped_unavailable >= 3);
    assert_eq!(stats.initializations, 1);
}

#[test]
fn test_surface_changed_updates_window() {
    let activity = GameActivity::with_window(
        test_config(),
        HeadlessSurface::new(8, 8),
        "assets",
        WindowMetrics::new(440.0, 440.0, 480),
        |platform, input| {
            assert!((platform.window().ppi() - 480.0).abs() < f32::EPSILON);
            DemoGame::new().with_input(input)
        },
    )
    .unwrap();

    activity.on_surface_changed(1080, 2340);
    assert_eq!(activity.platform().window().width(), 1080);
    assert_eq!(activity.platform().window().height(), 2340);
}

#[test]
fn test_invalid_config_rejected() {
    let config = HostConfig {
        game_loop: LoopConfig {
            target_frame_period_ms: Some(0),
            ..LoopConfig::default()
        },
        ..HostConfig::default()
    };
    let result = GameActivity::new(config, HeadlessSurface::new(8, 8), "assets", |_, input| {
        DemoGame::new().with_input(input)
    });
    assert!(result.is_err());
}
