//! Session Tests
//!
//! Tests for:
//! - Model loading through MemoryLoader (immediate, deferred, failed)
//! - Frame order: panel writes land before the mixer advances
//! - Settings from JSON
//! - Render back end errors

use std::sync::Arc;

use glam::Vec3;

use clipmix::animation::clip::{AnimationClip, Track, TrackData, TrackMeta};
use clipmix::animation::tracks::{InterpolationMode, KeyframeTrack};
use clipmix::animation::{ActionState, LoopMode, TargetPath};
use clipmix::app::{HeadlessBackend, RenderBackend, Session, SessionSettings};
use clipmix::assets::{LoadReply, MemoryLoader, ModelLoader, PendingModel, Prefab, PrefabNode};
use clipmix::errors::{MixerError, Result};
use clipmix::panel::{FieldValue, controls};
use clipmix::scene::{Camera, Scene};

const EPSILON: f32 = 1e-4;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn monster() -> Prefab {
    let mut prefab = Prefab::new("monster");
    let body = prefab.add_node(PrefabNode::named("Body"), None);
    prefab.add_node(PrefabNode::named("Tail"), Some(body));
    prefab.add_animation(AnimationClip::new(
        "wag",
        vec![Track::new(
            TrackMeta::new("Tail", TargetPath::Translation),
            TrackData::Vector3(KeyframeTrack::new(
                vec![0.0, 2.0],
                vec![Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0)],
                InterpolationMode::Linear,
            )),
        )],
    ));
    prefab.add_animation(AnimationClip::with_duration("idle", 1.0, vec![]));
    prefab
}

fn tail_x<B: RenderBackend>(session: &Session<B>) -> f32 {
    let model = session.model().expect("model loaded");
    let tail = session.scene.find_node_by_name(model.root, "Tail").unwrap();
    session.scene.get_node(tail).unwrap().transform.position.x
}

fn loaded_session() -> Session<HeadlessBackend> {
    let loader = MemoryLoader::new().with_model("monster.dae", monster());
    let mut session = Session::new(HeadlessBackend::new(), SessionSettings::default());
    session.load_model(&loader, "monster.dae");
    session
}

// ============================================================================
// Loading
// ============================================================================

#[test]
fn load_installs_model_on_next_step() {
    let mut session = loaded_session();
    assert!(session.is_loading());
    assert!(session.model().is_none());

    session.step(0.5).unwrap();
    assert!(!session.is_loading());

    let model = session.model().unwrap();
    assert_eq!(model.clips.len(), 2);
    assert_eq!(model.actions.len(), 2);

    // First clip autoplays; the rest wait.
    let first = session.mixer.action(model.actions[0]).unwrap();
    let second = session.mixer.action(model.actions[1]).unwrap();
    assert_eq!(first.state(), ActionState::Playing);
    assert_eq!(second.state(), ActionState::Stopped);

    // The install frame already advanced.
    assert!(approx(tail_x(&session), 0.5));
    assert_eq!(session.backend.frames(), 1);
}

#[test]
fn panel_folders_follow_the_model() {
    let mut session = loaded_session();
    assert!(session.panel.is_empty());
    session.step(0.0).unwrap();

    let names: Vec<&str> = session.panel.folders().map(|f| f.name()).collect();
    assert_eq!(names, ["AnimationMixer", "ClipAction 1", "ClipAction 2"]);
}

#[test]
fn failed_load_leaves_session_inert() {
    let loader = MemoryLoader::new();
    let mut session = Session::new(HeadlessBackend::new(), SessionSettings::default());
    session.load_model(&loader, "missing.dae");

    session.step(0.1).unwrap();
    assert!(session.model().is_none());
    assert!(matches!(
        session.load_error(),
        Some(MixerError::AssetLoadFailure { uri, .. }) if uri == "missing.dae"
    ));
    assert_eq!(session.mixer.action_count(), 0);
    assert!(session.panel.is_empty());

    // Controls stay harmless.
    session.mixer.stop_all_action();
    session
        .control_sender()
        .send(controls::MIXER_FOLDER, controls::TIME_SCALE, FieldValue::Number(2.0));
    session.step(0.1).unwrap();
    assert_eq!(session.backend.frames(), 2);
}

#[test]
fn deferred_load_can_be_awaited() {
    let loader = MemoryLoader::new()
        .with_model("monster.dae", monster())
        .deferred(true);

    let prefab = pollster::block_on(PendingModel::request(&loader, "monster.dae").wait()).unwrap();
    assert_eq!(prefab.name, "monster");
    assert_eq!(prefab.animations.len(), 2);

    let missing = pollster::block_on(PendingModel::request(&loader, "nope").wait());
    assert!(matches!(missing, Err(MixerError::AssetLoadFailure { .. })));
}

#[test]
fn deferred_load_installs_when_ready() {
    let loader = MemoryLoader::new()
        .with_model("monster.dae", monster())
        .deferred(true);
    let mut session = Session::new(HeadlessBackend::new(), SessionSettings::default());
    session.load_model(&loader, "monster.dae");

    for _ in 0..1000 {
        session.step(0.0).unwrap();
        if session.model().is_some() {
            break;
        }
        std::thread::sleep(std::time::Duration::from_millis(1));
    }
    assert!(session.model().is_some());
}

struct SilentLoader;

impl ModelLoader for SilentLoader {
    fn load(&self, _uri: &str, reply: LoadReply) {
        drop(reply);
    }
}

#[test]
fn dropped_reply_is_a_load_failure() {
    let mut pending = PendingModel::request(&SilentLoader, "lost.dae");
    assert!(matches!(
        pending.try_take(),
        Some(Err(MixerError::AssetLoadFailure { .. }))
    ));
    assert!(pending.is_finished());
    assert!(pending.try_take().is_none());
}

#[test]
fn reloading_replaces_model_and_unbinds_old_handles() {
    let loader = MemoryLoader::new().with_model("monster.dae", monster());
    let mut session = loaded_session();
    session.step(0.0).unwrap();
    let old = session.model().unwrap().clone();

    session.load_model(&loader, "monster.dae");
    session.step(0.0).unwrap();
    let new = session.model().unwrap();

    assert_ne!(old.root, new.root);
    assert!(session.scene.get_node(old.root).is_none());
    assert!(matches!(
        session.mixer.action(old.actions[0]),
        Err(MixerError::UnboundAction(_))
    ));
}

// ============================================================================
// Frame Order
// ============================================================================

#[test]
fn queued_panel_writes_apply_before_advance() {
    let mut session = loaded_session();
    session.step(0.0).unwrap();

    let sender = session.control_sender();
    std::thread::spawn(move || {
        sender.send(controls::MIXER_FOLDER, controls::TIME_SCALE, FieldValue::Number(2.0));
    })
    .join()
    .unwrap();

    session.step(0.25).unwrap();
    assert!(approx(session.mixer.time_scale(), 2.0));
    assert!(approx(session.mixer.time(), 0.5));
    assert!(approx(tail_x(&session), 0.5));

    // The panel shows the post-advance state.
    assert_eq!(
        session.panel.read(controls::MIXER_FOLDER, controls::TIME),
        Some(FieldValue::Number(session.mixer.time()))
    );
}

#[test]
fn stop_all_from_panel_takes_effect_next_frame() {
    let mut session = loaded_session();
    session.step(0.5).unwrap();

    session
        .control_sender()
        .press(controls::MIXER_FOLDER, controls::STOP_ALL_ACTION);
    session.step(0.5).unwrap();

    let model = session.model().unwrap();
    assert_eq!(
        session.mixer.action(model.actions[0]).unwrap().state(),
        ActionState::Stopped
    );
    assert!(approx(tail_x(&session), 0.5));
}

#[test]
fn world_matrices_follow_the_pose() {
    let mut session = loaded_session();
    session.step(1.0).unwrap();

    let model = session.model().unwrap();
    let tail = session.scene.find_node_by_name(model.root, "Tail").unwrap();
    let world = session.scene.get_node(tail).unwrap().world_matrix().translation;
    assert!(approx(world.x, 1.0));
}

#[test]
fn negative_step_is_rejected() {
    let mut session = loaded_session();
    session.step(0.5).unwrap();
    assert!(matches!(session.step(-0.1), Err(MixerError::InvalidArgument(_))));
    assert!(approx(session.mixer.time(), 0.5));
}

// ============================================================================
// Settings
// ============================================================================

#[test]
fn settings_fill_missing_fields_from_defaults() {
    let settings: SessionSettings = serde_json::from_str(
        r#"{ "time_scale": 0.5, "default_loop": "ping_pong", "clamp_when_finished": true }"#,
    )
    .unwrap();

    assert!(approx(settings.time_scale, 0.5));
    assert_eq!(settings.default_loop, LoopMode::PingPong);
    assert!(settings.clamp_when_finished);
    assert!(settings.autoplay);
    assert_eq!(settings.time_scale_range, (0.0, 5.0));
}

#[test]
fn settings_shape_created_actions() -> anyhow::Result<()> {
    let settings: SessionSettings =
        serde_json::from_str(r#"{ "autoplay": false, "default_loop": "once", "time_scale": 3.0 }"#)?;
    let loader = MemoryLoader::new().with_model("monster.dae", monster());
    let mut session = Session::new(HeadlessBackend::new(), settings);
    session.load_model(&loader, "monster.dae");
    session.step(0.0)?;

    let model = session.model().unwrap();
    let action = session.mixer.action(model.actions[0])?;
    assert_eq!(action.state(), ActionState::Stopped);
    assert_eq!(action.loop_mode, LoopMode::Once);
    assert!(approx(session.mixer.time_scale(), 3.0));
    Ok(())
}

// ============================================================================
// Render Back End
// ============================================================================

struct BrokenBackend;

impl RenderBackend for BrokenBackend {
    fn render(&mut self, _scene: &Scene, _camera: &Camera) -> Result<()> {
        Err(MixerError::Render("device lost".into()))
    }
}

#[test]
fn render_errors_surface_from_step() {
    let mut session = Session::new(BrokenBackend, SessionSettings::default());
    assert!(matches!(session.step(0.1), Err(MixerError::Render(_))));
    // The mixer had already advanced when rendering failed.
    assert!(approx(session.mixer.time(), 0.1));
    assert_eq!(session.frame_count(), 0);
}

#[test]
fn wall_clock_frames_run() {
    let mut session = loaded_session();
    session.frame().unwrap();
    session.frame().unwrap();
    assert_eq!(session.frame_count(), 2);
    assert!(session.clock().frame_count == 2);
    assert!(session.mixer.time() <= 2.0 * session.settings.max_frame_delta + EPSILON);
}

#[test]
fn shared_clip_is_not_copied() {
    let mut session = loaded_session();
    session.step(0.0).unwrap();
    let model = session.model().unwrap();
    let action = session.mixer.action(model.actions[0]).unwrap();
    assert!(Arc::ptr_eq(action.clip(), &model.clips[0]));
}
