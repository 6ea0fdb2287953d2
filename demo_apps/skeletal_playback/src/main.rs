//! Loads a small rig with two clips, plays them through a headless session
//! and drives the control panel the way a UI thread would.
//!
//! Run with `RUST_LOG=debug` to see mixer and loader logs.

use std::f32::consts::FRAC_PI_2;

use glam::{Quat, Vec3};

use clipmix::animation::clip::{Track, TrackData, TrackMeta};
use clipmix::animation::tracks::{InterpolationMode, KeyframeTrack};
use clipmix::animation::{LoopMode, MixerEvent, TargetPath};
use clipmix::app::{HeadlessBackend, Session, SessionSettings};
use clipmix::assets::{MemoryLoader, PendingModel};
use clipmix::panel::{FieldValue, controls};
use clipmix::scene::Transform;
use clipmix::{AnimationClip, Prefab, PrefabNode};

const MODEL_URI: &str = "models/rig.dae";
const FRAME_DT: f32 = 1.0 / 30.0;

fn rig() -> clipmix::Result<Prefab> {
    let mut prefab = Prefab::new("rig");
    let hips = prefab.add_node(
        PrefabNode::named("Hips")
            .with_transform(Transform::from_trs(Vec3::new(0.0, 10.0, 0.0), Quat::IDENTITY, Vec3::ONE)),
        None,
    );
    let spine = prefab.add_node(PrefabNode::named("Spine"), Some(hips));
    prefab.add_node(PrefabNode::named("Head"), Some(spine));
    prefab.add_node(PrefabNode::named("LeftArm"), Some(spine));

    prefab.add_animation(AnimationClip::new(
        "sway",
        vec![Track::new(
            TrackMeta::new("Spine", TargetPath::Rotation),
            TrackData::Quaternion(KeyframeTrack::new(
                vec![0.0, 1.0, 2.0],
                vec![
                    Quat::from_rotation_z(-0.3),
                    Quat::from_rotation_z(0.3),
                    Quat::from_rotation_z(-0.3),
                ],
                InterpolationMode::Linear,
            )),
        )],
    ));

    prefab.add_animation(AnimationClip::new(
        "wave",
        vec![
            Track::new(
                "LeftArm.quaternion".parse()?,
                TrackData::Quaternion(KeyframeTrack::new(
                    vec![0.0, 0.75],
                    vec![Quat::IDENTITY, Quat::from_rotation_x(FRAC_PI_2)],
                    InterpolationMode::Linear,
                )),
            ),
            Track::new(
                TrackMeta::new("Spine", TargetPath::Rotation),
                TrackData::Quaternion(KeyframeTrack::new(
                    vec![0.0, 0.75],
                    vec![Quat::IDENTITY, Quat::IDENTITY],
                    InterpolationMode::Step,
                )),
            ),
        ],
    ));

    Ok(prefab)
}

fn log_pose(session: &Session<HeadlessBackend>, root: clipmix::NodeHandle) {
    let scene = &session.scene;
    let spine = scene
        .find_node_by_name(root, "Spine")
        .and_then(|h| scene.get_node(h))
        .map(|n| n.transform.rotation);
    let head = scene
        .find_node_by_name(root, "Head")
        .and_then(|h| scene.get_node(h))
        .map(|n| n.world_matrix().translation);

    log::info!(
        "t={:.2}s spine={:?} head={:?}",
        session.mixer.time(),
        spine,
        head
    );
}

fn run_frames(session: &mut Session<HeadlessBackend>, root: clipmix::NodeHandle, frames: u32) -> anyhow::Result<()> {
    for i in 0..frames {
        session.step(FRAME_DT)?;

        for event in session.mixer.events() {
            match event {
                MixerEvent::Loop { action, loop_delta } => {
                    log::info!("{action} looped ({loop_delta:+})");
                }
                MixerEvent::Finished { action, direction } => {
                    log::info!("{action} finished playing {direction:?}");
                }
            }
        }

        if i % 15 == 0 {
            log_pose(session, root);
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let loader = MemoryLoader::new()
        .with_model(MODEL_URI, rig()?)
        .deferred(true);

    println!("Loading model from: {MODEL_URI}");
    let prefab = pollster::block_on(PendingModel::request(&loader, MODEL_URI).wait())?;
    println!(
        "Loaded {} nodes, {} clips",
        prefab.nodes.len(),
        prefab.animations.len()
    );

    let settings = SessionSettings {
        default_loop: LoopMode::PingPong,
        ..Default::default()
    };
    let mut session = Session::new(HeadlessBackend::new(), settings);
    let model = session.install(&prefab).clone();
    let (sway, wave) = (model.actions[0], model.actions[1]);

    // Sway alone.
    run_frames(&mut session, model.root, 60)?;

    // Wave once on top of it, held at the end.
    session
        .mixer
        .action_mut(wave)?
        .set_loop(LoopMode::Once, None)
        .play()
        .clamp_when_finished = true;

    let sender = session.control_sender();
    std::thread::spawn(move || {
        sender.send("ClipAction 2", controls::EFFECTIVE_WEIGHT, FieldValue::Number(0.5));
        sender.send(controls::MIXER_FOLDER, controls::TIME_SCALE, FieldValue::Number(2.0));
    })
    .join()
    .map_err(|_| anyhow::anyhow!("panel thread panicked"))?;

    run_frames(&mut session, model.root, 45)?;
    log::info!(
        "sway weight {:.2}, wave weight {:.2}, wave {:?}",
        session.mixer.action(sway)?.effective_weight(),
        session.mixer.action(wave)?.effective_weight(),
        session.mixer.action(wave)?.state()
    );

    // Everything off from the panel; the pose stays where it was.
    session
        .control_sender()
        .press(controls::MIXER_FOLDER, controls::STOP_ALL_ACTION);
    run_frames(&mut session, model.root, 16)?;

    println!(
        "Rendered {} frames, mixer time {:.2}s, {} active actions",
        session.backend.frames(),
        session.mixer.time(),
        session.mixer.active_actions().count()
    );
    Ok(())
}
