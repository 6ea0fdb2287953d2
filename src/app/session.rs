use std::sync::Arc;

use glam::Vec3;

use crate::animation::{ActionHandle, AnimationClip, AnimationMixer};
use crate::app::backend::RenderBackend;
use crate::app::settings::SessionSettings;
use crate::assets::{ModelLoader, PendingModel, Prefab};
use crate::errors::{MixerError, Result};
use crate::panel::{ControlPanel, ControlSender, controls};
use crate::scene::{Camera, NodeHandle, Scene};
use crate::utils::{FpsCounter, FrameClock};

/// A model instantiated into the session's scene.
#[derive(Debug, Clone)]
pub struct LoadedModel {
    pub name: String,
    pub root: NodeHandle,
    pub clips: Vec<Arc<AnimationClip>>,
    /// One action per clip, in clip order.
    pub actions: Vec<ActionHandle>,
}

/// Owns everything a playback frame touches.
///
/// # Frame Order
///
/// [`step`](Self::step) runs, in order:
/// 1. finish a pending model load
/// 2. apply queued panel writes to the mixer
/// 3. advance the mixer, writing the pose into the scene
/// 4. propagate world matrices
/// 5. refresh panel values
/// 6. render
pub struct Session<B: RenderBackend> {
    pub settings: SessionSettings,
    pub scene: Scene,
    pub camera: Camera,
    pub backend: B,
    pub mixer: AnimationMixer,
    pub panel: ControlPanel<AnimationMixer>,

    clock: FrameClock,
    fps: FpsCounter,
    pending: Option<PendingModel>,
    model: Option<LoadedModel>,
    load_error: Option<MixerError>,
    frame_count: u64,
}

impl<B: RenderBackend> Session<B> {
    #[must_use]
    pub fn new(backend: B, settings: SessionSettings) -> Self {
        let mut mixer = AnimationMixer::new();
        mixer.set_time_scale(settings.time_scale);

        Self {
            clock: FrameClock::new(settings.max_frame_duration()),
            settings,
            scene: Scene::new(),
            camera: Camera::new_perspective(45.0, 16.0 / 9.0, 0.1, 1000.0)
                .with_position(Vec3::new(0.0, 70.0, 100.0)),
            backend,
            mixer,
            panel: ControlPanel::new(),
            fps: FpsCounter::new(),
            pending: None,
            model: None,
            load_error: None,
            frame_count: 0,
        }
    }

    // ========================================================================
    // Model Loading
    // ========================================================================

    /// Starts loading `uri`. The model is installed by the first `step`
    /// after the loader answers. A load already in flight is abandoned.
    pub fn load_model(&mut self, loader: &dyn ModelLoader, uri: &str) {
        if let Some(previous) = self.pending.take() {
            log::debug!("Abandoning load of '{}'", previous.uri());
        }
        self.load_error = None;
        self.pending = Some(PendingModel::request(loader, uri));
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    #[must_use]
    pub fn model(&self) -> Option<&LoadedModel> {
        self.model.as_ref()
    }

    /// The failure of the last load, if it failed.
    #[must_use]
    pub fn load_error(&self) -> Option<&MixerError> {
        self.load_error.as_ref()
    }

    fn poll_load(&mut self) {
        let Some(pending) = self.pending.as_mut() else {
            return;
        };
        let Some(result) = pending.try_take() else {
            return;
        };
        self.pending = None;

        match result {
            Ok(prefab) => {
                self.install(&prefab);
            }
            Err(e) => {
                log::error!("{e}");
                self.load_error = Some(e);
            }
        }
    }

    /// Instantiates `prefab`, gives it a fresh mixer rooted at the new
    /// hierarchy, creates one action per clip and builds the panel folders.
    /// A previously installed model is removed first.
    pub fn install(&mut self, prefab: &Prefab) -> &LoadedModel {
        if let Some(old) = self.model.take() {
            log::debug!("Replacing model '{}'", old.name);
            self.scene.remove_node(old.root);
        }

        let root = self.scene.instantiate(prefab);

        let mut mixer = AnimationMixer::with_root(root);
        mixer.set_time_scale(self.settings.time_scale);

        let mut actions = Vec::with_capacity(prefab.animations.len());
        for clip in &prefab.animations {
            let handle = mixer.clip_action(&self.scene, clip);
            if let Ok(action) = mixer.action_mut(handle) {
                action.set_loop(self.settings.default_loop, None);
                action.clamp_when_finished = self.settings.clamp_when_finished;
            }
            actions.push(handle);
        }

        if self.settings.autoplay
            && let Some(&first) = actions.first()
            && let Ok(action) = mixer.action_mut(first)
        {
            action.play();
        }

        self.panel.clear();
        self.panel
            .add_folder(controls::mixer_folder(self.settings.time_scale_range));
        for (i, (clip, &handle)) in prefab.animations.iter().zip(&actions).enumerate() {
            self.panel.add_folder(controls::action_folder(
                &format!("ClipAction {}", i + 1),
                handle,
                clip.duration,
            ));
        }
        self.panel.refresh(&mixer);
        self.mixer = mixer;

        log::info!(
            "Loaded model '{}': {} nodes, {} clips",
            prefab.name,
            prefab.nodes.len(),
            prefab.animations.len()
        );

        self.model.insert(LoadedModel {
            name: prefab.name.clone(),
            root,
            clips: prefab.animations.clone(),
            actions,
        })
    }

    // ========================================================================
    // Frame Loop
    // ========================================================================

    /// A sender for panel writes, usable from any thread.
    #[must_use]
    pub fn control_sender(&self) -> ControlSender {
        self.panel.sender()
    }

    /// Runs one frame with an explicit delta in seconds.
    pub fn step(&mut self, dt: f32) -> Result<()> {
        self.poll_load();

        let applied = self.panel.apply_pending(&mut self.mixer);
        if applied > 0 {
            log::trace!("Applied {applied} panel writes");
        }

        self.mixer.advance(dt, &mut self.scene)?;
        self.scene.update_matrix_world();
        self.panel.refresh(&self.mixer);

        self.backend.render(&self.scene, &self.camera)?;
        self.frame_count += 1;
        Ok(())
    }

    /// Runs one frame timed by the wall clock.
    pub fn frame(&mut self) -> Result<()> {
        let dt = self.clock.tick();
        if let Some(fps) = self.fps.record(self.clock.delta) {
            log::debug!("FPS: {fps:.1}");
        }
        self.step(dt)
    }

    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    #[must_use]
    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    #[must_use]
    pub fn fps(&self) -> f32 {
        self.fps.current_fps
    }
}
