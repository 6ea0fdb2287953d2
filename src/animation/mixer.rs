use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use rustc_hash::FxHashMap;
use slotmap::{SlotMap, new_key_type};
use uuid::Uuid;

use crate::animation::accumulate::PoseAccumulator;
use crate::animation::action::{ActionStep, ClipAction, PlaybackDirection};
use crate::animation::binder::Binder;
use crate::animation::clip::AnimationClip;
use crate::errors::{MixerError, Result};
use crate::scene::{NodeHandle, Scene};

static NEXT_MIXER_ID: AtomicU32 = AtomicU32::new(1);

new_key_type! {
    struct ActionKey;
}

/// Refers to one [`ClipAction`] owned by one [`AnimationMixer`].
///
/// Using a handle with another mixer, or after its action was uncached,
/// fails with [`MixerError::UnboundAction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActionHandle {
    mixer_id: u32,
    key: ActionKey,
}

impl ActionHandle {
    /// Id of the mixer that issued this handle.
    #[must_use]
    pub fn mixer_id(&self) -> u32 {
        self.mixer_id
    }
}

impl fmt::Display for ActionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}@mixer{}", self.key, self.mixer_id)
    }
}

/// Notifications produced by the last [`AnimationMixer::advance`] or
/// [`AnimationMixer::set_time`] call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MixerEvent {
    /// A looping action wrapped. `loop_delta` is negative when playing backwards.
    Loop { action: ActionHandle, loop_delta: i32 },
    /// A `Once` action reached its end, or a looping action ran out of repetitions.
    Finished {
        action: ActionHandle,
        direction: PlaybackDirection,
    },
}

type ActionCacheKey = (Uuid, Option<NodeHandle>);

/// Drives clip actions for one target hierarchy.
///
/// Owns a cache of [`ClipAction`]s keyed by `(clip, root)`. Each
/// [`advance`](Self::advance) integrates time for every active action, blends
/// their sampled values per property and writes the result into the scene.
pub struct AnimationMixer {
    id: u32,
    root: Option<NodeHandle>,

    time: f32,
    time_scale: f32,

    actions: SlotMap<ActionKey, ClipAction>,
    lookup: FxHashMap<ActionCacheKey, ActionKey>,

    events: Vec<MixerEvent>,
    pose: PoseAccumulator,
}

impl Default for AnimationMixer {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimationMixer {
    /// Creates a mixer with no root. Actions it creates bind to nothing, so
    /// advancing only moves time.
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: NEXT_MIXER_ID.fetch_add(1, Ordering::Relaxed),
            root: None,
            time: 0.0,
            time_scale: 1.0,
            actions: SlotMap::with_key(),
            lookup: FxHashMap::default(),
            events: Vec::new(),
            pose: PoseAccumulator::new(),
        }
    }

    #[must_use]
    pub fn with_root(root: NodeHandle) -> Self {
        Self {
            root: Some(root),
            ..Self::new()
        }
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> u32 {
        self.id
    }

    #[inline]
    #[must_use]
    pub fn root(&self) -> Option<NodeHandle> {
        self.root
    }

    // ========================================================================
    // Global Time
    // ========================================================================

    /// Accumulated scaled time in seconds.
    #[inline]
    #[must_use]
    pub fn time(&self) -> f32 {
        self.time
    }

    #[inline]
    #[must_use]
    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// Sets the global speed multiplier, clamped to `>= 0`. Non-finite values
    /// are ignored.
    pub fn set_time_scale(&mut self, time_scale: f32) {
        if time_scale.is_finite() {
            self.time_scale = time_scale.max(0.0);
        } else {
            log::warn!("Ignoring non-finite mixer time scale");
        }
    }

    // ========================================================================
    // Action Cache
    // ========================================================================

    /// Returns the action for `clip` under the mixer's root, creating it
    /// (stopped) on first use.
    pub fn clip_action(&mut self, scene: &Scene, clip: &Arc<AnimationClip>) -> ActionHandle {
        self.clip_action_for(scene, clip, self.root)
    }

    /// Returns the action for `clip` under `root`, creating it on first use.
    ///
    /// A new action resolves its bindings against `scene` immediately;
    /// tracks without a matching node stay unbound.
    pub fn clip_action_for(
        &mut self,
        scene: &Scene,
        clip: &Arc<AnimationClip>,
        root: Option<NodeHandle>,
    ) -> ActionHandle {
        if let Some(&key) = self.lookup.get(&(clip.uuid, root)) {
            return self.handle(key);
        }

        let bindings = root
            .map(|root| Binder::bind(scene, root, clip))
            .unwrap_or_default();

        log::debug!(
            "Mixer {}: new action for clip '{}' ({} of {} tracks bound)",
            self.id,
            clip.name,
            bindings.len(),
            clip.tracks.len()
        );

        let key = self
            .actions
            .insert(ClipAction::bound(Arc::clone(clip), root, bindings));
        self.lookup.insert((clip.uuid, root), key);
        self.handle(key)
    }

    /// Looks up a cached action without creating one.
    #[must_use]
    pub fn existing_action(
        &self,
        clip: &AnimationClip,
        root: Option<NodeHandle>,
    ) -> Option<ActionHandle> {
        self.lookup
            .get(&(clip.uuid, root))
            .map(|&key| self.handle(key))
    }

    pub fn action(&self, handle: ActionHandle) -> Result<&ClipAction> {
        let key = self.resolve(handle)?;
        self.actions
            .get(key)
            .ok_or_else(|| MixerError::UnboundAction(handle.to_string()))
    }

    pub fn action_mut(&mut self, handle: ActionHandle) -> Result<&mut ClipAction> {
        let key = self.resolve(handle)?;
        self.actions
            .get_mut(key)
            .ok_or_else(|| MixerError::UnboundAction(handle.to_string()))
    }

    /// Whether `handle` refers to a live action of this mixer.
    #[must_use]
    pub fn contains(&self, handle: ActionHandle) -> bool {
        self.resolve(handle).is_ok()
    }

    /// All cached actions, active or not.
    pub fn actions(&self) -> impl Iterator<Item = (ActionHandle, &ClipAction)> + '_ {
        self.actions.iter().map(|(key, action)| (self.handle(key), action))
    }

    /// Actions currently in the active set (playing or paused).
    pub fn active_actions(&self) -> impl Iterator<Item = ActionHandle> + '_ {
        self.actions
            .iter()
            .filter(|(_, action)| action.is_scheduled())
            .map(|(key, _)| self.handle(key))
    }

    #[must_use]
    pub fn action_count(&self) -> usize {
        self.actions.len()
    }

    /// Drops an action from the cache, whatever its state. The handle and
    /// any copies of it become unbound.
    pub fn uncache_action(&mut self, handle: ActionHandle) -> Result<()> {
        let key = self.resolve(handle)?;
        if let Some(action) = self.actions.remove(key) {
            self.lookup.remove(&(action.clip().uuid, action.root()));
            log::debug!("Mixer {}: uncached action for '{}'", self.id, action.clip().name);
        }
        Ok(())
    }

    /// Drops every action created for `clip`, under any root.
    pub fn uncache_clip(&mut self, clip: &AnimationClip) {
        let uuid = clip.uuid;
        self.actions.retain(|_, action| action.clip().uuid != uuid);
        self.lookup.retain(|&(clip_uuid, _), _| clip_uuid != uuid);
    }

    /// Re-resolves every action's bindings, e.g. after nodes were added to
    /// or renamed in the target hierarchy.
    pub fn rebind(&mut self, scene: &Scene) {
        for action in self.actions.values_mut() {
            action.bindings = action
                .root()
                .map(|root| Binder::bind(scene, root, action.clip()))
                .unwrap_or_default();
        }
    }

    // ========================================================================
    // Playback
    // ========================================================================

    /// Events raised by the most recent `advance` or `set_time`.
    #[must_use]
    pub fn events(&self) -> &[MixerEvent] {
        &self.events
    }

    /// Advances the mixer by `dt` wall-clock seconds and writes the blended
    /// pose into `scene`.
    ///
    /// A negative or non-finite `dt`, or one whose scaled value overflows
    /// the mixer clock, is rejected before anything changes.
    pub fn advance(&mut self, dt: f32, scene: &mut Scene) -> Result<()> {
        if !dt.is_finite() || dt < 0.0 {
            return Err(MixerError::invalid(format!(
                "delta time must be finite and non-negative, got {dt}"
            )));
        }

        let scaled = dt * self.time_scale;
        let time = self.time + scaled;
        if !time.is_finite() {
            return Err(MixerError::invalid(format!(
                "delta time {dt} at time scale {} overflows the mixer clock",
                self.time_scale
            )));
        }
        self.time = time;

        self.events.clear();
        self.integrate(scaled);
        self.write_pose(scene);
        Ok(())
    }

    /// Stops every action. The scene keeps its last written pose.
    pub fn stop_all_action(&mut self) {
        for action in self.actions.values_mut() {
            action.stop();
        }
        log::debug!("Mixer {}: stopped all actions", self.id);
    }

    /// Jumps the mixer to absolute time `time`.
    ///
    /// Every active action restarts at 0 and is integrated by `time` with
    /// its own time scale, so it lands where uninterrupted playback from its
    /// start would. The pose is written on the next `advance`.
    pub fn set_time(&mut self, time: f32) -> Result<()> {
        if !time.is_finite() || time < 0.0 {
            return Err(MixerError::invalid(format!(
                "mixer time must be finite and non-negative, got {time}"
            )));
        }

        self.time = time;
        self.events.clear();

        for action in self.actions.values_mut() {
            if action.is_scheduled() {
                action.rewind();
            }
        }
        self.integrate(time);
        Ok(())
    }

    fn integrate(&mut self, delta: f32) {
        let mixer_id = self.id;

        for (key, action) in &mut self.actions {
            let handle = ActionHandle { mixer_id, key };
            match action.update(delta) {
                ActionStep::Looped { loop_delta } => {
                    log::trace!("Action '{}' looped ({loop_delta})", action.clip().name);
                    self.events.push(MixerEvent::Loop {
                        action: handle,
                        loop_delta,
                    });
                }
                ActionStep::Finished { direction } => {
                    self.events.push(MixerEvent::Finished {
                        action: handle,
                        direction,
                    });
                }
                ActionStep::Idle | ActionStep::Advanced => {}
            }
        }
    }

    fn write_pose(&mut self, scene: &mut Scene) {
        self.pose.clear();

        for action in self.actions.values_mut() {
            if !action.is_scheduled() || !action.enabled {
                continue;
            }
            action.sample_into(&mut self.pose);
        }

        let written = self.pose.apply(scene);
        log::trace!("Mixer {}: wrote {written} properties", self.id);
    }

    // ========================================================================
    // Handles
    // ========================================================================

    #[inline]
    fn handle(&self, key: ActionKey) -> ActionHandle {
        ActionHandle {
            mixer_id: self.id,
            key,
        }
    }

    fn resolve(&self, handle: ActionHandle) -> Result<ActionKey> {
        if handle.mixer_id != self.id || !self.actions.contains_key(handle.key) {
            return Err(MixerError::UnboundAction(handle.to_string()));
        }
        Ok(handle.key)
    }
}
