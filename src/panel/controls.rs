//! Mixer and clip action folders.
//!
//! Fields bound to an [`AnimationMixer`]. Action fields carry the action's
//! handle; once the action is gone they read nothing and reject writes.

use crate::animation::{ActionHandle, AnimationMixer, ClipAction};
use crate::errors::Result;
use crate::panel::field::{Field, FieldValue};
use crate::panel::panel::Folder;

pub const MIXER_FOLDER: &str = "AnimationMixer";

pub const TIME: &str = "time";
pub const TIME_SCALE: &str = "timeScale";
pub const STOP_ALL_ACTION: &str = "stopAllAction";

pub const EFFECTIVE_TIME_SCALE: &str = "effectiveTimeScale";
pub const EFFECTIVE_WEIGHT: &str = "effectiveWeight";
pub const CLAMP_WHEN_FINISHED: &str = "clampWhenFinished";
pub const PLAY: &str = "play";
pub const PAUSE: &str = "pause";
pub const STOP: &str = "stop";
pub const RESET: &str = "reset";

/// `time` (scrubs via `set_time`), `timeScale` in `time_scale_range` and
/// the `stopAllAction` button.
#[must_use]
pub fn mixer_folder(time_scale_range: (f32, f32)) -> Folder<AnimationMixer> {
    let (min, max) = time_scale_range;

    Folder::new(MIXER_FOLDER)
        .with(
            Field::number(TIME, 0.0, f32::MAX)
                .getter(|mixer: &AnimationMixer| Some(FieldValue::Number(mixer.time())))
                .setter(|mixer, value| match value.as_number() {
                    Some(t) => mixer.set_time(t),
                    None => Ok(()),
                }),
        )
        .with(
            Field::number(TIME_SCALE, min.max(0.0), max.max(min.max(0.0)))
                .step(0.01)
                .getter(|mixer: &AnimationMixer| Some(FieldValue::Number(mixer.time_scale())))
                .setter(|mixer, value| {
                    if let Some(s) = value.as_number() {
                        mixer.set_time_scale(s);
                    }
                    Ok(())
                }),
        )
        .with(Field::button(STOP_ALL_ACTION, |mixer: &mut AnimationMixer| {
            mixer.stop_all_action();
            Ok(())
        }))
}

fn number_of(
    handle: ActionHandle,
    read: fn(&ClipAction) -> f32,
) -> impl Fn(&AnimationMixer) -> Option<FieldValue> {
    move |mixer: &AnimationMixer| mixer.action(handle).ok().map(|a| FieldValue::Number(read(a)))
}

fn action_button(
    name: &str,
    handle: ActionHandle,
    press: fn(&mut ClipAction),
) -> Field<AnimationMixer> {
    Field::button(name, move |mixer: &mut AnimationMixer| -> Result<()> {
        press(mixer.action_mut(handle)?);
        Ok(())
    })
}

/// Controls for one clip action: weight, time scale, local time, the
/// finish policy and play/pause/stop/reset buttons.
#[must_use]
pub fn action_folder(name: &str, handle: ActionHandle, duration: f32) -> Folder<AnimationMixer> {
    Folder::new(name)
        .with(
            Field::number(EFFECTIVE_TIME_SCALE, -5.0, 5.0)
                .step(0.01)
                .getter(number_of(handle, ClipAction::effective_time_scale))
                .setter(move |mixer, value| {
                    let action = mixer.action_mut(handle)?;
                    if let Some(s) = value.as_number() {
                        action.set_effective_time_scale(s);
                    }
                    Ok(())
                }),
        )
        .with(
            Field::number(EFFECTIVE_WEIGHT, 0.0, 1.0)
                .step(0.01)
                .getter(number_of(handle, ClipAction::effective_weight))
                .setter(move |mixer, value| {
                    let action = mixer.action_mut(handle)?;
                    if let Some(w) = value.as_number() {
                        action.set_effective_weight(w);
                    }
                    Ok(())
                }),
        )
        .with(
            Field::number(TIME, 0.0, duration.max(0.0))
                .getter(number_of(handle, ClipAction::time))
                .setter(move |mixer, value| {
                    let action = mixer.action_mut(handle)?;
                    if let Some(t) = value.as_number() {
                        action.set_time(t);
                    }
                    Ok(())
                }),
        )
        .with(
            Field::toggle(CLAMP_WHEN_FINISHED)
                .getter(move |mixer: &AnimationMixer| {
                    mixer
                        .action(handle)
                        .ok()
                        .map(|a| FieldValue::Bool(a.clamp_when_finished))
                })
                .setter(move |mixer, value| {
                    let action = mixer.action_mut(handle)?;
                    if let Some(clamp) = value.as_bool() {
                        action.clamp_when_finished = clamp;
                    }
                    Ok(())
                }),
        )
        .with(action_button(PLAY, handle, |a| {
            a.play();
        }))
        .with(action_button(PAUSE, handle, |a| {
            a.pause();
        }))
        .with(action_button(STOP, handle, |a| {
            a.stop();
        }))
        .with(action_button(RESET, handle, |a| {
            a.reset();
        }))
}
