//! Field Descriptors
//!
//! A field is a named, typed slot in a panel folder: a [`FieldKind`] saying
//! what values it takes, a getter reading the bound context, an optional
//! setter writing it, and change hooks run after a successful write.

use serde::{Deserialize, Serialize};

use crate::errors::{MixerError, Result};

/// A value shown in or written through a panel field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum FieldValue {
    Number(f32),
    Bool(bool),
    /// Linear RGB, each channel in `[0, 1]`
    Color([f32; 3]),
    /// Payload of a button press
    Trigger,
}

impl FieldValue {
    #[must_use]
    pub fn as_number(&self) -> Option<f32> {
        match *self {
            Self::Number(v) => Some(v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Self::Bool(v) => Some(v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_color(&self) -> Option<[f32; 3]> {
        match *self {
            Self::Color(v) => Some(v),
            _ => None,
        }
    }
}

/// The value domain of a field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    /// Slider or number box. Writes are clamped to `[min, max]` and snapped
    /// to `step` (counted from `min`) when one is given.
    Number {
        min: f32,
        max: f32,
        step: Option<f32>,
    },
    Toggle,
    Color,
    Button,
}

impl FieldKind {
    #[must_use]
    pub fn range(min: f32, max: f32) -> Self {
        Self::Number {
            min,
            max,
            step: None,
        }
    }

    /// Checks that `value` fits this kind and brings it into range.
    pub fn normalize(&self, value: FieldValue) -> Result<FieldValue> {
        match (*self, value) {
            (Self::Number { min, max, step }, FieldValue::Number(v)) => {
                if !v.is_finite() {
                    return Err(MixerError::invalid(format!("number field got {v}")));
                }
                let mut v = v.clamp(min, max);
                if let Some(step) = step
                    && step > 0.0
                {
                    v = (min + ((v - min) / step).round() * step).clamp(min, max);
                }
                Ok(FieldValue::Number(v))
            }
            (Self::Toggle, FieldValue::Bool(_)) | (Self::Button, FieldValue::Trigger) => Ok(value),
            (Self::Color, FieldValue::Color(rgb)) => {
                Ok(FieldValue::Color(rgb.map(|c| if c.is_nan() { 0.0 } else { c.clamp(0.0, 1.0) })))
            }
            (kind, value) => Err(MixerError::invalid(format!(
                "{value:?} does not fit a {kind:?} field"
            ))),
        }
    }
}

pub type Getter<C> = Box<dyn Fn(&C) -> Option<FieldValue>>;
pub type Setter<C> = Box<dyn FnMut(&mut C, FieldValue) -> Result<()>>;
pub type ChangeHook = Box<dyn FnMut(&FieldValue)>;

/// One named control bound to a context `C`.
pub struct Field<C> {
    name: String,
    kind: FieldKind,
    getter: Option<Getter<C>>,
    setter: Option<Setter<C>>,
    hooks: Vec<ChangeHook>,
    pub(crate) shown: Option<FieldValue>,
}

impl<C> Field<C> {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            getter: None,
            setter: None,
            hooks: Vec::new(),
            shown: None,
        }
    }

    #[must_use]
    pub fn number(name: impl Into<String>, min: f32, max: f32) -> Self {
        Self::new(name, FieldKind::range(min, max))
    }

    #[must_use]
    pub fn toggle(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Toggle)
    }

    #[must_use]
    pub fn color(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Color)
    }

    /// A button running `action` on press.
    #[must_use]
    pub fn button(name: impl Into<String>, mut action: impl FnMut(&mut C) -> Result<()> + 'static) -> Self {
        Self::new(name, FieldKind::Button).setter(move |ctx, _| action(ctx))
    }

    /// Sets the snapping step of a number field. Ignored for other kinds.
    #[must_use]
    pub fn step(mut self, step: f32) -> Self {
        if let FieldKind::Number { step: s, .. } = &mut self.kind {
            *s = Some(step);
        }
        self
    }

    #[must_use]
    pub fn getter(mut self, getter: impl Fn(&C) -> Option<FieldValue> + 'static) -> Self {
        self.getter = Some(Box::new(getter));
        self
    }

    #[must_use]
    pub fn setter(mut self, setter: impl FnMut(&mut C, FieldValue) -> Result<()> + 'static) -> Self {
        self.setter = Some(Box::new(setter));
        self
    }

    /// Adds a hook run with the normalized value after each successful write.
    #[must_use]
    pub fn on_change(mut self, hook: impl FnMut(&FieldValue) + 'static) -> Self {
        self.hooks.push(Box::new(hook));
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Whether writes go anywhere. Read-only fields only display.
    #[must_use]
    pub fn is_writable(&self) -> bool {
        self.setter.is_some()
    }

    /// The value from the last refresh or write.
    #[must_use]
    pub fn shown(&self) -> Option<FieldValue> {
        self.shown
    }

    /// Reads the current value from the context.
    #[must_use]
    pub fn read(&self, ctx: &C) -> Option<FieldValue> {
        self.getter.as_ref().and_then(|get| get(ctx))
    }

    /// Validates, normalizes and writes `value`, then runs the change hooks.
    pub fn write(&mut self, ctx: &mut C, value: FieldValue) -> Result<()> {
        let value = self.kind.normalize(value)?;
        let Some(setter) = self.setter.as_mut() else {
            return Err(MixerError::invalid(format!("field '{}' is read-only", self.name)));
        };
        setter(ctx, value)?;

        if self.kind != FieldKind::Button {
            self.shown = Some(value);
        }
        for hook in &mut self.hooks {
            hook(&value);
        }
        Ok(())
    }
}

impl<C> std::fmt::Debug for Field<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("writable", &self.setter.is_some())
            .field("shown", &self.shown)
            .finish_non_exhaustive()
    }
}
