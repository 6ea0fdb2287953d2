//! Serialized Control Writes
//!
//! Writes may be submitted from any thread; the owner of the panel drains
//! them once per frame, before the mixer advances, so a frame always sees a
//! consistent set of control values.

use crate::panel::field::FieldValue;

/// One pending write to `folder/field`.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlWrite {
    pub folder: String,
    pub field: String,
    pub value: FieldValue,
}

/// Cloneable, `Send` handle for submitting writes.
#[derive(Debug, Clone)]
pub struct ControlSender {
    tx: flume::Sender<ControlWrite>,
}

impl ControlSender {
    /// Queues a write. Returns false once the panel is gone.
    pub fn send(&self, folder: impl Into<String>, field: impl Into<String>, value: FieldValue) -> bool {
        self.tx
            .send(ControlWrite {
                folder: folder.into(),
                field: field.into(),
                value,
            })
            .is_ok()
    }

    /// Queues a button press.
    pub fn press(&self, folder: impl Into<String>, field: impl Into<String>) -> bool {
        self.send(folder, field, FieldValue::Trigger)
    }
}

/// Receiving end, owned by the panel.
#[derive(Debug)]
pub struct ControlQueue {
    tx: flume::Sender<ControlWrite>,
    rx: flume::Receiver<ControlWrite>,
}

impl Default for ControlQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl ControlQueue {
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = flume::unbounded();
        Self { tx, rx }
    }

    #[must_use]
    pub fn sender(&self) -> ControlSender {
        ControlSender { tx: self.tx.clone() }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    /// Takes every write queued so far, in submission order. Writes sent
    /// while draining wait for the next call.
    pub fn drain(&self) -> Vec<ControlWrite> {
        let pending = self.rx.len();
        self.rx.try_iter().take(pending).collect()
    }
}
