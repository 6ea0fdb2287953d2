use crate::errors::{MixerError, Result};
use crate::panel::field::{Field, FieldValue};
use crate::panel::queue::{ControlQueue, ControlSender, ControlWrite};

/// A named group of fields.
pub struct Folder<C> {
    name: String,
    fields: Vec<Field<C>>,
}

impl<C> Folder<C> {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Adds a field, replacing one with the same name.
    #[must_use]
    pub fn with(mut self, field: Field<C>) -> Self {
        self.add(field);
        self
    }

    pub fn add(&mut self, field: Field<C>) {
        match self.fields.iter_mut().find(|f| f.name() == field.name()) {
            Some(slot) => *slot = field,
            None => self.fields.push(field),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> impl Iterator<Item = &Field<C>> {
        self.fields.iter()
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Field<C>> {
        self.fields.iter().find(|f| f.name() == name)
    }

    fn field_mut(&mut self, name: &str) -> Option<&mut Field<C>> {
        self.fields.iter_mut().find(|f| f.name() == name)
    }
}

impl<C> std::fmt::Debug for Folder<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Folder")
            .field("name", &self.name)
            .field("fields", &self.fields)
            .finish()
    }
}

/// Parameter panel: folders of typed fields bound to a context `C`.
///
/// The panel never holds the context. Writes either go through
/// [`set`](Self::set) with the context at hand, or are queued through a
/// [`ControlSender`] and applied by [`apply_pending`](Self::apply_pending).
/// [`refresh`](Self::refresh) pulls current values back for display.
pub struct ControlPanel<C> {
    folders: Vec<Folder<C>>,
    queue: ControlQueue,
}

impl<C> Default for ControlPanel<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> ControlPanel<C> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            folders: Vec::new(),
            queue: ControlQueue::new(),
        }
    }

    /// Registers a folder, replacing one with the same name.
    pub fn add_folder(&mut self, folder: Folder<C>) {
        log::debug!("Panel: folder '{}' with {} fields", folder.name, folder.fields.len());
        match self.folders.iter_mut().find(|f| f.name == folder.name) {
            Some(slot) => *slot = folder,
            None => self.folders.push(folder),
        }
    }

    pub fn remove_folder(&mut self, name: &str) -> bool {
        let before = self.folders.len();
        self.folders.retain(|f| f.name != name);
        self.folders.len() != before
    }

    /// Removes every folder. Queued writes are discarded.
    pub fn clear(&mut self) {
        self.folders.clear();
        drop(self.queue.drain());
    }

    #[must_use]
    pub fn folder(&self, name: &str) -> Option<&Folder<C>> {
        self.folders.iter().find(|f| f.name == name)
    }

    pub fn folders(&self) -> impl Iterator<Item = &Folder<C>> {
        self.folders.iter()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.folders.is_empty()
    }

    /// A handle for queuing writes from elsewhere, possibly another thread.
    #[must_use]
    pub fn sender(&self) -> ControlSender {
        self.queue.sender()
    }

    /// Queues a write for the next [`apply_pending`](Self::apply_pending).
    pub fn submit(&self, folder: &str, field: &str, value: FieldValue) {
        self.queue.sender().send(folder, field, value);
    }

    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Writes `value` to `folder/field` right away.
    pub fn set(&mut self, ctx: &mut C, folder: &str, field: &str, value: FieldValue) -> Result<()> {
        let target = self
            .folders
            .iter_mut()
            .find(|f| f.name == folder)
            .and_then(|f| f.field_mut(field))
            .ok_or_else(|| MixerError::invalid(format!("no panel field '{folder}/{field}'")))?;
        target.write(ctx, value)
    }

    /// Applies every queued write in order. A rejected write is logged and
    /// skipped. Returns the number applied.
    pub fn apply_pending(&mut self, ctx: &mut C) -> usize {
        let mut applied = 0;
        for ControlWrite { folder, field, value } in self.queue.drain() {
            match self.set(ctx, &folder, &field, value) {
                Ok(()) => applied += 1,
                Err(e) => log::warn!("Panel write to '{folder}/{field}' dropped: {e}"),
            }
        }
        applied
    }

    /// Re-reads every field with a getter from `ctx`.
    pub fn refresh(&mut self, ctx: &C) {
        for folder in &mut self.folders {
            for field in &mut folder.fields {
                if let Some(value) = field.read(ctx) {
                    field.shown = Some(value);
                }
            }
        }
    }

    /// The displayed value of `folder/field`, as of the last refresh or write.
    #[must_use]
    pub fn read(&self, folder: &str, field: &str) -> Option<FieldValue> {
        self.folder(folder).and_then(|f| f.field(field)).and_then(Field::shown)
    }
}

impl<C> std::fmt::Debug for ControlPanel<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControlPanel")
            .field("folders", &self.folders)
            .field("pending", &self.queue.len())
            .finish()
    }
}
