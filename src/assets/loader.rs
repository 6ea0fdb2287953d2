//! Model Loading
//!
//! Loading is asynchronous from the caller's point of view: a
//! [`ModelLoader`] receives a [`LoadReply`] and answers it once, right away
//! or later from another thread. The caller keeps the matching
//! [`PendingModel`] and either polls it once per frame or awaits it.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::assets::prefab::Prefab;
use crate::errors::{MixerError, Result};

/// Produces prefabs (hierarchy + clips) for a URI.
pub trait ModelLoader {
    fn load(&self, uri: &str, reply: LoadReply);
}

/// One-shot answer channel handed to a [`ModelLoader`].
///
/// Dropping it without answering reports a load failure to the caller.
#[derive(Debug)]
pub struct LoadReply {
    uri: String,
    tx: flume::Sender<Result<Prefab>>,
}

impl LoadReply {
    #[must_use]
    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn succeed(self, prefab: Prefab) {
        // The receiver may already be gone; nobody is waiting then.
        let _ = self.tx.send(Ok(prefab));
    }

    pub fn fail(self, reason: impl Into<String>) {
        let _ = self.tx.send(Err(MixerError::AssetLoadFailure {
            uri: self.uri,
            reason: reason.into(),
        }));
    }
}

/// Caller side of an in-flight load.
#[derive(Debug)]
pub struct PendingModel {
    uri: String,
    rx: flume::Receiver<Result<Prefab>>,
    finished: bool,
}

impl PendingModel {
    /// Starts loading `uri` through `loader`.
    pub fn request(loader: &dyn ModelLoader, uri: &str) -> Self {
        let (tx, rx) = flume::bounded(1);
        log::debug!("Requesting model '{uri}'");
        loader.load(
            uri,
            LoadReply {
                uri: uri.to_string(),
                tx,
            },
        );
        Self {
            uri: uri.to_string(),
            rx,
            finished: false,
        }
    }

    #[must_use]
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Whether the result has already been taken.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Non-blocking poll. Returns the result exactly once; `None` while the
    /// load is still running and after the result was taken.
    pub fn try_take(&mut self) -> Option<Result<Prefab>> {
        if self.finished {
            return None;
        }
        match self.rx.try_recv() {
            Ok(result) => {
                self.finished = true;
                Some(result)
            }
            Err(flume::TryRecvError::Empty) => None,
            Err(flume::TryRecvError::Disconnected) => {
                self.finished = true;
                Some(Err(self.dropped()))
            }
        }
    }

    /// Waits for the load to complete.
    pub async fn wait(self) -> Result<Prefab> {
        match self.rx.recv_async().await {
            Ok(result) => result,
            Err(flume::RecvError::Disconnected) => Err(self.dropped()),
        }
    }

    fn dropped(&self) -> MixerError {
        MixerError::AssetLoadFailure {
            uri: self.uri.clone(),
            reason: "loader dropped the request without answering".to_string(),
        }
    }
}

/// Loader serving prefabs registered in memory.
///
/// With `deferred` set, answers come from a worker thread, the way a file or
/// network loader would answer.
#[derive(Debug, Default, Clone)]
pub struct MemoryLoader {
    models: FxHashMap<String, Arc<Prefab>>,
    deferred: bool,
}

impl MemoryLoader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_model(mut self, uri: impl Into<String>, prefab: Prefab) -> Self {
        self.insert(uri, prefab);
        self
    }

    #[must_use]
    pub fn deferred(mut self, deferred: bool) -> Self {
        self.deferred = deferred;
        self
    }

    pub fn insert(&mut self, uri: impl Into<String>, prefab: Prefab) {
        self.models.insert(uri.into(), Arc::new(prefab));
    }
}

impl ModelLoader for MemoryLoader {
    fn load(&self, uri: &str, reply: LoadReply) {
        let found = self.models.get(uri).cloned();
        let answer = move || match found {
            Some(prefab) => reply.succeed(Prefab::clone(&prefab)),
            None => reply.fail("no such model"),
        };

        if self.deferred {
            std::thread::spawn(answer);
        } else {
            answer();
        }
    }
}
