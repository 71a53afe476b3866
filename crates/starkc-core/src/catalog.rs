//! Session-local artifact catalog.
//!
//! The catalog is append-only: `register` is the only mutation and it always
//! selects the artifact it just added. Names may repeat; every successful
//! compile adds a new entry. The `(artifacts, selected)` pair lives behind one
//! lock so readers never see a selection that is not in the list.
//!
//! The catalog also owns the hash-pending signal. Observers use it to decide
//! whether the selected artifact's class hash is stable.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tokio::sync::watch;
use tracing::info;

use crate::model::Artifact;

/// Observable "a class hash is being computed" flag.
///
/// Backed by an in-flight counter so overlapping computations keep the flag
/// raised until the last one finishes.
#[derive(Debug, Clone)]
pub struct HashPendingSignal {
    inner: Arc<PendingInner>,
}

#[derive(Debug)]
struct PendingInner {
    in_flight: Mutex<usize>,
    tx: watch::Sender<bool>,
}

impl Default for HashPendingSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl HashPendingSignal {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self {
            inner: Arc::new(PendingInner {
                in_flight: Mutex::new(0),
                tx,
            }),
        }
    }

    pub fn is_pending(&self) -> bool {
        *self.inner.tx.borrow()
    }

    /// Receiver that wakes on every transition.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.inner.tx.subscribe()
    }

    /// Raise the flag until the returned guard is dropped.
    pub fn begin(&self) -> HashPendingGuard<'_> {
        let mut n = self.inner.in_flight.lock();
        *n += 1;
        if *n == 1 {
            self.inner.tx.send_replace(true);
        }
        HashPendingGuard { signal: self }
    }

    fn end(&self) {
        let mut n = self.inner.in_flight.lock();
        *n = n.saturating_sub(1);
        if *n == 0 {
            self.inner.tx.send_replace(false);
        }
    }
}

/// Lowers the pending flag on drop, including during unwinding.
#[must_use = "the pending flag drops as soon as the guard does"]
#[derive(Debug)]
pub struct HashPendingGuard<'a> {
    signal: &'a HashPendingSignal,
}

impl Drop for HashPendingGuard<'_> {
    fn drop(&mut self) {
        self.signal.end();
    }
}

#[derive(Debug, Default)]
struct CatalogState {
    artifacts: Vec<Arc<Artifact>>,
    selected: Option<usize>,
}

/// A consistent view of the catalog at one instant.
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    pub artifacts: Vec<Arc<Artifact>>,
    pub selected: Option<Arc<Artifact>>,
}

#[derive(Debug, Default)]
pub struct ArtifactCatalog {
    state: RwLock<CatalogState>,
    pending: HashPendingSignal,
}

impl ArtifactCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `artifact` and make it the selection.
    pub fn register(&self, artifact: Artifact) -> Arc<Artifact> {
        let artifact = Arc::new(artifact);
        let mut state = self.state.write();
        state.artifacts.push(Arc::clone(&artifact));
        state.selected = Some(state.artifacts.len() - 1);

        info!(
            name = %artifact.name,
            class_hash = %artifact.class_hash,
            run_id = %artifact.run_id,
            total = state.artifacts.len(),
            "artifact registered"
        );
        artifact
    }

    /// Artifacts in registration order.
    pub fn list(&self) -> Vec<Arc<Artifact>> {
        self.state.read().artifacts.clone()
    }

    pub fn selected(&self) -> Option<Arc<Artifact>> {
        let state = self.state.read();
        state
            .selected
            .and_then(|i| state.artifacts.get(i))
            .cloned()
    }

    pub fn snapshot(&self) -> CatalogSnapshot {
        let state = self.state.read();
        CatalogSnapshot {
            artifacts: state.artifacts.clone(),
            selected: state
                .selected
                .and_then(|i| state.artifacts.get(i))
                .cloned(),
        }
    }

    pub fn len(&self) -> usize {
        self.state.read().artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().artifacts.is_empty()
    }

    /// Every registration under `name`, oldest first.
    pub fn find_by_name(&self, name: &str) -> Vec<Arc<Artifact>> {
        self.state
            .read()
            .artifacts
            .iter()
            .filter(|a| a.name == name)
            .cloned()
            .collect()
    }

    /// Handle used by the hasher to raise and lower the pending flag.
    pub fn hash_pending(&self) -> HashPendingSignal {
        self.pending.clone()
    }

    /// True while the selected artifact's class hash may be about to change.
    pub fn is_hash_pending(&self) -> bool {
        self.pending.is_pending()
    }

    pub fn subscribe_hash_pending(&self) -> watch::Receiver<bool> {
        self.pending.subscribe()
    }
}
