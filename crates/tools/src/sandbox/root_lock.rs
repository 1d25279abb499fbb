use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::debug;

/// Mutual exclusion for file-mutating tools, scoped to sandbox roots.
///
/// Sessions share one `RootLocks`. Acquiring a root also takes the lock of
/// every registered root nested in it or containing it, always in sorted
/// path order, so overlapping roots serialize without deadlock.
#[derive(Clone, Default)]
pub struct RootLocks {
    locks: Arc<Mutex<BTreeMap<PathBuf, Arc<AsyncMutex<()>>>>>,
}

/// Releases every held root lock on drop.
#[derive(Debug)]
pub struct RootLockGuard {
    guards: Vec<OwnedMutexGuard<()>>,
}

impl RootLockGuard {
    pub fn held(&self) -> usize {
        self.guards.len()
    }
}

impl RootLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, root: &Path) {
        self.locks
            .lock()
            .entry(root.to_path_buf())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())));
    }

    pub async fn acquire(&self, root: &Path) -> RootLockGuard {
        let overlapping: Vec<Arc<AsyncMutex<()>>> = {
            let mut locks = self.locks.lock();
            locks
                .entry(root.to_path_buf())
                .or_insert_with(|| Arc::new(AsyncMutex::new(())));
            // BTreeMap iteration is already sorted by path.
            locks
                .iter()
                .filter(|(other, _)| other.starts_with(root) || root.starts_with(other))
                .map(|(_, lock)| lock.clone())
                .collect()
        };

        debug!("Acquiring {} root lock(s) for {}", overlapping.len(), root.display());
        let mut guards = Vec::with_capacity(overlapping.len());
        for lock in overlapping {
            guards.push(lock.lock_owned().await);
        }
        RootLockGuard { guards }
    }
}
