//! Keyed admission lock
//!
//! Tracks which paths currently have a pipeline in flight. This is a set-backed
//! mutex keyed by path, not a semaphore: there is no queue of waiters, a
//! rejected admission is simply dropped by the caller.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

/// Set of busy paths guarded by a single mutex
#[derive(Debug, Default)]
pub struct AdmissionLock {
    busy: Mutex<HashSet<PathBuf>>,
}

impl AdmissionLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `key`. Returns `true` when admitted, `false` when already running.
    pub fn try_acquire(&self, key: &Path) -> bool {
        self.table().insert(key.to_path_buf())
    }

    /// Give `key` back. Returns `false` (and logs) when the key was not held.
    pub fn release(&self, key: &Path) -> bool {
        let removed = self.table().remove(key);
        if !removed {
            tracing::warn!("Released admission for {} which was not held", key.display());
        }
        removed
    }

    pub fn is_held(&self, key: &Path) -> bool {
        self.table().contains(key)
    }

    /// Number of paths currently admitted
    pub fn len(&self) -> usize {
        self.table().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Claim `key` and return a guard that releases it exactly once when dropped,
    /// whether the holder finishes, panics or is cancelled.
    pub fn try_admit(self: &Arc<Self>, key: &Path) -> Option<AdmissionGuard> {
        self.try_acquire(key).then(|| AdmissionGuard {
            lock: Arc::clone(self),
            key: key.to_path_buf(),
        })
    }

    fn table(&self) -> MutexGuard<'_, HashSet<PathBuf>> {
        // Critical sections never run user code, so a poisoned set is still consistent
        self.busy.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Holds one admitted path; releases it on drop
#[derive(Debug)]
pub struct AdmissionGuard {
    lock: Arc<AdmissionLock>,
    key: PathBuf,
}

impl AdmissionGuard {
    pub fn path(&self) -> &Path {
        &self.key
    }
}

impl Drop for AdmissionGuard {
    fn drop(&mut self) {
        self.lock.release(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_release_reacquire() {
        let lock = AdmissionLock::new();
        let path = Path::new("/tmp/a.py");

        assert!(lock.try_acquire(path));
        assert!(!lock.try_acquire(path));
        assert!(lock.is_held(path));

        assert!(lock.release(path));
        assert!(!lock.is_held(path));
        assert!(lock.try_acquire(path), "lock must be reusable after release");
    }

    #[test]
    fn test_double_release_is_reported() {
        let lock = AdmissionLock::new();
        let path = Path::new("/tmp/a.py");

        assert!(lock.try_acquire(path));
        assert!(lock.release(path));
        assert!(!lock.release(path));
        assert!(lock.is_empty());
    }

    #[test]
    fn test_keys_are_independent() {
        let lock = AdmissionLock::new();
        assert!(lock.try_acquire(Path::new("a.py")));
        assert!(lock.try_acquire(Path::new("b.py")));
        assert_eq!(lock.len(), 2);
    }

    #[test]
    fn test_guard_releases_on_drop() {
        let lock = Arc::new(AdmissionLock::new());
        let path = Path::new("/tmp/a.py");

        let guard = lock.try_admit(path).expect("first admission succeeds");
        assert_eq!(guard.path(), path);
        assert!(lock.try_admit(path).is_none());

        drop(guard);
        assert!(lock.is_empty());
        assert!(lock.try_admit(path).is_some());
    }

    #[test]
    fn test_guard_releases_on_panic() {
        let lock = Arc::new(AdmissionLock::new());
        let path = PathBuf::from("/tmp/panics.py");

        let cloned = Arc::clone(&lock);
        let key = path.clone();
        let outcome = std::thread::spawn(move || {
            let _guard = cloned.try_admit(&key).unwrap();
            panic!("linter blew up");
        })
        .join();

        assert!(outcome.is_err());
        assert!(!lock.is_held(&path));
    }

    #[test]
    fn test_concurrent_acquire_admits_exactly_one() {
        let lock = Arc::new(AdmissionLock::new());
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let lock = Arc::clone(&lock);
                std::thread::spawn(move || lock.try_acquire(Path::new("/tmp/same.py")))
            })
            .collect();

        let admitted = handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .filter(|admitted| *admitted)
            .count();
        assert_eq!(admitted, 1);
    }
}
