//! Process-wide singleton lock.
//!
//! The updater assumes it is the only instance: two copies racing the same
//! download destination or installer handoff would corrupt each other. The
//! lock is an OS advisory lock on a file in the per-user data directory,
//! so it is released automatically when the process dies — stale locks
//! cannot occur.

use std::fs::{File, OpenOptions, TryLockError};
use std::path::{Path, PathBuf};

/// Holds the exclusive instance lock for the life of the process.
///
/// Keep this alive in `main`; dropping it releases the lock.
#[derive(Debug)]
pub struct InstanceLock {
    _file: File,
    path: PathBuf,
}

impl InstanceLock {
    /// Try to acquire the lock at `path`.
    ///
    /// Returns `Ok(None)` when another instance already holds it.
    pub fn acquire(path: &Path) -> std::io::Result<Option<Self>> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(path)?;

        match file.try_lock() {
            Ok(()) => Ok(Some(Self {
                _file: file,
                path: path.to_path_buf(),
            })),
            Err(TryLockError::WouldBlock) => Ok(None),
            Err(TryLockError::Error(err)) => Err(err),
        }
    }

    /// The lock file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_fails_while_held() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chorus.lock");

        let first = InstanceLock::acquire(&path).unwrap();
        assert!(first.is_some());

        let second = InstanceLock::acquire(&path).unwrap();
        assert!(second.is_none());
    }

    #[test]
    fn lock_is_released_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chorus.lock");

        let first = InstanceLock::acquire(&path).unwrap();
        drop(first);

        let second = InstanceLock::acquire(&path).unwrap();
        assert!(second.is_some());
    }

    #[test]
    fn creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("chorus.lock");
        let lock = InstanceLock::acquire(&path).unwrap().unwrap();
        assert_eq!(lock.path(), path);
    }
}
