//! Failure injection.

use rekdb_storage::{InMemoryBackend, StorageBackend, StorageError, StorageResult};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// An in-memory backend whose writes can be made to fail.
///
/// Clones share state, so a test keeps one handle and gives the other to
/// the database.
#[derive(Debug, Clone, Default)]
pub struct FlakyBackend {
    inner: InMemoryBackend,
    fail_writes: Arc<AtomicBool>,
    rejected: Arc<AtomicU64>,
}

impl FlakyBackend {
    /// Creates a backend that accepts writes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following write fail (or succeed again).
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Returns how many writes were rejected.
    #[must_use]
    pub fn rejected_writes(&self) -> u64 {
        self.rejected.load(Ordering::SeqCst)
    }

    /// Returns the last accepted image.
    #[must_use]
    pub fn image(&self) -> Option<Vec<u8>> {
        self.inner.image()
    }
}

impl StorageBackend for FlakyBackend {
    fn load(&self) -> StorageResult<Option<Vec<u8>>> {
        self.inner.load()
    }

    fn replace(&mut self, image: &[u8]) -> StorageResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            self.rejected.fetch_add(1, Ordering::SeqCst);
            return Err(StorageError::Unavailable("injected write failure".into()));
        }
        self.inner.replace(image)
    }

    fn size(&self) -> StorageResult<u64> {
        self.inner.size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn injected_failures_keep_last_image() {
        let backend = FlakyBackend::new();
        let mut handle = backend.clone();

        handle.replace(b"one").unwrap();
        backend.fail_writes(true);
        assert!(handle.replace(b"two").is_err());
        assert_eq!(backend.image().unwrap(), b"one");
        assert_eq!(backend.rejected_writes(), 1);

        backend.fail_writes(false);
        handle.replace(b"three").unwrap();
        assert_eq!(backend.image().unwrap(), b"three");
    }
}
