//! In-memory storage backend for testing.

use crate::backend::StorageBackend;
use crate::error::StorageResult;
use parking_lot::RwLock;
use std::sync::Arc;

/// An in-memory storage backend.
///
/// This backend keeps the image in memory and is suitable for:
/// - Unit tests
/// - Integration tests
/// - Ephemeral databases that don't need persistence
///
/// Clones share the same image, so a test can keep a handle to a backend
/// it has handed to a database.
///
/// # Example
///
/// ```rust
/// use rekdb_storage::{StorageBackend, InMemoryBackend};
///
/// let mut backend = InMemoryBackend::new();
/// backend.replace(b"image").unwrap();
/// assert_eq!(backend.size().unwrap(), 5);
/// ```
#[derive(Debug, Default, Clone)]
pub struct InMemoryBackend {
    image: Arc<RwLock<Option<Vec<u8>>>>,
}

impl InMemoryBackend {
    /// Creates a new empty in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new in-memory backend with a pre-existing image.
    ///
    /// Useful for testing reopen scenarios.
    #[must_use]
    pub fn with_image(image: Vec<u8>) -> Self {
        Self {
            image: Arc::new(RwLock::new(Some(image))),
        }
    }

    /// Returns a copy of the current image.
    #[must_use]
    pub fn image(&self) -> Option<Vec<u8>> {
        self.image.read().clone()
    }

    /// Drops the stored image.
    pub fn clear(&mut self) {
        *self.image.write() = None;
    }
}

impl StorageBackend for InMemoryBackend {
    fn load(&self) -> StorageResult<Option<Vec<u8>>> {
        Ok(self.image.read().clone())
    }

    fn replace(&mut self, image: &[u8]) -> StorageResult<()> {
        *self.image.write() = Some(image.to_vec());
        Ok(())
    }

    fn size(&self) -> StorageResult<u64> {
        Ok(self.image.read().as_ref().map_or(0, |i| i.len() as u64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_new_is_empty() {
        let backend = InMemoryBackend::new();
        assert_eq!(backend.size().unwrap(), 0);
        assert!(backend.load().unwrap().is_none());
    }

    #[test]
    fn memory_replace_then_load() {
        let mut backend = InMemoryBackend::new();
        backend.replace(b"first").unwrap();
        backend.replace(b"second image").unwrap();

        assert_eq!(backend.load().unwrap().unwrap(), b"second image");
        assert_eq!(backend.size().unwrap(), 12);
    }

    #[test]
    fn memory_with_image() {
        let backend = InMemoryBackend::with_image(b"preloaded".to_vec());
        assert_eq!(backend.size().unwrap(), 9);
        assert_eq!(backend.image().unwrap(), b"preloaded");
    }

    #[test]
    fn memory_clear() {
        let mut backend = InMemoryBackend::new();
        backend.replace(b"some data").unwrap();
        backend.clear();
        assert!(backend.load().unwrap().is_none());
    }

    #[test]
    fn memory_clones_share_image() {
        let backend = InMemoryBackend::new();
        let mut handle = backend.clone();
        handle.replace(b"shared").unwrap();
        assert_eq!(backend.image().unwrap(), b"shared");
    }

    #[test]
    fn memory_empty_image_is_not_missing() {
        let mut backend = InMemoryBackend::new();
        backend.replace(b"").unwrap();
        assert_eq!(backend.load().unwrap(), Some(Vec::new()));
    }
}
