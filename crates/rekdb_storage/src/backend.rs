//! Storage backend trait definition.

use crate::error::StorageResult;

/// A low-level storage backend for rekdb.
///
/// Storage backends are **opaque image stores**. The database encodes its
/// complete state into one byte image and hands it to [`replace`] after
/// every committed mutation; on open it asks for that image back with
/// [`load`]. Backends do not understand collections or entities.
///
/// # Invariants
///
/// - `load` returns exactly the bytes of the last successful `replace`
/// - `replace` is all-or-nothing: on error the previous image is intact
/// - Backends must be `Send + Sync` so the database can be shared
///
/// # Implementors
///
/// - [`super::InMemoryBackend`] - For testing
/// - [`super::FileBackend`] - For persistent storage
///
/// [`replace`]: StorageBackend::replace
/// [`load`]: StorageBackend::load
pub trait StorageBackend: Send + Sync {
    /// Returns the current image, or `None` if nothing was ever stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the image exists but cannot be read.
    fn load(&self) -> StorageResult<Option<Vec<u8>>>;

    /// Replaces the stored image.
    ///
    /// After this returns successfully, a subsequent `load` (including one
    /// from a new process, for persistent backends) returns `image`.
    ///
    /// # Errors
    ///
    /// Returns an error if the image cannot be written. The previous image
    /// must remain readable in that case.
    fn replace(&mut self, image: &[u8]) -> StorageResult<()>;

    /// Returns the size of the current image in bytes (0 if empty).
    ///
    /// # Errors
    ///
    /// Returns an error if the size cannot be determined.
    fn size(&self) -> StorageResult<u64>;
}
