//! # rekdb Storage
//!
//! Storage backend trait and implementations for rekdb.
//!
//! This crate is the host persistence substrate underneath the record
//! store. Backends are **opaque image stores**: they hold the latest
//! encoded image of the whole store and never interpret it.
//!
//! ## Design Principles
//!
//! - A backend holds exactly one image, replaced wholesale on every commit
//! - No knowledge of collections, entities, or the image format
//! - Must be `Send + Sync` so the database handle can be shared
//!
//! ## Available Backends
//!
//! - [`InMemoryBackend`] - For testing and ephemeral storage
//! - [`FileBackend`] - For persistent storage using OS file APIs
//!
//! ## Example
//!
//! ```rust
//! use rekdb_storage::{StorageBackend, InMemoryBackend};
//!
//! let mut backend = InMemoryBackend::new();
//! assert!(backend.load().unwrap().is_none());
//!
//! backend.replace(b"{\"version\":\"1.0\"}").unwrap();
//! assert_eq!(backend.load().unwrap().unwrap(), b"{\"version\":\"1.0\"}");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod file;
mod memory;

pub use backend::StorageBackend;
pub use error::{StorageError, StorageResult};
pub use file::FileBackend;
pub use memory::InMemoryBackend;
