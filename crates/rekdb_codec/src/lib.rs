//! # rekdb Codec
//!
//! Canonical export/import format for rekdb.
//!
//! Two documents are defined here:
//!
//! - [`ExportDocument`]: the self-describing, human-readable export. It
//!   carries a format version tag, the full contents of every domain
//!   collection, and, for the backups collection, metadata only. Raw backup
//!   payloads are never nested inside an export, so a snapshot never
//!   contains earlier snapshots.
//! - [`StoreImage`]: the compact full image (backups included) that the
//!   database hands to its storage backend.
//!
//! Both are generic over the entity type so this crate stays independent
//! of the store's record model.
//!
//! ## Versioning
//!
//! Documents are tagged `"1.0"`. Decoders accept any `1.x` document and
//! read a missing tag as legacy `1.0`; any other major version fails with
//! [`CodecError::UnsupportedFormatVersion`].
//!
//! ## Usage
//!
//! ```
//! use rekdb_codec::{decode_document, encode_document, ExportDocument};
//! use serde_json::{json, Value};
//!
//! let mut doc: ExportDocument<Value> = ExportDocument::new();
//! doc.insert_collection("clients", vec![json!({"id": 1, "name": "Bar"})]);
//!
//! let bytes = encode_document(&doc).unwrap();
//! let decoded: ExportDocument<Value> = decode_document(&bytes).unwrap();
//! assert_eq!(doc, decoded);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod artifact;
mod decoder;
mod document;
mod encoder;
mod error;

pub use artifact::artifact_name;
pub use decoder::{decode_document, decode_image, parse_version};
pub use document::{BackupMetadata, BackupSummary, ExportDocument, StoreImage};
pub use encoder::{encode_document, encode_image};
pub use error::{CodecError, CodecResult};

/// Format version written by this crate.
pub const FORMAT_VERSION: &str = "1.0";

/// The only major version decoders accept.
pub const SUPPORTED_MAJOR_VERSION: u32 = 1;

/// Name of the export field holding backup metadata.
pub const BACKUPS_METADATA_FIELD: &str = "backupsMetadata";
