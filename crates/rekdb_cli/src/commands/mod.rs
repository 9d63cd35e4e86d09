//! CLI command implementations.

pub mod autobackup;
pub mod backup;
pub mod collect;
pub mod inspect;
pub mod seed;
pub mod transfer;

use rekdb_core::{Config, Database, Key};
use rekdb_storage::FileBackend;
use std::path::Path;
use tracing::debug;

/// Opens the database file, creating it (and its directory) on first write.
pub fn open(path: &Path) -> Result<Database, Box<dyn std::error::Error>> {
    debug!("Opening database at {:?}", path);
    let backend = FileBackend::open_with_create_dirs(path)?;
    Ok(Database::open(Box::new(backend), Config::default())?)
}

/// Reads a key typed on the command line: integers become integer keys.
pub fn parse_key(raw: &str) -> Key {
    raw.parse::<i64>().map_or_else(|_| Key::from(raw), Key::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_keys_are_integers() {
        assert_eq!(parse_key("12"), Key::Int(12));
        assert_eq!(parse_key("-3"), Key::Int(-3));
    }

    #[test]
    fn other_keys_are_text() {
        assert_eq!(parse_key("M001"), Key::Text("M001".into()));
        assert_eq!(parse_key("12a"), Key::Text("12a".into()));
    }

    #[test]
    fn open_creates_nothing_until_first_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("rekdb.json");

        let db = open(&path).unwrap();
        assert!(!path.exists());
        assert_eq!(db.storage_size().unwrap(), 0);
    }
}
