//! Inspect command implementation.

use rekdb_core::{BackupManager, Database};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

/// Database inspection result.
#[derive(Debug, Serialize)]
pub struct InspectResult {
    /// Database path.
    pub path: String,
    /// Size of the persisted image in bytes.
    pub storage_size: u64,
    /// Total records across every collection.
    pub record_count: usize,
    /// Per-collection record counts, in declaration order.
    pub collections: Vec<CollectionStats>,
    /// Id of the newest snapshot, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_backup: Option<String>,
}

/// Statistics for a single collection.
#[derive(Debug, Serialize)]
pub struct CollectionStats {
    /// Collection name.
    pub name: String,
    /// Number of records.
    pub records: usize,
}

/// Runs the inspect command.
pub fn run(path: &Path, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    if !path.exists() {
        return Err(format!("No database found at {:?}", path).into());
    }
    let db = Arc::new(super::open(path)?);
    let result = inspect(path, db)?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        _ => {
            print_text_output(&result);
        }
    }

    Ok(())
}

fn inspect(path: &Path, db: Arc<Database>) -> Result<InspectResult, Box<dyn std::error::Error>> {
    let mut collections = Vec::new();
    for name in db.collection_names()? {
        let records = db.count(&name)?;
        collections.push(CollectionStats { name, records });
    }
    let latest_backup = BackupManager::with_defaults(Arc::clone(&db))
        .list()?
        .into_iter()
        .next()
        .map(|summary| summary.id);

    Ok(InspectResult {
        path: path.display().to_string(),
        storage_size: db.storage_size()?,
        record_count: collections.iter().map(|c| c.records).sum(),
        collections,
        latest_backup,
    })
}

fn print_text_output(result: &InspectResult) {
    println!("rekdb Database Inspection");
    println!("=========================");
    println!();
    println!("Path: {}", result.path);
    println!("Size: {}", format_size(result.storage_size));
    println!("Records: {}", result.record_count);
    println!();
    println!("Collections:");
    for col in &result.collections {
        println!("  {:<12} {} records", col.name, col.records);
    }
    if let Some(id) = &result.latest_backup {
        println!();
        println!("Latest backup: {id}");
    }
}

fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} bytes", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rekdb_core::{NewRecord, EXPENSES};
    use serde_json::json;

    #[test]
    fn inspect_counts_records_per_collection() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rekdb.json");
        let db = Arc::new(super::super::open(&path).unwrap());
        db.add(EXPENSES, NewRecord::from_value("e1", json!({"amount": 3})).unwrap())
            .unwrap();

        let result = inspect(&path, db).unwrap();
        assert_eq!(result.record_count, 1);
        assert!(result.storage_size > 0);
        assert!(result
            .collections
            .iter()
            .any(|c| c.name == EXPENSES && c.records == 1));
        assert!(result.latest_backup.is_none());
    }

    #[test]
    fn sizes_are_human_readable() {
        assert_eq!(format_size(512), "512 bytes");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.0 MB");
    }
}
