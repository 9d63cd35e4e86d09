//! Snapshot commands.
//!
//! Snapshots live inside the database file itself, in the `backups`
//! collection, so every command here opens the database and goes through
//! [`BackupManager`].

use rekdb_core::{BackupManager, BackupSummary};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

fn manager(db_path: &Path) -> Result<BackupManager, Box<dyn std::error::Error>> {
    let db = super::open(db_path)?;
    Ok(BackupManager::with_defaults(Arc::new(db)))
}

/// Takes a snapshot now and applies retention.
pub fn create(db_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    info!("Creating snapshot of {:?}", db_path);
    let manager = manager(db_path)?;
    let id = manager.snapshot_now()?;

    println!("✓ Snapshot created successfully");
    println!("  Id: {id}");
    if let Some(summary) = manager.list()?.into_iter().find(|s| s.id == id) {
        print_summary(&summary);
    }
    Ok(())
}

/// Lists snapshots, newest first.
pub fn list(db_path: &Path, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let summaries = manager(db_path)?.list()?;

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&summaries)?),
        _ if summaries.is_empty() => println!("No snapshots"),
        _ => {
            for summary in &summaries {
                println!("{}", summary.id);
                print_summary(summary);
            }
        }
    }
    Ok(())
}

/// Replaces the collections held by a snapshot.
pub fn restore(db_path: &Path, id: &str) -> Result<(), Box<dyn std::error::Error>> {
    info!("Restoring snapshot {id}");
    manager(db_path)?.restore(id)?;
    println!("✓ Snapshot {id} restored");
    Ok(())
}

/// Writes a snapshot into `dir` under its artifact name.
pub fn download(db_path: &Path, id: &str, dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let artifact = manager(db_path)?.download(id)?;
    let written = artifact.write_into(dir)?;

    println!("✓ Snapshot written");
    println!("  Path: {:?}", written);
    println!("  Size: {} bytes", artifact.contents.len());
    Ok(())
}

fn print_summary(summary: &BackupSummary) {
    println!("  Taken:   {}", summary.metadata.timestamp.to_rfc3339());
    println!("  Size:    {} bytes", summary.metadata.size);
    println!("  Version: {}", summary.metadata.version);
}
