//! Autobackup command: runs the snapshot schedule until Ctrl-C.

use rekdb_core::{BackupConfig, BackupManager};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Runs the schedule in the foreground.
pub fn run(
    db_path: &Path,
    interval_secs: u64,
    max_backups: usize,
    snapshot_on_start: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let db = Arc::new(super::open(db_path)?);
    let config = BackupConfig::new()
        .interval(Duration::from_secs(interval_secs))
        .max_backups(max_backups)
        .snapshot_on_start(snapshot_on_start);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(async {
        let manager = BackupManager::new(Arc::clone(&db), config);
        manager.start(manager.config().interval)?;
        info!(
            "Autobackup running every {}s, keeping {}",
            interval_secs,
            manager.config().max_backups
        );

        tokio::signal::ctrl_c().await?;
        manager.shutdown().await;

        let stats = manager.stats();
        println!("✓ Autobackup stopped");
        println!("  Cycles completed: {}", stats.cycles_completed);
        println!("  Cycles failed:    {}", stats.cycles_failed);
        if let Some(id) = stats.last_snapshot {
            println!("  Last snapshot:    {id}");
        }
        Ok::<_, Box<dyn std::error::Error>>(())
    })?;

    db.close()?;
    Ok(())
}
