//! Seed command: adds clients one at a time through the request tracker.

use rekdb_core::{Client, EntityTracker};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::warn;

/// Outcome of a seed run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedReport {
    /// Clients added.
    pub added: usize,
    /// Clients rejected by validation or storage.
    pub failed: usize,
    /// Key the next client would receive.
    pub next_id: i64,
}

/// Runs the seed command.
pub fn run(db_path: &Path, clients_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let clients: Vec<Client> = serde_json::from_slice(&fs::read(clients_path)?)?;
    let db = Arc::new(super::open(db_path)?);

    let runtime = tokio::runtime::Builder::new_current_thread().build()?;
    let report = runtime.block_on(seed(db, clients))?;

    println!("✓ Seed finished");
    println!("  Added:   {}", report.added);
    println!("  Failed:  {}", report.failed);
    println!("  Next id: {}", report.next_id);
    Ok(())
}

/// Adds `clients` in order after loading the existing ones.
///
/// A rejected client is reported and skipped; the rest are still added.
pub async fn seed(
    db: Arc<rekdb_core::Database>,
    clients: Vec<Client>,
) -> Result<SeedReport, Box<dyn std::error::Error>> {
    let mut tracker = EntityTracker::<Client>::new(db)?;
    tracker.fetch_all().await?;

    let mut report = SeedReport::default();
    for client in clients {
        let name = client.name.clone();
        match tracker.add(client).await {
            Ok(_) => report.added += 1,
            Err(e) => {
                warn!("Skipping client {:?}: {}", name, e);
                report.failed += 1;
            }
        }
    }
    report.next_id = tracker.state().next_id;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rekdb_core::Database;

    fn client(name: &str, open: &str) -> Client {
        Client {
            name: name.into(),
            morning_open_time: open.into(),
            evening_close_time: "22:00".into(),
            ..Client::default()
        }
    }

    #[tokio::test]
    async fn seed_skips_invalid_clients() {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let clients = vec![
            client("Bar Sol", "09:00"),
            client("", "09:00"),
            client("Bar Luna", "10:00"),
        ];

        let report = seed(Arc::clone(&db), clients).await.unwrap();
        assert_eq!(
            report,
            SeedReport {
                added: 2,
                failed: 1,
                next_id: 3,
            }
        );
    }

    #[tokio::test]
    async fn seed_continues_after_existing_keys() {
        let db = Arc::new(Database::open_in_memory().unwrap());
        seed(Arc::clone(&db), vec![client("Bar Sol", "09:00")])
            .await
            .unwrap();

        let report = seed(db, vec![client("Bar Luna", "10:00")]).await.unwrap();
        assert_eq!(report.next_id, 3);
    }
}
