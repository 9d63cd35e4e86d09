//! Export and import commands.

use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Writes the export document to `output`, or to stdout.
pub fn export(db_path: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let db = super::open(db_path)?;
    let bytes = db.export()?;

    match output {
        Some(output) => {
            fs::write(output, &bytes)?;
            info!("Exported {} bytes to {:?}", bytes.len(), output);
            println!("✓ Export written to {:?}", output);
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&bytes)?;
            stdout.write_all(b"\n")?;
        }
    }

    db.close()?;
    Ok(())
}

/// Replaces the collections found in an export document.
///
/// The document is fully decoded first; a malformed file changes nothing.
pub fn import(db_path: &Path, input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    info!("Importing {:?}", input);
    let bytes = fs::read(input)?;
    let db = super::open(db_path)?;
    db.import(&bytes)?;

    println!("✓ Import completed");
    for name in db.collection_names()? {
        println!("  {}: {} records", name, db.count(&name)?);
    }

    db.close()?;
    Ok(())
}
