//! CSV import command implementation

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use midinero_core::{db::Database, import::parse_csv};
use tracing::info;

use super::resolve_user;

/// Outcome of one import run
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub found: usize,
    pub imported: usize,
    pub skipped: usize,
}

/// Import a CSV file for a user, skipping rows imported before
pub fn import_file(db: &Database, file: &Path, username: &str) -> Result<ImportSummary> {
    let user_id = resolve_user(db, username)?;

    let csv_file =
        File::open(file).with_context(|| format!("Failed to open file: {}", file.display()))?;
    let transactions = parse_csv(csv_file)
        .with_context(|| format!("Failed to parse CSV: {}", file.display()))?;

    let mut summary = ImportSummary {
        found: transactions.len(),
        ..Default::default()
    };

    for tx in &transactions {
        match db.insert_transaction(user_id, tx)? {
            Some(_) => summary.imported += 1,
            None => summary.skipped += 1,
        }
    }

    db.log_audit(
        user_id,
        "import",
        Some("transactions"),
        Some(&format!(
            "file={}, imported={}, skipped={}",
            file.display(),
            summary.imported,
            summary.skipped
        )),
    )?;
    info!(
        user = username,
        imported = summary.imported,
        skipped = summary.skipped,
        "Import finished"
    );

    Ok(summary)
}

pub fn cmd_import(db: &Database, file: &Path, username: &str) -> Result<()> {
    println!("📥 Importing {} for {}...", file.display(), username);

    let summary = import_file(db, file, username)?;

    println!("   Found {} transactions", summary.found);
    println!("✅ Import complete!");
    println!("   Imported: {}", summary.imported);
    println!("   Skipped (duplicates): {}", summary.skipped);

    if summary.imported > 0 {
        println!();
        println!("💡 See the results with: midinero report overview --user {}", username);
    }

    Ok(())
}
