//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` - Shared utility to open the database
//! - `resolve_user` - Look up a user by name
//! - `cmd_init` - Initialize the database

use std::path::Path;

use anyhow::{Context, Result};
use midinero_core::db::Database;

/// Open database with encryption by default, or unencrypted if --no-encrypt
pub fn open_db(db_path: &Path, no_encrypt: bool) -> Result<Database> {
    let path_str = db_path
        .to_str()
        .context("Database path must be valid UTF-8")?;
    if no_encrypt {
        Database::new_unencrypted(path_str).context("Failed to open database (unencrypted)")
    } else {
        Database::new(path_str).context("Failed to open database")
    }
}

/// Resolve a username to its ID
pub fn resolve_user(db: &Database, username: &str) -> Result<i64> {
    db.get_user_by_username(username)?
        .map(|u| u.id)
        .ok_or_else(|| {
            anyhow::anyhow!(
                "User not found: {}. Create it with 'midinero user add {}'",
                username,
                username
            )
        })
}

pub fn cmd_init(db_path: &Path, no_encrypt: bool) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    let db = open_db(db_path, no_encrypt)?;
    let users = db.list_users()?;
    println!("   Users: {}", users.len());

    if no_encrypt {
        println!("   ⚠️  Encryption: DISABLED (--no-encrypt)");
    } else {
        println!("   🔒 Encryption: ENABLED");
    }

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Create a user: midinero user add <name>");
    println!("  2. Import transactions: midinero import --file statement.csv --user <name>");
    println!("  3. Start web UI: midinero serve");

    Ok(())
}
