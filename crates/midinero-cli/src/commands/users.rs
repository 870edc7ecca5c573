//! User command implementations

use anyhow::{Context, Result};
use midinero_core::db::Database;

pub fn cmd_users_add(db: &Database, username: &str, email: Option<&str>) -> Result<()> {
    let username = username.trim();
    if username.is_empty() {
        anyhow::bail!("Username cannot be empty");
    }

    let id = db
        .upsert_user(username, email)
        .with_context(|| format!("Failed to add user '{}'", username))?;
    db.log_audit(id, "user_add", Some("user"), email.map(|e| format!("email={}", e)).as_deref())?;

    println!("✅ User '{}' ready (ID: {})", username, id);
    Ok(())
}

pub fn cmd_users_list(db: &Database) -> Result<()> {
    let users = db.list_users()?;

    if users.is_empty() {
        println!("No users yet. Add one with: midinero user add <name>");
        return Ok(());
    }

    println!();
    println!("👤 Users");
    println!("   {:>4} │ {:20} │ {:30} │ {:10}", "ID", "Username", "Email", "Created");
    println!("   ─────┼──────────────────────┼────────────────────────────────┼───────────");
    for user in users {
        println!(
            "   {:>4} │ {:20} │ {:30} │ {:10}",
            user.id,
            super::truncate(&user.username, 20),
            super::truncate(user.email.as_deref().unwrap_or("-"), 30),
            user.created_at.format("%Y-%m-%d")
        );
    }

    Ok(())
}
