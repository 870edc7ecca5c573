//! Server command implementation

use std::path::Path;

use anyhow::{Context, Result};
use midinero_core::config::JWT_SECRET_ENV;
use midinero_core::Config;

use super::open_db;

pub async fn cmd_serve(
    db_path: &Path,
    config: &Config,
    host: &str,
    port: u16,
    no_auth: bool,
    no_encrypt: bool,
    static_dir: Option<&Path>,
) -> Result<()> {
    println!("🚀 Starting MiDinero web server...");
    println!("   Database: {}", db_path.display());
    println!("   Listening: http://{}:{}", host, port);
    if let Some(dir) = static_dir {
        println!("   Static files: {}", dir.display());
    }

    let db = open_db(db_path, no_encrypt)?;

    let dev_user_id = if no_auth {
        let id = db
            .upsert_user(&config.auth.dev_user, None)
            .context("Failed to create development user")?;
        println!();
        println!("   ⚠️  Authentication DISABLED - do not expose to network!");
        println!(
            "   👤 Serving every request as '{}'",
            config.auth.dev_user
        );
        Some(id)
    } else {
        if config.auth.jwt_secret.is_some() {
            println!("   🔐 Authentication: Bearer JWT (HS256)");
        } else {
            println!("   ❌ No JWT secret configured. Set {}", JWT_SECRET_ENV);
        }
        None
    };
    if !config.server.allowed_origins.is_empty() {
        println!(
            "   🌐 Allowed origins: {}",
            config.server.allowed_origins.join(", ")
        );
    }
    if no_encrypt {
        println!("   ⚠️  Encryption DISABLED (--no-encrypt)");
    }
    println!();
    println!("   Press Ctrl+C to stop");

    let server_config = midinero_server::ServerConfig {
        require_auth: !no_auth,
        allowed_origins: config.server.allowed_origins.clone(),
        jwt_secret: config.auth.jwt_secret.clone(),
        dev_user_id,
        dashboard: config.dashboard,
        today: None,
    };

    let static_dir_str = static_dir
        .map(|p| p.to_str().context("static_dir path must be valid UTF-8"))
        .transpose()?;
    midinero_server::serve_with_config(db, host, port, static_dir_str, server_config).await?;

    Ok(())
}
