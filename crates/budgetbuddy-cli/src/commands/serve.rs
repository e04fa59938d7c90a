//! Server command implementation

use std::path::Path;

use anyhow::Result;

use budgetbuddy_server::JWT_SECRET_ENV;

use super::open_db;

pub async fn cmd_serve(
    db_path: &Path,
    host: &str,
    port: u16,
    no_encrypt: bool,
    static_dir: Option<&Path>,
) -> Result<()> {
    println!("🚀 Starting BudgetBuddy web server...");
    println!("   Database: {}", db_path.display());
    println!("   Listening: http://{}:{}", host, port);
    if let Some(dir) = static_dir {
        println!("   Static files: {}", dir.display());
    }

    if std::env::var(JWT_SECRET_ENV).is_ok() {
        println!("   🔑 Auth tokens: signed with {}", JWT_SECRET_ENV);
    } else {
        println!(
            "   ⚠️  {} not set - tokens use an insecure default secret",
            JWT_SECRET_ENV
        );
    }

    let db = open_db(db_path, no_encrypt)?;

    budgetbuddy_server::serve(
        db,
        host,
        port,
        static_dir.and_then(|p| p.to_str()),
    )
    .await
}
