//! Server command implementation

use std::path::Path;

use anyhow::Result;
use sift_core::{AssistGateway, Config};

use super::open_db;

pub async fn cmd_serve(
    db_path: &Path,
    host: &str,
    port: u16,
    no_encrypt: bool,
    config: &Config,
) -> Result<()> {
    println!("🚀 Starting sift web server...");
    println!("   Database: {}", db_path.display());
    println!("   Listening: http://{}:{}", host, port);
    println!(
        "   Upload limit: {} MB",
        config.import.max_import_bytes / 1024 / 1024
    );
    if no_encrypt {
        println!("   ⚠️  Encryption DISABLED (--no-encrypt)");
    }
    println!();
    println!("   Press Ctrl+C to stop");

    let db = open_db(db_path, no_encrypt)?;
    let gateway = AssistGateway::from_config(&config.assist);

    let server_config = sift_server::ServerConfig {
        allowed_origins: vec![],
        max_upload_size: usize::try_from(config.import.max_import_bytes)
            .unwrap_or(sift_server::MAX_UPLOAD_SIZE),
    };

    sift_server::serve_with_config(db, gateway, host, port, server_config).await
}
