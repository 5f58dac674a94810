//! # Backend Service
//!
//! Thin entry point that delegates to lib-web for server setup.
//!
//! Reads `.env`, then `BIND_ADDRESS` and `ALLOWED_ORIGINS`. Everything else
//! is loaded by [`lib_web::start_server`].

use lib_web::{start_server, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = ServerConfig {
        migrations_path: "migrations",
        ..ServerConfig::from_env()
    };

    start_server(config).await
}
