//! # Database Store
//!
//! SQLite connection pool, schema migrations, and repository implementations.
//!
//! Repository functions are generic over [`sqlx::Executor`], so the same call
//! works against the pool or inside a transaction:
//!
//! ```rust,no_run
//! # use lib_core::model::store::{create_pool, MessageRepository, MessageRole};
//! # async fn example() -> anyhow::Result<()> {
//! let pool = create_pool("sqlite:data/chat_history.db").await?;
//! let mut tx = pool.begin().await?;
//! MessageRepository::create(&mut *tx, 1, MessageRole::Assistant, "Hello", chrono::Utc::now()).await?;
//! tx.commit().await?;
//! # Ok(())
//! # }
//! ```

// region: --- Modules
pub mod chat_repository;
pub mod file_repository;
pub mod message_repository;
pub mod models;
// endregion: --- Modules

// region: --- Re-exports
pub use chat_repository::ChatRepository;
pub use file_repository::FileRepository;
pub use message_repository::MessageRepository;
pub use models::{
    Chat, ChatForCreate, ChatWithCount, FileAttachment, FileForCreate, Message, MessageRole,
};
// endregion: --- Re-exports

// region: --- Types and Functions
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;
use tracing::info;

/// Type alias for SQLite connection pool.
pub type DbPool = SqlitePool;

/// Create a SQLite connection pool for `database_url`.
///
/// The database file (and its parent directory) is created when missing.
/// Foreign keys are enforced on every connection so deletes cascade.
pub async fn create_pool(database_url: &str) -> anyhow::Result<DbPool> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    if let Some(parent) = options.get_filename().parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let pool = SqlitePoolOptions::new().connect_with(options).await?;
    Ok(pool)
}

/// Apply the SQL migrations found in `migrations_path`.
pub async fn run_migrations(pool: &DbPool, migrations_path: &Path) -> anyhow::Result<()> {
    info!(path = %migrations_path.display(), "Running database migrations");
    let migrator = sqlx::migrate::Migrator::new(migrations_path).await?;
    migrator.run(pool).await?;
    Ok(())
}

/// Location of the workspace `migrations/` directory at build time.
pub fn default_migrations_dir() -> &'static Path {
    Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/../../../migrations"))
}

/// Create a migrated, single-connection in-memory database.
///
/// Every connection to `sqlite::memory:` is a separate database, so the pool
/// is pinned to one connection that never expires.
pub async fn create_memory_pool() -> anyhow::Result<DbPool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    run_migrations(&pool, default_migrations_dir()).await?;
    Ok(pool)
}
// endregion: --- Types and Functions
