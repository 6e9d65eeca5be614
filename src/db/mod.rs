mod models;

pub use models::{User, UserResponse};

use anyhow::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use tokio::sync::OnceCell;
use tracing::info;

pub type DbPool = SqlitePool;

/// Execute a SQL migration file, properly handling comments
async fn execute_sql(pool: &SqlitePool, sql: &str) -> Result<()> {
    for statement in sql.split(';') {
        // Strip SQL comment lines (lines starting with --)
        let cleaned: String = statement
            .lines()
            .filter(|line| !line.trim().starts_with("--"))
            .collect::<Vec<_>>()
            .join("\n");
        let trimmed = cleaned.trim();
        if !trimmed.is_empty() {
            sqlx::query(trimmed).execute(pool).await?;
        }
    }
    Ok(())
}

async fn connect(url: &str) -> Result<DbPool> {
    info!("Connecting to database at {}", url);

    // In-memory databases exist per connection; a wider pool would hand out
    // empty databases for every checkout.
    let max_connections = if url.contains(":memory:") || url.contains("mode=memory") {
        1
    } else {
        5
    };

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect(url)
        .await?;

    // Enable WAL mode for better concurrency
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA synchronous = NORMAL")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await?;

    run_migrations(&pool).await?;

    info!("Database initialized successfully");
    Ok(pool)
}

async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    execute_sql(pool, include_str!("../../migrations/001_users.sql")).await?;
    Ok(())
}

/// Connection-state holder for the credential store.
///
/// The pool is established at most once per process; concurrent first calls
/// race on the same initialization and all observe the single winning pool.
/// `main` primes it at startup so an unreachable database aborts the process
/// instead of surfacing per-request.
#[derive(Debug)]
pub struct Database {
    url: String,
    pool: OnceCell<DbPool>,
}

impl Database {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            pool: OnceCell::new(),
        }
    }

    /// Get the connection pool, establishing it on first use.
    pub async fn pool(&self) -> Result<&DbPool> {
        self.pool
            .get_or_try_init(|| connect(&self.url))
            .await
    }
}
