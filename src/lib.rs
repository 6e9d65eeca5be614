pub mod api;
pub mod config;
pub mod db;
pub mod llm;
pub mod token;

pub use db::DbPool;

use config::Config;
use db::Database;
use llm::LlmClient;

/// Shared per-process state. Each request handler sees this behind an `Arc`;
/// the only lazily-established piece is the database pool inside `Database`.
pub struct AppState {
    pub config: Config,
    pub db: Database,
    pub llm: LlmClient,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let db = Database::new(config.database.url.clone());
        let llm = LlmClient::new(&config.llm);
        Self { config, db, llm }
    }
}
