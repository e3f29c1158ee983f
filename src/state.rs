use std::sync::Arc;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use crate::auth::token::TokenKeys;
use crate::config::Config;
use crate::services::files::FileStorage;

pub type DbPool = Pool<SqliteConnectionManager>;

#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub config: Config,
    pub tokens: Arc<TokenKeys>,
    pub files: Arc<FileStorage>,
}

impl AppState {
    pub fn new(db: DbPool, config: Config) -> Self {
        let tokens = TokenKeys::from_config(&config.auth);
        let files = FileStorage::new(config.uploads_path());
        Self {
            db,
            config,
            tokens: Arc::new(tokens),
            files: Arc::new(files),
        }
    }
}
