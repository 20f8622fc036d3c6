use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::AppConfig;
use crate::services::UploadQueue;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub uploads: UploadQueue,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Starts the upload worker; call from inside the runtime.
    pub fn new(db: SqlitePool, config: AppConfig) -> Self {
        let uploads = UploadQueue::new(config.upload_delay);
        Self {
            db,
            uploads,
            config: Arc::new(config),
        }
    }
}
