pub mod record_service;

use std::sync::Arc;
use sqlx::SqlitePool;
use crate::repository::*;
use record_service::RecordService;

pub struct ServiceContext {
    pub record_repo: Arc<dyn RecordRepository>,
    pub record_service: Arc<RecordService>,
    pub db_pool: SqlitePool,
}

impl ServiceContext {
    pub fn new(db_pool: SqlitePool) -> Self {
        let record_repo: Arc<dyn RecordRepository> =
            Arc::new(SqliteRecordRepository::new(db_pool.clone()));
        let record_service = Arc::new(RecordService::new(record_repo.clone()));

        Self {
            record_repo,
            record_service,
            db_pool,
        }
    }
}
