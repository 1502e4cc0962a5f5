use async_trait::async_trait;
use crate::domain::*;
use crate::error::Result;

pub mod record_repository;

pub use record_repository::SqliteRecordRepository;

#[async_trait]
pub trait RecordRepository: Send + Sync {
    /// Newest display date first, ties broken by newest `created_at`.
    async fn list(&self, kind: ResourceKind) -> Result<Vec<Record>>;
    async fn find_by_id(&self, kind: ResourceKind, id: i64) -> Result<Option<Record>>;
    async fn create(&self, kind: ResourceKind, record: NewRecord) -> Result<Record>;
    /// Writes every mutable column of `record` back to row `record.id`.
    async fn update(&self, kind: ResourceKind, record: Record) -> Result<Record>;
    /// Returns whether a row was removed.
    async fn delete(&self, kind: ResourceKind, id: i64) -> Result<bool>;
    async fn count(&self, kind: ResourceKind) -> Result<i64>;
    /// Inserts one example row into every empty table.
    async fn seed_defaults(&self) -> Result<Vec<Record>>;
}
