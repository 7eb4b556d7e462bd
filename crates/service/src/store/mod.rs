//! Record storage
//!
//! `GradeStore` is the seam the HTTP handlers talk to; `MemoryGradeStore`
//! keeps everything in one mutex-guarded map for the life of the process.

use async_trait::async_trait;

use crate::domain::UserGrade;
use crate::errors::ServiceError;

pub mod memory;

pub use memory::MemoryGradeStore;

#[async_trait]
pub trait GradeStore: Send + Sync {
    /// Insert or fully replace the record keyed by `record.user_id`.
    async fn set(&self, record: UserGrade);
    async fn get(&self, user_id: &str) -> Option<UserGrade>;

    /// Like [`GradeStore::get`] but maps a miss to [`ServiceError::NotFound`].
    async fn require(&self, user_id: &str) -> Result<UserGrade, ServiceError> {
        self.get(user_id).await.ok_or_else(|| ServiceError::not_found(user_id))
    }
}
