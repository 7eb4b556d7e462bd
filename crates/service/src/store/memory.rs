use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use common::observability;
use tokio::sync::Mutex;
use tracing::debug;

use super::GradeStore;
use crate::domain::UserGrade;

/// In-memory store. A single mutex serializes every read and write;
/// there is no reader/writer split.
#[derive(Clone, Default)]
pub struct MemoryGradeStore {
    inner: Arc<Mutex<HashMap<String, UserGrade>>>,
}

impl MemoryGradeStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Number of records held.
    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }
}

#[async_trait]
impl GradeStore for MemoryGradeStore {
    async fn set(&self, record: UserGrade) {
        let mut map = self.inner.lock().await;
        let replaced = map.insert(record.user_id.clone(), record).is_some();
        observability::RECORDS.set(map.len() as i64);
        drop(map);
        debug!(replaced, "record stored");
    }

    async fn get(&self, user_id: &str) -> Option<UserGrade> {
        let map = self.inner.lock().await;
        map.get(user_id).cloned()
    }
}
