use std::sync::Arc;

use async_trait::async_trait;
use dao::combo::{ComboDao, ComboEntity};
use dao::DaoError;
use tokio::sync::RwLock;
use uuid::Uuid;

pub struct ComboDaoImpl {
    rows: RwLock<Vec<ComboEntity>>,
}
impl ComboDaoImpl {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(Vec::new()),
        }
    }

    pub fn with_rows(rows: impl IntoIterator<Item = ComboEntity>) -> Self {
        Self {
            rows: RwLock::new(rows.into_iter().collect()),
        }
    }
}
impl Default for ComboDaoImpl {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ComboDao for ComboDaoImpl {
    async fn all(&self) -> Result<Arc<[ComboEntity]>, DaoError> {
        Ok(self.rows.read().await.iter().cloned().collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ComboEntity>, DaoError> {
        Ok(self
            .rows
            .read()
            .await
            .iter()
            .find(|row| row.id == id)
            .cloned())
    }

    async fn create(&self, entity: &ComboEntity, process: &str) -> Result<(), DaoError> {
        tracing::debug!(process, id = %entity.id, "create combo");
        self.rows.write().await.push(entity.clone());
        Ok(())
    }

    async fn update(&self, entity: &ComboEntity, process: &str) -> Result<(), DaoError> {
        tracing::debug!(process, id = %entity.id, "update combo");
        let mut rows = self.rows.write().await;
        let row = rows
            .iter_mut()
            .find(|row| row.id == entity.id)
            .ok_or(DaoError::UpdateMissingEntity(entity.id))?;
        *row = entity.clone();
        Ok(())
    }
}
