use std::sync::Arc;

use async_trait::async_trait;
use dao::product::{ProductDao, ProductEntity};
use dao::DaoError;
use tokio::sync::RwLock;
use uuid::Uuid;

pub struct ProductDaoImpl {
    rows: RwLock<Vec<ProductEntity>>,
}
impl ProductDaoImpl {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(Vec::new()),
        }
    }

    pub fn with_rows(rows: impl IntoIterator<Item = ProductEntity>) -> Self {
        Self {
            rows: RwLock::new(rows.into_iter().collect()),
        }
    }
}
impl Default for ProductDaoImpl {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProductDao for ProductDaoImpl {
    async fn all(&self) -> Result<Arc<[ProductEntity]>, DaoError> {
        Ok(self.rows.read().await.iter().cloned().collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ProductEntity>, DaoError> {
        Ok(self
            .rows
            .read()
            .await
            .iter()
            .find(|row| row.id == id)
            .cloned())
    }

    async fn create(&self, entity: &ProductEntity, process: &str) -> Result<(), DaoError> {
        tracing::debug!(process, id = %entity.id, "create product");
        self.rows.write().await.push(entity.clone());
        Ok(())
    }

    async fn update(&self, entity: &ProductEntity, process: &str) -> Result<(), DaoError> {
        tracing::debug!(process, id = %entity.id, "update product");
        let mut rows = self.rows.write().await;
        let row = rows
            .iter_mut()
            .find(|row| row.id == entity.id)
            .ok_or(DaoError::UpdateMissingEntity(entity.id))?;
        *row = entity.clone();
        Ok(())
    }
}
