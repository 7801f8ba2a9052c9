use std::sync::Arc;

use async_trait::async_trait;
use dao::sale::{SaleDao, SaleEntity};
use dao::DaoError;
use tokio::sync::RwLock;
use uuid::Uuid;

pub struct SaleDaoImpl {
    rows: RwLock<Vec<SaleEntity>>,
}
impl SaleDaoImpl {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(Vec::new()),
        }
    }
}
impl Default for SaleDaoImpl {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SaleDao for SaleDaoImpl {
    async fn all(&self) -> Result<Arc<[SaleEntity]>, DaoError> {
        Ok(self.rows.read().await.iter().cloned().collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<SaleEntity>, DaoError> {
        Ok(self
            .rows
            .read()
            .await
            .iter()
            .find(|row| row.id == id)
            .cloned())
    }

    async fn create(&self, entity: &SaleEntity, process: &str) -> Result<(), DaoError> {
        tracing::debug!(process, id = %entity.id, total = entity.total_cents, "create sale");
        self.rows.write().await.push(entity.clone());
        Ok(())
    }
}
