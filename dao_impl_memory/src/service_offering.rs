use std::sync::Arc;

use async_trait::async_trait;
use dao::service_offering::{ServiceOfferingDao, ServiceOfferingEntity};
use dao::DaoError;
use tokio::sync::RwLock;
use uuid::Uuid;

pub struct ServiceOfferingDaoImpl {
    rows: RwLock<Vec<ServiceOfferingEntity>>,
}
impl ServiceOfferingDaoImpl {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(Vec::new()),
        }
    }

    pub fn with_rows(rows: impl IntoIterator<Item = ServiceOfferingEntity>) -> Self {
        Self {
            rows: RwLock::new(rows.into_iter().collect()),
        }
    }
}
impl Default for ServiceOfferingDaoImpl {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ServiceOfferingDao for ServiceOfferingDaoImpl {
    async fn all(&self) -> Result<Arc<[ServiceOfferingEntity]>, DaoError> {
        Ok(self.rows.read().await.iter().cloned().collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ServiceOfferingEntity>, DaoError> {
        Ok(self
            .rows
            .read()
            .await
            .iter()
            .find(|row| row.id == id)
            .cloned())
    }

    async fn create(&self, entity: &ServiceOfferingEntity, process: &str) -> Result<(), DaoError> {
        tracing::debug!(process, id = %entity.id, "create service offering");
        self.rows.write().await.push(entity.clone());
        Ok(())
    }

    async fn update(&self, entity: &ServiceOfferingEntity, process: &str) -> Result<(), DaoError> {
        tracing::debug!(process, id = %entity.id, "update service offering");
        let mut rows = self.rows.write().await;
        let row = rows
            .iter_mut()
            .find(|row| row.id == entity.id)
            .ok_or(DaoError::UpdateMissingEntity(entity.id))?;
        *row = entity.clone();
        Ok(())
    }
}
