use std::sync::Arc;

use async_trait::async_trait;
use dao::plan::{PlanDao, PlanEntity};
use dao::DaoError;
use tokio::sync::RwLock;
use uuid::Uuid;

pub struct PlanDaoImpl {
    rows: RwLock<Vec<PlanEntity>>,
}
impl PlanDaoImpl {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(Vec::new()),
        }
    }

    pub fn with_rows(rows: impl IntoIterator<Item = PlanEntity>) -> Self {
        Self {
            rows: RwLock::new(rows.into_iter().collect()),
        }
    }
}
impl Default for PlanDaoImpl {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PlanDao for PlanDaoImpl {
    async fn all(&self) -> Result<Arc<[PlanEntity]>, DaoError> {
        Ok(self.rows.read().await.iter().cloned().collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<PlanEntity>, DaoError> {
        Ok(self
            .rows
            .read()
            .await
            .iter()
            .find(|row| row.id == id)
            .cloned())
    }

    async fn create(&self, entity: &PlanEntity, process: &str) -> Result<(), DaoError> {
        tracing::debug!(process, id = %entity.id, "create plan");
        self.rows.write().await.push(entity.clone());
        Ok(())
    }

    async fn update(&self, entity: &PlanEntity, process: &str) -> Result<(), DaoError> {
        tracing::debug!(process, id = %entity.id, "update plan");
        let mut rows = self.rows.write().await;
        let row = rows
            .iter_mut()
            .find(|row| row.id == entity.id)
            .ok_or(DaoError::UpdateMissingEntity(entity.id))?;
        *row = entity.clone();
        Ok(())
    }
}
