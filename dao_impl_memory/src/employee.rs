use std::sync::Arc;

use async_trait::async_trait;
use dao::employee::{EmployeeDao, EmployeeEntity};
use dao::DaoError;
use tokio::sync::RwLock;
use uuid::Uuid;

pub struct EmployeeDaoImpl {
    rows: RwLock<Vec<EmployeeEntity>>,
}
impl EmployeeDaoImpl {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(Vec::new()),
        }
    }

    pub fn with_rows(rows: impl IntoIterator<Item = EmployeeEntity>) -> Self {
        Self {
            rows: RwLock::new(rows.into_iter().collect()),
        }
    }
}
impl Default for EmployeeDaoImpl {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmployeeDao for EmployeeDaoImpl {
    async fn all(&self) -> Result<Arc<[EmployeeEntity]>, DaoError> {
        Ok(self.rows.read().await.iter().cloned().collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<EmployeeEntity>, DaoError> {
        Ok(self
            .rows
            .read()
            .await
            .iter()
            .find(|row| row.id == id)
            .cloned())
    }

    async fn create(&self, entity: &EmployeeEntity, process: &str) -> Result<(), DaoError> {
        tracing::debug!(process, id = %entity.id, "create employee");
        self.rows.write().await.push(entity.clone());
        Ok(())
    }

    async fn update(&self, entity: &EmployeeEntity, process: &str) -> Result<(), DaoError> {
        tracing::debug!(process, id = %entity.id, "update employee");
        let mut rows = self.rows.write().await;
        let row = rows
            .iter_mut()
            .find(|row| row.id == entity.id)
            .ok_or(DaoError::UpdateMissingEntity(entity.id))?;
        *row = entity.clone();
        Ok(())
    }
}
