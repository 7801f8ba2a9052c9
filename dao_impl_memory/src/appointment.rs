use std::sync::Arc;

use async_trait::async_trait;
use dao::appointment::{AppointmentDao, AppointmentEntity};
use dao::DaoError;
use time::Date;
use tokio::sync::RwLock;
use uuid::Uuid;

pub struct AppointmentDaoImpl {
    rows: RwLock<Vec<AppointmentEntity>>,
}
impl AppointmentDaoImpl {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(Vec::new()),
        }
    }

    pub fn with_rows(rows: impl IntoIterator<Item = AppointmentEntity>) -> Self {
        Self {
            rows: RwLock::new(rows.into_iter().collect()),
        }
    }
}
impl Default for AppointmentDaoImpl {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AppointmentDao for AppointmentDaoImpl {
    async fn all(&self) -> Result<Arc<[AppointmentEntity]>, DaoError> {
        Ok(self.rows.read().await.iter().cloned().collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<AppointmentEntity>, DaoError> {
        Ok(self
            .rows
            .read()
            .await
            .iter()
            .find(|row| row.id == id)
            .cloned())
    }

    async fn find_by_date(&self, date: Date) -> Result<Arc<[AppointmentEntity]>, DaoError> {
        Ok(self
            .rows
            .read()
            .await
            .iter()
            .filter(|row| row.date == date)
            .cloned()
            .collect())
    }

    async fn find_by_employee_and_date(
        &self,
        employee_id: Uuid,
        date: Date,
    ) -> Result<Arc<[AppointmentEntity]>, DaoError> {
        Ok(self
            .rows
            .read()
            .await
            .iter()
            .filter(|row| row.employee_id == employee_id && row.date == date)
            .cloned()
            .collect())
    }

    async fn create(&self, entity: &AppointmentEntity, process: &str) -> Result<(), DaoError> {
        tracing::debug!(process, id = %entity.id, "create appointment");
        self.rows.write().await.push(entity.clone());
        Ok(())
    }

    async fn update(&self, entity: &AppointmentEntity, process: &str) -> Result<(), DaoError> {
        tracing::debug!(process, id = %entity.id, "update appointment");
        let mut rows = self.rows.write().await;
        let row = rows
            .iter_mut()
            .find(|row| row.id == entity.id)
            .ok_or(DaoError::UpdateMissingEntity(entity.id))?;
        *row = entity.clone();
        Ok(())
    }
}
