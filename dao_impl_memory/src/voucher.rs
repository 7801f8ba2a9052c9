use std::sync::Arc;

use async_trait::async_trait;
use dao::voucher::{VoucherDao, VoucherEntity};
use dao::DaoError;
use tokio::sync::RwLock;
use uuid::Uuid;

pub struct VoucherDaoImpl {
    rows: RwLock<Vec<VoucherEntity>>,
}
impl VoucherDaoImpl {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(Vec::new()),
        }
    }

    pub fn with_rows(rows: impl IntoIterator<Item = VoucherEntity>) -> Self {
        Self {
            rows: RwLock::new(rows.into_iter().collect()),
        }
    }
}
impl Default for VoucherDaoImpl {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VoucherDao for VoucherDaoImpl {
    async fn all(&self) -> Result<Arc<[VoucherEntity]>, DaoError> {
        Ok(self.rows.read().await.iter().cloned().collect())
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<VoucherEntity>, DaoError> {
        Ok(self
            .rows
            .read()
            .await
            .iter()
            .find(|row| row.code.eq_ignore_ascii_case(code))
            .cloned())
    }

    async fn create(&self, entity: &VoucherEntity, process: &str) -> Result<(), DaoError> {
        tracing::debug!(process, id = %entity.id, code = %entity.code, "create voucher");
        self.rows.write().await.push(entity.clone());
        Ok(())
    }

    async fn update(&self, entity: &VoucherEntity, process: &str) -> Result<(), DaoError> {
        tracing::debug!(process, id = %entity.id, code = %entity.code, "update voucher");
        let mut rows = self.rows.write().await;
        let row = rows
            .iter_mut()
            .find(|row| row.id == entity.id)
            .ok_or(DaoError::UpdateMissingEntity(entity.id))?;
        *row = entity.clone();
        Ok(())
    }
}
