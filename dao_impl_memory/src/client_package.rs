use std::sync::Arc;

use async_trait::async_trait;
use dao::client_package::{ClientPackageDao, ClientPackageEntity, PlanUsageEntity};
use dao::DaoError;
use tokio::sync::RwLock;
use uuid::Uuid;

pub struct ClientPackageDaoImpl {
    rows: RwLock<Vec<ClientPackageEntity>>,
    usage: RwLock<Vec<PlanUsageEntity>>,
}
impl ClientPackageDaoImpl {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(Vec::new()),
            usage: RwLock::new(Vec::new()),
        }
    }

    pub fn with_rows(
        rows: impl IntoIterator<Item = ClientPackageEntity>,
        usage: impl IntoIterator<Item = PlanUsageEntity>,
    ) -> Self {
        Self {
            rows: RwLock::new(rows.into_iter().collect()),
            usage: RwLock::new(usage.into_iter().collect()),
        }
    }
}
impl Default for ClientPackageDaoImpl {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ClientPackageDao for ClientPackageDaoImpl {
    async fn all(&self) -> Result<Arc<[ClientPackageEntity]>, DaoError> {
        Ok(self.rows.read().await.iter().cloned().collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ClientPackageEntity>, DaoError> {
        Ok(self
            .rows
            .read()
            .await
            .iter()
            .find(|row| row.id == id)
            .cloned())
    }

    async fn find_by_client(
        &self,
        client_id: Uuid,
    ) -> Result<Arc<[ClientPackageEntity]>, DaoError> {
        Ok(self
            .rows
            .read()
            .await
            .iter()
            .filter(|row| row.client_id == client_id)
            .cloned()
            .collect())
    }

    async fn create(&self, entity: &ClientPackageEntity, process: &str) -> Result<(), DaoError> {
        tracing::debug!(process, id = %entity.id, "create client package");
        self.rows.write().await.push(entity.clone());
        Ok(())
    }

    async fn update(&self, entity: &ClientPackageEntity, process: &str) -> Result<(), DaoError> {
        tracing::debug!(process, id = %entity.id, "update client package");
        let mut rows = self.rows.write().await;
        let row = rows
            .iter_mut()
            .find(|row| row.id == entity.id)
            .ok_or(DaoError::UpdateMissingEntity(entity.id))?;
        *row = entity.clone();
        Ok(())
    }

    async fn usage_for_client(&self, client_id: Uuid) -> Result<Arc<[PlanUsageEntity]>, DaoError> {
        Ok(self
            .usage
            .read()
            .await
            .iter()
            .filter(|row| row.client_id == client_id)
            .copied()
            .collect())
    }

    async fn set_usage(&self, usage: &PlanUsageEntity, process: &str) -> Result<(), DaoError> {
        tracing::debug!(
            process,
            client_id = %usage.client_id,
            service_id = %usage.service_id,
            used = usage.used,
            "set plan usage"
        );
        let mut rows = self.usage.write().await;
        match rows
            .iter_mut()
            .find(|row| row.client_id == usage.client_id && row.service_id == usage.service_id)
        {
            Some(row) => row.used = usage.used,
            None => rows.push(*usage),
        }
        Ok(())
    }

    async fn clear_usage(&self, client_id: Uuid, process: &str) -> Result<(), DaoError> {
        tracing::debug!(process, client_id = %client_id, "clear plan usage");
        self.usage
            .write()
            .await
            .retain(|row| row.client_id != client_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_usage_upsert_and_clear() {
        let dao = ClientPackageDaoImpl::new();
        let client_id = Uuid::new_v4();
        let service_id = Uuid::new_v4();
        let usage = PlanUsageEntity {
            client_id,
            service_id,
            used: 1,
        };
        dao.set_usage(&usage, "test").await.unwrap();
        dao.set_usage(&PlanUsageEntity { used: 3, ..usage }, "test")
            .await
            .unwrap();

        let rows = dao.usage_for_client(client_id).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].used, 3);

        dao.clear_usage(client_id, "test").await.unwrap();
        assert!(dao.usage_for_client(client_id).await.unwrap().is_empty());
    }
}
