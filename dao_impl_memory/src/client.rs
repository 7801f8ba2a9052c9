use std::sync::Arc;

use async_trait::async_trait;
use dao::client::{ClientDao, ClientEntity};
use dao::DaoError;
use tokio::sync::RwLock;
use uuid::Uuid;

pub struct ClientDaoImpl {
    rows: RwLock<Vec<ClientEntity>>,
}
impl ClientDaoImpl {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(Vec::new()),
        }
    }

    pub fn with_rows(rows: impl IntoIterator<Item = ClientEntity>) -> Self {
        Self {
            rows: RwLock::new(rows.into_iter().collect()),
        }
    }
}
impl Default for ClientDaoImpl {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ClientDao for ClientDaoImpl {
    async fn all(&self) -> Result<Arc<[ClientEntity]>, DaoError> {
        Ok(self.rows.read().await.iter().cloned().collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ClientEntity>, DaoError> {
        Ok(self
            .rows
            .read()
            .await
            .iter()
            .find(|row| row.id == id)
            .cloned())
    }

    async fn create(&self, entity: &ClientEntity, process: &str) -> Result<(), DaoError> {
        tracing::debug!(process, id = %entity.id, "create client");
        self.rows.write().await.push(entity.clone());
        Ok(())
    }

    async fn update(&self, entity: &ClientEntity, process: &str) -> Result<(), DaoError> {
        tracing::debug!(process, id = %entity.id, "update client");
        let mut rows = self.rows.write().await;
        let row = rows
            .iter_mut()
            .find(|row| row.id == entity.id)
            .ok_or(DaoError::UpdateMissingEntity(entity.id))?;
        *row = entity.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(name: &str) -> ClientEntity {
        ClientEntity {
            id: Uuid::new_v4(),
            name: name.into(),
            phone: None,
            deleted: None,
            version: Uuid::new_v4(),
        }
    }

    #[tokio::test]
    async fn test_update_missing_entity_fails() {
        let dao = ClientDaoImpl::new();
        let result = dao.update(&client("Carla"), "test").await;
        assert!(matches!(result, Err(DaoError::UpdateMissingEntity(_))));
    }

    #[tokio::test]
    async fn test_create_then_find() {
        let dao = ClientDaoImpl::new();
        let entity = client("Carla");
        dao.create(&entity, "test").await.unwrap();
        assert_eq!(dao.find_by_id(entity.id).await.unwrap(), Some(entity));
    }
}
