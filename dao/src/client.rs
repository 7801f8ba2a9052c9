use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use time::PrimitiveDateTime;
use uuid::Uuid;

use crate::DaoError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientEntity {
    pub id: Uuid,
    pub name: Arc<str>,
    pub phone: Option<Arc<str>>,
    pub deleted: Option<PrimitiveDateTime>,
    pub version: Uuid,
}

#[automock]
#[async_trait]
pub trait ClientDao {
    async fn all(&self) -> Result<Arc<[ClientEntity]>, DaoError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<ClientEntity>, DaoError>;
    async fn create(&self, entity: &ClientEntity, process: &str) -> Result<(), DaoError>;
    async fn update(&self, entity: &ClientEntity, process: &str) -> Result<(), DaoError>;
}
