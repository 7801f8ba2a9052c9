use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use time::PrimitiveDateTime;
use trimly_utils::derive_from_reference;
use uuid::Uuid;

use crate::permission::Authentication;
use crate::ServiceError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Client {
    pub id: Uuid,
    pub name: Arc<str>,
    pub phone: Option<Arc<str>>,
    pub deleted: Option<PrimitiveDateTime>,
    pub version: Uuid,
}
impl From<&dao::client::ClientEntity> for Client {
    fn from(client: &dao::client::ClientEntity) -> Self {
        Self {
            id: client.id,
            name: client.name.clone(),
            phone: client.phone.clone(),
            deleted: client.deleted,
            version: client.version,
        }
    }
}
derive_from_reference!(dao::client::ClientEntity, Client);

#[automock(type Context=();)]
#[async_trait]
pub trait ClientService {
    type Context: Clone + PartialEq + Eq + Debug + Send + Sync + 'static;

    async fn get_all(
        &self,
        context: Authentication<Self::Context>,
    ) -> Result<Arc<[Client]>, ServiceError>;
    async fn get(
        &self,
        id: Uuid,
        context: Authentication<Self::Context>,
    ) -> Result<Client, ServiceError>;
    async fn exists(
        &self,
        id: Uuid,
        context: Authentication<Self::Context>,
    ) -> Result<bool, ServiceError>;
}
