use std::sync::Arc;

use async_trait::async_trait;
use service::client::Client;
use service::permission::Authentication;
use service::ServiceError;
use uuid::Uuid;

pub struct ClientServiceImpl<ClientDao, PermissionService>
where
    ClientDao: dao::client::ClientDao + Send + Sync,
    PermissionService: service::PermissionService + Send + Sync,
{
    client_dao: Arc<ClientDao>,
    permission_service: Arc<PermissionService>,
}
impl<ClientDao, PermissionService> ClientServiceImpl<ClientDao, PermissionService>
where
    ClientDao: dao::client::ClientDao + Send + Sync,
    PermissionService: service::PermissionService + Send + Sync,
{
    pub fn new(client_dao: Arc<ClientDao>, permission_service: Arc<PermissionService>) -> Self {
        Self {
            client_dao,
            permission_service,
        }
    }
}

#[async_trait]
impl<ClientDao, PermissionService> service::client::ClientService
    for ClientServiceImpl<ClientDao, PermissionService>
where
    ClientDao: dao::client::ClientDao + Send + Sync,
    PermissionService: service::PermissionService + Send + Sync,
{
    type Context = PermissionService::Context;

    async fn get_all(
        &self,
        context: Authentication<Self::Context>,
    ) -> Result<Arc<[Client]>, ServiceError> {
        self.permission_service
            .check_permission(service::permission::FRONTDESK_PRIVILEGE, context)
            .await?;
        Ok(self
            .client_dao
            .all()
            .await?
            .iter()
            .filter(|client| client.deleted.is_none())
            .map(Client::from)
            .collect())
    }

    async fn get(
        &self,
        id: Uuid,
        context: Authentication<Self::Context>,
    ) -> Result<Client, ServiceError> {
        self.permission_service
            .check_permission(service::permission::FRONTDESK_PRIVILEGE, context)
            .await?;
        let entity = self
            .client_dao
            .find_by_id(id)
            .await?
            .ok_or(ServiceError::EntityNotFound(id))?;
        if entity.deleted.is_some() {
            return Err(ServiceError::EntityNotFound(id));
        }
        Ok(Client::from(&entity))
    }

    async fn exists(
        &self,
        id: Uuid,
        context: Authentication<Self::Context>,
    ) -> Result<bool, ServiceError> {
        match self.get(id, context).await {
            Ok(_) => Ok(true),
            Err(ServiceError::EntityNotFound(_)) => Ok(false),
            Err(err) => Err(err),
        }
    }
}
