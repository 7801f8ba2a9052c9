use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use time::{Date, PrimitiveDateTime};
use uuid::Uuid;

use crate::DaoError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PackageStatusEntity {
    Pending,
    Active,
    Overdue,
    Expired,
    Cancelled,
}

/// A client's subscription instance of a plan.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientPackageEntity {
    pub id: Uuid,
    pub client_id: Uuid,
    pub plan_id: Uuid,
    pub status: PackageStatusEntity,
    pub activated_on: Date,
    pub expires_on: Date,
    pub renews_on: Option<Date>,
    pub recurring: bool,
    pub created: PrimitiveDateTime,
    pub deleted: Option<PrimitiveDateTime>,
    pub version: Uuid,
}

/// Consumed units of one service against a client's active package.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlanUsageEntity {
    pub client_id: Uuid,
    pub service_id: Uuid,
    pub used: u32,
}

#[automock]
#[async_trait]
pub trait ClientPackageDao {
    async fn all(&self) -> Result<Arc<[ClientPackageEntity]>, DaoError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<ClientPackageEntity>, DaoError>;
    async fn find_by_client(&self, client_id: Uuid)
        -> Result<Arc<[ClientPackageEntity]>, DaoError>;
    async fn create(&self, entity: &ClientPackageEntity, process: &str) -> Result<(), DaoError>;
    async fn update(&self, entity: &ClientPackageEntity, process: &str) -> Result<(), DaoError>;

    async fn usage_for_client(&self, client_id: Uuid) -> Result<Arc<[PlanUsageEntity]>, DaoError>;
    async fn set_usage(&self, usage: &PlanUsageEntity, process: &str) -> Result<(), DaoError>;
    async fn clear_usage(&self, client_id: Uuid, process: &str) -> Result<(), DaoError>;
}
