use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use time::PrimitiveDateTime;
use uuid::Uuid;

use crate::DaoError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceOfferingEntity {
    pub id: Uuid,
    pub name: Arc<str>,
    pub duration_minutes: u16,
    pub price_cents: i64,
    pub required_specialties: Arc<[Arc<str>]>,
    pub deleted: Option<PrimitiveDateTime>,
    pub version: Uuid,
}

#[automock]
#[async_trait]
pub trait ServiceOfferingDao {
    async fn all(&self) -> Result<Arc<[ServiceOfferingEntity]>, DaoError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<ServiceOfferingEntity>, DaoError>;
    async fn create(&self, entity: &ServiceOfferingEntity, process: &str) -> Result<(), DaoError>;
    async fn update(&self, entity: &ServiceOfferingEntity, process: &str) -> Result<(), DaoError>;
}
