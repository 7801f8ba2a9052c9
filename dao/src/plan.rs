use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use time::PrimitiveDateTime;
use uuid::Uuid;

use crate::DaoError;

/// How many units of one service a plan entitles a client to over the
/// validity period.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlanEntitlementEntity {
    pub service_id: Uuid,
    pub quantity: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlanEntity {
    pub id: Uuid,
    pub name: Arc<str>,
    pub price_cents: i64,
    pub validity_days: u16,
    pub entitlements: Arc<[PlanEntitlementEntity]>,
    pub deleted: Option<PrimitiveDateTime>,
    pub version: Uuid,
}

#[automock]
#[async_trait]
pub trait PlanDao {
    async fn all(&self) -> Result<Arc<[PlanEntity]>, DaoError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<PlanEntity>, DaoError>;
    async fn create(&self, entity: &PlanEntity, process: &str) -> Result<(), DaoError>;
    async fn update(&self, entity: &PlanEntity, process: &str) -> Result<(), DaoError>;
}
