use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use time::PrimitiveDateTime;
use uuid::Uuid;

use crate::DaoError;

/// A bundle of services sold as one offering. Duration and required
/// specialties are derived from the member services at resolution time;
/// only the price is stored on the combo itself.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComboEntity {
    pub id: Uuid,
    pub name: Arc<str>,
    pub service_ids: Arc<[Uuid]>,
    pub price_cents: i64,
    pub deleted: Option<PrimitiveDateTime>,
    pub version: Uuid,
}

#[automock]
#[async_trait]
pub trait ComboDao {
    async fn all(&self) -> Result<Arc<[ComboEntity]>, DaoError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<ComboEntity>, DaoError>;
    async fn create(&self, entity: &ComboEntity, process: &str) -> Result<(), DaoError>;
    async fn update(&self, entity: &ComboEntity, process: &str) -> Result<(), DaoError>;
}
