use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use time::PrimitiveDateTime;
use uuid::Uuid;

use crate::DaoError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProductEntity {
    pub id: Uuid,
    pub name: Arc<str>,
    pub price_cents: i64,
    pub deleted: Option<PrimitiveDateTime>,
    pub version: Uuid,
}

#[automock]
#[async_trait]
pub trait ProductDao {
    async fn all(&self) -> Result<Arc<[ProductEntity]>, DaoError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<ProductEntity>, DaoError>;
    async fn create(&self, entity: &ProductEntity, process: &str) -> Result<(), DaoError>;
    async fn update(&self, entity: &ProductEntity, process: &str) -> Result<(), DaoError>;
}
