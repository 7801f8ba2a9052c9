use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use time::PrimitiveDateTime;
use uuid::Uuid;

use crate::DaoError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiscountKindEntity {
    Value,
    Percentage,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoucherEntity {
    pub id: Uuid,
    pub code: Arc<str>,
    pub kind: DiscountKindEntity,
    /// Cents for `Value`, whole percent for `Percentage`.
    pub amount: i64,
    pub active: bool,
    pub deleted: Option<PrimitiveDateTime>,
    pub version: Uuid,
}

#[automock]
#[async_trait]
pub trait VoucherDao {
    async fn all(&self) -> Result<Arc<[VoucherEntity]>, DaoError>;
    /// Codes are unique case-insensitively; lookup ignores case.
    async fn find_by_code(&self, code: &str) -> Result<Option<VoucherEntity>, DaoError>;
    async fn create(&self, entity: &VoucherEntity, process: &str) -> Result<(), DaoError>;
    async fn update(&self, entity: &VoucherEntity, process: &str) -> Result<(), DaoError>;
}
