use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use time::PrimitiveDateTime;
use uuid::Uuid;

use crate::voucher::DiscountKindEntity;
use crate::DaoError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SaleItemKindEntity {
    Service,
    Combo,
    Product,
    Package,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SaleItemEntity {
    pub item_id: Uuid,
    pub name: Arc<str>,
    pub kind: SaleItemKindEntity,
    pub unit_price_cents: i64,
    pub quantity: u32,
    pub employee_id: Option<Uuid>,
    pub covered_by_plan: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaymentMethodEntity {
    Cash,
    CreditCard,
    DebitCard,
    Pix,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PaymentEntity {
    pub method: PaymentMethodEntity,
    pub amount_cents: i64,
}

/// Immutable snapshot of a finalized sale. Never updated after creation,
/// hence no `update` on the DAO.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SaleEntity {
    pub id: Uuid,
    pub client_id: Option<Uuid>,
    pub operator_id: Uuid,
    pub appointment_id: Option<Uuid>,
    pub items: Arc<[SaleItemEntity]>,
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    pub discount_kind: Option<DiscountKindEntity>,
    pub voucher_code: Option<Arc<str>>,
    pub plan_credit_cents: i64,
    pub total_cents: i64,
    pub payments: Arc<[PaymentEntity]>,
    pub created: PrimitiveDateTime,
    pub version: Uuid,
}

#[automock]
#[async_trait]
pub trait SaleDao {
    async fn all(&self) -> Result<Arc<[SaleEntity]>, DaoError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<SaleEntity>, DaoError>;
    async fn create(&self, entity: &SaleEntity, process: &str) -> Result<(), DaoError>;
}
