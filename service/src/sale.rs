use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use time::PrimitiveDateTime;
use trimly_utils::derive_from_reference;
use uuid::Uuid;

use crate::cart::{CartItem, CartItemKind, CartState};
use crate::discount::DiscountKind;
use crate::permission::Authentication;
use crate::ServiceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentMethod {
    Cash,
    CreditCard,
    DebitCard,
    Pix,
}
impl From<dao::sale::PaymentMethodEntity> for PaymentMethod {
    fn from(method: dao::sale::PaymentMethodEntity) -> Self {
        match method {
            dao::sale::PaymentMethodEntity::Cash => Self::Cash,
            dao::sale::PaymentMethodEntity::CreditCard => Self::CreditCard,
            dao::sale::PaymentMethodEntity::DebitCard => Self::DebitCard,
            dao::sale::PaymentMethodEntity::Pix => Self::Pix,
        }
    }
}
impl From<PaymentMethod> for dao::sale::PaymentMethodEntity {
    fn from(method: PaymentMethod) -> Self {
        match method {
            PaymentMethod::Cash => Self::Cash,
            PaymentMethod::CreditCard => Self::CreditCard,
            PaymentMethod::DebitCard => Self::DebitCard,
            PaymentMethod::Pix => Self::Pix,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Payment {
    pub method: PaymentMethod,
    pub amount_cents: i64,
}
impl From<&dao::sale::PaymentEntity> for Payment {
    fn from(payment: &dao::sale::PaymentEntity) -> Self {
        Self {
            method: payment.method.into(),
            amount_cents: payment.amount_cents,
        }
    }
}
impl From<&Payment> for dao::sale::PaymentEntity {
    fn from(payment: &Payment) -> Self {
        Self {
            method: payment.method.into(),
            amount_cents: payment.amount_cents,
        }
    }
}

/// A settled sale line. Same shape as a cart line minus the line identity,
/// which has no meaning once the sale is immutable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleItem {
    pub item_id: Uuid,
    pub name: Arc<str>,
    pub kind: CartItemKind,
    pub unit_price_cents: i64,
    pub quantity: u32,
    pub employee_id: Option<Uuid>,
    pub covered_by_plan: bool,
}
impl SaleItem {
    pub fn line_total_cents(&self) -> i64 {
        self.unit_price_cents * self.quantity as i64
    }
}
impl From<&CartItem> for SaleItem {
    fn from(item: &CartItem) -> Self {
        Self {
            item_id: item.item_id,
            name: item.name.clone(),
            kind: item.kind,
            unit_price_cents: item.unit_price_cents,
            quantity: item.quantity,
            employee_id: item.employee_id,
            covered_by_plan: item.covered_by_plan,
        }
    }
}
impl From<&dao::sale::SaleItemEntity> for SaleItem {
    fn from(item: &dao::sale::SaleItemEntity) -> Self {
        Self {
            item_id: item.item_id,
            name: item.name.clone(),
            kind: item.kind.into(),
            unit_price_cents: item.unit_price_cents,
            quantity: item.quantity,
            employee_id: item.employee_id,
            covered_by_plan: item.covered_by_plan,
        }
    }
}
impl From<&SaleItem> for dao::sale::SaleItemEntity {
    fn from(item: &SaleItem) -> Self {
        Self {
            item_id: item.item_id,
            name: item.name.clone(),
            kind: item.kind.into(),
            unit_price_cents: item.unit_price_cents,
            quantity: item.quantity,
            employee_id: item.employee_id,
            covered_by_plan: item.covered_by_plan,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sale {
    pub id: Uuid,
    pub client_id: Option<Uuid>,
    pub operator_id: Uuid,
    pub appointment_id: Option<Uuid>,
    pub items: Arc<[SaleItem]>,
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    pub discount_kind: Option<DiscountKind>,
    pub voucher_code: Option<Arc<str>>,
    pub plan_credit_cents: i64,
    pub total_cents: i64,
    pub payments: Arc<[Payment]>,
    pub created: Option<PrimitiveDateTime>,
    pub version: Uuid,
}
impl Sale {
    pub fn paid_cents(&self) -> i64 {
        self.payments.iter().map(|payment| payment.amount_cents).sum()
    }
}
impl From<&dao::sale::SaleEntity> for Sale {
    fn from(sale: &dao::sale::SaleEntity) -> Self {
        Self {
            id: sale.id,
            client_id: sale.client_id,
            operator_id: sale.operator_id,
            appointment_id: sale.appointment_id,
            items: sale.items.iter().map(SaleItem::from).collect(),
            subtotal_cents: sale.subtotal_cents,
            discount_cents: sale.discount_cents,
            discount_kind: sale.discount_kind.map(DiscountKind::from),
            voucher_code: sale.voucher_code.clone(),
            plan_credit_cents: sale.plan_credit_cents,
            total_cents: sale.total_cents,
            payments: sale.payments.iter().map(Payment::from).collect(),
            created: Some(sale.created),
            version: sale.version,
        }
    }
}
derive_from_reference!(dao::sale::SaleEntity, Sale);

impl TryFrom<&Sale> for dao::sale::SaleEntity {
    type Error = ServiceError;
    fn try_from(sale: &Sale) -> Result<Self, Self::Error> {
        Ok(Self {
            id: sale.id,
            client_id: sale.client_id,
            operator_id: sale.operator_id,
            appointment_id: sale.appointment_id,
            items: sale.items.iter().map(dao::sale::SaleItemEntity::from).collect(),
            subtotal_cents: sale.subtotal_cents,
            discount_cents: sale.discount_cents,
            discount_kind: sale.discount_kind.map(Into::into),
            voucher_code: sale.voucher_code.clone(),
            plan_credit_cents: sale.plan_credit_cents,
            total_cents: sale.total_cents,
            payments: sale.payments.iter().map(dao::sale::PaymentEntity::from).collect(),
            created: sale.created.ok_or(ServiceError::InternalError)?,
            version: sale.version,
        })
    }
}

#[automock(type Context=();)]
#[async_trait]
pub trait SaleService {
    type Context: Clone + PartialEq + Eq + Debug + Send + Sync + 'static;

    async fn get_all(
        &self,
        context: Authentication<Self::Context>,
    ) -> Result<Arc<[Sale]>, ServiceError>;

    async fn get(
        &self,
        id: Uuid,
        context: Authentication<Self::Context>,
    ) -> Result<Sale, ServiceError>;

    /// Settles a cart: recomputes the totals, re-validates plan coverage
    /// against current usage, checks the payments cover the total, then
    /// persists the sale and applies its side effects (plan debits,
    /// package activation, appointment completion).
    async fn finalize(
        &self,
        cart: &CartState,
        payments: &[Payment],
        context: Authentication<Self::Context>,
    ) -> Result<Sale, ServiceError>;
}
