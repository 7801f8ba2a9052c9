use std::sync::Arc;

use serde::Serialize;
use time::PrimitiveDateTime;
use trimly_utils::derive_from_reference;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountKind {
    Value,
    Percentage,
}
impl From<dao::voucher::DiscountKindEntity> for DiscountKind {
    fn from(kind: dao::voucher::DiscountKindEntity) -> Self {
        match kind {
            dao::voucher::DiscountKindEntity::Value => Self::Value,
            dao::voucher::DiscountKindEntity::Percentage => Self::Percentage,
        }
    }
}
impl From<DiscountKind> for dao::voucher::DiscountKindEntity {
    fn from(kind: DiscountKind) -> Self {
        match kind {
            DiscountKind::Value => Self::Value,
            DiscountKind::Percentage => Self::Percentage,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voucher {
    pub id: Uuid,
    pub code: Arc<str>,
    pub kind: DiscountKind,
    pub amount: i64,
    pub active: bool,
    pub deleted: Option<PrimitiveDateTime>,
    pub version: Uuid,
}
impl From<&dao::voucher::VoucherEntity> for Voucher {
    fn from(voucher: &dao::voucher::VoucherEntity) -> Self {
        Self {
            id: voucher.id,
            code: voucher.code.clone(),
            kind: voucher.kind.into(),
            amount: voucher.amount,
            active: voucher.active,
            deleted: voucher.deleted,
            version: voucher.version,
        }
    }
}
derive_from_reference!(dao::voucher::VoucherEntity, Voucher);

/// The discount currently applied to a cart. Voucher and manual entry are
/// mutually exclusive; setting either replaces the whole value, so
/// `voucher_code` is `None` exactly for manual discounts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedDiscount {
    pub kind: DiscountKind,
    /// Cents for `Value`, whole percent for `Percentage`.
    pub value: i64,
    pub voucher_code: Option<Arc<str>>,
}
impl AppliedDiscount {
    pub fn from_voucher(voucher: &Voucher) -> Self {
        Self {
            kind: voucher.kind,
            value: voucher.amount,
            voucher_code: Some(voucher.code.clone()),
        }
    }

    pub fn manual(kind: DiscountKind, value: i64) -> Self {
        Self {
            kind,
            value,
            voucher_code: None,
        }
    }
}

/// Effective discount in cents against the discountable subtotal,
/// saturated into `[0, discountable]`. Percentage discounts round down to
/// the whole cent.
pub fn effective_discount(discountable_cents: i64, kind: DiscountKind, value: i64) -> i64 {
    let raw = match kind {
        DiscountKind::Value => value,
        DiscountKind::Percentage => discountable_cents * value / 100,
    };
    raw.clamp(0, discountable_cents.max(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage_discount() {
        assert_eq!(effective_discount(20_000, DiscountKind::Percentage, 10), 2_000);
    }

    #[test]
    fn test_percentage_rounds_down() {
        assert_eq!(effective_discount(999, DiscountKind::Percentage, 10), 99);
    }

    #[test]
    fn test_value_discount() {
        assert_eq!(effective_discount(20_000, DiscountKind::Value, 1_500), 1_500);
    }

    #[test]
    fn test_discount_saturates_at_subtotal() {
        assert_eq!(effective_discount(1_000, DiscountKind::Value, 5_000), 1_000);
        assert_eq!(effective_discount(1_000, DiscountKind::Percentage, 250), 1_000);
    }

    #[test]
    fn test_discount_never_negative() {
        assert_eq!(effective_discount(1_000, DiscountKind::Value, -500), 0);
        assert_eq!(effective_discount(0, DiscountKind::Percentage, 10), 0);
    }
}
