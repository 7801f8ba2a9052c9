use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use serde::Serialize;
use uuid::Uuid;

use crate::catalog::OfferingRef;
use crate::discount::{effective_discount, AppliedDiscount, DiscountKind};
use crate::permission::Authentication;
use crate::sale::{Payment, Sale};
use crate::ServiceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CartItemKind {
    Service,
    Combo,
    Product,
    Package,
}
impl From<CartItemKind> for dao::sale::SaleItemKindEntity {
    fn from(kind: CartItemKind) -> Self {
        match kind {
            CartItemKind::Service => Self::Service,
            CartItemKind::Combo => Self::Combo,
            CartItemKind::Product => Self::Product,
            CartItemKind::Package => Self::Package,
        }
    }
}
impl From<dao::sale::SaleItemKindEntity> for CartItemKind {
    fn from(kind: dao::sale::SaleItemKindEntity) -> Self {
        match kind {
            dao::sale::SaleItemKindEntity::Service => Self::Service,
            dao::sale::SaleItemKindEntity::Combo => Self::Combo,
            dao::sale::SaleItemKindEntity::Product => Self::Product,
            dao::sale::SaleItemKindEntity::Package => Self::Package,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItem {
    /// Identity of the cart line, distinct from the catalog id: covered
    /// lines of the same service intentionally stay separate lines.
    pub line_id: Uuid,
    pub item_id: Uuid,
    pub name: Arc<str>,
    pub unit_price_cents: i64,
    pub quantity: u32,
    pub kind: CartItemKind,
    pub employee_id: Option<Uuid>,
    pub covered_by_plan: bool,
}
impl CartItem {
    pub fn line_total_cents(&self) -> i64 {
        self.unit_price_cents * self.quantity as i64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartPhase {
    SelectingItems,
    Paying,
}

/// The sale in progress. Owned by the cart service; mutated exclusively
/// through [`apply`], which never leaves partial state behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartState {
    pub client_id: Option<Uuid>,
    pub operator_id: Option<Uuid>,
    pub appointment_id: Option<Uuid>,
    pub items: Vec<CartItem>,
    pub discount: Option<AppliedDiscount>,
    pub phase: CartPhase,
}
impl CartState {
    pub fn empty() -> Self {
        Self {
            client_id: None,
            operator_id: None,
            appointment_id: None,
            items: Vec::new(),
            discount: None,
            phase: CartPhase::SelectingItems,
        }
    }

    pub fn has_package_item(&self) -> bool {
        self.items
            .iter()
            .any(|item| item.kind == CartItemKind::Package)
    }

    /// Covered units of one service already committed in this cart.
    /// Used to re-check remaining plan credit on every add.
    pub fn covered_units_for(&self, service_id: Uuid) -> u32 {
        self.items
            .iter()
            .filter(|item| item.covered_by_plan && item.item_id == service_id)
            .map(|item| item.quantity)
            .sum()
    }
}
impl Default for CartState {
    fn default() -> Self {
        Self::empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartAction {
    SelectClient(Uuid),
    SetOperator(Uuid),
    AddItem(CartItem),
    SetQuantity { line_id: Uuid, quantity: u32 },
    RemoveLine { line_id: Uuid },
    AssignEmployee { line_id: Uuid, employee_id: Option<Uuid> },
    AttachAppointment(Uuid),
    SetDiscount(AppliedDiscount),
    ClearDiscount,
    StartPayment,
    Reset,
}

fn ensure_composing(state: &CartState) -> Result<(), ServiceError> {
    match state.phase {
        CartPhase::SelectingItems => Ok(()),
        CartPhase::Paying => Err(ServiceError::modification_not_allowed("phase")),
    }
}

fn line_position(state: &CartState, line_id: Uuid) -> Result<usize, ServiceError> {
    state
        .items
        .iter()
        .position(|item| item.line_id == line_id)
        .ok_or(ServiceError::EntityNotFound(line_id))
}

/// The cart transition function. Returns the successor state and leaves
/// the input untouched; on error the caller keeps its current state, so
/// rejected actions never mutate anything.
pub fn apply(state: &CartState, action: CartAction) -> Result<CartState, ServiceError> {
    let mut next = state.clone();
    match action {
        CartAction::SelectClient(client_id) => {
            ensure_composing(state)?;
            next.client_id = Some(client_id);
        }
        CartAction::SetOperator(employee_id) => {
            ensure_composing(state)?;
            next.operator_id = Some(employee_id);
        }
        CartAction::AddItem(item) => {
            ensure_composing(state)?;
            if item.quantity == 0 {
                return Err(ServiceError::invalid_value("quantity"));
            }
            if item.covered_by_plan && item.quantity != 1 {
                return Err(ServiceError::invalid_value("quantity"));
            }
            if item.kind == CartItemKind::Package {
                if item.quantity != 1 {
                    return Err(ServiceError::invalid_value("quantity"));
                }
                if state.client_id.is_none() {
                    return Err(ServiceError::invalid_value("client"));
                }
                if state.has_package_item() {
                    return Err(ServiceError::invalid_value("package"));
                }
            }
            if item.covered_by_plan && state.client_id.is_none() {
                return Err(ServiceError::invalid_value("client"));
            }
            // Plain lines with the same catalog item merge; covered and
            // package lines always stay separate quantity-1 lines.
            let mergeable = !item.covered_by_plan && item.kind != CartItemKind::Package;
            let existing = next.items.iter_mut().find(|line| {
                mergeable
                    && !line.covered_by_plan
                    && line.kind == item.kind
                    && line.item_id == item.item_id
                    && line.employee_id == item.employee_id
            });
            match existing {
                Some(line) => line.quantity += item.quantity,
                None => next.items.push(item),
            }
        }
        CartAction::SetQuantity { line_id, quantity } => {
            ensure_composing(state)?;
            let position = line_position(state, line_id)?;
            let line = &mut next.items[position];
            if line.covered_by_plan || line.kind == CartItemKind::Package {
                return Err(ServiceError::modification_not_allowed("quantity"));
            }
            if quantity == 0 {
                next.items.remove(position);
            } else {
                line.quantity = quantity;
            }
        }
        CartAction::RemoveLine { line_id } => {
            ensure_composing(state)?;
            let position = line_position(state, line_id)?;
            next.items.remove(position);
        }
        CartAction::AssignEmployee {
            line_id,
            employee_id,
        } => {
            ensure_composing(state)?;
            let position = line_position(state, line_id)?;
            let line = &mut next.items[position];
            if !matches!(line.kind, CartItemKind::Service | CartItemKind::Combo) {
                return Err(ServiceError::modification_not_allowed("employee"));
            }
            line.employee_id = employee_id;
        }
        CartAction::AttachAppointment(appointment_id) => {
            ensure_composing(state)?;
            next.appointment_id = Some(appointment_id);
        }
        CartAction::SetDiscount(discount) => {
            ensure_composing(state)?;
            next.discount = Some(discount);
        }
        CartAction::ClearDiscount => {
            ensure_composing(state)?;
            next.discount = None;
        }
        CartAction::StartPayment => {
            ensure_composing(state)?;
            if state.items.is_empty() {
                return Err(ServiceError::invalid_value("cart"));
            }
            next.phase = CartPhase::Paying;
        }
        CartAction::Reset => {
            next = CartState {
                operator_id: state.operator_id,
                ..CartState::empty()
            };
        }
    }
    Ok(next)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CartSummary {
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    pub plan_credit_cents: i64,
    pub total_cents: i64,
}

/// Totals for rendering and finalization. The subtotal counts every line
/// at nominal price; covered lines and the package line are excluded from
/// the discountable base, so the discount can never eat into them.
pub fn summarize(state: &CartState) -> CartSummary {
    let subtotal_cents: i64 = state
        .items
        .iter()
        .map(CartItem::line_total_cents)
        .sum();
    let plan_credit_cents: i64 = state
        .items
        .iter()
        .filter(|item| item.covered_by_plan)
        .map(CartItem::line_total_cents)
        .sum();
    let package_cents: i64 = state
        .items
        .iter()
        .filter(|item| !item.covered_by_plan && item.kind == CartItemKind::Package)
        .map(CartItem::line_total_cents)
        .sum();
    let discountable_cents = subtotal_cents - plan_credit_cents - package_cents;
    let discount_cents = state
        .discount
        .as_ref()
        .map(|discount| effective_discount(discountable_cents, discount.kind, discount.value))
        .unwrap_or(0);
    CartSummary {
        subtotal_cents,
        discount_cents,
        plan_credit_cents,
        total_cents: subtotal_cents - discount_cents - plan_credit_cents,
    }
}

#[automock(type Context=();)]
#[async_trait]
pub trait CartService {
    type Context: Clone + PartialEq + Eq + Debug + Send + Sync + 'static;

    async fn current(
        &self,
        context: Authentication<Self::Context>,
    ) -> Result<CartState, ServiceError>;

    async fn select_client(
        &self,
        client_id: Uuid,
        context: Authentication<Self::Context>,
    ) -> Result<CartState, ServiceError>;

    async fn set_operator(
        &self,
        employee_id: Uuid,
        context: Authentication<Self::Context>,
    ) -> Result<CartState, ServiceError>;

    /// Adds a service or combo line. For services the client's plan
    /// credit decides `covered_by_plan`, counting covered units already
    /// in the cart against the remaining entitlement.
    async fn add_offering(
        &self,
        offering: OfferingRef,
        employee_id: Option<Uuid>,
        context: Authentication<Self::Context>,
    ) -> Result<CartState, ServiceError>;

    async fn add_product(
        &self,
        product_id: Uuid,
        context: Authentication<Self::Context>,
    ) -> Result<CartState, ServiceError>;

    async fn add_package(
        &self,
        plan_id: Uuid,
        context: Authentication<Self::Context>,
    ) -> Result<CartState, ServiceError>;

    async fn set_quantity(
        &self,
        line_id: Uuid,
        quantity: u32,
        context: Authentication<Self::Context>,
    ) -> Result<CartState, ServiceError>;

    async fn remove_line(
        &self,
        line_id: Uuid,
        context: Authentication<Self::Context>,
    ) -> Result<CartState, ServiceError>;

    async fn assign_employee(
        &self,
        line_id: Uuid,
        employee_id: Option<Uuid>,
        context: Authentication<Self::Context>,
    ) -> Result<CartState, ServiceError>;

    async fn attach_appointment(
        &self,
        appointment_id: Uuid,
        context: Authentication<Self::Context>,
    ) -> Result<CartState, ServiceError>;

    /// Case-insensitive voucher lookup; unknown or inactive codes are a
    /// validation failure and leave the cart untouched.
    async fn apply_voucher(
        &self,
        code: &str,
        context: Authentication<Self::Context>,
    ) -> Result<CartState, ServiceError>;

    /// Manual discount entry; replaces any applied voucher.
    async fn manual_discount(
        &self,
        kind: DiscountKind,
        value: i64,
        context: Authentication<Self::Context>,
    ) -> Result<CartState, ServiceError>;

    async fn clear_discount(
        &self,
        context: Authentication<Self::Context>,
    ) -> Result<CartState, ServiceError>;

    async fn summary(
        &self,
        context: Authentication<Self::Context>,
    ) -> Result<CartSummary, ServiceError>;

    async fn start_payment(
        &self,
        context: Authentication<Self::Context>,
    ) -> Result<CartState, ServiceError>;

    /// Finalizes the sale through the sale service and resets the cart.
    /// The only path back to a clean `SelectingItems` state besides
    /// [`CartService::abandon`].
    async fn checkout(
        &self,
        payments: &[Payment],
        context: Authentication<Self::Context>,
    ) -> Result<Sale, ServiceError>;

    /// Drops the composition with no side effects.
    async fn abandon(
        &self,
        context: Authentication<Self::Context>,
    ) -> Result<CartState, ServiceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service_item(item_id: Uuid, price: i64) -> CartItem {
        CartItem {
            line_id: Uuid::new_v4(),
            item_id,
            name: "Corte".into(),
            unit_price_cents: price,
            quantity: 1,
            kind: CartItemKind::Service,
            employee_id: None,
            covered_by_plan: false,
        }
    }

    fn package_item(plan_id: Uuid, price: i64) -> CartItem {
        CartItem {
            line_id: Uuid::new_v4(),
            item_id: plan_id,
            name: "Plano mensal".into(),
            unit_price_cents: price,
            quantity: 1,
            kind: CartItemKind::Package,
            employee_id: None,
            covered_by_plan: false,
        }
    }

    fn state_with_client() -> CartState {
        apply(&CartState::empty(), CartAction::SelectClient(Uuid::new_v4())).unwrap()
    }

    #[test]
    fn test_add_merges_same_service_line() {
        let item_id = Uuid::new_v4();
        let state = state_with_client();
        let state = apply(&state, CartAction::AddItem(service_item(item_id, 5_000))).unwrap();
        let state = apply(&state, CartAction::AddItem(service_item(item_id, 5_000))).unwrap();
        assert_eq!(state.items.len(), 1);
        assert_eq!(state.items[0].quantity, 2);
    }

    #[test]
    fn test_covered_lines_never_merge() {
        let item_id = Uuid::new_v4();
        let state = state_with_client();
        let mut covered = service_item(item_id, 5_000);
        covered.covered_by_plan = true;
        let state = apply(&state, CartAction::AddItem(covered.clone())).unwrap();
        covered.line_id = Uuid::new_v4();
        let state = apply(&state, CartAction::AddItem(covered)).unwrap();
        assert_eq!(state.items.len(), 2);
        assert!(state.items.iter().all(|item| item.quantity == 1));
    }

    #[test]
    fn test_second_package_is_rejected() {
        let state = state_with_client();
        let state = apply(&state, CartAction::AddItem(package_item(Uuid::new_v4(), 9_900)))
            .unwrap();
        let result = apply(&state, CartAction::AddItem(package_item(Uuid::new_v4(), 9_900)));
        assert!(result.is_err());
        assert_eq!(state.items.len(), 1);
    }

    #[test]
    fn test_package_requires_client() {
        let result = apply(
            &CartState::empty(),
            CartAction::AddItem(package_item(Uuid::new_v4(), 9_900)),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_quantity_removes_line() {
        let state = state_with_client();
        let state = apply(&state, CartAction::AddItem(service_item(Uuid::new_v4(), 5_000)))
            .unwrap();
        let line_id = state.items[0].line_id;
        let state = apply(
            &state,
            CartAction::SetQuantity {
                line_id,
                quantity: 0,
            },
        )
        .unwrap();
        assert!(state.items.is_empty());
    }

    #[test]
    fn test_start_payment_rejects_empty_cart() {
        let result = apply(&CartState::empty(), CartAction::StartPayment);
        assert!(result.is_err());
    }

    #[test]
    fn test_no_composition_while_paying() {
        let state = state_with_client();
        let state = apply(&state, CartAction::AddItem(service_item(Uuid::new_v4(), 5_000)))
            .unwrap();
        let state = apply(&state, CartAction::StartPayment).unwrap();
        assert_eq!(state.phase, CartPhase::Paying);
        let result = apply(&state, CartAction::AddItem(service_item(Uuid::new_v4(), 1_000)));
        assert!(result.is_err());
    }

    #[test]
    fn test_reset_keeps_operator() {
        let operator = Uuid::new_v4();
        let state = apply(&CartState::empty(), CartAction::SetOperator(operator)).unwrap();
        let state = apply(&state, CartAction::SelectClient(Uuid::new_v4())).unwrap();
        let state = apply(&state, CartAction::Reset).unwrap();
        assert_eq!(state.operator_id, Some(operator));
        assert_eq!(state.client_id, None);
        assert_eq!(state.phase, CartPhase::SelectingItems);
    }

    #[test]
    fn test_summary_excludes_covered_and_package_from_discountable() {
        let state = state_with_client();
        let state = apply(&state, CartAction::AddItem(service_item(Uuid::new_v4(), 10_000)))
            .unwrap();
        let mut covered = service_item(Uuid::new_v4(), 4_000);
        covered.covered_by_plan = true;
        let state = apply(&state, CartAction::AddItem(covered)).unwrap();
        let state = apply(&state, CartAction::AddItem(package_item(Uuid::new_v4(), 9_900)))
            .unwrap();
        let state = apply(
            &state,
            CartAction::SetDiscount(AppliedDiscount::manual(DiscountKind::Percentage, 50)),
        )
        .unwrap();

        let summary = summarize(&state);
        assert_eq!(summary.subtotal_cents, 23_900);
        assert_eq!(summary.plan_credit_cents, 4_000);
        // 50% of the discountable 10 000, not of the full subtotal.
        assert_eq!(summary.discount_cents, 5_000);
        assert_eq!(summary.total_cents, 23_900 - 5_000 - 4_000);
    }

    #[test]
    fn test_summary_round_trip_invariant() {
        let state = state_with_client();
        let state = apply(&state, CartAction::AddItem(service_item(Uuid::new_v4(), 20_000)))
            .unwrap();
        let state = apply(
            &state,
            CartAction::SetDiscount(AppliedDiscount::manual(DiscountKind::Percentage, 10)),
        )
        .unwrap();
        let summary = summarize(&state);
        assert_eq!(summary.discount_cents, 2_000);
        assert_eq!(
            summary.total_cents,
            summary.subtotal_cents - summary.discount_cents - summary.plan_credit_cents
        );
        assert_eq!(summary.total_cents, 18_000);
    }
}
