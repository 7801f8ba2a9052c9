use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use service::cart::{summarize, CartItem, CartItemKind, CartState};
use service::permission::{Authentication, CASHIER_PRIVILEGE};
use service::sale::{Payment, Sale, SaleItem};
use service::ServiceError;
use uuid::Uuid;

const SALE_SERVICE_PROCESS: &str = "sale-service";

pub struct SaleServiceImpl<
    SaleDao,
    ClientPackageService,
    AppointmentService,
    PermissionService,
    ClockService,
    UuidService,
> where
    SaleDao: dao::sale::SaleDao + Send + Sync,
    ClientPackageService:
        service::plan::ClientPackageService<Context = PermissionService::Context> + Send + Sync,
    AppointmentService:
        service::appointment::AppointmentService<Context = PermissionService::Context>
            + Send
            + Sync,
    PermissionService: service::PermissionService + Send + Sync,
    ClockService: service::clock::ClockService + Send + Sync,
    UuidService: service::uuid_service::UuidService + Send + Sync,
{
    sale_dao: Arc<SaleDao>,
    client_package_service: Arc<ClientPackageService>,
    appointment_service: Arc<AppointmentService>,
    permission_service: Arc<PermissionService>,
    clock_service: Arc<ClockService>,
    uuid_service: Arc<UuidService>,
}

impl<SaleDao, ClientPackageService, AppointmentService, PermissionService, ClockService, UuidService>
    SaleServiceImpl<
        SaleDao,
        ClientPackageService,
        AppointmentService,
        PermissionService,
        ClockService,
        UuidService,
    >
where
    SaleDao: dao::sale::SaleDao + Send + Sync,
    ClientPackageService:
        service::plan::ClientPackageService<Context = PermissionService::Context> + Send + Sync,
    AppointmentService:
        service::appointment::AppointmentService<Context = PermissionService::Context>
            + Send
            + Sync,
    PermissionService: service::PermissionService + Send + Sync,
    ClockService: service::clock::ClockService + Send + Sync,
    UuidService: service::uuid_service::UuidService + Send + Sync,
{
    pub fn new(
        sale_dao: Arc<SaleDao>,
        client_package_service: Arc<ClientPackageService>,
        appointment_service: Arc<AppointmentService>,
        permission_service: Arc<PermissionService>,
        clock_service: Arc<ClockService>,
        uuid_service: Arc<UuidService>,
    ) -> Self {
        Self {
            sale_dao,
            client_package_service,
            appointment_service,
            permission_service,
            clock_service,
            uuid_service,
        }
    }

    /// Re-checks plan coverage against current usage right before the
    /// write. A line whose credit evaporated since it was added is billed
    /// at full price instead of failing the whole sale.
    async fn settle_coverage(&self, cart: &CartState) -> Result<Vec<CartItem>, ServiceError> {
        let Some(client_id) = cart.client_id else {
            return Ok(cart
                .items
                .iter()
                .cloned()
                .map(|mut item| {
                    item.covered_by_plan = false;
                    item
                })
                .collect());
        };
        let mut remaining: HashMap<Uuid, u32> = HashMap::new();
        for item in cart.items.iter().filter(|item| item.covered_by_plan) {
            if !remaining.contains_key(&item.item_id) {
                let credit = self
                    .client_package_service
                    .credit_for(client_id, item.item_id, Authentication::Full)
                    .await?;
                remaining.insert(item.item_id, credit.remaining());
            }
        }
        Ok(cart
            .items
            .iter()
            .cloned()
            .map(|mut item| {
                if item.covered_by_plan {
                    let left = remaining.entry(item.item_id).or_insert(0);
                    if *left >= item.quantity {
                        *left -= item.quantity;
                    } else {
                        item.covered_by_plan = false;
                    }
                }
                item
            })
            .collect())
    }
}

#[async_trait]
impl<SaleDao, ClientPackageService, AppointmentService, PermissionService, ClockService, UuidService>
    service::sale::SaleService
    for SaleServiceImpl<
        SaleDao,
        ClientPackageService,
        AppointmentService,
        PermissionService,
        ClockService,
        UuidService,
    >
where
    SaleDao: dao::sale::SaleDao + Send + Sync,
    ClientPackageService:
        service::plan::ClientPackageService<Context = PermissionService::Context> + Send + Sync,
    AppointmentService:
        service::appointment::AppointmentService<Context = PermissionService::Context>
            + Send
            + Sync,
    PermissionService: service::PermissionService + Send + Sync,
    ClockService: service::clock::ClockService + Send + Sync,
    UuidService: service::uuid_service::UuidService + Send + Sync,
{
    type Context = PermissionService::Context;

    async fn get_all(
        &self,
        context: Authentication<Self::Context>,
    ) -> Result<Arc<[Sale]>, ServiceError> {
        self.permission_service
            .check_permission(CASHIER_PRIVILEGE, context)
            .await?;
        Ok(self
            .sale_dao
            .all()
            .await?
            .iter()
            .map(Sale::from)
            .collect())
    }

    async fn get(
        &self,
        id: Uuid,
        context: Authentication<Self::Context>,
    ) -> Result<Sale, ServiceError> {
        self.permission_service
            .check_permission(CASHIER_PRIVILEGE, context)
            .await?;
        let entity = self
            .sale_dao
            .find_by_id(id)
            .await?
            .ok_or(ServiceError::EntityNotFound(id))?;
        Ok(Sale::from(&entity))
    }

    async fn finalize(
        &self,
        cart: &CartState,
        payments: &[Payment],
        context: Authentication<Self::Context>,
    ) -> Result<Sale, ServiceError> {
        self.permission_service
            .check_permission(CASHIER_PRIVILEGE, context)
            .await?;
        let operator_id = cart
            .operator_id
            .ok_or_else(|| ServiceError::invalid_value("operator"))?;
        if cart.items.is_empty() {
            return Err(ServiceError::invalid_value("cart"));
        }
        if payments.iter().any(|payment| payment.amount_cents <= 0) {
            return Err(ServiceError::invalid_value("payment"));
        }

        let items = self.settle_coverage(cart).await?;
        let settled = CartState {
            items: items.clone(),
            ..cart.clone()
        };
        let summary = summarize(&settled);
        let paid: i64 = payments.iter().map(|payment| payment.amount_cents).sum();
        if paid < summary.total_cents {
            return Err(ServiceError::invalid_value("payments"));
        }

        // Side effects go first so a failing debit or activation never
        // leaves a persisted sale behind. Package activation precedes the
        // usage debits: a fresh package starts with zero usage, so debits
        // in the same sale land on its counters instead of being wiped by
        // the activation's usage reset.
        if let Some(client_id) = settled.client_id {
            for item in items
                .iter()
                .filter(|item| item.kind == CartItemKind::Package)
            {
                self.client_package_service
                    .activate(client_id, item.item_id, false, Authentication::Full)
                    .await?;
            }
            for item in items.iter().filter(|item| item.covered_by_plan) {
                self.client_package_service
                    .debit(client_id, item.item_id, item.quantity, Authentication::Full)
                    .await?;
            }
        }
        if let Some(appointment_id) = settled.appointment_id {
            self.appointment_service
                .complete(appointment_id, Authentication::Full)
                .await?;
        }

        let sale_items: Vec<SaleItem> = items.iter().map(SaleItem::from).collect();
        let entity = dao::sale::SaleEntity {
            id: self.uuid_service.new_uuid("sale-service::finalize id"),
            client_id: settled.client_id,
            operator_id,
            appointment_id: settled.appointment_id,
            items: sale_items
                .iter()
                .map(dao::sale::SaleItemEntity::from)
                .collect(),
            subtotal_cents: summary.subtotal_cents,
            discount_cents: summary.discount_cents,
            discount_kind: settled
                .discount
                .as_ref()
                .map(|discount| discount.kind.into()),
            voucher_code: settled
                .discount
                .as_ref()
                .and_then(|discount| discount.voucher_code.clone()),
            plan_credit_cents: summary.plan_credit_cents,
            total_cents: summary.total_cents,
            payments: payments.iter().map(dao::sale::PaymentEntity::from).collect(),
            created: self.clock_service.date_time_now(),
            version: self.uuid_service.new_uuid("sale-service::finalize version"),
        };
        self.sale_dao.create(&entity, SALE_SERVICE_PROCESS).await?;
        tracing::info!(id = %entity.id, total = entity.total_cents, "sale finalized");
        Ok(Sale::from(&entity))
    }
}
