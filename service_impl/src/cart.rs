use std::sync::Arc;

use async_trait::async_trait;
use service::cart::{apply, summarize, CartAction, CartItem, CartItemKind, CartPhase, CartState};
use service::catalog::OfferingRef;
use service::discount::{AppliedDiscount, DiscountKind, Voucher};
use service::permission::{Authentication, CASHIER_PRIVILEGE};
use service::sale::{Payment, Sale};
use service::ServiceError;
use tokio::sync::RwLock;
use uuid::Uuid;

pub struct CartServiceImpl<
    VoucherDao,
    CatalogService,
    ClientService,
    EmployeeService,
    ClientPackageService,
    SaleService,
    PermissionService,
    UuidService,
> where
    VoucherDao: dao::voucher::VoucherDao + Send + Sync,
    CatalogService:
        service::catalog::CatalogService<Context = PermissionService::Context> + Send + Sync,
    ClientService:
        service::client::ClientService<Context = PermissionService::Context> + Send + Sync,
    EmployeeService:
        service::employee::EmployeeService<Context = PermissionService::Context> + Send + Sync,
    ClientPackageService:
        service::plan::ClientPackageService<Context = PermissionService::Context> + Send + Sync,
    SaleService: service::sale::SaleService<Context = PermissionService::Context> + Send + Sync,
    PermissionService: service::PermissionService + Send + Sync,
    UuidService: service::uuid_service::UuidService + Send + Sync,
{
    voucher_dao: Arc<VoucherDao>,
    catalog_service: Arc<CatalogService>,
    client_service: Arc<ClientService>,
    employee_service: Arc<EmployeeService>,
    client_package_service: Arc<ClientPackageService>,
    sale_service: Arc<SaleService>,
    permission_service: Arc<PermissionService>,
    uuid_service: Arc<UuidService>,
    state: RwLock<CartState>,
}

impl<
        VoucherDao,
        CatalogService,
        ClientService,
        EmployeeService,
        ClientPackageService,
        SaleService,
        PermissionService,
        UuidService,
    >
    CartServiceImpl<
        VoucherDao,
        CatalogService,
        ClientService,
        EmployeeService,
        ClientPackageService,
        SaleService,
        PermissionService,
        UuidService,
    >
where
    VoucherDao: dao::voucher::VoucherDao + Send + Sync,
    CatalogService:
        service::catalog::CatalogService<Context = PermissionService::Context> + Send + Sync,
    ClientService:
        service::client::ClientService<Context = PermissionService::Context> + Send + Sync,
    EmployeeService:
        service::employee::EmployeeService<Context = PermissionService::Context> + Send + Sync,
    ClientPackageService:
        service::plan::ClientPackageService<Context = PermissionService::Context> + Send + Sync,
    SaleService: service::sale::SaleService<Context = PermissionService::Context> + Send + Sync,
    PermissionService: service::PermissionService + Send + Sync,
    UuidService: service::uuid_service::UuidService + Send + Sync,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        voucher_dao: Arc<VoucherDao>,
        catalog_service: Arc<CatalogService>,
        client_service: Arc<ClientService>,
        employee_service: Arc<EmployeeService>,
        client_package_service: Arc<ClientPackageService>,
        sale_service: Arc<SaleService>,
        permission_service: Arc<PermissionService>,
        uuid_service: Arc<UuidService>,
    ) -> Self {
        Self {
            voucher_dao,
            catalog_service,
            client_service,
            employee_service,
            client_package_service,
            sale_service,
            permission_service,
            uuid_service,
            state: RwLock::new(CartState::empty()),
        }
    }

    async fn transition(&self, action: CartAction) -> Result<CartState, ServiceError> {
        let mut state = self.state.write().await;
        let next = apply(&state, action)?;
        *state = next.clone();
        Ok(next)
    }
}

#[async_trait]
impl<
        VoucherDao,
        CatalogService,
        ClientService,
        EmployeeService,
        ClientPackageService,
        SaleService,
        PermissionService,
        UuidService,
    > service::cart::CartService
    for CartServiceImpl<
        VoucherDao,
        CatalogService,
        ClientService,
        EmployeeService,
        ClientPackageService,
        SaleService,
        PermissionService,
        UuidService,
    >
where
    VoucherDao: dao::voucher::VoucherDao + Send + Sync,
    CatalogService:
        service::catalog::CatalogService<Context = PermissionService::Context> + Send + Sync,
    ClientService:
        service::client::ClientService<Context = PermissionService::Context> + Send + Sync,
    EmployeeService:
        service::employee::EmployeeService<Context = PermissionService::Context> + Send + Sync,
    ClientPackageService:
        service::plan::ClientPackageService<Context = PermissionService::Context> + Send + Sync,
    SaleService: service::sale::SaleService<Context = PermissionService::Context> + Send + Sync,
    PermissionService: service::PermissionService + Send + Sync,
    UuidService: service::uuid_service::UuidService + Send + Sync,
{
    type Context = PermissionService::Context;

    async fn current(
        &self,
        context: Authentication<Self::Context>,
    ) -> Result<CartState, ServiceError> {
        self.permission_service
            .check_permission(CASHIER_PRIVILEGE, context)
            .await?;
        Ok(self.state.read().await.clone())
    }

    async fn select_client(
        &self,
        client_id: Uuid,
        context: Authentication<Self::Context>,
    ) -> Result<CartState, ServiceError> {
        self.permission_service
            .check_permission(CASHIER_PRIVILEGE, context)
            .await?;
        if !self
            .client_service
            .exists(client_id, Authentication::Full)
            .await?
        {
            return Err(ServiceError::EntityNotFound(client_id));
        }
        self.transition(CartAction::SelectClient(client_id)).await
    }

    async fn set_operator(
        &self,
        employee_id: Uuid,
        context: Authentication<Self::Context>,
    ) -> Result<CartState, ServiceError> {
        self.permission_service
            .check_permission(CASHIER_PRIVILEGE, context)
            .await?;
        if !self
            .employee_service
            .exists(employee_id, Authentication::Full)
            .await?
        {
            return Err(ServiceError::EntityNotFound(employee_id));
        }
        self.transition(CartAction::SetOperator(employee_id)).await
    }

    async fn add_offering(
        &self,
        offering: OfferingRef,
        employee_id: Option<Uuid>,
        context: Authentication<Self::Context>,
    ) -> Result<CartState, ServiceError> {
        self.permission_service
            .check_permission(CASHIER_PRIVILEGE, context)
            .await?;
        if let Some(employee_id) = employee_id {
            if !self
                .employee_service
                .exists(employee_id, Authentication::Full)
                .await?
            {
                return Err(ServiceError::EntityNotFound(employee_id));
            }
        }
        let resolved = self
            .catalog_service
            .resolve(offering, Authentication::Full)
            .await?;
        let kind = match offering {
            OfferingRef::Service(_) => CartItemKind::Service,
            OfferingRef::Combo(_) => CartItemKind::Combo,
        };
        // Coverage is decided at add time against the credit left after
        // the covered units already in the cart. The finalizer re-checks.
        let covered_by_plan = match offering {
            OfferingRef::Service(service_id) => {
                let state = self.state.read().await;
                match state.client_id {
                    Some(client_id) => {
                        let in_cart = state.covered_units_for(service_id);
                        drop(state);
                        let credit = self
                            .client_package_service
                            .credit_for(client_id, service_id, Authentication::Full)
                            .await?;
                        credit.remaining() > in_cart
                    }
                    None => false,
                }
            }
            OfferingRef::Combo(_) => false,
        };
        let item = CartItem {
            line_id: self.uuid_service.new_uuid("cart-service::add_offering"),
            item_id: resolved.offering.id(),
            name: resolved.name.clone(),
            unit_price_cents: resolved.price_cents,
            quantity: 1,
            kind,
            employee_id,
            covered_by_plan,
        };
        self.transition(CartAction::AddItem(item)).await
    }

    async fn add_product(
        &self,
        product_id: Uuid,
        context: Authentication<Self::Context>,
    ) -> Result<CartState, ServiceError> {
        self.permission_service
            .check_permission(CASHIER_PRIVILEGE, context)
            .await?;
        let product = self
            .catalog_service
            .get_product(product_id, Authentication::Full)
            .await?;
        let item = CartItem {
            line_id: self.uuid_service.new_uuid("cart-service::add_product"),
            item_id: product.id,
            name: product.name.clone(),
            unit_price_cents: product.price_cents,
            quantity: 1,
            kind: CartItemKind::Product,
            employee_id: None,
            covered_by_plan: false,
        };
        self.transition(CartAction::AddItem(item)).await
    }

    async fn add_package(
        &self,
        plan_id: Uuid,
        context: Authentication<Self::Context>,
    ) -> Result<CartState, ServiceError> {
        self.permission_service
            .check_permission(CASHIER_PRIVILEGE, context)
            .await?;
        let plan = self
            .client_package_service
            .get_plan(plan_id, Authentication::Full)
            .await?;
        let item = CartItem {
            line_id: self.uuid_service.new_uuid("cart-service::add_package"),
            item_id: plan.id,
            name: plan.name.clone(),
            unit_price_cents: plan.price_cents,
            quantity: 1,
            kind: CartItemKind::Package,
            employee_id: None,
            covered_by_plan: false,
        };
        self.transition(CartAction::AddItem(item)).await
    }

    async fn set_quantity(
        &self,
        line_id: Uuid,
        quantity: u32,
        context: Authentication<Self::Context>,
    ) -> Result<CartState, ServiceError> {
        self.permission_service
            .check_permission(CASHIER_PRIVILEGE, context)
            .await?;
        self.transition(CartAction::SetQuantity { line_id, quantity })
            .await
    }

    async fn remove_line(
        &self,
        line_id: Uuid,
        context: Authentication<Self::Context>,
    ) -> Result<CartState, ServiceError> {
        self.permission_service
            .check_permission(CASHIER_PRIVILEGE, context)
            .await?;
        self.transition(CartAction::RemoveLine { line_id }).await
    }

    async fn assign_employee(
        &self,
        line_id: Uuid,
        employee_id: Option<Uuid>,
        context: Authentication<Self::Context>,
    ) -> Result<CartState, ServiceError> {
        self.permission_service
            .check_permission(CASHIER_PRIVILEGE, context)
            .await?;
        if let Some(employee_id) = employee_id {
            if !self
                .employee_service
                .exists(employee_id, Authentication::Full)
                .await?
            {
                return Err(ServiceError::EntityNotFound(employee_id));
            }
        }
        self.transition(CartAction::AssignEmployee {
            line_id,
            employee_id,
        })
        .await
    }

    async fn attach_appointment(
        &self,
        appointment_id: Uuid,
        context: Authentication<Self::Context>,
    ) -> Result<CartState, ServiceError> {
        self.permission_service
            .check_permission(CASHIER_PRIVILEGE, context)
            .await?;
        self.transition(CartAction::AttachAppointment(appointment_id))
            .await
    }

    async fn apply_voucher(
        &self,
        code: &str,
        context: Authentication<Self::Context>,
    ) -> Result<CartState, ServiceError> {
        self.permission_service
            .check_permission(CASHIER_PRIVILEGE, context)
            .await?;
        let voucher = self
            .voucher_dao
            .find_by_code(code)
            .await?
            .filter(|voucher| voucher.active && voucher.deleted.is_none())
            .map(|voucher| Voucher::from(&voucher))
            .ok_or_else(|| ServiceError::invalid_value("voucher"))?;
        self.transition(CartAction::SetDiscount(AppliedDiscount::from_voucher(
            &voucher,
        )))
        .await
    }

    async fn manual_discount(
        &self,
        kind: DiscountKind,
        value: i64,
        context: Authentication<Self::Context>,
    ) -> Result<CartState, ServiceError> {
        self.permission_service
            .check_permission(CASHIER_PRIVILEGE, context)
            .await?;
        if value < 0 {
            return Err(ServiceError::invalid_value("discount"));
        }
        if kind == DiscountKind::Percentage && value > 100 {
            return Err(ServiceError::invalid_value("discount"));
        }
        self.transition(CartAction::SetDiscount(AppliedDiscount::manual(kind, value)))
            .await
    }

    async fn clear_discount(
        &self,
        context: Authentication<Self::Context>,
    ) -> Result<CartState, ServiceError> {
        self.permission_service
            .check_permission(CASHIER_PRIVILEGE, context)
            .await?;
        self.transition(CartAction::ClearDiscount).await
    }

    async fn summary(
        &self,
        context: Authentication<Self::Context>,
    ) -> Result<service::cart::CartSummary, ServiceError> {
        self.permission_service
            .check_permission(CASHIER_PRIVILEGE, context)
            .await?;
        Ok(summarize(&self.state.read().await.clone()))
    }

    async fn start_payment(
        &self,
        context: Authentication<Self::Context>,
    ) -> Result<CartState, ServiceError> {
        self.permission_service
            .check_permission(CASHIER_PRIVILEGE, context)
            .await?;
        self.transition(CartAction::StartPayment).await
    }

    async fn checkout(
        &self,
        payments: &[Payment],
        context: Authentication<Self::Context>,
    ) -> Result<Sale, ServiceError> {
        self.permission_service
            .check_permission(CASHIER_PRIVILEGE, context)
            .await?;
        let state = self.state.read().await.clone();
        if state.phase != CartPhase::Paying {
            return Err(ServiceError::modification_not_allowed("phase"));
        }
        let sale = self
            .sale_service
            .finalize(&state, payments, Authentication::Full)
            .await?;
        self.transition(CartAction::Reset).await?;
        Ok(sale)
    }

    async fn abandon(
        &self,
        context: Authentication<Self::Context>,
    ) -> Result<CartState, ServiceError> {
        self.permission_service
            .check_permission(CASHIER_PRIVILEGE, context)
            .await?;
        self.transition(CartAction::Reset).await
    }
}
