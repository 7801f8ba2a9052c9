use std::sync::Arc;

use async_trait::async_trait;
use service::permission::{Authentication, CASHIER_PRIVILEGE};
use service::plan::{ClientPackage, Plan, PlanCredit, PlanUsage};
use service::ServiceError;
use time::Duration;
use uuid::Uuid;

const CLIENT_PACKAGE_SERVICE_PROCESS: &str = "client-package-service";

pub struct ClientPackageServiceImpl<
    PlanDao,
    ClientPackageDao,
    ClientService,
    PermissionService,
    ClockService,
    UuidService,
> where
    PlanDao: dao::plan::PlanDao + Send + Sync,
    ClientPackageDao: dao::client_package::ClientPackageDao + Send + Sync,
    ClientService:
        service::client::ClientService<Context = PermissionService::Context> + Send + Sync,
    PermissionService: service::PermissionService + Send + Sync,
    ClockService: service::clock::ClockService + Send + Sync,
    UuidService: service::uuid_service::UuidService + Send + Sync,
{
    plan_dao: Arc<PlanDao>,
    client_package_dao: Arc<ClientPackageDao>,
    client_service: Arc<ClientService>,
    permission_service: Arc<PermissionService>,
    clock_service: Arc<ClockService>,
    uuid_service: Arc<UuidService>,
}

impl<PlanDao, ClientPackageDao, ClientService, PermissionService, ClockService, UuidService>
    ClientPackageServiceImpl<
        PlanDao,
        ClientPackageDao,
        ClientService,
        PermissionService,
        ClockService,
        UuidService,
    >
where
    PlanDao: dao::plan::PlanDao + Send + Sync,
    ClientPackageDao: dao::client_package::ClientPackageDao + Send + Sync,
    ClientService:
        service::client::ClientService<Context = PermissionService::Context> + Send + Sync,
    PermissionService: service::PermissionService + Send + Sync,
    ClockService: service::clock::ClockService + Send + Sync,
    UuidService: service::uuid_service::UuidService + Send + Sync,
{
    pub fn new(
        plan_dao: Arc<PlanDao>,
        client_package_dao: Arc<ClientPackageDao>,
        client_service: Arc<ClientService>,
        permission_service: Arc<PermissionService>,
        clock_service: Arc<ClockService>,
        uuid_service: Arc<UuidService>,
    ) -> Self {
        Self {
            plan_dao,
            client_package_dao,
            client_service,
            permission_service,
            clock_service,
            uuid_service,
        }
    }
}

#[async_trait]
impl<PlanDao, ClientPackageDao, ClientService, PermissionService, ClockService, UuidService>
    service::plan::ClientPackageService
    for ClientPackageServiceImpl<
        PlanDao,
        ClientPackageDao,
        ClientService,
        PermissionService,
        ClockService,
        UuidService,
    >
where
    PlanDao: dao::plan::PlanDao + Send + Sync,
    ClientPackageDao: dao::client_package::ClientPackageDao + Send + Sync,
    ClientService:
        service::client::ClientService<Context = PermissionService::Context> + Send + Sync,
    PermissionService: service::PermissionService + Send + Sync,
    ClockService: service::clock::ClockService + Send + Sync,
    UuidService: service::uuid_service::UuidService + Send + Sync,
{
    type Context = PermissionService::Context;

    async fn get_plans(
        &self,
        _context: Authentication<Self::Context>,
    ) -> Result<Arc<[Plan]>, ServiceError> {
        Ok(self
            .plan_dao
            .all()
            .await?
            .iter()
            .filter(|plan| plan.deleted.is_none())
            .map(Plan::from)
            .collect())
    }

    async fn get_plan(
        &self,
        id: Uuid,
        _context: Authentication<Self::Context>,
    ) -> Result<Plan, ServiceError> {
        let entity = self
            .plan_dao
            .find_by_id(id)
            .await?
            .ok_or(ServiceError::EntityNotFound(id))?;
        if entity.deleted.is_some() {
            return Err(ServiceError::EntityNotFound(id));
        }
        Ok(Plan::from(&entity))
    }

    async fn active_package(
        &self,
        client_id: Uuid,
        _context: Authentication<Self::Context>,
    ) -> Result<Option<ClientPackage>, ServiceError> {
        Ok(self
            .client_package_dao
            .find_by_client(client_id)
            .await?
            .iter()
            .filter(|package| package.deleted.is_none())
            .map(ClientPackage::from)
            .find(|package| package.status.grants_credit()))
    }

    async fn usage_for(
        &self,
        client_id: Uuid,
        _context: Authentication<Self::Context>,
    ) -> Result<Arc<[PlanUsage]>, ServiceError> {
        Ok(self
            .client_package_dao
            .usage_for_client(client_id)
            .await?
            .iter()
            .map(PlanUsage::from)
            .collect())
    }

    async fn credit_for(
        &self,
        client_id: Uuid,
        service_id: Uuid,
        context: Authentication<Self::Context>,
    ) -> Result<PlanCredit, ServiceError> {
        let Some(package) = self.active_package(client_id, context.clone()).await? else {
            return Ok(PlanCredit::none());
        };
        let plan = self.get_plan(package.plan_id, context).await?;
        let entitlement = plan.entitlement_for(service_id);
        if entitlement == 0 {
            return Ok(PlanCredit::none());
        }
        let used = self
            .client_package_dao
            .usage_for_client(client_id)
            .await?
            .iter()
            .find(|usage| usage.service_id == service_id)
            .map(|usage| usage.used)
            .unwrap_or(0);
        Ok(PlanCredit { entitlement, used })
    }

    async fn activate(
        &self,
        client_id: Uuid,
        plan_id: Uuid,
        recurring: bool,
        context: Authentication<Self::Context>,
    ) -> Result<ClientPackage, ServiceError> {
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
        let plan = self.get_plan(plan_id, Authentication::Full).await?;

        // A client holds at most one credit-granting package. Activation
        // supersedes whatever was active and starts usage from zero.
        let existing = self.client_package_dao.find_by_client(client_id).await?;
        for package in existing.iter() {
            if package.deleted.is_none()
                && matches!(
                    package.status,
                    dao::client_package::PackageStatusEntity::Active
                        | dao::client_package::PackageStatusEntity::Overdue
                        | dao::client_package::PackageStatusEntity::Pending
                )
            {
                let mut superseded = package.clone();
                superseded.status = dao::client_package::PackageStatusEntity::Cancelled;
                superseded.version = self
                    .uuid_service
                    .new_uuid("client-package-service::activate supersede");
                self.client_package_dao
                    .update(&superseded, CLIENT_PACKAGE_SERVICE_PROCESS)
                    .await?;
            }
        }
        self.client_package_dao
            .clear_usage(client_id, CLIENT_PACKAGE_SERVICE_PROCESS)
            .await?;

        let activated_on = self.clock_service.date_now();
        let expires_on = activated_on + Duration::days(plan.validity_days as i64);
        let entity = dao::client_package::ClientPackageEntity {
            id: self
                .uuid_service
                .new_uuid("client-package-service::activate id"),
            client_id,
            plan_id,
            status: dao::client_package::PackageStatusEntity::Active,
            activated_on,
            expires_on,
            renews_on: recurring.then_some(expires_on),
            recurring,
            created: self.clock_service.date_time_now(),
            deleted: None,
            version: self
                .uuid_service
                .new_uuid("client-package-service::activate version"),
        };
        self.client_package_dao
            .create(&entity, CLIENT_PACKAGE_SERVICE_PROCESS)
            .await?;
        Ok(ClientPackage::from(&entity))
    }

    async fn debit(
        &self,
        client_id: Uuid,
        service_id: Uuid,
        quantity: u32,
        context: Authentication<Self::Context>,
    ) -> Result<(), ServiceError> {
        self.permission_service
            .check_permission(CASHIER_PRIVILEGE, context)
            .await?;
        let credit = self
            .credit_for(client_id, service_id, Authentication::Full)
            .await?;
        if credit.remaining() < quantity {
            return Err(ServiceError::invalid_value("plan_credit"));
        }
        let usage = dao::client_package::PlanUsageEntity {
            client_id,
            service_id,
            used: credit.used + quantity,
        };
        self.client_package_dao
            .set_usage(&usage, CLIENT_PACKAGE_SERVICE_PROCESS)
            .await?;
        Ok(())
    }
}
