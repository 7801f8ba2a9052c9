use std::sync::Arc;

use dao::client_package::MockClientPackageDao;
use dao::plan::MockPlanDao;
use mockall::predicate::eq;
use service::client::MockClientService;
use service::clock::MockClockService;
use service::plan::{ClientPackageService, PackageStatus};
use service::uuid_service::MockUuidService;
use service::MockPermissionService;
use time::macros::{date, datetime};
use uuid::{uuid, Uuid};

use crate::plan::ClientPackageServiceImpl;
use crate::test::error_test::*;

pub fn default_client_id() -> Uuid {
    uuid!("0F41DA72-CB87-4B5D-9C2F-6FD5D0A5B90D")
}
pub fn default_plan_id() -> Uuid {
    uuid!("3D9E0F7C-94A1-4AF1-86E6-7C2D3CBAE1F0")
}
pub fn default_service_id() -> Uuid {
    uuid!("52C8CE02-DB4B-4B85-9A3C-1C3ADBE9A71B")
}
pub fn default_package_id() -> Uuid {
    uuid!("76E6D3F5-ACF8-4F50-96C6-B0F4FBDB7E6B")
}
pub fn default_version() -> Uuid {
    uuid!("0C11DBA5-7E88-4C6B-8A17-3E5B1D3C6A42")
}

pub fn generate_default_plan_entity() -> dao::plan::PlanEntity {
    dao::plan::PlanEntity {
        id: default_plan_id(),
        name: "Plano mensal".into(),
        price_cents: 9_900,
        validity_days: 30,
        entitlements: Arc::new([dao::plan::PlanEntitlementEntity {
            service_id: default_service_id(),
            quantity: 4,
        }]),
        deleted: None,
        version: default_version(),
    }
}

pub fn generate_active_package_entity() -> dao::client_package::ClientPackageEntity {
    dao::client_package::ClientPackageEntity {
        id: default_package_id(),
        client_id: default_client_id(),
        plan_id: default_plan_id(),
        status: dao::client_package::PackageStatusEntity::Active,
        activated_on: date!(2024 - 06 - 15),
        expires_on: date!(2024 - 07 - 15),
        renews_on: None,
        recurring: false,
        created: datetime!(2024-06-15 10:00),
        deleted: None,
        version: default_version(),
    }
}

pub struct ClientPackageServiceDependencies {
    pub plan_dao: MockPlanDao,
    pub client_package_dao: MockClientPackageDao,
    pub client_service: MockClientService,
    pub permission_service: MockPermissionService,
    pub clock_service: MockClockService,
    pub uuid_service: MockUuidService,
}
impl ClientPackageServiceDependencies {
    pub fn build_service(
        self,
    ) -> ClientPackageServiceImpl<
        MockPlanDao,
        MockClientPackageDao,
        MockClientService,
        MockPermissionService,
        MockClockService,
        MockUuidService,
    > {
        ClientPackageServiceImpl::new(
            self.plan_dao.into(),
            self.client_package_dao.into(),
            self.client_service.into(),
            self.permission_service.into(),
            self.clock_service.into(),
            self.uuid_service.into(),
        )
    }
}

pub fn build_dependencies(permission: bool) -> ClientPackageServiceDependencies {
    let mut permission_service = MockPermissionService::new();
    permission_service
        .expect_check_permission()
        .with(eq("cashier"), eq(().auth()))
        .returning(move |_, _| {
            if permission {
                Ok(())
            } else {
                Err(service::ServiceError::Forbidden)
            }
        });
    let mut clock_service = MockClockService::new();
    clock_service
        .expect_date_now()
        .returning(|| date!(2024 - 07 - 01));
    clock_service
        .expect_date_time_now()
        .returning(generate_default_datetime);
    let mut client_service = MockClientService::new();
    client_service.expect_exists().returning(|_, _| Ok(true));
    let mut uuid_service = MockUuidService::new();
    uuid_service
        .expect_new_uuid()
        .returning(|_| Uuid::new_v4());
    let mut plan_dao = MockPlanDao::new();
    plan_dao
        .expect_find_by_id()
        .with(eq(default_plan_id()))
        .returning(|_| Ok(Some(generate_default_plan_entity())));
    ClientPackageServiceDependencies {
        plan_dao,
        client_package_dao: MockClientPackageDao::new(),
        client_service,
        permission_service,
        clock_service,
        uuid_service,
    }
}

#[tokio::test]
async fn test_credit_for_counts_remaining_units() {
    let mut dependencies = build_dependencies(true);
    dependencies
        .client_package_dao
        .expect_find_by_client()
        .returning(|_| Ok(Arc::new([generate_active_package_entity()])));
    dependencies
        .client_package_dao
        .expect_usage_for_client()
        .returning(|_| {
            Ok(Arc::new([dao::client_package::PlanUsageEntity {
                client_id: default_client_id(),
                service_id: default_service_id(),
                used: 3,
            }]))
        });
    let package_service = dependencies.build_service();

    let credit = package_service
        .credit_for(default_client_id(), default_service_id(), ().auth())
        .await
        .unwrap();
    assert_eq!(credit.entitlement, 4);
    assert_eq!(credit.used, 3);
    assert_eq!(credit.remaining(), 1);
    assert!(credit.has_credit());
}

#[tokio::test]
async fn test_credit_for_without_package_is_zero() {
    let mut dependencies = build_dependencies(true);
    dependencies
        .client_package_dao
        .expect_find_by_client()
        .returning(|_| Ok(Arc::new([])));
    let package_service = dependencies.build_service();

    let credit = package_service
        .credit_for(default_client_id(), default_service_id(), ().auth())
        .await
        .unwrap();
    assert!(!credit.has_credit());
}

#[tokio::test]
async fn test_overdue_package_still_grants_credit() {
    let mut dependencies = build_dependencies(true);
    dependencies
        .client_package_dao
        .expect_find_by_client()
        .returning(|_| {
            Ok(Arc::new([dao::client_package::ClientPackageEntity {
                status: dao::client_package::PackageStatusEntity::Overdue,
                ..generate_active_package_entity()
            }]))
        });
    dependencies
        .client_package_dao
        .expect_usage_for_client()
        .returning(|_| Ok(Arc::new([])));
    let package_service = dependencies.build_service();

    let credit = package_service
        .credit_for(default_client_id(), default_service_id(), ().auth())
        .await
        .unwrap();
    assert_eq!(credit.remaining(), 4);
}

#[tokio::test]
async fn test_activate_supersedes_and_resets_usage() {
    let mut dependencies = build_dependencies(true);
    dependencies
        .client_package_dao
        .expect_find_by_client()
        .returning(|_| Ok(Arc::new([generate_active_package_entity()])));
    dependencies
        .client_package_dao
        .expect_update()
        .times(1)
        .withf(|entity, _| {
            entity.id == default_package_id()
                && entity.status == dao::client_package::PackageStatusEntity::Cancelled
        })
        .returning(|_, _| Ok(()));
    dependencies
        .client_package_dao
        .expect_clear_usage()
        .times(1)
        .with(eq(default_client_id()), eq("client-package-service"))
        .returning(|_, _| Ok(()));
    dependencies
        .client_package_dao
        .expect_create()
        .times(1)
        .withf(|entity, _| {
            entity.status == dao::client_package::PackageStatusEntity::Active
                && entity.activated_on == date!(2024 - 07 - 01)
                && entity.expires_on == date!(2024 - 07 - 31)
        })
        .returning(|_, _| Ok(()));
    let package_service = dependencies.build_service();

    let package = package_service
        .activate(default_client_id(), default_plan_id(), false, ().auth())
        .await
        .unwrap();
    assert_eq!(package.status, PackageStatus::Active);
    assert_eq!(package.expires_on, date!(2024 - 07 - 31));
    assert_eq!(package.renews_on, None);
}

#[tokio::test]
async fn test_debit_beyond_remaining_credit_fails() {
    let mut dependencies = build_dependencies(true);
    dependencies
        .client_package_dao
        .expect_find_by_client()
        .returning(|_| Ok(Arc::new([generate_active_package_entity()])));
    dependencies
        .client_package_dao
        .expect_usage_for_client()
        .returning(|_| {
            Ok(Arc::new([dao::client_package::PlanUsageEntity {
                client_id: default_client_id(),
                service_id: default_service_id(),
                used: 4,
            }]))
        });
    let package_service = dependencies.build_service();

    let result = package_service
        .debit(default_client_id(), default_service_id(), 1, ().auth())
        .await;
    test_validation_error(
        &result,
        &service::ValidationFailureItem::InvalidValue("plan_credit".into()),
        1,
    );
}

#[tokio::test]
async fn test_debit_updates_usage() {
    let mut dependencies = build_dependencies(true);
    dependencies
        .client_package_dao
        .expect_find_by_client()
        .returning(|_| Ok(Arc::new([generate_active_package_entity()])));
    dependencies
        .client_package_dao
        .expect_usage_for_client()
        .returning(|_| Ok(Arc::new([])));
    dependencies
        .client_package_dao
        .expect_set_usage()
        .times(1)
        .withf(|usage, _| usage.service_id == default_service_id() && usage.used == 1)
        .returning(|_, _| Ok(()));
    let package_service = dependencies.build_service();

    package_service
        .debit(default_client_id(), default_service_id(), 1, ().auth())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_activate_no_permission() {
    let dependencies = build_dependencies(false);
    let package_service = dependencies.build_service();
    let result = package_service
        .activate(default_client_id(), default_plan_id(), false, ().auth())
        .await;
    test_forbidden(&result);
}
