use std::sync::Arc;

use dao::appointment::MockAppointmentDao;
use mockall::predicate::eq;
use service::appointment::{AppointmentService, BookingOutcome, BookingRequest};
use service::availability::{BlockReason, EmployeeChoice, MockAvailabilityService, Slot};
use service::catalog::{MockCatalogService, OfferingRef};
use service::client::MockClientService;
use service::clock::MockClockService;
use service::qualification::MockQualificationService;
use service::random::MockRandomService;
use service::uuid_service::MockUuidService;
use service::MockPermissionService;
use time::macros::{date, datetime, time};
use uuid::{uuid, Uuid};

use crate::appointment::AppointmentServiceImpl;
use crate::test::availability::{default_employee_id, default_service_id, generate_default_resolved};
use crate::test::error_test::*;

pub fn default_client_id() -> Uuid {
    uuid!("0F41DA72-CB87-4B5D-9C2F-6FD5D0A5B90D")
}
pub fn default_appointment_id() -> Uuid {
    uuid!("9B8E9BBF-65C7-4E5F-8EAD-31E37E1C4380")
}
pub fn default_version() -> Uuid {
    uuid!("0C11DBA5-7E88-4C6B-8A17-3E5B1D3C6A42")
}

fn generate_default_request() -> BookingRequest {
    BookingRequest {
        client_id: default_client_id(),
        offering: OfferingRef::Service(default_service_id()),
        employee: EmployeeChoice::Specific(default_employee_id()),
        date: date!(2024 - 07 - 01),
        start: time!(10:00),
        reschedule_of: None,
    }
}

fn generate_scheduled_entity() -> dao::appointment::AppointmentEntity {
    dao::appointment::AppointmentEntity {
        id: default_appointment_id(),
        client_id: default_client_id(),
        employee_id: default_employee_id(),
        offering_kind: dao::appointment::OfferingKindEntity::Service,
        offering_id: default_service_id(),
        date: date!(2024 - 07 - 01),
        start: time!(10:00),
        end: time!(10:30),
        status: dao::appointment::AppointmentStatusEntity::Scheduled,
        created: datetime!(2024-06-30 12:00),
        deleted: None,
        version: default_version(),
    }
}

pub struct AppointmentServiceDependencies {
    pub appointment_dao: MockAppointmentDao,
    pub availability_service: MockAvailabilityService,
    pub catalog_service: MockCatalogService,
    pub qualification_service: MockQualificationService,
    pub client_service: MockClientService,
    pub permission_service: MockPermissionService,
    pub clock_service: MockClockService,
    pub uuid_service: MockUuidService,
    pub random_service: MockRandomService,
}
impl AppointmentServiceDependencies {
    pub fn build_service(
        self,
    ) -> AppointmentServiceImpl<
        MockAppointmentDao,
        MockAvailabilityService,
        MockCatalogService,
        MockQualificationService,
        MockClientService,
        MockPermissionService,
        MockClockService,
        MockUuidService,
        MockRandomService,
    > {
        AppointmentServiceImpl::new(
            self.appointment_dao.into(),
            self.availability_service.into(),
            self.catalog_service.into(),
            self.qualification_service.into(),
            self.client_service.into(),
            self.permission_service.into(),
            self.clock_service.into(),
            self.uuid_service.into(),
            self.random_service.into(),
            0.15,
        )
    }
}

pub fn build_dependencies(permission: bool) -> AppointmentServiceDependencies {
    let mut permission_service = MockPermissionService::new();
    permission_service
        .expect_check_permission()
        .with(eq("frontdesk"), eq(().auth()))
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
        .returning(|| date!(2024 - 06 - 01));
    clock_service
        .expect_date_time_now()
        .returning(generate_default_datetime);
    let mut catalog_service = MockCatalogService::new();
    catalog_service
        .expect_resolve()
        .returning(|_, _| Ok(generate_default_resolved()));
    let mut client_service = MockClientService::new();
    client_service.expect_exists().returning(|_, _| Ok(true));
    let mut uuid_service = MockUuidService::new();
    uuid_service.expect_new_uuid().returning(|usage| {
        if usage.ends_with("id") {
            default_appointment_id()
        } else {
            default_version()
        }
    });
    AppointmentServiceDependencies {
        appointment_dao: MockAppointmentDao::new(),
        availability_service: MockAvailabilityService::new(),
        catalog_service,
        qualification_service: MockQualificationService::new(),
        client_service,
        permission_service,
        clock_service,
        uuid_service,
        random_service: MockRandomService::new(),
    }
}

#[tokio::test]
async fn test_book_open_slot() {
    let mut dependencies = build_dependencies(true);
    dependencies
        .availability_service
        .expect_slots_for_day()
        .returning(|_, _, _, _, _| {
            Ok(Arc::new([Slot {
                start: time!(10:00),
                blocked: None,
            }]))
        });
    dependencies
        .random_service
        .expect_roll()
        .returning(|_| 0.9);
    dependencies
        .appointment_dao
        .expect_create()
        .times(1)
        .returning(|_, _| Ok(()));
    let appointment_service = dependencies.build_service();

    let outcome = appointment_service
        .book(&generate_default_request(), ().auth())
        .await
        .unwrap();
    let BookingOutcome::Booked(appointment) = outcome else {
        panic!("Expected a booked appointment");
    };
    assert_eq!(appointment.employee_id, default_employee_id());
    assert_eq!(appointment.start, time!(10:00));
    assert_eq!(appointment.end, time!(10:30));
}

#[tokio::test]
async fn test_book_blocked_slot_is_taken() {
    let mut dependencies = build_dependencies(true);
    dependencies
        .availability_service
        .expect_slots_for_day()
        .returning(|_, _, _, _, _| {
            Ok(Arc::new([Slot {
                start: time!(10:00),
                blocked: Some(BlockReason::Occupied),
            }]))
        });
    let appointment_service = dependencies.build_service();

    let outcome = appointment_service
        .book(&generate_default_request(), ().auth())
        .await
        .unwrap();
    assert_eq!(outcome, BookingOutcome::SlotTaken);
}

#[tokio::test]
async fn test_book_lost_race_is_taken() {
    let mut dependencies = build_dependencies(true);
    dependencies
        .availability_service
        .expect_slots_for_day()
        .returning(|_, _, _, _, _| {
            Ok(Arc::new([Slot {
                start: time!(10:00),
                blocked: None,
            }]))
        });
    dependencies
        .random_service
        .expect_roll()
        .returning(|_| 0.01);
    let appointment_service = dependencies.build_service();

    let outcome = appointment_service
        .book(&generate_default_request(), ().auth())
        .await
        .unwrap();
    assert_eq!(outcome, BookingOutcome::SlotTaken);
}

#[tokio::test]
async fn test_book_unknown_client() {
    let mut dependencies = build_dependencies(true);
    dependencies.client_service.checkpoint();
    dependencies
        .client_service
        .expect_exists()
        .returning(|_, _| Ok(false));
    let appointment_service = dependencies.build_service();

    let result = appointment_service
        .book(&generate_default_request(), ().auth())
        .await;
    test_not_found(&result, &default_client_id());
}

#[tokio::test]
async fn test_book_reschedule_cancels_old_appointment() {
    let mut dependencies = build_dependencies(true);
    dependencies
        .appointment_dao
        .expect_find_by_id()
        .with(eq(default_appointment_id()))
        .returning(|_| Ok(Some(generate_scheduled_entity())));
    dependencies
        .availability_service
        .expect_slots_for_day()
        .returning(|_, _, _, _, _| {
            Ok(Arc::new([Slot {
                start: time!(11:00),
                blocked: None,
            }]))
        });
    dependencies
        .random_service
        .expect_roll()
        .returning(|_| 0.9);
    dependencies
        .appointment_dao
        .expect_create()
        .times(1)
        .returning(|_, _| Ok(()));
    dependencies
        .appointment_dao
        .expect_update()
        .times(1)
        .withf(|entity, _| {
            entity.id == default_appointment_id()
                && entity.status == dao::appointment::AppointmentStatusEntity::Cancelled
        })
        .returning(|_, _| Ok(()));
    let appointment_service = dependencies.build_service();

    let request = BookingRequest {
        start: time!(11:00),
        reschedule_of: Some(default_appointment_id()),
        ..generate_default_request()
    };
    let outcome = appointment_service.book(&request, ().auth()).await.unwrap();
    assert!(matches!(outcome, BookingOutcome::Booked(_)));
}

#[tokio::test]
async fn test_cancel_scheduled_appointment() {
    let mut dependencies = build_dependencies(true);
    dependencies
        .appointment_dao
        .expect_find_by_id()
        .returning(|_| Ok(Some(generate_scheduled_entity())));
    dependencies
        .appointment_dao
        .expect_update()
        .times(1)
        .withf(|entity, _| entity.status == dao::appointment::AppointmentStatusEntity::Cancelled)
        .returning(|_, _| Ok(()));
    let appointment_service = dependencies.build_service();

    appointment_service
        .cancel(default_appointment_id(), ().auth())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_cancel_completed_appointment_fails() {
    let mut dependencies = build_dependencies(true);
    dependencies.appointment_dao.expect_find_by_id().returning(|_| {
        Ok(Some(dao::appointment::AppointmentEntity {
            status: dao::appointment::AppointmentStatusEntity::Completed,
            ..generate_scheduled_entity()
        }))
    });
    let appointment_service = dependencies.build_service();

    let result = appointment_service
        .cancel(default_appointment_id(), ().auth())
        .await;
    test_validation_error(
        &result,
        &service::ValidationFailureItem::ModificationNotAllowed("status".into()),
        1,
    );
}

#[tokio::test]
async fn test_book_no_permission() {
    let dependencies = build_dependencies(false);
    let appointment_service = dependencies.build_service();
    let result = appointment_service
        .book(&generate_default_request(), ().auth())
        .await;
    test_forbidden(&result);
}
