use std::sync::Arc;

use dao::appointment::MockAppointmentDao;
use mockall::predicate::eq;
use service::availability::{AvailabilityService, BlockReason, EmployeeChoice, Slot};
use service::catalog::{MockCatalogService, OfferingRef, ResolvedOffering};
use service::clock::MockClockService;
use service::employee::{DaySchedule, Employee, MockEmployeeService};
use service::qualification::MockQualificationService;
use service::{MockPermissionService, ValidationFailureItem};
use time::macros::{date, datetime, time};
use time::Weekday;
use uuid::{uuid, Uuid};

use crate::availability::AvailabilityServiceImpl;
use crate::test::error_test::*;

pub fn default_employee_id() -> Uuid {
    uuid!("6B7D4671-1B3A-4F9D-A2B8-3DAA69C93C27")
}
pub fn default_service_id() -> Uuid {
    uuid!("52C8CE02-DB4B-4B85-9A3C-1C3ADBE9A71B")
}

pub fn monday_schedule() -> DaySchedule {
    DaySchedule {
        weekday: Weekday::Monday,
        active: true,
        start: time!(08:00),
        end: time!(18:00),
        break_start: Some(time!(12:00)),
        break_end: Some(time!(13:00)),
    }
}

pub fn generate_default_employee() -> Employee {
    Employee {
        id: default_employee_id(),
        name: "Marta".into(),
        specialties: Arc::new(["corte".into()]),
        schedule: Arc::new([monday_schedule()]),
        deleted: None,
        version: uuid!("E0C7A1B1-40F7-4E10-B52A-07B47B7A1133"),
    }
}

pub fn generate_default_resolved() -> ResolvedOffering {
    ResolvedOffering {
        offering: OfferingRef::Service(default_service_id()),
        name: "Corte".into(),
        duration_minutes: 30,
        price_cents: 5_000,
        required_specialties: Arc::new(["corte".into()]),
        service_ids: Arc::new([default_service_id()]),
    }
}

fn generate_appointment_entity(
    employee_id: Uuid,
    start: time::Time,
    end: time::Time,
) -> dao::appointment::AppointmentEntity {
    dao::appointment::AppointmentEntity {
        id: Uuid::new_v4(),
        client_id: Uuid::new_v4(),
        employee_id,
        offering_kind: dao::appointment::OfferingKindEntity::Service,
        offering_id: default_service_id(),
        date: date!(2024 - 07 - 01),
        start,
        end,
        status: dao::appointment::AppointmentStatusEntity::Scheduled,
        created: datetime!(2024-06-30 12:00),
        deleted: None,
        version: Uuid::new_v4(),
    }
}

pub struct AvailabilityServiceDependencies {
    pub appointment_dao: MockAppointmentDao,
    pub employee_service: MockEmployeeService,
    pub catalog_service: MockCatalogService,
    pub qualification_service: MockQualificationService,
    pub permission_service: MockPermissionService,
    pub clock_service: MockClockService,
}
impl AvailabilityServiceDependencies {
    pub fn build_service(
        self,
    ) -> AvailabilityServiceImpl<
        MockAppointmentDao,
        MockEmployeeService,
        MockCatalogService,
        MockQualificationService,
        MockPermissionService,
        MockClockService,
    > {
        AvailabilityServiceImpl::new(
            self.appointment_dao.into(),
            self.employee_service.into(),
            self.catalog_service.into(),
            self.qualification_service.into(),
            self.permission_service.into(),
            self.clock_service.into(),
        )
    }
}

pub fn build_dependencies(permission: bool) -> AvailabilityServiceDependencies {
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
    let mut catalog_service = MockCatalogService::new();
    catalog_service
        .expect_resolve()
        .returning(|_, _| Ok(generate_default_resolved()));
    AvailabilityServiceDependencies {
        appointment_dao: MockAppointmentDao::new(),
        employee_service: MockEmployeeService::new(),
        catalog_service,
        qualification_service: MockQualificationService::new(),
        permission_service,
        clock_service,
    }
}

fn blocked_at(slots: &[Slot], start: time::Time) -> Option<BlockReason> {
    slots
        .iter()
        .find(|slot| slot.start == start)
        .unwrap_or_else(|| panic!("no slot at {start}"))
        .blocked
}

#[tokio::test]
async fn test_slot_board_for_specific_employee() {
    let mut dependencies = build_dependencies(true);
    dependencies
        .employee_service
        .expect_get()
        .returning(|_, _| Ok(generate_default_employee()));
    dependencies
        .appointment_dao
        .expect_find_by_employee_and_date()
        .returning(|employee_id, _| {
            Ok(Arc::new([generate_appointment_entity(
                employee_id,
                time!(10:00),
                time!(10:30),
            )]))
        });
    let availability_service = dependencies.build_service();

    let slots = availability_service
        .slots_for_day(
            date!(2024 - 07 - 01),
            OfferingRef::Service(default_service_id()),
            EmployeeChoice::Specific(default_employee_id()),
            None,
            ().auth(),
        )
        .await
        .unwrap();

    // 08:00 through 17:30 on the 15-minute grid.
    assert_eq!(slots.len(), 39);
    assert_eq!(slots.first().unwrap().start, time!(08:00));
    assert_eq!(slots.last().unwrap().start, time!(17:30));

    assert_eq!(blocked_at(&slots, time!(08:00)), None);
    // 09:45 runs until 10:15 and collides with the booked 10:00 slot.
    assert_eq!(blocked_at(&slots, time!(09:45)), Some(BlockReason::Occupied));
    assert_eq!(blocked_at(&slots, time!(10:00)), Some(BlockReason::Occupied));
    assert_eq!(blocked_at(&slots, time!(10:15)), Some(BlockReason::Occupied));
    // Ends touching 10:00 is no conflict.
    assert_eq!(blocked_at(&slots, time!(10:30)), None);
    assert_eq!(blocked_at(&slots, time!(11:30)), None);
    assert_eq!(blocked_at(&slots, time!(11:45)), Some(BlockReason::Break));
    assert_eq!(blocked_at(&slots, time!(12:00)), Some(BlockReason::Break));
    assert_eq!(blocked_at(&slots, time!(12:45)), Some(BlockReason::Break));
    assert_eq!(blocked_at(&slots, time!(13:00)), None);
}

#[tokio::test]
async fn test_past_day_blocks_the_whole_board() {
    let mut dependencies = build_dependencies(true);
    dependencies
        .clock_service
        .checkpoint();
    dependencies
        .clock_service
        .expect_date_now()
        .returning(|| date!(2024 - 07 - 02));
    dependencies
        .employee_service
        .expect_get()
        .returning(|_, _| Ok(generate_default_employee()));
    dependencies
        .appointment_dao
        .expect_find_by_employee_and_date()
        .returning(|_, _| Ok(Arc::new([])));
    let availability_service = dependencies.build_service();

    let slots = availability_service
        .slots_for_day(
            date!(2024 - 07 - 01),
            OfferingRef::Service(default_service_id()),
            EmployeeChoice::Specific(default_employee_id()),
            None,
            ().auth(),
        )
        .await
        .unwrap();
    assert!(slots
        .iter()
        .all(|slot| slot.blocked == Some(BlockReason::Past)));
}

#[tokio::test]
async fn test_unqualified_specific_employee_is_rejected() {
    let mut dependencies = build_dependencies(true);
    dependencies.employee_service.expect_get().returning(|_, _| {
        Ok(Employee {
            specialties: Arc::new(["barba".into()]),
            ..generate_default_employee()
        })
    });
    let availability_service = dependencies.build_service();

    let result = availability_service
        .slots_for_day(
            date!(2024 - 07 - 01),
            OfferingRef::Service(default_service_id()),
            EmployeeChoice::Specific(default_employee_id()),
            None,
            ().auth(),
        )
        .await;
    test_validation_error(
        &result,
        &ValidationFailureItem::InvalidValue("employee".into()),
        1,
    );
}

#[tokio::test]
async fn test_any_opens_slot_when_one_qualified_employee_is_free() {
    let other_employee_id = uuid!("A24C1B5E-88D1-4327-BD29-9AC2C4A8F4E1");
    let mut dependencies = build_dependencies(true);
    dependencies
        .qualification_service
        .expect_qualified_employees()
        .returning(move |_, _| {
            Ok(Arc::new([
                generate_default_employee(),
                Employee {
                    id: other_employee_id,
                    name: "Paulo".into(),
                    ..generate_default_employee()
                },
            ]))
        });
    // Marta is booked at 10:00, Paulo is free all day.
    dependencies
        .appointment_dao
        .expect_find_by_employee_and_date()
        .returning(move |employee_id, _| {
            if employee_id == default_employee_id() {
                Ok(Arc::new([generate_appointment_entity(
                    employee_id,
                    time!(10:00),
                    time!(10:30),
                )]))
            } else {
                Ok(Arc::new([]))
            }
        });
    let availability_service = dependencies.build_service();

    let slots = availability_service
        .slots_for_day(
            date!(2024 - 07 - 01),
            OfferingRef::Service(default_service_id()),
            EmployeeChoice::Any,
            None,
            ().auth(),
        )
        .await
        .unwrap();
    assert_eq!(blocked_at(&slots, time!(10:00)), None);
    assert_eq!(blocked_at(&slots, time!(12:00)), Some(BlockReason::Break));
}

#[tokio::test]
async fn test_slots_for_day_no_permission() {
    let dependencies = build_dependencies(false);
    let availability_service = dependencies.build_service();
    let result = availability_service
        .slots_for_day(
            date!(2024 - 07 - 01),
            OfferingRef::Service(default_service_id()),
            EmployeeChoice::Specific(default_employee_id()),
            None,
            ().auth(),
        )
        .await;
    test_forbidden(&result);
}
