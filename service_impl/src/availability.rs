use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use service::appointment::{blocking_intervals, Appointment};
use service::availability::{
    candidate_intervals, classify_candidate, BlockReason, EmployeeChoice, Slot,
};
use service::catalog::OfferingRef;
use service::employee::Employee;
use service::permission::{Authentication, FRONTDESK_PRIVILEGE};
use service::work_schedule::working_day;
use service::ServiceError;
use time::{Date, Time};
use uuid::Uuid;

pub struct AvailabilityServiceImpl<
    AppointmentDao,
    EmployeeService,
    CatalogService,
    QualificationService,
    PermissionService,
    ClockService,
> where
    AppointmentDao: dao::appointment::AppointmentDao + Send + Sync,
    EmployeeService: service::employee::EmployeeService + Send + Sync,
    CatalogService: service::catalog::CatalogService<Context = EmployeeService::Context>
        + Send
        + Sync,
    QualificationService:
        service::qualification::QualificationService<Context = EmployeeService::Context>
            + Send
            + Sync,
    PermissionService: service::PermissionService<Context = EmployeeService::Context> + Send + Sync,
    ClockService: service::clock::ClockService + Send + Sync,
{
    appointment_dao: Arc<AppointmentDao>,
    employee_service: Arc<EmployeeService>,
    catalog_service: Arc<CatalogService>,
    qualification_service: Arc<QualificationService>,
    permission_service: Arc<PermissionService>,
    clock_service: Arc<ClockService>,
}

impl<
        AppointmentDao,
        EmployeeService,
        CatalogService,
        QualificationService,
        PermissionService,
        ClockService,
    >
    AvailabilityServiceImpl<
        AppointmentDao,
        EmployeeService,
        CatalogService,
        QualificationService,
        PermissionService,
        ClockService,
    >
where
    AppointmentDao: dao::appointment::AppointmentDao + Send + Sync,
    EmployeeService: service::employee::EmployeeService + Send + Sync,
    CatalogService: service::catalog::CatalogService<Context = EmployeeService::Context>
        + Send
        + Sync,
    QualificationService:
        service::qualification::QualificationService<Context = EmployeeService::Context>
            + Send
            + Sync,
    PermissionService: service::PermissionService<Context = EmployeeService::Context> + Send + Sync,
    ClockService: service::clock::ClockService + Send + Sync,
{
    pub fn new(
        appointment_dao: Arc<AppointmentDao>,
        employee_service: Arc<EmployeeService>,
        catalog_service: Arc<CatalogService>,
        qualification_service: Arc<QualificationService>,
        permission_service: Arc<PermissionService>,
        clock_service: Arc<ClockService>,
    ) -> Self {
        Self {
            appointment_dao,
            employee_service,
            catalog_service,
            qualification_service,
            permission_service,
            clock_service,
        }
    }

    /// Slot board of one employee for one date. No working window on that
    /// date means no slots at all.
    async fn employee_slots(
        &self,
        employee: &Employee,
        date: Date,
        today: Date,
        duration_minutes: u16,
        exclude_appointment: Option<Uuid>,
    ) -> Result<Vec<Slot>, ServiceError> {
        let Some(day) = working_day(employee, date) else {
            return Ok(Vec::new());
        };
        let appointments: Vec<Appointment> = self
            .appointment_dao
            .find_by_employee_and_date(employee.id, date)
            .await?
            .iter()
            .map(Appointment::from)
            .collect();
        let occupied = blocking_intervals(&appointments, exclude_appointment);
        Ok(candidate_intervals(&day, duration_minutes)
            .iter()
            .map(|candidate| Slot {
                start: candidate.start(),
                blocked: classify_candidate(candidate, date, today, &day, &occupied),
            })
            .collect())
    }
}

/// Merges the block state of one start time across employees. Open wins;
/// two different block reasons collapse to `Occupied` since neither alone
/// explains the merged board.
fn merge_blocked(
    left: Option<BlockReason>,
    right: Option<BlockReason>,
) -> Option<BlockReason> {
    match (left, right) {
        (None, _) | (_, None) => None,
        (Some(a), Some(b)) if a == b => Some(a),
        _ => Some(BlockReason::Occupied),
    }
}

#[async_trait]
impl<
        AppointmentDao,
        EmployeeService,
        CatalogService,
        QualificationService,
        PermissionService,
        ClockService,
    > service::availability::AvailabilityService
    for AvailabilityServiceImpl<
        AppointmentDao,
        EmployeeService,
        CatalogService,
        QualificationService,
        PermissionService,
        ClockService,
    >
where
    AppointmentDao: dao::appointment::AppointmentDao + Send + Sync,
    EmployeeService: service::employee::EmployeeService + Send + Sync,
    CatalogService: service::catalog::CatalogService<Context = EmployeeService::Context>
        + Send
        + Sync,
    QualificationService:
        service::qualification::QualificationService<Context = EmployeeService::Context>
            + Send
            + Sync,
    PermissionService: service::PermissionService<Context = EmployeeService::Context> + Send + Sync,
    ClockService: service::clock::ClockService + Send + Sync,
{
    type Context = EmployeeService::Context;

    async fn slots_for_day(
        &self,
        date: Date,
        offering: OfferingRef,
        employee: EmployeeChoice,
        exclude_appointment: Option<Uuid>,
        context: Authentication<Self::Context>,
    ) -> Result<Arc<[Slot]>, ServiceError> {
        self.permission_service
            .check_permission(FRONTDESK_PRIVILEGE, context)
            .await?;
        let resolved = self
            .catalog_service
            .resolve(offering, Authentication::Full)
            .await?;
        let today = self.clock_service.date_now();

        match employee {
            EmployeeChoice::Specific(employee_id) => {
                let employee = self
                    .employee_service
                    .get(employee_id, Authentication::Full)
                    .await?;
                if !service::qualification::is_qualified(&employee, &resolved.required_specialties)
                {
                    return Err(ServiceError::invalid_value("employee"));
                }
                Ok(self
                    .employee_slots(
                        &employee,
                        date,
                        today,
                        resolved.duration_minutes,
                        exclude_appointment,
                    )
                    .await?
                    .into())
            }
            EmployeeChoice::Any => {
                let qualified = self
                    .qualification_service
                    .qualified_employees(resolved.required_specialties.clone(), Authentication::Full)
                    .await?;
                let mut merged: BTreeMap<Time, Option<BlockReason>> = BTreeMap::new();
                for employee in qualified.iter() {
                    let slots = self
                        .employee_slots(
                            employee,
                            date,
                            today,
                            resolved.duration_minutes,
                            exclude_appointment,
                        )
                        .await?;
                    for slot in slots {
                        merged
                            .entry(slot.start)
                            .and_modify(|blocked| *blocked = merge_blocked(*blocked, slot.blocked))
                            .or_insert(slot.blocked);
                    }
                }
                Ok(merged
                    .into_iter()
                    .map(|(start, blocked)| Slot { start, blocked })
                    .collect())
            }
        }
    }
}
