use std::sync::Arc;

use async_trait::async_trait;
use service::appointment::{
    blocking_intervals, Appointment, AppointmentStatus, BookingOutcome, BookingRequest,
};
use service::availability::{classify_candidate, EmployeeChoice};
use service::permission::{Authentication, FRONTDESK_PRIVILEGE};
use service::work_schedule::working_day;
use service::ServiceError;
use time::{Date, Duration};
use trimly_utils::TimeRange;
use uuid::Uuid;

const APPOINTMENT_SERVICE_PROCESS: &str = "appointment-service";

pub struct AppointmentServiceImpl<
    AppointmentDao,
    AvailabilityService,
    CatalogService,
    QualificationService,
    ClientService,
    PermissionService,
    ClockService,
    UuidService,
    RandomService,
> where
    AppointmentDao: dao::appointment::AppointmentDao + Send + Sync,
    AvailabilityService: service::availability::AvailabilityService<Context = PermissionService::Context>
        + Send
        + Sync,
    CatalogService:
        service::catalog::CatalogService<Context = PermissionService::Context> + Send + Sync,
    QualificationService:
        service::qualification::QualificationService<Context = PermissionService::Context>
            + Send
            + Sync,
    ClientService:
        service::client::ClientService<Context = PermissionService::Context> + Send + Sync,
    PermissionService: service::PermissionService + Send + Sync,
    ClockService: service::clock::ClockService + Send + Sync,
    UuidService: service::uuid_service::UuidService + Send + Sync,
    RandomService: service::random::RandomService + Send + Sync,
{
    appointment_dao: Arc<AppointmentDao>,
    availability_service: Arc<AvailabilityService>,
    catalog_service: Arc<CatalogService>,
    qualification_service: Arc<QualificationService>,
    client_service: Arc<ClientService>,
    permission_service: Arc<PermissionService>,
    clock_service: Arc<ClockService>,
    uuid_service: Arc<UuidService>,
    random_service: Arc<RandomService>,
    /// Chance in `[0, 1]` that a booking loses the slot to a concurrent
    /// booking between the availability check and the write.
    race_probability: f64,
}

impl<
        AppointmentDao,
        AvailabilityService,
        CatalogService,
        QualificationService,
        ClientService,
        PermissionService,
        ClockService,
        UuidService,
        RandomService,
    >
    AppointmentServiceImpl<
        AppointmentDao,
        AvailabilityService,
        CatalogService,
        QualificationService,
        ClientService,
        PermissionService,
        ClockService,
        UuidService,
        RandomService,
    >
where
    AppointmentDao: dao::appointment::AppointmentDao + Send + Sync,
    AvailabilityService: service::availability::AvailabilityService<Context = PermissionService::Context>
        + Send
        + Sync,
    CatalogService:
        service::catalog::CatalogService<Context = PermissionService::Context> + Send + Sync,
    QualificationService:
        service::qualification::QualificationService<Context = PermissionService::Context>
            + Send
            + Sync,
    ClientService:
        service::client::ClientService<Context = PermissionService::Context> + Send + Sync,
    PermissionService: service::PermissionService + Send + Sync,
    ClockService: service::clock::ClockService + Send + Sync,
    UuidService: service::uuid_service::UuidService + Send + Sync,
    RandomService: service::random::RandomService + Send + Sync,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        appointment_dao: Arc<AppointmentDao>,
        availability_service: Arc<AvailabilityService>,
        catalog_service: Arc<CatalogService>,
        qualification_service: Arc<QualificationService>,
        client_service: Arc<ClientService>,
        permission_service: Arc<PermissionService>,
        clock_service: Arc<ClockService>,
        uuid_service: Arc<UuidService>,
        random_service: Arc<RandomService>,
        race_probability: f64,
    ) -> Self {
        Self {
            appointment_dao,
            availability_service,
            catalog_service,
            qualification_service,
            client_service,
            permission_service,
            clock_service,
            uuid_service,
            random_service,
            race_probability,
        }
    }

    /// Whether the employee can take the interval on the date: working
    /// window, break and existing occupancy all have to agree.
    async fn employee_is_free(
        &self,
        employee: &service::employee::Employee,
        date: Date,
        interval: &TimeRange,
        exclude_appointment: Option<Uuid>,
    ) -> Result<bool, ServiceError> {
        let Some(day) = working_day(employee, date) else {
            return Ok(false);
        };
        if interval.start_minutes() < day.work.start_minutes()
            || interval.end_minutes() > day.work.end_minutes()
        {
            return Ok(false);
        }
        let appointments: Vec<Appointment> = self
            .appointment_dao
            .find_by_employee_and_date(employee.id, date)
            .await?
            .iter()
            .map(Appointment::from)
            .collect();
        let occupied = blocking_intervals(&appointments, exclude_appointment);
        let today = self.clock_service.date_now();
        Ok(classify_candidate(interval, date, today, &day, &occupied).is_none())
    }
}

#[async_trait]
impl<
        AppointmentDao,
        AvailabilityService,
        CatalogService,
        QualificationService,
        ClientService,
        PermissionService,
        ClockService,
        UuidService,
        RandomService,
    > service::appointment::AppointmentService
    for AppointmentServiceImpl<
        AppointmentDao,
        AvailabilityService,
        CatalogService,
        QualificationService,
        ClientService,
        PermissionService,
        ClockService,
        UuidService,
        RandomService,
    >
where
    AppointmentDao: dao::appointment::AppointmentDao + Send + Sync,
    AvailabilityService: service::availability::AvailabilityService<Context = PermissionService::Context>
        + Send
        + Sync,
    CatalogService:
        service::catalog::CatalogService<Context = PermissionService::Context> + Send + Sync,
    QualificationService:
        service::qualification::QualificationService<Context = PermissionService::Context>
            + Send
            + Sync,
    ClientService:
        service::client::ClientService<Context = PermissionService::Context> + Send + Sync,
    PermissionService: service::PermissionService + Send + Sync,
    ClockService: service::clock::ClockService + Send + Sync,
    UuidService: service::uuid_service::UuidService + Send + Sync,
    RandomService: service::random::RandomService + Send + Sync,
{
    type Context = PermissionService::Context;

    async fn get_for_day(
        &self,
        date: Date,
        context: Authentication<Self::Context>,
    ) -> Result<Arc<[Appointment]>, ServiceError> {
        self.permission_service
            .check_permission(FRONTDESK_PRIVILEGE, context)
            .await?;
        Ok(self
            .appointment_dao
            .find_by_date(date)
            .await?
            .iter()
            .filter(|appointment| appointment.deleted.is_none())
            .map(Appointment::from)
            .collect())
    }

    async fn occupied_for(
        &self,
        employee_id: Uuid,
        date: Date,
        exclude_appointment: Option<Uuid>,
        context: Authentication<Self::Context>,
    ) -> Result<Arc<[Appointment]>, ServiceError> {
        self.permission_service
            .check_permission(FRONTDESK_PRIVILEGE, context)
            .await?;
        Ok(self
            .appointment_dao
            .find_by_employee_and_date(employee_id, date)
            .await?
            .iter()
            .map(Appointment::from)
            .filter(|appointment| appointment.status != AppointmentStatus::Cancelled)
            .filter(|appointment| appointment.deleted.is_none())
            .filter(|appointment| Some(appointment.id) != exclude_appointment)
            .collect())
    }

    async fn book(
        &self,
        request: &BookingRequest,
        context: Authentication<Self::Context>,
    ) -> Result<BookingOutcome, ServiceError> {
        self.permission_service
            .check_permission(FRONTDESK_PRIVILEGE, context)
            .await?;
        if !self
            .client_service
            .exists(request.client_id, Authentication::Full)
            .await?
        {
            return Err(ServiceError::EntityNotFound(request.client_id));
        }
        let rescheduled = match request.reschedule_of {
            Some(old_id) => {
                let old = self
                    .appointment_dao
                    .find_by_id(old_id)
                    .await?
                    .ok_or(ServiceError::EntityNotFound(old_id))?;
                if old.status != dao::appointment::AppointmentStatusEntity::Scheduled {
                    return Err(ServiceError::modification_not_allowed("status"));
                }
                Some(old)
            }
            None => None,
        };

        let resolved = self
            .catalog_service
            .resolve(request.offering, Authentication::Full)
            .await?;
        if resolved.duration_minutes == 0 {
            return Err(ServiceError::invalid_value("offering"));
        }
        let end = request.start + Duration::minutes(resolved.duration_minutes as i64);
        let interval = TimeRange::new(request.start, end)
            .map_err(|_| ServiceError::TimeOrderWrong(request.start, end))?;

        let slots = self
            .availability_service
            .slots_for_day(
                request.date,
                request.offering,
                request.employee,
                request.reschedule_of,
                Authentication::Full,
            )
            .await?;
        let open = slots
            .iter()
            .any(|slot| slot.start == request.start && slot.is_open());
        if !open {
            return Ok(BookingOutcome::SlotTaken);
        }

        // Stand-in for the conditional write a concurrent backend would do:
        // a roll below the configured probability means another terminal
        // took the slot after the board was rendered.
        if self.race_probability > 0.0
            && self.random_service.roll("appointment-service::book race") < self.race_probability
        {
            tracing::info!(date = %request.date, start = %request.start, "slot lost to race");
            return Ok(BookingOutcome::SlotTaken);
        }

        let employee_id = match request.employee {
            EmployeeChoice::Specific(employee_id) => employee_id,
            EmployeeChoice::Any => {
                let qualified = self
                    .qualification_service
                    .qualified_employees(
                        resolved.required_specialties.clone(),
                        Authentication::Full,
                    )
                    .await?;
                let mut chosen = None;
                for employee in qualified.iter() {
                    if self
                        .employee_is_free(employee, request.date, &interval, request.reschedule_of)
                        .await?
                    {
                        chosen = Some(employee.id);
                        break;
                    }
                }
                match chosen {
                    Some(employee_id) => employee_id,
                    None => return Ok(BookingOutcome::SlotTaken),
                }
            }
        };

        let entity = dao::appointment::AppointmentEntity {
            id: self.uuid_service.new_uuid("appointment-service::book id"),
            client_id: request.client_id,
            employee_id,
            offering_kind: match request.offering {
                service::catalog::OfferingRef::Service(_) => {
                    dao::appointment::OfferingKindEntity::Service
                }
                service::catalog::OfferingRef::Combo(_) => {
                    dao::appointment::OfferingKindEntity::Combo
                }
            },
            offering_id: request.offering.id(),
            date: request.date,
            start: request.start,
            end,
            status: dao::appointment::AppointmentStatusEntity::Scheduled,
            created: self.clock_service.date_time_now(),
            deleted: None,
            version: self.uuid_service.new_uuid("appointment-service::book version"),
        };
        self.appointment_dao
            .create(&entity, APPOINTMENT_SERVICE_PROCESS)
            .await?;

        if let Some(mut old) = rescheduled {
            old.status = dao::appointment::AppointmentStatusEntity::Cancelled;
            old.version = self
                .uuid_service
                .new_uuid("appointment-service::book reschedule version");
            self.appointment_dao
                .update(&old, APPOINTMENT_SERVICE_PROCESS)
                .await?;
        }

        Ok(BookingOutcome::Booked(Appointment::from(&entity)))
    }

    async fn cancel(
        &self,
        id: Uuid,
        context: Authentication<Self::Context>,
    ) -> Result<(), ServiceError> {
        self.permission_service
            .check_permission(FRONTDESK_PRIVILEGE, context)
            .await?;
        let mut entity = self
            .appointment_dao
            .find_by_id(id)
            .await?
            .ok_or(ServiceError::EntityNotFound(id))?;
        match entity.status {
            dao::appointment::AppointmentStatusEntity::Cancelled => Ok(()),
            dao::appointment::AppointmentStatusEntity::Completed => {
                Err(ServiceError::modification_not_allowed("status"))
            }
            dao::appointment::AppointmentStatusEntity::Scheduled => {
                entity.status = dao::appointment::AppointmentStatusEntity::Cancelled;
                entity.version = self.uuid_service.new_uuid("appointment-service::cancel");
                self.appointment_dao
                    .update(&entity, APPOINTMENT_SERVICE_PROCESS)
                    .await?;
                Ok(())
            }
        }
    }

    async fn complete(
        &self,
        id: Uuid,
        context: Authentication<Self::Context>,
    ) -> Result<(), ServiceError> {
        self.permission_service
            .check_permission(FRONTDESK_PRIVILEGE, context)
            .await?;
        let mut entity = self
            .appointment_dao
            .find_by_id(id)
            .await?
            .ok_or(ServiceError::EntityNotFound(id))?;
        match entity.status {
            dao::appointment::AppointmentStatusEntity::Completed => Ok(()),
            dao::appointment::AppointmentStatusEntity::Cancelled => {
                Err(ServiceError::modification_not_allowed("status"))
            }
            dao::appointment::AppointmentStatusEntity::Scheduled => {
                entity.status = dao::appointment::AppointmentStatusEntity::Completed;
                entity.version = self.uuid_service.new_uuid("appointment-service::complete");
                self.appointment_dao
                    .update(&entity, APPOINTMENT_SERVICE_PROCESS)
                    .await?;
                Ok(())
            }
        }
    }
}
