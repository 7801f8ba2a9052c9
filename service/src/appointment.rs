use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use time::{Date, PrimitiveDateTime, Time};
use trimly_utils::{derive_from_reference, TimeRange};
use uuid::Uuid;

use crate::availability::EmployeeChoice;
use crate::catalog::OfferingRef;
use crate::permission::Authentication;
use crate::ServiceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppointmentStatus {
    Scheduled,
    Completed,
    Cancelled,
}
impl From<dao::appointment::AppointmentStatusEntity> for AppointmentStatus {
    fn from(status: dao::appointment::AppointmentStatusEntity) -> Self {
        match status {
            dao::appointment::AppointmentStatusEntity::Scheduled => Self::Scheduled,
            dao::appointment::AppointmentStatusEntity::Completed => Self::Completed,
            dao::appointment::AppointmentStatusEntity::Cancelled => Self::Cancelled,
        }
    }
}
impl From<AppointmentStatus> for dao::appointment::AppointmentStatusEntity {
    fn from(status: AppointmentStatus) -> Self {
        match status {
            AppointmentStatus::Scheduled => Self::Scheduled,
            AppointmentStatus::Completed => Self::Completed,
            AppointmentStatus::Cancelled => Self::Cancelled,
        }
    }
}

fn offering_from_entity(
    kind: dao::appointment::OfferingKindEntity,
    id: Uuid,
) -> OfferingRef {
    match kind {
        dao::appointment::OfferingKindEntity::Service => OfferingRef::Service(id),
        dao::appointment::OfferingKindEntity::Combo => OfferingRef::Combo(id),
    }
}

fn offering_kind_entity(offering: OfferingRef) -> dao::appointment::OfferingKindEntity {
    match offering {
        OfferingRef::Service(_) => dao::appointment::OfferingKindEntity::Service,
        OfferingRef::Combo(_) => dao::appointment::OfferingKindEntity::Combo,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Appointment {
    pub id: Uuid,
    pub client_id: Uuid,
    pub employee_id: Uuid,
    pub offering: OfferingRef,
    pub date: Date,
    pub start: Time,
    pub end: Time,
    pub status: AppointmentStatus,
    pub created: Option<PrimitiveDateTime>,
    pub deleted: Option<PrimitiveDateTime>,
    pub version: Uuid,
}
impl From<&dao::appointment::AppointmentEntity> for Appointment {
    fn from(appointment: &dao::appointment::AppointmentEntity) -> Self {
        Self {
            id: appointment.id,
            client_id: appointment.client_id,
            employee_id: appointment.employee_id,
            offering: offering_from_entity(appointment.offering_kind, appointment.offering_id),
            date: appointment.date,
            start: appointment.start,
            end: appointment.end,
            status: appointment.status.into(),
            created: Some(appointment.created),
            deleted: appointment.deleted,
            version: appointment.version,
        }
    }
}
derive_from_reference!(dao::appointment::AppointmentEntity, Appointment);

impl TryFrom<&Appointment> for dao::appointment::AppointmentEntity {
    type Error = ServiceError;
    fn try_from(appointment: &Appointment) -> Result<Self, Self::Error> {
        Ok(Self {
            id: appointment.id,
            client_id: appointment.client_id,
            employee_id: appointment.employee_id,
            offering_kind: offering_kind_entity(appointment.offering),
            offering_id: appointment.offering.id(),
            date: appointment.date,
            start: appointment.start,
            end: appointment.end,
            status: appointment.status.into(),
            created: appointment.created.ok_or(ServiceError::InternalError)?,
            deleted: appointment.deleted,
            version: appointment.version,
        })
    }
}

/// The occupancy view of an appointment list: the time ranges of every
/// non-cancelled appointment, minus an optional excluded id (so a
/// reschedule does not block itself).
pub fn blocking_intervals(appointments: &[Appointment], exclude: Option<Uuid>) -> Vec<TimeRange> {
    appointments
        .iter()
        .filter(|appointment| appointment.status != AppointmentStatus::Cancelled)
        .filter(|appointment| appointment.deleted.is_none())
        .filter(|appointment| Some(appointment.id) != exclude)
        .filter_map(|appointment| TimeRange::new(appointment.start, appointment.end).ok())
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingRequest {
    pub client_id: Uuid,
    pub offering: OfferingRef,
    pub employee: EmployeeChoice,
    pub date: Date,
    pub start: Time,
    /// Set during a reschedule: the appointment being replaced. It is
    /// excluded from occupancy and cancelled once the new booking exists.
    pub reschedule_of: Option<Uuid>,
}

/// `SlotTaken` is the recoverable "pick another slot" outcome, covering
/// both a genuinely blocked interval and the simulated booking race.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingOutcome {
    Booked(Appointment),
    SlotTaken,
}

#[automock(type Context=();)]
#[async_trait]
pub trait AppointmentService {
    type Context: Clone + PartialEq + Eq + Debug + Send + Sync + 'static;

    async fn get_for_day(
        &self,
        date: Date,
        context: Authentication<Self::Context>,
    ) -> Result<Arc<[Appointment]>, ServiceError>;

    /// Non-cancelled appointments blocking the employee on the date.
    async fn occupied_for(
        &self,
        employee_id: Uuid,
        date: Date,
        exclude_appointment: Option<Uuid>,
        context: Authentication<Self::Context>,
    ) -> Result<Arc<[Appointment]>, ServiceError>;

    async fn book(
        &self,
        request: &BookingRequest,
        context: Authentication<Self::Context>,
    ) -> Result<BookingOutcome, ServiceError>;

    async fn cancel(
        &self,
        id: Uuid,
        context: Authentication<Self::Context>,
    ) -> Result<(), ServiceError>;

    async fn complete(
        &self,
        id: Uuid,
        context: Authentication<Self::Context>,
    ) -> Result<(), ServiceError>;
}
