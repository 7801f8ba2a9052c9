use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use time::{Date, PrimitiveDateTime, Time};
use uuid::Uuid;

use crate::DaoError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppointmentStatusEntity {
    Scheduled,
    Completed,
    Cancelled,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OfferingKindEntity {
    Service,
    Combo,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppointmentEntity {
    pub id: Uuid,
    pub client_id: Uuid,
    pub employee_id: Uuid,
    pub offering_kind: OfferingKindEntity,
    pub offering_id: Uuid,
    pub date: Date,
    pub start: Time,
    pub end: Time,
    pub status: AppointmentStatusEntity,
    pub created: PrimitiveDateTime,
    pub deleted: Option<PrimitiveDateTime>,
    pub version: Uuid,
}

#[automock]
#[async_trait]
pub trait AppointmentDao {
    async fn all(&self) -> Result<Arc<[AppointmentEntity]>, DaoError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<AppointmentEntity>, DaoError>;
    async fn find_by_date(&self, date: Date) -> Result<Arc<[AppointmentEntity]>, DaoError>;
    async fn find_by_employee_and_date(
        &self,
        employee_id: Uuid,
        date: Date,
    ) -> Result<Arc<[AppointmentEntity]>, DaoError>;
    async fn create(&self, entity: &AppointmentEntity, process: &str) -> Result<(), DaoError>;
    async fn update(&self, entity: &AppointmentEntity, process: &str) -> Result<(), DaoError>;
}
