use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use time::{PrimitiveDateTime, Time, Weekday};
use uuid::Uuid;

use crate::DaoError;

/// One weekday of an employee's weekly schedule. `active == false` means
/// the employee does not work that day regardless of the stored times.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DayScheduleEntity {
    pub weekday: Weekday,
    pub active: bool,
    pub start: Time,
    pub end: Time,
    pub break_start: Option<Time>,
    pub break_end: Option<Time>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmployeeEntity {
    pub id: Uuid,
    pub name: Arc<str>,
    pub specialties: Arc<[Arc<str>]>,
    pub schedule: Arc<[DayScheduleEntity]>,
    pub deleted: Option<PrimitiveDateTime>,
    pub version: Uuid,
}

#[automock]
#[async_trait]
pub trait EmployeeDao {
    async fn all(&self) -> Result<Arc<[EmployeeEntity]>, DaoError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<EmployeeEntity>, DaoError>;
    async fn create(&self, entity: &EmployeeEntity, process: &str) -> Result<(), DaoError>;
    async fn update(&self, entity: &EmployeeEntity, process: &str) -> Result<(), DaoError>;
}
