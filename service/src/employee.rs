use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use time::{PrimitiveDateTime, Time, Weekday};
use trimly_utils::derive_from_reference;
use uuid::Uuid;

use crate::permission::Authentication;
use crate::ServiceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DaySchedule {
    pub weekday: Weekday,
    pub active: bool,
    pub start: Time,
    pub end: Time,
    pub break_start: Option<Time>,
    pub break_end: Option<Time>,
}
impl From<&dao::employee::DayScheduleEntity> for DaySchedule {
    fn from(day: &dao::employee::DayScheduleEntity) -> Self {
        Self {
            weekday: day.weekday,
            active: day.active,
            start: day.start,
            end: day.end,
            break_start: day.break_start,
            break_end: day.break_end,
        }
    }
}
impl From<&DaySchedule> for dao::employee::DayScheduleEntity {
    fn from(day: &DaySchedule) -> Self {
        Self {
            weekday: day.weekday,
            active: day.active,
            start: day.start,
            end: day.end,
            break_start: day.break_start,
            break_end: day.break_end,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Employee {
    pub id: Uuid,
    pub name: Arc<str>,
    pub specialties: Arc<[Arc<str>]>,
    pub schedule: Arc<[DaySchedule]>,
    pub deleted: Option<PrimitiveDateTime>,
    pub version: Uuid,
}
impl From<&dao::employee::EmployeeEntity> for Employee {
    fn from(employee: &dao::employee::EmployeeEntity) -> Self {
        Self {
            id: employee.id,
            name: employee.name.clone(),
            specialties: employee.specialties.clone(),
            schedule: employee.schedule.iter().map(DaySchedule::from).collect(),
            deleted: employee.deleted,
            version: employee.version,
        }
    }
}
derive_from_reference!(dao::employee::EmployeeEntity, Employee);

impl From<&Employee> for dao::employee::EmployeeEntity {
    fn from(employee: &Employee) -> Self {
        Self {
            id: employee.id,
            name: employee.name.clone(),
            specialties: employee.specialties.clone(),
            schedule: employee
                .schedule
                .iter()
                .map(dao::employee::DayScheduleEntity::from)
                .collect(),
            deleted: employee.deleted,
            version: employee.version,
        }
    }
}

#[automock(type Context=();)]
#[async_trait]
pub trait EmployeeService {
    type Context: Clone + PartialEq + Eq + Debug + Send + Sync + 'static;

    async fn get_all(
        &self,
        context: Authentication<Self::Context>,
    ) -> Result<Arc<[Employee]>, ServiceError>;
    async fn get(
        &self,
        id: Uuid,
        context: Authentication<Self::Context>,
    ) -> Result<Employee, ServiceError>;
    async fn exists(
        &self,
        id: Uuid,
        context: Authentication<Self::Context>,
    ) -> Result<bool, ServiceError>;
}
