use std::sync::Arc;

use async_trait::async_trait;
use service::employee::Employee;
use service::permission::Authentication;
use service::ServiceError;
use uuid::Uuid;

pub struct EmployeeServiceImpl<EmployeeDao, PermissionService>
where
    EmployeeDao: dao::employee::EmployeeDao + Send + Sync,
    PermissionService: service::PermissionService + Send + Sync,
{
    employee_dao: Arc<EmployeeDao>,
    permission_service: Arc<PermissionService>,
}
impl<EmployeeDao, PermissionService> EmployeeServiceImpl<EmployeeDao, PermissionService>
where
    EmployeeDao: dao::employee::EmployeeDao + Send + Sync,
    PermissionService: service::PermissionService + Send + Sync,
{
    pub fn new(employee_dao: Arc<EmployeeDao>, permission_service: Arc<PermissionService>) -> Self {
        Self {
            employee_dao,
            permission_service,
        }
    }
}

#[async_trait]
impl<EmployeeDao, PermissionService> service::employee::EmployeeService
    for EmployeeServiceImpl<EmployeeDao, PermissionService>
where
    EmployeeDao: dao::employee::EmployeeDao + Send + Sync,
    PermissionService: service::PermissionService + Send + Sync,
{
    type Context = PermissionService::Context;

    async fn get_all(
        &self,
        context: Authentication<Self::Context>,
    ) -> Result<Arc<[Employee]>, ServiceError> {
        self.permission_service
            .check_permission(service::permission::FRONTDESK_PRIVILEGE, context)
            .await?;
        Ok(self
            .employee_dao
            .all()
            .await?
            .iter()
            .filter(|employee| employee.deleted.is_none())
            .map(Employee::from)
            .collect())
    }

    async fn get(
        &self,
        id: Uuid,
        context: Authentication<Self::Context>,
    ) -> Result<Employee, ServiceError> {
        self.permission_service
            .check_permission(service::permission::FRONTDESK_PRIVILEGE, context)
            .await?;
        let entity = self
            .employee_dao
            .find_by_id(id)
            .await?
            .ok_or(ServiceError::EntityNotFound(id))?;
        if entity.deleted.is_some() {
            return Err(ServiceError::EntityNotFound(id));
        }
        Ok(Employee::from(&entity))
    }

    async fn exists(
        &self,
        id: Uuid,
        context: Authentication<Self::Context>,
    ) -> Result<bool, ServiceError> {
        match self.get(id, context).await {
            Ok(_) => Ok(true),
            Err(ServiceError::EntityNotFound(_)) => Ok(false),
            Err(err) => Err(err),
        }
    }
}
