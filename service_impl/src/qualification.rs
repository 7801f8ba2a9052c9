use std::sync::Arc;

use async_trait::async_trait;
use service::employee::Employee;
use service::permission::Authentication;
use service::qualification::is_qualified;
use service::ServiceError;

pub struct QualificationServiceImpl<EmployeeService>
where
    EmployeeService: service::employee::EmployeeService + Send + Sync,
{
    employee_service: Arc<EmployeeService>,
}
impl<EmployeeService> QualificationServiceImpl<EmployeeService>
where
    EmployeeService: service::employee::EmployeeService + Send + Sync,
{
    pub fn new(employee_service: Arc<EmployeeService>) -> Self {
        Self { employee_service }
    }
}

#[async_trait]
impl<EmployeeService> service::qualification::QualificationService
    for QualificationServiceImpl<EmployeeService>
where
    EmployeeService: service::employee::EmployeeService + Send + Sync,
{
    type Context = EmployeeService::Context;

    async fn qualified_employees(
        &self,
        required: Arc<[Arc<str>]>,
        context: Authentication<Self::Context>,
    ) -> Result<Arc<[Employee]>, ServiceError> {
        Ok(self
            .employee_service
            .get_all(context)
            .await?
            .iter()
            .filter(|employee| is_qualified(employee, &required))
            .cloned()
            .collect())
    }
}
