use std::sync::Arc;

use async_trait::async_trait;
use service::permission::Authentication;
use service::ServiceError;

/// Fixed-user session source for single-terminal deployments. The outer
/// surface that would carry a real session is out of scope here, so the
/// operator account is wired in at startup.
pub struct UserServiceDev {
    username: Arc<str>,
}
impl UserServiceDev {
    pub fn new(username: Arc<str>) -> Self {
        Self { username }
    }
}

#[async_trait]
impl service::permission::UserService for UserServiceDev {
    async fn current_user(&self) -> Result<Arc<str>, ServiceError> {
        Ok(self.username.clone())
    }
}

pub struct PermissionServiceImpl<PermissionDao, UserService>
where
    PermissionDao: dao::PermissionDao + Send + Sync,
    UserService: service::permission::UserService + Send + Sync,
{
    permission_dao: Arc<PermissionDao>,
    user_service: Arc<UserService>,
}
impl<PermissionDao, UserService> PermissionServiceImpl<PermissionDao, UserService>
where
    PermissionDao: dao::PermissionDao + Send + Sync,
    UserService: service::permission::UserService + Send + Sync,
{
    pub fn new(permission_dao: Arc<PermissionDao>, user_service: Arc<UserService>) -> Self {
        Self {
            permission_dao,
            user_service,
        }
    }
}

#[async_trait]
impl<PermissionDao, UserService> service::PermissionService
    for PermissionServiceImpl<PermissionDao, UserService>
where
    PermissionDao: dao::PermissionDao + Send + Sync,
    UserService: service::permission::UserService + Send + Sync,
{
    type Context = ();

    async fn check_permission(
        &self,
        privilege: &str,
        context: Authentication<Self::Context>,
    ) -> Result<(), ServiceError> {
        match context {
            Authentication::Full => Ok(()),
            Authentication::Context(()) => {
                let current_user = self.user_service.current_user().await?;
                if self
                    .permission_dao
                    .has_privilege(current_user.as_ref(), privilege)
                    .await?
                {
                    Ok(())
                } else {
                    Err(ServiceError::Forbidden)
                }
            }
        }
    }

    async fn current_user(
        &self,
        _context: Authentication<Self::Context>,
    ) -> Result<Arc<str>, ServiceError> {
        self.user_service.current_user().await
    }
}
