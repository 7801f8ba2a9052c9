use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;

use crate::ServiceError;

/// Scheduling screens: availability, booking, reschedule.
pub const FRONTDESK_PRIVILEGE: &str = "frontdesk";
/// Point-of-sale screens: cart, checkout, sales list.
pub const CASHIER_PRIVILEGE: &str = "cashier";
/// Roster and catalog administration.
pub const ADMIN_PRIVILEGE: &str = "admin";

#[derive(Debug, PartialEq, Eq)]
pub struct User {
    pub name: Arc<str>,
}
impl From<&dao::UserEntity> for User {
    fn from(user: &dao::UserEntity) -> Self {
        Self {
            name: user.name.clone(),
        }
    }
}

/// `Full` is for service-to-service calls which already passed a permission
/// check at the outer boundary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Authentication<Context: Clone + PartialEq + Eq + Send + Sync + Debug + 'static> {
    Full,
    Context(Context),
}
impl<Context: Clone + Debug + PartialEq + Eq + Send + Sync + 'static> From<Context>
    for Authentication<Context>
{
    fn from(context: Context) -> Self {
        Self::Context(context)
    }
}

#[automock]
#[async_trait]
pub trait UserService {
    async fn current_user(&self) -> Result<Arc<str>, ServiceError>;
}

#[automock(type Context=();)]
#[async_trait]
pub trait PermissionService {
    type Context: Clone + PartialEq + Eq + Debug + Send + Sync + 'static;

    async fn check_permission(
        &self,
        privilege: &str,
        context: Authentication<Self::Context>,
    ) -> Result<(), ServiceError>;

    async fn current_user(
        &self,
        context: Authentication<Self::Context>,
    ) -> Result<Arc<str>, ServiceError>;
}
