use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use thiserror::Error;

pub mod appointment;
pub mod client;
pub mod client_package;
pub mod combo;
pub mod employee;
pub mod plan;
pub mod product;
pub mod sale;
pub mod service_offering;
pub mod voucher;

#[derive(Error, Debug)]
pub enum DaoError {
    #[error("Database query error: {0}")]
    DatabaseQueryError(#[from] Box<dyn std::error::Error + Send + Sync>),

    #[error("No entity with id {0} to update")]
    UpdateMissingEntity(uuid::Uuid),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserEntity {
    pub name: Arc<str>,
}

#[automock]
#[async_trait]
pub trait PermissionDao {
    async fn has_privilege(&self, user: &str, privilege: &str) -> Result<bool, DaoError>;
    async fn find_user(&self, username: &str) -> Result<Option<UserEntity>, DaoError>;
}
