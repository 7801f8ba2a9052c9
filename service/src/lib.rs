use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

pub mod appointment;
pub mod availability;
pub mod cart;
pub mod catalog;
pub mod client;
pub mod clock;
pub mod discount;
pub mod employee;
pub mod permission;
pub mod plan;
pub mod qualification;
pub mod random;
pub mod sale;
pub mod uuid_service;
pub mod work_schedule;

pub use permission::{Authentication, MockPermissionService, PermissionService};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationFailureItem {
    InvalidValue(Arc<str>),
    ModificationNotAllowed(Arc<str>),
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Database query error: {0}")]
    DatabaseQueryError(#[from] dao::DaoError),

    #[error("Forbidden")]
    Forbidden,

    #[error("Entity {0} not found")]
    EntityNotFound(Uuid),

    #[error("Entity not found: {0}")]
    EntityNotFoundGeneric(Arc<str>),

    #[error("Id must not be set on create")]
    IdSetOnCreate,

    #[error("Version must not be set on create")]
    VersionSetOnCreate,

    #[error("Validation error: {0:?}")]
    ValidationError(Arc<[ValidationFailureItem]>),

    #[error("Time order wrong: {0} must lie before {1}")]
    TimeOrderWrong(time::Time, time::Time),

    #[error("Internal error")]
    InternalError,
}

impl ServiceError {
    /// Single-item validation failure for the named field.
    pub fn invalid_value(field: &str) -> Self {
        ServiceError::ValidationError(Arc::new([ValidationFailureItem::InvalidValue(
            field.into(),
        )]))
    }

    pub fn modification_not_allowed(field: &str) -> Self {
        ServiceError::ValidationError(Arc::new([ValidationFailureItem::ModificationNotAllowed(
            field.into(),
        )]))
    }
}
