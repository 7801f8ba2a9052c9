use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;

use crate::employee::Employee;
use crate::permission::Authentication;
use crate::ServiceError;

/// An employee qualifies iff their specialty set is a superset of the
/// requirement. An empty requirement qualifies everyone.
pub fn is_qualified(employee: &Employee, required: &[Arc<str>]) -> bool {
    required
        .iter()
        .all(|tag| employee.specialties.iter().any(|specialty| specialty == tag))
}

#[automock(type Context=();)]
#[async_trait]
pub trait QualificationService {
    type Context: Clone + PartialEq + Eq + Debug + Send + Sync + 'static;

    /// The roster filtered to employees holding every required specialty.
    /// An empty result is a value ("cannot book"), not an error.
    async fn qualified_employees(
        &self,
        required: Arc<[Arc<str>]>,
        context: Authentication<Self::Context>,
    ) -> Result<Arc<[Employee]>, ServiceError>;
}
