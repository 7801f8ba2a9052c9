use mockall::automock;
use uuid::Uuid;

/// Id generation behind a trait so tests can hand out known ids.
/// `usage` labels the call site, e.g. "sale-service::finalize id".
#[automock]
pub trait UuidService {
    fn new_uuid(&self, usage: &str) -> Uuid;
}
