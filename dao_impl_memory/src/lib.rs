//! In-memory DAO implementations. Each store keeps its rows in a
//! `tokio::sync::RwLock<Vec<_>>` and can be pre-seeded through
//! `with_rows`, which is how the binary and the integration tests set up
//! their fixtures.

use std::sync::Arc;

use async_trait::async_trait;
use dao::{DaoError, PermissionDao, UserEntity};
use tokio::sync::RwLock;

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

/// One user-to-privilege grant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrivilegeRow {
    pub user: Arc<str>,
    pub privilege: Arc<str>,
}

pub struct PermissionDaoImpl {
    users: RwLock<Vec<UserEntity>>,
    grants: RwLock<Vec<PrivilegeRow>>,
}
impl PermissionDaoImpl {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(Vec::new()),
            grants: RwLock::new(Vec::new()),
        }
    }

    pub fn with_rows(
        users: impl IntoIterator<Item = UserEntity>,
        grants: impl IntoIterator<Item = PrivilegeRow>,
    ) -> Self {
        Self {
            users: RwLock::new(users.into_iter().collect()),
            grants: RwLock::new(grants.into_iter().collect()),
        }
    }
}
impl Default for PermissionDaoImpl {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PermissionDao for PermissionDaoImpl {
    async fn has_privilege(&self, user: &str, privilege: &str) -> Result<bool, DaoError> {
        Ok(self
            .grants
            .read()
            .await
            .iter()
            .any(|grant| grant.user.as_ref() == user && grant.privilege.as_ref() == privilege))
    }

    async fn find_user(&self, username: &str) -> Result<Option<UserEntity>, DaoError> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .find(|user| user.name.as_ref() == username)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_privilege_lookup() {
        let dao = PermissionDaoImpl::with_rows(
            [UserEntity {
                name: "ana".into(),
            }],
            [PrivilegeRow {
                user: "ana".into(),
                privilege: "cashier".into(),
            }],
        );
        assert!(dao.has_privilege("ana", "cashier").await.unwrap());
        assert!(!dao.has_privilege("ana", "admin").await.unwrap());
        assert!(dao.find_user("ana").await.unwrap().is_some());
        assert!(dao.find_user("bruno").await.unwrap().is_none());
    }
}
