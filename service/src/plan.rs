use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use time::{Date, PrimitiveDateTime};
use trimly_utils::derive_from_reference;
use uuid::Uuid;

use crate::permission::Authentication;
use crate::ServiceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanEntitlement {
    pub service_id: Uuid,
    pub quantity: u32,
}
impl From<&dao::plan::PlanEntitlementEntity> for PlanEntitlement {
    fn from(entitlement: &dao::plan::PlanEntitlementEntity) -> Self {
        Self {
            service_id: entitlement.service_id,
            quantity: entitlement.quantity,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub id: Uuid,
    pub name: Arc<str>,
    pub price_cents: i64,
    pub validity_days: u16,
    pub entitlements: Arc<[PlanEntitlement]>,
    pub deleted: Option<PrimitiveDateTime>,
    pub version: Uuid,
}
impl Plan {
    pub fn entitlement_for(&self, service_id: Uuid) -> u32 {
        self.entitlements
            .iter()
            .find(|entitlement| entitlement.service_id == service_id)
            .map(|entitlement| entitlement.quantity)
            .unwrap_or(0)
    }
}
impl From<&dao::plan::PlanEntity> for Plan {
    fn from(plan: &dao::plan::PlanEntity) -> Self {
        Self {
            id: plan.id,
            name: plan.name.clone(),
            price_cents: plan.price_cents,
            validity_days: plan.validity_days,
            entitlements: plan.entitlements.iter().map(PlanEntitlement::from).collect(),
            deleted: plan.deleted,
            version: plan.version,
        }
    }
}
derive_from_reference!(dao::plan::PlanEntity, Plan);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageStatus {
    Pending,
    Active,
    Overdue,
    Expired,
    Cancelled,
}
impl PackageStatus {
    /// Active and Overdue packages still grant plan credit; an overdue
    /// payment does not cut the client off immediately.
    pub fn grants_credit(&self) -> bool {
        matches!(self, PackageStatus::Active | PackageStatus::Overdue)
    }
}
impl From<dao::client_package::PackageStatusEntity> for PackageStatus {
    fn from(status: dao::client_package::PackageStatusEntity) -> Self {
        match status {
            dao::client_package::PackageStatusEntity::Pending => Self::Pending,
            dao::client_package::PackageStatusEntity::Active => Self::Active,
            dao::client_package::PackageStatusEntity::Overdue => Self::Overdue,
            dao::client_package::PackageStatusEntity::Expired => Self::Expired,
            dao::client_package::PackageStatusEntity::Cancelled => Self::Cancelled,
        }
    }
}
impl From<PackageStatus> for dao::client_package::PackageStatusEntity {
    fn from(status: PackageStatus) -> Self {
        match status {
            PackageStatus::Pending => Self::Pending,
            PackageStatus::Active => Self::Active,
            PackageStatus::Overdue => Self::Overdue,
            PackageStatus::Expired => Self::Expired,
            PackageStatus::Cancelled => Self::Cancelled,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientPackage {
    pub id: Uuid,
    pub client_id: Uuid,
    pub plan_id: Uuid,
    pub status: PackageStatus,
    pub activated_on: Date,
    pub expires_on: Date,
    pub renews_on: Option<Date>,
    pub recurring: bool,
    pub created: Option<PrimitiveDateTime>,
    pub deleted: Option<PrimitiveDateTime>,
    pub version: Uuid,
}
impl From<&dao::client_package::ClientPackageEntity> for ClientPackage {
    fn from(package: &dao::client_package::ClientPackageEntity) -> Self {
        Self {
            id: package.id,
            client_id: package.client_id,
            plan_id: package.plan_id,
            status: package.status.into(),
            activated_on: package.activated_on,
            expires_on: package.expires_on,
            renews_on: package.renews_on,
            recurring: package.recurring,
            created: Some(package.created),
            deleted: package.deleted,
            version: package.version,
        }
    }
}
derive_from_reference!(dao::client_package::ClientPackageEntity, ClientPackage);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanUsage {
    pub service_id: Uuid,
    pub used: u32,
}
impl From<&dao::client_package::PlanUsageEntity> for PlanUsage {
    fn from(usage: &dao::client_package::PlanUsageEntity) -> Self {
        Self {
            service_id: usage.service_id,
            used: usage.used,
        }
    }
}

/// Remaining entitlement of one service under a client's active package.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanCredit {
    pub entitlement: u32,
    pub used: u32,
}
impl PlanCredit {
    pub fn none() -> Self {
        Self {
            entitlement: 0,
            used: 0,
        }
    }

    pub fn remaining(&self) -> u32 {
        self.entitlement.saturating_sub(self.used)
    }

    pub fn has_credit(&self) -> bool {
        self.remaining() > 0
    }
}

#[automock(type Context=();)]
#[async_trait]
pub trait ClientPackageService {
    type Context: Clone + PartialEq + Eq + Debug + Send + Sync + 'static;

    async fn get_plans(
        &self,
        context: Authentication<Self::Context>,
    ) -> Result<Arc<[Plan]>, ServiceError>;
    async fn get_plan(
        &self,
        id: Uuid,
        context: Authentication<Self::Context>,
    ) -> Result<Plan, ServiceError>;

    /// The client's Active or Overdue package, if any. At most one is
    /// meaningful at a time; activating a new package supersedes it.
    async fn active_package(
        &self,
        client_id: Uuid,
        context: Authentication<Self::Context>,
    ) -> Result<Option<ClientPackage>, ServiceError>;

    async fn usage_for(
        &self,
        client_id: Uuid,
        context: Authentication<Self::Context>,
    ) -> Result<Arc<[PlanUsage]>, ServiceError>;

    /// Remaining credit for one service; zero for clients without an
    /// active package or plans without an entitlement for the service.
    async fn credit_for(
        &self,
        client_id: Uuid,
        service_id: Uuid,
        context: Authentication<Self::Context>,
    ) -> Result<PlanCredit, ServiceError>;

    /// Creates a fresh Active package, supersedes prior Active/Overdue
    /// packages of the client and resets their plan usage to empty.
    async fn activate(
        &self,
        client_id: Uuid,
        plan_id: Uuid,
        recurring: bool,
        context: Authentication<Self::Context>,
    ) -> Result<ClientPackage, ServiceError>;

    /// Consumes credit. Fails if the remaining entitlement does not cover
    /// the quantity; usage never exceeds the entitlement.
    async fn debit(
        &self,
        client_id: Uuid,
        service_id: Uuid,
        quantity: u32,
        context: Authentication<Self::Context>,
    ) -> Result<(), ServiceError>;
}
