use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use time::PrimitiveDateTime;
use trimly_utils::derive_from_reference;
use uuid::Uuid;

use crate::permission::Authentication;
use crate::ServiceError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceOffering {
    pub id: Uuid,
    pub name: Arc<str>,
    pub duration_minutes: u16,
    pub price_cents: i64,
    pub required_specialties: Arc<[Arc<str>]>,
    pub deleted: Option<PrimitiveDateTime>,
    pub version: Uuid,
}
impl From<&dao::service_offering::ServiceOfferingEntity> for ServiceOffering {
    fn from(service: &dao::service_offering::ServiceOfferingEntity) -> Self {
        Self {
            id: service.id,
            name: service.name.clone(),
            duration_minutes: service.duration_minutes,
            price_cents: service.price_cents,
            required_specialties: service.required_specialties.clone(),
            deleted: service.deleted,
            version: service.version,
        }
    }
}
derive_from_reference!(dao::service_offering::ServiceOfferingEntity, ServiceOffering);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Combo {
    pub id: Uuid,
    pub name: Arc<str>,
    pub service_ids: Arc<[Uuid]>,
    pub price_cents: i64,
    pub deleted: Option<PrimitiveDateTime>,
    pub version: Uuid,
}
impl From<&dao::combo::ComboEntity> for Combo {
    fn from(combo: &dao::combo::ComboEntity) -> Self {
        Self {
            id: combo.id,
            name: combo.name.clone(),
            service_ids: combo.service_ids.clone(),
            price_cents: combo.price_cents,
            deleted: combo.deleted,
            version: combo.version,
        }
    }
}
derive_from_reference!(dao::combo::ComboEntity, Combo);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub id: Uuid,
    pub name: Arc<str>,
    pub price_cents: i64,
    pub deleted: Option<PrimitiveDateTime>,
    pub version: Uuid,
}
impl From<&dao::product::ProductEntity> for Product {
    fn from(product: &dao::product::ProductEntity) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            price_cents: product.price_cents,
            deleted: product.deleted,
            version: product.version,
        }
    }
}
derive_from_reference!(dao::product::ProductEntity, Product);

/// Reference to a bookable offering, either a single service or a combo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfferingRef {
    Service(Uuid),
    Combo(Uuid),
}
impl OfferingRef {
    pub fn id(&self) -> Uuid {
        match self {
            OfferingRef::Service(id) | OfferingRef::Combo(id) => *id,
        }
    }
}

/// A service or combo flattened into the shape scheduling and the cart
/// need. Combo duration is the sum of the member durations, the required
/// specialties are the union of the member requirements, and the price is
/// the combo's own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOffering {
    pub offering: OfferingRef,
    pub name: Arc<str>,
    pub duration_minutes: u16,
    pub price_cents: i64,
    pub required_specialties: Arc<[Arc<str>]>,
    pub service_ids: Arc<[Uuid]>,
}

#[automock(type Context=();)]
#[async_trait]
pub trait CatalogService {
    type Context: Clone + PartialEq + Eq + Debug + Send + Sync + 'static;

    async fn get_services(
        &self,
        context: Authentication<Self::Context>,
    ) -> Result<Arc<[ServiceOffering]>, ServiceError>;
    async fn get_service(
        &self,
        id: Uuid,
        context: Authentication<Self::Context>,
    ) -> Result<ServiceOffering, ServiceError>;
    async fn get_combos(
        &self,
        context: Authentication<Self::Context>,
    ) -> Result<Arc<[Combo]>, ServiceError>;
    async fn get_combo(
        &self,
        id: Uuid,
        context: Authentication<Self::Context>,
    ) -> Result<Combo, ServiceError>;
    async fn get_products(
        &self,
        context: Authentication<Self::Context>,
    ) -> Result<Arc<[Product]>, ServiceError>;
    async fn get_product(
        &self,
        id: Uuid,
        context: Authentication<Self::Context>,
    ) -> Result<Product, ServiceError>;
    async fn resolve(
        &self,
        offering: OfferingRef,
        context: Authentication<Self::Context>,
    ) -> Result<ResolvedOffering, ServiceError>;
}
