use std::sync::Arc;

use async_trait::async_trait;
use service::catalog::{Combo, OfferingRef, Product, ResolvedOffering, ServiceOffering};
use service::permission::{Authentication, CASHIER_PRIVILEGE, FRONTDESK_PRIVILEGE};
use service::ServiceError;
use uuid::Uuid;

pub struct CatalogServiceImpl<ServiceOfferingDao, ComboDao, ProductDao, PermissionService>
where
    ServiceOfferingDao: dao::service_offering::ServiceOfferingDao + Send + Sync,
    ComboDao: dao::combo::ComboDao + Send + Sync,
    ProductDao: dao::product::ProductDao + Send + Sync,
    PermissionService: service::PermissionService + Send + Sync,
{
    service_offering_dao: Arc<ServiceOfferingDao>,
    combo_dao: Arc<ComboDao>,
    product_dao: Arc<ProductDao>,
    permission_service: Arc<PermissionService>,
}
impl<ServiceOfferingDao, ComboDao, ProductDao, PermissionService>
    CatalogServiceImpl<ServiceOfferingDao, ComboDao, ProductDao, PermissionService>
where
    ServiceOfferingDao: dao::service_offering::ServiceOfferingDao + Send + Sync,
    ComboDao: dao::combo::ComboDao + Send + Sync,
    ProductDao: dao::product::ProductDao + Send + Sync,
    PermissionService: service::PermissionService + Send + Sync,
{
    pub fn new(
        service_offering_dao: Arc<ServiceOfferingDao>,
        combo_dao: Arc<ComboDao>,
        product_dao: Arc<ProductDao>,
        permission_service: Arc<PermissionService>,
    ) -> Self {
        Self {
            service_offering_dao,
            combo_dao,
            product_dao,
            permission_service,
        }
    }
}

#[async_trait]
impl<ServiceOfferingDao, ComboDao, ProductDao, PermissionService> service::catalog::CatalogService
    for CatalogServiceImpl<ServiceOfferingDao, ComboDao, ProductDao, PermissionService>
where
    ServiceOfferingDao: dao::service_offering::ServiceOfferingDao + Send + Sync,
    ComboDao: dao::combo::ComboDao + Send + Sync,
    ProductDao: dao::product::ProductDao + Send + Sync,
    PermissionService: service::PermissionService + Send + Sync,
{
    type Context = PermissionService::Context;

    async fn get_services(
        &self,
        context: Authentication<Self::Context>,
    ) -> Result<Arc<[ServiceOffering]>, ServiceError> {
        self.permission_service
            .check_permission(FRONTDESK_PRIVILEGE, context)
            .await?;
        Ok(self
            .service_offering_dao
            .all()
            .await?
            .iter()
            .filter(|service| service.deleted.is_none())
            .map(ServiceOffering::from)
            .collect())
    }

    async fn get_service(
        &self,
        id: Uuid,
        context: Authentication<Self::Context>,
    ) -> Result<ServiceOffering, ServiceError> {
        self.permission_service
            .check_permission(FRONTDESK_PRIVILEGE, context)
            .await?;
        let entity = self
            .service_offering_dao
            .find_by_id(id)
            .await?
            .ok_or(ServiceError::EntityNotFound(id))?;
        if entity.deleted.is_some() {
            return Err(ServiceError::EntityNotFound(id));
        }
        Ok(ServiceOffering::from(&entity))
    }

    async fn get_combos(
        &self,
        context: Authentication<Self::Context>,
    ) -> Result<Arc<[Combo]>, ServiceError> {
        self.permission_service
            .check_permission(FRONTDESK_PRIVILEGE, context)
            .await?;
        Ok(self
            .combo_dao
            .all()
            .await?
            .iter()
            .filter(|combo| combo.deleted.is_none())
            .map(Combo::from)
            .collect())
    }

    async fn get_combo(
        &self,
        id: Uuid,
        context: Authentication<Self::Context>,
    ) -> Result<Combo, ServiceError> {
        self.permission_service
            .check_permission(FRONTDESK_PRIVILEGE, context)
            .await?;
        let entity = self
            .combo_dao
            .find_by_id(id)
            .await?
            .ok_or(ServiceError::EntityNotFound(id))?;
        if entity.deleted.is_some() {
            return Err(ServiceError::EntityNotFound(id));
        }
        Ok(Combo::from(&entity))
    }

    async fn get_products(
        &self,
        context: Authentication<Self::Context>,
    ) -> Result<Arc<[Product]>, ServiceError> {
        self.permission_service
            .check_permission(CASHIER_PRIVILEGE, context)
            .await?;
        Ok(self
            .product_dao
            .all()
            .await?
            .iter()
            .filter(|product| product.deleted.is_none())
            .map(Product::from)
            .collect())
    }

    async fn get_product(
        &self,
        id: Uuid,
        context: Authentication<Self::Context>,
    ) -> Result<Product, ServiceError> {
        self.permission_service
            .check_permission(CASHIER_PRIVILEGE, context)
            .await?;
        let entity = self
            .product_dao
            .find_by_id(id)
            .await?
            .ok_or(ServiceError::EntityNotFound(id))?;
        if entity.deleted.is_some() {
            return Err(ServiceError::EntityNotFound(id));
        }
        Ok(Product::from(&entity))
    }

    async fn resolve(
        &self,
        offering: OfferingRef,
        context: Authentication<Self::Context>,
    ) -> Result<ResolvedOffering, ServiceError> {
        match offering {
            OfferingRef::Service(id) => {
                let offering_entity = self.get_service(id, context).await?;
                Ok(ResolvedOffering {
                    offering,
                    name: offering_entity.name.clone(),
                    duration_minutes: offering_entity.duration_minutes,
                    price_cents: offering_entity.price_cents,
                    required_specialties: offering_entity.required_specialties.clone(),
                    service_ids: Arc::new([id]),
                })
            }
            OfferingRef::Combo(id) => {
                let combo = self.get_combo(id, context.clone()).await?;
                let mut duration_minutes: u16 = 0;
                let mut required_specialties: Vec<Arc<str>> = Vec::new();
                for service_id in combo.service_ids.iter() {
                    let member = self.get_service(*service_id, context.clone()).await?;
                    duration_minutes += member.duration_minutes;
                    for tag in member.required_specialties.iter() {
                        if !required_specialties.contains(tag) {
                            required_specialties.push(tag.clone());
                        }
                    }
                }
                Ok(ResolvedOffering {
                    offering,
                    name: combo.name.clone(),
                    duration_minutes,
                    price_cents: combo.price_cents,
                    required_specialties: required_specialties.into(),
                    service_ids: combo.service_ids.clone(),
                })
            }
        }
    }
}
