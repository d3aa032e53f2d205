use crate::{
    entities::{category, service, Category, CategoryModel, City, CityModel, Service, ServiceModel},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Timeslots offered for every service. Availability computation is an
/// external concern; the list is static.
pub const AVAILABLE_TIMESLOTS: [&str; 4] = ["10:00 AM", "12:00 PM", "3:00 PM", "5:00 PM"];

/// Read-mostly catalog: cities, categories, and the services they contain.
#[derive(Clone)]
pub struct CatalogService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

impl CatalogService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    pub async fn list_cities(&self) -> Result<Vec<CityModel>, ServiceError> {
        Ok(City::find()
            .order_by_asc(crate::entities::city::Column::Name)
            .all(&*self.db)
            .await?)
    }

    pub async fn list_categories(&self) -> Result<Vec<CategoryModel>, ServiceError> {
        Ok(Category::find()
            .order_by_asc(category::Column::Name)
            .all(&*self.db)
            .await?)
    }

    /// Services in one category. An unknown category yields an empty list
    /// rather than an error.
    pub async fn services_by_category(
        &self,
        category_id: Uuid,
    ) -> Result<Vec<ServiceModel>, ServiceError> {
        Ok(Service::find()
            .filter(service::Column::CategoryId.eq(category_id))
            .order_by_asc(service::Column::Name)
            .all(&*self.db)
            .await?)
    }

    pub async fn get_service(&self, service_id: Uuid) -> Result<ServiceModel, ServiceError> {
        Service::find_by_id(service_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Service {} not found", service_id)))
    }

    /// Timeslot labels for a service on a given date. The date only gates
    /// input validity; the slot list itself is fixed.
    pub async fn list_timeslots(
        &self,
        service_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<String>, ServiceError> {
        // Existence check keeps the contract symmetric with get_service
        self.get_service(service_id).await?;
        tracing::debug!(%service_id, %date, "listing timeslots");
        Ok(AVAILABLE_TIMESLOTS.iter().map(|s| s.to_string()).collect())
    }

    /// Admin surface: add a service to the catalog.
    #[instrument(skip(self))]
    pub async fn create_service(
        &self,
        input: CreateServiceInput,
    ) -> Result<ServiceModel, ServiceError> {
        Category::find_by_id(input.category_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Category {} not found", input.category_id))
            })?;

        let service = service::ActiveModel {
            id: Set(Uuid::new_v4()),
            category_id: Set(input.category_id),
            name: Set(input.name),
            price: Set(input.price),
            duration: Set(input.duration),
            description: Set(input.description),
        };

        let service = service.insert(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::ServiceCreated(service.id))
            .await;

        info!("Created service {} ({})", service.id, service.name);
        Ok(service)
    }
}

/// Input for creating a catalog service
#[derive(Debug, Deserialize)]
pub struct CreateServiceInput {
    pub category_id: Uuid,
    pub name: String,
    pub price: Decimal,
    pub duration: String,
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeslot_list_is_static() {
        assert_eq!(AVAILABLE_TIMESLOTS.len(), 4);
        assert_eq!(AVAILABLE_TIMESLOTS[0], "10:00 AM");
        assert_eq!(AVAILABLE_TIMESLOTS[3], "5:00 PM");
    }
}
