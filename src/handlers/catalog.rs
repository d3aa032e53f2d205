use crate::handlers::common::{created_response, map_service_error, success_response, validate_input};
use crate::handlers::AppState;
use crate::errors::ApiError;
use crate::services::CreateServiceInput;
use axum::{
    extract::{Path, Query, State},
    response::Response,
    routing::{get, post},
    Router,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateServiceRequest {
    /// Category the service belongs to
    pub category_id: Uuid,
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    /// Price per unit in the platform currency
    #[schema(example = "499.00")]
    pub price: Decimal,
    /// Human-readable duration, e.g. "2 hrs"
    #[validate(length(min = 1, max = 50))]
    pub duration: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct TimeslotsQuery {
    /// Service date, ISO 8601 (YYYY-MM-DD); missing or malformed dates
    /// are rejected before the catalog is consulted
    pub date: NaiveDate,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TimeslotsResponse {
    pub service_id: Uuid,
    pub date: NaiveDate,
    pub timeslots: Vec<String>,
}

/// List all serviceable cities
#[utoipa::path(
    get,
    path = "/api/v1/cities",
    tag = "Catalog",
    responses((status = 200, description = "Cities available for service"))
)]
pub async fn list_cities(State(state): State<AppState>) -> Result<Response, ApiError> {
    let cities = state
        .services
        .catalog
        .list_cities()
        .await
        .map_err(map_service_error)?;
    Ok(success_response(cities))
}

/// List all service categories
#[utoipa::path(
    get,
    path = "/api/v1/categories",
    tag = "Catalog",
    responses((status = 200, description = "Service categories"))
)]
pub async fn list_categories(State(state): State<AppState>) -> Result<Response, ApiError> {
    let categories = state
        .services
        .catalog
        .list_categories()
        .await
        .map_err(map_service_error)?;
    Ok(success_response(categories))
}

/// List services within a category
#[utoipa::path(
    get,
    path = "/api/v1/categories/{category_id}/services",
    tag = "Catalog",
    params(("category_id" = Uuid, Path, description = "Category id")),
    responses((status = 200, description = "Services in the category"))
)]
pub async fn list_services(
    State(state): State<AppState>,
    Path(category_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let services = state
        .services
        .catalog
        .services_by_category(category_id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(services))
}

/// Fetch a single service
#[utoipa::path(
    get,
    path = "/api/v1/services/{service_id}",
    tag = "Catalog",
    params(("service_id" = Uuid, Path, description = "Service id")),
    responses(
        (status = 200, description = "Service details"),
        (status = 404, description = "Service not found")
    )
)]
pub async fn get_service(
    State(state): State<AppState>,
    Path(service_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let service = state
        .services
        .catalog
        .get_service(service_id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(service))
}

/// List bookable timeslots for a service
#[utoipa::path(
    get,
    path = "/api/v1/services/{service_id}/timeslots",
    tag = "Catalog",
    params(
        ("service_id" = Uuid, Path, description = "Service id"),
        TimeslotsQuery
    ),
    responses(
        (status = 200, description = "Timeslot labels", body = TimeslotsResponse),
        (status = 400, description = "Missing or malformed date"),
        (status = 404, description = "Service not found")
    )
)]
pub async fn list_timeslots(
    State(state): State<AppState>,
    Path(service_id): Path<Uuid>,
    Query(query): Query<TimeslotsQuery>,
) -> Result<Response, ApiError> {
    let timeslots = state
        .services
        .catalog
        .list_timeslots(service_id, query.date)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(TimeslotsResponse {
        service_id,
        date: query.date,
        timeslots,
    }))
}

/// Create a catalog service (admin)
#[utoipa::path(
    post,
    path = "/api/v1/services",
    tag = "Catalog",
    request_body = CreateServiceRequest,
    responses(
        (status = 201, description = "Service created"),
        (status = 404, description = "Category not found")
    )
)]
pub async fn create_service(
    State(state): State<AppState>,
    axum::Json(payload): axum::Json<CreateServiceRequest>,
) -> Result<Response, ApiError> {
    validate_input(&payload)?;

    let service = state
        .services
        .catalog
        .create_service(CreateServiceInput {
            category_id: payload.category_id,
            name: payload.name,
            price: payload.price,
            duration: payload.duration,
            description: payload.description,
        })
        .await
        .map_err(map_service_error)?;

    Ok(created_response(service))
}

pub fn city_routes() -> Router<AppState> {
    Router::new().route("/", get(list_cities))
}

pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_categories))
        .route("/:category_id/services", get(list_services))
}

pub fn service_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_service))
        .route("/:service_id", get(get_service))
        .route("/:service_id/timeslots", get(list_timeslots))
}
