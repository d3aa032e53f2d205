use crate::errors::ApiError;
use crate::handlers::common::{map_service_error, success_response};
use crate::handlers::AppState;
use axum::{extract::State, response::Response, routing::get, Router};

/// List every registered user
#[utoipa::path(
    get,
    path = "/api/v1/admin/users",
    tag = "Admin",
    responses((status = 200, description = "All registered users"))
)]
pub async fn list_users(State(state): State<AppState>) -> Result<Response, ApiError> {
    let users = state
        .services
        .users
        .list_users()
        .await
        .map_err(map_service_error)?;
    Ok(success_response(users))
}

/// List every booking on the platform, newest first
#[utoipa::path(
    get,
    path = "/api/v1/admin/bookings",
    tag = "Admin",
    responses((status = 200, description = "All bookings, newest first"))
)]
pub async fn list_all_bookings(State(state): State<AppState>) -> Result<Response, ApiError> {
    let bookings = state
        .services
        .bookings
        .list_all_bookings()
        .await
        .map_err(map_service_error)?;
    Ok(success_response(bookings))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/bookings", get(list_all_bookings))
}
