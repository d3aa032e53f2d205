use crate::errors::ApiError;
use crate::handlers::common::{created_response, map_service_error, success_response, validate_input};
use crate::handlers::AppState;
use crate::services::ConfirmBookingInput;
use axum::{
    extract::{Path, State},
    response::Response,
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ConfirmBookingRequest {
    pub user_id: Uuid,
    /// Cart entries to convert; ids the user does not own are ignored
    #[validate(length(min = 1))]
    pub cart_item_ids: Vec<Uuid>,
    /// Service date, ISO 8601 (YYYY-MM-DD)
    pub date: NaiveDate,
    /// One of the advertised timeslot labels, e.g. "10:00 AM"
    #[validate(length(min = 1, max = 20))]
    pub timeslot: String,
    #[validate(length(min = 1, max = 1000))]
    pub address: String,
}

/// Confirm a booking from selected cart entries
#[utoipa::path(
    post,
    path = "/api/v1/bookings",
    tag = "Bookings",
    request_body = ConfirmBookingRequest,
    responses(
        (status = 201, description = "Booking confirmed with frozen line items"),
        (status = 400, description = "No valid cart items in the selection"),
        (status = 404, description = "User not found"),
        (status = 409, description = "Booking code collision, retry")
    )
)]
pub async fn confirm_booking(
    State(state): State<AppState>,
    Json(payload): Json<ConfirmBookingRequest>,
) -> Result<Response, ApiError> {
    validate_input(&payload)?;

    let booking = state
        .services
        .bookings
        .confirm_booking(ConfirmBookingInput {
            user_id: payload.user_id,
            cart_item_ids: payload.cart_item_ids,
            date: payload.date,
            timeslot: payload.timeslot,
            address: payload.address,
        })
        .await
        .map_err(map_service_error)?;

    Ok(created_response(booking))
}

/// A user's booking history, newest first
#[utoipa::path(
    get,
    path = "/api/v1/bookings/history/{user_id}",
    tag = "Bookings",
    params(("user_id" = Uuid, Path, description = "Booking owner")),
    responses((status = 200, description = "Bookings with line items, newest first"))
)]
pub async fn booking_history(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let history = state
        .services
        .bookings
        .booking_history(user_id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(history))
}

pub fn booking_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(confirm_booking))
        .route("/history/:user_id", get(booking_history))
}
