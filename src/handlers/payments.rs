use crate::entities::PaymentMethod;
use crate::errors::ApiError;
use crate::handlers::common::{map_service_error, success_response, validate_input};
use crate::handlers::AppState;
use crate::services::InitiatePaymentInput;
use axum::{
    extract::{Path, State},
    response::Response,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct InitiatePaymentRequest {
    /// Public booking code, e.g. "YM483920"
    #[validate(length(min = 1, max = 20))]
    pub booking_code: String,
    /// Payment method: UPI, Card, or Cash
    #[schema(value_type = String, example = "UPI")]
    pub method: PaymentMethod,
}

/// Initiate (and settle) payment for a booking
#[utoipa::path(
    post,
    path = "/api/v1/payments",
    tag = "Payments",
    request_body = InitiatePaymentRequest,
    responses(
        (status = 200, description = "Payment settled, receipt returned"),
        (status = 404, description = "Booking not found")
    )
)]
pub async fn initiate_payment(
    State(state): State<AppState>,
    Json(payload): Json<InitiatePaymentRequest>,
) -> Result<Response, ApiError> {
    validate_input(&payload)?;

    let receipt = state
        .services
        .payments
        .initiate_payment(InitiatePaymentInput {
            booking_code: payload.booking_code,
            method: payload.method,
        })
        .await
        .map_err(map_service_error)?;

    Ok(success_response(receipt))
}

/// Fetch the payment recorded against a booking code
#[utoipa::path(
    get,
    path = "/api/v1/payments/{booking_code}",
    tag = "Payments",
    params(("booking_code" = String, Path, description = "Public booking code")),
    responses(
        (status = 200, description = "Payment record"),
        (status = 404, description = "Booking or payment not found")
    )
)]
pub async fn get_payment_status(
    State(state): State<AppState>,
    Path(booking_code): Path<String>,
) -> Result<Response, ApiError> {
    let payment = state
        .services
        .payments
        .get_payment_status(&booking_code)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(payment))
}

pub fn payment_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(initiate_payment))
        .route("/:booking_code", get(get_payment_status))
}
