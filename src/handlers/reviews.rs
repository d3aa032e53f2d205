use crate::errors::ApiError;
use crate::handlers::common::{created_response, map_service_error, success_response, validate_input};
use crate::handlers::AppState;
use crate::services::SubmitRatingInput;
use axum::{
    extract::{Path, State},
    response::Response,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SubmitRatingRequest {
    #[validate(length(min = 1, max = 20))]
    pub booking_code: String,
    pub user_id: Uuid,
    /// Stars, 1 to 5 inclusive
    #[validate(range(min = 1, max = 5))]
    pub rating: i32,
    #[validate(length(max = 2000))]
    pub review_text: Option<String>,
}

/// Submit (or overwrite) a rating for a completed booking
#[utoipa::path(
    post,
    path = "/api/v1/reviews",
    tag = "Reviews",
    request_body = SubmitRatingRequest,
    responses(
        (status = 201, description = "Rating recorded"),
        (status = 400, description = "Booking not completed or rating out of range"),
        (status = 404, description = "Booking not found for this user")
    )
)]
pub async fn submit_rating(
    State(state): State<AppState>,
    Json(payload): Json<SubmitRatingRequest>,
) -> Result<Response, ApiError> {
    validate_input(&payload)?;

    let review = state
        .services
        .reviews
        .submit_rating(SubmitRatingInput {
            booking_code: payload.booking_code,
            user_id: payload.user_id,
            rating: payload.rating,
            review_text: payload.review_text,
        })
        .await
        .map_err(map_service_error)?;

    Ok(created_response(review))
}

/// Fetch the review recorded against a booking code
#[utoipa::path(
    get,
    path = "/api/v1/reviews/{booking_code}",
    tag = "Reviews",
    params(("booking_code" = String, Path, description = "Public booking code")),
    responses(
        (status = 200, description = "Review record"),
        (status = 404, description = "Booking or review not found")
    )
)]
pub async fn get_review(
    State(state): State<AppState>,
    Path(booking_code): Path<String>,
) -> Result<Response, ApiError> {
    let review = state
        .services
        .reviews
        .get_review(&booking_code)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(review))
}

pub fn review_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(submit_rating))
        .route("/:booking_code", get(get_review))
}
