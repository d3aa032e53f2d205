use crate::errors::ApiError;
use crate::handlers::common::{
    created_response, map_service_error, no_content_response, success_response, validate_input,
};
use crate::handlers::AppState;
use crate::services::AddToCartInput;
use axum::{
    extract::{Path, State},
    response::Response,
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AddToCartRequest {
    pub user_id: Uuid,
    pub service_id: Uuid,
    /// Units of the service; accumulates onto any existing cart entry
    #[validate(range(min = 1))]
    #[serde(default = "default_quantity")]
    pub quantity: i32,
}

fn default_quantity() -> i32 {
    1
}

/// Add a service to the cart (or bump its quantity)
#[utoipa::path(
    post,
    path = "/api/v1/cart",
    tag = "Cart",
    request_body = AddToCartRequest,
    responses(
        (status = 201, description = "Cart entry created or quantity incremented"),
        (status = 404, description = "User or service not found")
    )
)]
pub async fn add_to_cart(
    State(state): State<AppState>,
    Json(payload): Json<AddToCartRequest>,
) -> Result<Response, ApiError> {
    validate_input(&payload)?;

    let item = state
        .services
        .cart
        .add_to_cart(AddToCartInput {
            user_id: payload.user_id,
            service_id: payload.service_id,
            quantity: payload.quantity,
        })
        .await
        .map_err(map_service_error)?;

    Ok(created_response(item))
}

/// List a user's cart with live prices
#[utoipa::path(
    get,
    path = "/api/v1/cart/{user_id}",
    tag = "Cart",
    params(("user_id" = Uuid, Path, description = "Cart owner")),
    responses((status = 200, description = "Cart entries with live prices"))
)]
pub async fn view_cart(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let entries = state
        .services
        .cart
        .view_cart(user_id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(entries))
}

/// Remove one cart entry owned by the user
#[utoipa::path(
    delete,
    path = "/api/v1/cart/{user_id}/items/{cart_item_id}",
    tag = "Cart",
    params(
        ("user_id" = Uuid, Path, description = "Cart owner"),
        ("cart_item_id" = Uuid, Path, description = "Cart entry to remove")
    ),
    responses(
        (status = 204, description = "Entry removed"),
        (status = 404, description = "Entry not found for this user")
    )
)]
pub async fn remove_from_cart(
    State(state): State<AppState>,
    Path((user_id, cart_item_id)): Path<(Uuid, Uuid)>,
) -> Result<Response, ApiError> {
    state
        .services
        .cart
        .remove_from_cart(user_id, cart_item_id)
        .await
        .map_err(map_service_error)?;
    Ok(no_content_response())
}

pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(add_to_cart))
        .route("/:user_id", get(view_cart))
        .route("/:user_id/items/:cart_item_id", delete(remove_from_cart))
}
