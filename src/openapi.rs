use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HomeServe API",
        version = "1.0.0",
        description = r#"
# HomeServe Booking API

Backend for an at-home services marketplace: browse the service catalog,
build a cart, confirm bookings with a unique booking code, settle payments
through the simulated gateway, and rate completed bookings.

## Error Handling

Errors use a consistent envelope with appropriate HTTP status codes:

```json
{
  "error": "Not Found",
  "message": "Booking YM123456 not found",
  "timestamp": "2026-01-01T00:00:00Z"
}
```
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "Catalog", description = "Cities, categories, and services"),
        (name = "Cart", description = "Per-user cart management"),
        (name = "Bookings", description = "Booking confirmation and history"),
        (name = "Payments", description = "Simulated payment gateway"),
        (name = "Reviews", description = "Ratings for completed bookings"),
        (name = "Admin", description = "Administrative endpoints")
    ),
    paths(
        // Catalog
        crate::handlers::catalog::list_cities,
        crate::handlers::catalog::list_categories,
        crate::handlers::catalog::list_services,
        crate::handlers::catalog::get_service,
        crate::handlers::catalog::list_timeslots,
        crate::handlers::catalog::create_service,

        // Cart
        crate::handlers::cart::add_to_cart,
        crate::handlers::cart::view_cart,
        crate::handlers::cart::remove_from_cart,

        // Bookings
        crate::handlers::bookings::confirm_booking,
        crate::handlers::bookings::booking_history,

        // Payments
        crate::handlers::payments::initiate_payment,
        crate::handlers::payments::get_payment_status,

        // Reviews
        crate::handlers::reviews::submit_rating,
        crate::handlers::reviews::get_review,

        // Admin
        crate::handlers::admin::list_users,
        crate::handlers::admin::list_all_bookings,
    ),
    components(
        schemas(
            crate::handlers::catalog::CreateServiceRequest,
            crate::handlers::catalog::TimeslotsResponse,
            crate::handlers::cart::AddToCartRequest,
            crate::handlers::bookings::ConfirmBookingRequest,
            crate::handlers::payments::InitiatePaymentRequest,
            crate::handlers::reviews::SubmitRatingRequest,
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDocV1;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}
