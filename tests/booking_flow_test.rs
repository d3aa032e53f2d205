mod common;

use chrono::NaiveDate;
use common::TestApp;
use rust_decimal_macros::dec;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use homeserve_api::{
    entities::{booking_service, cart_item, BookingService, BookingStatus, CartItem},
    errors::ServiceError,
    services::{AddToCartInput, ConfirmBookingInput},
};
use std::collections::HashSet;
use uuid::Uuid;

fn service_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 9, 15).expect("valid date")
}

fn confirm_input(user_id: Uuid, cart_item_ids: Vec<Uuid>) -> ConfirmBookingInput {
    ConfirmBookingInput {
        user_id,
        cart_item_ids,
        date: service_date(),
        timeslot: "10:00 AM".to_string(),
        address: "12 Test Lane, Pune".to_string(),
    }
}

#[tokio::test]
async fn confirm_booking_freezes_total_and_empties_cart() {
    let app = TestApp::new().await;
    let user_id = app.seed_user().await;
    let category_id = app.seed_category("Cleaning").await;
    let cleaning = app.seed_service(category_id, "Deep Clean", dec!(100.00)).await;
    let repair = app.seed_service(category_id, "Tap Repair", dec!(50.00)).await;

    let cart = &app.state.services.cart;
    let item_a = cart
        .add_to_cart(AddToCartInput {
            user_id,
            service_id: cleaning,
            quantity: 2,
        })
        .await
        .expect("add cleaning");
    let item_b = cart
        .add_to_cart(AddToCartInput {
            user_id,
            service_id: repair,
            quantity: 1,
        })
        .await
        .expect("add repair");

    let result = app
        .state
        .services
        .bookings
        .confirm_booking(confirm_input(user_id, vec![item_a.id, item_b.id]))
        .await
        .expect("confirm booking");

    assert_eq!(result.booking.total_amount, dec!(250.00));
    assert_eq!(result.booking.status, BookingStatus::Confirmed);
    assert!(result.booking.booking_code.starts_with("YM"));
    assert_eq!(result.booking.booking_code.len(), 8);
    assert_eq!(result.line_items.len(), 2);

    // Per-line snapshots carry the price at confirmation time
    let total_from_lines: rust_decimal::Decimal = result
        .line_items
        .iter()
        .map(|l| l.price_at_booking * rust_decimal::Decimal::from(l.quantity))
        .sum();
    assert_eq!(total_from_lines, result.booking.total_amount);

    // Cart entries were consumed
    let remaining = CartItem::find()
        .filter(cart_item::Column::UserId.eq(user_id))
        .count(&*app.state.db)
        .await
        .expect("count cart");
    assert_eq!(remaining, 0);
}

#[tokio::test]
async fn confirm_booking_snapshots_survive_price_changes() {
    let app = TestApp::new().await;
    let user_id = app.seed_user().await;
    let category_id = app.seed_category("Salon").await;
    let service_id = app.seed_service(category_id, "Haircut", dec!(30.00)).await;

    let item = app
        .state
        .services
        .cart
        .add_to_cart(AddToCartInput {
            user_id,
            service_id,
            quantity: 1,
        })
        .await
        .expect("add to cart");

    let result = app
        .state
        .services
        .bookings
        .confirm_booking(confirm_input(user_id, vec![item.id]))
        .await
        .expect("confirm booking");

    // Raise the catalog price after confirmation
    use sea_orm::{ActiveModelTrait, Set};
    let svc = homeserve_api::entities::Service::find_by_id(service_id)
        .one(&*app.state.db)
        .await
        .expect("query service")
        .expect("service exists");
    let mut svc: homeserve_api::entities::service::ActiveModel = svc.into();
    svc.price = Set(dec!(99.00));
    svc.update(&*app.state.db).await.expect("update price");

    let line = BookingService::find()
        .filter(booking_service::Column::BookingId.eq(result.booking.id))
        .one(&*app.state.db)
        .await
        .expect("query line")
        .expect("line exists");
    assert_eq!(line.price_at_booking, dec!(30.00));
    assert_eq!(result.booking.total_amount, dec!(30.00));
}

#[tokio::test]
async fn confirm_booking_rejects_empty_selection() {
    let app = TestApp::new().await;
    let user_id = app.seed_user().await;

    let err = app
        .state
        .services
        .bookings
        .confirm_booking(confirm_input(user_id, vec![]))
        .await
        .expect_err("empty selection must fail");

    assert!(matches!(err, ServiceError::ValidationError(_)));
}

#[tokio::test]
async fn confirm_booking_ignores_foreign_cart_items() {
    let app = TestApp::new().await;
    let owner = app.seed_user().await;
    let intruder = app.seed_user().await;
    let category_id = app.seed_category("Cleaning").await;
    let service_id = app.seed_service(category_id, "Deep Clean", dec!(100.00)).await;

    let owned = app
        .state
        .services
        .cart
        .add_to_cart(AddToCartInput {
            user_id: owner,
            service_id,
            quantity: 1,
        })
        .await
        .expect("add to cart");

    // The intruder references someone else's cart entry: the selection
    // resolves to nothing and nothing is persisted
    let err = app
        .state
        .services
        .bookings
        .confirm_booking(confirm_input(intruder, vec![owned.id]))
        .await
        .expect_err("foreign cart item must not confirm");
    assert!(matches!(err, ServiceError::ValidationError(_)));

    // The owner's cart is untouched
    let remaining = CartItem::find()
        .filter(cart_item::Column::UserId.eq(owner))
        .count(&*app.state.db)
        .await
        .expect("count cart");
    assert_eq!(remaining, 1);
}

#[tokio::test]
async fn confirm_booking_requires_known_user() {
    let app = TestApp::new().await;

    let err = app
        .state
        .services
        .bookings
        .confirm_booking(confirm_input(Uuid::new_v4(), vec![Uuid::new_v4()]))
        .await
        .expect_err("unknown user must fail");
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn booking_codes_are_unique_across_confirmations() {
    let app = TestApp::new().await;
    let user_id = app.seed_user().await;
    let category_id = app.seed_category("Cleaning").await;
    let service_id = app.seed_service(category_id, "Deep Clean", dec!(10.00)).await;

    let mut codes = HashSet::new();
    for _ in 0..20 {
        let item = app
            .state
            .services
            .cart
            .add_to_cart(AddToCartInput {
                user_id,
                service_id,
                quantity: 1,
            })
            .await
            .expect("add to cart");
        let result = app
            .state
            .services
            .bookings
            .confirm_booking(confirm_input(user_id, vec![item.id]))
            .await
            .expect("confirm booking");
        assert!(codes.insert(result.booking.booking_code));
    }
    assert_eq!(codes.len(), 20);
}

#[tokio::test]
async fn booking_history_is_newest_first_and_scoped_to_user() {
    let app = TestApp::new().await;
    let user_id = app.seed_user().await;
    let other = app.seed_user().await;
    let category_id = app.seed_category("Cleaning").await;
    let service_id = app.seed_service(category_id, "Deep Clean", dec!(10.00)).await;

    for _ in 0..3 {
        let item = app
            .state
            .services
            .cart
            .add_to_cart(AddToCartInput {
                user_id,
                service_id,
                quantity: 1,
            })
            .await
            .expect("add to cart");
        app.state
            .services
            .bookings
            .confirm_booking(confirm_input(user_id, vec![item.id]))
            .await
            .expect("confirm booking");
    }

    let history = app
        .state
        .services
        .bookings
        .booking_history(user_id)
        .await
        .expect("history");
    assert_eq!(history.len(), 3);
    for pair in history.windows(2) {
        assert!(pair[0].booking.booked_at >= pair[1].booking.booked_at);
    }
    for entry in &history {
        assert_eq!(entry.line_items.len(), 1);
    }

    // Another user sees nothing
    let empty = app
        .state
        .services
        .bookings
        .booking_history(other)
        .await
        .expect("history");
    assert!(empty.is_empty());

    // An unknown user also yields an empty list, not an error
    let unknown = app
        .state
        .services
        .bookings
        .booking_history(Uuid::new_v4())
        .await
        .expect("history");
    assert!(unknown.is_empty());
}

#[tokio::test]
async fn code_allocation_retries_past_taken_codes() {
    let app = TestApp::new().await;
    let user_id = app.seed_user().await;
    let category_id = app.seed_category("Cleaning").await;
    let service_id = app.seed_service(category_id, "Deep Clean", dec!(10.00)).await;

    // Occupy a code through the normal path
    let item = app
        .state
        .services
        .cart
        .add_to_cart(homeserve_api::services::AddToCartInput {
            user_id,
            service_id,
            quantity: 1,
        })
        .await
        .expect("add to cart");
    let taken = app
        .state
        .services
        .bookings
        .confirm_booking(confirm_input(user_id, vec![item.id]))
        .await
        .expect("confirm booking")
        .booking
        .booking_code;

    // Scripted generator: collide twice, then yield a free code
    let script = std::sync::Arc::new(std::sync::Mutex::new(std::collections::VecDeque::from([
        taken.clone(),
        taken.clone(),
        "YM999999".to_string(),
    ])));
    let gen = {
        let script = script.clone();
        move || {
            let mut q = script.lock().expect("script lock");
            if q.len() > 1 {
                q.pop_front().expect("script entry")
            } else {
                q.front().cloned().expect("script entry")
            }
        }
    };
    let engine = homeserve_api::services::BookingEngine::with_code_generator(
        app.state.db.clone(),
        std::sync::Arc::new(app.state.event_sender.clone()),
        std::sync::Arc::new(gen),
    );

    let item = app
        .state
        .services
        .cart
        .add_to_cart(homeserve_api::services::AddToCartInput {
            user_id,
            service_id,
            quantity: 1,
        })
        .await
        .expect("add to cart");
    let booking = engine
        .confirm_booking(confirm_input(user_id, vec![item.id]))
        .await
        .expect("confirm booking past collisions");

    assert_eq!(booking.booking.booking_code, "YM999999");
}

#[tokio::test]
async fn exhausted_code_allocation_is_a_conflict_and_rolls_back() {
    let app = TestApp::new().await;
    let user_id = app.seed_user().await;
    let category_id = app.seed_category("Cleaning").await;
    let service_id = app.seed_service(category_id, "Deep Clean", dec!(10.00)).await;

    let item = app
        .state
        .services
        .cart
        .add_to_cart(homeserve_api::services::AddToCartInput {
            user_id,
            service_id,
            quantity: 1,
        })
        .await
        .expect("add to cart");
    let taken = app
        .state
        .services
        .bookings
        .confirm_booking(confirm_input(user_id, vec![item.id]))
        .await
        .expect("confirm booking")
        .booking
        .booking_code;

    // Every candidate collides, so the attempt budget runs out
    let stuck = taken.clone();
    let engine = homeserve_api::services::BookingEngine::with_code_generator(
        app.state.db.clone(),
        std::sync::Arc::new(app.state.event_sender.clone()),
        std::sync::Arc::new(move || stuck.clone()),
    );

    let item = app
        .state
        .services
        .cart
        .add_to_cart(homeserve_api::services::AddToCartInput {
            user_id,
            service_id,
            quantity: 1,
        })
        .await
        .expect("add to cart");
    let err = engine
        .confirm_booking(confirm_input(user_id, vec![item.id]))
        .await
        .expect_err("exhausted budget must fail");
    assert!(matches!(err, ServiceError::Conflict(_)));

    // The failed attempt consumed nothing: the cart entry survives for retry
    let remaining = CartItem::find()
        .filter(cart_item::Column::UserId.eq(user_id))
        .count(&*app.state.db)
        .await
        .expect("count cart");
    assert_eq!(remaining, 1);
}
