mod common;

use chrono::Utc;
use common::TestApp;
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, EntityTrait, PaginatorTrait, Set};
use homeserve_api::{
    entities::{cart_item, CartItem},
    errors::ServiceError,
    services::AddToCartInput,
};
use uuid::Uuid;

#[tokio::test]
async fn add_to_cart_creates_entry() {
    let app = TestApp::new().await;
    let user_id = app.seed_user().await;
    let category_id = app.seed_category("Cleaning").await;
    let service_id = app.seed_service(category_id, "Deep Clean", dec!(100.00)).await;

    let item = app
        .state
        .services
        .cart
        .add_to_cart(AddToCartInput {
            user_id,
            service_id,
            quantity: 2,
        })
        .await
        .expect("add to cart");

    assert_eq!(item.user_id, user_id);
    assert_eq!(item.service_id, service_id);
    assert_eq!(item.quantity, 2);
}

#[tokio::test]
async fn repeated_add_accumulates_quantity() {
    let app = TestApp::new().await;
    let user_id = app.seed_user().await;
    let category_id = app.seed_category("Cleaning").await;
    let service_id = app.seed_service(category_id, "Deep Clean", dec!(100.00)).await;

    let first = app
        .state
        .services
        .cart
        .add_to_cart(AddToCartInput {
            user_id,
            service_id,
            quantity: 1,
        })
        .await
        .expect("first add");
    let second = app
        .state
        .services
        .cart
        .add_to_cart(AddToCartInput {
            user_id,
            service_id,
            quantity: 3,
        })
        .await
        .expect("second add");

    // Same row, accumulated quantity
    assert_eq!(first.id, second.id);
    assert_eq!(second.quantity, 4);

    let rows = CartItem::find().count(&*app.state.db).await.expect("count");
    assert_eq!(rows, 1);
}

#[tokio::test]
async fn add_to_cart_requires_existing_user_and_service() {
    let app = TestApp::new().await;
    let user_id = app.seed_user().await;
    let category_id = app.seed_category("Cleaning").await;
    let service_id = app.seed_service(category_id, "Deep Clean", dec!(100.00)).await;

    let err = app
        .state
        .services
        .cart
        .add_to_cart(AddToCartInput {
            user_id: Uuid::new_v4(),
            service_id,
            quantity: 1,
        })
        .await
        .expect_err("unknown user");
    assert!(matches!(err, ServiceError::NotFound(_)));

    let err = app
        .state
        .services
        .cart
        .add_to_cart(AddToCartInput {
            user_id,
            service_id: Uuid::new_v4(),
            quantity: 1,
        })
        .await
        .expect_err("unknown service");
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn view_cart_joins_live_prices() {
    let app = TestApp::new().await;
    let user_id = app.seed_user().await;
    let category_id = app.seed_category("Cleaning").await;
    let service_id = app.seed_service(category_id, "Deep Clean", dec!(40.00)).await;

    app.state
        .services
        .cart
        .add_to_cart(AddToCartInput {
            user_id,
            service_id,
            quantity: 3,
        })
        .await
        .expect("add to cart");

    let entries = app
        .state
        .services
        .cart
        .view_cart(user_id)
        .await
        .expect("view cart");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].service_name, "Deep Clean");
    assert_eq!(entries[0].unit_price, dec!(40.00));
    assert_eq!(entries[0].line_total, dec!(120.00));

    // Unknown user sees an empty cart
    let empty = app
        .state
        .services
        .cart
        .view_cart(Uuid::new_v4())
        .await
        .expect("view cart");
    assert!(empty.is_empty());
}

#[tokio::test]
async fn remove_from_cart_is_ownership_scoped() {
    let app = TestApp::new().await;
    let owner = app.seed_user().await;
    let stranger = app.seed_user().await;
    let category_id = app.seed_category("Cleaning").await;
    let service_id = app.seed_service(category_id, "Deep Clean", dec!(40.00)).await;

    let item = app
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

    let err = app
        .state
        .services
        .cart
        .remove_from_cart(stranger, item.id)
        .await
        .expect_err("stranger cannot remove");
    assert!(matches!(err, ServiceError::NotFound(_)));

    app.state
        .services
        .cart
        .remove_from_cart(owner, item.id)
        .await
        .expect("owner removes");

    let rows = CartItem::find().count(&*app.state.db).await.expect("count");
    assert_eq!(rows, 0);
}

#[tokio::test]
async fn nonpositive_quantity_rejected_at_service_level() {
    let app = TestApp::new().await;
    let user_id = app.seed_user().await;
    let category_id = app.seed_category("Cleaning").await;
    let service_id = app.seed_service(category_id, "Deep Clean", dec!(100.00)).await;

    for quantity in [0, -3] {
        let err = app
            .state
            .services
            .cart
            .add_to_cart(AddToCartInput {
                user_id,
                service_id,
                quantity,
            })
            .await
            .expect_err("non-positive quantity must fail");
        assert!(matches!(err, ServiceError::ValidationError(_)));
    }

    // Nothing reached the cart, so nothing can leak into booking totals
    let rows = CartItem::find().count(&*app.state.db).await.expect("count");
    assert_eq!(rows, 0);
}

#[tokio::test]
async fn duplicate_cart_row_hits_unique_constraint() {
    let app = TestApp::new().await;
    let user_id = app.seed_user().await;
    let category_id = app.seed_category("Cleaning").await;
    let service_id = app.seed_service(category_id, "Deep Clean", dec!(100.00)).await;

    app.state
        .services
        .cart
        .add_to_cart(AddToCartInput {
            user_id,
            service_id,
            quantity: 1,
        })
        .await
        .expect("first add");

    // A second row for the same (user, service) is what the loser of a
    // concurrent add would try to insert; the storage constraint stops it
    // and the classifier recognizes the real driver error
    let duplicate = cart_item::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        service_id: Set(service_id),
        quantity: Set(1),
        added_at: Set(Utc::now()),
    };
    let err = duplicate
        .insert(&*app.state.db)
        .await
        .expect_err("unique index must reject the duplicate");
    assert!(homeserve_api::errors::ServiceError::is_unique_violation(&err));
}
