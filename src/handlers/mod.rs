pub mod admin;
pub mod bookings;
pub mod cart;
pub mod catalog;
pub mod common;
pub mod payments;
pub mod reviews;

use crate::db::DbPool;
use crate::events::EventSender;
use crate::services::{
    BookingEngine, CartService, CatalogService, PaymentService, ReviewService, UserService,
};
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub catalog: Arc<CatalogService>,
    pub cart: Arc<CartService>,
    pub bookings: Arc<BookingEngine>,
    pub payments: Arc<PaymentService>,
    pub reviews: Arc<ReviewService>,
    pub users: Arc<UserService>,
}

impl AppServices {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        let catalog = Arc::new(CatalogService::new(db_pool.clone(), event_sender.clone()));
        let cart = Arc::new(CartService::new(db_pool.clone(), event_sender.clone()));
        let bookings = Arc::new(BookingEngine::new(db_pool.clone(), event_sender.clone()));
        let payments = Arc::new(PaymentService::new(db_pool.clone(), event_sender.clone()));
        let reviews = Arc::new(ReviewService::new(db_pool.clone(), event_sender.clone()));
        let users = Arc::new(UserService::new(db_pool));

        Self {
            catalog,
            cart,
            bookings,
            payments,
            reviews,
            users,
        }
    }
}
