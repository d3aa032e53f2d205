pub mod bookings;
pub mod cart;
pub mod catalog;
pub mod payments;
pub mod reviews;
pub mod users;

pub use bookings::{BookingEngine, BookingWithLineItems, CodeGenerator, ConfirmBookingInput};
pub use cart::{AddToCartInput, CartEntry, CartService};
pub use catalog::{CatalogService, CreateServiceInput, AVAILABLE_TIMESLOTS};
pub use payments::{InitiatePaymentInput, PaymentReceipt, PaymentService};
pub use reviews::{ReviewService, SubmitRatingInput};
pub use users::UserService;
