pub mod booking;
pub mod booking_service;
pub mod cart_item;
pub mod category;
pub mod city;
pub mod payment;
pub mod review;
pub mod service;
pub mod user;

// Re-export entities
pub use booking::{BookingStatus, Entity as Booking, Model as BookingModel};
pub use booking_service::{Entity as BookingService, Model as BookingServiceModel};
pub use cart_item::{Entity as CartItem, Model as CartItemModel};
pub use category::{Entity as Category, Model as CategoryModel};
pub use city::{Entity as City, Model as CityModel};
pub use payment::{Entity as Payment, Model as PaymentModel, PaymentMethod, PaymentStatus};
pub use review::{Entity as Review, Model as ReviewModel};
pub use service::{Entity as Service, Model as ServiceModel};
pub use user::{Entity as User, Model as UserModel};
