use crate::{
    entities::{
        booking, booking_service, cart_item, Booking, BookingModel, BookingService as BookingLines,
        BookingServiceModel, BookingStatus, CartItem, Service, User,
    },
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::{NaiveDate, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

const BOOKING_CODE_PREFIX: &str = "YM";
const BOOKING_CODE_KEYSPACE: u32 = 1_000_000;

/// Attempt budget for the in-transaction code pre-check. The UNIQUE
/// constraint on `bookings.booking_code` remains the final authority; the
/// pre-check only keeps constraint violations rare.
const MAX_CODE_ATTEMPTS: u32 = 16;

/// Generates a candidate booking code: `YM` followed by six decimal digits.
/// Pure over the supplied RNG so tests can seed it deterministically.
pub fn generate_booking_code<R: Rng>(rng: &mut R) -> String {
    format!(
        "{}{:06}",
        BOOKING_CODE_PREFIX,
        rng.gen_range(0..BOOKING_CODE_KEYSPACE)
    )
}

/// Source of candidate booking codes. Production uses the thread RNG;
/// tests inject a deterministic generator to force collisions.
pub type CodeGenerator = dyn Fn() -> String + Send + Sync;

/// The booking engine: converts selected cart entries into an immutable
/// booking with frozen line-item prices, consuming the cart atomically.
#[derive(Clone)]
pub struct BookingEngine {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
    code_gen: Arc<CodeGenerator>,
}

impl BookingEngine {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self::with_code_generator(
            db,
            event_sender,
            Arc::new(|| generate_booking_code(&mut rand::thread_rng())),
        )
    }

    pub fn with_code_generator(
        db: Arc<DatabaseConnection>,
        event_sender: Arc<EventSender>,
        code_gen: Arc<CodeGenerator>,
    ) -> Self {
        Self {
            db,
            event_sender,
            code_gen,
        }
    }

    /// Confirms a booking from the user's selected cart entries.
    ///
    /// Cart ids that do not exist or belong to another user are silently
    /// dropped; an empty resolved set is a validation error. The total is
    /// computed from live catalog prices at this instant and frozen into
    /// the booking and its line items. Code generation, booking insert,
    /// line-item inserts, and cart deletion all happen inside one
    /// transaction: either every effect commits or none do.
    ///
    /// A lost code-generation race surfaces as `Conflict`, which callers
    /// may retry safely (the cart was not consumed).
    #[instrument(skip(self))]
    pub async fn confirm_booking(
        &self,
        input: ConfirmBookingInput,
    ) -> Result<BookingWithLineItems, ServiceError> {
        User::find_by_id(input.user_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("User {} not found", input.user_id)))?;

        let txn = self.db.begin().await?;

        // Resolve the selection, restricted to rows the user owns
        let rows = CartItem::find()
            .filter(cart_item::Column::Id.is_in(input.cart_item_ids.clone()))
            .filter(cart_item::Column::UserId.eq(input.user_id))
            .find_also_related(Service)
            .all(&txn)
            .await?;

        if rows.is_empty() {
            return Err(ServiceError::ValidationError(
                "No valid cart items found for booking".to_string(),
            ));
        }

        let mut resolved = Vec::with_capacity(rows.len());
        for (item, service) in rows {
            let service = service.ok_or_else(|| {
                ServiceError::InternalError(format!(
                    "cart item {} references missing service",
                    item.id
                ))
            })?;
            resolved.push((item, service));
        }

        // Live catalog prices, frozen from here on
        let total_amount: Decimal = resolved
            .iter()
            .map(|(item, service)| service.price * Decimal::from(item.quantity))
            .sum();

        let booking_code = self.allocate_booking_code(&txn).await?;

        let booking = booking::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(input.user_id),
            booking_code: Set(booking_code),
            date: Set(input.date),
            timeslot: Set(input.timeslot),
            address: Set(input.address),
            total_amount: Set(total_amount),
            status: Set(BookingStatus::Confirmed),
            booked_at: Set(Utc::now()),
        };

        let booking = match booking.insert(&txn).await {
            Ok(b) => b,
            Err(e) if ServiceError::is_unique_violation(&e) => {
                // Concurrent confirmation won the same code; the whole
                // transaction rolls back and the caller may retry.
                return Err(ServiceError::Conflict(
                    "Booking code already taken, please retry".to_string(),
                ));
            }
            Err(e) => return Err(e.into()),
        };

        let mut line_items = Vec::with_capacity(resolved.len());
        for (item, service) in resolved {
            let line = booking_service::ActiveModel {
                id: Set(Uuid::new_v4()),
                booking_id: Set(booking.id),
                service_id: Set(service.id),
                quantity: Set(item.quantity),
                price_at_booking: Set(service.price),
            };
            line_items.push(line.insert(&txn).await?);

            // Exactly-once consumption: the entry leaves the cart in the
            // same transaction that snapshots it
            item.delete(&txn).await?;
        }

        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::BookingConfirmed {
                booking_id: booking.id,
                booking_code: booking.booking_code.clone(),
            })
            .await;

        info!(
            "Confirmed booking {} for user {}: {} line items, total {}",
            booking.booking_code,
            booking.user_id,
            line_items.len(),
            booking.total_amount
        );

        Ok(BookingWithLineItems {
            booking,
            line_items,
        })
    }

    /// The user's bookings with line items, newest first. An unknown user
    /// yields an empty list.
    #[instrument(skip(self))]
    pub async fn booking_history(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<BookingWithLineItems>, ServiceError> {
        let rows = Booking::find()
            .filter(booking::Column::UserId.eq(user_id))
            .order_by_desc(booking::Column::BookedAt)
            .find_with_related(BookingLines)
            .all(&*self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(booking, line_items)| BookingWithLineItems {
                booking,
                line_items,
            })
            .collect())
    }

    /// Admin surface: every booking on the platform, newest first.
    pub async fn list_all_bookings(&self) -> Result<Vec<BookingModel>, ServiceError> {
        Ok(Booking::find()
            .order_by_desc(booking::Column::BookedAt)
            .all(&*self.db)
            .await?)
    }

    /// Generates a code, pre-checks it against existing bookings, and
    /// retries on collision up to the attempt budget.
    async fn allocate_booking_code(
        &self,
        txn: &sea_orm::DatabaseTransaction,
    ) -> Result<String, ServiceError> {
        for _ in 0..MAX_CODE_ATTEMPTS {
            let code = (self.code_gen)();
            let taken = Booking::find()
                .filter(booking::Column::BookingCode.eq(&code))
                .one(txn)
                .await?
                .is_some();
            if !taken {
                return Ok(code);
            }
        }

        Err(ServiceError::Conflict(
            "Could not allocate a unique booking code".to_string(),
        ))
    }
}

/// Input for booking confirmation
#[derive(Debug, Deserialize)]
pub struct ConfirmBookingInput {
    pub user_id: Uuid,
    pub cart_item_ids: Vec<Uuid>,
    pub date: NaiveDate,
    pub timeslot: String,
    pub address: String,
}

/// A booking together with its frozen line-item snapshots
#[derive(Debug, Serialize)]
pub struct BookingWithLineItems {
    pub booking: BookingModel,
    pub line_items: Vec<BookingServiceModel>,
}
