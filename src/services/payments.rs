use crate::{
    entities::{
        booking, payment, Booking, Payment, PaymentMethod, PaymentModel, PaymentStatus,
    },
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use rand::Rng;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

const TRANSACTION_ID_PREFIX: &str = "TXN";
const TRANSACTION_ID_SUFFIX_LEN: usize = 7;
const TRANSACTION_ID_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Generates a simulated gateway reference: `TXN` followed by seven
/// uppercase alphanumerics.
pub fn generate_transaction_id<R: Rng>(rng: &mut R) -> String {
    let suffix: String = (0..TRANSACTION_ID_SUFFIX_LEN)
        .map(|_| TRANSACTION_ID_CHARSET[rng.gen_range(0..TRANSACTION_ID_CHARSET.len())] as char)
        .collect();
    format!("{}{}", TRANSACTION_ID_PREFIX, suffix)
}

/// Simulated payment gateway. Initiation always settles as `Success`;
/// there is no external charge, no webhook, no async settlement.
#[derive(Clone)]
pub struct PaymentService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

impl PaymentService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Initiates payment for a booking, identified by its public code.
    ///
    /// At most one payment row exists per booking: a repeat call overwrites
    /// the method and transaction reference in place instead of appending.
    /// The booking status is never touched here; bookings are confirmed at
    /// creation and completion is an operational act, not a payment effect.
    #[instrument(skip(self))]
    pub async fn initiate_payment(
        &self,
        input: InitiatePaymentInput,
    ) -> Result<PaymentReceipt, ServiceError> {
        let booking = Booking::find()
            .filter(booking::Column::BookingCode.eq(&input.booking_code))
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Booking {} not found", input.booking_code))
            })?;

        let txn = self.db.begin().await?;

        let existing = Payment::find()
            .filter(payment::Column::BookingId.eq(booking.id))
            .one(&txn)
            .await?;

        let transaction_id = generate_transaction_id(&mut rand::thread_rng());
        let now = Utc::now();

        let payment = if let Some(existing) = existing {
            let mut payment: payment::ActiveModel = existing.into();
            payment.method = Set(input.method);
            payment.transaction_id = Set(Some(transaction_id));
            payment.status = Set(PaymentStatus::Success);
            payment.paid_at = Set(now);
            payment.update(&txn).await?
        } else {
            let payment = payment::ActiveModel {
                id: Set(Uuid::new_v4()),
                booking_id: Set(booking.id),
                method: Set(input.method),
                transaction_id: Set(Some(transaction_id)),
                status: Set(PaymentStatus::Success),
                paid_at: Set(now),
            };
            match payment.insert(&txn).await {
                Ok(payment) => payment,
                // A concurrent initiation won the one-row-per-booking slot;
                // the retry will take the overwrite path
                Err(e) if ServiceError::is_unique_violation(&e) => {
                    return Err(ServiceError::Conflict(
                        "Payment was initiated concurrently, please retry".to_string(),
                    ));
                }
                Err(e) => return Err(e.into()),
            }
        };

        txn.commit().await?;

        let transaction_id = payment.transaction_id.clone().ok_or_else(|| {
            ServiceError::InternalError("settled payment lost its transaction id".to_string())
        })?;

        self.event_sender
            .send_or_log(Event::PaymentSucceeded {
                booking_id: booking.id,
                transaction_id: transaction_id.clone(),
            })
            .await;

        info!(
            "Payment settled for booking {}: {}",
            booking.booking_code, transaction_id
        );

        Ok(PaymentReceipt {
            booking_code: booking.booking_code,
            transaction_id,
            status: payment.status,
            amount: booking.total_amount,
            paid_at: payment.paid_at,
        })
    }

    /// Fetches the payment recorded against a booking code. An unknown
    /// booking and a booking with no payment yet are both `NotFound`,
    /// distinguished only by message.
    #[instrument(skip(self))]
    pub async fn get_payment_status(
        &self,
        booking_code: &str,
    ) -> Result<PaymentModel, ServiceError> {
        let booking = Booking::find()
            .filter(booking::Column::BookingCode.eq(booking_code))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Booking {} not found", booking_code)))?;

        Payment::find()
            .filter(payment::Column::BookingId.eq(booking.id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("No payment found for booking {}", booking_code))
            })
    }
}

/// Input for payment initiation
#[derive(Debug, Deserialize)]
pub struct InitiatePaymentInput {
    pub booking_code: String,
    pub method: PaymentMethod,
}

/// Receipt returned to the caller after a settled payment
#[derive(Debug, Serialize)]
pub struct PaymentReceipt {
    pub booking_code: String,
    pub transaction_id: String,
    pub status: PaymentStatus,
    pub amount: rust_decimal::Decimal,
    pub paid_at: chrono::DateTime<Utc>,
}
