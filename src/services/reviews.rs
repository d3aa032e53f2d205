use crate::{
    entities::{booking, review, Booking, BookingStatus, Review, ReviewModel},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;

/// Ratings and reviews, gated on booking completion.
#[derive(Clone)]
pub struct ReviewService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

impl ReviewService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Submits a rating for a completed booking.
    ///
    /// The booking must belong to the submitting user and have reached
    /// `Completed`. One review exists per booking; submitting again
    /// overwrites the rating and text in place.
    #[instrument(skip(self))]
    pub async fn submit_rating(&self, input: SubmitRatingInput) -> Result<ReviewModel, ServiceError> {
        if !(MIN_RATING..=MAX_RATING).contains(&input.rating) {
            return Err(ServiceError::ValidationError(format!(
                "Rating must be between {} and {}",
                MIN_RATING, MAX_RATING
            )));
        }

        let booking = Booking::find()
            .filter(booking::Column::BookingCode.eq(&input.booking_code))
            .filter(booking::Column::UserId.eq(input.user_id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(
                    "Booking not found or does not belong to user".to_string(),
                )
            })?;

        if booking.status != BookingStatus::Completed {
            return Err(ServiceError::ValidationError(
                "Booking must be completed to submit a rating".to_string(),
            ));
        }

        let existing = Review::find()
            .filter(review::Column::BookingId.eq(booking.id))
            .one(&*self.db)
            .await?;

        let review = if let Some(existing) = existing {
            let mut review: review::ActiveModel = existing.into();
            review.rating = Set(input.rating);
            review.review_text = Set(input.review_text);
            review.update(&*self.db).await?
        } else {
            let review = review::ActiveModel {
                id: Set(Uuid::new_v4()),
                booking_id: Set(booking.id),
                user_id: Set(input.user_id),
                rating: Set(input.rating),
                review_text: Set(input.review_text),
                created_at: Set(Utc::now()),
            };
            match review.insert(&*self.db).await {
                Ok(review) => review,
                // A concurrent submission won the one-row-per-booking slot;
                // the retry will take the overwrite path
                Err(e) if ServiceError::is_unique_violation(&e) => {
                    return Err(ServiceError::Conflict(
                        "Review was submitted concurrently, please retry".to_string(),
                    ));
                }
                Err(e) => return Err(e.into()),
            }
        };

        self.event_sender
            .send_or_log(Event::ReviewSubmitted {
                booking_id: booking.id,
                rating: review.rating,
            })
            .await;

        info!(
            "Rating {} recorded for booking {}",
            review.rating, booking.booking_code
        );
        Ok(review)
    }

    /// The review recorded against a booking code, if any.
    pub async fn get_review(&self, booking_code: &str) -> Result<ReviewModel, ServiceError> {
        let booking = Booking::find()
            .filter(booking::Column::BookingCode.eq(booking_code))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Booking {} not found", booking_code)))?;

        Review::find()
            .filter(review::Column::BookingId.eq(booking.id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("No review found for booking {}", booking_code))
            })
    }
}

/// Input for rating submission
#[derive(Debug, Deserialize)]
pub struct SubmitRatingInput {
    pub booking_code: String,
    pub user_id: Uuid,
    pub rating: i32,
    pub review_text: Option<String>,
}
