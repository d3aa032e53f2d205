use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

/// Events emitted by the booking platform. Consumers (notification
/// delivery, analytics) subscribe out of process; the core only publishes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Cart events
    CartItemAdded { user_id: Uuid, service_id: Uuid },
    CartItemRemoved { user_id: Uuid, cart_item_id: Uuid },

    // Booking events
    BookingConfirmed { booking_id: Uuid, booking_code: String },

    // Payment events
    PaymentSucceeded { booking_id: Uuid, transaction_id: String },

    // Review events
    ReviewSubmitted { booking_id: Uuid, rating: i32 },

    // Catalog events
    ServiceCreated(Uuid),
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Fire-and-forget variant: event delivery must never fail the
    /// operation that produced it.
    pub async fn send_or_log(&self, event: Event) {
        if let Err(e) = self.send(event).await {
            warn!("Event dropped: {}", e);
        }
    }
}

/// Drains the event channel, logging each event. Notification and email
/// delivery are external collaborators and would hook in here.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        match &event {
            Event::BookingConfirmed {
                booking_id,
                booking_code,
            } => {
                info!(%booking_id, %booking_code, "booking confirmed");
            }
            Event::PaymentSucceeded {
                booking_id,
                transaction_id,
            } => {
                info!(%booking_id, %transaction_id, "payment succeeded");
            }
            Event::ReviewSubmitted { booking_id, rating } => {
                info!(%booking_id, rating, "review submitted");
            }
            other => {
                info!("event: {:?}", other);
            }
        }
    }

    info!("Event channel closed; processing loop terminated");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_or_log_does_not_fail_on_closed_channel() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);

        let sender = EventSender::new(tx);
        // Must not panic or error out
        sender
            .send_or_log(Event::ServiceCreated(Uuid::new_v4()))
            .await;
    }

    #[tokio::test]
    async fn events_round_trip_through_channel() {
        let (tx, mut rx) = mpsc::channel(4);
        let sender = EventSender::new(tx);

        let booking_id = Uuid::new_v4();
        sender
            .send(Event::BookingConfirmed {
                booking_id,
                booking_code: "YM123456".to_string(),
            })
            .await
            .expect("send should succeed");

        match rx.recv().await.expect("event expected") {
            Event::BookingConfirmed {
                booking_id: got, ..
            } => assert_eq!(got, booking_id),
            other => panic!("unexpected event: {:?}", other),
        }
    }
}
