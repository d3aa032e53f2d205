use crate::{
    entities::{cart_item, CartItem, CartItemModel, Service, ServiceModel, User},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Per-user cart of pending service selections.
///
/// Carts are keyed by (user, service): adding a service that is already in
/// the cart accumulates quantity instead of creating a second row. Entries
/// are consumed (deleted) by the booking engine at confirmation.
#[derive(Clone)]
pub struct CartService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

impl CartService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Adds a service to the user's cart, or increments the quantity of an
    /// existing entry. Repeated calls accumulate, never replace.
    ///
    /// Quantity is a data-model invariant, so it is enforced here and not
    /// only at the HTTP boundary.
    #[instrument(skip(self))]
    pub async fn add_to_cart(&self, input: AddToCartInput) -> Result<CartItemModel, ServiceError> {
        if input.quantity < 1 {
            return Err(ServiceError::ValidationError(
                "Quantity must be at least 1".to_string(),
            ));
        }

        let txn = self.db.begin().await?;

        User::find_by_id(input.user_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("User {} not found", input.user_id)))?;

        Service::find_by_id(input.service_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Service {} not found", input.service_id))
            })?;

        let existing = CartItem::find()
            .filter(cart_item::Column::UserId.eq(input.user_id))
            .filter(cart_item::Column::ServiceId.eq(input.service_id))
            .one(&txn)
            .await?;

        let item = if let Some(item) = existing {
            let quantity = item.quantity + input.quantity;
            let mut item: cart_item::ActiveModel = item.into();
            item.quantity = Set(quantity);
            item.update(&txn).await?
        } else {
            let item = cart_item::ActiveModel {
                id: Set(Uuid::new_v4()),
                user_id: Set(input.user_id),
                service_id: Set(input.service_id),
                quantity: Set(input.quantity),
                added_at: Set(Utc::now()),
            };
            match item.insert(&txn).await {
                Ok(item) => item,
                // A concurrent add for the same (user, service) won the
                // insert; the retry will take the increment path
                Err(e) if ServiceError::is_unique_violation(&e) => {
                    return Err(ServiceError::Conflict(
                        "Cart entry was created concurrently, please retry".to_string(),
                    ));
                }
                Err(e) => return Err(e.into()),
            }
        };

        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::CartItemAdded {
                user_id: input.user_id,
                service_id: input.service_id,
            })
            .await;

        info!(
            "Cart updated for user {}: service {} x{}",
            input.user_id, input.service_id, item.quantity
        );
        Ok(item)
    }

    /// Lists the user's cart entries joined with the live catalog price.
    ///
    /// `line_total` reflects the price at viewing time. The amount actually
    /// charged is frozen later, at booking confirmation, so a catalog price
    /// change between viewing and confirming will show up in the final
    /// total. Clients must not treat cart totals as a quote.
    ///
    /// An unknown user yields an empty list, not an error.
    #[instrument(skip(self))]
    pub async fn view_cart(&self, user_id: Uuid) -> Result<Vec<CartEntry>, ServiceError> {
        let rows = CartItem::find()
            .filter(cart_item::Column::UserId.eq(user_id))
            .order_by_asc(cart_item::Column::AddedAt)
            .find_also_related(Service)
            .all(&*self.db)
            .await?;

        let entries = rows
            .into_iter()
            .map(|(item, service)| {
                let service = service.ok_or_else(|| {
                    ServiceError::InternalError(format!(
                        "cart item {} references missing service",
                        item.id
                    ))
                })?;
                Ok(CartEntry::new(item, service))
            })
            .collect::<Result<Vec<_>, ServiceError>>()?;

        Ok(entries)
    }

    /// Removes a single cart entry owned by the user.
    #[instrument(skip(self))]
    pub async fn remove_from_cart(
        &self,
        user_id: Uuid,
        cart_item_id: Uuid,
    ) -> Result<(), ServiceError> {
        let item = CartItem::find_by_id(cart_item_id)
            .filter(cart_item::Column::UserId.eq(user_id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Cart item {} not found", cart_item_id))
            })?;

        item.delete(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::CartItemRemoved {
                user_id,
                cart_item_id,
            })
            .await;

        Ok(())
    }
}

/// Input for adding a service to the cart
#[derive(Debug, Deserialize)]
pub struct AddToCartInput {
    pub user_id: Uuid,
    pub service_id: Uuid,
    pub quantity: i32,
}

/// Cart entry annotated with the live catalog price
#[derive(Debug, Serialize)]
pub struct CartEntry {
    pub id: Uuid,
    pub service_id: Uuid,
    pub service_name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

impl CartEntry {
    fn new(item: CartItemModel, service: ServiceModel) -> Self {
        let line_total = service.price * Decimal::from(item.quantity);
        Self {
            id: item.id,
            service_id: service.id,
            service_name: service.name,
            quantity: item.quantity,
            unit_price: service.price,
            line_total,
        }
    }
}
