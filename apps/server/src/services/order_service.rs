//! Order service.
//!
//! Owns who may do what to an order and the publish-after-commit rule:
//! the repository commits first, then the hub is told.
//!
//! ## Audiences
//! ```text
//! order:created  → role:ADMIN, role:BARTENDER, orders:global
//! order:updated  → role:ADMIN, role:BARTENDER, orders:global, user:<owner>
//! ```

use serde::Serialize;
use taproom_core::{NewOrder, Order, OrderEvent, OrderStatus, User, ValidationError};
use taproom_db::Database;
use taproom_hub::{topic, EventKind, Notification, NotificationHub};
use tracing::{debug, warn};

use crate::error::{ServiceError, ServiceResult};

/// Payload of order notifications.
#[derive(Debug, Serialize)]
struct OrderPayload<'a> {
    order: &'a Order,
    #[serde(skip_serializing_if = "Option::is_none")]
    event: Option<&'a OrderEvent>,
}

/// Order lifecycle operations.
#[derive(Debug, Clone)]
pub struct OrderService {
    db: Database,
    hub: NotificationHub,
}

impl OrderService {
    pub fn new(db: Database, hub: NotificationHub) -> Self {
        OrderService { db, hub }
    }

    /// Places an order for `user`.
    ///
    /// Fails with a validation error when the cocktail is disabled or
    /// unavailable, or the input is out of bounds.
    pub async fn create(&self, user: &User, input: &NewOrder) -> ServiceResult<Order> {
        let write = self.db.orders().create_with_event(&user.id, input).await?;

        self.notify(
            EventKind::OrderCreated,
            &topic::staff_audience(),
            &write.order,
            Some(&write.event),
        );

        Ok(write.order)
    }

    /// Moves an order along its lifecycle. Staff only.
    ///
    /// The acting staff member claims the order if nobody has yet.
    pub async fn transition(
        &self,
        actor: &User,
        order_id: &str,
        to: OrderStatus,
    ) -> ServiceResult<Order> {
        require_staff(actor)?;
        self.apply(actor, order_id, to).await
    }

    /// Cancels an order. Allowed for its owner and for staff.
    ///
    /// Cancelling an order that is already delivered or cancelled is a
    /// no-op: the order comes back unchanged and nothing is published.
    pub async fn cancel(&self, actor: &User, order_id: &str) -> ServiceResult<Order> {
        let order = self.load(order_id).await?;
        require_owner_or_staff(actor, &order)?;

        if order.status.is_terminal() {
            debug!(order_id = %order_id, status = %order.status, "Cancel on finished order ignored");
            return Ok(order);
        }

        match self.apply(actor, order_id, OrderStatus::Cancelled).await {
            // Finished concurrently
            Err(ServiceError::InvalidTransition { .. }) => {
                let order = self.load(order_id).await?;
                if order.status.is_terminal() {
                    Ok(order)
                } else {
                    Err(ServiceError::InvalidTransition {
                        from: order.status,
                        to: OrderStatus::Cancelled,
                    })
                }
            }
            other => other,
        }
    }

    /// Sets or clears the assigned staff member. Staff only, no audit event.
    pub async fn assign(
        &self,
        actor: &User,
        order_id: &str,
        staff_id: Option<&str>,
    ) -> ServiceResult<Order> {
        require_staff(actor)?;

        if let Some(staff_id) = staff_id {
            let assignee = self
                .db
                .users()
                .get_by_id(staff_id)
                .await?
                .ok_or_else(|| ServiceError::not_found("User", staff_id))?;
            if !assignee.role.is_staff() {
                return Err(ValidationError::InvalidFormat {
                    field: "staff_id".to_string(),
                    reason: format!("{} is not a staff member", assignee.username),
                }
                .into());
            }
        }

        let order = self.db.orders().assign(order_id, staff_id).await?;

        self.notify(
            EventKind::OrderUpdated,
            &updated_audience(&order),
            &order,
            None,
        );

        Ok(order)
    }

    /// The staff queue, newest first.
    pub async fn active_orders(&self, actor: &User) -> ServiceResult<Vec<Order>> {
        require_staff(actor)?;
        Ok(self.db.orders().list_active().await?)
    }

    /// The caller's own orders, newest first.
    pub async fn my_orders(&self, actor: &User) -> ServiceResult<Vec<Order>> {
        Ok(self.db.orders().list_for_user(&actor.id).await?)
    }

    /// Audit trail of one order, for its owner or staff.
    pub async fn history(&self, actor: &User, order_id: &str) -> ServiceResult<Vec<OrderEvent>> {
        let order = self.load(order_id).await?;
        require_owner_or_staff(actor, &order)?;
        Ok(self.db.orders().events_for(order_id).await?)
    }

    async fn apply(&self, actor: &User, order_id: &str, to: OrderStatus) -> ServiceResult<Order> {
        let claim = actor.role.is_staff().then_some(actor.id.as_str());
        let write = self
            .db
            .orders()
            .transition_with_event(order_id, to, &actor.id, claim)
            .await?;

        self.notify(
            EventKind::OrderUpdated,
            &updated_audience(&write.order),
            &write.order,
            Some(&write.event),
        );

        Ok(write.order)
    }

    async fn load(&self, order_id: &str) -> ServiceResult<Order> {
        self.db
            .orders()
            .get_by_id(order_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Order", order_id))
    }

    /// Best effort: the write is already committed.
    fn notify(&self, kind: EventKind, topics: &[String], order: &Order, event: Option<&OrderEvent>) {
        match Notification::from_payload(kind, &OrderPayload { order, event }) {
            Ok(notification) => {
                let delivered = self.hub.publish_to(topics, &notification);
                debug!(order_id = %order.id, %kind, delivered, "Order notification published");
            }
            Err(err) => warn!(order_id = %order.id, error = %err, "Order notification not encoded"),
        }
    }
}

fn updated_audience(order: &Order) -> Vec<String> {
    let mut topics = topic::staff_audience();
    topics.push(topic::user_topic(&order.user_id));
    topics
}

pub(crate) fn require_staff(actor: &User) -> ServiceResult<()> {
    if actor.role.is_staff() {
        Ok(())
    } else {
        Err(ServiceError::forbidden("Staff only"))
    }
}

fn require_owner_or_staff(actor: &User, order: &Order) -> ServiceResult<()> {
    if actor.role.is_staff() || actor.id == order.user_id {
        Ok(())
    } else {
        Err(ServiceError::forbidden("Not your order"))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
