//! # Order Repository
//!
//! Orders and their append-only audit trail.
//!
//! ## Write Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │              transition_with_event(order, READY, actor)                 │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │    │                                                                    │
//! │    ├── SELECT order            ← status read inside the transaction    │
//! │    ├── check_transition(IN_PROGRESS → READY)                            │
//! │    ├── UPDATE orders SET status = READY, assigned = COALESCE(..)        │
//! │    │     WHERE id = ? AND status = IN_PROGRESS                          │
//! │    │        └── 0 rows? someone else moved it → InvalidTransition      │
//! │    ├── INSERT order_events (IN_PROGRESS → READY, actor)                 │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  Either both the status write and the event land, or neither does.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariant
//! For every order, `orders.status` equals the `to_status` of its most
//! recent `order_events` row. Only this module writes either table.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use super::cocktail::load_cocktail;
use super::generate_id;
use crate::error::{DbError, DbResult};
use taproom_core::lifecycle::check_transition;
use taproom_core::validation::{validate_new_order, validate_orderable};
use taproom_core::{NewOrder, Order, OrderEvent, OrderStatus};

const ORDER_COLUMNS: &str = "id, user_id, cocktail_id, quantity, notes, location, status, \
                             assigned_staff_id, created_at, updated_at";

/// An order together with the audit event written alongside it.
#[derive(Debug, Clone)]
pub struct OrderWrite {
    pub order: Order,
    pub event: OrderEvent,
}

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Places a new order and writes its creation event.
    ///
    /// Input is normalized, then the cocktail is loaded and checked for
    /// orderability inside the same transaction as the insert, so an
    /// ingredient running out concurrently cannot slip past.
    ///
    /// ## Errors
    /// * `DbError::Validation` - Bad quantity/location/notes, or the cocktail
    ///   is disabled or unavailable
    /// * `DbError::NotFound` - Unknown cocktail
    pub async fn create_with_event(&self, user_id: &str, input: &NewOrder) -> DbResult<OrderWrite> {
        let input = validate_new_order(input)?;

        let mut tx = self.pool.begin().await?;

        let cocktail = load_cocktail(&mut tx, &input.cocktail_id)
            .await?
            .ok_or_else(|| DbError::not_found("Cocktail", &input.cocktail_id))?;
        validate_orderable(&cocktail)?;

        let now = Utc::now();
        let order = Order {
            id: generate_id(),
            user_id: user_id.to_string(),
            cocktail_id: input.cocktail_id,
            quantity: input.quantity,
            notes: input.notes,
            location: input.location,
            status: OrderStatus::INITIAL,
            assigned_staff_id: None,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, user_id, cocktail_id, quantity, notes, location,
                status, assigned_staff_id, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, NULL, ?8, ?8)
            "#,
        )
        .bind(&order.id)
        .bind(&order.user_id)
        .bind(&order.cocktail_id)
        .bind(order.quantity)
        .bind(&order.notes)
        .bind(&order.location)
        .bind(order.status)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let event = append_event(&mut tx, &order.id, None, order.status, user_id, now).await?;

        tx.commit().await?;

        info!(
            order_id = %order.id,
            cocktail = %cocktail.name,
            quantity = order.quantity,
            "Order placed"
        );

        Ok(OrderWrite { order, event })
    }

    /// Moves an order to `to` and writes the matching audit event.
    ///
    /// The legal-move check runs against the status read inside the
    /// transaction, never against a caller-supplied one. `claim_for`, when
    /// given, becomes the assignee if the order has none yet.
    ///
    /// ## Errors
    /// * `DbError::NotFound` - Unknown order
    /// * `DbError::InvalidTransition` - `to` is not reachable from the
    ///   current status, or a concurrent writer moved the order first
    pub async fn transition_with_event(
        &self,
        order_id: &str,
        to: OrderStatus,
        actor_id: &str,
        claim_for: Option<&str>,
    ) -> DbResult<OrderWrite> {
        let mut tx = self.pool.begin().await?;

        let current = fetch_order(&mut tx, order_id)
            .await?
            .ok_or_else(|| DbError::not_found("Order", order_id))?;

        check_transition(current.status, to)?;

        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE orders SET
                status = ?2,
                assigned_staff_id = COALESCE(assigned_staff_id, ?3),
                updated_at = ?4
            WHERE id = ?1 AND status = ?5
            "#,
        )
        .bind(order_id)
        .bind(to)
        .bind(claim_for)
        .bind(now)
        .bind(current.status)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::InvalidTransition {
                from: current.status,
                to,
            });
        }

        let event = append_event(&mut tx, order_id, Some(current.status), to, actor_id, now).await?;

        let order = fetch_order(&mut tx, order_id)
            .await?
            .ok_or_else(|| DbError::not_found("Order", order_id))?;

        tx.commit().await?;

        info!(
            order_id = %order_id,
            from = %current.status,
            to = %to,
            actor = %actor_id,
            "Order status changed"
        );

        Ok(OrderWrite { order, event })
    }

    /// Sets or clears the assigned staff member. No audit event, any status.
    pub async fn assign(&self, order_id: &str, staff_id: Option<&str>) -> DbResult<Order> {
        debug!(order_id = %order_id, ?staff_id, "Assigning order");

        let result =
            sqlx::query("UPDATE orders SET assigned_staff_id = ?2, updated_at = ?3 WHERE id = ?1")
                .bind(order_id)
                .bind(staff_id)
                .bind(Utc::now())
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order", order_id));
        }

        self.get_by_id(order_id)
            .await?
            .ok_or_else(|| DbError::not_found("Order", order_id))
    }

    /// Gets an order by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let mut conn = self.pool.acquire().await?;
        fetch_order(&mut conn, id).await
    }

    /// Audit trail of one order, oldest first.
    pub async fn events_for(&self, order_id: &str) -> DbResult<Vec<OrderEvent>> {
        let events = sqlx::query_as::<_, OrderEvent>(
            r#"
            SELECT id, order_id, from_status, to_status, actor_id, created_at
            FROM order_events
            WHERE order_id = ?1
            ORDER BY id
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    /// The staff queue: every non-terminal order, newest first.
    pub async fn list_active(&self) -> DbResult<Vec<Order>> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM orders
             WHERE status NOT IN ('DELIVERED', 'CANCELLED')
             ORDER BY created_at DESC, rowid DESC"
        );

        let orders = sqlx::query_as::<_, Order>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(orders)
    }

    /// A patron's orders, newest first.
    pub async fn list_for_user(&self, user_id: &str) -> DbResult<Vec<Order>> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM orders
             WHERE user_id = ?1
             ORDER BY created_at DESC, rowid DESC"
        );

        let orders = sqlx::query_as::<_, Order>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(orders)
    }
}

// =============================================================================
// Helpers
// =============================================================================

async fn fetch_order(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Order>> {
    let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1");

    let order = sqlx::query_as::<_, Order>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(order)
}

async fn append_event(
    conn: &mut SqliteConnection,
    order_id: &str,
    from: Option<OrderStatus>,
    to: OrderStatus,
    actor_id: &str,
    at: DateTime<Utc>,
) -> DbResult<OrderEvent> {
    let result = sqlx::query(
        r#"
        INSERT INTO order_events (order_id, from_status, to_status, actor_id, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
    )
    .bind(order_id)
    .bind(from)
    .bind(to)
    .bind(actor_id)
    .bind(at)
    .execute(&mut *conn)
    .await?;

    Ok(OrderEvent {
        id: result.last_insert_rowid(),
        order_id: order_id.to_string(),
        from_status: from,
        to_status: to,
        actor_id: actor_id.to_string(),
        created_at: at,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
