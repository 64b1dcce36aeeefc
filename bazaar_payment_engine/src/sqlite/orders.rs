use log::{debug, trace};
use sqlx::SqliteConnection;

use crate::{
    db_types::{NewOrder, Order, OrderId},
    traits::FulfillmentError,
};

/// Inserts a new order into the database using the given connection. You can embed this call
/// inside a transaction if you need atomicity with other writes, and pass `&mut *tx` as the
/// connection argument.
pub async fn insert_order(order: NewOrder, conn: &mut SqliteConnection) -> Result<Order, FulfillmentError> {
    let line_items = serde_json::to_string(&order.line_items)
        .map_err(|e| FulfillmentError::DatabaseError(format!("Could not serialize line items. {e}")))?;
    let order: Order = sqlx::query_as(
        r#"
            INSERT INTO orders (
                order_id,
                user_id,
                external_order_id,
                total_price,
                currency,
                line_items,
                created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *;
        "#,
    )
    .bind(order.order_id)
    .bind(order.user_id)
    .bind(order.external_order_id)
    .bind(order.total_price.value())
    .bind(order.currency)
    .bind(line_items)
    .bind(order.created_at)
    .fetch_one(conn)
    .await?;
    debug!("📝️ Order [{}] inserted with id {}", order.order_id, order.id);
    Ok(order)
}

pub async fn fetch_order_by_order_id(
    order_id: &OrderId,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order =
        sqlx::query_as("SELECT * FROM orders WHERE order_id = $1").bind(order_id.as_str()).fetch_optional(conn).await?;
    Ok(order)
}

pub async fn fetch_order_by_external_id(
    external_order_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE external_order_id = $1")
        .bind(external_order_id)
        .fetch_optional(conn)
        .await?;
    Ok(order)
}

/// All orders for the user, newest first.
pub async fn fetch_orders_for_user(user_id: &str, conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    let orders = sqlx::query_as("SELECT * FROM orders WHERE user_id = $1 ORDER BY created_at DESC")
        .bind(user_id)
        .fetch_all(conn)
        .await?;
    Ok(orders)
}

/// The conditional `Created -> Captured` transition. The WHERE clause is the linchpin of
/// idempotency: of any number of concurrent callers, exactly one sees a row come back.
pub async fn transition_to_captured(
    order_id: &OrderId,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, FulfillmentError> {
    let result: Option<Order> = sqlx::query_as(
        r#"
            UPDATE orders
            SET status = 'Captured', captured_at = CURRENT_TIMESTAMP, updated_at = CURRENT_TIMESTAMP
            WHERE order_id = $1 AND status = 'Created'
            RETURNING *
        "#,
    )
    .bind(order_id.as_str())
    .fetch_optional(conn)
    .await?;
    trace!("📝️ Conditional capture transition for {order_id}: won = {}", result.is_some());
    Ok(result)
}

/// The conditional `Created -> Failed` transition, used when the processor reports a permanent
/// error. A capture that already won keeps the order `Captured`.
pub async fn transition_to_failed(
    order_id: &OrderId,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, FulfillmentError> {
    let result: Option<Order> = sqlx::query_as(
        r#"
            UPDATE orders
            SET status = 'Failed', updated_at = CURRENT_TIMESTAMP
            WHERE order_id = $1 AND status = 'Created'
            RETURNING *
        "#,
    )
    .bind(order_id.as_str())
    .fetch_optional(conn)
    .await?;
    trace!("📝️ Conditional fail transition for {order_id}: won = {}", result.is_some());
    Ok(result)
}
