use log::{debug, trace};
use sqlx::SqliteConnection;

use crate::db_types::{DeliveryMethod, Order, OrderLineItem, OrderStatusType, OrderType, Rupiah};

/// Row values for a new order. Built by the placement flow once stock has been reserved and priced.
#[derive(Debug, Clone)]
pub struct OrderRow<'a> {
    pub buyer_id: i64,
    pub business_id: i64,
    pub order_type: OrderType,
    pub total_amount: Rupiah,
    pub delivery_method: DeliveryMethod,
    pub delivery_address: Option<&'a str>,
}

/// Inserts a new order using the given connection. This is not atomic. Embed the call inside a transaction together
/// with the line items, passing `&mut *tx` as the connection argument.
///
/// The initial status is derived from the order type.
pub async fn insert_order(row: OrderRow<'_>, conn: &mut SqliteConnection) -> Result<Order, sqlx::Error> {
    let order: Order = sqlx::query_as(
        r#"
            INSERT INTO orders (buyer_id, business_id, order_type, total_amount, status, delivery_method, delivery_address)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *;
        "#,
    )
    .bind(row.buyer_id)
    .bind(row.business_id)
    .bind(row.order_type)
    .bind(row.total_amount)
    .bind(row.order_type.initial_status())
    .bind(row.delivery_method)
    .bind(row.delivery_address)
    .fetch_one(conn)
    .await?;
    debug!("📝️ Order #{} inserted for buyer {} with status {}", order.id, order.buyer_id, order.status);
    Ok(order)
}

pub async fn insert_line_item(
    order_id: i64,
    listing_id: i64,
    quantity: i64,
    price: Rupiah,
    conn: &mut SqliteConnection,
) -> Result<OrderLineItem, sqlx::Error> {
    let item = sqlx::query_as(
        r#"
            INSERT INTO order_items (order_id, listing_id, quantity, price) VALUES ($1, $2, $3, $4)
            RETURNING *;
        "#,
    )
    .bind(order_id)
    .bind(listing_id)
    .bind(quantity)
    .bind(price)
    .fetch_one(conn)
    .await?;
    Ok(item)
}

pub async fn fetch_order(order_id: i64, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE id = $1").bind(order_id).fetch_optional(conn).await?;
    Ok(order)
}

pub async fn fetch_line_items(order_id: i64, conn: &mut SqliteConnection) -> Result<Vec<OrderLineItem>, sqlx::Error> {
    let items = sqlx::query_as("SELECT * FROM order_items WHERE order_id = $1 ORDER BY id")
        .bind(order_id)
        .fetch_all(conn)
        .await?;
    Ok(items)
}

pub async fn fetch_orders_for_buyer(buyer_id: i64, conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    let orders = sqlx::query_as("SELECT * FROM orders WHERE buyer_id = $1 ORDER BY created_at DESC, id DESC")
        .bind(buyer_id)
        .fetch_all(conn)
        .await?;
    Ok(orders)
}

pub async fn fetch_orders_for_business(
    business_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<Order>, sqlx::Error> {
    let orders = sqlx::query_as("SELECT * FROM orders WHERE business_id = $1 ORDER BY created_at DESC, id DESC")
        .bind(business_id)
        .fetch_all(conn)
        .await?;
    Ok(orders)
}

/// Compare-and-set on the order status. The update only happens if the order is still in `expected`, and the updated
/// order is returned. `None` means the order does not exist or has since moved to another status.
pub async fn update_status_if(
    order_id: i64,
    expected: OrderStatusType,
    new_status: OrderStatusType,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order: Option<Order> = sqlx::query_as(
        r#"
            UPDATE orders SET status = $1, updated_at = CURRENT_TIMESTAMP
            WHERE id = $2 AND status = $3
            RETURNING *;
        "#,
    )
    .bind(new_status)
    .bind(order_id)
    .bind(expected)
    .fetch_optional(conn)
    .await?;
    match &order {
        Some(_) => trace!("📝️ Order #{order_id} moved from {expected} to {new_status}"),
        None => trace!("📝️ Order #{order_id} is not {expected}. Status left alone"),
    }
    Ok(order)
}
