use log::{debug, trace};
use sqlx::SqliteConnection;

use crate::{
    db_types::{Payment, PaymentMethod, PaymentStatus, Rupiah},
    traits::GatewayTransaction,
};

/// Inserts a `pending` payment intent for a sell order. The gateway token is filled in by [`attach_gateway_transaction`]
/// once the gateway has been called.
pub async fn insert_payment(
    order_id: i64,
    gateway_reference: &str,
    payment_method: Option<PaymentMethod>,
    conn: &mut SqliteConnection,
) -> Result<Payment, sqlx::Error> {
    let payment: Payment = sqlx::query_as(
        r#"
            INSERT INTO payments (order_id, status, payment_method, gateway_reference) VALUES ($1, 'pending', $2, $3)
            RETURNING *;
        "#,
    )
    .bind(order_id)
    .bind(payment_method)
    .bind(gateway_reference)
    .fetch_one(conn)
    .await?;
    debug!("💳️ Payment intent #{} ({gateway_reference}) created for order #{order_id}", payment.id);
    Ok(payment)
}

pub async fn attach_gateway_transaction(
    payment_id: i64,
    transaction: &GatewayTransaction,
    conn: &mut SqliteConnection,
) -> Result<Payment, sqlx::Error> {
    let payment = sqlx::query_as(
        r#"
            UPDATE payments SET gateway_token = $1, redirect_url = $2, updated_at = CURRENT_TIMESTAMP
            WHERE id = $3
            RETURNING *;
        "#,
    )
    .bind(&transaction.token)
    .bind(&transaction.redirect_url)
    .bind(payment_id)
    .fetch_one(conn)
    .await?;
    Ok(payment)
}

pub async fn fetch_payment_for_order(order_id: i64, conn: &mut SqliteConnection) -> Result<Option<Payment>, sqlx::Error> {
    let payment =
        sqlx::query_as("SELECT * FROM payments WHERE order_id = $1").bind(order_id).fetch_optional(conn).await?;
    Ok(payment)
}

/// The only way a payment status ever changes. The update applies only while the payment is `pending`, which makes
/// concurrent or repeated notifications for the same order race on a single row: exactly one of them gets the row
/// back, the rest get `None`.
///
/// `new_status` may itself be `pending`, in which case only the transaction details are refreshed.
pub async fn update_pending_payment(
    order_id: i64,
    new_status: PaymentStatus,
    transaction_id: Option<&str>,
    payment_method: Option<PaymentMethod>,
    conn: &mut SqliteConnection,
) -> Result<Option<Payment>, sqlx::Error> {
    let payment: Option<Payment> = sqlx::query_as(
        r#"
            UPDATE payments SET
                status = $1,
                transaction_id = COALESCE($2, transaction_id),
                payment_method = COALESCE($3, payment_method),
                updated_at = CURRENT_TIMESTAMP
            WHERE order_id = $4 AND status = 'pending'
            RETURNING *;
        "#,
    )
    .bind(new_status)
    .bind(transaction_id)
    .bind(payment_method)
    .bind(order_id)
    .fetch_optional(conn)
    .await?;
    if let Some(p) = &payment {
        trace!("💳️ Payment #{} for order #{order_id} is now {}", p.id, p.status);
    }
    Ok(payment)
}

/// Writes the settlement journal entry for an order. Returns `false` if the order has already been settled, in which
/// case nothing was written.
pub async fn journal_settlement(
    order_id: i64,
    payment_id: i64,
    business_id: i64,
    amount: Rupiah,
    conn: &mut SqliteConnection,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
            INSERT INTO settlement_journal (order_id, payment_id, business_id, amount) VALUES ($1, $2, $3, $4)
            ON CONFLICT (order_id) DO NOTHING;
        "#,
    )
    .bind(order_id)
    .bind(payment_id)
    .bind(business_id)
    .bind(amount)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() == 1)
}

pub async fn settlement_count(order_id: i64, conn: &mut SqliteConnection) -> Result<i64, sqlx::Error> {
    let count = sqlx::query_scalar("SELECT COUNT(*) FROM settlement_journal WHERE order_id = $1")
        .bind(order_id)
        .fetch_one(conn)
        .await?;
    Ok(count)
}
