use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db_types::{NewWithdrawal, Withdrawal},
    traits::{ConflictError, MarketplaceError},
};

/// Inserts a `pending` withdrawal. A repeated `transaction_id` is rejected by the table's uniqueness constraint and
/// reported as [`ConflictError::DuplicateWithdrawal`].
pub async fn insert_withdrawal(
    withdrawal: NewWithdrawal,
    conn: &mut SqliteConnection,
) -> Result<Withdrawal, MarketplaceError> {
    let txid = withdrawal.transaction_id.clone();
    let record: Withdrawal = sqlx::query_as(
        r#"
            INSERT INTO withdrawals (business_id, amount, destination, status, payment_method, transaction_id)
            VALUES ($1, $2, $3, 'pending', $4, $5)
            RETURNING *;
        "#,
    )
    .bind(withdrawal.business_id)
    .bind(withdrawal.amount)
    .bind(withdrawal.destination.trim())
    .bind(withdrawal.payment_method)
    .bind(withdrawal.transaction_id)
    .fetch_one(conn)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(err) if err.is_unique_violation() => {
            MarketplaceError::from(ConflictError::DuplicateWithdrawal(txid.unwrap_or_default()))
        },
        _ => MarketplaceError::from(e),
    })?;
    debug!("🏦️ Withdrawal #{} of {} recorded for business {}", record.id, record.amount, record.business_id);
    Ok(record)
}

pub async fn fetch_withdrawals_for_business(
    business_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<Withdrawal>, sqlx::Error> {
    let withdrawals = sqlx::query_as("SELECT * FROM withdrawals WHERE business_id = $1 ORDER BY id DESC")
        .bind(business_id)
        .fetch_all(conn)
        .await?;
    Ok(withdrawals)
}
