use log::{debug, trace};
use sqlx::SqliteConnection;

use crate::{
    db_types::{BusinessProfile, NewBusiness, Rupiah},
    traits::MarketplaceError,
};

pub async fn insert_business(
    business: NewBusiness,
    conn: &mut SqliteConnection,
) -> Result<BusinessProfile, MarketplaceError> {
    let profile: BusinessProfile = sqlx::query_as(
        "INSERT INTO business_profiles (user_id, business_name, balance) VALUES ($1, $2, 0) RETURNING *;",
    )
    .bind(business.user_id)
    .bind(&business.business_name)
    .fetch_one(conn)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(err) if err.is_unique_violation() => MarketplaceError::DatabaseError(format!(
            "A business profile already exists for user {}",
            business.user_id
        )),
        _ => MarketplaceError::from(e),
    })?;
    debug!("🏪️ Business profile '{}' created for user {}", profile.business_name, profile.user_id);
    Ok(profile)
}

pub async fn fetch_business(business_id: i64, conn: &mut SqliteConnection) -> Result<Option<BusinessProfile>, sqlx::Error> {
    let profile = sqlx::query_as("SELECT * FROM business_profiles WHERE user_id = $1")
        .bind(business_id)
        .fetch_optional(conn)
        .await?;
    Ok(profile)
}

/// Adds `amount` to the balance in the database (`balance = balance + amount`). Returns the new balance, or `None`
/// if there is no profile for `business_id`.
pub async fn credit_balance(
    business_id: i64,
    amount: Rupiah,
    conn: &mut SqliteConnection,
) -> Result<Option<Rupiah>, sqlx::Error> {
    let balance: Option<Rupiah> = sqlx::query_scalar(
        r#"
            UPDATE business_profiles SET balance = balance + $1, updated_at = CURRENT_TIMESTAMP
            WHERE user_id = $2
            RETURNING balance;
        "#,
    )
    .bind(amount)
    .bind(business_id)
    .fetch_optional(conn)
    .await?;
    if let Some(b) = balance {
        trace!("🏪️ Business {business_id} credited {amount}. Balance is now {b}");
    }
    Ok(balance)
}

/// Subtracts `amount` from the balance, but only if the balance covers it. Returns the new balance, or `None` if the
/// balance is too low or the business does not exist.
pub async fn debit_balance(
    business_id: i64,
    amount: Rupiah,
    conn: &mut SqliteConnection,
) -> Result<Option<Rupiah>, sqlx::Error> {
    let balance: Option<Rupiah> = sqlx::query_scalar(
        r#"
            UPDATE business_profiles SET balance = balance - $1, updated_at = CURRENT_TIMESTAMP
            WHERE user_id = $2 AND balance >= $1
            RETURNING balance;
        "#,
    )
    .bind(amount)
    .bind(business_id)
    .fetch_optional(conn)
    .await?;
    if let Some(b) = balance {
        trace!("🏪️ Business {business_id} debited {amount}. Balance is now {b}");
    }
    Ok(balance)
}
