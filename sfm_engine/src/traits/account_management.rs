use thiserror::Error;

use crate::db_types::{BusinessProfile, Order, OrderLineItem, Payment, Withdrawal};

#[derive(Debug, Clone, Error)]
pub enum AccountApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for AccountApiError {
    fn from(e: sqlx::Error) -> Self {
        AccountApiError::DatabaseError(e.to_string())
    }
}

/// Read-only queries over orders, payments, balances and withdrawals.
///
/// Nothing here is cached: every call reads the current committed state.
#[allow(async_fn_in_trait)]
pub trait AccountManagement {
    async fn fetch_order(&self, order_id: i64) -> Result<Option<Order>, AccountApiError>;

    async fn fetch_order_items(&self, order_id: i64) -> Result<Vec<OrderLineItem>, AccountApiError>;

    /// The payment intent for a sell order. Donation orders have none.
    async fn fetch_payment_for_order(&self, order_id: i64) -> Result<Option<Payment>, AccountApiError>;

    /// Orders placed by `buyer_id`, newest first
    async fn fetch_orders_for_buyer(&self, buyer_id: i64) -> Result<Vec<Order>, AccountApiError>;

    /// Orders placed with `business_id`, newest first
    async fn fetch_orders_for_business(&self, business_id: i64) -> Result<Vec<Order>, AccountApiError>;

    async fn fetch_business(&self, business_id: i64) -> Result<Option<BusinessProfile>, AccountApiError>;

    async fn fetch_withdrawals_for_business(&self, business_id: i64) -> Result<Vec<Withdrawal>, AccountApiError>;
}
