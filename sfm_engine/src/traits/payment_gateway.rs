use thiserror::Error;

use crate::db_types::Rupiah;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    #[error("The payment gateway could not be reached: {0}")]
    Unreachable(String),
    #[error("The payment gateway did not respond in time")]
    Timeout,
    #[error("The payment gateway rejected the transaction: {0}")]
    Rejected(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionItem {
    pub listing_id: i64,
    pub name: String,
    pub unit_price: Rupiah,
    pub quantity: i64,
}

/// Everything the gateway needs to open a payment for one sell order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRequest {
    /// The gateway order reference. See [`crate::helpers::GatewayOrderRef`].
    pub order_reference: String,
    pub gross_amount: Rupiah,
    /// Empty means "whatever the gateway client is configured with"
    pub enabled_methods: Vec<String>,
    pub customer_email: Option<String>,
    pub items: Vec<TransactionItem>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayTransaction {
    pub token: String,
    pub redirect_url: String,
}

/// The outbound half of the payment gateway integration. The inbound half (notifications) is handled by
/// [`crate::WebhookApi`].
///
/// Implementations must bound the call with a timeout; it runs inside the order placement transaction.
#[allow(async_fn_in_trait)]
pub trait PaymentGateway {
    async fn create_transaction(&self, request: TransactionRequest) -> Result<GatewayTransaction, GatewayError>;
}
