use thiserror::Error;

use crate::{
    db_types::{NewOrder, NewWithdrawal, Order, OrderStatusType, OrderType, Payment, Withdrawal},
    traits::{
        data_objects::{PaymentUpdate, PlacedOrder, ReconcileOutcome},
        AccountApiError,
        AccountManagement,
        GatewayError,
        ListingManagement,
        PaymentGateway,
    },
};

/// This trait defines the highest level of behaviour for backends supporting the marketplace.
///
/// Every method runs as a single atomic transaction. If any step fails, nothing is committed.
#[allow(async_fn_in_trait)]
pub trait MarketplaceDatabase: Clone + AccountManagement + ListingManagement {
    /// The URL of the database
    fn url(&self) -> &str;

    /// Reserves stock and records a new order.
    ///
    /// * Each listing is re-read inside the transaction, checked against the order's business and type, and its
    ///   quantity is decremented with a guarded update, so concurrent placements can never oversell.
    /// * Line item prices are the listing's current final price (free for donations), and the total is their sum.
    /// * Sell orders get a `pending` payment intent, and `gateway` is asked to open a transaction for it. A gateway
    ///   failure aborts the whole unit of work, including the stock reservation.
    ///
    /// Input validation that does not need the store (empty cart, missing address, bad quantities) is performed by
    /// [`crate::OrderFlowApi`] before this is called.
    async fn place_order<G: PaymentGateway>(&self, order: NewOrder, gateway: &G)
        -> Result<PlacedOrder, MarketplaceError>;

    /// Applies an authenticated gateway notification.
    ///
    /// The payment for the order only moves out of `pending` once. Notifications that arrive after that are
    /// acknowledged without touching anything ([`ReconcileOutcome::Unchanged`]). On the move to `success`, a
    /// settlement is journalled and the business balance credited by `gross_amount`, in the same transaction.
    async fn apply_payment_update(&self, update: PaymentUpdate) -> Result<ReconcileOutcome, MarketplaceError>;

    /// Moves an order from `expected` to `new_status`, failing with `InvalidTransition` if the order is no longer in
    /// `expected` by the time the update runs.
    async fn update_order_status(
        &self,
        order_id: i64,
        expected: OrderStatusType,
        new_status: OrderStatusType,
    ) -> Result<Order, MarketplaceError>;

    /// Records the gateway transaction id reported by the buyer's client on a still-pending payment. Payment status
    /// is left untouched: only a signed gateway notification can settle a payment.
    async fn record_client_transaction_id(&self, order_id: i64, transaction_id: &str)
        -> Result<Payment, MarketplaceError>;

    /// Debits the business balance and records a `pending` withdrawal. The debit is conditional on the balance
    /// covering the amount, and a duplicate `transaction_id` undoes the debit.
    async fn request_withdrawal(&self, withdrawal: NewWithdrawal) -> Result<Withdrawal, MarketplaceError>;

    /// Closes all connections.
    async fn close(&mut self) -> Result<(), MarketplaceError>;
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("An order needs at least one item")]
    EmptyCart,
    #[error("Delivery orders need a delivery address")]
    MissingAddress,
    #[error("Item quantities must be greater than zero")]
    InvalidQuantity,
    #[error("An order cannot mix {0} and {1} listings")]
    MixedOrderType(OrderType, OrderType),
    #[error("Listing {0} does not belong to the business the order is placed with")]
    ListingNotFromBusiness(i64),
    #[error("Cannot move order from {from} to {to}")]
    InvalidTransition { from: OrderStatusType, to: OrderStatusType },
    #[error("The amount must be greater than zero")]
    InvalidAmount,
    #[error("A withdrawal destination is required")]
    MissingDestination,
    #[error("A transaction id is required")]
    MissingTransactionId,
    #[error("Order {0} has already been paid")]
    AlreadyPaid(i64),
    #[error("Order {0} is not a sell order")]
    NotASellOrder(i64),
    #[error("Invalid gross amount: {0}")]
    InvalidGrossAmount(String),
    #[error("The order total is too large")]
    TotalOverflow,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConflictError {
    #[error("Insufficient stock for listing {listing_id}. Requested {requested}, available {available}")]
    InsufficientStock { listing_id: i64, requested: i64, available: i64 },
    #[error("Insufficient balance for business {0}")]
    InsufficientBalance(i64),
    #[error("A withdrawal with transaction id {0} already exists")]
    DuplicateWithdrawal(String),
}

#[derive(Debug, Clone, Error)]
pub enum MarketplaceError {
    #[error("{0}")]
    Validation(#[from] ValidationError),
    #[error("The notification signature is invalid")]
    InvalidSignature,
    #[error("Not allowed: {0}")]
    Authorization(String),
    #[error("Listing {0} does not exist")]
    ListingNotFound(i64),
    #[error("Order {0} does not exist")]
    OrderNotFound(i64),
    #[error("Business {0} does not exist")]
    BusinessNotFound(i64),
    #[error("There is no payment for order {0}")]
    PaymentNotFound(i64),
    #[error("{0}")]
    UnknownGatewayReference(String),
    #[error("{0}")]
    Conflict(#[from] ConflictError),
    #[error("Payment gateway error: {0}")]
    ExternalServiceError(String),
    #[error("{0}")]
    AccountError(#[from] AccountApiError),
    #[error("We have an internal database engine (configuration/uptime etc.) : {0}")]
    DatabaseError(String),
}

/// Coarse classification of [`MarketplaceError`], used by callers to pick a response and decide on retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Authentication,
    Authorization,
    NotFound,
    Conflict,
    ExternalService,
    Internal,
}

impl MarketplaceError {
    pub fn category(&self) -> ErrorCategory {
        use MarketplaceError::*;
        match self {
            Validation(_) => ErrorCategory::Validation,
            InvalidSignature => ErrorCategory::Authentication,
            Authorization(_) => ErrorCategory::Authorization,
            ListingNotFound(_) | OrderNotFound(_) | BusinessNotFound(_) | PaymentNotFound(_) => ErrorCategory::NotFound,
            UnknownGatewayReference(_) => ErrorCategory::NotFound,
            Conflict(_) => ErrorCategory::Conflict,
            ExternalServiceError(_) => ErrorCategory::ExternalService,
            AccountError(_) | DatabaseError(_) => ErrorCategory::Internal,
        }
    }

    /// Whether a caller that did not cause the failure should try again. Gateway notifications use this to choose
    /// between a 5xx (retry) and a 4xx (give up).
    pub fn is_retryable(&self) -> bool {
        matches!(self.category(), ErrorCategory::Internal | ErrorCategory::ExternalService)
    }
}

impl From<sqlx::Error> for MarketplaceError {
    fn from(e: sqlx::Error) -> Self {
        MarketplaceError::DatabaseError(e.to_string())
    }
}

impl From<GatewayError> for MarketplaceError {
    fn from(e: GatewayError) -> Self {
        MarketplaceError::ExternalServiceError(e.to_string())
    }
}
