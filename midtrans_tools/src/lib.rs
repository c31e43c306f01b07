//! Thin client for the Midtrans Snap API, plus the wire types for Midtrans HTTP notifications.
mod api;
mod config;
mod data_objects;
mod error;

pub use api::MidtransApi;
pub use config::{MidtransConfig, DEFAULT_ENABLED_PAYMENTS};
pub use data_objects::{
    CustomerDetails,
    ItemDetails,
    MidtransNotification,
    SnapErrorResponse,
    SnapTransaction,
    SnapTransactionRequest,
    TransactionDetails,
};
pub use error::MidtransApiError;
