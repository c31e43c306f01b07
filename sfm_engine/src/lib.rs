//! Surplus Food Marketplace engine
//!
//! This library contains the order, payment and inventory core of the marketplace: placing orders against listings
//! without overselling, the order status lifecycle, settling payments from gateway notifications exactly once, and
//! business balances and withdrawals. It knows nothing about HTTP or about any particular gateway.
//!
//! The library is divided into three main sections:
//! 1. Backend contracts ([`mod@traits`]) and the SQLite backend that implements them. The data types stored in the
//!    database are defined in [`db_types`] and are public.
//! 2. The engine public API ([`OrderFlowApi`], [`WebhookApi`], [`WithdrawalApi`], [`AccountApi`]). An API instance
//!    wraps a backend, and every state change it makes is a single database transaction.
//! 3. Helpers for the gateway reference format and notification signatures ([`mod@helpers`]).
mod engine_api;
#[cfg(feature = "sqlite")]
mod sqlite;

pub mod db_types;
pub mod helpers;
pub mod traits;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

pub use engine_api::{
    accounts_api::AccountApi,
    gateway_objects,
    order_flow_api::OrderFlowApi,
    order_objects,
    webhook_api::WebhookApi,
    withdrawal_api::WithdrawalApi,
};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
