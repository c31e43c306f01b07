//! # Marketplace engine public API
//!
//! The `engine_api` module exposes the programmatic API for the marketplace core. Each API wraps a backend that
//! implements the traits in [`crate::traits`], so the same flows run against SQLite in production and in tests.
//!
//! * [`order_flow_api`] places orders and moves them through their lifecycle for buyers and businesses.
//! * [`webhook_api`] authenticates payment gateway notifications and settles payments.
//! * [`withdrawal_api`] debits business balances for payouts.
//! * [`accounts_api`] provides read-only views of orders, payments, balances and withdrawals.
//!
//! [`order_objects`] holds the order status state machine and [`gateway_objects`] the gateway's vocabulary.
//!
//! # API usage
//!
//! ```rust,ignore
//! use sfm_engine::{OrderFlowApi, SqliteDatabase};
//! let db = SqliteDatabase::new_with_url("sqlite://data/sfm_store.db", 25).await?;
//! let api = OrderFlowApi::new(db, gateway);
//! let placed = api.place_order(new_order).await?;
//! ```
pub mod accounts_api;
pub mod gateway_objects;
pub mod order_flow_api;
pub mod order_objects;
pub mod webhook_api;
pub mod withdrawal_api;
