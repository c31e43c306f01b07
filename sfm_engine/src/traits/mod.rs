//! # Backend contracts
//!
//! This module defines the behaviour a storage backend and a payment gateway need to expose to drive the marketplace.
//!
//! * [`MarketplaceDatabase`] is the highest level of behaviour. Each method is one atomic unit of work: placing an
//!   order (stock reservation, order rows and payment intent), applying a gateway notification (payment, order and
//!   balance), a guarded order status change, and a withdrawal (balance debit and withdrawal record).
//! * [`AccountManagement`] provides read-only queries over orders, payments, balances and withdrawals.
//! * [`ListingManagement`] covers the small part of the listing and business catalogue the core needs: reading a
//!   listing, and inserting listings and business profiles for tooling and tests.
//! * [`PaymentGateway`] is the outbound seam to the external payment processor.
mod account_management;
mod data_objects;
mod listing_management;
mod marketplace_database;
mod payment_gateway;

pub use account_management::{AccountApiError, AccountManagement};
pub use data_objects::{OrderDetails, PaymentUpdate, PlacedOrder, ReconcileOutcome};
pub use listing_management::ListingManagement;
pub use marketplace_database::{ConflictError, ErrorCategory, MarketplaceDatabase, MarketplaceError, ValidationError};
pub use payment_gateway::{GatewayError, GatewayTransaction, PaymentGateway, TransactionItem, TransactionRequest};
