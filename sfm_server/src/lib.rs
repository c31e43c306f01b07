//! # Surplus food marketplace server
//! This crate hosts the HTTP server for the marketplace's order, payment and withdrawal flows. It is responsible for:
//! * Authenticating callers from their bearer token.
//! * Handing order placement, status changes and withdrawals to the engine, and mapping engine errors to HTTP status
//!   codes.
//! * Receiving Midtrans payment notifications and telling the gateway whether to retry them.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/api/...`: Order, payment, withdrawal and balance routes. All of them need an `Authorization: Bearer` token.
//! * `/webhook/midtrans`: The receiver for Midtrans payment notifications. Optionally restricted to an IP whitelist.

pub mod auth;
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;

pub mod helpers;
pub mod integrations;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
