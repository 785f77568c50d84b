//! # Marketplace escrow settlement server
//!
//! This crate hosts the HTTP surface for the settlement engine. It is responsible for:
//! * receiving escrow placements from the payment gateway once a buyer's funds have been captured,
//! * taking completion confirmations, cancellations and dispute requests from the order parties,
//! * serving the read side: order status, wallet balances and transaction history.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Identity
//! Authentication happens upstream at the marketplace API gateway, which forwards the caller's user id in the
//! `mes-user-id` header. See the [auth] module.

pub mod auth;
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
