//! Minimart storefront library.
//!
//! A small shop: browse the catalog, register, log in, collect products in a
//! per-user cart and check out. Everything a request needs lives in
//! `PostgreSQL` (accounts, catalog, carts, sessions), so any number of server
//! processes can share one database.
//!
//! The binary in `main.rs` wires configuration, tracing and Sentry around
//! [`routes::app`]; the CLI reuses [`db`] for migrations and seeding.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
