//! Pemmob API - REST backend for the Pemmob mobile shop.
//!
//! Serves catalog browsing, checkout and user account endpoints on top of
//! Axum and SeaORM.
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **domain**: Core business entities and value objects
//! - **services**: Use cases (catalog, checkout, accounts, auth)
//! - **infra**: Database, repositories and Unit of Work
//! - **api**: HTTP handlers, middleware, and routes
//! - **types**: Response envelope and pagination
//! - **errors**: Centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! # Start the server
//! cargo run -- serve
//!
//! # Run migrations
//! cargo run -- migrate up
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod services;
pub mod types;

// Re-export commonly used types at crate root
pub use api::AppState;
pub use config::Config;
pub use domain::{Password, Transaction, TransactionStatus, User, UserRole};
pub use errors::{AppError, AppResult, StatusPolicy};
