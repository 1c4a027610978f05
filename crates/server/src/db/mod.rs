//! Database operations for the record-store collaborator.
//!
//! `PostgreSQL` is the system of record for payment and asset rows only; the
//! letters themselves live in the local letter store.
//!
//! ## Tables
//!
//! - `letter_images` - Uploaded image tracking (storage path per letter)
//! - `letter_settings` - Music URL and visual effect per letter
//! - `paid_letters` - Payment lifecycle rows, keyed to checkout sessions
//! - `customers` - Customers created in the payment path
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via
//! `sqlx migrate run`.

pub mod images;
pub mod payments;
pub mod settings;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use images::ImageRepository;
pub use payments::{CustomerRepository, PaymentRepository};
pub use settings::SettingsRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
