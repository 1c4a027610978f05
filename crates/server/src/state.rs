//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::ServerConfig;
use crate::services::storage::{StorageClient, StorageError};
use crate::services::stripe::{StripeClient, StripeError};
use crate::store::LetterStore;

/// Error building a service client from configuration.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("stripe client: {0}")]
    Stripe(#[from] StripeError),
    #[error("storage client: {0}")]
    Storage(#[from] StorageError),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the database pool, the letter store, and the
/// external-service clients.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    pool: PgPool,
    letters: LetterStore,
    stripe: StripeClient,
    storage: StorageClient,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if a service client cannot be built from the
    /// configuration.
    pub fn new(config: ServerConfig, pool: PgPool) -> Result<Self, StateError> {
        let letters = LetterStore::new(config.letters_path.clone());
        let stripe = StripeClient::new(&config.stripe)?;
        let storage = StorageClient::new(&config.storage)?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                letters,
                stripe,
                storage,
            }),
        })
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the letter store.
    #[must_use]
    pub fn letters(&self) -> &LetterStore {
        &self.inner.letters
    }

    /// Get a reference to the Stripe client.
    #[must_use]
    pub fn stripe(&self) -> &StripeClient {
        &self.inner.stripe
    }

    /// Get a reference to the object-storage client.
    #[must_use]
    pub fn storage(&self) -> &StorageClient {
        &self.inner.storage
    }

    /// The absolute share URL for a letter.
    #[must_use]
    pub fn letter_url(&self, letter_id: &str) -> String {
        format!("{}/letter/{letter_id}", self.inner.config.base_url)
    }
}
