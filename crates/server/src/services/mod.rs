//! Clients for external collaborators.
//!
//! - [`stripe`] - Hosted checkout sessions against the Stripe REST API
//! - [`storage`] - Letter image objects against the storage REST API

pub mod storage;
pub mod stripe;

pub use storage::StorageClient;
pub use stripe::StripeClient;
