//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                                  - Landing page
//! GET  /health                            - Health check
//!
//! # Letter viewer (server-rendered)
//! GET  /letter/{id}                       - Letter page (unlock form when locked)
//! POST /letter/{id}/unlock                - Password gate
//! GET  /letter/{id}/success               - Share link + payment status page
//!
//! # Letter API
//! POST /api/letters                       - Compose and save a letter
//! GET  /api/letters/{id}                  - Fetch a stored letter
//! GET  /api/plans                         - Plan catalog
//!
//! # Images
//! POST   /api/letters/{id}/images         - Upload images (multipart)
//! DELETE /api/letters/{id}/images/{index} - Remove one image
//!
//! # Payments (CORS: permissive, answers OPTIONS preflight)
//! POST /api/create-payment                - Create hosted checkout session
//! POST /api/update-payment-status         - Reconcile a session's final status
//! GET  /api/letters/{id}/payment-status   - Poll the stored payment status
//! ```

pub mod images;
pub mod letters;
pub mod payments;
pub mod view;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
};
use tower_http::cors::CorsLayer;

use crate::state::AppState;

/// Body limit for image upload batches.
const UPLOAD_BODY_LIMIT: usize = 20 * 1024 * 1024;

/// Create the letter API routes router.
pub fn letter_routes() -> Router<AppState> {
    Router::new()
        .route("/letters", post(letters::create))
        .route("/letters/{id}", get(letters::show))
        .route("/plans", get(letters::plans_index))
        .route("/letters/{id}/images", post(images::upload))
        .route("/letters/{id}/images/{index}", delete(images::remove))
        .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT))
}

/// Create the payment routes router.
///
/// The status-update endpoint is called from the post-redirect page, so the
/// whole group answers CORS preflight permissively.
pub fn payment_routes() -> Router<AppState> {
    Router::new()
        .route("/create-payment", post(payments::create_payment))
        .route("/update-payment-status", post(payments::update_payment_status))
        .route("/letters/{id}/payment-status", get(payments::payment_status))
        .layer(CorsLayer::permissive())
}

/// Create the viewer routes router.
pub fn viewer_routes() -> Router<AppState> {
    Router::new()
        .route("/letter/{id}", get(view::show))
        .route("/letter/{id}/unlock", post(view::unlock))
        .route("/letter/{id}/success", get(view::success))
}

/// Create all routes for the server.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(view::home))
        .merge(viewer_routes())
        .nest("/api", letter_routes().merge(payment_routes()))
}
