//! Stripe hosted-checkout client.
//!
//! Implements the two calls the payment flow needs: creating a hosted
//! checkout session (one-shot `payment` mode, single line item) and
//! retrieving a session to reconcile its final status. Requests go to the
//! Stripe REST API as form-encoded bodies; no SDK.

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::Deserialize;
use thiserror::Error;

use cartinha_core::PaymentStatus;

use crate::config::StripeConfig;

/// Errors that can occur when talking to Stripe.
#[derive(Debug, Error)]
pub enum StripeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Session was created but carries no redirect URL.
    #[error("checkout session has no URL")]
    MissingUrl,

    /// Failed to build the client or parse a response.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Parameters for creating a hosted checkout session.
#[derive(Debug, Clone)]
pub struct CreateSessionParams {
    /// Customer email for the checkout page.
    pub customer_email: String,
    /// Line-item product name (e.g. "Carta de Amor (basic)").
    pub product_name: String,
    /// Line-item description (e.g. "Carta ID: abc123").
    pub product_description: String,
    /// Unit amount in minor units (centavos).
    pub unit_amount: i64,
    /// Lowercase ISO currency code (e.g. "brl").
    pub currency: String,
    /// Letter ID carried in the session metadata.
    pub letter_id: String,
    /// Customer name carried in the session metadata ("" when absent).
    pub customer_name: String,
    /// Customer phone carried in the session metadata ("" when absent).
    pub phone: String,
    /// Redirect URL after successful payment.
    pub success_url: String,
    /// Redirect URL when checkout is cancelled.
    pub cancel_url: String,
}

/// A created checkout session.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    /// Opaque session identifier (`cs_...`).
    pub id: String,
    /// Hosted checkout URL to redirect the user to.
    pub url: String,
}

/// A retrieved checkout session, as the reconciler sees it.
#[derive(Debug, Clone, Deserialize)]
pub struct RetrievedSession {
    /// Opaque session identifier.
    pub id: String,
    /// Session lifecycle status (`open`, `complete`, `expired`, ...).
    #[serde(default)]
    pub status: Option<String>,
    /// Payment status (`paid`, `unpaid`, `no_payment_required`).
    #[serde(default)]
    pub payment_status: Option<String>,
}

impl RetrievedSession {
    /// Map the processor's state onto our payment status.
    ///
    /// `paid` wins: a paid session is `completed` regardless of its
    /// lifecycle status. An `expired` or `canceled` session is `failed`.
    /// Everything else remains `pending`.
    #[must_use]
    pub fn payment_status(&self) -> PaymentStatus {
        map_session_status(
            self.payment_status.as_deref(),
            self.status.as_deref(),
        )
    }
}

/// Deterministic processor-state mapping used by the reconciler.
#[must_use]
pub fn map_session_status(
    payment_status: Option<&str>,
    session_status: Option<&str>,
) -> PaymentStatus {
    if payment_status == Some("paid") {
        return PaymentStatus::Completed;
    }
    match session_status {
        Some("expired" | "canceled") => PaymentStatus::Failed,
        _ => PaymentStatus::Pending,
    }
}

/// Stripe API client.
#[derive(Clone)]
pub struct StripeClient {
    client: reqwest::Client,
    api_base: String,
}

impl StripeClient {
    /// Create a new Stripe client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &StripeConfig) -> Result<Self, StripeError> {
        let mut headers = HeaderMap::new();

        let auth_value = format!("Bearer {}", config.secret_key.expose_secret());
        let mut auth_header = HeaderValue::from_str(&auth_value)
            .map_err(|e| StripeError::Parse(format!("Invalid API key format: {e}")))?;
        auth_header.set_sensitive(true);
        headers.insert("Authorization", auth_header);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            api_base: config.api_base.clone(),
        })
    }

    /// Create a hosted checkout session and return its redirect URL.
    ///
    /// # Errors
    ///
    /// Returns [`StripeError::Api`] on a non-success response and
    /// [`StripeError::MissingUrl`] when the session has no URL.
    pub async fn create_checkout_session(
        &self,
        params: &CreateSessionParams,
    ) -> Result<CheckoutSession, StripeError> {
        let url = format!("{}/v1/checkout/sessions", self.api_base);

        let unit_amount = params.unit_amount.to_string();
        let form: Vec<(&str, &str)> = vec![
            ("mode", "payment"),
            ("payment_method_types[0]", "card"),
            ("customer_email", &params.customer_email),
            ("line_items[0][quantity]", "1"),
            ("line_items[0][price_data][currency]", &params.currency),
            ("line_items[0][price_data][unit_amount]", &unit_amount),
            (
                "line_items[0][price_data][product_data][name]",
                &params.product_name,
            ),
            (
                "line_items[0][price_data][product_data][description]",
                &params.product_description,
            ),
            ("metadata[letterId]", &params.letter_id),
            ("metadata[customerName]", &params.customer_name),
            ("metadata[phone]", &params.phone),
            ("success_url", &params.success_url),
            ("cancel_url", &params.cancel_url),
        ];

        let response = self.client.post(&url).form(&form).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(StripeError::Api {
                status: status.as_u16(),
                message,
            });
        }

        #[derive(Deserialize)]
        struct SessionResponse {
            id: String,
            url: Option<String>,
        }

        let session: SessionResponse = response
            .json()
            .await
            .map_err(|e| StripeError::Parse(e.to_string()))?;

        let redirect_url = session.url.ok_or(StripeError::MissingUrl)?;

        Ok(CheckoutSession {
            id: session.id,
            url: redirect_url,
        })
    }

    /// Retrieve a checkout session by its ID.
    ///
    /// # Errors
    ///
    /// Returns [`StripeError::Api`] on a non-success response.
    pub async fn retrieve_session(
        &self,
        session_id: &str,
    ) -> Result<RetrievedSession, StripeError> {
        let url = format!("{}/v1/checkout/sessions/{session_id}", self.api_base);

        let response = self.client.get(&url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(StripeError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| StripeError::Parse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paid_maps_to_completed() {
        assert_eq!(
            map_session_status(Some("paid"), Some("complete")),
            PaymentStatus::Completed
        );
        // paid wins even over a stale lifecycle status
        assert_eq!(
            map_session_status(Some("paid"), Some("expired")),
            PaymentStatus::Completed
        );
    }

    #[test]
    fn test_expired_and_canceled_map_to_failed() {
        assert_eq!(
            map_session_status(Some("unpaid"), Some("expired")),
            PaymentStatus::Failed
        );
        assert_eq!(
            map_session_status(None, Some("canceled")),
            PaymentStatus::Failed
        );
    }

    #[test]
    fn test_everything_else_stays_pending() {
        assert_eq!(
            map_session_status(Some("unpaid"), Some("open")),
            PaymentStatus::Pending
        );
        assert_eq!(map_session_status(None, None), PaymentStatus::Pending);
        assert_eq!(
            map_session_status(Some("no_payment_required"), Some("complete")),
            PaymentStatus::Pending
        );
    }

    #[test]
    fn test_mapping_is_idempotent_on_terminal_states() {
        // Re-running the reconciler with the same processor state must
        // produce the same stored status.
        let first = map_session_status(Some("paid"), Some("complete"));
        let second = map_session_status(Some("paid"), Some("complete"));
        assert_eq!(first, second);

        let first = map_session_status(Some("unpaid"), Some("expired"));
        let second = map_session_status(Some("unpaid"), Some("expired"));
        assert_eq!(first, second);
    }

    #[test]
    fn test_retrieved_session_delegates_to_mapping() {
        let session = RetrievedSession {
            id: "cs_test_123".to_string(),
            status: Some("complete".to_string()),
            payment_status: Some("paid".to_string()),
        };
        assert_eq!(session.payment_status(), PaymentStatus::Completed);
    }
}
