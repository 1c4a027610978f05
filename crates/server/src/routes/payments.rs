//! Payment route handlers: checkout initiation and status reconciliation.
//!
//! Checkout creates a hosted session at the processor and records a
//! `pending` paid-letter row before redirecting the buyer. The reconciler
//! endpoint re-reads the session from the processor after redirect and
//! persists the mapped status; it never trusts the redirect query string.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use cartinha_core::{Email, LetterId, PaymentStatus};

use crate::db::{CustomerRepository, PaymentRepository};
use crate::error::{AppError, Result};
use crate::plans;
use crate::services::stripe::CreateSessionParams;
use crate::state::AppState;

/// Buyer contact details collected on the checkout step.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerData {
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// Request body for POST /api/create-payment.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentRequest {
    pub letter_id: String,
    pub customer_data: CustomerData,
    pub plan_id: String,
    /// Price the client composed the letter under; checked against the
    /// catalog rather than trusted.
    pub plan_price: f64,
}

/// Response: where to send the buyer.
#[derive(Debug, Serialize)]
pub struct CreatePaymentResponse {
    pub url: String,
}

/// Request body for POST /api/update-payment-status.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub session_id: String,
}

/// Response for the reconciler endpoint.
#[derive(Debug, Serialize)]
pub struct UpdateStatusResponse {
    pub success: bool,
    pub status: PaymentStatus,
    pub plan_type: String,
    pub letter_id: String,
}

/// Response for GET /api/letters/{id}/payment-status.
#[derive(Debug, Serialize)]
pub struct PaymentStatusResponse {
    pub letter_id: String,
    pub status: Option<PaymentStatus>,
}

/// Create a hosted checkout session for a letter.
///
/// POST /api/create-payment
///
/// Validation (email shape, plan existence, letter existence) happens
/// before any processor call; a rejected request creates nothing. The
/// customer and pending paid-letter rows are written before the session is
/// requested, then the row is stamped with the session ID.
#[instrument(skip(state, body), fields(letter_id = %body.letter_id, plan = %body.plan_id))]
pub async fn create_payment(
    State(state): State<AppState>,
    Json(body): Json<CreatePaymentRequest>,
) -> Result<Json<CreatePaymentResponse>> {
    let letter_id = LetterId::new(body.letter_id.trim().to_string());
    if letter_id.as_str().is_empty() {
        return Err(AppError::Validation("letterId is required".to_string()));
    }

    let email = Email::parse(&body.customer_data.email)?;

    let plan = plans::find(&body.plan_id)
        .ok_or_else(|| AppError::Validation(format!("unknown plan: {}", body.plan_id)))?;

    if state.letters().get(&letter_id).await.is_none() {
        return Err(AppError::NotFound(format!("letter {letter_id}")));
    }

    let claimed = Decimal::from_f64(body.plan_price);
    if claimed != Some(plan.price) {
        return Err(AppError::Validation(format!(
            "price does not match plan {}",
            plan.id
        )));
    }

    let unit_amount = plan
        .as_price()
        .minor_units()
        .ok_or_else(|| AppError::Internal("plan price not representable".to_string()))?;

    let name = body.customer_data.name.as_deref().map(str::trim);
    let phone = body.customer_data.phone.as_deref().map(str::trim);

    let customer_id = CustomerRepository::new(state.pool())
        .create(&email, name, phone)
        .await?;

    let payments = PaymentRepository::new(state.pool());
    let payment_id = payments
        .create_pending(&letter_id, customer_id, &plan.id, plan.price, "brl")
        .await?;

    let session = state
        .stripe()
        .create_checkout_session(&CreateSessionParams {
            customer_email: email.as_str().to_string(),
            product_name: format!("Carta de Amor ({})", plan.id),
            product_description: format!("Carta ID: {letter_id}"),
            unit_amount,
            currency: "brl".to_string(),
            letter_id: letter_id.as_str().to_string(),
            customer_name: name.unwrap_or("").to_string(),
            phone: phone.unwrap_or("").to_string(),
            success_url: format!(
                "{}/letter/{letter_id}/success?payment_success=true&session_id={{CHECKOUT_SESSION_ID}}",
                state.config().base_url
            ),
            cancel_url: format!("{}/create?payment_cancelled=true", state.config().base_url),
        })
        .await?;

    payments.set_session(payment_id, &session.id).await?;

    tracing::info!(
        letter_id = %letter_id,
        session_id = %session.id,
        "Checkout session created"
    );

    Ok(Json(CreatePaymentResponse { url: session.url }))
}

/// Reconcile a checkout session's status into the paid-letter record.
///
/// POST /api/update-payment-status
///
/// Re-retrieves the session from the processor, maps its state onto our
/// status, and persists it unconditionally. Safe to call repeatedly for
/// the same session. The endpoint's contract is `200 {..}` or
/// `400 {error}`; every failure class is clamped to 400 here.
#[instrument(skip(state, body), fields(session_id = %body.session_id))]
pub async fn update_payment_status(
    State(state): State<AppState>,
    Json(body): Json<UpdateStatusRequest>,
) -> Response {
    match reconcile(&state, body.session_id.trim()).await {
        Ok(response) => Json(response).into_response(),
        Err(err) => {
            let mut response = err.into_response();
            *response.status_mut() = StatusCode::BAD_REQUEST;
            response
        }
    }
}

async fn reconcile(state: &AppState, session_id: &str) -> Result<UpdateStatusResponse> {
    if session_id.is_empty() {
        return Err(AppError::Validation("sessionId is required".to_string()));
    }

    let session = state.stripe().retrieve_session(session_id).await?;
    let status = session.payment_status();

    let payments = PaymentRepository::new(state.pool());
    let paid_letter = payments
        .find_by_session(session_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("payment for session {session_id}")))?;

    payments.update_status_by_session(session_id, status).await?;

    tracing::info!(
        letter_id = %paid_letter.letter_id,
        %status,
        "Payment status reconciled"
    );

    Ok(UpdateStatusResponse {
        success: true,
        status,
        plan_type: paid_letter.plan_type,
        letter_id: paid_letter.letter_id.into_inner(),
    })
}

/// The most recent payment status recorded for a letter.
///
/// GET /api/letters/{id}/payment-status
#[instrument(skip(state), fields(letter_id = %id))]
pub async fn payment_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PaymentStatusResponse>> {
    let letter_id = LetterId::new(id);

    let status = PaymentRepository::new(state.pool())
        .latest_status_for_letter(&letter_id)
        .await?;

    Ok(Json(PaymentStatusResponse {
        letter_id: letter_id.into_inner(),
        status,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_payment_request_parses_camel_case() {
        let body: CreatePaymentRequest = serde_json::from_str(
            r#"{
                "letterId": "abc123",
                "customerData": {"email": "ana@example.com", "phone": "+5511999999999"},
                "planId": "premium",
                "planPrice": 9.99
            }"#,
        )
        .unwrap();

        assert_eq!(body.letter_id, "abc123");
        assert_eq!(body.customer_data.email, "ana@example.com");
        assert_eq!(body.customer_data.name, None);
        assert_eq!(body.customer_data.phone.as_deref(), Some("+5511999999999"));
        assert_eq!(body.plan_id, "premium");
    }

    #[test]
    fn claimed_price_must_match_catalog() {
        let plan = plans::find("basic").unwrap();
        assert_eq!(Decimal::from_f64(4.99), Some(plan.price));
        assert_ne!(Decimal::from_f64(0.01), Some(plan.price));
    }

    #[test]
    fn update_status_request_requires_session_id_field() {
        let err = serde_json::from_str::<UpdateStatusRequest>("{}");
        assert!(err.is_err());

        let ok: UpdateStatusRequest =
            serde_json::from_str(r#"{"sessionId": "cs_test_123"}"#).unwrap();
        assert_eq!(ok.session_id, "cs_test_123");
    }

    #[test]
    fn status_response_serializes_snake_case_status() {
        let response = UpdateStatusResponse {
            success: true,
            status: PaymentStatus::Completed,
            plan_type: "basic".to_string(),
            letter_id: "abc123".to_string(),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], "completed");
        assert_eq!(json["success"], true);
    }
}
