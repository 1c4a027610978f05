//! Payment domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use cartinha_core::{CustomerId, LetterId, PaymentId, PaymentStatus};

/// A paid-letter record (domain type).
///
/// Created at checkout-session time with status `pending`; the reconciler
/// moves it to a terminal status. Never deleted.
#[derive(Debug, Clone)]
pub struct PaidLetter {
    pub id: PaymentId,
    pub letter_id: LetterId,
    pub customer_id: Option<CustomerId>,
    pub plan_type: String,
    /// Amount in the currency's standard unit.
    pub amount: Decimal,
    /// Lowercase ISO currency code, as sent to the processor.
    pub currency: String,
    /// External checkout-session identifier, once known.
    pub payment_intent_id: Option<String>,
    pub payment_status: PaymentStatus,
    pub created_at: DateTime<Utc>,
}
