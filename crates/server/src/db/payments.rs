//! Paid letter and customer repositories.
//!
//! `paid_letters` rows are created with status `pending` when a checkout
//! session is requested, stamped with the session ID once the processor
//! returns one, and moved to a terminal status by the reconciler. Rows are
//! never deleted.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use cartinha_core::{CustomerId, Email, LetterId, PaymentId, PaymentStatus};

use super::RepositoryError;
use crate::models::payment::PaidLetter;

/// Raw paid-letter row; the status string is validated on conversion.
#[derive(Debug, sqlx::FromRow)]
struct PaidLetterRow {
    id: PaymentId,
    letter_id: String,
    customer_id: Option<CustomerId>,
    plan_type: String,
    amount: Decimal,
    currency: String,
    payment_intent_id: Option<String>,
    payment_status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<PaidLetterRow> for PaidLetter {
    type Error = RepositoryError;

    fn try_from(row: PaidLetterRow) -> Result<Self, Self::Error> {
        let payment_status = row.payment_status.parse::<PaymentStatus>().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid payment status in database: {e}"))
        })?;

        Ok(Self {
            id: row.id,
            letter_id: LetterId::new(row.letter_id),
            customer_id: row.customer_id,
            plan_type: row.plan_type,
            amount: row.amount,
            currency: row.currency,
            payment_intent_id: row.payment_intent_id,
            payment_status,
            created_at: row.created_at,
        })
    }
}

/// Repository for customer rows.
pub struct CustomerRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CustomerRepository<'a> {
    /// Create a new customer repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a customer row for a checkout attempt.
    ///
    /// Customers are only ever created in the payment path; they are not
    /// deduplicated across attempts.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        email: &Email,
        name: Option<&str>,
        phone: Option<&str>,
    ) -> Result<CustomerId, RepositoryError> {
        let id: CustomerId = sqlx::query_scalar(
            r"
            INSERT INTO customers (id, email, name, phone)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            ",
        )
        .bind(CustomerId::random())
        .bind(email.as_str())
        .bind(name)
        .bind(phone)
        .fetch_one(self.pool)
        .await?;

        Ok(id)
    }
}

/// Repository for paid-letter rows.
pub struct PaymentRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PaymentRepository<'a> {
    /// Create a new payment repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a pending paid-letter row for a checkout attempt.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create_pending(
        &self,
        letter_id: &LetterId,
        customer_id: CustomerId,
        plan_type: &str,
        amount: Decimal,
        currency: &str,
    ) -> Result<PaymentId, RepositoryError> {
        let id: PaymentId = sqlx::query_scalar(
            r"
            INSERT INTO paid_letters
                (id, letter_id, customer_id, plan_type, amount, currency, payment_status)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            ",
        )
        .bind(PaymentId::random())
        .bind(letter_id.as_str())
        .bind(customer_id)
        .bind(plan_type)
        .bind(amount)
        .bind(currency)
        .bind(PaymentStatus::Pending.as_str())
        .fetch_one(self.pool)
        .await?;

        Ok(id)
    }

    /// Stamp a paid-letter row with the checkout session ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the row doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn set_session(
        &self,
        id: PaymentId,
        session_id: &str,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE paid_letters
            SET payment_intent_id = $1
            WHERE id = $2
            ",
        )
        .bind(session_id)
        .bind(id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Look up a paid letter by its checkout session ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored status is invalid.
    pub async fn find_by_session(
        &self,
        session_id: &str,
    ) -> Result<Option<PaidLetter>, RepositoryError> {
        let row = sqlx::query_as::<_, PaidLetterRow>(
            r"
            SELECT id, letter_id, customer_id, plan_type, amount, currency,
                   payment_intent_id, payment_status, created_at
            FROM paid_letters
            WHERE payment_intent_id = $1
            ",
        )
        .bind(session_id)
        .fetch_optional(self.pool)
        .await?;

        row.map(PaidLetter::try_from).transpose()
    }

    /// Persist the reconciled status for a session's row.
    ///
    /// Applied unconditionally: re-running with the same terminal status is
    /// a no-op in effect.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no row carries the session ID.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update_status_by_session(
        &self,
        session_id: &str,
        status: PaymentStatus,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE paid_letters
            SET payment_status = $1
            WHERE payment_intent_id = $2
            ",
        )
        .bind(status.as_str())
        .bind(session_id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// The most recent payment status recorded for a letter, if any.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored status is invalid.
    pub async fn latest_status_for_letter(
        &self,
        letter_id: &LetterId,
    ) -> Result<Option<PaymentStatus>, RepositoryError> {
        let status: Option<String> = sqlx::query_scalar(
            r"
            SELECT payment_status
            FROM paid_letters
            WHERE letter_id = $1
            ORDER BY created_at DESC
            LIMIT 1
            ",
        )
        .bind(letter_id.as_str())
        .fetch_optional(self.pool)
        .await?;

        status
            .map(|s| {
                s.parse::<PaymentStatus>().map_err(|e| {
                    RepositoryError::DataCorruption(format!(
                        "invalid payment status in database: {e}"
                    ))
                })
            })
            .transpose()
    }
}
