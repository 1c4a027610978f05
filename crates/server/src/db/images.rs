//! Letter image repository.
//!
//! Tracks (image id, storage path) rows per letter. The public URL is
//! derived from the storage path by the storage client, never stored.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use cartinha_core::{ImageId, LetterId};

use super::RepositoryError;

/// A tracked letter image row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LetterImageRow {
    pub id: ImageId,
    pub letter_id: String,
    pub storage_path: String,
    pub created_at: DateTime<Utc>,
}

/// Repository for letter image rows.
pub struct ImageRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ImageRepository<'a> {
    /// Create a new image repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Count images tracked for a letter.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_for_letter(&self, letter_id: &LetterId) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar(
            r"
            SELECT COUNT(*)
            FROM letter_images
            WHERE letter_id = $1
            ",
        )
        .bind(letter_id.as_str())
        .fetch_one(self.pool)
        .await?;

        Ok(count)
    }

    /// List a letter's images in upload order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_letter(
        &self,
        letter_id: &LetterId,
    ) -> Result<Vec<LetterImageRow>, RepositoryError> {
        let rows = sqlx::query_as::<_, LetterImageRow>(
            r"
            SELECT id, letter_id, storage_path, created_at
            FROM letter_images
            WHERE letter_id = $1
            ORDER BY created_at ASC
            ",
        )
        .bind(letter_id.as_str())
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// Insert a tracking row for an uploaded object.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert(
        &self,
        letter_id: &LetterId,
        storage_path: &str,
    ) -> Result<LetterImageRow, RepositoryError> {
        let row = sqlx::query_as::<_, LetterImageRow>(
            r"
            INSERT INTO letter_images (id, letter_id, storage_path)
            VALUES ($1, $2, $3)
            RETURNING id, letter_id, storage_path, created_at
            ",
        )
        .bind(ImageId::random())
        .bind(letter_id.as_str())
        .bind(storage_path)
        .fetch_one(self.pool)
        .await?;

        Ok(row)
    }

    /// Delete a tracking row.
    ///
    /// # Returns
    ///
    /// Returns `true` if the row was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: ImageId) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM letter_images
            WHERE id = $1
            ",
        )
        .bind(id)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
