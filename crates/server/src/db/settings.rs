//! Letter settings repository.
//!
//! At most one settings row per letter (music URL, visual effect), upserted
//! whenever the letter is saved.

use sqlx::PgPool;

use cartinha_core::LetterId;

use super::RepositoryError;
use crate::models::settings::{LetterSettings, VisualEffect};

/// Raw settings row; effect names are validated on the way out.
#[derive(Debug, sqlx::FromRow)]
struct SettingsRow {
    youtube_music_url: Option<String>,
    visual_effect: Option<String>,
}

/// Repository for letter settings rows.
pub struct SettingsRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SettingsRepository<'a> {
    /// Create a new settings repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get the settings for a letter, if any.
    ///
    /// An unknown visual-effect name in the database is treated as no
    /// effect rather than failing the whole view.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, letter_id: &LetterId) -> Result<Option<LetterSettings>, RepositoryError> {
        let row = sqlx::query_as::<_, SettingsRow>(
            r"
            SELECT youtube_music_url, visual_effect
            FROM letter_settings
            WHERE letter_id = $1
            ",
        )
        .bind(letter_id.as_str())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|r| LetterSettings {
            youtube_url: r.youtube_music_url,
            visual_effect: r.visual_effect.as_deref().and_then(VisualEffect::from_name),
        }))
    }

    /// Upsert the settings for a letter.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert(
        &self,
        letter_id: &LetterId,
        settings: &LetterSettings,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO letter_settings (letter_id, youtube_music_url, visual_effect)
            VALUES ($1, $2, $3)
            ON CONFLICT (letter_id) DO UPDATE
            SET youtube_music_url = EXCLUDED.youtube_music_url,
                visual_effect = EXCLUDED.visual_effect
            ",
        )
        .bind(letter_id.as_str())
        .bind(settings.youtube_url.as_deref())
        .bind(settings.visual_effect.map(|e| e.as_str()))
        .execute(self.pool)
        .await?;

        Ok(())
    }
}
