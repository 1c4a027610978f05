//! Server-rendered letter viewer pages.
//!
//! The share link lands here. A locked letter shows the password gate
//! first; a wrong password re-renders the gate with an error and the
//! visitor can retry. The unlocked page renders the letter with its
//! background, image slideshow, music embed and effect overlay.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::instrument;

use cartinha_core::{LetterId, PaymentStatus};

use crate::db::{ImageRepository, PaymentRepository, SettingsRepository};
use crate::error::{AppError, Result};
use crate::filters;
use crate::models::{Letter, LetterSettings, background_style};
use crate::state::AppState;

/// Milliseconds each slideshow image stays on screen.
pub const SLIDESHOW_INTERVAL_MS: u64 = 5000;

/// The next slide to show after `index`, wrapping past the last image.
#[must_use]
pub const fn next_slide(index: usize, count: usize) -> usize {
    if count == 0 { 0 } else { (index + 1) % count }
}

/// Landing page with the call to action.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {}

/// Password gate for a locked letter.
#[derive(Template, WebTemplate)]
#[template(path = "letter/unlock.html")]
pub struct UnlockTemplate {
    pub letter_id: String,
    pub error: bool,
}

/// The rendered letter page.
#[derive(Template, WebTemplate)]
#[template(path = "letter/view.html")]
pub struct LetterTemplate {
    pub letter: Letter,
    pub paragraphs: Vec<String>,
    pub background_class: &'static str,
    pub image_urls: Vec<String>,
    pub slideshow_interval_ms: u64,
    pub youtube_embed_url: Option<String>,
    pub visual_effect: Option<&'static str>,
}

/// Post-checkout page with the share link and payment badge.
#[derive(Template, WebTemplate)]
#[template(path = "letter/success.html")]
pub struct SuccessTemplate {
    pub letter_id: String,
    pub share_url: String,
    pub payment_success: bool,
    pub payment_status: Option<PaymentStatus>,
}

/// Password form posted from the gate.
#[derive(Debug, Deserialize)]
pub struct UnlockForm {
    #[serde(default)]
    pub password: String,
}

/// Query string on the success redirect.
#[derive(Debug, Deserialize)]
pub struct SuccessQuery {
    #[serde(default)]
    pub payment_success: bool,
}

/// Display the landing page.
#[instrument]
pub async fn home() -> HomeTemplate {
    HomeTemplate {}
}

/// Display a letter, or its password gate when locked.
///
/// GET /letter/{id}
///
/// # Errors
///
/// Returns 404 if the letter doesn't exist.
#[instrument(skip(state), fields(letter_id = %id))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let letter_id = LetterId::new(id);
    let letter = fetch_letter(&state, &letter_id).await?;

    if letter.is_locked() {
        return Ok(UnlockTemplate {
            letter_id: letter_id.into_inner(),
            error: false,
        }
        .into_response());
    }

    Ok(render_letter(&state, letter).await?.into_response())
}

/// Check the password gate and render the letter on a match.
///
/// POST /letter/{id}/unlock
///
/// A mismatch re-renders the gate with an error message; the attempt
/// count is not limited.
///
/// # Errors
///
/// Returns 404 if the letter doesn't exist.
#[instrument(skip(state, form), fields(letter_id = %id))]
pub async fn unlock(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<UnlockForm>,
) -> Result<impl IntoResponse> {
    let letter_id = LetterId::new(id);
    let letter = fetch_letter(&state, &letter_id).await?;

    if !letter.unlocks_with(&form.password) {
        return Ok(UnlockTemplate {
            letter_id: letter_id.into_inner(),
            error: true,
        }
        .into_response());
    }

    Ok(render_letter(&state, letter).await?.into_response())
}

/// Display the post-checkout success page.
///
/// GET /letter/{id}/success?payment_success=true
///
/// The `payment_success` flag only controls the celebratory copy; the
/// badge reflects the recorded status, which the page's script reconciles
/// against the processor.
///
/// # Errors
///
/// Returns 404 if the letter doesn't exist.
#[instrument(skip(state), fields(letter_id = %id))]
pub async fn success(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<SuccessQuery>,
) -> Result<SuccessTemplate> {
    let letter_id = LetterId::new(id);
    fetch_letter(&state, &letter_id).await?;

    let payment_status = PaymentRepository::new(state.pool())
        .latest_status_for_letter(&letter_id)
        .await?;

    Ok(SuccessTemplate {
        share_url: state.letter_url(letter_id.as_str()),
        letter_id: letter_id.into_inner(),
        payment_success: query.payment_success,
        payment_status,
    })
}

async fn fetch_letter(state: &AppState, letter_id: &LetterId) -> Result<Letter> {
    state
        .letters()
        .get(letter_id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("letter {letter_id}")))
}

/// Assemble the full letter page from the store and record store.
async fn render_letter(state: &AppState, letter: Letter) -> Result<LetterTemplate> {
    let settings = SettingsRepository::new(state.pool())
        .get(&letter.id)
        .await?
        .unwrap_or_else(LetterSettings::default);

    let image_urls = ImageRepository::new(state.pool())
        .list_for_letter(&letter.id)
        .await?
        .into_iter()
        .map(|row| state.storage().public_url(&row.storage_path))
        .collect();

    Ok(LetterTemplate {
        paragraphs: paragraphs(&letter.content),
        background_class: background_style(letter.background_style.as_deref()).class_name,
        image_urls,
        slideshow_interval_ms: SLIDESHOW_INTERVAL_MS,
        youtube_embed_url: settings.youtube_url.as_deref().map(embed_player_url),
        visual_effect: settings.visual_effect.map(|e| e.as_str()),
        letter,
    })
}

/// Turn an embed URL into the autoplaying, looping background-player URL.
///
/// The `playlist` parameter repeats the video ID so YouTube loops a single
/// video.
#[must_use]
pub fn embed_player_url(embed_url: &str) -> String {
    let video_id = embed_url.rsplit('/').next().unwrap_or_default();
    let separator = if embed_url.contains('?') { '&' } else { '?' };
    format!(
        "{embed_url}{separator}autoplay=1&controls=0&showinfo=0&mute=0&loop=1&playlist={video_id}"
    )
}

/// Split letter content into display paragraphs on newline boundaries.
///
/// Blank lines produce no paragraph; surrounding whitespace is trimmed.
#[must_use]
pub fn paragraphs(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_slide_cycles_through_all_images_and_wraps() {
        let count = 4;
        let mut index = 0;
        let mut seen = Vec::new();
        for _ in 0..count {
            seen.push(index);
            index = next_slide(index, count);
        }
        assert_eq!(seen, vec![0, 1, 2, 3]);
        assert_eq!(index, 0);
    }

    #[test]
    fn test_next_slide_stays_in_range() {
        for count in 1..6 {
            for index in 0..count {
                assert!(next_slide(index, count) < count);
            }
        }
    }

    #[test]
    fn test_next_slide_with_no_images() {
        assert_eq!(next_slide(0, 0), 0);
    }

    #[test]
    fn test_paragraphs_split_on_newlines() {
        let content = "Querida,\n\nSinto sua falta.\n  Com amor.  \n";
        assert_eq!(
            paragraphs(content),
            vec!["Querida,", "Sinto sua falta.", "Com amor."]
        );
    }

    #[test]
    fn test_paragraphs_of_empty_content() {
        assert!(paragraphs("").is_empty());
        assert!(paragraphs("\n\n").is_empty());
    }

    #[test]
    fn test_background_class_resolves_through_models() {
        assert_eq!(background_style(Some("sunset")).class_name, "bg-sunset");
        assert_eq!(background_style(Some("unknown")).class_name, "bg-default");
        assert_eq!(background_style(None).class_name, "bg-default");
    }

    #[test]
    fn test_embed_player_url_loops_the_video() {
        let url = embed_player_url("https://www.youtube.com/embed/dQw4w9WgXcQ");
        assert_eq!(
            url,
            "https://www.youtube.com/embed/dQw4w9WgXcQ?autoplay=1&controls=0&showinfo=0&mute=0&loop=1&playlist=dQw4w9WgXcQ"
        );
    }

    #[test]
    fn test_embed_player_url_keeps_existing_query() {
        let url = embed_player_url("https://example.com/player?x=1");
        assert!(url.starts_with("https://example.com/player?x=1&autoplay=1"));
    }
}
