//! Letter API route handlers.
//!
//! The compose endpoint is the server-side face of the wizard: it validates
//! the letter against the selected plan's entitlements, persists it in the
//! letter store, and upserts the per-letter settings row.

use axum::{
    Json,
    extract::{Path, State},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use cartinha_core::LetterId;

use crate::db::SettingsRepository;
use crate::error::{AppError, Result};
use crate::models::letter::{background_styles, letter_types};
use crate::models::settings::normalize_youtube_url;
use crate::models::{Letter, LetterSettings, VisualEffect};
use crate::plans::{self, Plan};
use crate::state::AppState;

/// Compose request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLetterRequest {
    pub sender: String,
    pub recipient: String,
    pub content: String,
    #[serde(default)]
    pub signature: Option<String>,
    #[serde(default)]
    pub is_anonymous: bool,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub background_style: Option<String>,
    #[serde(default)]
    pub letter_type: Option<String>,
    pub plan_id: String,
    #[serde(default)]
    pub settings: Option<SettingsRequest>,
}

/// Optional settings in the compose request.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsRequest {
    #[serde(default)]
    pub youtube_url: Option<String>,
    #[serde(default)]
    pub visual_effect: Option<VisualEffect>,
}

/// Compose response body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLetterResponse {
    pub id: LetterId,
    pub share_url: String,
}

/// A letter as the API returns it.
///
/// The password itself never leaves the server; link-holders only learn
/// whether the letter is locked. The stored [`Letter`] keeps serializing
/// the password for the letter store's own file.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LetterView {
    pub id: LetterId,
    pub sender: String,
    pub recipient: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    pub is_anonymous: bool,
    pub is_locked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub letter_type: Option<String>,
    pub created_at: chrono::DateTime<Utc>,
}

impl From<Letter> for LetterView {
    fn from(letter: Letter) -> Self {
        Self {
            is_locked: letter.is_locked(),
            id: letter.id,
            sender: letter.sender,
            recipient: letter.recipient,
            content: letter.content,
            signature: letter.signature,
            is_anonymous: letter.is_anonymous,
            background_style: letter.background_style,
            letter_type: letter.letter_type,
            created_at: letter.created_at,
        }
    }
}

/// Compose and save a letter.
///
/// POST /api/letters
#[instrument(skip(state, request), fields(plan = %request.plan_id))]
pub async fn create(
    State(state): State<AppState>,
    Json(request): Json<CreateLetterRequest>,
) -> Result<Json<CreateLetterResponse>> {
    let plan = validate_request(&request)?;
    let settings = build_settings(request.settings.as_ref(), plan)?;

    let id = LetterId::generate();
    let letter = Letter {
        id: id.clone(),
        sender: request.sender.trim().to_string(),
        recipient: request.recipient.trim().to_string(),
        content: request.content,
        signature: trimmed_opt(request.signature),
        is_anonymous: request.is_anonymous,
        password: request.password.filter(|p| !p.is_empty()),
        background_style: request.background_style,
        letter_type: request.letter_type,
        created_at: Utc::now(),
    };

    state.letters().save(letter).await;

    if !settings.is_empty() {
        SettingsRepository::new(state.pool())
            .upsert(&id, &settings)
            .await?;
    }

    tracing::info!(letter_id = %id, "Letter created");

    let share_url = state.letter_url(id.as_str());
    Ok(Json(CreateLetterResponse { id, share_url }))
}

/// Fetch a stored letter.
///
/// GET /api/letters/{id}
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<LetterView>> {
    let id = LetterId::new(id);
    let letter = state
        .letters()
        .get(&id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("letter {id}")))?;

    Ok(Json(LetterView::from(letter)))
}

/// The plan catalog.
///
/// GET /api/plans
#[instrument]
pub async fn plans_index() -> Json<&'static [Plan]> {
    Json(plans::plans())
}

/// Validate the compose request and resolve its plan.
fn validate_request(request: &CreateLetterRequest) -> Result<&'static Plan> {
    if request.sender.trim().is_empty() {
        return Err(AppError::Validation("sender is required".to_string()));
    }
    if request.recipient.trim().is_empty() {
        return Err(AppError::Validation("recipient is required".to_string()));
    }
    if request.content.trim().is_empty() {
        return Err(AppError::Validation("content is required".to_string()));
    }

    if let Some(style) = request.background_style.as_deref()
        && !background_styles().iter().any(|s| s.id == style)
    {
        return Err(AppError::Validation(format!(
            "unknown background style: {style}"
        )));
    }

    if let Some(letter_type) = request.letter_type.as_deref()
        && !letter_types().iter().any(|t| t.id == letter_type)
    {
        return Err(AppError::Validation(format!(
            "unknown letter type: {letter_type}"
        )));
    }

    plans::find(&request.plan_id)
        .ok_or_else(|| AppError::Validation(format!("unknown plan: {}", request.plan_id)))
}

/// Build the settings record, enforcing the plan's entitlements.
fn build_settings(request: Option<&SettingsRequest>, plan: &Plan) -> Result<LetterSettings> {
    let Some(request) = request else {
        return Ok(LetterSettings::default());
    };

    let youtube_url = request
        .youtube_url
        .as_deref()
        .map(normalize_youtube_url)
        .filter(|url| !url.is_empty());

    if youtube_url.is_some() && !plan.allows_music {
        return Err(AppError::Validation(format!(
            "plan {} does not allow background music",
            plan.id
        )));
    }

    if request.visual_effect.is_some() && !plan.allows_visual_effects {
        return Err(AppError::Validation(format!(
            "plan {} does not allow visual effects",
            plan.id
        )));
    }

    Ok(LetterSettings {
        youtube_url,
        visual_effect: request.visual_effect,
    })
}

/// Trim an optional field, dropping it entirely when blank.
fn trimmed_opt(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CreateLetterRequest {
        CreateLetterRequest {
            sender: "Maria".to_string(),
            recipient: "João".to_string(),
            content: "Oi".to_string(),
            signature: None,
            is_anonymous: false,
            password: None,
            background_style: None,
            letter_type: None,
            plan_id: "basic".to_string(),
            settings: None,
        }
    }

    #[test]
    fn test_validate_requires_recipient_and_content() {
        let mut r = request();
        r.recipient = "  ".to_string();
        assert!(matches!(
            validate_request(&r),
            Err(AppError::Validation(_))
        ));

        let mut r = request();
        r.content = String::new();
        assert!(validate_request(&r).is_err());
    }

    #[test]
    fn test_validate_rejects_unknown_plan_and_catalog_tags() {
        let mut r = request();
        r.plan_id = "enterprise".to_string();
        assert!(validate_request(&r).is_err());

        let mut r = request();
        r.background_style = Some("plaid".to_string());
        assert!(validate_request(&r).is_err());

        let mut r = request();
        r.letter_type = Some("invoice".to_string());
        assert!(validate_request(&r).is_err());
    }

    #[test]
    fn test_validate_accepts_catalog_tags() {
        let mut r = request();
        r.background_style = Some("roses".to_string());
        r.letter_type = Some("romantic".to_string());
        assert!(validate_request(&r).is_ok());
    }

    #[test]
    fn test_basic_plan_rejects_music_and_effects() {
        let basic = plans::find("basic").expect("basic");

        let with_music = SettingsRequest {
            youtube_url: Some("https://youtu.be/dQw4w9WgXcQ".to_string()),
            visual_effect: None,
        };
        assert!(build_settings(Some(&with_music), basic).is_err());

        let with_effect = SettingsRequest {
            youtube_url: None,
            visual_effect: Some(VisualEffect::Hearts),
        };
        assert!(build_settings(Some(&with_effect), basic).is_err());
    }

    #[test]
    fn test_premium_plan_normalizes_music_url() {
        let premium = plans::find("premium").expect("premium");
        let settings_request = SettingsRequest {
            youtube_url: Some("https://www.youtube.com/watch?v=dQw4w9WgXcQ".to_string()),
            visual_effect: Some(VisualEffect::Confetti),
        };

        let settings = build_settings(Some(&settings_request), premium).expect("allowed");
        assert_eq!(
            settings.youtube_url.as_deref(),
            Some("https://www.youtube.com/embed/dQw4w9WgXcQ")
        );
        assert_eq!(settings.visual_effect, Some(VisualEffect::Confetti));
    }

    #[test]
    fn test_empty_settings_stay_empty() {
        let basic = plans::find("basic").expect("basic");
        assert!(build_settings(None, basic).expect("ok").is_empty());

        let blank = SettingsRequest {
            youtube_url: Some("   ".to_string()),
            visual_effect: None,
        };
        assert!(build_settings(Some(&blank), basic).expect("ok").is_empty());
    }

    #[test]
    fn test_letter_view_never_carries_the_password() {
        let letter = Letter {
            id: cartinha_core::LetterId::new("abc123"),
            sender: "Maria".to_string(),
            recipient: "João".to_string(),
            content: "Oi".to_string(),
            signature: None,
            is_anonymous: false,
            password: Some("segredo".to_string()),
            background_style: None,
            letter_type: None,
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(LetterView::from(letter)).expect("serialize");
        assert!(json.get("password").is_none());
        assert_eq!(json["isLocked"], true);
        // the stored record keeps the password for the gate itself
    }

    #[test]
    fn test_trimmed_opt() {
        assert_eq!(trimmed_opt(Some(" x ".to_string())), Some("x".to_string()));
        assert_eq!(trimmed_opt(Some("   ".to_string())), None);
        assert_eq!(trimmed_opt(None), None);
    }
}
