//! Letter domain type and its static catalogs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cartinha_core::LetterId;

/// A composed letter, as persisted in the letter store.
///
/// `is_anonymous = true` suppresses the sender on display; the sender field
/// itself is kept so the author still sees it when editing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Letter {
    /// Opaque unique token; also the share-link path segment.
    pub id: LetterId,
    pub sender: String,
    pub recipient: String,
    /// Free text; split into paragraphs on newline boundaries when rendered.
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    pub is_anonymous: bool,
    /// Plaintext soft lock for the viewer page; not a security boundary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub letter_type: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Letter {
    /// Whether a supplied password unlocks this letter.
    ///
    /// Unprotected letters are unlocked by default; protected ones require
    /// an exact, case-sensitive match.
    #[must_use]
    pub fn unlocks_with(&self, supplied: &str) -> bool {
        match &self.password {
            None => true,
            Some(expected) => expected == supplied,
        }
    }

    /// Whether the viewer must pass the password gate first.
    #[must_use]
    pub const fn is_locked(&self) -> bool {
        self.password.is_some()
    }

    /// The name shown as the letter's author.
    #[must_use]
    pub fn display_sender(&self) -> Option<&str> {
        if self.is_anonymous {
            None
        } else {
            Some(self.sender.as_str())
        }
    }
}

/// A background style choice for the letter page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BackgroundStyle {
    pub id: &'static str,
    pub name: &'static str,
    /// CSS class applied to the content area.
    pub class_name: &'static str,
}

/// The style applied when a letter names no (or an unknown) style.
const DEFAULT_BACKGROUND: BackgroundStyle = BackgroundStyle {
    id: "default",
    name: "Default",
    class_name: "bg-default",
};

/// All selectable background styles, in display order.
#[must_use]
pub const fn background_styles() -> &'static [BackgroundStyle] {
    &[
        DEFAULT_BACKGROUND,
        BackgroundStyle {
            id: "roses",
            name: "Roses",
            class_name: "bg-roses",
        },
        BackgroundStyle {
            id: "lavender",
            name: "Lavender",
            class_name: "bg-lavender",
        },
        BackgroundStyle {
            id: "sunset",
            name: "Sunset",
            class_name: "bg-sunset",
        },
        BackgroundStyle {
            id: "elegant",
            name: "Elegant",
            class_name: "bg-elegant",
        },
    ]
}

/// Resolve a stored background-style tag, falling back to the default.
#[must_use]
pub fn background_style(id: Option<&str>) -> &'static BackgroundStyle {
    id.and_then(|id| background_styles().iter().find(|s| s.id == id))
        .unwrap_or(&DEFAULT_BACKGROUND)
}

/// A letter type (tone) choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LetterType {
    pub id: &'static str,
    pub name: &'static str,
}

/// All selectable letter types, in display order.
#[must_use]
pub const fn letter_types() -> &'static [LetterType] {
    &[
        LetterType {
            id: "romantic",
            name: "Carta romântica",
        },
        LetterType {
            id: "apology",
            name: "Carta de desculpas",
        },
        LetterType {
            id: "surprise",
            name: "Carta anônima surpresa",
        },
        LetterType {
            id: "friendship",
            name: "Carta de amizade",
        },
        LetterType {
            id: "reconciliation",
            name: "Carta de reconciliação",
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn letter(password: Option<&str>) -> Letter {
        Letter {
            id: LetterId::new("abc123"),
            sender: "Maria".to_string(),
            recipient: "João".to_string(),
            content: "Oi".to_string(),
            signature: None,
            is_anonymous: false,
            password: password.map(String::from),
            background_style: None,
            letter_type: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_unprotected_letter_is_unlocked_by_default() {
        let letter = letter(None);
        assert!(!letter.is_locked());
        assert!(letter.unlocks_with(""));
        assert!(letter.unlocks_with("anything"));
    }

    #[test]
    fn test_password_match_is_exact_and_case_sensitive() {
        let letter = letter(Some("abc"));
        assert!(letter.is_locked());
        assert!(letter.unlocks_with("abc"));
        assert!(!letter.unlocks_with("ABC"));
        assert!(!letter.unlocks_with(""));
    }

    #[test]
    fn test_anonymous_suppresses_sender_display_only() {
        let mut l = letter(None);
        l.is_anonymous = true;
        assert_eq!(l.display_sender(), None);
        // the field itself is not cleared
        assert_eq!(l.sender, "Maria");

        l.is_anonymous = false;
        assert_eq!(l.display_sender(), Some("Maria"));
    }

    #[test]
    fn test_background_style_lookup_falls_back_to_default() {
        assert_eq!(background_style(Some("roses")).id, "roses");
        assert_eq!(background_style(Some("nope")).id, "default");
        assert_eq!(background_style(None).id, "default");
    }

    #[test]
    fn test_letter_serde_round_trip() {
        let original = letter(Some("segredo"));
        let json = serde_json::to_string(&original).expect("serialize");
        let parsed: Letter = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, original);
    }
}
