//! Per-letter settings: background music and visual effect.

use serde::{Deserialize, Serialize};

/// Optional presentation settings for a letter. At most one per letter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LetterSettings {
    /// Normalized to an embeddable form; see [`normalize_youtube_url`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub youtube_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visual_effect: Option<VisualEffect>,
}

impl LetterSettings {
    /// Whether any setting is actually present.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.youtube_url.is_none() && self.visual_effect.is_none()
    }
}

/// Decorative overlay applied to the rendered letter view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisualEffect {
    Hearts,
    Confetti,
}

impl VisualEffect {
    /// The snake_case name as stored in the database.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Hearts => "hearts",
            Self::Confetti => "confetti",
        }
    }

    /// Parse a stored effect name; unknown names are simply no effect.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "hearts" => Some(Self::Hearts),
            "confetti" => Some(Self::Confetti),
            _ => None,
        }
    }
}

/// Normalize a YouTube link to its embeddable form.
///
/// `watch?v=` and `youtu.be/` links become
/// `https://www.youtube.com/embed/{video_id}`; anything else (including
/// already-embed links) passes through unchanged. Empty input stays empty.
#[must_use]
pub fn normalize_youtube_url(input: &str) -> String {
    let url = input.trim();
    if url.is_empty() {
        return String::new();
    }

    if url.contains("youtube.com/watch?v=") {
        if let Ok(parsed) = url::Url::parse(url)
            && let Some(video_id) = parsed
                .query_pairs()
                .find(|(k, _)| k == "v")
                .map(|(_, v)| v.into_owned())
            && !video_id.is_empty()
        {
            return format!("https://www.youtube.com/embed/{video_id}");
        }
    } else if let Some(rest) = url.split("youtu.be/").nth(1) {
        let video_id = rest.split('?').next().unwrap_or_default();
        if !video_id.is_empty() {
            return format!("https://www.youtube.com/embed/{video_id}");
        }
    }

    url.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_watch_url() {
        assert_eq!(
            normalize_youtube_url("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            "https://www.youtube.com/embed/dQw4w9WgXcQ"
        );
    }

    #[test]
    fn test_normalize_watch_url_with_extra_params() {
        assert_eq!(
            normalize_youtube_url("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=42s"),
            "https://www.youtube.com/embed/dQw4w9WgXcQ"
        );
    }

    #[test]
    fn test_normalize_short_url() {
        assert_eq!(
            normalize_youtube_url("https://youtu.be/dQw4w9WgXcQ"),
            "https://www.youtube.com/embed/dQw4w9WgXcQ"
        );
        assert_eq!(
            normalize_youtube_url("https://youtu.be/dQw4w9WgXcQ?si=xyz"),
            "https://www.youtube.com/embed/dQw4w9WgXcQ"
        );
    }

    #[test]
    fn test_embed_url_passes_through() {
        let embed = "https://www.youtube.com/embed/dQw4w9WgXcQ";
        assert_eq!(normalize_youtube_url(embed), embed);
    }

    #[test]
    fn test_empty_stays_empty() {
        assert_eq!(normalize_youtube_url(""), "");
        assert_eq!(normalize_youtube_url("   "), "");
    }

    #[test]
    fn test_effect_round_trip() {
        for effect in [VisualEffect::Hearts, VisualEffect::Confetti] {
            assert_eq!(VisualEffect::from_name(effect.as_str()), Some(effect));
        }
        assert_eq!(VisualEffect::from_name("sparkles"), None);
    }
}
