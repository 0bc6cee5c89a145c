// Event domain types
//
// These types represent the Event entity, its lifecycle status, and the
// visual theme of its public microsite. Used by both API and storage crates.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// Event lifecycle status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Draft,
    Published,
}

impl std::fmt::Display for EventStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventStatus::Draft => write!(f, "draft"),
            EventStatus::Published => write!(f, "published"),
        }
    }
}

impl From<&str> for EventStatus {
    fn from(s: &str) -> Self {
        match s {
            "published" => EventStatus::Published,
            _ => EventStatus::Draft,
        }
    }
}

/// Visual theme of the event microsite
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Minimal,
    Warp,
    Quantum,
    Classic,
}

impl Theme {
    pub const ALL: [Theme; 4] = [Theme::Minimal, Theme::Warp, Theme::Quantum, Theme::Classic];
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Theme::Minimal => write!(f, "minimal"),
            Theme::Warp => write!(f, "warp"),
            Theme::Quantum => write!(f, "quantum"),
            Theme::Classic => write!(f, "classic"),
        }
    }
}

impl From<&str> for Theme {
    fn from(s: &str) -> Self {
        match s {
            "warp" => Theme::Warp,
            "quantum" => Theme::Quantum,
            "classic" => Theme::Classic,
            _ => Theme::Minimal,
        }
    }
}

/// Event - one shareable microsite
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct Event {
    pub id: Uuid,
    pub owner_user_id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub location: String,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_file_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_file_id: Option<Uuid>,
    pub status: EventStatus,
    pub theme: Theme,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Derive a URL-safe slug from an event title: lowercase, whitespace runs
/// become a single hyphen, everything outside `[a-z0-9_-]` is stripped.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut last_was_space = false;
    for ch in title.trim().chars() {
        if ch.is_whitespace() {
            if !last_was_space {
                slug.push('-');
                last_was_space = true;
            }
            continue;
        }
        last_was_space = false;
        let lower = ch.to_ascii_lowercase();
        if lower.is_ascii_alphanumeric() || lower == '_' || lower == '-' {
            slug.push(lower);
        }
    }
    slug
}

/// Reserved slug that serves a synthetic showcase event
pub const DEMO_SLUG: &str = "demo-event";

/// Theme for the demo microsite. The theme rotates with the calendar day so
/// repeated visits within a day render identically.
pub fn demo_theme(now: DateTime<Utc>) -> Theme {
    let idx = now.ordinal0() as usize % Theme::ALL.len();
    Theme::ALL[idx]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("Community Tech Day"), "community-tech-day");
    }

    #[test]
    fn test_slugify_strips_non_word_chars() {
        // A stripped token between spaces leaves a doubled hyphen
        assert_eq!(slugify("Rust & Coffee! (2026)"), "rust--coffee-2026");
        assert_eq!(slugify("Hello, World."), "hello-world");
    }

    #[test]
    fn test_slugify_collapses_whitespace() {
        assert_eq!(slugify("  a   b\tc  "), "a-b-c");
    }

    #[test]
    fn test_slugify_keeps_underscore_and_hyphen() {
        assert_eq!(slugify("pre-release_build"), "pre-release_build");
    }

    #[test]
    fn test_theme_roundtrip() {
        for theme in Theme::ALL {
            assert_eq!(Theme::from(theme.to_string().as_str()), theme);
        }
        assert_eq!(Theme::from("anything-else"), Theme::Minimal);
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!(EventStatus::from("published"), EventStatus::Published);
        assert_eq!(EventStatus::from("draft"), EventStatus::Draft);
        assert_eq!(EventStatus::from("bogus"), EventStatus::Draft);
    }

    #[test]
    fn test_demo_theme_is_deterministic_within_a_day() {
        let morning = Utc.with_ymd_and_hms(2026, 3, 14, 8, 0, 0).unwrap();
        let evening = Utc.with_ymd_and_hms(2026, 3, 14, 22, 30, 0).unwrap();
        assert_eq!(demo_theme(morning), demo_theme(evening));
    }

    #[test]
    fn test_demo_theme_cycles_all_themes() {
        let base = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let mut seen = std::collections::HashSet::new();
        for day in 0..4 {
            seen.insert(demo_theme(base + chrono::Duration::days(day)));
        }
        assert_eq!(seen.len(), 4);
    }
}
