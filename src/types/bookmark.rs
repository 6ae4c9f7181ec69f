use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::errors::BookmarkError;

/// Favicon used when the bookmark URL has no resolvable host.
pub const DEFAULT_FAVICON: &str = "/default-favicon.png";

/// Represents a saved bookmark as held in memory.
///
/// Timestamps are native `DateTime<Utc>` values; the string form only exists
/// in [`WireBookmark`]. `updated_at >= created_at` always holds for values
/// built through [`Bookmark::new`] and [`Bookmark::apply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bookmark {
    pub id: String,
    pub title: String,
    pub url: String,
    pub description: String,
    pub tags: Vec<String>,
    pub favicon: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Storage and transport form of a bookmark, with string timestamps.
///
/// Field names match the backup file format exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireBookmark {
    pub id: String,
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favicon: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// User-entered bookmark fields, with tags as one comma-separated string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookmarkDraft {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: String,
}

impl BookmarkDraft {
    pub fn new(title: &str, url: &str, description: &str, tags: &str) -> Self {
        Self {
            title: title.to_string(),
            url: url.to_string(),
            description: description.to_string(),
            tags: tags.to_string(),
        }
    }

    /// Splits the tag string on commas, trimming and dropping empty entries.
    /// Duplicates are kept.
    pub fn parsed_tags(&self) -> Vec<String> {
        parse_tags(&self.tags)
    }

    fn validate(&self) -> Result<(), BookmarkError> {
        if self.title.trim().is_empty() {
            return Err(BookmarkError::EmptyTitle);
        }
        if self.url.trim().is_empty() {
            return Err(BookmarkError::EmptyUrl);
        }
        Ok(())
    }
}

impl Bookmark {
    /// Creates a bookmark from a draft with a fresh ID and equal timestamps.
    pub fn new(draft: &BookmarkDraft) -> Result<Self, BookmarkError> {
        draft.validate()?;
        let now = now_millis();
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            title: draft.title.clone(),
            url: draft.url.clone(),
            description: draft.description.clone(),
            tags: draft.parsed_tags(),
            favicon: Some(favicon_url(&draft.url)),
            created_at: now,
            updated_at: now,
        })
    }

    /// Replaces the editable fields from a draft and advances `updated_at`.
    ///
    /// `id` and `created_at` are left untouched. The new `updated_at` is
    /// strictly later than the previous one even within the same millisecond.
    pub fn apply(&mut self, draft: &BookmarkDraft) -> Result<(), BookmarkError> {
        draft.validate()?;
        self.title = draft.title.clone();
        self.url = draft.url.clone();
        self.description = draft.description.clone();
        self.tags = draft.parsed_tags();
        self.favicon = Some(favicon_url(&draft.url));
        self.touch();
        Ok(())
    }

    fn touch(&mut self) {
        let now = now_millis();
        self.updated_at = if now > self.updated_at {
            now
        } else {
            self.updated_at + Duration::milliseconds(1)
        };
    }
}

/// Current time truncated to millisecond precision, the resolution of the
/// backup format.
pub fn now_millis() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Splits a comma-separated tag string into trimmed, non-empty tags.
pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Derives the favicon URL for a bookmark from its page URL.
pub fn favicon_url(page_url: &str) -> String {
    match url::Url::parse(page_url) {
        Ok(parsed) => match parsed.host_str() {
            Some(host) if !host.is_empty() => {
                format!("https://www.google.com/s2/favicons?domain={}&sz=32", host)
            }
            _ => DEFAULT_FAVICON.to_string(),
        },
        Err(_) => DEFAULT_FAVICON.to_string(),
    }
}
