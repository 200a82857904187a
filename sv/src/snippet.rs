//! Snippet record and input types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Result, SnippetError};

/// Unique identifier for a snippet
pub type SnippetId = u64;

/// A stored snippet
///
/// Serialized with camelCase field names. Fields this crate does not know
/// about are kept in `extra` and written back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snippet {
    /// Unique identifier, assigned at creation
    pub id: SnippetId,

    /// Human-readable title
    pub title: String,

    /// Category label (programming language)
    pub language: String,

    /// Snippet body, may span multiple lines
    pub code: String,

    /// Free-form tags, case preserved
    #[serde(default, deserialize_with = "nullable_tags")]
    pub tags: Vec<String>,

    /// Creation timestamp, never changed after creation
    pub created_at: DateTime<Utc>,

    /// Last update timestamp, absent until the first update
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,

    /// Unknown fields carried through from older or newer writers
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn nullable_tags<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

impl Snippet {
    /// Tags joined for display, e.g. `algo, sort`
    pub fn tags_display(&self) -> String {
        self.tags.join(", ")
    }

    /// Check if any tag contains the given lowercase needle
    pub fn has_tag_containing(&self, needle: &str) -> bool {
        self.tags.iter().any(|t| t.to_lowercase().contains(needle))
    }

    /// Apply a partial change, returning the merged record
    pub fn merged(&self, patch: &SnippetPatch) -> Snippet {
        let mut next = self.clone();
        if let Some(title) = &patch.title {
            next.title = title.clone();
        }
        if let Some(language) = &patch.language {
            next.language = language.clone();
        }
        if let Some(code) = &patch.code {
            next.code = code.clone();
        }
        if let Some(tags) = &patch.tags {
            next.tags = tags.clone();
        }
        next
    }
}

/// Fields supplied by the caller when creating a snippet
#[derive(Debug, Clone, Default)]
pub struct SnippetInput {
    pub title: String,
    pub language: String,
    pub code: String,
    pub tags: Vec<String>,
}

impl SnippetInput {
    /// Create input with no tags
    pub fn new(title: impl Into<String>, language: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            language: language.into(),
            code: code.into(),
            tags: Vec::new(),
        }
    }

    /// Set the tags
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

/// Partial change to an existing snippet; `None` leaves a field as is
#[derive(Debug, Clone, Default)]
pub struct SnippetPatch {
    pub title: Option<String>,
    pub language: Option<String>,
    pub code: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl SnippetPatch {
    /// True when the patch changes nothing
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.language.is_none() && self.code.is_none() && self.tags.is_none()
    }
}

/// Split comma-separated tag input into normalized tags
pub fn parse_tags(input: &str) -> Vec<String> {
    normalize_tags(input.split(','))
}

/// Trim each tag and drop the empty ones, keeping order
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tags.into_iter()
        .map(|t| t.as_ref().trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Fail with a validation error if `value` is blank
pub(crate) fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(SnippetError::validation(field, "must not be empty"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Snippet {
        Snippet {
            id: 7,
            title: "A".to_string(),
            language: "rust".to_string(),
            code: "fn a() {}".to_string(),
            tags: vec!["CLI".to_string(), "io".to_string()],
            created_at: "2024-01-01T00:00:00Z".parse().unwrap(),
            updated_at: None,
            extra: Default::default(),
        }
    }

    #[test]
    fn test_parse_tags_trims_and_drops_empty() {
        assert_eq!(parse_tags("algo, sort"), vec!["algo", "sort"]);
        assert_eq!(parse_tags(" a ,, b ,"), vec!["a", "b"]);
        assert!(parse_tags("").is_empty());
        assert!(parse_tags(" , ").is_empty());
    }

    #[test]
    fn test_parse_tags_preserves_case() {
        assert_eq!(parse_tags("Rust,CLI"), vec!["Rust", "CLI"]);
    }

    #[test]
    fn test_serializes_camel_case_without_updated_at() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(value["createdAt"], "2024-01-01T00:00:00Z");
        assert!(value.get("updatedAt").is_none());
        assert!(value.get("created_at").is_none());
    }

    #[test]
    fn test_deserialize_missing_optional_fields() {
        let snippet: Snippet = serde_json::from_value(json!({
            "id": 1,
            "title": "t",
            "language": "js",
            "code": "x",
            "createdAt": "2024-01-01T00:00:00.000Z"
        }))
        .unwrap();
        assert!(snippet.tags.is_empty());
        assert!(snippet.updated_at.is_none());
        assert!(snippet.extra.is_empty());
    }

    #[test]
    fn test_deserialize_null_tags() {
        let snippet: Snippet = serde_json::from_value(json!({
            "id": 1,
            "title": "t",
            "language": "js",
            "code": "x",
            "tags": null,
            "createdAt": "2024-01-01T00:00:00Z"
        }))
        .unwrap();
        assert!(snippet.tags.is_empty());
    }

    #[test]
    fn test_unknown_fields_pass_through() {
        let input = json!({
            "id": 1,
            "title": "t",
            "language": "js",
            "code": "x",
            "tags": [],
            "createdAt": "2024-01-01T00:00:00Z",
            "favorite": true,
            "meta": {"source": "gist"}
        });
        let snippet: Snippet = serde_json::from_value(input).unwrap();
        assert_eq!(snippet.extra.get("favorite"), Some(&json!(true)));

        let output = serde_json::to_value(&snippet).unwrap();
        assert_eq!(output["meta"]["source"], "gist");
        assert_eq!(output["favorite"], true);
    }

    #[test]
    fn test_merged_only_touches_patched_fields() {
        let original = sample();
        let patch = SnippetPatch {
            title: Some("B".to_string()),
            ..Default::default()
        };
        let merged = original.merged(&patch);
        assert_eq!(merged.title, "B");
        assert_eq!(merged.code, original.code);
        assert_eq!(merged.tags, original.tags);
        assert_eq!(merged.created_at, original.created_at);
    }

    #[test]
    fn test_has_tag_containing_is_case_insensitive_on_tag() {
        let snippet = sample();
        assert!(snippet.has_tag_containing("cli"));
        assert!(snippet.has_tag_containing("l"));
        assert!(!snippet.has_tag_containing("net"));
    }

    #[test]
    fn test_require_text() {
        assert!(require_text("title", "ok").is_ok());
        assert!(require_text("title", "   \n").is_err());
    }
}
