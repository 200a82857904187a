//! Filtered views over a snippet collection
//!
//! Filtering is a pure function of the collection and the criteria. Nothing
//! is cached; callers recompute the view whenever either changes.

use crate::snippet::Snippet;

/// Filter criteria; empty or absent fields match everything
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Criteria {
    /// Case-insensitive substring of title or code
    pub search_text: Option<String>,

    /// Exact language label
    pub language: Option<String>,

    /// Case-insensitive substring of any tag
    pub tag_substring: Option<String>,
}

impl Criteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search_text = Some(text.into());
        self
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn tag(mut self, substring: impl Into<String>) -> Self {
        self.tag_substring = Some(substring.into());
        self
    }

    /// True when no criterion restricts the view
    pub fn is_empty(&self) -> bool {
        active(&self.search_text).is_none() && active(&self.language).is_none() && active(&self.tag_substring).is_none()
    }

    /// Check a single snippet against all criteria
    pub fn matches(&self, snippet: &Snippet) -> bool {
        Matcher::new(self).matches(snippet)
    }
}

fn active(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

/// Criteria with the case-insensitive needles lowered once
struct Matcher<'c> {
    search: Option<String>,
    language: Option<&'c str>,
    tag: Option<String>,
}

impl<'c> Matcher<'c> {
    fn new(criteria: &'c Criteria) -> Self {
        Self {
            search: active(&criteria.search_text).map(str::to_lowercase),
            language: active(&criteria.language),
            tag: active(&criteria.tag_substring).map(str::to_lowercase),
        }
    }

    fn matches(&self, snippet: &Snippet) -> bool {
        let search_ok = self.search.as_deref().is_none_or(|needle| {
            snippet.title.to_lowercase().contains(needle) || snippet.code.to_lowercase().contains(needle)
        });
        let language_ok = self.language.is_none_or(|lang| snippet.language == lang);
        let tag_ok = self.tag.as_deref().is_none_or(|needle| snippet.has_tag_containing(needle));

        search_ok && language_ok && tag_ok
    }
}

/// Return the snippets matching `criteria`, in collection order
pub fn filter<'a>(collection: &'a [Snippet], criteria: &Criteria) -> Vec<&'a Snippet> {
    let matcher = Matcher::new(criteria);
    collection.iter().filter(|s| matcher.matches(s)).collect()
}

/// Distinct language labels in order of first appearance
pub fn languages_in_use(collection: &[Snippet]) -> Vec<&str> {
    let mut seen: Vec<&str> = Vec::new();
    for snippet in collection {
        if !seen.contains(&snippet.language.as_str()) {
            seen.push(&snippet.language);
        }
    }
    seen
}
