//! Core SnippetStore implementation

use chrono::NaiveDate;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::clock::{Clock, iso8601};
use crate::error::{Result, SnippetError};
use crate::id::IdGenerator;
use crate::persistence::Persistence;
use crate::query::{self, Criteria};
use crate::snippet::{Snippet, SnippetId, SnippetInput, SnippetPatch, normalize_tags, require_text};

/// Default persistence slot for the collection
pub const DEFAULT_SLOT: &str = "snippets";

/// Owner of the snippet collection
///
/// The collection is ordered most-recent-first. Every mutation is applied to
/// memory first and then written to the persistence slot; a failed write is
/// logged and kept for [`SnippetStore::take_save_error`], while the
/// in-memory collection stays authoritative.
pub struct SnippetStore {
    snippets: Vec<Snippet>,
    persistence: Box<dyn Persistence>,
    clock: Box<dyn Clock>,
    slot: String,
    languages: Vec<String>,
    ids: IdGenerator,
    save_error: Option<SnippetError>,
    unreadable: Option<String>,
}

impl SnippetStore {
    /// Create an empty store; call [`SnippetStore::load`] to read persisted state
    pub fn new(persistence: impl Persistence + 'static, clock: impl Clock + 'static) -> Self {
        Self {
            snippets: Vec::new(),
            persistence: Box::new(persistence),
            clock: Box::new(clock),
            slot: DEFAULT_SLOT.to_string(),
            languages: Vec::new(),
            ids: IdGenerator::default(),
            save_error: None,
            unreadable: None,
        }
    }

    /// Use a different persistence slot
    pub fn with_slot(mut self, slot: impl Into<String>) -> Self {
        self.slot = slot.into();
        self
    }

    /// Restrict language labels to a closed set; empty means any label
    pub fn with_languages<I, S>(mut self, languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.languages = languages.into_iter().map(Into::into).collect();
        self
    }

    /// Read the persisted collection, falling back to empty on any failure
    ///
    /// Unreadable content is kept aside and backed up before the first write
    /// replaces it.
    pub fn load(&mut self) -> usize {
        self.unreadable = None;
        self.snippets = match self.persistence.get(&self.slot) {
            Ok(Some(content)) => match serde_json::from_str::<Vec<Snippet>>(&content) {
                Ok(snippets) => snippets,
                Err(e) => {
                    warn!(slot = %self.slot, error = %e, "Persisted snippets unreadable, starting empty");
                    self.unreadable = Some(content);
                    Vec::new()
                }
            },
            Ok(None) => {
                debug!(slot = %self.slot, "No persisted snippets");
                Vec::new()
            }
            Err(e) => {
                warn!(slot = %self.slot, error = %e, "Failed to read persisted snippets, starting empty");
                Vec::new()
            }
        };

        self.ids = IdGenerator::after(self.snippets.iter().map(|s| &s.id));
        if has_duplicate_ids(&self.snippets) {
            warn!(slot = %self.slot, "Persisted snippets contain duplicate ids");
        }

        info!(slot = %self.slot, count = self.snippets.len(), "Loaded snippets");
        self.snippets.len()
    }

    /// Write the collection to the persistence slot
    pub fn save(&mut self) -> Result<()> {
        let content = serde_json::to_string(&self.snippets).map_err(crate::error::PersistenceError::from)?;
        if let Some(raw) = &self.unreadable {
            self.persistence.backup(&self.slot, raw)?;
            warn!(slot = %self.slot, "Backed up unreadable snippets before overwriting");
            self.unreadable = None;
        }
        self.persistence.set(&self.slot, &content)?;
        debug!(slot = %self.slot, count = self.snippets.len(), "Saved snippets");
        Ok(())
    }

    fn persist(&mut self) {
        match self.save() {
            Ok(()) => self.save_error = None,
            Err(e) => {
                warn!(slot = %self.slot, error = %e, "Failed to save snippets, keeping in-memory state");
                self.save_error = Some(e);
            }
        }
    }

    /// Take the most recent save failure, if the last save failed
    pub fn take_save_error(&mut self) -> Option<SnippetError> {
        self.save_error.take()
    }

    /// The collection, most recent first
    pub fn snippets(&self) -> &[Snippet] {
        &self.snippets
    }

    pub fn len(&self) -> usize {
        self.snippets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snippets.is_empty()
    }

    /// Look up a snippet by id
    pub fn get(&self, id: SnippetId) -> Option<&Snippet> {
        self.snippets.iter().find(|s| s.id == id)
    }

    /// Access the underlying persistence provider
    pub fn persistence(&self) -> &dyn Persistence {
        self.persistence.as_ref()
    }

    fn check_language(&self, language: &str) -> Result<()> {
        require_text("language", language)?;
        self.check_allowed_language(language)
    }

    fn check_allowed_language(&self, language: &str) -> Result<()> {
        if !self.languages.is_empty() && !self.languages.iter().any(|l| l == language) {
            return Err(SnippetError::validation(
                "language",
                format!("'{}' is not one of: {}", language, self.languages.join(", ")),
            ));
        }
        Ok(())
    }

    /// Create a snippet and prepend it to the collection
    pub fn create(&mut self, input: SnippetInput) -> Result<Snippet> {
        require_text("title", &input.title)?;
        require_text("code", &input.code)?;
        self.check_language(&input.language)?;

        let now = self.clock.now();
        let snippet = Snippet {
            id: self.ids.next_id(now),
            title: input.title.trim().to_string(),
            language: input.language,
            code: input.code,
            tags: normalize_tags(&input.tags),
            created_at: now,
            updated_at: None,
            extra: Default::default(),
        };

        self.snippets.insert(0, snippet.clone());
        self.persist();

        info!(id = snippet.id, title = %snippet.title, "Created snippet");
        Ok(snippet)
    }

    /// Replace a stored snippet in place
    ///
    /// `created_at` is carried over from the stored record regardless of the
    /// value in `snippet`; `updated_at` is stamped with the current time.
    /// The closed language set only applies when the language changes, so
    /// imported records outside it stay editable.
    pub fn update(&mut self, mut snippet: Snippet) -> Result<Snippet> {
        let index = self
            .snippets
            .iter()
            .position(|s| s.id == snippet.id)
            .ok_or(SnippetError::NotFound { id: snippet.id })?;

        require_text("title", &snippet.title)?;
        require_text("code", &snippet.code)?;
        require_text("language", &snippet.language)?;
        if snippet.language != self.snippets[index].language {
            self.check_allowed_language(&snippet.language)?;
        }

        snippet.title = snippet.title.trim().to_string();
        snippet.tags = normalize_tags(&snippet.tags);
        snippet.created_at = self.snippets[index].created_at;
        snippet.updated_at = Some(self.clock.now());

        self.snippets[index] = snippet.clone();
        self.persist();

        info!(id = snippet.id, "Updated snippet");
        Ok(snippet)
    }

    /// Merge a partial change into a stored snippet
    pub fn edit(&mut self, id: SnippetId, patch: &SnippetPatch) -> Result<Snippet> {
        let current = self.get(id).ok_or(SnippetError::NotFound { id })?;
        let merged = current.merged(patch);
        self.update(merged)
    }

    /// Remove the first snippet with `id`; absent ids are ignored
    ///
    /// Callers are expected to have confirmed the deletion already.
    pub fn delete(&mut self, id: SnippetId) -> Option<Snippet> {
        let index = self.snippets.iter().position(|s| s.id == id)?;
        let removed = self.snippets.remove(index);
        self.persist();

        info!(id, "Deleted snippet");
        Some(removed)
    }

    /// Replace the whole collection, or nothing if any record is invalid
    pub fn import_all(&mut self, records: Vec<Snippet>) -> Result<usize> {
        validate_batch(&records)?;

        for snippet in &records {
            self.ids.observe(snippet.id);
        }
        self.snippets = records;
        self.persist();

        info!(count = self.snippets.len(), "Imported snippets");
        Ok(self.snippets.len())
    }

    /// Parse an exported JSON array and replace the collection with it
    ///
    /// Nothing changes unless every element is valid.
    pub fn import_json(&mut self, content: &str) -> Result<usize> {
        let records = self.prepare_import(content)?;
        self.import_all(records)
    }

    /// Parse and validate an exported JSON array without touching the store
    ///
    /// Elements without an `id` get a fresh one and elements without a
    /// `createdAt` are stamped with the import time. The result is ready for
    /// [`SnippetStore::import_all`].
    pub fn prepare_import(&self, content: &str) -> Result<Vec<Snippet>> {
        let parsed: Value = serde_json::from_str(content)
            .map_err(|e| SnippetError::validation("import", format!("not valid JSON: {}", e)))?;
        let Value::Array(items) = parsed else {
            return Err(SnippetError::validation("import", "expected a JSON array of snippets"));
        };

        let mut objects = Vec::with_capacity(items.len());
        for (i, item) in items.into_iter().enumerate() {
            let Value::Object(obj) = item else {
                return Err(SnippetError::validation(format!("snippets[{}]", i), "expected an object"));
            };
            for field in ["title", "code", "language"] {
                if !obj.get(field).is_some_and(Value::is_string) {
                    return Err(SnippetError::validation(
                        format!("snippets[{}].{}", i, field),
                        "is missing",
                    ));
                }
            }
            objects.push(obj);
        }

        // fresh ids must clear the ids already present in the batch
        let mut ids = self.ids.clone();
        for obj in &objects {
            if let Some(id) = obj.get("id").and_then(Value::as_u64) {
                ids.observe(id);
            }
        }

        let now = self.clock.now();
        let mut records = Vec::with_capacity(objects.len());
        for (i, mut obj) in objects.into_iter().enumerate() {
            if obj.get("id").is_none_or(Value::is_null) {
                obj.insert("id".to_string(), Value::from(ids.next_id(now)));
            }
            if obj.get("createdAt").is_none_or(Value::is_null) {
                obj.insert("createdAt".to_string(), Value::from(iso8601(now)));
            }
            let snippet: Snippet = serde_json::from_value(Value::Object(obj))
                .map_err(|e| SnippetError::validation(format!("snippets[{}]", i), e.to_string()))?;
            records.push(snippet);
        }

        validate_batch(&records)?;
        Ok(records)
    }

    /// Deep copy of the collection, order preserved
    pub fn export_all(&self) -> Vec<Snippet> {
        self.snippets.clone()
    }

    /// Pretty-printed JSON array of the collection
    pub fn export_json(&self) -> Result<String> {
        let content =
            serde_json::to_string_pretty(&self.snippets).map_err(crate::error::PersistenceError::from)?;
        Ok(content)
    }

    /// Export file name for today
    pub fn export_file_name(&self) -> String {
        export_file_name(self.clock.now().date_naive())
    }

    /// Snippets matching `criteria`, in collection order
    pub fn query(&self, criteria: &Criteria) -> Vec<&Snippet> {
        query::filter(&self.snippets, criteria)
    }

    /// Distinct language labels in the collection
    pub fn languages_in_use(&self) -> Vec<&str> {
        query::languages_in_use(&self.snippets)
    }
}

/// Export file name for `date`, e.g. `snippets-2024-01-31.json`
pub fn export_file_name(date: NaiveDate) -> String {
    format!("snippets-{}.json", date.format("%Y-%m-%d"))
}

fn validate_batch(records: &[Snippet]) -> Result<()> {
    for (i, snippet) in records.iter().enumerate() {
        require_text(&format!("snippets[{}].title", i), &snippet.title)?;
        require_text(&format!("snippets[{}].code", i), &snippet.code)?;
        require_text(&format!("snippets[{}].language", i), &snippet.language)?;
    }

    let mut seen = std::collections::HashSet::new();
    for (i, snippet) in records.iter().enumerate() {
        if !seen.insert(snippet.id) {
            return Err(SnippetError::validation(
                format!("snippets[{}].id", i),
                format!("duplicate id {}", snippet.id),
            ));
        }
    }
    Ok(())
}

fn has_duplicate_ids(snippets: &[Snippet]) -> bool {
    let mut seen = std::collections::HashSet::new();
    snippets.iter().any(|s| !seen.insert(s.id))
}
