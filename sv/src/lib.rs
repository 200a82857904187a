//! SnippetVault - local code snippet repository
//!
//! Stores short code snippets with a title, a language label and free-form
//! tags in a single JSON slot, and derives filtered views over them.
//!
//! # Architecture
//!
//! ```text
//! SnippetStore ──owns──> Vec<Snippet> (most recent first)
//!      │                      │
//!      │ get/set              │ borrowed by
//!      v                      v
//! Persistence            query::filter(&[Snippet], &Criteria) -> Vec<&Snippet>
//! (FileProvider: {store_path}/{slot}.json)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use snippetvault::{Criteria, FileProvider, SnippetInput, SnippetStore, SystemClock, parse_tags};
//!
//! let mut store = SnippetStore::new(FileProvider::new(".snippetvault"), SystemClock);
//! store.load();
//! store.create(SnippetInput::new("Sort", "python", "def s(): pass").with_tags(parse_tags("algo, sort")))?;
//! let view = store.query(&Criteria::new().language("python").tag("algo"));
//! ```

pub mod cli;
pub mod clock;
pub mod config;
mod error;
mod id;
pub mod persistence;
pub mod query;
mod snippet;
mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{PersistenceError, Result, SnippetError};
pub use id::IdGenerator;
pub use persistence::{FileProvider, MemoryProvider, Persistence};
pub use query::{Criteria, filter};
pub use snippet::{Snippet, SnippetId, SnippetInput, SnippetPatch, normalize_tags, parse_tags};
pub use store::{DEFAULT_SLOT, SnippetStore, export_file_name};

/// Language label used when none is given
pub const DEFAULT_LANGUAGE: &str = "plaintext";
