mod sqlite;

pub use sqlite::SqliteStore;

use crate::domain::{NewSnippet, Snippet, SnippetId, Tag, TagId, TagName};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Db(#[from] rusqlite::Error),
    #[error("a tag named '{0}' already exists")]
    DuplicateTagName(TagName),
    #[error("corrupt {column} value '{value}': {source}")]
    CorruptTimestamp {
        column: &'static str,
        value: String,
        source: time::error::Parse,
    },
}

pub type StoreResult<T> = Result<T, StoreError>;

pub trait SnippetStore {
    fn insert(&self, snippet: &NewSnippet<'_>) -> StoreResult<Snippet>;
    /// Overwrites an existing row; `created_at` is left as stored.
    fn save(&self, snippet: &Snippet) -> StoreResult<()>;
    fn find_by_id(&self, id: SnippetId) -> StoreResult<Option<Snippet>>;
    fn find_all(&self) -> StoreResult<Vec<Snippet>>;
    fn exists_by_id(&self, id: SnippetId) -> StoreResult<bool>;
    fn delete_by_id(&self, id: SnippetId) -> StoreResult<()>;
}

pub trait TagStore {
    /// Fails with [`StoreError::DuplicateTagName`] when the name is taken.
    fn insert(&self, name: &TagName) -> StoreResult<Tag>;
    fn save(&self, tag: &Tag) -> StoreResult<()>;
    fn find_by_id(&self, id: TagId) -> StoreResult<Option<Tag>>;
    fn find_all(&self) -> StoreResult<Vec<Tag>>;
    fn exists_by_id(&self, id: TagId) -> StoreResult<bool>;
    fn delete_by_id(&self, id: TagId) -> StoreResult<()>;
    fn find_by_normalized_name(&self, name: &TagName) -> StoreResult<Option<Tag>>;
}

/// The snippet/tag relation, addressed explicitly by pair.
pub trait AssociationStore {
    /// Returns true when the pair was newly recorded.
    fn link(&self, snippet: SnippetId, tag: TagId) -> StoreResult<bool>;
    /// Returns true when the pair was present.
    fn unlink(&self, snippet: SnippetId, tag: TagId) -> StoreResult<bool>;
    fn tags_for_snippet(&self, snippet: SnippetId) -> StoreResult<Vec<Tag>>;
    fn snippets_for_tag(&self, tag: TagId) -> StoreResult<Vec<SnippetId>>;
    fn unlink_snippet(&self, snippet: SnippetId) -> StoreResult<usize>;
    fn unlink_tag(&self, tag: TagId) -> StoreResult<usize>;
}
