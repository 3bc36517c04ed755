use rusqlite::{Connection, Transaction, TransactionBehavior};
use serde::Serialize;

use crate::association::SnippetTagAssociation;
use crate::clock::{self, Clock, SystemClock};
use crate::config::ConfigError;
use crate::db;
use crate::domain::{SnippetId, Tag, TagId, TaggedSnippet};
use crate::error::{CatalogError, CatalogResult};
use crate::snippets::SnippetLifecycle;
use crate::store::SqliteStore;
use crate::tags::TagRegistry;

pub struct App {
    conn: Connection,
    clock: Box<dyn Clock>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TagView {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SnippetView {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub created_at: String,
    pub updated_at: String,
    pub tags: Vec<TagView>,
}

impl From<Tag> for TagView {
    fn from(tag: Tag) -> Self {
        Self {
            id: tag.id.get(),
            name: tag.name.to_string(),
        }
    }
}

impl From<TaggedSnippet> for SnippetView {
    fn from(value: TaggedSnippet) -> Self {
        let TaggedSnippet { snippet, tags } = value;
        Self {
            id: snippet.id.get(),
            title: snippet.title,
            content: snippet.content,
            created_at: clock::format_timestamp(snippet.created_at),
            updated_at: clock::format_timestamp(snippet.updated_at),
            tags: tags.into_iter().map(TagView::from).collect(),
        }
    }
}

type Store<'s> = SqliteStore<'s>;

impl App {
    pub fn open(db_path: &str, busy_timeout_ms: u64) -> Result<Self, AppError> {
        ensure_parent_dir(db_path)?;
        let conn = db::open_connection(db_path, busy_timeout_ms)?;
        Ok(Self {
            conn,
            clock: Box::new(SystemClock),
        })
    }

    #[cfg(test)]
    pub(crate) fn open_in_memory(clock: impl Clock + 'static) -> Result<Self, AppError> {
        Ok(Self {
            conn: db::open_in_memory()?,
            clock: Box::new(clock),
        })
    }

    pub fn create_snippet(&self, title: &str, content: &str) -> Result<SnippetView, AppError> {
        self.write(|store| self.lifecycle(store).create(title, content))
            .map(SnippetView::from)
    }

    pub fn show_snippet(&self, id: SnippetId) -> Result<SnippetView, AppError> {
        self.read(|store| self.lifecycle(store).get(id))
            .map(SnippetView::from)
    }

    /// Lists every snippet, or only those carrying the tag named `tag`. An
    /// unknown tag name yields an empty list.
    pub fn list_snippets(&self, tag: Option<&str>) -> Result<Vec<SnippetView>, AppError> {
        let snippets = self.read(|store| match tag {
            None => self.lifecycle(store).get_all(),
            Some(raw) => match TagRegistry::new(store, store).find(raw)? {
                Some(tag) => self.association(store).snippets_tagged(tag.id),
                None => Ok(Vec::new()),
            },
        })?;
        Ok(snippets.into_iter().map(SnippetView::from).collect())
    }

    /// Replaces the given fields; an omitted field keeps its stored value.
    pub fn update_snippet(
        &self,
        id: SnippetId,
        title: Option<&str>,
        content: Option<&str>,
    ) -> Result<SnippetView, AppError> {
        if title.is_none() && content.is_none() {
            return Err(AppError::InvalidArgument(
                "update requires --title or new content".to_string(),
            ));
        }
        self.write(|store| {
            let lifecycle = self.lifecycle(store);
            let current = lifecycle.get(id)?.snippet;
            lifecycle.update(
                id,
                title.unwrap_or(current.title.as_str()),
                content.unwrap_or(current.content.as_str()),
            )
        })
        .map(SnippetView::from)
    }

    pub fn remove_snippet(&self, id: SnippetId) -> Result<(), AppError> {
        let removed = self.write(|store| self.lifecycle(store).remove(id))?;
        if removed {
            Ok(())
        } else {
            Err(CatalogError::snippet_not_found(id).into())
        }
    }

    pub fn create_tag(&self, raw_name: &str) -> Result<TagView, AppError> {
        self.write(|store| TagRegistry::new(store, store).create_or_get(raw_name))
            .map(TagView::from)
    }

    pub fn list_tags(&self) -> Result<Vec<TagView>, AppError> {
        let tags = self.read(|store| TagRegistry::new(store, store).list())?;
        Ok(tags.into_iter().map(TagView::from).collect())
    }

    pub fn show_tag(&self, id: TagId) -> Result<TagView, AppError> {
        self.read(|store| TagRegistry::new(store, store).get(id))
            .map(TagView::from)
    }

    pub fn rename_tag(&self, id: TagId, new_name: &str) -> Result<TagView, AppError> {
        self.write(|store| TagRegistry::new(store, store).rename(id, new_name))
            .map(TagView::from)
    }

    pub fn remove_tag(&self, id: TagId) -> Result<(), AppError> {
        let removed = self.write(|store| TagRegistry::new(store, store).remove(id))?;
        if removed {
            Ok(())
        } else {
            Err(CatalogError::tag_not_found(id).into())
        }
    }

    pub fn attach(&self, snippet: SnippetId, tag: TagId) -> Result<SnippetView, AppError> {
        self.write(|store| self.association(store).add_tag(snippet, tag))
            .map(SnippetView::from)
    }

    pub fn detach(&self, snippet: SnippetId, tag: TagId) -> Result<SnippetView, AppError> {
        self.write(|store| self.association(store).remove_tag(snippet, tag))
            .map(SnippetView::from)
    }

    pub fn snippet_tags(&self, snippet: SnippetId) -> Result<Vec<TagView>, AppError> {
        let tags = self.read(|store| self.association(store).list_tags(snippet))?;
        Ok(tags.into_iter().map(TagView::from).collect())
    }

    fn lifecycle<'s>(&'s self, store: &'s Store<'s>) -> SnippetLifecycle<'s, Store<'s>, Store<'s>> {
        SnippetLifecycle::new(store, store, self.clock.as_ref())
    }

    fn association<'s>(
        &'s self,
        store: &'s Store<'s>,
    ) -> SnippetTagAssociation<'s, Store<'s>, Store<'s>, Store<'s>> {
        SnippetTagAssociation::new(store, store, store, self.clock.as_ref())
    }

    fn write<T>(&self, op: impl FnOnce(&Store<'_>) -> CatalogResult<T>) -> Result<T, AppError> {
        self.in_transaction(TransactionBehavior::Immediate, op)
    }

    fn read<T>(&self, op: impl FnOnce(&Store<'_>) -> CatalogResult<T>) -> Result<T, AppError> {
        self.in_transaction(TransactionBehavior::Deferred, op)
    }

    // Dropping the transaction on the error path rolls it back.
    fn in_transaction<T>(
        &self,
        behavior: TransactionBehavior,
        op: impl FnOnce(&Store<'_>) -> CatalogResult<T>,
    ) -> Result<T, AppError> {
        let tx = Transaction::new_unchecked(&self.conn, behavior)?;
        let value = op(&SqliteStore::new(&tx))?;
        tx.commit()?;
        Ok(value)
    }
}

fn ensure_parent_dir(path: &str) -> Result<(), AppError> {
    if let Some(parent) = std::path::Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("database error: {0}")]
    Db(#[from] rusqlite::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("{0}")]
    InvalidArgument(String),
}
