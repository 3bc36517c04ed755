use rusqlite::Connection;

use crate::clock::{format_timestamp, parse_timestamp};
use crate::db::{self, InsertSnippet, SnippetRecord, TagRecord};
use crate::domain::{NewSnippet, Snippet, SnippetId, Tag, TagId, TagName};

use super::{AssociationStore, SnippetStore, StoreError, StoreResult, TagStore};

/// Store bound to one connection, usually an open transaction.
pub struct SqliteStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    err.sqlite_error()
        .is_some_and(|inner| inner.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE)
}

fn snippet_from_record(record: SnippetRecord) -> StoreResult<Snippet> {
    let created_at =
        parse_timestamp(&record.created_at).map_err(|source| StoreError::CorruptTimestamp {
            column: "snippet.created_at",
            value: record.created_at.clone(),
            source,
        })?;
    let updated_at =
        parse_timestamp(&record.updated_at).map_err(|source| StoreError::CorruptTimestamp {
            column: "snippet.updated_at",
            value: record.updated_at.clone(),
            source,
        })?;
    Ok(Snippet {
        id: SnippetId(record.id),
        title: record.title,
        content: record.content,
        created_at,
        updated_at,
    })
}

fn tag_from_record(record: TagRecord) -> Tag {
    Tag {
        id: TagId(record.id),
        name: TagName::from_canonical(record.name),
    }
}

impl SnippetStore for SqliteStore<'_> {
    fn insert(&self, snippet: &NewSnippet<'_>) -> StoreResult<Snippet> {
        let created_at = format_timestamp(snippet.created_at);
        let id = db::insert_snippet(
            self.conn,
            &InsertSnippet {
                title: snippet.title,
                content: snippet.content,
                created_at: &created_at,
                updated_at: &created_at,
            },
        )?;
        Ok(Snippet {
            id: SnippetId(id),
            title: snippet.title.to_string(),
            content: snippet.content.to_string(),
            created_at: snippet.created_at,
            updated_at: snippet.created_at,
        })
    }

    fn save(&self, snippet: &Snippet) -> StoreResult<()> {
        db::update_snippet(
            self.conn,
            &SnippetRecord {
                id: snippet.id.get(),
                title: snippet.title.clone(),
                content: snippet.content.clone(),
                created_at: format_timestamp(snippet.created_at),
                updated_at: format_timestamp(snippet.updated_at),
            },
        )?;
        Ok(())
    }

    fn find_by_id(&self, id: SnippetId) -> StoreResult<Option<Snippet>> {
        db::get_snippet(self.conn, id.get())?
            .map(snippet_from_record)
            .transpose()
    }

    fn find_all(&self) -> StoreResult<Vec<Snippet>> {
        db::list_snippets(self.conn)?
            .into_iter()
            .map(snippet_from_record)
            .collect()
    }

    fn exists_by_id(&self, id: SnippetId) -> StoreResult<bool> {
        Ok(db::snippet_exists(self.conn, id.get())?)
    }

    fn delete_by_id(&self, id: SnippetId) -> StoreResult<()> {
        db::delete_snippet(self.conn, id.get())?;
        Ok(())
    }
}

impl TagStore for SqliteStore<'_> {
    fn insert(&self, name: &TagName) -> StoreResult<Tag> {
        match db::insert_tag(self.conn, name.as_str()) {
            Ok(id) => Ok(Tag {
                id: TagId(id),
                name: name.clone(),
            }),
            Err(err) if is_unique_violation(&err) => Err(StoreError::DuplicateTagName(name.clone())),
            Err(err) => Err(err.into()),
        }
    }

    fn save(&self, tag: &Tag) -> StoreResult<()> {
        match db::rename_tag(self.conn, tag.id.get(), tag.name.as_str()) {
            Ok(_) => Ok(()),
            Err(err) if is_unique_violation(&err) => {
                Err(StoreError::DuplicateTagName(tag.name.clone()))
            }
            Err(err) => Err(err.into()),
        }
    }

    fn find_by_id(&self, id: TagId) -> StoreResult<Option<Tag>> {
        Ok(db::get_tag(self.conn, id.get())?.map(tag_from_record))
    }

    fn find_all(&self) -> StoreResult<Vec<Tag>> {
        Ok(db::list_tags(self.conn)?
            .into_iter()
            .map(tag_from_record)
            .collect())
    }

    fn exists_by_id(&self, id: TagId) -> StoreResult<bool> {
        Ok(db::tag_exists(self.conn, id.get())?)
    }

    fn delete_by_id(&self, id: TagId) -> StoreResult<()> {
        db::delete_tag(self.conn, id.get())?;
        Ok(())
    }

    fn find_by_normalized_name(&self, name: &TagName) -> StoreResult<Option<Tag>> {
        Ok(db::find_tag_by_name(self.conn, name.as_str())?.map(tag_from_record))
    }
}

impl AssociationStore for SqliteStore<'_> {
    fn link(&self, snippet: SnippetId, tag: TagId) -> StoreResult<bool> {
        Ok(db::insert_link(self.conn, snippet.get(), tag.get())?)
    }

    fn unlink(&self, snippet: SnippetId, tag: TagId) -> StoreResult<bool> {
        Ok(db::delete_link(self.conn, snippet.get(), tag.get())?)
    }

    fn tags_for_snippet(&self, snippet: SnippetId) -> StoreResult<Vec<Tag>> {
        Ok(db::list_tags_for_snippet(self.conn, snippet.get())?
            .into_iter()
            .map(tag_from_record)
            .collect())
    }

    fn snippets_for_tag(&self, tag: TagId) -> StoreResult<Vec<SnippetId>> {
        Ok(db::list_snippet_ids_for_tag(self.conn, tag.get())?
            .into_iter()
            .map(SnippetId)
            .collect())
    }

    fn unlink_snippet(&self, snippet: SnippetId) -> StoreResult<usize> {
        Ok(db::delete_links_for_snippet(self.conn, snippet.get())?)
    }

    fn unlink_tag(&self, tag: TagId) -> StoreResult<usize> {
        Ok(db::delete_links_for_tag(self.conn, tag.get())?)
    }
}
