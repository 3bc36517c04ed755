use tracing::{debug, info};

use crate::clock::Clock;
use crate::domain::{NewSnippet, Snippet, SnippetId, TaggedSnippet};
use crate::error::{CatalogError, CatalogResult};
use crate::store::{AssociationStore, SnippetStore};

pub struct SnippetLifecycle<'a, S, A> {
    snippets: &'a S,
    links: &'a A,
    clock: &'a dyn Clock,
}

impl<'a, S, A> SnippetLifecycle<'a, S, A>
where
    S: SnippetStore,
    A: AssociationStore,
{
    pub fn new(snippets: &'a S, links: &'a A, clock: &'a dyn Clock) -> Self {
        Self {
            snippets,
            links,
            clock,
        }
    }

    pub fn create(&self, title: &str, content: &str) -> CatalogResult<TaggedSnippet> {
        let snippet = self.snippets.insert(&NewSnippet {
            title,
            content,
            created_at: self.clock.now(),
        })?;
        info!(snippet_id = %snippet.id, "created snippet");
        Ok(TaggedSnippet {
            snippet,
            tags: Vec::new(),
        })
    }

    /// Overwrites title and content. Tags and `created_at` are kept.
    pub fn update(
        &self,
        id: SnippetId,
        new_title: &str,
        new_content: &str,
    ) -> CatalogResult<TaggedSnippet> {
        let mut snippet = self.load(id)?;
        snippet.title = new_title.to_string();
        snippet.content = new_content.to_string();
        snippet.touch(self.clock.now());
        self.snippets.save(&snippet)?;
        info!(snippet_id = %id, "updated snippet");
        self.with_tags(snippet)
    }

    pub fn get(&self, id: SnippetId) -> CatalogResult<TaggedSnippet> {
        let snippet = self.load(id)?;
        self.with_tags(snippet)
    }

    pub fn get_all(&self) -> CatalogResult<Vec<TaggedSnippet>> {
        self.snippets
            .find_all()?
            .into_iter()
            .map(|snippet| self.with_tags(snippet))
            .collect()
    }

    pub fn remove(&self, id: SnippetId) -> CatalogResult<bool> {
        if !self.snippets.exists_by_id(id)? {
            debug!(snippet_id = %id, "snippet to remove does not exist");
            return Ok(false);
        }
        let unlinked = self.links.unlink_snippet(id)?;
        self.snippets.delete_by_id(id)?;
        info!(snippet_id = %id, unlinked, "removed snippet");
        Ok(true)
    }

    fn load(&self, id: SnippetId) -> CatalogResult<Snippet> {
        self.snippets
            .find_by_id(id)?
            .ok_or_else(|| CatalogError::snippet_not_found(id))
    }

    fn with_tags(&self, snippet: Snippet) -> CatalogResult<TaggedSnippet> {
        let tags = self.links.tags_for_snippet(snippet.id)?;
        Ok(TaggedSnippet { snippet, tags })
    }
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;
    use time::Duration;

    use super::SnippetLifecycle;
    use crate::clock::testing::ScriptedClock;
    use crate::db;
    use crate::domain::{SnippetId, TagName};
    use crate::error::CatalogError;
    use crate::store::{AssociationStore, SqliteStore, TagStore};

    #[test]
    fn create_sets_equal_timestamps_and_no_tags() {
        let conn = db::open_in_memory().expect("db should open");
        let store = SqliteStore::new(&conn);
        let clock = ScriptedClock::new([datetime!(2026-06-01 08:00:00 UTC)]);
        let lifecycle = SnippetLifecycle::new(&store, &store, &clock);

        let created = lifecycle.create("T", "C").expect("create should succeed");
        assert!(created.snippet.id.get() > 0);
        assert_eq!(created.snippet.title, "T");
        assert_eq!(created.snippet.content, "C");
        assert_eq!(created.snippet.created_at, created.snippet.updated_at);
        assert!(created.tags.is_empty());
    }

    #[test]
    fn update_keeps_created_at_and_tags() {
        let conn = db::open_in_memory().expect("db should open");
        let store = SqliteStore::new(&conn);
        let start = datetime!(2026-06-01 08:00:00 UTC);
        let clock = ScriptedClock::new([start, start + Duration::minutes(5)]);
        let lifecycle = SnippetLifecycle::new(&store, &store, &clock);

        let created = lifecycle.create("old", "body").expect("create");
        let tag = store
            .insert(&"keep".parse::<TagName>().expect("valid"))
            .expect("tag insert");
        store.link(created.snippet.id, tag.id).expect("link");

        let updated = lifecycle
            .update(created.snippet.id, "new", "new body")
            .expect("update should succeed");
        assert_eq!(updated.snippet.title, "new");
        assert_eq!(updated.snippet.content, "new body");
        assert_eq!(updated.snippet.created_at, start);
        assert_eq!(updated.snippet.updated_at, start + Duration::minutes(5));
        assert_eq!(updated.tags, vec![tag]);

        let reloaded = lifecycle.get(created.snippet.id).expect("get");
        assert_eq!(reloaded, updated);
    }

    #[test]
    fn update_never_moves_updated_at_backwards() {
        let conn = db::open_in_memory().expect("db should open");
        let store = SqliteStore::new(&conn);
        let start = datetime!(2026-06-01 08:00:00 UTC);
        let clock = ScriptedClock::new([start, start - Duration::hours(1)]);
        let lifecycle = SnippetLifecycle::new(&store, &store, &clock);

        let created = lifecycle.create("t", "c").expect("create");
        let updated = lifecycle
            .update(created.snippet.id, "t2", "c2")
            .expect("update");
        assert_eq!(updated.snippet.updated_at, start);
        assert!(updated.snippet.updated_at >= updated.snippet.created_at);
    }

    #[test]
    fn update_and_get_of_missing_snippet_fail() {
        let conn = db::open_in_memory().expect("db should open");
        let store = SqliteStore::new(&conn);
        let clock = ScriptedClock::new([datetime!(2026-06-01 08:00:00 UTC)]);
        let lifecycle = SnippetLifecycle::new(&store, &store, &clock);

        assert!(matches!(
            lifecycle.update(SnippetId(9), "t", "c"),
            Err(CatalogError::NotFound { id: 9, .. })
        ));
        assert!(matches!(
            lifecycle.get(SnippetId(9)),
            Err(CatalogError::NotFound { id: 9, .. })
        ));
    }

    #[test]
    fn remove_deletes_row_and_its_associations() {
        let conn = db::open_in_memory().expect("db should open");
        let store = SqliteStore::new(&conn);
        let clock = ScriptedClock::new([datetime!(2026-06-01 08:00:00 UTC)]);
        let lifecycle = SnippetLifecycle::new(&store, &store, &clock);

        let created = lifecycle.create("t", "c").expect("create");
        let tag = store
            .insert(&"gone".parse::<TagName>().expect("valid"))
            .expect("tag insert");
        store.link(created.snippet.id, tag.id).expect("link");

        assert!(lifecycle.remove(created.snippet.id).expect("first remove"));
        assert!(!lifecycle.remove(created.snippet.id).expect("second remove"));
        assert!(store.snippets_for_tag(tag.id).expect("links").is_empty());
        assert!(store.exists_by_id(tag.id).expect("tag exists"));
    }

    #[test]
    fn get_all_returns_every_snippet() {
        let conn = db::open_in_memory().expect("db should open");
        let store = SqliteStore::new(&conn);
        let clock = ScriptedClock::new([datetime!(2026-06-01 08:00:00 UTC)]);
        let lifecycle = SnippetLifecycle::new(&store, &store, &clock);

        assert!(lifecycle.get_all().expect("empty list").is_empty());
        let first = lifecycle.create("a", "1").expect("create a");
        let second = lifecycle.create("b", "2").expect("create b");
        let ids = lifecycle
            .get_all()
            .expect("list")
            .into_iter()
            .map(|item| item.snippet.id)
            .collect::<Vec<_>>();
        assert_eq!(ids, vec![first.snippet.id, second.snippet.id]);
    }
}
