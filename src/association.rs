use tracing::{debug, info};

use crate::clock::Clock;
use crate::domain::{Snippet, SnippetId, Tag, TagId, TaggedSnippet};
use crate::error::{CatalogError, CatalogResult};
use crate::store::{AssociationStore, SnippetStore, TagStore};

/// Adds and removes tag references on snippets.
///
/// Both ends are loaded before the relation is touched, so a missing
/// snippet or tag never leaves a partial write behind. Re-adding a present
/// pair and removing an absent one are no-ops that write nothing and leave
/// `updated_at` alone.
pub struct SnippetTagAssociation<'a, S, T, A> {
    snippets: &'a S,
    tags: &'a T,
    links: &'a A,
    clock: &'a dyn Clock,
}

impl<'a, S, T, A> SnippetTagAssociation<'a, S, T, A>
where
    S: SnippetStore,
    T: TagStore,
    A: AssociationStore,
{
    pub fn new(snippets: &'a S, tags: &'a T, links: &'a A, clock: &'a dyn Clock) -> Self {
        Self {
            snippets,
            tags,
            links,
            clock,
        }
    }

    pub fn add_tag(&self, snippet_id: SnippetId, tag_id: TagId) -> CatalogResult<TaggedSnippet> {
        let (mut snippet, tag) = self.load_pair(snippet_id, tag_id)?;
        if self.links.link(snippet_id, tag_id)? {
            self.touch(&mut snippet)?;
            info!(snippet_id = %snippet_id, tag_id = %tag_id, tag = %tag.name, "tagged snippet");
        } else {
            debug!(snippet_id = %snippet_id, tag_id = %tag_id, "tag already attached");
        }
        self.with_tags(snippet)
    }

    pub fn remove_tag(&self, snippet_id: SnippetId, tag_id: TagId) -> CatalogResult<TaggedSnippet> {
        let (mut snippet, tag) = self.load_pair(snippet_id, tag_id)?;
        if self.links.unlink(snippet_id, tag_id)? {
            self.touch(&mut snippet)?;
            info!(snippet_id = %snippet_id, tag_id = %tag_id, tag = %tag.name, "untagged snippet");
        } else {
            debug!(snippet_id = %snippet_id, tag_id = %tag_id, "tag was not attached");
        }
        self.with_tags(snippet)
    }

    pub fn list_tags(&self, snippet_id: SnippetId) -> CatalogResult<Vec<Tag>> {
        if !self.snippets.exists_by_id(snippet_id)? {
            return Err(CatalogError::snippet_not_found(snippet_id));
        }
        Ok(self.links.tags_for_snippet(snippet_id)?)
    }

    /// Snippets that currently carry `tag_id`, in id order.
    pub fn snippets_tagged(&self, tag_id: TagId) -> CatalogResult<Vec<TaggedSnippet>> {
        if !self.tags.exists_by_id(tag_id)? {
            return Err(CatalogError::tag_not_found(tag_id));
        }
        let mut tagged = Vec::new();
        for snippet_id in self.links.snippets_for_tag(tag_id)? {
            if let Some(snippet) = self.snippets.find_by_id(snippet_id)? {
                tagged.push(self.with_tags(snippet)?);
            }
        }
        Ok(tagged)
    }

    fn load_pair(&self, snippet_id: SnippetId, tag_id: TagId) -> CatalogResult<(Snippet, Tag)> {
        let snippet = self.snippets.find_by_id(snippet_id)?;
        let tag = self.tags.find_by_id(tag_id)?;
        match (snippet, tag) {
            (Some(snippet), Some(tag)) => Ok((snippet, tag)),
            (None, _) => Err(CatalogError::snippet_not_found(snippet_id)),
            (Some(_), None) => Err(CatalogError::tag_not_found(tag_id)),
        }
    }

    fn touch(&self, snippet: &mut Snippet) -> CatalogResult<()> {
        snippet.touch(self.clock.now());
        self.snippets.save(snippet)?;
        Ok(())
    }

    fn with_tags(&self, snippet: Snippet) -> CatalogResult<TaggedSnippet> {
        let tags = self.links.tags_for_snippet(snippet.id)?;
        Ok(TaggedSnippet { snippet, tags })
    }
}
