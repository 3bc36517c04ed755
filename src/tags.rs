use tracing::{debug, info, warn};

use crate::domain::{normalize, Tag, TagId};
use crate::error::{CatalogError, CatalogResult};
use crate::store::{AssociationStore, StoreError, TagStore};

/// Resolves free-text names to tag identities.
pub struct TagRegistry<'a, T, A> {
    tags: &'a T,
    links: &'a A,
}

impl<'a, T, A> TagRegistry<'a, T, A>
where
    T: TagStore,
    A: AssociationStore,
{
    pub fn new(tags: &'a T, links: &'a A) -> Self {
        Self { tags, links }
    }

    /// Returns the tag whose canonical name matches `raw_name`, creating it
    /// when none exists.
    pub fn create_or_get(&self, raw_name: &str) -> CatalogResult<Tag> {
        let name = normalize(raw_name)?;
        if let Some(existing) = self.tags.find_by_normalized_name(&name)? {
            debug!(tag_id = %existing.id, name = %existing.name, "tag already exists");
            return Ok(existing);
        }

        match self.tags.insert(&name) {
            Ok(created) => {
                info!(tag_id = %created.id, name = %created.name, "created tag");
                Ok(created)
            }
            Err(StoreError::DuplicateTagName(_)) => {
                warn!(name = %name, "tag was created concurrently; re-reading");
                self.tags
                    .find_by_normalized_name(&name)?
                    .ok_or_else(|| StoreError::DuplicateTagName(name).into())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Looks a tag up by name without creating it.
    pub fn find(&self, raw_name: &str) -> CatalogResult<Option<Tag>> {
        let name = normalize(raw_name)?;
        Ok(self.tags.find_by_normalized_name(&name)?)
    }

    pub fn get(&self, id: TagId) -> CatalogResult<Tag> {
        self.tags
            .find_by_id(id)?
            .ok_or_else(|| CatalogError::tag_not_found(id))
    }

    pub fn list(&self) -> CatalogResult<Vec<Tag>> {
        Ok(self.tags.find_all()?)
    }

    pub fn rename(&self, id: TagId, new_raw_name: &str) -> CatalogResult<Tag> {
        let name = normalize(new_raw_name)?;
        let mut tag = self
            .tags
            .find_by_id(id)?
            .ok_or_else(|| CatalogError::tag_not_found(id))?;

        if let Some(holder) = self.tags.find_by_normalized_name(&name)? {
            if holder.id != id {
                return Err(CatalogError::Conflict {
                    name,
                    existing: holder.id,
                });
            }
        }

        let previous = std::mem::replace(&mut tag.name, name);
        match self.tags.save(&tag) {
            Ok(()) => {}
            Err(StoreError::DuplicateTagName(name)) => {
                return Err(match self.tags.find_by_normalized_name(&name)? {
                    Some(holder) => CatalogError::Conflict {
                        name,
                        existing: holder.id,
                    },
                    None => StoreError::DuplicateTagName(name).into(),
                });
            }
            Err(err) => return Err(err.into()),
        }
        info!(tag_id = %id, from = %previous, to = %tag.name, "renamed tag");
        Ok(tag)
    }

    /// Deletes the tag and every association that references it.
    pub fn remove(&self, id: TagId) -> CatalogResult<bool> {
        if !self.tags.exists_by_id(id)? {
            debug!(tag_id = %id, "tag to remove does not exist");
            return Ok(false);
        }
        let unlinked = self.links.unlink_tag(id)?;
        self.tags.delete_by_id(id)?;
        info!(tag_id = %id, unlinked, "removed tag");
        Ok(true)
    }
}
