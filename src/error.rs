use std::fmt;

use crate::domain::{TagId, TagName, ValidationError};
use crate::store::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Snippet,
    Tag,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entity::Snippet => f.write_str("snippet"),
            Entity::Tag => f.write_str("tag"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("invalid tag name: {0}")]
    Validation(#[from] ValidationError),
    #[error("{entity} #{id} not found")]
    NotFound { entity: Entity, id: i64 },
    #[error("tag name '{name}' is already used by tag #{existing}")]
    Conflict { name: TagName, existing: TagId },
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CatalogError {
    pub fn snippet_not_found(id: impl Into<i64>) -> Self {
        CatalogError::NotFound {
            entity: Entity::Snippet,
            id: id.into(),
        }
    }

    pub fn tag_not_found(id: impl Into<i64>) -> Self {
        CatalogError::NotFound {
            entity: Entity::Tag,
            id: id.into(),
        }
    }
}

pub type CatalogResult<T> = Result<T, CatalogError>;
