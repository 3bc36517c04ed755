use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use time::OffsetDateTime;

use super::tag_name::TagName;

macro_rules! row_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            pub fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$name> for i64 {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(raw: &str) -> Result<Self, Self::Err> {
                raw.trim().trim_start_matches('#').parse::<i64>().map(Self)
            }
        }
    };
}

row_id!(SnippetId);
row_id!(TagId);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snippet {
    pub id: SnippetId,
    pub title: String,
    pub content: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl Snippet {
    /// Moves `updated_at` forward to `now`, never backwards.
    pub fn touch(&mut self, now: OffsetDateTime) {
        if now > self.updated_at {
            self.updated_at = now;
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewSnippet<'a> {
    pub title: &'a str,
    pub content: &'a str,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tag {
    pub id: TagId,
    pub name: TagName,
}

/// A snippet together with its current tag set, sorted by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedSnippet {
    pub snippet: Snippet,
    pub tags: Vec<Tag>,
}

#[cfg(test)]
impl TaggedSnippet {
    pub fn has_tag(&self, id: TagId) -> bool {
        self.tags.iter().any(|tag| tag.id == id)
    }
}
