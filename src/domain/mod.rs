pub mod snippet;
pub mod tag_name;

pub use snippet::{NewSnippet, Snippet, SnippetId, Tag, TagId, TaggedSnippet};
pub use tag_name::{normalize, TagName, ValidationError};
