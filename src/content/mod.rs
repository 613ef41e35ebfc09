//! Content module - handles post documents, loading, and markdown processing

mod error;
mod frontmatter;
pub mod loader;
mod markdown;
mod post;
pub mod source;
mod toc;

pub use error::{ContentError, FetchError, LoadError};
pub use frontmatter::{parse_date_string, FrontMatter, FrontMatterValue, Header};
pub use loader::{ContentLoader, LoadState};
pub use markdown::MarkdownRenderer;
pub use post::{reading_time, Post, PostDefaults, WORDS_PER_MINUTE};
pub use source::{DocumentSource, FsSource, HttpSource};
pub use toc::{add_heading_ids, extract_toc, heading_id, heading_line_id, TocEntry};
