//! Post model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{ContentError, FrontMatter};

/// Words read per minute when estimating reading time
pub const WORDS_PER_MINUTE: usize = 200;

/// Settings applied while building posts from documents
#[derive(Debug, Clone)]
pub struct PostDefaults {
    /// Author used when a document names none
    pub author: String,
    /// Reading speed for `reading_time`
    pub words_per_minute: usize,
}

impl Default for PostDefaults {
    fn default() -> Self {
        Self {
            author: "Anonymous".to_string(),
            words_per_minute: WORDS_PER_MINUTE,
        }
    }
}

/// A blog post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// Slug (URL-friendly name)
    pub slug: String,

    /// Post title
    pub title: String,

    /// Publication date
    pub date: NaiveDate,

    pub author: String,

    /// The single category of the post
    pub category: String,

    /// Post tags, in document order
    pub tags: Vec<String>,

    pub excerpt: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,

    /// Markdown body without the front-matter
    pub content: String,

    /// Estimated reading time in minutes
    pub reading_time: u32,
}

impl Post {
    /// Build a post from a raw document
    ///
    /// `location` is the source identifier, used as the slug when the
    /// front-matter has none.
    pub fn from_document(
        location: &str,
        raw: &str,
        defaults: &PostDefaults,
    ) -> Result<Self, ContentError> {
        let (fm, body) = FrontMatter::parse(raw);

        let title = fm.require("title")?.to_string();
        let date = fm.require_date("date")?;
        let category = fm.require("category")?.to_string();

        let slug = fm
            .get_str("slug")
            .map(str::to_string)
            .unwrap_or_else(|| slug_from_location(location));
        let author = fm
            .get_str("author")
            .map(str::to_string)
            .unwrap_or_else(|| defaults.author.clone());
        let content = body.trim().to_string();
        let reading_time = reading_time(&content, defaults.words_per_minute);

        Ok(Self {
            slug,
            title,
            date,
            author,
            category,
            tags: fm.get_list("tags"),
            excerpt: fm.get_str("excerpt").unwrap_or_default().to_string(),
            cover_image: fm.get_str("coverImage").map(str::to_string),
            content,
            reading_time,
        })
    }

    /// Whether the post carries a tag, ignoring case
    pub fn has_tag(&self, tag: &str) -> bool {
        let tag = tag.to_lowercase();
        self.tags.iter().any(|t| t.to_lowercase() == tag)
    }
}

/// Estimated reading time in whole minutes, at least one
pub fn reading_time(content: &str, words_per_minute: usize) -> u32 {
    let words = content.split_whitespace().count();
    let minutes = words.div_ceil(words_per_minute.max(1)).max(1);
    u32::try_from(minutes).unwrap_or(u32::MAX)
}

/// Default slug: the file stem of the location
fn slug_from_location(location: &str) -> String {
    let name = location
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(location);
    name.strip_suffix(".markdown")
        .or_else(|| name.strip_suffix(".md"))
        .unwrap_or(name)
        .to_string()
}
