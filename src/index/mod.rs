//! Post index - read-only queries over a loaded set of posts
//!
//! The index is immutable once built. Every query preserves the index order
//! (newest first, ties in discovery order).

use std::collections::BTreeMap;

use serde::Serialize;

use crate::content::Post;

/// Default number of related posts
pub const RELATED_LIMIT: usize = 3;

/// A snapshot of posts sorted by date, newest first
#[derive(Debug, Clone, Default)]
pub struct PostIndex {
    posts: Vec<Post>,
}

/// A facet value with the number of posts carrying it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacetCount {
    pub name: String,
    pub count: usize,
}

/// Combined listing filter: all set criteria must match
#[derive(Debug, Clone, Default)]
pub struct PostFilter {
    /// Full-text query, see [`PostIndex::search`]
    pub query: Option<String>,
    /// Exact category name
    pub category: Option<String>,
    /// A post matches if it carries any of these tags
    pub tags: Vec<String>,
}

impl PostIndex {
    /// Build an index, sorting by date descending
    ///
    /// The sort is stable, so posts with the same date keep the order they
    /// were given in.
    pub fn new(mut posts: Vec<Post>) -> Self {
        posts.sort_by(|a, b| b.date.cmp(&a.date));
        Self { posts }
    }

    /// All posts, newest first
    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    /// Find a post by its exact slug
    pub fn by_slug(&self, slug: &str) -> Option<&Post> {
        self.posts.iter().find(|p| p.slug == slug)
    }

    /// Posts in a category, ignoring case
    pub fn by_category(&self, category: &str) -> Vec<&Post> {
        let category = category.to_lowercase();
        self.posts
            .iter()
            .filter(|p| p.category.to_lowercase() == category)
            .collect()
    }

    /// Posts carrying a tag, ignoring case
    pub fn by_tag(&self, tag: &str) -> Vec<&Post> {
        self.posts.iter().filter(|p| p.has_tag(tag)).collect()
    }

    /// Case-insensitive substring search over title, excerpt, content and tags
    ///
    /// A blank query matches every post.
    pub fn search(&self, query: &str) -> Vec<&Post> {
        let query = query.trim().to_lowercase();
        self.posts
            .iter()
            .filter(|p| matches_query(p, &query))
            .collect()
    }

    /// Posts sharing the category or at least one tag with `post`
    ///
    /// `post` itself is excluded. Results keep index order, so the most
    /// recent candidates win; there is no further relevance ranking.
    pub fn related(&self, post: &Post, limit: usize) -> Vec<&Post> {
        self.posts
            .iter()
            .filter(|p| p.slug != post.slug)
            .filter(|p| p.category == post.category || p.tags.iter().any(|t| post.tags.contains(t)))
            .take(limit)
            .collect()
    }

    /// Apply a combined listing filter
    pub fn filter(&self, filter: &PostFilter) -> Vec<&Post> {
        let query = filter
            .query
            .as_deref()
            .map(|q| q.trim().to_lowercase())
            .unwrap_or_default();

        self.posts
            .iter()
            .filter(|p| matches_query(p, &query))
            .filter(|p| {
                filter
                    .category
                    .as_ref()
                    .map_or(true, |c| &p.category == c)
            })
            .filter(|p| filter.tags.is_empty() || filter.tags.iter().any(|t| p.tags.contains(t)))
            .collect()
    }

    /// Distinct categories, alphabetically sorted
    pub fn categories(&self) -> Vec<String> {
        self.category_counts().into_iter().map(|f| f.name).collect()
    }

    /// Distinct tags, alphabetically sorted
    pub fn tags(&self) -> Vec<String> {
        self.tag_counts().into_iter().map(|f| f.name).collect()
    }

    /// Categories with their post counts, alphabetically sorted
    pub fn category_counts(&self) -> Vec<FacetCount> {
        count_facets(self.posts.iter().map(|p| p.category.as_str()))
    }

    /// Tags with the number of posts carrying them, alphabetically sorted
    pub fn tag_counts(&self) -> Vec<FacetCount> {
        count_facets(self.posts.iter().flat_map(|p| {
            let mut tags: Vec<&str> = p.tags.iter().map(String::as_str).collect();
            tags.sort_unstable();
            tags.dedup();
            tags
        }))
    }
}

/// `query` must already be trimmed and lowercased
fn matches_query(post: &Post, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    post.title.to_lowercase().contains(query)
        || post.excerpt.to_lowercase().contains(query)
        || post.content.to_lowercase().contains(query)
        || post.tags.iter().any(|t| t.to_lowercase().contains(query))
}

fn count_facets<'a>(values: impl Iterator<Item = &'a str>) -> Vec<FacetCount> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for value in values {
        *counts.entry(value).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .map(|(name, count)| FacetCount {
            name: name.to_string(),
            count,
        })
        .collect()
}
