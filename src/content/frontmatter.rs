//! Front-matter parsing
//!
//! Posts start with a `---` delimited header of flat `key: value` lines.
//! Values are either a scalar string or a bracketed list of strings.

use chrono::{NaiveDate, NaiveDateTime};
use indexmap::IndexMap;
use serde::Serialize;

use super::ContentError;

/// Header delimiter line
const DELIMITER: &str = "---";

/// A single front-matter value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FrontMatterValue {
    Scalar(String),
    List(Vec<String>),
}

impl FrontMatterValue {
    /// Parse a raw (already trimmed) value
    fn parse(raw: &str) -> Self {
        match raw.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
            Some(inner) => FrontMatterValue::List(
                inner
                    .split(',')
                    .map(|item| strip_quotes(item.trim()).trim())
                    .filter(|item| !item.is_empty())
                    .map(str::to_string)
                    .collect(),
            ),
            None => FrontMatterValue::Scalar(strip_quotes(raw).to_string()),
        }
    }
}

/// How the header delimiters were found in a document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Header {
    /// Opening and closing `---` lines present
    Present,
    /// Text does not start with a `---` line
    Absent,
    /// Opening `---` line without a closing one
    Unterminated,
}

/// Parsed front-matter of a document
#[derive(Debug, Clone)]
pub struct FrontMatter {
    fields: IndexMap<String, FrontMatterValue>,
    header: Header,
}

impl Default for FrontMatter {
    fn default() -> Self {
        Self {
            fields: IndexMap::new(),
            header: Header::Absent,
        }
    }
}

impl FrontMatter {
    /// Parse front-matter from content string
    /// Returns (front_matter, remaining_content)
    ///
    /// When the header is missing or never closed, the front-matter is empty
    /// and the whole text is returned as the body.
    pub fn parse(content: &str) -> (Self, &str) {
        let mut lines = content.split_inclusive('\n');

        let meta_start = match lines.next() {
            Some(first) if is_delimiter(first) => first.len(),
            _ => return (FrontMatter::default(), content),
        };
        let mut offset = meta_start;

        for line in lines {
            if is_delimiter(line) {
                let fields = parse_fields(&content[meta_start..offset]);
                let body = &content[offset + line.len()..];
                let fm = FrontMatter {
                    fields,
                    header: Header::Present,
                };
                return (fm, body);
            }
            offset += line.len();
        }

        let fm = FrontMatter {
            fields: IndexMap::new(),
            header: Header::Unterminated,
        };
        (fm, content)
    }

    /// How the header was delimited
    pub fn header(&self) -> Header {
        self.header
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Raw value for a key
    pub fn get(&self, key: &str) -> Option<&FrontMatterValue> {
        self.fields.get(key)
    }

    /// Non-empty scalar value for a key
    pub fn get_str(&self, key: &str) -> Option<&str> {
        match self.fields.get(key) {
            Some(FrontMatterValue::Scalar(s)) if !s.is_empty() => Some(s.as_str()),
            _ => None,
        }
    }

    /// List value for a key; a non-empty scalar becomes a single-item list
    pub fn get_list(&self, key: &str) -> Vec<String> {
        match self.fields.get(key) {
            Some(FrontMatterValue::List(items)) => items.clone(),
            Some(FrontMatterValue::Scalar(s)) if !s.is_empty() => vec![s.clone()],
            _ => Vec::new(),
        }
    }

    /// Required scalar field
    pub fn require(&self, key: &'static str) -> Result<&str, ContentError> {
        if self.header == Header::Unterminated {
            return Err(ContentError::MalformedHeader);
        }
        self.get_str(key).ok_or(ContentError::MissingField(key))
    }

    /// Required date field
    pub fn require_date(&self, key: &'static str) -> Result<NaiveDate, ContentError> {
        let raw = self.require(key)?;
        parse_date_string(raw).ok_or_else(|| ContentError::InvalidDate(raw.to_string()))
    }

    /// Iterate over fields in document order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FrontMatterValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

fn is_delimiter(line: &str) -> bool {
    line.trim_end() == DELIMITER
}

/// Parse the lines between the delimiters
fn parse_fields(block: &str) -> IndexMap<String, FrontMatterValue> {
    let mut fields = IndexMap::new();

    for line in block.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let Some((key, value)) = trimmed.split_once(':') else {
            tracing::debug!("Ignoring front-matter line without a key: {}", trimmed);
            continue;
        };

        let key = key.trim();
        if key.is_empty() {
            continue;
        }

        fields.insert(key.to_string(), FrontMatterValue::parse(value.trim()));
    }

    fields
}

/// Remove one layer of matching surrounding quotes
fn strip_quotes(s: &str) -> &str {
    for quote in ['"', '\''] {
        if s.len() >= 2 && s.starts_with(quote) && s.ends_with(quote) {
            return &s[1..s.len() - 1];
        }
    }
    s
}

/// Parse a date string in various formats, keeping the calendar date
pub fn parse_date_string(s: &str) -> Option<NaiveDate> {
    let s = s.trim();

    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }

    let formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
    ];

    for fmt in formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }

    // RFC 3339 keeps the date as written, not shifted to local time
    chrono::DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_frontmatter() {
        let content = r#"---
title: Hello World
date: 2024-01-15
category: "Rust"
tags: [rust, 'async', "tokio"]
---

This is the content.
"#;

        let (fm, body) = FrontMatter::parse(content);
        assert_eq!(fm.header(), Header::Present);
        assert_eq!(fm.get_str("title"), Some("Hello World"));
        assert_eq!(fm.get_str("category"), Some("Rust"));
        assert_eq!(fm.get_list("tags"), vec!["rust", "async", "tokio"]);
        assert_eq!(body.trim(), "This is the content.");
    }

    #[test]
    fn test_value_split_at_first_colon() {
        let content = "---\ntitle: Rust: the good parts\nlink: https://example.com\n---\nbody";
        let (fm, body) = FrontMatter::parse(content);
        assert_eq!(fm.get_str("title"), Some("Rust: the good parts"));
        assert_eq!(fm.get_str("link"), Some("https://example.com"));
        assert_eq!(body, "body");
    }

    #[test]
    fn test_comments_and_blank_lines_skipped() {
        let content = "---\n# draft notes\n\ntitle: Post\nnot a field\n---\n";
        let (fm, _) = FrontMatter::parse(content);
        assert_eq!(fm.iter().count(), 1);
        assert_eq!(fm.get_str("title"), Some("Post"));
    }

    #[test]
    fn test_list_discards_empty_items() {
        let content = "---\ntags: [ a , , 'b', \"\" ]\nempty: []\n---\n";
        let (fm, _) = FrontMatter::parse(content);
        assert_eq!(fm.get_list("tags"), vec!["a", "b"]);
        assert_eq!(fm.get("empty"), Some(&FrontMatterValue::List(Vec::new())));
    }

    #[test]
    fn test_list_keeps_duplicates() {
        let (fm, _) = FrontMatter::parse("---\ntags: [A, B, A]\n---\n");
        assert_eq!(fm.get_list("tags"), vec!["A", "B", "A"]);
    }

    #[test]
    fn test_single_string_tags() {
        let (fm, _) = FrontMatter::parse("---\ntags: Notes\n---\n");
        assert_eq!(fm.get_list("tags"), vec!["Notes"]);
    }

    #[test]
    fn test_quoted_brackets_stay_scalar() {
        let (fm, _) = FrontMatter::parse("---\ntitle: \"[WIP] notes\"\n---\n");
        assert_eq!(fm.get_str("title"), Some("[WIP] notes"));
    }

    #[test]
    fn test_only_one_quote_layer_removed() {
        let (fm, _) = FrontMatter::parse("---\ntitle: \"'quoted'\"\nodd: \"half\n---\n");
        assert_eq!(fm.get_str("title"), Some("'quoted'"));
        assert_eq!(fm.get_str("odd"), Some("\"half"));
    }

    #[test]
    fn test_no_frontmatter() {
        let content = "Just a body\n---\nwith a rule";
        let (fm, body) = FrontMatter::parse(content);
        assert_eq!(fm.header(), Header::Absent);
        assert!(fm.is_empty());
        assert_eq!(body, content);
    }

    #[test]
    fn test_unterminated_header() {
        let content = "---\ntitle: Never closed\ndate: 2024-01-01\n\nBody text";
        let (fm, body) = FrontMatter::parse(content);
        assert_eq!(fm.header(), Header::Unterminated);
        assert!(fm.is_empty());
        assert_eq!(body, content);
        assert!(matches!(
            fm.require("title"),
            Err(ContentError::MalformedHeader)
        ));
    }

    #[test]
    fn test_crlf_delimiters() {
        let content = "---\r\ntitle: Windows\r\n---\r\nBody";
        let (fm, body) = FrontMatter::parse(content);
        assert_eq!(fm.get_str("title"), Some("Windows"));
        assert_eq!(body, "Body");
    }

    #[test]
    fn test_require_missing_field() {
        let (fm, _) = FrontMatter::parse("---\ntitle: \"\"\n---\n");
        assert!(matches!(
            fm.require("title"),
            Err(ContentError::MissingField("title"))
        ));
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date_string("2024-01-15"),
            NaiveDate::from_ymd_opt(2024, 1, 15)
        );
        assert_eq!(
            parse_date_string("2024-01-15 10:30:00"),
            NaiveDate::from_ymd_opt(2024, 1, 15)
        );
        assert_eq!(
            parse_date_string("2024-01-15T23:30:00-05:00"),
            NaiveDate::from_ymd_opt(2024, 1, 15)
        );
        assert_eq!(parse_date_string("January 15"), None);
    }

    #[test]
    fn test_require_date_invalid() {
        let (fm, _) = FrontMatter::parse("---\ndate: someday\n---\n");
        assert!(matches!(
            fm.require_date("date"),
            Err(ContentError::InvalidDate(ref v)) if v == "someday"
        ));
    }
}
