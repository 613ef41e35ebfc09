//! Table of contents extraction from markdown headings

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

lazy_static! {
    static ref HEADING: Regex = Regex::new(r"(?m)^(#{1,6})[ \t]+(.+?)\r?$").unwrap();
    static ref DISALLOWED: Regex = Regex::new(r"[^a-z0-9\s-]").unwrap();
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
    static ref HYPHENS: Regex = Regex::new(r"-+").unwrap();
}

/// One heading in a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TocEntry {
    /// Anchor id, see [`heading_id`]
    pub id: String,
    pub title: String,
    /// Number of leading `#` characters (1-6)
    pub level: u8,
}

/// Extract headings in document order
///
/// Ids are not deduplicated: two identical headings get the same id.
pub fn extract_toc(markdown: &str) -> Vec<TocEntry> {
    HEADING
        .captures_iter(markdown)
        .filter_map(|caps| {
            let title = caps[2].trim();
            if title.is_empty() {
                return None;
            }
            Some(TocEntry {
                id: heading_id(title),
                title: title.to_string(),
                level: caps[1].len() as u8,
            })
        })
        .collect()
}

/// Anchor id for a heading title
///
/// Lowercases, drops everything outside `[a-z0-9\s-]`, turns whitespace runs
/// into a hyphen and collapses repeated hyphens.
pub fn heading_id(title: &str) -> String {
    let lower = title.to_lowercase();
    let kept = DISALLOWED.replace_all(&lower, "");
    let hyphenated = WHITESPACE.replace_all(kept.trim(), "-");
    let collapsed = HYPHENS.replace_all(&hyphenated, "-");
    collapsed.trim_matches('-').to_string()
}

/// Anchor id for a single ATX heading line, as [`extract_toc`] computes it
///
/// The id comes from the raw line, so inline markup such as links counts
/// towards it.
pub fn heading_line_id(line: &str) -> Option<String> {
    let caps = HEADING.captures(line)?;
    let title = caps[2].trim();
    if title.is_empty() {
        None
    } else {
        Some(heading_id(title))
    }
}

/// Append `{#id}` attributes to every heading line
pub fn add_heading_ids(markdown: &str) -> String {
    HEADING
        .replace_all(markdown, |caps: &regex::Captures| {
            let title = caps[2].trim();
            if title.is_empty() {
                return caps[0].to_string();
            }
            format!("{} {} {{#{}}}", &caps[1], title, heading_id(title))
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_toc() {
        let toc = extract_toc("## Hello, World!\n\ntext\n\n### Sub Heading");
        assert_eq!(
            toc,
            vec![
                TocEntry {
                    id: "hello-world".to_string(),
                    title: "Hello, World!".to_string(),
                    level: 2,
                },
                TocEntry {
                    id: "sub-heading".to_string(),
                    title: "Sub Heading".to_string(),
                    level: 3,
                },
            ]
        );
    }

    #[test]
    fn test_levels_and_non_headings() {
        let md = "# One\n###### Six\n####### Seven\n#NoSpace\n  # Indented\ntext # not\n";
        let toc = extract_toc(md);
        let levels: Vec<_> = toc.iter().map(|e| (e.level, e.title.as_str())).collect();
        assert_eq!(levels, vec![(1, "One"), (6, "Six")]);
    }

    #[test]
    fn test_duplicate_ids_kept() {
        let toc = extract_toc("## Setup\n\n## Setup\n");
        assert_eq!(toc.len(), 2);
        assert_eq!(toc[0].id, toc[1].id);
    }

    #[test]
    fn test_heading_id() {
        assert_eq!(heading_id("1. Components"), "1-components");
        assert_eq!(heading_id("  Async / Await  "), "async-await");
        assert_eq!(heading_id("a -- b"), "a-b");
        assert_eq!(heading_id("-Edge-"), "edge");
        assert_eq!(heading_id("Café déjà vu"), "caf-dj-vu");
        assert_eq!(heading_id("!!!"), "");
    }

    #[test]
    fn test_crlf_headings() {
        let toc = extract_toc("## First\r\nbody\r\n## Second\r\n");
        assert_eq!(toc[0].title, "First");
        assert_eq!(toc[1].id, "second");
    }

    #[test]
    fn test_add_heading_ids() {
        let out = add_heading_ids("# Hello World\n\nSome text\n## Next Step");
        assert_eq!(
            out,
            "# Hello World {#hello-world}\n\nSome text\n## Next Step {#next-step}"
        );
    }
}
