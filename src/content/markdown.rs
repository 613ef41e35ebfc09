//! Markdown rendering with heading anchors and syntax highlighting

use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use syntect::highlighting::ThemeSet;
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

use super::toc::{heading_id, heading_line_id};

/// Markdown renderer for post bodies
///
/// Headings get an `id` matching the table of contents entries, fenced code
/// blocks are highlighted.
pub struct MarkdownRenderer {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    theme_name: String,
}

impl MarkdownRenderer {
    /// Create a new markdown renderer
    pub fn new() -> Self {
        Self::with_theme("base16-ocean.dark")
    }

    /// Create with a specific highlighting theme
    pub fn with_theme(theme: &str) -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            theme_name: theme.to_string(),
        }
    }

    /// Render markdown to HTML
    pub fn render(&self, markdown: &str) -> String {
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_HEADING_ATTRIBUTES
            | Options::ENABLE_GFM;
        let parser = Parser::new_ext(markdown, options).into_offset_iter();

        let mut events: Vec<Event> = Vec::new();
        // (index of the heading start event, source offset, heading text so far)
        let mut heading: Option<(usize, usize, String)> = None;
        let mut code_block: Option<(Option<String>, String)> = None;

        for (event, range) in parser {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    let lang = match kind {
                        CodeBlockKind::Fenced(lang) if !lang.is_empty() => Some(lang.to_string()),
                        _ => None,
                    };
                    code_block = Some((lang, String::new()));
                }
                Event::End(TagEnd::CodeBlock) => {
                    if let Some((lang, code)) = code_block.take() {
                        let highlighted = self.highlight_code(&code, lang.as_deref());
                        events.push(Event::Html(CowStr::from(highlighted)));
                    }
                }
                Event::Text(text) if code_block.is_some() => {
                    if let Some((_, code)) = code_block.as_mut() {
                        code.push_str(&text);
                    }
                }
                Event::Start(Tag::Heading { .. }) => {
                    heading = Some((events.len(), range.start, String::new()));
                    events.push(event);
                }
                Event::End(TagEnd::Heading(_)) => {
                    if let Some((start, offset, text)) = heading.take() {
                        if let Event::Start(Tag::Heading { id, .. }) = &mut events[start] {
                            if id.is_none() {
                                // same id as the TOC entry for ATX lines
                                let anchor = markdown[offset..]
                                    .lines()
                                    .next()
                                    .and_then(heading_line_id)
                                    .unwrap_or_else(|| heading_id(&text));
                                *id = Some(CowStr::from(anchor));
                            }
                        }
                    }
                    events.push(event);
                }
                Event::Text(ref text) | Event::Code(ref text) => {
                    if let Some((_, _, heading_text)) = heading.as_mut() {
                        heading_text.push_str(text);
                    }
                    events.push(event);
                }
                _ => events.push(event),
            }
        }

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());
        html_output
    }

    /// Highlight a code block
    fn highlight_code(&self, code: &str, lang: Option<&str>) -> String {
        let lang = lang.unwrap_or("text");
        let class = html_escape(lang);

        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let highlighted = self
            .theme_set
            .themes
            .get(&self.theme_name)
            .and_then(|theme| {
                highlighted_html_for_string(code, &self.syntax_set, syntax, theme).ok()
            });

        match highlighted {
            Some(html) => format!(r#"<figure class="highlight {}">{}</figure>"#, class, html),
            None => format!(
                r#"<pre><code class="language-{}">{}</code></pre>"#,
                class,
                html_escape(code)
            ),
        }
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Simple HTML escaping
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::extract_toc;

    #[test]
    fn test_render_basic_markdown() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("# Hello World\n\nThis is a test.");
        assert!(html.contains(r#"<h1 id="hello-world">Hello World</h1>"#));
        assert!(html.contains("<p>This is a test.</p>"));
    }

    #[test]
    fn test_heading_ids_match_toc() {
        let markdown = "## Hello, World!\n\ntext\n\n### Sub Heading\n";
        let html = MarkdownRenderer::new().render(markdown);
        for entry in extract_toc(markdown) {
            assert!(html.contains(&format!(r#"id="{}""#, entry.id)), "{}", entry.id);
        }
    }

    #[test]
    fn test_heading_with_link_matches_toc() {
        let markdown = "## [Rust](https://rust-lang.org) tips\n\nSetext Title\n------------\n";
        let html = MarkdownRenderer::new().render(markdown);
        let toc = extract_toc(markdown);
        assert_eq!(toc[0].id, "rusthttpsrust-langorg-tips");
        assert!(html.contains(r#"<h2 id="rusthttpsrust-langorg-tips">"#));
        // setext headings are not in the TOC; they fall back to the visible text
        assert!(html.contains(r#"<h2 id="setext-title">"#));
    }

    #[test]
    fn test_fence_language_is_escaped() {
        let html = MarkdownRenderer::new().render("```x\"onclick=\"alert(1)\n1\n```");
        assert!(!html.contains(r#""onclick=""#));
        assert!(html.contains("x&quot;onclick=&quot;alert(1)"));

        let plain = MarkdownRenderer::with_theme("no-such-theme").render("```a<b>\n1\n```");
        assert!(plain.contains(r#"class="language-a&lt;b&gt;""#));
    }

    #[test]
    fn test_explicit_heading_id_kept() {
        let html = MarkdownRenderer::new().render("## Setup {#install}\n");
        assert!(html.contains(r#"id="install""#));
    }

    #[test]
    fn test_render_code_block() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("```rust\nfn main() {}\n```");
        assert!(html.contains("highlight rust"));
        assert!(!html.contains("<p>fn main"));
    }

    #[test]
    fn test_unknown_theme_falls_back_to_plain() {
        let renderer = MarkdownRenderer::with_theme("no-such-theme");
        let html = renderer.render("```\n<b>x</b>\n```");
        assert!(html.contains(r#"<code class="language-text">&lt;b&gt;x&lt;/b&gt;"#));
    }
}
