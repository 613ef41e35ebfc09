//! Show a single post with its table of contents and related posts

use anyhow::{anyhow, Result};

use crate::content::{extract_toc, MarkdownRenderer};
use crate::helpers::{format_date, relative_date};
use crate::Folio;

/// Print a post; with `html` the rendered body is printed instead
pub async fn run(folio: &Folio, slug: &str, html: bool) -> Result<()> {
    let index = folio.index().await?;
    let post = index
        .by_slug(slug)
        .ok_or_else(|| anyhow!("No post with slug: {}", slug))?;

    if html {
        println!("{}", MarkdownRenderer::new().render(&post.content));
        return Ok(());
    }

    println!("{}", post.title);
    let today = chrono::Local::now().date_naive();
    println!(
        "{} ({}) by {} - {} min read",
        format_date(&post.date, &folio.config.date_format),
        relative_date(&post.date, &today),
        post.author,
        post.reading_time
    );
    println!("Category: {}", post.category);
    if !post.tags.is_empty() {
        println!("Tags: {}", post.tags.join(", "));
    }
    if !post.excerpt.is_empty() {
        println!("\n{}", post.excerpt);
    }

    let toc = extract_toc(&post.content);
    if !toc.is_empty() {
        println!("\nContents:");
        for entry in toc {
            let indent = "  ".repeat(usize::from(entry.level));
            println!("{}{} (#{})", indent, entry.title, entry.id);
        }
    }

    let related = index.related(post, folio.config.related_limit);
    if !related.is_empty() {
        println!("\nRelated:");
        for other in related {
            println!("  {} [{}]", other.title, other.slug);
        }
    }

    Ok(())
}
