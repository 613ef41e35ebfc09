//! Search and filter posts

use anyhow::Result;

use crate::helpers::format_date;
use crate::index::PostFilter;
use crate::Folio;

/// Print the posts matching a query, category and tags
pub async fn run(folio: &Folio, filter: &PostFilter) -> Result<()> {
    let index = folio.index().await?;
    let posts = index.filter(filter);

    let noun = if posts.len() == 1 { "post" } else { "posts" };
    println!("{} {} found", posts.len(), noun);
    for post in posts {
        println!(
            "  {} - {} [{}]",
            format_date(&post.date, &folio.config.date_format),
            post.title,
            post.slug
        );
        if !post.excerpt.is_empty() {
            println!("      {}", post.excerpt);
        }
    }

    Ok(())
}
