//! List site content

use anyhow::Result;

use crate::helpers::date_xml;
use crate::index::FacetCount;
use crate::Folio;

/// List site content by type
pub async fn run(folio: &Folio, content_type: &str) -> Result<()> {
    let index = folio.index().await?;
    println!("{}", folio.config.title);

    match content_type {
        "post" | "posts" => {
            println!("Posts ({}):", index.len());
            for post in index.posts() {
                println!(
                    "  {} - {} [{}] ({} min)",
                    date_xml(&post.date),
                    post.title,
                    post.slug,
                    post.reading_time
                );
            }
        }
        "tag" | "tags" => print_facets("Tags", &index.tag_counts()),
        "category" | "categories" => print_facets("Categories", &index.category_counts()),
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: post, tag, category",
                content_type
            );
        }
    }

    Ok(())
}

fn print_facets(label: &str, facets: &[FacetCount]) {
    println!("{} ({}):", label, facets.len());
    for facet in facets {
        println!("  {} ({})", facet.name, facet.count);
    }
}
