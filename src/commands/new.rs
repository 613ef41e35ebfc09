//! Create a new post

use anyhow::Result;
use std::fs;
use std::path::PathBuf;

use crate::Folio;

/// Write a new post skeleton into the posts directory
pub fn create_post(folio: &Folio, title: &str, category: &str, tags: &[String]) -> Result<PathBuf> {
    if folio.config.remote_base.is_some() {
        anyhow::bail!("Posts are fetched from a remote base; create them there");
    }
    if title.trim().is_empty() || category.trim().is_empty() {
        anyhow::bail!("A post needs both a title and a category");
    }

    let slug = slug::slugify(title);
    if slug.is_empty() {
        anyhow::bail!("Cannot derive a file name from title: {:?}", title);
    }

    let target_dir = folio.source_dir.join(&folio.config.posts_dir);
    fs::create_dir_all(&target_dir)?;

    let file_path = target_dir.join(format!("{}.md", slug));
    if file_path.exists() {
        anyhow::bail!("File already exists: {:?}", file_path);
    }

    let now = chrono::Local::now();
    let tags = tags
        .iter()
        .map(|t| format!("\"{}\"", t))
        .collect::<Vec<_>>()
        .join(", ");
    let content = format!(
        "---\ntitle: \"{}\"\ndate: {}\nauthor: {}\ncategory: \"{}\"\ntags: [{}]\nexcerpt: \"\"\n---\n\n# {}\n",
        title,
        now.format("%Y-%m-%d"),
        folio.config.author,
        category,
        tags,
        title
    );

    fs::write(&file_path, content)?;
    tracing::info!("Created: {:?}", file_path);

    Ok(file_path)
}
