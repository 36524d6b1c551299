//! Show a single post

use anyhow::Result;

use crate::Postmill;

/// Print one post, as a summary or as JSON
pub async fn run(site: &Postmill, slug: &str, json: bool) -> Result<()> {
    let post = site.repository().get_by_slug(slug).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(post.as_ref())?);
        return Ok(());
    }

    println!("{}", post.title());
    println!(
        "{} · {}",
        post.display_date(&site.config.date_format),
        post.reading_time
    );
    if !post.tags().is_empty() {
        println!("Tags: {}", post.tags().join(", "));
    }
    if let Some(description) = post.front_matter.description.as_deref() {
        println!("\n{}", description);
    }
    println!("\n{}", post.excerpt);

    Ok(())
}
