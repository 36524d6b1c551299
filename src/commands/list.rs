//! List site content

use anyhow::Result;

use crate::Postmill;

/// List posts (one page, newest first) or tag counts
pub async fn run(site: &Postmill, content_type: &str, page: usize) -> Result<()> {
    let repo = site.repository();

    match content_type {
        "post" | "posts" => {
            let listing = repo.list_page(page, site.config.per_page).await?;
            println!(
                "Posts ({}), page {}/{}:",
                listing.total_posts, listing.page, listing.total_pages
            );
            for post in &listing.posts {
                println!(
                    "  {} - {} [{}] ({})",
                    post.display_date("%Y-%m-%d"),
                    post.title(),
                    post.slug,
                    post.reading_time
                );
            }
        }
        "tag" | "tags" => {
            let tags = repo.tags().await?;
            println!("Tags ({}):", tags.len());
            for (tag, count) in tags {
                println!("  {} ({})", tag, count);
            }
        }
        _ => {
            anyhow::bail!("Unknown type: {}. Available: post, tag", content_type);
        }
    }

    Ok(())
}
