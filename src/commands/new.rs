//! Create a new post

use anyhow::Result;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

use crate::content::Draft;
use crate::Postmill;

/// Options for a new post
#[derive(Debug, Default)]
pub struct NewPost<'a> {
    pub title: &'a str,
    pub tags: Option<&'a str>,
    pub description: Option<&'a str>,
    pub date: Option<NaiveDate>,
}

/// Write a new document into the posts directory, returning its path
pub fn create_post(site: &Postmill, options: &NewPost) -> Result<PathBuf> {
    let date = options
        .date
        .unwrap_or_else(|| chrono::Local::now().date_naive());

    let mut draft = Draft::new(options.title, date).with_tag_list(options.tags.unwrap_or(""));
    if draft.slug.is_empty() {
        anyhow::bail!("Title {:?} does not produce a usable slug", options.title);
    }
    if let Some(description) = options.description {
        draft.description = description.to_string();
    }

    fs::create_dir_all(&site.posts_dir)?;
    let file_path = site.posts_dir.join(draft.file_name());

    // Check if file already exists
    if file_path.exists() {
        anyhow::bail!("File already exists: {:?}", file_path);
    }

    fs::write(&file_path, draft.to_document())?;
    tracing::debug!("Wrote {:?}", file_path);

    Ok(file_path)
}

/// Run the new command
pub fn run(site: &Postmill, options: &NewPost) -> Result<()> {
    let path = create_post(site, options)?;
    println!("Created: {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_created_post_is_loadable() {
        let dir = tempfile::tempdir().unwrap();
        let site = Postmill::new(dir.path()).unwrap();
        let options = NewPost {
            title: "Writing in Rust",
            tags: Some("rust, writing"),
            description: Some("Notes"),
            date: NaiveDate::from_ymd_opt(2024, 2, 29),
        };

        let path = create_post(&site, &options).unwrap();
        assert_eq!(path, site.posts_dir.join("writing-in-rust.md"));

        let post = site.repository().get_by_slug("writing-in-rust").await.unwrap();
        assert_eq!(post.title(), "Writing in Rust");
        assert_eq!(post.front_matter.date.as_deref(), Some("2024-02-29"));
        assert_eq!(post.tags(), ["rust", "writing"]);
        assert_eq!(post.front_matter.description.as_deref(), Some("Notes"));
    }

    #[test]
    fn test_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let site = Postmill::new(dir.path()).unwrap();
        let options = NewPost {
            title: "Twice",
            ..Default::default()
        };

        assert!(create_post(&site, &options).is_ok());
        assert!(create_post(&site, &options).is_err());
    }

    #[test]
    fn test_rejects_symbol_only_title() {
        let dir = tempfile::tempdir().unwrap();
        let site = Postmill::new(dir.path()).unwrap();
        let options = NewPost {
            title: "???",
            ..Default::default()
        };
        assert!(create_post(&site, &options).is_err());
    }
}
