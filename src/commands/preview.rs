//! Render a single document without the repository

use anyhow::Result;
use std::fs;
use std::path::Path;

use crate::repository::Document;
use crate::Postmill;

/// Render a document file to sanitized HTML
pub fn render_file(site: &Postmill, path: &Path) -> Result<String> {
    let text = fs::read_to_string(path)?;
    let document = Document::new(path.to_string_lossy(), text);
    let post = site.assembler().assemble(&document.file_slug(), &document.text);
    Ok(post.html)
}

/// Run the preview command
pub fn run(site: &Postmill, path: &Path) -> Result<()> {
    println!("{}", render_file(site, path)?);
    Ok(())
}
