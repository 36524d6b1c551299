//! postmill: a markdown blog content pipeline
//!
//! Raw documents (a `---` delimited front-matter block plus a markdown body)
//! are turned into [`content::Post`] records with a slug, plain-text excerpt,
//! reading time and sanitized, syntax-highlighted HTML. A
//! [`repository::PostRepository`] loads them once and serves sorted listings
//! and slug lookups from memory.

pub mod commands;
pub mod config;
pub mod content;
pub mod repository;

use anyhow::Result;
use std::path::{Path, PathBuf};

use content::PostAssembler;
use repository::{FsStore, PostRepository};

/// The main application: site configuration and content location
#[derive(Clone)]
pub struct Postmill {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Directory holding post documents
    pub posts_dir: PathBuf,
}

impl Postmill {
    /// Create a new instance from a directory, reading `_config.yml` if present
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };

        let posts_dir = base_dir.join(&config.posts_dir);

        Ok(Self {
            config,
            base_dir,
            posts_dir,
        })
    }

    /// Repository over the posts directory
    pub fn repository(&self) -> PostRepository<FsStore> {
        let store = FsStore::new(&self.posts_dir, self.config.post_pattern.as_str());
        PostRepository::from_config(store, &self.config)
    }

    /// Assembler using the site's rendering settings
    pub fn assembler(&self) -> PostAssembler {
        PostAssembler::from_config(&self.config)
    }
}
