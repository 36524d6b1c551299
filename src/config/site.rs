//! Site configuration (_config.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::content::excerpt::DEFAULT_EXCERPT_LENGTH;
use crate::content::reading_time::DEFAULT_WORDS_PER_MINUTE;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub author: String,
    pub url: String,

    // Content
    pub posts_dir: String,
    pub post_pattern: String,
    pub slug_collision: SlugCollisionPolicy,

    // Writing
    pub excerpt_length: usize,
    pub words_per_minute: usize,
    #[serde(default)]
    pub highlight: HighlightConfig,

    // Display
    pub date_format: String,
    pub per_page: usize,

    // Store any additional fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "My Blog".to_string(),
            description: String::new(),
            author: "John Doe".to_string(),
            url: "http://example.com".to_string(),

            posts_dir: "posts".to_string(),
            post_pattern: "*.md".to_string(),
            slug_collision: SlugCollisionPolicy::default(),

            excerpt_length: DEFAULT_EXCERPT_LENGTH,
            words_per_minute: DEFAULT_WORDS_PER_MINUTE,
            highlight: HighlightConfig::default(),

            date_format: "%B %d, %Y".to_string(),
            per_page: 6,

            extra: HashMap::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        if config.per_page == 0 {
            anyhow::bail!("per_page must be at least 1");
        }
        Ok(config)
    }
}

/// What to do when two documents resolve to the same slug
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlugCollisionPolicy {
    /// Keep the first claimant, give later ones a `-2`, `-3`, ... suffix
    #[default]
    Suffix,
    /// Fail the load
    Reject,
}

/// Code highlighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub theme: String,
    pub line_number: bool,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            theme: "base16-ocean.dark".to_string(),
            line_number: false,
        }
    }
}
