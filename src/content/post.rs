//! Post model

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::FrontMatter;

/// A blog post assembled from one source document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// Slug (URL-friendly name), unique within a repository
    pub slug: String,

    /// Parsed front-matter
    pub front_matter: FrontMatter,

    /// Raw markdown content
    pub body: String,

    /// Plain-text summary
    pub excerpt: String,

    /// Rendered and sanitized HTML content
    pub html: String,

    /// Estimated reading time, e.g. "3 min read"
    pub reading_time: String,

    /// Identifier of the source document, when loaded from a store
    pub source: Option<String>,
}

impl Post {
    /// Post title, falling back to the slug
    pub fn title(&self) -> &str {
        self.front_matter.title.as_deref().unwrap_or(&self.slug)
    }

    /// Publication date, if present and parseable
    pub fn date(&self) -> Option<NaiveDateTime> {
        self.front_matter.parse_date()
    }

    pub fn tags(&self) -> &[String] {
        &self.front_matter.tags
    }

    /// Format the publication date with a chrono format string
    ///
    /// Unparseable dates are shown as written; missing dates as "".
    pub fn display_date(&self, format: &str) -> String {
        match self.date() {
            Some(date) => date.format(format).to_string(),
            None => self.front_matter.date.clone().unwrap_or_default(),
        }
    }
}
