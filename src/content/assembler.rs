//! Builds `Post` records from raw documents

use super::excerpt::{excerpt, truncate, DEFAULT_EXCERPT_LENGTH};
use super::reading_time::{reading_time, DEFAULT_WORDS_PER_MINUTE};
use super::{slugify, FrontMatter, MarkdownRenderer, Post, Sanitizer};
use crate::config::SiteConfig;

/// Runs the content pipeline over one document at a time
///
/// Explicit front-matter values take precedence over derived ones: a
/// `slug` field replaces the slug handed to [`PostAssembler::assemble`],
/// and an `excerpt` field replaces the generated excerpt. An explicit
/// excerpt is only cut to length, never stripped of markdown markers.
pub struct PostAssembler {
    renderer: MarkdownRenderer,
    sanitizer: Sanitizer,
    excerpt_length: usize,
    words_per_minute: usize,
}

impl PostAssembler {
    pub fn new() -> Self {
        Self {
            renderer: MarkdownRenderer::new(),
            sanitizer: Sanitizer::new(),
            excerpt_length: DEFAULT_EXCERPT_LENGTH,
            words_per_minute: DEFAULT_WORDS_PER_MINUTE,
        }
    }

    /// Create an assembler using the site's rendering settings
    pub fn from_config(config: &SiteConfig) -> Self {
        Self {
            renderer: MarkdownRenderer::with_options(
                &config.highlight.theme,
                config.highlight.line_number,
            ),
            sanitizer: Sanitizer::new(),
            excerpt_length: config.excerpt_length,
            words_per_minute: config.words_per_minute,
        }
    }

    /// Assemble a post from raw document text
    ///
    /// The slug is resolved in order: front-matter `slug`, the given `slug`,
    /// then the slugified title. It may still be empty, which callers must
    /// reject.
    pub fn assemble(&self, slug: &str, raw: &str) -> Post {
        let (front_matter, body) = FrontMatter::parse(raw);

        let slug = resolve_slug(&front_matter, slug);
        let excerpt = match front_matter.excerpt.as_deref() {
            Some(explicit) => truncate(explicit, self.excerpt_length),
            None => excerpt(body, self.excerpt_length),
        };
        let html = self.render_html(body);

        Post {
            slug,
            excerpt,
            html,
            reading_time: reading_time(body, self.words_per_minute),
            body: body.to_string(),
            front_matter,
            source: None,
        }
    }

    /// Render markdown and sanitize the result
    pub fn render_html(&self, body: &str) -> String {
        self.sanitizer.clean(&self.renderer.render(body))
    }

    pub fn renderer(&self) -> &MarkdownRenderer {
        &self.renderer
    }
}

impl Default for PostAssembler {
    fn default() -> Self {
        Self::new()
    }
}

fn resolve_slug(front_matter: &FrontMatter, given: &str) -> String {
    if let Some(explicit) = front_matter.slug.as_deref() {
        let explicit = slugify(explicit);
        if !explicit.is_empty() {
            return explicit;
        }
        tracing::debug!("Front-matter slug is empty after normalization, ignoring it");
    }

    if !given.is_empty() {
        return given.to_string();
    }

    front_matter
        .title
        .as_deref()
        .map(slugify)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hello_world_scenario() {
        let raw = "---\ntitle: \"Hello World\"\ndate: \"2024-01-01\"\n---\n# Hi\n\nThis is a **test**.";
        let post = PostAssembler::new().assemble("hello-world", raw);

        assert_eq!(post.slug, "hello-world");
        assert_eq!(post.title(), "Hello World");
        assert_eq!(post.front_matter.date.as_deref(), Some("2024-01-01"));
        assert_eq!(post.body, "# Hi\n\nThis is a **test**.");
        assert_eq!(post.excerpt, "Hi This is a test.");
        assert_eq!(post.reading_time, "1 min read");
        assert!(post.html.contains("<h1 id=\"hi\">Hi</h1>"));
        assert!(post.html.contains("<strong>test</strong>"));
    }

    #[test]
    fn test_explicit_front_matter_wins() {
        let raw = "---\ntitle: Derived Title\nslug: \"Custom Slug\"\nexcerpt: \"Hand-written *summary*\"\n---\nBody text that would otherwise be the excerpt.";
        let post = PostAssembler::new().assemble("file-name", raw);

        assert_eq!(post.slug, "custom-slug");
        assert_eq!(post.excerpt, "Hand-written *summary*");
    }

    #[test]
    fn test_explicit_excerpt_keeps_marker_characters() {
        let raw = "---\nexcerpt: \"C# and F# tips\"\n---\nbody";
        let post = PostAssembler::new().assemble("x", raw);
        assert_eq!(post.excerpt, "C# and F# tips");
    }

    #[test]
    fn test_derived_values_without_front_matter_fields() {
        let raw = "---\ntitle: Derived Title\n---\nBody text.";
        let post = PostAssembler::new().assemble("file-name", raw);
        assert_eq!(post.slug, "file-name");
        assert_eq!(post.excerpt, "Body text.");
    }

    #[test]
    fn test_slug_falls_back_to_title() {
        let raw = "---\ntitle: \"My First Draft!\"\nslug: \"???\"\n---\nBody";
        let post = PostAssembler::new().assemble("", raw);
        assert_eq!(post.slug, "my-first-draft");
    }

    #[test]
    fn test_explicit_excerpt_is_still_bounded() {
        let raw = format!("---\nexcerpt: \"{}\"\n---\nBody", "x".repeat(300));
        let post = PostAssembler::new().assemble("long", &raw);
        assert_eq!(post.excerpt.chars().count(), 163);
        assert!(post.excerpt.ends_with("..."));
    }

    #[test]
    fn test_malformed_document_degrades() {
        let raw = "---\ntitle: never closed\n<script>alert(1)</script>";
        let post = PostAssembler::new().assemble("broken", raw);
        assert_eq!(post.front_matter, FrontMatter::default());
        assert_eq!(post.body, raw);
        assert!(!post.html.contains("<script"));
        assert_eq!(post.reading_time, "1 min read");
    }

    #[test]
    fn test_uses_config() {
        let config = SiteConfig {
            excerpt_length: 5,
            words_per_minute: 1,
            ..Default::default()
        };
        let post = PostAssembler::from_config(&config).assemble("c", "one two three");
        assert_eq!(post.excerpt, "one t...");
        assert_eq!(post.reading_time, "3 min read");
    }
}
