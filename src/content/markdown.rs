//! Markdown rendering with syntax highlighting

use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use std::collections::HashMap;
use syntect::highlighting::ThemeSet;
use syntect::html::{css_for_theme_with_class_style, ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;
use thiserror::Error;

use super::slug::slugify;

/// Errors raised while rendering; `render` turns them into empty output
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("syntax highlighting failed: {0}")]
    Highlight(#[from] syntect::Error),

    #[error("unknown highlight theme: {0}")]
    UnknownTheme(String),
}

/// Markdown renderer with syntax highlighting
pub struct MarkdownRenderer {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    theme_name: String,
    line_numbers: bool,
}

impl MarkdownRenderer {
    /// Create a new markdown renderer
    pub fn new() -> Self {
        Self::with_options("base16-ocean.dark", false)
    }

    /// Create with custom settings
    pub fn with_options(theme: &str, line_numbers: bool) -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            theme_name: theme.to_string(),
            line_numbers,
        }
    }

    /// Render markdown to HTML
    ///
    /// Never fails: if rendering hits an internal error the failure is logged
    /// and an empty string is returned. The output is not sanitized.
    pub fn render(&self, markdown: &str) -> String {
        html_or_empty(self.try_render(markdown))
    }

    /// Render markdown to HTML, surfacing internal errors
    pub fn try_render(&self, markdown: &str) -> Result<String, RenderError> {
        // Front-matter is handled separately in FrontMatter::parse()
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_GFM;
        let parser = Parser::new_ext(markdown, options);

        let mut events: Vec<Event> = Vec::new();
        let mut code_block: Option<String> = None;
        let mut code_block_lang: Option<String> = None;
        let mut heading: Option<(usize, String)> = None;
        let mut heading_ids: HashMap<String, usize> = HashMap::new();
        let mut footnotes: HashMap<String, usize> = HashMap::new();

        for event in parser {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    code_block_lang = match kind {
                        CodeBlockKind::Fenced(info) => info
                            .split(|c: char| c == ',' || c.is_whitespace())
                            .next()
                            .filter(|lang| !lang.is_empty())
                            .map(str::to_string),
                        CodeBlockKind::Indented => None,
                    };
                    code_block = Some(String::new());
                }
                Event::End(TagEnd::CodeBlock) => {
                    let code = code_block.take().unwrap_or_default();
                    let highlighted = self.highlight_code(&code, code_block_lang.take().as_deref())?;
                    events.push(Event::Html(CowStr::from(highlighted)));
                }
                Event::Text(text) => {
                    if let Some(buf) = code_block.as_mut() {
                        buf.push_str(&text);
                    } else {
                        if let Some((_, heading_text)) = heading.as_mut() {
                            heading_text.push_str(&text);
                        }
                        events.push(Event::Text(text));
                    }
                }
                Event::Code(code) => {
                    if let Some((_, heading_text)) = heading.as_mut() {
                        heading_text.push_str(&code);
                    }
                    events.push(Event::Code(code));
                }
                Event::Start(Tag::Heading { .. }) => {
                    heading = Some((events.len(), String::new()));
                    events.push(event);
                }
                Event::End(TagEnd::Heading(_)) => {
                    if let Some((index, text)) = heading.take() {
                        assign_heading_id(&mut events[index], &text, &mut heading_ids);
                    }
                    events.push(event);
                }
                // Footnote ids use a `fn:` prefix, which heading slugs never contain
                Event::FootnoteReference(label) => {
                    let n = footnote_number(&mut footnotes, &label);
                    events.push(Event::InlineHtml(CowStr::from(format!(
                        r##"<sup class="footnote-reference"><a href="#fn:{n}">{n}</a></sup>"##
                    ))));
                }
                Event::Start(Tag::FootnoteDefinition(label)) => {
                    let n = footnote_number(&mut footnotes, &label);
                    events.push(Event::Html(CowStr::from(format!(
                        r#"<div class="footnote-definition" id="fn:{n}"><sup class="footnote-definition-label">{n}</sup>"#
                    ))));
                }
                Event::End(TagEnd::FootnoteDefinition) => {
                    events.push(Event::Html(CowStr::from("</div>\n")));
                }
                // Single newlines inside a paragraph become line breaks
                Event::SoftBreak => events.push(Event::HardBreak),
                other => events.push(other),
            }
        }

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());

        Ok(html_output)
    }

    /// Highlight a code block
    fn highlight_code(&self, code: &str, lang: Option<&str>) -> Result<String, RenderError> {
        let syntax = self.find_syntax(code, lang);
        let label = match lang {
            Some(lang) => lang.to_string(),
            None if syntax.name == self.syntax_set.find_syntax_plain_text().name => {
                "plaintext".to_string()
            }
            None => syntax
                .file_extensions
                .first()
                .cloned()
                .unwrap_or_else(|| "plaintext".to_string()),
        };
        let label = html_escape(&label);

        let mut generator = ClassedHTMLGenerator::new_with_class_style(
            syntax,
            &self.syntax_set,
            ClassStyle::Spaced,
        );
        for line in LinesWithEndings::from(code) {
            generator.parse_html_for_line_which_includes_newline(line)?;
        }
        let highlighted = generator.finalize();

        if self.line_numbers {
            Ok(self.add_line_numbers(&highlighted, code.lines().count(), &label))
        } else {
            Ok(format!(
                r#"<pre><code class="hljs language-{}">{}</code></pre>"#,
                label, highlighted
            ))
        }
    }

    /// Declared language first, then first-line detection, then plain text
    fn find_syntax(&self, code: &str, lang: Option<&str>) -> &SyntaxReference {
        let found = match lang {
            Some(lang) => self.syntax_set.find_syntax_by_token(lang),
            None => code
                .lines()
                .next()
                .and_then(|first| self.syntax_set.find_syntax_by_first_line(first)),
        };
        if found.is_none() {
            tracing::debug!("No syntax for {:?}, highlighting as plain text", lang);
        }
        found.unwrap_or_else(|| self.syntax_set.find_syntax_plain_text())
    }

    /// Add line numbers to highlighted code
    fn add_line_numbers(&self, code: &str, line_count: usize, lang: &str) -> String {
        let gutter = (1..=line_count)
            .map(|n| format!(r#"<span class="line-number">{}</span>"#, n))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            r#"<figure class="highlight {}"><table><tr><td class="gutter"><pre>{}</pre></td><td class="code"><pre><code class="hljs language-{}">{}</code></pre></td></tr></table></figure>"#,
            lang, gutter, lang, code
        )
    }

    /// CSS for the configured theme, matching the classes emitted by `render`
    pub fn stylesheet(&self) -> Result<String, RenderError> {
        let theme = self
            .theme_set
            .themes
            .get(&self.theme_name)
            .ok_or_else(|| RenderError::UnknownTheme(self.theme_name.clone()))?;
        Ok(css_for_theme_with_class_style(theme, ClassStyle::Spaced)?)
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Log a rendering failure and fall back to empty HTML
fn html_or_empty(result: Result<String, RenderError>) -> String {
    result.unwrap_or_else(|e| {
        tracing::warn!("Markdown rendering failed, using empty HTML: {}", e);
        String::new()
    })
}

/// Footnotes are numbered by first appearance, reference or definition
fn footnote_number(numbers: &mut HashMap<String, usize>, label: &str) -> usize {
    let next = numbers.len() + 1;
    *numbers.entry(label.to_string()).or_insert(next)
}

/// Give a heading without an explicit id a slug id, unique within the document
fn assign_heading_id(event: &mut Event, text: &str, seen: &mut HashMap<String, usize>) {
    let Event::Start(Tag::Heading { id, .. }) = event else {
        return;
    };
    if id.is_some() {
        return;
    }

    let base = slugify(text);
    if base.is_empty() {
        return;
    }
    let count = seen.entry(base.clone()).or_insert(0);
    let unique = if *count == 0 {
        base
    } else {
        format!("{}-{}", base, count)
    };
    *count += 1;
    *id = Some(CowStr::from(unique));
}

/// Simple HTML escaping
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_basic_markdown() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("# Hello World\n\nThis is a test.");
        assert!(html.contains(r#"<h1 id="hello-world">Hello World</h1>"#));
        assert!(html.contains("<p>This is a test.</p>"));
    }

    #[test]
    fn test_duplicate_headings_get_unique_ids() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("## Setup\n\n## Setup\n");
        assert!(html.contains(r#"<h2 id="setup">"#));
        assert!(html.contains(r#"<h2 id="setup-1">"#));
    }

    #[test]
    fn test_soft_breaks_become_line_breaks() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("first line\nsecond line");
        assert!(html.contains("first line<br />"));
        assert!(html.contains("second line"));
    }

    #[test]
    fn test_render_code_block_with_declared_language() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("```rust\nfn main() {}\n```");
        assert!(html.contains(r#"<code class="hljs language-rust">"#));
        assert!(html.contains("<span class="));
        assert!(html.contains("main"));
    }

    #[test]
    fn test_unknown_language_falls_back_to_plain_text() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("```klingon\nqapla' <batlh>\n```");
        assert!(html.contains(r#"language-klingon"#));
        assert!(html.contains("&lt;batlh&gt;"));
    }

    #[test]
    fn test_language_detected_from_first_line() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("```\n#!/bin/bash\necho hi\n```");
        assert!(!html.contains("language-plaintext"));

        let html = renderer.render("```\njust words\n```");
        assert!(html.contains("language-plaintext"));
    }

    #[test]
    fn test_line_numbers() {
        let renderer = MarkdownRenderer::with_options("base16-ocean.dark", true);
        let html = renderer.render("```text\na\nb\n```");
        assert!(html.contains(r#"<span class="line-number">1</span>"#));
        assert!(html.contains(r#"<span class="line-number">2</span>"#));
        assert!(!html.contains(r#"<span class="line-number">3</span>"#));
        assert!(html.contains(r#"<figure class="highlight text">"#));
    }

    #[test]
    fn test_tables_and_task_lists() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("| a | b |\n|---|---|\n| 1 | 2 |\n\n- [x] done\n");
        assert!(html.contains("<table>"));
        assert!(html.contains("<td>1</td>"));
        assert!(html.contains(r#"type="checkbox""#));
    }

    #[test]
    fn test_malformed_markdown_degrades() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("**unclosed _emphasis\n\n```\nno closing fence");
        assert!(html.contains("unclosed"));
        assert!(html.contains("no closing fence"));
    }

    #[test]
    fn test_footnotes_link_to_their_definitions() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("Text[^note] and more[^2]\n\n[^2]: second\n\n[^note]: first");
        assert!(html.contains(r##"<a href="#fn:1">1</a>"##));
        assert!(html.contains(r##"<a href="#fn:2">2</a>"##));
        assert!(html.contains(r#"id="fn:1"><sup class="footnote-definition-label">1</sup>"#));
        assert!(html.contains(r#"id="fn:2"><sup class="footnote-definition-label">2</sup>"#));
    }

    #[test]
    fn test_render_error_becomes_empty_html() {
        assert_eq!(html_or_empty(Ok("<p>x</p>".to_string())), "<p>x</p>");
        assert_eq!(
            html_or_empty(Err(RenderError::UnknownTheme("missing".to_string()))),
            ""
        );
    }

    #[test]
    fn test_stylesheet() {
        let css = MarkdownRenderer::new().stylesheet().unwrap();
        assert!(css.contains('{'));

        let missing = MarkdownRenderer::with_options("no-such-theme", false).stylesheet();
        assert!(matches!(missing, Err(RenderError::UnknownTheme(_))));
    }
}
