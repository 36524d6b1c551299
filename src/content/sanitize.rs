//! HTML sanitization for rendered posts

use ammonia::Builder;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref TEXT_ALIGN: Regex =
        Regex::new(r"^text-align:\s*(left|center|right);?$").unwrap();
}

const HEADINGS: [&str; 6] = ["h1", "h2", "h3", "h4", "h5", "h6"];

/// Strips markup that can execute code from rendered HTML
///
/// Scripts, event-handler attributes, `javascript:` URLs, styles and
/// embedded objects are removed. Structural markup (headings, lists,
/// code blocks, links, images, tables) and `class` attributes used by
/// syntax highlighting survive.
pub struct Sanitizer {
    builder: Builder<'static>,
}

impl Sanitizer {
    pub fn new() -> Self {
        let mut builder = Builder::default();
        builder
            .add_tags(&["input"])
            .add_tag_attributes("input", &["type", "checked", "disabled"])
            .add_tag_attributes("th", &["style"])
            .add_tag_attributes("td", &["style"])
            .add_tag_attributes("div", &["id"])
            .add_generic_attributes(&["class"])
            .attribute_filter(|element, attribute, value| match (element, attribute) {
                ("th" | "td", "style") => TEXT_ALIGN.is_match(value).then(|| value.into()),
                ("input", "type") => (value == "checkbox").then(|| value.into()),
                _ => Some(value.into()),
            });
        for heading in HEADINGS {
            builder.add_tag_attributes(heading, &["id"]);
        }
        Self { builder }
    }

    /// Sanitize an HTML fragment
    pub fn clean(&self, html: &str) -> String {
        self.builder.clean(html).to_string()
    }
}

impl Default for Sanitizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::MarkdownRenderer;

    #[test]
    fn test_removes_script_tags() {
        let clean = Sanitizer::new().clean("<p>hi</p><script>alert('x')</script>");
        assert_eq!(clean, "<p>hi</p>");
    }

    #[test]
    fn test_removes_event_handlers_and_js_urls() {
        let sanitizer = Sanitizer::new();
        let clean = sanitizer.clean(r#"<img src="a.png" onerror="alert(1)"><a href="javascript:alert(1)">x</a>"#);
        assert!(!clean.contains("onerror"));
        assert!(!clean.contains("javascript:"));
        assert!(clean.contains(r#"src="a.png""#));
    }

    #[test]
    fn test_removes_iframes_and_styles() {
        let clean = Sanitizer::new().clean(
            r#"<iframe src="https://evil.example"></iframe><style>body{}</style><p style="color:red">ok</p>"#,
        );
        assert_eq!(clean, "<p>ok</p>");
    }

    #[test]
    fn test_keeps_structure_and_highlight_classes() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render(
            "# Title\n\n- one\n- two\n\n[link](https://example.com) ![img](/a.png)\n\n```rust\nlet x = 1;\n```\n",
        );
        let clean = Sanitizer::new().clean(&html);
        assert!(clean.contains(r#"<h1 id="title">Title</h1>"#));
        assert!(clean.contains("<li>one</li>"));
        assert!(clean.contains(r#"href="https://example.com""#));
        assert!(clean.contains(r#"<img src="/a.png" alt="img">"#));
        assert!(clean.contains(r#"<code class="hljs language-rust">"#));
        assert!(clean.contains(r#"<span class="source rust">"#));
    }

    #[test]
    fn test_keeps_table_alignment_and_task_checkboxes() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("| a |\n|:-:|\n| 1 |\n\n- [ ] todo\n");
        let clean = Sanitizer::new().clean(&html);
        assert!(clean.contains("text-align: center"));
        assert!(clean.contains(r#"type="checkbox""#));

        let forged = Sanitizer::new().clean(r#"<table><tr><td style="background:url(x)">1</td></tr></table><input type="text">"#);
        assert!(!forged.contains("style="));
        assert!(!forged.contains(r#"type="text""#));
    }

    #[test]
    fn test_footnote_targets_survive() {
        let html = MarkdownRenderer::new().render("Text[^1]\n\n[^1]: note");
        let clean = Sanitizer::new().clean(&html);
        assert!(clean.contains(r##"href="#fn:1""##));
        assert!(clean.contains(r#"id="fn:1""#));
        assert!(clean.contains("note"));
    }

    #[test]
    fn test_markdown_script_injection() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render(
            "Hello\n\n<script>document.cookie</script>\n\n<div onclick=\"steal()\">click</div>",
        );
        let clean = Sanitizer::new().clean(&html);
        assert!(!clean.contains("<script"));
        assert!(!clean.contains("document.cookie"));
        assert!(!clean.contains("onclick"));
        assert!(clean.contains("click"));
    }

    #[test]
    fn test_idempotent() {
        let sanitizer = Sanitizer::new();
        let renderer = MarkdownRenderer::with_options("base16-ocean.dark", true);
        let inputs = [
            renderer.render("# A\n\n| x | y |\n|:--|--:|\n| 1 | 2 |\n\n```python\nprint('<hi>')\n```\n- [x] ok\n"),
            r#"<p>a <b onclick="x()">b</b> <a href="https://e.com">c</a></p><script>x</script>"#.to_string(),
        ];
        for input in inputs {
            let once = sanitizer.clean(&input);
            assert_eq!(sanitizer.clean(&once), once);
        }
    }
}
