//! Document text for newly authored posts

use chrono::NaiveDate;

use super::slugify;

/// A post being written, before it is handed to the document store
#[derive(Debug, Clone, PartialEq)]
pub struct Draft {
    pub title: String,
    pub slug: String,
    pub date: NaiveDate,
    pub description: String,
    pub image: Option<String>,
    pub tags: Vec<String>,
    pub body: String,
}

impl Draft {
    /// Create a draft whose slug is derived from the title
    pub fn new(title: &str, date: NaiveDate) -> Self {
        Self {
            title: title.to_string(),
            slug: slugify(title),
            date,
            description: String::new(),
            image: None,
            tags: Vec::new(),
            body: String::new(),
        }
    }

    /// Parse a comma-separated tag list, dropping blanks
    pub fn with_tag_list(mut self, tags: &str) -> Self {
        self.tags = tags
            .split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(str::to_string)
            .collect();
        self
    }

    /// File name for the document, e.g. `hello-world.md`
    pub fn file_name(&self) -> String {
        format!("{}.md", self.slug)
    }

    /// Render the complete document: front-matter block, blank line, body
    pub fn to_document(&self) -> String {
        let mut lines = vec![
            "---".to_string(),
            format!("title: {}", quote(&self.title)),
            format!("slug: {}", quote(&self.slug)),
            format!("date: {}", quote(&self.date.format("%Y-%m-%d").to_string())),
            format!("description: {}", quote(&self.description)),
        ];
        if let Some(image) = self.image.as_deref().filter(|i| !i.is_empty()) {
            lines.push(format!("image: {}", quote(image)));
        }
        if !self.tags.is_empty() {
            let tags: Vec<String> = self.tags.iter().map(|t| quote(t)).collect();
            lines.push(format!("tags: [{}]", tags.join(", ")));
        }
        lines.push("---".to_string());
        lines.push(String::new());
        lines.push(self.body.clone());

        lines.join("\n")
    }
}

/// YAML double-quoted scalar
fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) <= 0xff && needs_escape(c) => {
                out.push_str(&format!("\\x{:02X}", c as u32))
            }
            c if needs_escape(c) => out.push_str(&format!("\\u{:04X}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Characters YAML does not accept raw, or reads as line breaks
fn needs_escape(c: char) -> bool {
    matches!(
        c,
        '\0'..='\x1f' | '\x7f'..='\u{9f}' | '\u{2028}' | '\u{2029}' | '\u{feff}' | '\u{fffe}' | '\u{ffff}'
    )
}
