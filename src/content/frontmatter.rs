//! Front-matter parsing

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

/// Delimiter line that opens and closes a front-matter block
const DELIMITER: &str = "---";

/// Front-matter data from a post
///
/// Well-known keys are lifted into typed fields; everything else is kept,
/// in document order, in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FrontMatter {
    pub title: Option<String>,
    pub date: Option<String>,
    pub description: Option<String>,
    pub cover_image: Option<String>,
    pub tags: Vec<String>,
    pub slug: Option<String>,
    pub excerpt: Option<String>,

    /// Additional custom fields
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl FrontMatter {
    /// Parse front-matter from content string
    /// Returns (front_matter, remaining_content)
    ///
    /// Never fails: a missing or unterminated block yields empty front-matter
    /// and the whole input as body.
    pub fn parse(content: &str) -> (Self, &str) {
        let text = content.strip_prefix('\u{feff}').unwrap_or(content);

        let Some(after_open) = strip_opening_delimiter(text) else {
            return (FrontMatter::default(), content);
        };

        let mut offset = 0;
        for line in after_open.split_inclusive('\n') {
            if is_delimiter(line) {
                let block = &after_open[..offset];
                let remaining = &after_open[offset + line.len()..];
                return (Self::from_block(block), strip_leading_blank_line(remaining));
            }
            offset += line.len();
        }

        tracing::debug!("Unterminated front-matter block, treating whole document as body");
        (FrontMatter::default(), content)
    }

    /// Parse the inside of a delimited block
    fn from_block(block: &str) -> Self {
        if block.trim().is_empty() {
            return FrontMatter::default();
        }

        match serde_yaml::from_str::<Mapping>(block) {
            Ok(mapping) => Self::from_mapping(mapping),
            Err(e) => {
                tracing::debug!(
                    "Front-matter is not a valid YAML mapping ({}), parsing line by line",
                    e
                );
                Self::from_mapping(parse_lines(block))
            }
        }
    }

    /// Build front-matter from a parsed mapping, dropping ill-typed known keys
    fn from_mapping(mapping: Mapping) -> Self {
        let mut fm = FrontMatter::default();

        for (key, value) in mapping {
            let Some(key) = key.as_str().map(str::to_string) else {
                tracing::debug!("Skipping non-string front-matter key: {:?}", key);
                continue;
            };

            let parsed = match key.as_str() {
                "title" => scalar_string(&value).map(|v| fm.title = Some(v)),
                "date" => scalar_string(&value).map(|v| fm.date = Some(v)),
                "description" => scalar_string(&value).map(|v| fm.description = Some(v)),
                "coverImage" | "cover_image" | "image" => scalar_string(&value).map(|v| {
                    fm.cover_image.get_or_insert(v);
                }),
                "tags" => string_or_vec(&value).map(|v| fm.tags = v),
                "slug" => scalar_string(&value).map(|v| fm.slug = Some(v)),
                "excerpt" => scalar_string(&value).map(|v| fm.excerpt = Some(v)),
                _ => {
                    fm.extra.insert(key.clone(), value.clone());
                    Some(())
                }
            };

            if parsed.is_none() {
                tracing::debug!("Omitting front-matter field `{}` with unexpected value", key);
            }
        }

        fm
    }

    /// Parse the date string into a NaiveDateTime
    pub fn parse_date(&self) -> Option<NaiveDateTime> {
        self.date.as_deref().and_then(parse_date_string)
    }
}

/// Return the text after an opening `---` line, if the document starts with one
fn strip_opening_delimiter(text: &str) -> Option<&str> {
    let (first, rest) = match text.find('\n') {
        Some(pos) => (&text[..pos], &text[pos + 1..]),
        None => (text, ""),
    };
    (first.trim_end_matches('\r') == DELIMITER && !rest.is_empty()).then_some(rest)
}

fn is_delimiter(line: &str) -> bool {
    line.trim_end_matches(['\n', '\r']) == DELIMITER
}

/// Drop one leading blank line, if present
fn strip_leading_blank_line(body: &str) -> &str {
    match body.find('\n') {
        Some(pos) if body[..pos].trim().is_empty() => &body[pos + 1..],
        _ => body,
    }
}

/// Fallback parser: each `key: value` line on its own
fn parse_lines(block: &str) -> Mapping {
    let mut mapping = Mapping::new();

    for line in block.lines() {
        if line.starts_with(char::is_whitespace) || line.trim_start().starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let (key, value) = (key.trim(), value.trim());
        if key.is_empty() || value.is_empty() {
            continue;
        }

        match serde_yaml::from_str::<Value>(value) {
            Ok(parsed) => {
                mapping.insert(Value::String(key.to_string()), parsed);
            }
            Err(e) => tracing::debug!("Omitting front-matter line `{}`: {}", key, e),
        }
    }

    mapping
}

/// Accept strings, numbers and booleans as text
fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Accept a single string or a list of scalars
fn string_or_vec(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::Sequence(items) => Some(items.iter().filter_map(scalar_string).collect()),
        Value::Null => Some(Vec::new()),
        other => scalar_string(other).map(|s| vec![s]),
    }
}

/// Parse a date string in various formats
fn parse_date_string(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();

    let datetime_formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
    ];
    for fmt in datetime_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }

    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }

    // RFC 3339 / ISO 8601 with offset, compared in UTC
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.naive_utc())
}
