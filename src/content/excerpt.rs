//! Plain-text excerpts

/// Default excerpt length, in characters
pub const DEFAULT_EXCERPT_LENGTH: usize = 160;

/// Marker appended when an excerpt was cut short
pub const ELLIPSIS: &str = "...";

/// Markdown markers removed before counting
const MARKERS: [char; 7] = ['#', '*', '_', '`', '~', '[', ']'];

/// Build a plain-text summary of at most `limit` characters
///
/// Markdown emphasis, heading, code and link markers are removed and
/// whitespace runs are collapsed to single spaces. `...` is appended only
/// when the stripped text was longer than `limit`.
pub fn excerpt(body: &str, limit: usize) -> String {
    let stripped: String = body.chars().filter(|c| !MARKERS.contains(c)).collect();
    let plain = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
    truncate(&plain, limit)
}

/// Cut `text` to `limit` characters, appending `...` if anything was dropped
///
/// The text is otherwise left as written.
pub fn truncate(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((end, _)) => format!("{}{}", &text[..end], ELLIPSIS),
        None => text.to_string(),
    }
}
