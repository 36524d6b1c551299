//! Reading time estimation

/// Default reading speed
pub const DEFAULT_WORDS_PER_MINUTE: usize = 200;

/// Estimated minutes to read `body`, rounded up and never below 1
pub fn reading_minutes(body: &str, words_per_minute: usize) -> usize {
    let words = body.split_whitespace().count();
    words.div_ceil(words_per_minute.max(1)).max(1)
}

/// Human-readable reading time, e.g. `"3 min read"`
pub fn reading_time(body: &str, words_per_minute: usize) -> String {
    format!("{} min read", reading_minutes(body, words_per_minute))
}
