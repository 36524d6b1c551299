//! Title to URL slug conversion

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
    static ref HYPHENS: Regex = Regex::new(r"-+").unwrap();
}

/// Convert a title into a URL slug
///
/// Lower-cases the input, drops everything that is not a letter, digit,
/// whitespace or hyphen, turns whitespace runs into hyphens and collapses
/// repeated hyphens. The result may be empty (e.g. for `"!!!"`); callers
/// must treat an empty slug as invalid.
///
/// # Examples
/// ```
/// use postmill::content::slugify;
/// assert_eq!(slugify("Hello, World!"), "hello-world");
/// ```
pub fn slugify(title: &str) -> String {
    let kept: String = title
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || *c == '-')
        .collect();

    let hyphenated = WHITESPACE.replace_all(&kept, "-");
    let collapsed = HYPHENS.replace_all(&hyphenated, "-");

    collapsed.trim_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_basic_title() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("  Getting   Started with Rust  "), "getting-started-with-rust");
    }

    #[test]
    fn test_strips_symbols() {
        assert_eq!(slugify("What's new in C++20?"), "whats-new-in-c20");
        assert_eq!(slugify("snake_case_title"), "snakecasetitle");
        assert_eq!(slugify("a -- b"), "a-b");
    }

    #[test]
    fn test_symbol_only_is_empty() {
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("!!! ???"), "");
        assert_eq!(slugify("---"), "");
    }

    #[test]
    fn test_unicode_letters_are_kept() {
        assert_eq!(slugify("Café Crème"), "café-crème");
        assert_eq!(slugify("最近 的 文章"), "最近-的-文章");
    }

    #[test]
    fn test_mixed_input() {
        assert_eq!(slugify("  -Leading and trailing-  "), "leading-and-trailing");
        assert_eq!(slugify("Tabs\tand\nnewlines"), "tabs-and-newlines");
    }

    proptest! {
        #[test]
        fn prop_slugify_is_idempotent(title in any::<String>()) {
            let once = slugify(&title);
            prop_assert_eq!(slugify(&once), once.clone());
            prop_assert!(!once.starts_with('-') && !once.ends_with('-'));
            prop_assert!(!once.contains("--"));
            prop_assert!(once.chars().all(|c| c.is_alphanumeric() || c == '-'));
        }
    }
}
