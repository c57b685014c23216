//! Helpers for user-supplied URLs and output file names.

/// Remove shell-escaping backslashes from an http(s) URL.
///
/// Pasting `https://www.youtube.com/watch\?v\=abc` into some shells keeps the
/// backslashes. Non-URL input is returned untouched.
pub fn clean_url(url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        url.replace('\\', "")
    } else {
        url.to_string()
    }
}

/// Turn a video title into a file-name-safe slug.
///
/// Drops everything except word characters, whitespace and `-`, lowercases,
/// and collapses runs of whitespace/`-` into a single `-`.
pub fn slugify(value: &str) -> String {
    let kept: String = value
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-' || c.is_whitespace())
        .collect();

    let mut slug = String::with_capacity(kept.len());
    let mut pending_dash = false;
    for c in kept.trim().to_lowercase().chars() {
        if c == '-' || c.is_whitespace() {
            pending_dash = true;
            continue;
        }
        if pending_dash {
            slug.push('-');
            pending_dash = false;
        }
        slug.push(c);
    }
    if pending_dash {
        slug.push('-');
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::escaped("https://www.youtube.com/watch\\?v\\=abc", "https://www.youtube.com/watch?v=abc")]
    #[case::plain_http("http://youtu.be/abc", "http://youtu.be/abc")]
    #[case::not_a_url("abc\\def", "abc\\def")]
    fn test_clean_url(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(clean_url(input), expected);
    }

    #[rstest]
    #[case::punctuation("Hello, World!", "hello-world")]
    #[case::runs("  Rust -- is   fun ", "rust-is-fun")]
    #[case::underscore("snake_case title", "snake_case-title")]
    #[case::unicode("Café Ünïcode", "café-ünïcode")]
    #[case::only_symbols("!!!", "")]
    #[case::trailing_dash("live -", "live-")]
    fn test_slugify(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(slugify(input), expected);
    }
}
