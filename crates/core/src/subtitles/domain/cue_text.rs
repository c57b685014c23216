/// Timing-line delimiter shared by SRT and WebVTT.
pub const TIMING_ARROW: &str = "-->";
const ESCAPED_ARROW: &str = "->";

/// Collapse every whitespace run to a single space and trim both ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Replace `-->` with `->` until none remains.
///
/// A single pass is not enough: `--->` becomes `-->` after one replacement.
pub fn escape_arrows(text: &str) -> String {
    let mut out = text.to_string();
    while out.contains(TIMING_ARROW) {
        out = out.replace(TIMING_ARROW, ESCAPED_ARROW);
    }
    out
}

/// Full cleanup applied to every cue's text before rendering.
pub fn clean(text: &str) -> String {
    escape_arrows(&collapse_whitespace(text))
}
