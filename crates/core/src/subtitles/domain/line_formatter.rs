/// Line-length budget that disables wrapping.
pub const NO_WRAP: usize = 0;

/// Splits long cue text into two lines at a word boundary.
///
/// The break is placed at the space closest to (and not after) the midpoint,
/// capped at `max_length` characters. Text with no usable space before that
/// point is returned unchanged rather than cut mid-word.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LineFormatter {
    max_length: usize,
}

impl LineFormatter {
    pub fn new(max_length: usize) -> Self {
        Self { max_length }
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    pub fn is_enabled(&self) -> bool {
        self.max_length != NO_WRAP
    }

    pub fn wrap(&self, text: &str) -> String {
        wrap(text, self.max_length)
    }
}

/// Wrap `text` into at most two lines. Lengths count characters, not bytes.
pub fn wrap(text: &str, max_length: usize) -> String {
    if max_length == NO_WRAP {
        return text.to_string();
    }

    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_length {
        return text.to_string();
    }

    let mut index = (chars.len() / 2).min(max_length);
    while index > 1 && chars[index - 1] != ' ' {
        index -= 1;
    }

    // index <= 1 means we reached the start without a usable space
    if index <= 1 {
        return text.to_string();
    }

    let first: String = chars[..index - 1].iter().collect();
    let second: String = chars[index..].iter().collect();
    format!("{first}\n{second}")
}
