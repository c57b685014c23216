use serde::{Deserialize, Serialize};

/// A span of transcribed speech as produced by a recognizer.
///
/// Times are in seconds. `end >= start` is expected on input but not enforced.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

impl Segment {
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// A subtitle cue ready for rendering.
///
/// Cues produced by `CueNormalizer` hold clean single-spaced text, meet the
/// minimum duration unless capped by the following cue, and never overlap it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cue {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

impl Cue {
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// True when overlap repair pulled `end` before `start`.
    pub fn is_degenerate(&self) -> bool {
        self.end < self.start
    }
}

impl From<Segment> for Cue {
    fn from(segment: Segment) -> Self {
        Self {
            start: segment.start,
            end: segment.end,
            text: segment.text,
        }
    }
}

impl From<&Segment> for Cue {
    fn from(segment: &Segment) -> Self {
        Self {
            start: segment.start,
            end: segment.end,
            text: segment.text.clone(),
        }
    }
}
