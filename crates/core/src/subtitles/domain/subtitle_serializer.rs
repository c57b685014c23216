use super::segment::Cue;
use super::subtitle_format::SubtitleFormat;

/// Domain interface for rendering cues into a subtitle file body.
///
/// Rendering is total: any cue sequence produces text. Cue text is cleaned
/// (whitespace collapsed, `-->` escaped) and optionally wrapped before it is
/// written, so callers may pass cues that did not come from the normalizer.
pub trait SubtitleSerializer: Send {
    fn format(&self) -> SubtitleFormat;

    fn serialize(&self, cues: &[Cue]) -> String;
}
