use crate::subtitles::domain::line_formatter::LineFormatter;
use crate::subtitles::domain::subtitle_format::SubtitleFormat;
use crate::subtitles::domain::subtitle_serializer::SubtitleSerializer;

use super::srt_serializer::SrtSerializer;
use super::vtt_serializer::VttSerializer;

/// Creates the serializer for `format`. A `line_length` of 0 disables wrapping.
pub fn create_serializer(format: SubtitleFormat, line_length: usize) -> Box<dyn SubtitleSerializer> {
    let formatter = LineFormatter::new(line_length);
    log::debug!("Using {format} serializer (line_length={line_length})");
    match format {
        SubtitleFormat::Srt => Box::new(SrtSerializer::new(formatter)),
        SubtitleFormat::Vtt => Box::new(VttSerializer::new(formatter)),
    }
}
