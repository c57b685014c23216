use std::fmt::Write as _;

use crate::subtitles::domain::cue_text;
use crate::subtitles::domain::line_formatter::LineFormatter;
use crate::subtitles::domain::segment::Cue;
use crate::subtitles::domain::subtitle_format::SubtitleFormat;
use crate::subtitles::domain::subtitle_serializer::SubtitleSerializer;
use crate::subtitles::domain::timestamp::format_srt_time;

/// SubRip renderer: sequence number, timing line, text, blank line.
#[derive(Debug, Clone, Copy)]
pub struct SrtSerializer {
    formatter: LineFormatter,
}

impl SrtSerializer {
    pub fn new(formatter: LineFormatter) -> Self {
        Self { formatter }
    }
}

impl SubtitleSerializer for SrtSerializer {
    fn format(&self) -> SubtitleFormat {
        SubtitleFormat::Srt
    }

    fn serialize(&self, cues: &[Cue]) -> String {
        let mut output = String::new();

        for (i, cue) in cues.iter().enumerate() {
            let text = self.formatter.wrap(&cue_text::clean(&cue.text));
            let _ = writeln!(output, "{}", i + 1);
            let _ = writeln!(
                output,
                "{} --> {}",
                format_srt_time(cue.start),
                format_srt_time(cue.end)
            );
            let _ = writeln!(output, "{text}");
            let _ = writeln!(output);
        }

        output
    }
}
