use std::fmt::Write as _;

use crate::subtitles::domain::cue_text;
use crate::subtitles::domain::line_formatter::LineFormatter;
use crate::subtitles::domain::segment::Cue;
use crate::subtitles::domain::subtitle_format::SubtitleFormat;
use crate::subtitles::domain::subtitle_serializer::SubtitleSerializer;
use crate::subtitles::domain::timestamp::format_vtt_time;

pub const VTT_HEADER: &str = "WEBVTT";

/// WebVTT renderer. Cues carry no sequence numbers.
#[derive(Debug, Clone, Copy)]
pub struct VttSerializer {
    formatter: LineFormatter,
}

impl VttSerializer {
    pub fn new(formatter: LineFormatter) -> Self {
        Self { formatter }
    }
}

impl SubtitleSerializer for VttSerializer {
    fn format(&self) -> SubtitleFormat {
        SubtitleFormat::Vtt
    }

    fn serialize(&self, cues: &[Cue]) -> String {
        let mut output = format!("{VTT_HEADER}\n\n");

        for cue in cues {
            let text = self.formatter.wrap(&cue_text::clean(&cue.text));
            let _ = writeln!(
                output,
                "{} --> {}",
                format_vtt_time(cue.start),
                format_vtt_time(cue.end)
            );
            let _ = writeln!(output, "{text}");
            let _ = writeln!(output);
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subtitles::domain::line_formatter::NO_WRAP;

    #[test]
    fn test_header_and_cues() {
        let serializer = VttSerializer::new(LineFormatter::new(NO_WRAP));
        let cues = vec![Cue::new(0.0, 2.0, " one "), Cue::new(2.5, 4.25, "two")];
        assert_eq!(
            serializer.serialize(&cues),
            "WEBVTT\n\n\
             00:00:00.000 --> 00:00:02.000\none\n\n\
             00:00:02.500 --> 00:00:04.250\ntwo\n\n"
        );
    }

    #[test]
    fn test_empty_cue_list_renders_header_only() {
        let serializer = VttSerializer::new(LineFormatter::new(NO_WRAP));
        assert_eq!(serializer.serialize(&[]), "WEBVTT\n\n");
    }

    #[test]
    fn test_text_lines_never_contain_arrow() {
        let serializer = VttSerializer::new(LineFormatter::new(12));
        let cues = vec![Cue::new(1.0, 3.0, "left --> right and ---> more")];
        let vtt = serializer.serialize(&cues);
        for line in vtt.lines().filter(|l| !l.contains(" --> ")) {
            assert!(!line.contains("-->"), "unescaped arrow in {line:?}");
        }
    }

    #[test]
    fn test_format_is_vtt() {
        let serializer = VttSerializer::new(LineFormatter::new(NO_WRAP));
        assert_eq!(serializer.format(), SubtitleFormat::Vtt);
    }
}
