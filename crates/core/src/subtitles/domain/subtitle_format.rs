use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Output dialect for subtitle files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubtitleFormat {
    /// SubRip: numbered cues, `HH:MM:SS,mmm` timestamps.
    #[default]
    Srt,
    /// WebVTT: `WEBVTT` header, `HH:MM:SS.mmm` timestamps.
    Vtt,
}

impl SubtitleFormat {
    pub const ALL: &[SubtitleFormat] = &[SubtitleFormat::Srt, SubtitleFormat::Vtt];

    pub fn extension(&self) -> &'static str {
        match self {
            SubtitleFormat::Srt => "srt",
            SubtitleFormat::Vtt => "vtt",
        }
    }
}

impl fmt::Display for SubtitleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for SubtitleFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "srt" => Ok(SubtitleFormat::Srt),
            "vtt" | "webvtt" => Ok(SubtitleFormat::Vtt),
            other => Err(format!("unknown subtitle format '{other}' (expected srt or vtt)")),
        }
    }
}
