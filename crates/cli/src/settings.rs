use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use yt_whisper_core::shared::constants::{APP_DIR_NAME, DEFAULT_OUTPUT_DIR, YT_DLP_BINARY};
use yt_whisper_core::shared::whisper_model::WhisperModel;
use yt_whisper_core::subtitles::domain::cue_normalizer::DEFAULT_MIN_DURATION;
use yt_whisper_core::subtitles::domain::line_formatter::NO_WRAP;
use yt_whisper_core::subtitles::domain::subtitle_format::SubtitleFormat;

/// Persisted defaults for command-line options. Flags given on the command
/// line always win.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub model: WhisperModel,
    pub format: SubtitleFormat,
    /// `None` lets Whisper detect the spoken language.
    pub language: Option<String>,
    pub output_dir: PathBuf,
    pub line_length: usize,
    pub min_duration: f64,
    pub yt_dlp: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model: WhisperModel::default(),
            format: SubtitleFormat::default(),
            language: None,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            line_length: NO_WRAP,
            min_duration: DEFAULT_MIN_DURATION,
            yt_dlp: PathBuf::from(YT_DLP_BINARY),
        }
    }
}

impl Settings {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR_NAME).join("settings.json"))
    }

    pub fn load() -> Self {
        Self::config_path()
            .map(|path| Self::load_from(&path))
            .unwrap_or_default()
    }

    /// Missing files fall back to defaults; a malformed file is reported and ignored.
    pub fn load_from(path: &Path) -> Self {
        let Ok(json) = fs::read_to_string(path) else {
            return Self::default();
        };
        match serde_json::from_str(&json) {
            Ok(settings) => {
                log::debug!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("Ignoring invalid settings file {}: {e}", path.display());
                Self::default()
            }
        }
    }
}
