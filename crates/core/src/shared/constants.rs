/// Directory name used under the platform cache/config directories.
pub const APP_DIR_NAME: &str = "yt-whisper";

/// Sample rate whisper.cpp expects, in Hz.
pub const WHISPER_SAMPLE_RATE: u32 = 16000;

pub const WHISPER_MODEL_BASE_URL: &str =
    "https://huggingface.co/ggerganov/whisper.cpp/resolve/main";

pub const DEFAULT_OUTPUT_DIR: &str = "./output";

/// Caption languages requested from YouTube.
pub const SUBTITLE_LANGUAGES: &[&str] = &["en", "auto"];

pub const YT_DLP_BINARY: &str = "yt-dlp";
