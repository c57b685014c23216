use std::path::{Path, PathBuf};

use super::media_kind::{MediaInfo, MediaKind};
use crate::subtitles::domain::subtitle_format::SubtitleFormat;

/// Domain interface for fetching remote media.
///
/// Implementations write into `dir` and return the path of what they
/// produced. `Ok(None)` means the source has nothing of the requested kind.
pub trait MediaDownloader: Send {
    fn probe(&self, url: &str) -> Result<MediaInfo, Box<dyn std::error::Error>>;

    fn download(
        &self,
        url: &str,
        kind: MediaKind,
        dir: &Path,
    ) -> Result<Option<PathBuf>, Box<dyn std::error::Error>>;

    /// Fetch official or automatic captions converted to `format`.
    fn download_subtitles(
        &self,
        url: &str,
        info: &MediaInfo,
        format: SubtitleFormat,
        dir: &Path,
    ) -> Result<Option<PathBuf>, Box<dyn std::error::Error>>;
}
