use serde::Deserialize;

/// Which stream(s) to fetch for a media download.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    /// Best video merged with best audio.
    Video,
    /// Best audio stream on its own.
    Audio,
    /// Best video stream without audio.
    VideoOnly,
}

impl MediaKind {
    /// Short tag used to keep downloads of different kinds apart on disk.
    pub fn tag(&self) -> &'static str {
        match self {
            MediaKind::Video => "video",
            MediaKind::Audio => "audio",
            MediaKind::VideoOnly => "video-only",
        }
    }

    pub fn has_audio(&self) -> bool {
        !matches!(self, MediaKind::VideoOnly)
    }
}

/// Identity of a remote video, as reported by the downloader.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MediaInfo {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
}

impl MediaInfo {
    /// The title, or the id when the title is missing or blank.
    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(&self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_are_distinct() {
        let tags = [
            MediaKind::Video.tag(),
            MediaKind::Audio.tag(),
            MediaKind::VideoOnly.tag(),
        ];
        assert_eq!(tags, ["video", "audio", "video-only"]);
    }

    #[test]
    fn test_video_only_has_no_audio() {
        assert!(MediaKind::Video.has_audio());
        assert!(MediaKind::Audio.has_audio());
        assert!(!MediaKind::VideoOnly.has_audio());
    }

    #[test]
    fn test_display_title_falls_back_to_id() {
        let untitled = MediaInfo {
            id: "abc123".to_string(),
            title: None,
        };
        assert_eq!(untitled.display_title(), "abc123");

        let blank = MediaInfo {
            id: "abc123".to_string(),
            title: Some("  ".to_string()),
        };
        assert_eq!(blank.display_title(), "abc123");

        let titled = MediaInfo {
            id: "abc123".to_string(),
            title: Some("A Talk".to_string()),
        };
        assert_eq!(titled.display_title(), "A Talk");
    }
}
