use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::media::domain::media_downloader::MediaDownloader;
use crate::media::domain::media_kind::{MediaInfo, MediaKind};
use crate::shared::text::{clean_url, slugify};

use super::generate_subtitles_use_case::{GenerateSubtitlesUseCase, PipelineError};
use super::pipeline_logger::{timed, PipelineLogger};

/// Something the user asked to end up in the output directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DownloadTarget {
    Video,
    Audio,
    VideoOnly,
    Subtitles,
}

#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub url: String,
    pub targets: BTreeSet<DownloadTarget>,
    pub output_dir: PathBuf,
    /// Skip published captions and always transcribe.
    pub force_whisper: bool,
}

impl FetchRequest {
    fn wants(&self, target: DownloadTarget) -> bool {
        self.targets.contains(&target)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubtitleSource {
    /// Captions published on the video page.
    Published,
    /// Generated by the speech recognizer.
    Whisper { cues: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleOutput {
    pub path: PathBuf,
    pub source: SubtitleSource,
}

/// Final locations of everything the run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchReport {
    pub title: String,
    pub video: Option<PathBuf>,
    pub audio: Option<PathBuf>,
    pub subtitles: Option<SubtitleOutput>,
}

/// A file fetched during the run, and whether the user asked to keep it.
struct Download {
    path: PathBuf,
    kind: MediaKind,
    keep: bool,
}

/// Orchestrates a full run: probe → download media → subtitles → rename.
///
/// Downloads land in the output directory under the video id, then requested
/// files are renamed to the slugified title. Files fetched only to feed the
/// recognizer are deleted at the end.
pub struct FetchMediaUseCase {
    downloader: Box<dyn MediaDownloader>,
    subtitles: GenerateSubtitlesUseCase,
    logger: Box<dyn PipelineLogger>,
}

impl FetchMediaUseCase {
    pub fn new(
        downloader: Box<dyn MediaDownloader>,
        subtitles: GenerateSubtitlesUseCase,
        logger: Box<dyn PipelineLogger>,
    ) -> Self {
        Self {
            downloader,
            subtitles,
            logger,
        }
    }

    pub fn execute(&mut self, request: &FetchRequest) -> Result<FetchReport, Box<dyn std::error::Error>> {
        let url = clean_url(&request.url);
        let dir = request.output_dir.as_path();
        fs::create_dir_all(dir).map_err(|source| PipelineError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let info = self.downloader.probe(&url)?;
        let title = file_title(&info);

        let mut video = None;
        if request.wants(DownloadTarget::Video) {
            video = self.fetch(&url, MediaKind::Video, dir, true)?;
        }
        if request.wants(DownloadTarget::VideoOnly) && video.is_none() {
            video = self.fetch(&url, MediaKind::VideoOnly, dir, true)?;
        }

        let mut audio = None;
        if request.wants(DownloadTarget::Audio) {
            audio = self.fetch(&url, MediaKind::Audio, dir, true)?;
            if audio.is_none() && video.is_none() {
                self.logger
                    .info("No audio stream available, downloading the video instead");
                video = self.fetch(&url, MediaKind::Video, dir, false)?;
            }
        }

        let subtitles = if request.wants(DownloadTarget::Subtitles) {
            Some(self.subtitles_for(&url, &info, &title, request, &video, &mut audio))
        } else {
            None
        };

        // Downloads are renamed or removed even when subtitle generation failed
        let video = finalize(video, dir, &title, None);
        let taken = video.as_ref().ok().and_then(|p| p.as_deref());
        let audio = finalize(audio, dir, &title, taken);

        let report = FetchReport {
            title,
            subtitles: subtitles.transpose()?,
            video: video?,
            audio: audio?,
        };

        self.logger.summary();
        Ok(report)
    }

    fn fetch(
        &mut self,
        url: &str,
        kind: MediaKind,
        dir: &Path,
        keep: bool,
    ) -> Result<Option<Download>, Box<dyn std::error::Error>> {
        let downloader = &self.downloader;
        let path = timed(self.logger.as_mut(), "download", || {
            downloader.download(url, kind, dir)
        })?;
        Ok(path.map(|path| Download { path, kind, keep }))
    }

    fn subtitles_for(
        &mut self,
        url: &str,
        info: &MediaInfo,
        title: &str,
        request: &FetchRequest,
        video: &Option<Download>,
        audio: &mut Option<Download>,
    ) -> Result<SubtitleOutput, Box<dyn std::error::Error>> {
        let dir = request.output_dir.as_path();
        let format = self.subtitles.format();

        if !request.force_whisper {
            if let Some(found) = self.downloader.download_subtitles(url, info, format, dir)? {
                let ext = found
                    .extension()
                    .and_then(|e| e.to_str())
                    .unwrap_or(format.extension())
                    .to_string();
                if ext != format.extension() {
                    log::warn!("Published subtitles are only available as .{ext}");
                }
                let path = move_to(&found, &dir.join(format!("{title}.{ext}")))?;
                self.logger
                    .info(&format!("Published subtitles saved: {}", path.display()));
                return Ok(SubtitleOutput {
                    path,
                    source: SubtitleSource::Published,
                });
            }
            self.logger.info("No published subtitles found");
        }

        if audio.is_none() && !video_has_audio(video) {
            self.logger
                .info("No audio downloaded yet, fetching audio for transcription");
            *audio = self.fetch(url, MediaKind::Audio, dir, false)?;
        }

        let video_source = if video_has_audio(video) {
            video.as_ref()
        } else {
            None
        };
        let source = audio
            .as_ref()
            .or(video_source)
            .map(|d| d.path.clone())
            .ok_or(PipelineError::NoAudioSource)?;

        let path = dir.join(format!("{title}.{}", format.extension()));
        let cues = self.subtitles.execute(&source, &path, self.logger.as_mut())?;
        self.logger
            .info(&format!("Whisper subtitles generated: {}", path.display()));

        Ok(SubtitleOutput {
            path,
            source: SubtitleSource::Whisper { cues },
        })
    }
}

/// The slugified title, falling back to the id for titles with no usable characters.
fn file_title(info: &MediaInfo) -> String {
    let slug = slugify(info.display_title());
    if slug.is_empty() {
        info.id.clone()
    } else {
        slug
    }
}

fn video_has_audio(video: &Option<Download>) -> bool {
    video.as_ref().is_some_and(|d| d.kind.has_audio())
}

/// Rename kept downloads to `{title}.{ext}` and delete auxiliary ones.
///
/// A download whose name would land on `taken` gets its kind tag as well,
/// e.g. `{title}.audio.webm` next to a `{title}.webm` video.
fn finalize(
    download: Option<Download>,
    dir: &Path,
    title: &str,
    taken: Option<&Path>,
) -> Result<Option<PathBuf>, PipelineError> {
    let Some(download) = download else {
        return Ok(None);
    };

    if !download.keep {
        if let Err(e) = fs::remove_file(&download.path) {
            log::warn!("Could not remove {}: {e}", download.path.display());
        }
        return Ok(None);
    }

    let ext = download.path.extension().and_then(|e| e.to_str());
    let mut target = dir.join(file_name(title, ext));
    if taken == Some(target.as_path()) {
        target = dir.join(file_name(&format!("{title}.{}", download.kind.tag()), ext));
    }
    let path = move_to(&download.path, &target)?;
    log::info!("Saved {}", path.display());
    Ok(Some(path))
}

fn file_name(stem: &str, ext: Option<&str>) -> String {
    match ext {
        Some(ext) => format!("{stem}.{ext}"),
        None => stem.to_string(),
    }
}

fn move_to(from: &Path, to: &Path) -> Result<PathBuf, PipelineError> {
    fs::rename(from, to).map_err(|source| PipelineError::Io {
        path: to.to_path_buf(),
        source,
    })?;
    Ok(to.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::generate_subtitles_use_case::tests::{
        factory_for, sample_segments, StubAudioReader,
    };
    use crate::pipeline::pipeline_logger::NullPipelineLogger;
    use crate::subtitles::domain::cue_normalizer::CueNormalizer;
    use crate::subtitles::domain::subtitle_format::SubtitleFormat;
    use crate::subtitles::infrastructure::serializer_factory::create_serializer;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    // ─── Stubs ───

    #[derive(Default)]
    struct StubDownloader {
        title: Option<String>,
        /// Kinds the source actually offers.
        available: Vec<MediaKind>,
        published_subtitles: bool,
        /// Container used for every kind, like webm streams from YouTube.
        extension: Option<&'static str>,
        calls: Arc<Mutex<Vec<String>>>,
    }

    impl MediaDownloader for StubDownloader {
        fn probe(&self, url: &str) -> Result<MediaInfo, Box<dyn std::error::Error>> {
            self.calls.lock().unwrap().push(format!("probe {url}"));
            Ok(MediaInfo {
                id: "abc123".to_string(),
                title: self.title.clone(),
            })
        }

        fn download(
            &self,
            _url: &str,
            kind: MediaKind,
            dir: &Path,
        ) -> Result<Option<PathBuf>, Box<dyn std::error::Error>> {
            self.calls.lock().unwrap().push(format!("download {}", kind.tag()));
            if !self.available.contains(&kind) {
                return Ok(None);
            }
            let ext = match (self.extension, kind) {
                (Some(ext), _) => ext,
                (None, MediaKind::Audio) => "m4a",
                (None, _) => "mp4",
            };
            let path = dir.join(format!("abc123.{}.{ext}", kind.tag()));
            fs::write(&path, kind.tag())?;
            Ok(Some(path))
        }

        fn download_subtitles(
            &self,
            _url: &str,
            info: &MediaInfo,
            format: SubtitleFormat,
            dir: &Path,
        ) -> Result<Option<PathBuf>, Box<dyn std::error::Error>> {
            self.calls.lock().unwrap().push("subtitles".to_string());
            if !self.published_subtitles {
                return Ok(None);
            }
            let path = dir.join(format!("{}.en.{}", info.id, format.extension()));
            fs::write(&path, "published")?;
            Ok(Some(path))
        }
    }

    struct Harness {
        use_case: FetchMediaUseCase,
        calls: Arc<Mutex<Vec<String>>>,
        reads: Arc<Mutex<Vec<PathBuf>>>,
        recognizer_builds: Arc<AtomicUsize>,
    }

    fn harness(downloader: StubDownloader, format: SubtitleFormat) -> Harness {
        harness_with_reader(downloader, StubAudioReader::silent(), format)
    }

    fn harness_with_reader(
        downloader: StubDownloader,
        reader: StubAudioReader,
        format: SubtitleFormat,
    ) -> Harness {
        let calls = downloader.calls.clone();
        let reads = reader.requested.clone();
        let recognizer_builds = Arc::new(AtomicUsize::new(0));
        let subtitles = GenerateSubtitlesUseCase::new(
            Box::new(reader),
            factory_for(sample_segments(), recognizer_builds.clone()),
            CueNormalizer::default(),
            create_serializer(format, 0),
        );
        Harness {
            use_case: FetchMediaUseCase::new(
                Box::new(downloader),
                subtitles,
                Box::new(NullPipelineLogger),
            ),
            calls,
            reads,
            recognizer_builds,
        }
    }

    fn request(dir: &Path, targets: &[DownloadTarget], force_whisper: bool) -> FetchRequest {
        FetchRequest {
            url: "https://www.youtube.com/watch\\?v\\=abc123".to_string(),
            targets: targets.iter().copied().collect(),
            output_dir: dir.to_path_buf(),
            force_whisper,
        }
    }

    fn titled(available: &[MediaKind]) -> StubDownloader {
        StubDownloader {
            title: Some("My Great Talk!".to_string()),
            available: available.to_vec(),
            ..StubDownloader::default()
        }
    }

    fn files_in(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_video_is_saved_under_title() {
        let tmp = TempDir::new().unwrap();
        let mut h = harness(titled(&[MediaKind::Video]), SubtitleFormat::Srt);

        let report = h
            .use_case
            .execute(&request(tmp.path(), &[DownloadTarget::Video], false))
            .unwrap();

        assert_eq!(report.title, "my-great-talk");
        assert_eq!(report.video, Some(tmp.path().join("my-great-talk.mp4")));
        assert_eq!(report.audio, None);
        assert_eq!(report.subtitles, None);
        assert_eq!(files_in(tmp.path()), vec!["my-great-talk.mp4"]);
    }

    #[test]
    fn test_url_is_cleaned_before_probe() {
        let tmp = TempDir::new().unwrap();
        let mut h = harness(titled(&[MediaKind::Video]), SubtitleFormat::Srt);
        h.use_case
            .execute(&request(tmp.path(), &[DownloadTarget::Video], false))
            .unwrap();
        assert_eq!(
            h.calls.lock().unwrap()[0],
            "probe https://www.youtube.com/watch?v=abc123"
        );
    }

    #[test]
    fn test_video_and_audio_are_both_kept() {
        let tmp = TempDir::new().unwrap();
        let mut h = harness(
            titled(&[MediaKind::Video, MediaKind::Audio]),
            SubtitleFormat::Srt,
        );

        let report = h
            .use_case
            .execute(&request(
                tmp.path(),
                &[DownloadTarget::Video, DownloadTarget::Audio],
                false,
            ))
            .unwrap();

        assert_eq!(report.video, Some(tmp.path().join("my-great-talk.mp4")));
        assert_eq!(report.audio, Some(tmp.path().join("my-great-talk.m4a")));
    }

    #[test]
    fn test_video_only_skipped_when_full_video_downloaded() {
        let tmp = TempDir::new().unwrap();
        let mut h = harness(
            titled(&[MediaKind::Video, MediaKind::VideoOnly]),
            SubtitleFormat::Srt,
        );

        h.use_case
            .execute(&request(
                tmp.path(),
                &[DownloadTarget::Video, DownloadTarget::VideoOnly],
                false,
            ))
            .unwrap();

        let calls = h.calls.lock().unwrap();
        assert!(calls.contains(&"download video".to_string()));
        assert!(!calls.contains(&"download video-only".to_string()));
    }

    #[test]
    fn test_missing_audio_falls_back_to_auxiliary_video() {
        let tmp = TempDir::new().unwrap();
        let mut h = harness(titled(&[MediaKind::Video]), SubtitleFormat::Srt);

        let report = h
            .use_case
            .execute(&request(tmp.path(), &[DownloadTarget::Audio], false))
            .unwrap();

        assert!(h.calls.lock().unwrap().contains(&"download video".to_string()));
        // the fallback video was not requested, so it is not kept
        assert_eq!(report.video, None);
        assert_eq!(report.audio, None);
        assert!(files_in(tmp.path()).is_empty());
    }

    #[test]
    fn test_published_subtitles_win_over_whisper() {
        let tmp = TempDir::new().unwrap();
        let mut downloader = titled(&[MediaKind::Audio]);
        downloader.published_subtitles = true;
        let mut h = harness(downloader, SubtitleFormat::Vtt);

        let report = h
            .use_case
            .execute(&request(tmp.path(), &[DownloadTarget::Subtitles], false))
            .unwrap();

        let subtitles = report.subtitles.unwrap();
        assert_eq!(subtitles.source, SubtitleSource::Published);
        assert_eq!(subtitles.path, tmp.path().join("my-great-talk.vtt"));
        assert_eq!(fs::read_to_string(&subtitles.path).unwrap(), "published");
        assert_eq!(h.recognizer_builds.load(Ordering::SeqCst), 0);
        assert!(!h.calls.lock().unwrap().contains(&"download audio".to_string()));
    }

    #[test]
    fn test_force_whisper_ignores_published_subtitles() {
        let tmp = TempDir::new().unwrap();
        let mut downloader = titled(&[MediaKind::Audio]);
        downloader.published_subtitles = true;
        let mut h = harness(downloader, SubtitleFormat::Srt);

        let report = h
            .use_case
            .execute(&request(tmp.path(), &[DownloadTarget::Subtitles], true))
            .unwrap();

        let subtitles = report.subtitles.unwrap();
        assert_eq!(subtitles.source, SubtitleSource::Whisper { cues: 2 });
        assert!(!h.calls.lock().unwrap().contains(&"subtitles".to_string()));
        // auxiliary audio is cleaned up, only the subtitles remain
        assert_eq!(files_in(tmp.path()), vec!["my-great-talk.srt"]);
    }

    #[test]
    fn test_whisper_transcribes_requested_audio() {
        let tmp = TempDir::new().unwrap();
        let mut h = harness(titled(&[MediaKind::Audio]), SubtitleFormat::Srt);

        let report = h
            .use_case
            .execute(&request(
                tmp.path(),
                &[DownloadTarget::Audio, DownloadTarget::Subtitles],
                false,
            ))
            .unwrap();

        assert_eq!(
            h.reads.lock().unwrap().as_slice(),
            &[tmp.path().join("abc123.audio.m4a")]
        );
        assert_eq!(report.audio, Some(tmp.path().join("my-great-talk.m4a")));
        let srt = fs::read_to_string(tmp.path().join("my-great-talk.srt")).unwrap();
        assert!(srt.starts_with("1\n00:00:00,000 --> 00:00:04,000\n"));
        let downloads = h
            .calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.starts_with("download"))
            .count();
        assert_eq!(downloads, 1);
    }

    #[test]
    fn test_whisper_reads_audio_from_downloaded_video() {
        let tmp = TempDir::new().unwrap();
        let mut h = harness(titled(&[MediaKind::Video]), SubtitleFormat::Srt);

        h.use_case
            .execute(&request(
                tmp.path(),
                &[DownloadTarget::Video, DownloadTarget::Subtitles],
                false,
            ))
            .unwrap();

        assert_eq!(
            h.reads.lock().unwrap().as_slice(),
            &[tmp.path().join("abc123.video.mp4")]
        );
        assert_eq!(
            files_in(tmp.path()),
            vec!["my-great-talk.mp4", "my-great-talk.srt"]
        );
    }

    #[test]
    fn test_video_only_is_not_used_as_audio_source() {
        let tmp = TempDir::new().unwrap();
        let mut h = harness(
            titled(&[MediaKind::VideoOnly, MediaKind::Audio]),
            SubtitleFormat::Srt,
        );

        h.use_case
            .execute(&request(
                tmp.path(),
                &[DownloadTarget::VideoOnly, DownloadTarget::Subtitles],
                false,
            ))
            .unwrap();

        assert_eq!(
            h.reads.lock().unwrap().as_slice(),
            &[tmp.path().join("abc123.audio.m4a")]
        );
    }

    #[test]
    fn test_no_audio_anywhere_fails() {
        let tmp = TempDir::new().unwrap();
        let mut h = harness(titled(&[]), SubtitleFormat::Srt);

        let err = h
            .use_case
            .execute(&request(tmp.path(), &[DownloadTarget::Subtitles], false))
            .unwrap_err();

        assert!(err.to_string().contains("no audio source"));
        assert_eq!(h.recognizer_builds.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_untitled_video_uses_id() {
        let tmp = TempDir::new().unwrap();
        let downloader = StubDownloader {
            title: Some("???".to_string()),
            available: vec![MediaKind::Video],
            ..StubDownloader::default()
        };
        let mut h = harness(downloader, SubtitleFormat::Srt);

        let report = h
            .use_case
            .execute(&request(tmp.path(), &[DownloadTarget::Video], false))
            .unwrap();
        assert_eq!(report.title, "abc123");
    }

    #[test]
    fn test_creates_output_dir() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("nested").join("out");
        let mut h = harness(titled(&[MediaKind::Video]), SubtitleFormat::Srt);

        h.use_case
            .execute(&request(&dir, &[DownloadTarget::Video], false))
            .unwrap();
        assert!(dir.join("my-great-talk.mp4").exists());
    }

    #[test]
    fn test_audio_sharing_video_extension_keeps_both_files() {
        let tmp = TempDir::new().unwrap();
        let mut downloader = titled(&[MediaKind::VideoOnly, MediaKind::Audio]);
        downloader.extension = Some("webm");
        let mut h = harness(downloader, SubtitleFormat::Srt);

        let report = h
            .use_case
            .execute(&request(
                tmp.path(),
                &[DownloadTarget::VideoOnly, DownloadTarget::Audio],
                false,
            ))
            .unwrap();

        let video = tmp.path().join("my-great-talk.webm");
        let audio = tmp.path().join("my-great-talk.audio.webm");
        assert_eq!(report.video, Some(video.clone()));
        assert_eq!(report.audio, Some(audio.clone()));
        assert_eq!(fs::read_to_string(video).unwrap(), "video-only");
        assert_eq!(fs::read_to_string(audio).unwrap(), "audio");
    }

    #[test]
    fn test_failed_transcription_still_cleans_up_downloads() {
        let tmp = TempDir::new().unwrap();
        let reader = StubAudioReader {
            segment: None,
            requested: Arc::new(Mutex::new(Vec::new())),
        };
        let mut h = harness_with_reader(titled(&[MediaKind::Audio]), reader, SubtitleFormat::Srt);

        let err = h
            .use_case
            .execute(&request(tmp.path(), &[DownloadTarget::Subtitles], false))
            .unwrap_err();

        assert!(err.to_string().contains("no audio track"));
        assert!(files_in(tmp.path()).is_empty());
    }

    #[test]
    fn test_failed_transcription_still_renames_requested_video() {
        let tmp = TempDir::new().unwrap();
        let reader = StubAudioReader {
            segment: None,
            requested: Arc::new(Mutex::new(Vec::new())),
        };
        let mut h = harness_with_reader(titled(&[MediaKind::Video]), reader, SubtitleFormat::Srt);

        let result = h.use_case.execute(&request(
            tmp.path(),
            &[DownloadTarget::Video, DownloadTarget::Subtitles],
            false,
        ));

        assert!(result.is_err());
        assert_eq!(files_in(tmp.path()), vec!["my-great-talk.mp4"]);
    }
}
