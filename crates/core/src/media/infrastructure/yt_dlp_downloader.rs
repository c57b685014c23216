use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use thiserror::Error;

use crate::media::domain::media_downloader::MediaDownloader;
use crate::media::domain::media_kind::{MediaInfo, MediaKind};
use crate::shared::constants::SUBTITLE_LANGUAGES;
use crate::subtitles::domain::subtitle_format::SubtitleFormat;

/// Player clients that keep working when the default web client is throttled.
const YOUTUBE_EXTRACTOR_ARGS: &str = "youtube:player_client=web,android";

#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("{} not found; install yt-dlp or pass its location with --yt-dlp", binary.display())]
    ToolMissing { binary: PathBuf },
    #[error("failed to run {}: {source}", binary.display())]
    Spawn {
        binary: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("yt-dlp exited with status {status}: {stderr}")]
    Failed { status: String, stderr: String },
    #[error("could not parse yt-dlp metadata: {0}")]
    Probe(#[source] serde_json::Error),
    #[error("failed to scan {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Media downloader backed by the `yt-dlp` command-line tool.
#[derive(Debug, Clone)]
pub struct YtDlpDownloader {
    binary: PathBuf,
}

impl YtDlpDownloader {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    fn run(&self, args: &[String]) -> Result<String, DownloadError> {
        log::debug!("Running {} {}", self.binary.display(), args.join(" "));

        let output = Command::new(&self.binary)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| {
                if source.kind() == io::ErrorKind::NotFound {
                    DownloadError::ToolMissing {
                        binary: self.binary.clone(),
                    }
                } else {
                    DownloadError::Spawn {
                        binary: self.binary.clone(),
                        source,
                    }
                }
            })?;

        if !output.status.success() {
            return Err(DownloadError::Failed {
                status: output
                    .status
                    .code()
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "signal".to_string()),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl MediaDownloader for YtDlpDownloader {
    fn probe(&self, url: &str) -> Result<MediaInfo, Box<dyn std::error::Error>> {
        let stdout = self.run(&probe_args(url))?;
        let info = parse_probe(&stdout)?;
        log::info!("Found video {} ({})", info.id, info.display_title());
        Ok(info)
    }

    fn download(
        &self,
        url: &str,
        kind: MediaKind,
        dir: &Path,
    ) -> Result<Option<PathBuf>, Box<dyn std::error::Error>> {
        log::info!("Downloading {} stream", kind.tag());
        let stdout = self.run(&download_args(url, kind, dir))?;
        let path = parse_printed_path(&stdout).filter(|p| p.exists());
        match &path {
            Some(p) => log::info!("Downloaded {}", p.display()),
            None => log::warn!("yt-dlp reported no {} file", kind.tag()),
        }
        Ok(path)
    }

    fn download_subtitles(
        &self,
        url: &str,
        info: &MediaInfo,
        format: SubtitleFormat,
        dir: &Path,
    ) -> Result<Option<PathBuf>, Box<dyn std::error::Error>> {
        log::info!("Looking for published subtitles");
        self.run(&subtitle_args(url, format, dir))?;
        Ok(find_subtitle_file(dir, &info.id, format)?)
    }
}

fn format_selector(kind: MediaKind) -> &'static str {
    match kind {
        MediaKind::Video => "bestvideo+bestaudio/best",
        MediaKind::Audio => "bestaudio/best",
        MediaKind::VideoOnly => "bestvideo/best",
    }
}

fn output_template(dir: &Path, tag: Option<&str>) -> String {
    let name = match tag {
        Some(tag) => format!("%(id)s.{tag}.%(ext)s"),
        None => "%(id)s.%(ext)s".to_string(),
    };
    dir.join(name).to_string_lossy().into_owned()
}

fn common_args(dir: &Path, tag: Option<&str>) -> Vec<String> {
    vec![
        "--no-playlist".to_string(),
        "--extractor-args".to_string(),
        YOUTUBE_EXTRACTOR_ARGS.to_string(),
        "-o".to_string(),
        output_template(dir, tag),
    ]
}

fn probe_args(url: &str) -> Vec<String> {
    vec![
        "--no-playlist".to_string(),
        "--extractor-args".to_string(),
        YOUTUBE_EXTRACTOR_ARGS.to_string(),
        "--dump-single-json".to_string(),
        "--skip-download".to_string(),
        "--".to_string(),
        url.to_string(),
    ]
}

fn download_args(url: &str, kind: MediaKind, dir: &Path) -> Vec<String> {
    let mut args = common_args(dir, Some(kind.tag()));
    args.push("-f".to_string());
    args.push(format_selector(kind).to_string());
    if kind == MediaKind::Video {
        args.push("--merge-output-format".to_string());
        args.push("mp4".to_string());
    }
    args.extend(
        ["--no-simulate", "--print", "after_move:filepath", "--", url]
            .iter()
            .map(|s| s.to_string()),
    );
    args
}

fn subtitle_args(url: &str, format: SubtitleFormat, dir: &Path) -> Vec<String> {
    let ext = format.extension();
    let mut args = common_args(dir, None);
    args.extend(
        [
            "--skip-download".to_string(),
            "--write-subs".to_string(),
            "--write-auto-subs".to_string(),
            "--sub-langs".to_string(),
            SUBTITLE_LANGUAGES.join(","),
            "--sub-format".to_string(),
            format!("{ext}/best"),
            "--convert-subs".to_string(),
            ext.to_string(),
            "--".to_string(),
            url.to_string(),
        ],
    );
    args
}

fn parse_probe(json: &str) -> Result<MediaInfo, DownloadError> {
    serde_json::from_str(json).map_err(DownloadError::Probe)
}

/// yt-dlp prints the final path of each moved file; the last one wins.
fn parse_printed_path(stdout: &str) -> Option<PathBuf> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .last()
        .map(PathBuf::from)
}

/// Pick the caption file yt-dlp wrote for `id`, preferring `format`.
fn find_subtitle_file(
    dir: &Path,
    id: &str,
    format: SubtitleFormat,
) -> Result<Option<PathBuf>, DownloadError> {
    let io_err = |source| DownloadError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut candidates: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(io_err)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            let name_matches = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(id));
            let ext_matches = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| SubtitleFormat::ALL.iter().any(|f| f.extension() == e));
            name_matches && ext_matches && path.is_file()
        })
        .collect();
    candidates.sort();

    let preferred = candidates
        .iter()
        .position(|p| p.extension().and_then(|e| e.to_str()) == Some(format.extension()));
    Ok(match preferred {
        Some(index) => Some(candidates.swap_remove(index)),
        None => candidates.into_iter().next(),
    })
}
