mod settings;

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::process;

use clap::{Parser, ValueEnum};

use yt_whisper_core::audio::domain::speech_recognizer::SpeechRecognizer;
use yt_whisper_core::audio::infrastructure::ffmpeg_audio_reader::FfmpegAudioReader;
use yt_whisper_core::audio::infrastructure::whisper_recognizer::{WhisperOptions, WhisperRecognizer};
use yt_whisper_core::media::infrastructure::yt_dlp_downloader::YtDlpDownloader;
use yt_whisper_core::pipeline::fetch_media_use_case::{
    DownloadTarget, FetchMediaUseCase, FetchReport, FetchRequest, SubtitleSource,
};
use yt_whisper_core::pipeline::generate_subtitles_use_case::{
    GenerateSubtitlesUseCase, RecognizerFactory,
};
use yt_whisper_core::pipeline::pipeline_logger::LogPipelineLogger;
use yt_whisper_core::shared::model_resolver::resolve_whisper_model;
use yt_whisper_core::shared::whisper_model::WhisperModel;
use yt_whisper_core::subtitles::domain::cue_normalizer::{CueNormalizer, NormalizeOptions};
use yt_whisper_core::subtitles::domain::subtitle_format::SubtitleFormat;
use yt_whisper_core::subtitles::infrastructure::serializer_factory::create_serializer;

use settings::Settings;

/// What to download.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Download {
    Video,
    Audio,
    VideoOnly,
    Subtitles,
}

impl From<Download> for DownloadTarget {
    fn from(d: Download) -> Self {
        match d {
            Download::Video => DownloadTarget::Video,
            Download::Audio => DownloadTarget::Audio,
            Download::VideoOnly => DownloadTarget::VideoOnly,
            Download::Subtitles => DownloadTarget::Subtitles,
        }
    }
}

/// YouTube video/audio/subtitle downloader with Whisper fallback.
#[derive(Parser, Debug)]
#[command(name = "yt-whisper", version)]
struct Cli {
    /// YouTube video URL.
    url: String,

    /// Content to download (one or more).
    #[arg(long, value_enum, num_args = 1.., required = true)]
    download: Vec<Download>,

    /// Whisper model (tiny, base, small, medium, large, ...).
    #[arg(long)]
    model: Option<WhisperModel>,

    /// Spoken language code for Whisper (auto-detected if omitted).
    #[arg(long)]
    language: Option<String>,

    /// Subtitle format: srt or vtt.
    #[arg(long)]
    format: Option<SubtitleFormat>,

    /// Directory for downloaded and generated files.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Generate subtitles with Whisper even if published ones exist.
    #[arg(long)]
    force_whisper: bool,

    /// Translate speech to English instead of transcribing it.
    #[arg(long)]
    translate: bool,

    /// Wrap subtitle lines longer than this many characters (0 = no wrap).
    #[arg(long)]
    line_length: Option<usize>,

    /// Minimum subtitle duration in seconds.
    #[arg(long)]
    min_duration: Option<f64>,

    /// Keep Whisper segments as-is instead of merging short ones.
    #[arg(long)]
    no_merge: bool,

    /// Path to the yt-dlp executable.
    #[arg(long)]
    yt_dlp: Option<PathBuf>,
}

impl Cli {
    /// Overlay flags given on the command line onto persisted settings.
    fn apply_to(&self, mut settings: Settings) -> Settings {
        if let Some(model) = self.model {
            settings.model = model;
        }
        if let Some(format) = self.format {
            settings.format = format;
        }
        if let Some(ref language) = self.language {
            settings.language = Some(language.clone());
        }
        if let Some(ref dir) = self.output_dir {
            settings.output_dir = dir.clone();
        }
        if let Some(n) = self.line_length {
            settings.line_length = n;
        }
        if let Some(secs) = self.min_duration {
            settings.min_duration = secs;
        }
        if let Some(ref path) = self.yt_dlp {
            settings.yt_dlp = path.clone();
        }
        settings
    }

    fn targets(&self) -> BTreeSet<DownloadTarget> {
        self.download.iter().copied().map(DownloadTarget::from).collect()
    }
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let settings = cli.apply_to(Settings::load());
    validate(&cli, &settings)?;

    let normalizer = CueNormalizer::new(NormalizeOptions {
        min_duration: settings.min_duration,
        auto_merge: !cli.no_merge,
    });
    let whisper_options = WhisperOptions {
        language: settings.language.clone(),
        translate: cli.translate,
    };
    let subtitles = GenerateSubtitlesUseCase::new(
        Box::new(FfmpegAudioReader),
        build_recognizer_factory(settings.model, whisper_options),
        normalizer,
        create_serializer(settings.format, settings.line_length),
    );

    let mut use_case = FetchMediaUseCase::new(
        Box::new(YtDlpDownloader::new(settings.yt_dlp.clone())),
        subtitles,
        Box::new(LogPipelineLogger::new()),
    );

    let report = use_case.execute(&FetchRequest {
        url: cli.url.clone(),
        targets: cli.targets(),
        output_dir: settings.output_dir.clone(),
        force_whisper: cli.force_whisper,
    })?;

    print_report(&report);
    Ok(())
}

fn validate(cli: &Cli, settings: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    if cli.url.trim().is_empty() {
        return Err("URL must not be empty".into());
    }
    if !settings.min_duration.is_finite() || settings.min_duration < 0.0 {
        return Err(format!(
            "Minimum duration must be a non-negative number of seconds, got {}",
            settings.min_duration
        )
        .into());
    }
    if settings.model.is_english_only() {
        if let Some(language) = settings.language.as_deref().filter(|l| *l != "en") {
            log::warn!(
                "Model {} only understands English, but --language is {language}",
                settings.model
            );
        }
    }
    if cli.translate && !cli.download.contains(&Download::Subtitles) {
        log::warn!("--translate has no effect without --download subtitles");
    }
    Ok(())
}

/// The model is resolved (and downloaded on first use) only when Whisper
/// actually has to run.
fn build_recognizer_factory(model: WhisperModel, options: WhisperOptions) -> RecognizerFactory {
    Box::new(move || {
        log::info!("Resolving Whisper model: {model}");
        let model_path = resolve_whisper_model(model, None, Some(Box::new(download_progress)))?;
        eprintln!();
        let recognizer = WhisperRecognizer::new(&model_path, options.clone())?;
        Ok(Box::new(recognizer) as Box<dyn SpeechRecognizer>)
    })
}

fn print_report(report: &FetchReport) {
    if let Some(ref path) = report.video {
        println!("Video saved: {}", path.display());
    }
    if let Some(ref path) = report.audio {
        println!("Audio saved: {}", path.display());
    }
    if let Some(ref subtitles) = report.subtitles {
        match subtitles.source {
            SubtitleSource::Published => {
                println!("Subtitles saved: {}", subtitles.path.display())
            }
            SubtitleSource::Whisper { cues } => println!(
                "Whisper subtitles saved: {} ({cues} cues)",
                subtitles.path.display()
            ),
        }
    }
}

fn download_progress(downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading Whisper model... {pct}%");
    } else {
        eprint!("\rDownloading Whisper model... {downloaded} bytes");
    }
}
