use std::path::{Path, PathBuf};

use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

use crate::audio::domain::audio_segment::AudioSegment;
use crate::audio::domain::speech_recognizer::SpeechRecognizer;
use crate::shared::constants::WHISPER_SAMPLE_RATE;
use crate::subtitles::domain::segment::Segment;

/// Language hint passed to whisper.cpp when none is configured.
const AUTO_DETECT_LANGUAGE: &str = "auto";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WhisperOptions {
    /// ISO language code; `None` lets Whisper detect it.
    pub language: Option<String>,
    /// Translate speech to English instead of transcribing it.
    pub translate: bool,
}

/// Speech recognizer using whisper.cpp via whisper-rs.
///
/// Produces segment-level timestamps. The model is loaded on every call to
/// `transcribe`, which happens once per run.
#[derive(Debug)]
pub struct WhisperRecognizer {
    model_path: PathBuf,
    options: WhisperOptions,
}

impl WhisperRecognizer {
    pub fn new(model_path: &Path, options: WhisperOptions) -> Result<Self, Box<dyn std::error::Error>> {
        if !model_path.exists() {
            return Err(format!("Whisper model not found at: {}", model_path.display()).into());
        }
        Ok(Self {
            model_path: model_path.to_path_buf(),
            options,
        })
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    pub fn options(&self) -> &WhisperOptions {
        &self.options
    }
}

impl SpeechRecognizer for WhisperRecognizer {
    fn transcribe(&self, audio: &AudioSegment) -> Result<Vec<Segment>, Box<dyn std::error::Error>> {
        if !audio.is_whisper_ready() {
            return Err(format!(
                "Whisper expects {WHISPER_SAMPLE_RATE} Hz mono audio, got {} Hz with {} channels",
                audio.sample_rate(),
                audio.channels()
            )
            .into());
        }

        if audio.is_empty() {
            log::warn!("No audio samples to transcribe");
            return Ok(Vec::new());
        }

        log::info!(
            "Transcribing {:.1}s of audio with {}",
            audio.duration(),
            self.model_path.display()
        );

        let ctx = WhisperContext::new_with_params(
            self.model_path.to_str().ok_or("Invalid model path")?,
            WhisperContextParameters::default(),
        )
        .map_err(|e| format!("Failed to load Whisper model: {e}"))?;

        let mut state = ctx
            .create_state()
            .map_err(|e| format!("Failed to create Whisper state: {e}"))?;

        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
        params.set_language(Some(
            self.options.language.as_deref().unwrap_or(AUTO_DETECT_LANGUAGE),
        ));
        params.set_translate(self.options.translate);
        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);
        params.set_n_threads(num_cpus().min(4) as i32);

        state
            .full(params, audio.samples())
            .map_err(|e| format!("Whisper inference failed: {e}"))?;

        let mut segments = Vec::new();
        for seg_idx in 0..state.full_n_segments() {
            let Some(segment) = state.get_segment(seg_idx) else {
                continue;
            };

            let text = match segment.to_str_lossy() {
                Ok(t) => t.into_owned(),
                Err(e) => {
                    log::warn!("Skipping segment {seg_idx}: {e}");
                    continue;
                }
            };
            if text.trim().is_empty() {
                continue;
            }

            // Segment timestamps are in centiseconds (10ms units)
            segments.push(Segment::new(
                segment.start_timestamp() as f64 / 100.0,
                segment.end_timestamp() as f64 / 100.0,
                text,
            ));
        }

        log::info!("Whisper produced {} segments", segments.len());
        Ok(segments)
    }
}

fn num_cpus() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}
