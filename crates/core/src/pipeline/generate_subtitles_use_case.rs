use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::audio::domain::audio_reader::AudioReader;
use crate::audio::domain::speech_recognizer::SpeechRecognizer;
use crate::shared::constants::WHISPER_SAMPLE_RATE;
use crate::subtitles::domain::cue_normalizer::{CueNormalizer, NormalizeError};
use crate::subtitles::domain::subtitle_format::SubtitleFormat;
use crate::subtitles::domain::subtitle_serializer::SubtitleSerializer;

use super::pipeline_logger::{timed, PipelineLogger};

/// Builds the recognizer on demand, so a model is only resolved (and maybe
/// downloaded) when transcription is actually needed.
pub type RecognizerFactory =
    Box<dyn Fn() -> Result<Box<dyn SpeechRecognizer>, Box<dyn std::error::Error>> + Send>;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("{} has no audio track", path.display())]
    NoAudio { path: PathBuf },
    #[error("no audio source available for transcription")]
    NoAudioSource,
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Normalize(#[from] NormalizeError),
}

/// Transcription pipeline: decode → recognize → normalize → serialize → write.
pub struct GenerateSubtitlesUseCase {
    reader: Box<dyn AudioReader>,
    recognizer_factory: RecognizerFactory,
    normalizer: CueNormalizer,
    serializer: Box<dyn SubtitleSerializer>,
}

impl GenerateSubtitlesUseCase {
    pub fn new(
        reader: Box<dyn AudioReader>,
        recognizer_factory: RecognizerFactory,
        normalizer: CueNormalizer,
        serializer: Box<dyn SubtitleSerializer>,
    ) -> Self {
        Self {
            reader,
            recognizer_factory,
            normalizer,
            serializer,
        }
    }

    pub fn format(&self) -> SubtitleFormat {
        self.serializer.format()
    }

    /// Transcribe the audio of `media_path` and write subtitles to
    /// `output_path`. Returns the number of cues written.
    pub fn execute(
        &self,
        media_path: &Path,
        output_path: &Path,
        logger: &mut dyn PipelineLogger,
    ) -> Result<usize, Box<dyn std::error::Error>> {
        let audio = timed(logger, "decode", || {
            self.reader.read_audio(media_path, WHISPER_SAMPLE_RATE)
        })?
        .ok_or_else(|| PipelineError::NoAudio {
            path: media_path.to_path_buf(),
        })?;

        let recognizer = (self.recognizer_factory)()?;
        logger.info("Generating subtitles with Whisper...");
        let segments = timed(logger, "transcribe", || recognizer.transcribe(&audio))?;
        logger.metric("segments", segments.len() as f64);

        let cues = self.normalizer.normalize(&segments).map_err(PipelineError::from)?;
        logger.metric("cues", cues.len() as f64);

        let body = self.serializer.serialize(&cues);
        fs::write(output_path, body).map_err(|source| PipelineError::Io {
            path: output_path.to_path_buf(),
            source,
        })?;

        Ok(cues.len())
    }
}
