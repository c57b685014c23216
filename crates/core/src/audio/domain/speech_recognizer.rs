use super::audio_segment::AudioSegment;
use crate::subtitles::domain::segment::Segment;

/// Domain interface for speech-to-text transcription.
///
/// Implementations run inference on 16 kHz mono audio and return timed text
/// segments in chronological order.
pub trait SpeechRecognizer: Send {
    fn transcribe(&self, audio: &AudioSegment) -> Result<Vec<Segment>, Box<dyn std::error::Error>>;
}
