use crate::shared::constants::WHISPER_SAMPLE_RATE;

/// PCM audio decoded from a downloaded file, ready to hand to a recognizer.
///
/// Samples are interleaved f32 in [-1.0, 1.0]. The reader produces mono at
/// the requested rate, so in practice this is 16 kHz mono.
#[derive(Clone, Debug)]
pub struct AudioSegment {
    samples: Vec<f32>,
    sample_rate: u32,
    channels: u16,
}

impl AudioSegment {
    pub fn new(samples: Vec<f32>, sample_rate: u32, channels: u16) -> Self {
        Self {
            samples,
            sample_rate,
            channels,
        }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// True when there is nothing to transcribe.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Whisper only accepts 16 kHz mono input.
    pub fn is_whisper_ready(&self) -> bool {
        self.sample_rate == WHISPER_SAMPLE_RATE && self.channels == 1
    }

    /// Length in seconds, used for progress logging.
    pub fn duration(&self) -> f64 {
        if self.sample_rate == 0 || self.channels == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / (self.sample_rate as f64 * self.channels as f64)
    }
}
