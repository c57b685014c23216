use std::path::Path;

use ffmpeg_next::format::sample::Type as SampleType;
use ffmpeg_next::format::Sample;
use ffmpeg_next::software::resampling;
use ffmpeg_next::util::frame::audio::Audio;
use ffmpeg_next::{codec, media, ChannelLayout};

use crate::audio::domain::audio_reader::AudioReader;
use crate::audio::domain::audio_segment::AudioSegment;

/// Decodes the best audio stream of a media file into mono f32 PCM using
/// ffmpeg-next. Works for audio-only downloads and merged video files alike.
pub struct FfmpegAudioReader;

impl AudioReader for FfmpegAudioReader {
    fn read_audio(
        &self,
        path: &Path,
        target_sample_rate: u32,
    ) -> Result<Option<AudioSegment>, Box<dyn std::error::Error>> {
        ffmpeg_next::init()?;

        let mut ictx = ffmpeg_next::format::input(path)?;

        let (stream_index, parameters) = match ictx.streams().best(media::Type::Audio) {
            Some(stream) => (stream.index(), stream.parameters()),
            None => {
                log::warn!("No audio stream in {}", path.display());
                return Ok(None);
            }
        };

        let mut decoder = codec::context::Context::from_parameters(parameters)?
            .decoder()
            .audio()?;

        let mut resampler = resampling::Context::get(
            decoder.format(),
            decoder.channel_layout(),
            decoder.rate(),
            Sample::F32(SampleType::Planar),
            ChannelLayout::MONO,
            target_sample_rate,
        )?;

        let mut samples: Vec<f32> = Vec::new();
        let mut decoded = Audio::empty();
        let mut resampled = Audio::empty();

        let mut drain = |decoder: &mut ffmpeg_next::decoder::Audio,
                         samples: &mut Vec<f32>|
         -> Result<(), ffmpeg_next::Error> {
            while decoder.receive_frame(&mut decoded).is_ok() {
                resampler.run(&decoded, &mut resampled)?;
                append_mono_samples(&resampled, samples);
            }
            Ok(())
        };

        for (stream, packet) in ictx.packets() {
            if stream.index() != stream_index {
                continue;
            }
            decoder.send_packet(&packet)?;
            drain(&mut decoder, &mut samples)?;
        }

        decoder.send_eof()?;
        drain(&mut decoder, &mut samples)?;

        // The resampler may still hold buffered samples
        if let Ok(Some(delay)) = resampler.flush(&mut resampled) {
            if delay.output > 0 {
                append_mono_samples(&resampled, &mut samples);
            }
        }

        let audio = AudioSegment::new(samples, target_sample_rate, 1);
        log::info!(
            "Decoded {:.1}s of audio from {}",
            audio.duration(),
            path.display()
        );
        Ok(Some(audio))
    }
}

/// Append f32 samples from a planar mono frame.
fn append_mono_samples(frame: &Audio, out: &mut Vec<f32>) {
    let num_samples = frame.samples();
    if num_samples == 0 {
        return;
    }
    let data = frame.data(0);
    let floats = unsafe { std::slice::from_raw_parts(data.as_ptr() as *const f32, num_samples) };
    out.extend_from_slice(floats);
}
