use thiserror::Error;

use super::cue_text;
use super::segment::{Cue, Segment};
use super::timestamp::{floor_millis, round_millis};

/// Minimum time a cue stays on screen, in seconds.
pub const DEFAULT_MIN_DURATION: f64 = 2.0;
/// Back-off left between a clamped cue and the next one, in seconds.
pub const OVERLAP_GAP: f64 = 0.1;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum NormalizeError {
    #[error("no segments to build subtitles from")]
    EmptyInput,
    #[error("segment {index} starts at {start}s, before the previous segment at {previous_start}s")]
    UnsortedInput {
        index: usize,
        start: f64,
        previous_start: f64,
    },
    #[error("segment {index} has a non-finite timestamp")]
    NonFiniteTimestamp { index: usize },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NormalizeOptions {
    pub min_duration: f64,
    pub auto_merge: bool,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            min_duration: DEFAULT_MIN_DURATION,
            auto_merge: true,
        }
    }
}

/// Turns raw recognizer segments into readable, non-overlapping cues.
///
/// Two passes run over the input:
/// 1. Merge (optional): a short pending cue absorbs the following segment
///    until it lasts at least `min_duration`.
/// 2. Repair: text cleanup, minimum-duration extension, then clamping against
///    the next cue's start with an `OVERLAP_GAP` back-off. This is a single
///    forward pass; a cue is only ever compared with its successor's start,
///    which the pass never changes.
///
/// Input must be sorted by `start`. Unsorted input is rejected instead of
/// producing merges across out-of-order segments.
#[derive(Clone, Copy, Debug, Default)]
pub struct CueNormalizer {
    options: NormalizeOptions,
}

impl CueNormalizer {
    pub fn new(options: NormalizeOptions) -> Self {
        Self { options }
    }

    pub fn normalize(&self, segments: &[Segment]) -> Result<Vec<Cue>, NormalizeError> {
        validate(segments)?;

        let min_duration = self.options.min_duration;
        let cues = if self.options.auto_merge {
            merge_short_segments(segments, min_duration)
        } else {
            segments.iter().map(Cue::from).collect()
        };

        Ok(repair_timing(cues, min_duration))
    }
}

/// Shorthand for `CueNormalizer::new(..).normalize(..)`.
pub fn normalize(
    segments: &[Segment],
    min_duration: f64,
    auto_merge: bool,
) -> Result<Vec<Cue>, NormalizeError> {
    CueNormalizer::new(NormalizeOptions {
        min_duration,
        auto_merge,
    })
    .normalize(segments)
}

fn validate(segments: &[Segment]) -> Result<(), NormalizeError> {
    if segments.is_empty() {
        return Err(NormalizeError::EmptyInput);
    }

    for (index, segment) in segments.iter().enumerate() {
        if !segment.start.is_finite() || !segment.end.is_finite() {
            return Err(NormalizeError::NonFiniteTimestamp { index });
        }
        if index > 0 {
            let previous_start = segments[index - 1].start;
            if segment.start < previous_start {
                return Err(NormalizeError::UnsortedInput {
                    index,
                    start: segment.start,
                    previous_start,
                });
            }
        }
    }

    Ok(())
}

fn merge_short_segments(segments: &[Segment], min_duration: f64) -> Vec<Cue> {
    let Some((first, rest)) = segments.split_first() else {
        return Vec::new();
    };

    let (mut merged, pending) = rest.iter().fold(
        (Vec::with_capacity(segments.len()), Cue::from(first)),
        |(mut merged, pending), segment| {
            if pending.duration() < min_duration {
                let text = format!("{} {}", pending.text.trim(), segment.text.trim());
                (merged, Cue::new(pending.start, segment.end, text))
            } else {
                merged.push(pending);
                (merged, Cue::from(segment))
            }
        },
    );
    merged.push(pending);

    log::debug!(
        "Merged {} segments into {} cues",
        segments.len(),
        merged.len()
    );
    merged
}

fn repair_timing(cues: Vec<Cue>, min_duration: f64) -> Vec<Cue> {
    let starts: Vec<f64> = cues.iter().map(|c| c.start).collect();

    cues.into_iter()
        .enumerate()
        .map(|(index, cue)| repair_cue(index, cue, starts.get(index + 1).copied(), min_duration))
        .collect()
}

fn repair_cue(index: usize, cue: Cue, next_start: Option<f64>, min_duration: f64) -> Cue {
    let mut end = cue.end;

    if end - cue.start < min_duration {
        end = cue.start + min_duration;
    }

    if let Some(next_start) = next_start {
        if end > next_start {
            end = next_start - OVERLAP_GAP;
        }
    }

    let mut rounded = round_millis(end);
    if let Some(next_start) = next_start {
        if rounded > next_start {
            rounded = floor_millis(end);
        }
    }

    let repaired = Cue::new(cue.start, rounded, cue_text::clean(&cue.text));
    if repaired.is_degenerate() {
        log::warn!(
            "Cue {} ends before it starts ({:.3}s < {:.3}s) after overlap repair",
            index + 1,
            repaired.end,
            repaired.start
        );
    }
    repaired
}
