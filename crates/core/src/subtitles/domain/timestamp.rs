/// Format seconds as `HH:MM:SS{separator}mmm`.
///
/// Rounds to the nearest millisecond. Negative input (only reachable through
/// a degenerate cue) renders as zero. Hours are not wrapped at 24.
pub fn format_timestamp(seconds: f64, separator: char) -> String {
    let total_ms = if seconds.is_finite() && seconds > 0.0 {
        (seconds * 1000.0).round() as u64
    } else {
        0
    };
    let ms = total_ms % 1000;
    let total_secs = total_ms / 1000;
    let secs = total_secs % 60;
    let total_mins = total_secs / 60;
    let mins = total_mins % 60;
    let hours = total_mins / 60;

    format!("{hours:02}:{mins:02}:{secs:02}{separator}{ms:03}")
}

/// SubRip timestamp (HH:MM:SS,mmm).
pub fn format_srt_time(seconds: f64) -> String {
    format_timestamp(seconds, ',')
}

/// WebVTT timestamp (HH:MM:SS.mmm).
pub fn format_vtt_time(seconds: f64) -> String {
    format_timestamp(seconds, '.')
}

/// Round to millisecond precision.
pub fn round_millis(seconds: f64) -> f64 {
    (seconds * 1000.0).round() / 1000.0
}

/// Truncate toward negative infinity at millisecond precision.
pub fn floor_millis(seconds: f64) -> f64 {
    (seconds * 1000.0).floor() / 1000.0
}
