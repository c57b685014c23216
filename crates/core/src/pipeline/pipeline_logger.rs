use std::collections::BTreeMap;
use std::time::Instant;

/// Cross-cutting logger for pipeline orchestration events.
///
/// Lets use cases report what they are doing without binding them to a
/// particular output (the `log` crate for the CLI, nothing for tests).
pub trait PipelineLogger: Send {
    /// Record how long a named stage (download, transcribe, ...) took.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// Record a point-in-time count (segments, cues, ...).
    fn metric(&mut self, name: &str, value: f64);

    /// Log a human-readable status message.
    fn info(&mut self, message: &str);

    /// Emit an end-of-run summary. Default: no-op.
    fn summary(&self) {}
}

/// Run `f`, reporting its wall-clock duration under `stage`.
pub fn timed<T>(logger: &mut dyn PipelineLogger, stage: &str, f: impl FnOnce() -> T) -> T {
    let start = Instant::now();
    let result = f();
    logger.timing(stage, start.elapsed().as_secs_f64() * 1000.0);
    result
}

/// Silent logger that discards all events.
pub struct NullPipelineLogger;

impl PipelineLogger for NullPipelineLogger {
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn metric(&mut self, _name: &str, _value: f64) {}
    fn info(&mut self, _message: &str) {}
}

/// CLI logger: forwards messages to `log` and summarizes stage timings.
pub struct LogPipelineLogger {
    timings: BTreeMap<String, f64>,
    metrics: BTreeMap<String, f64>,
    start_time: Instant,
}

impl LogPipelineLogger {
    pub fn new() -> Self {
        Self {
            timings: BTreeMap::new(),
            metrics: BTreeMap::new(),
            start_time: Instant::now(),
        }
    }

    /// Returns the formatted summary string, or `None` if no data recorded.
    pub fn summary_string(&self) -> Option<String> {
        if self.timings.is_empty() && self.metrics.is_empty() {
            return None;
        }

        let elapsed_ms = self.start_time.elapsed().as_secs_f64() * 1000.0;
        let mut lines = vec![format!("Run summary ({:.1}s total):", elapsed_ms / 1000.0)];

        for (stage, total_ms) in &self.timings {
            lines.push(format!("  {stage:12}: {:7.1}s", total_ms / 1000.0));
        }
        for (name, value) in &self.metrics {
            lines.push(format!("  {name}: {value}"));
        }

        Some(lines.join("\n"))
    }

    /// Total time recorded for a stage, in milliseconds.
    pub fn timing_for(&self, stage: &str) -> Option<f64> {
        self.timings.get(stage).copied()
    }

    /// Latest value recorded for a metric.
    pub fn metric_for(&self, name: &str) -> Option<f64> {
        self.metrics.get(name).copied()
    }
}

impl Default for LogPipelineLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineLogger for LogPipelineLogger {
    fn timing(&mut self, stage: &str, duration_ms: f64) {
        *self.timings.entry(stage.to_string()).or_default() += duration_ms;
    }

    fn metric(&mut self, name: &str, value: f64) {
        self.metrics.insert(name.to_string(), value);
    }

    fn info(&mut self, message: &str) {
        log::info!("{message}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n\n{text}");
        }
    }
}
