//! Observability sink used by the engine.

/// Target of progress events, so subscribers can render them separately.
pub const PROGRESS_TARGET: &str = "scenepath::progress";

/// Receives log messages and progress updates from a run.
pub trait Reporter {
    fn info(&self, message: &str);
    fn warn(&self, message: &str);
    fn debug(&self, message: &str);
    /// Fraction of the run completed, in `[0, 1]`.
    fn progress(&self, fraction: f64);
}

/// [`Reporter`] that forwards everything to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn info(&self, message: &str) {
        tracing::info!("{}", message);
    }

    fn warn(&self, message: &str) {
        tracing::warn!("{}", message);
    }

    fn debug(&self, message: &str) {
        tracing::debug!("{}", message);
    }

    fn progress(&self, fraction: f64) {
        let progress = fraction.clamp(0.0, 1.0);
        tracing::info!(target: PROGRESS_TARGET, progress, "{:.0}% complete", progress * 100.0);
    }
}
