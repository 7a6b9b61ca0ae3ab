use std::collections::HashMap;
use std::time::Instant;

use crate::gallery::domain::image_record::{ImageId, ImageSource, ImageStatus};

/// Cross-cutting observer for intake events.
///
/// Keeps the intake use case free of output concerns. Both frontends install
/// [`LogSessionLogger`]; tests use [`NullSessionLogger`].
pub trait SessionLogger: Send {
    fn accepted(&mut self, id: ImageId, source: &ImageSource);

    fn resolved(&mut self, id: ImageId, status: &ImageStatus);

    /// The result screen was unlocked with `count` images in the gallery.
    fn navigation(&mut self, count: usize);

    /// Emit an end-of-session summary. Default: no-op.
    fn summary(&self) {}
}

pub struct NullSessionLogger;

impl SessionLogger for NullSessionLogger {
    fn accepted(&mut self, _id: ImageId, _source: &ImageSource) {}
    fn resolved(&mut self, _id: ImageId, _status: &ImageStatus) {}
    fn navigation(&mut self, _count: usize) {}
}

/// Logger that reports each transition via `log` and keeps enough state
/// for a closing summary (outcome counts, screening latency).
pub struct LogSessionLogger {
    started: HashMap<ImageId, Instant>,
    latencies_ms: Vec<f64>,
    accepted: usize,
    processed: usize,
    invalid: usize,
    navigated_at: Option<usize>,
    session_start: Instant,
}

impl LogSessionLogger {
    pub fn new() -> Self {
        Self {
            started: HashMap::new(),
            latencies_ms: Vec::new(),
            accepted: 0,
            processed: 0,
            invalid: 0,
            navigated_at: None,
            session_start: Instant::now(),
        }
    }

    /// Returns the formatted summary, or `None` if nothing was accepted.
    pub fn summary_string(&self) -> Option<String> {
        if self.accepted == 0 {
            return None;
        }
        let elapsed = self.session_start.elapsed().as_secs_f64();
        let mut lines = vec![format!(
            "Session summary ({} images, {elapsed:.1}s):",
            self.accepted
        )];
        lines.push(format!("  processed: {}", self.processed));
        lines.push(format!("  invalid:   {}", self.invalid));
        let pending = self.accepted - self.processed - self.invalid;
        if pending > 0 {
            lines.push(format!("  pending:   {pending}"));
        }
        if !self.latencies_ms.is_empty() {
            let avg = self.latencies_ms.iter().sum::<f64>() / self.latencies_ms.len() as f64;
            let max = self.latencies_ms.iter().cloned().fold(0.0, f64::max);
            lines.push(format!("  screening: avg {avg:.1}ms  max {max:.1}ms"));
        }
        match self.navigated_at {
            Some(count) => lines.push(format!("  results unlocked at {count} images")),
            None => lines.push("  results not unlocked".to_string()),
        }
        Some(lines.join("\n"))
    }
}

impl Default for LogSessionLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionLogger for LogSessionLogger {
    fn accepted(&mut self, id: ImageId, source: &ImageSource) {
        self.accepted += 1;
        self.started.insert(id, Instant::now());
        log::info!("Accepted image {id} from {source}");
    }

    fn resolved(&mut self, id: ImageId, status: &ImageStatus) {
        match status {
            ImageStatus::Processed => self.processed += 1,
            ImageStatus::Invalid(_) => self.invalid += 1,
            ImageStatus::Processing => return,
        }
        let latency = self
            .started
            .remove(&id)
            .map(|t| t.elapsed().as_secs_f64() * 1000.0);
        if let Some(ms) = latency {
            self.latencies_ms.push(ms);
        }
        log::info!("Image {id}: {status:?}");
    }

    fn navigation(&mut self, count: usize) {
        self.navigated_at = Some(count);
        log::info!("Result screen unlocked ({count} images)");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n\n{text}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_logger_all_methods_are_noop() {
        let mut logger = NullSessionLogger;
        logger.accepted(ImageId(0), &ImageSource::Camera);
        logger.resolved(ImageId(0), &ImageStatus::Processed);
        logger.navigation(10);
        logger.summary();
    }

    #[test]
    fn test_empty_summary_returns_none() {
        assert!(LogSessionLogger::new().summary_string().is_none());
    }

    #[test]
    fn test_summary_counts_outcomes() {
        let mut logger = LogSessionLogger::new();
        for i in 0..3 {
            logger.accepted(ImageId(i), &ImageSource::Camera);
        }
        logger.resolved(ImageId(0), &ImageStatus::Processed);
        logger.resolved(ImageId(1), &ImageStatus::Invalid("No face detected".into()));

        let summary = logger.summary_string().unwrap();
        assert!(summary.contains("3 images"));
        assert!(summary.contains("processed: 1"));
        assert!(summary.contains("invalid:   1"));
        assert!(summary.contains("pending:   1"));
        assert!(summary.contains("screening: avg"));
        assert!(summary.contains("results not unlocked"));
    }

    #[test]
    fn test_summary_reports_navigation() {
        let mut logger = LogSessionLogger::new();
        logger.accepted(ImageId(0), &ImageSource::Camera);
        logger.navigation(10);
        assert!(logger
            .summary_string()
            .unwrap()
            .contains("results unlocked at 10 images"));
    }

    #[test]
    fn test_latency_recorded_once_per_image() {
        let mut logger = LogSessionLogger::new();
        logger.accepted(ImageId(4), &ImageSource::Camera);
        logger.resolved(ImageId(4), &ImageStatus::Processed);
        logger.resolved(ImageId(4), &ImageStatus::Processed);
        assert_eq!(logger.latencies_ms.len(), 1);
    }
}
