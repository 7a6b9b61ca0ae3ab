use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use crate::analysis::domain::abnormality_analyzer::AbnormalityAnalyzer;
use crate::detection::domain::face_detector::FaceDetector;
use crate::intake::screening::{screen, DetectionOutcome, ScreeningJob};
use crate::intake::screening_executor::ScreeningExecutor;

/// Screens each image synchronously inside `submit`.
///
/// Outcomes are still queued and only reach the gallery on the next drain,
/// so callers observe the same processing-then-resolved sequence as with the
/// threaded executor.
pub struct InlineScreeningExecutor {
    detector: Box<dyn FaceDetector>,
    analyzer: Arc<dyn AbnormalityAnalyzer>,
    finished: VecDeque<DetectionOutcome>,
}

impl InlineScreeningExecutor {
    pub fn new(detector: Box<dyn FaceDetector>, analyzer: Arc<dyn AbnormalityAnalyzer>) -> Self {
        Self {
            detector,
            analyzer,
            finished: VecDeque::new(),
        }
    }
}

impl ScreeningExecutor for InlineScreeningExecutor {
    fn submit(&mut self, job: ScreeningJob) -> Result<(), ScreeningJob> {
        let outcome = screen(self.detector.as_mut(), self.analyzer.as_ref(), &job);
        self.finished.push_back(outcome);
        Ok(())
    }

    fn try_next(&mut self) -> Option<DetectionOutcome> {
        self.finished.pop_front()
    }

    fn next_timeout(&mut self, _timeout: Duration) -> Option<DetectionOutcome> {
        self.finished.pop_front()
    }
}
