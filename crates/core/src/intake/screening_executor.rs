use std::time::Duration;

use crate::intake::screening::{DetectionOutcome, ScreeningJob};

/// Abstracts where face screening runs.
///
/// This is a port. Jobs go in through [`submit`](ScreeningExecutor::submit);
/// outcomes come back tagged with their image id, in completion order, and
/// are drained by the single routine that owns the gallery.
pub trait ScreeningExecutor: Send {
    /// Queues a job. Returns the job back if the executor can no longer
    /// accept work.
    fn submit(&mut self, job: ScreeningJob) -> Result<(), ScreeningJob>;

    /// Next finished outcome, if any, without blocking.
    fn try_next(&mut self) -> Option<DetectionOutcome>;

    /// Waits up to `timeout` for the next finished outcome.
    fn next_timeout(&mut self, timeout: Duration) -> Option<DetectionOutcome>;
}
