use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};

use crate::analysis::domain::abnormality_analyzer::AbnormalityAnalyzer;
use crate::detection::domain::face_detector::{DetectorFactory, FaceDetector, FacePresence};
use crate::intake::screening::{screen, DetectionOutcome, ScreeningJob};
use crate::intake::screening_executor::ScreeningExecutor;

/// Screens images on a fixed pool of worker threads.
///
/// Layout: `intake → job queue → N workers [detect, analyze] → outcome queue → intake`
///
/// Each worker builds its own detector from the factory, so inference state
/// is never shared. Dropping the executor closes the job queue and joins
/// every worker.
pub struct ThreadedScreeningExecutor {
    job_tx: Option<Sender<ScreeningJob>>,
    outcome_rx: Receiver<DetectionOutcome>,
    workers: Vec<JoinHandle<()>>,
}

impl ThreadedScreeningExecutor {
    pub fn new(
        workers: usize,
        factory: DetectorFactory,
        analyzer: Arc<dyn AbnormalityAnalyzer>,
    ) -> Self {
        let workers = workers.max(1);
        let (job_tx, job_rx) = crossbeam_channel::unbounded::<ScreeningJob>();
        let (outcome_tx, outcome_rx) = crossbeam_channel::unbounded::<DetectionOutcome>();

        let handles = (0..workers)
            .map(|n| {
                spawn_worker(
                    n,
                    factory.clone(),
                    analyzer.clone(),
                    job_rx.clone(),
                    outcome_tx.clone(),
                )
            })
            .collect();
        log::debug!("Started {workers} screening worker(s)");

        Self {
            job_tx: Some(job_tx),
            outcome_rx,
            workers: handles,
        }
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }
}

impl ScreeningExecutor for ThreadedScreeningExecutor {
    fn submit(&mut self, job: ScreeningJob) -> Result<(), ScreeningJob> {
        match &self.job_tx {
            Some(tx) => tx.send(job).map_err(|e| e.into_inner()),
            None => Err(job),
        }
    }

    fn try_next(&mut self) -> Option<DetectionOutcome> {
        self.outcome_rx.try_recv().ok()
    }

    fn next_timeout(&mut self, timeout: Duration) -> Option<DetectionOutcome> {
        self.outcome_rx.recv_timeout(timeout).ok()
    }
}

impl Drop for ThreadedScreeningExecutor {
    fn drop(&mut self) {
        drop(self.job_tx.take());
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                log::error!("Screening worker panicked");
            }
        }
    }
}

fn spawn_worker(
    n: usize,
    factory: DetectorFactory,
    analyzer: Arc<dyn AbnormalityAnalyzer>,
    job_rx: Receiver<ScreeningJob>,
    outcome_tx: Sender<DetectionOutcome>,
) -> JoinHandle<()> {
    std::thread::spawn(move || {
        let mut detector: Result<Box<dyn FaceDetector>, String> =
            factory().map_err(|e| e.to_string());
        if let Err(e) = &detector {
            log::error!("Screening worker {n} could not load a face detector: {e}");
        }

        for job in job_rx {
            let outcome = match detector.as_mut() {
                Ok(detector) => screen(&mut **detector, analyzer.as_ref(), &job),
                Err(e) => DetectionOutcome {
                    id: job.id,
                    presence: FacePresence::Failed(e.clone()),
                    abnormalities: Vec::new(),
                },
            };
            if outcome_tx.send(outcome).is_err() {
                break;
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::infrastructure::placeholder_analyzer::PlaceholderAnalyzer;
    use crate::gallery::domain::image_record::ImageId;
    use crate::intake::screening::test_support::*;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const WAIT: Duration = Duration::from_secs(5);

    fn job(id: u64, marker: u8) -> ScreeningJob {
        ScreeningJob {
            id: ImageId(id),
            image: Arc::new(marker_frame(marker)),
        }
    }

    fn executor(workers: usize, factory: DetectorFactory) -> ThreadedScreeningExecutor {
        ThreadedScreeningExecutor::new(workers, factory, Arc::new(PlaceholderAnalyzer::new()))
    }

    #[test]
    fn test_every_job_yields_one_tagged_outcome() {
        let mut exec = executor(3, marker_factory());
        for id in 0..6 {
            exec.submit(job(id, if id % 2 == 0 { FACE } else { NO_FACE }))
                .unwrap();
        }

        let mut seen = HashSet::new();
        for _ in 0..6 {
            let outcome = exec.next_timeout(WAIT).expect("outcome");
            assert_eq!(outcome.presence.is_present(), outcome.id.0 % 2 == 0);
            assert!(seen.insert(outcome.id));
        }
        assert!(exec.try_next().is_none());
    }

    #[test]
    fn test_each_worker_builds_its_own_detector() {
        let built = Arc::new(AtomicUsize::new(0));
        let exec = executor(4, counting_factory(built.clone()));
        assert_eq!(exec.worker_count(), 4);
        drop(exec);
        assert_eq!(built.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_zero_workers_clamped_to_one() {
        let mut exec = executor(0, marker_factory());
        assert_eq!(exec.worker_count(), 1);
        exec.submit(job(1, FACE)).unwrap();
        assert!(exec.next_timeout(WAIT).is_some());
    }

    #[test]
    fn test_factory_failure_answers_jobs_as_failed() {
        let factory: DetectorFactory = Arc::new(|| Err("model missing".into()));
        let mut exec = executor(1, factory);
        exec.submit(job(3, FACE)).unwrap();

        let outcome = exec.next_timeout(WAIT).expect("outcome");
        assert_eq!(outcome.id, ImageId(3));
        assert_eq!(outcome.presence, FacePresence::Failed("model missing".into()));
    }

    #[test]
    fn test_next_timeout_returns_none_when_idle() {
        let mut exec = executor(1, marker_factory());
        assert!(exec.next_timeout(Duration::from_millis(20)).is_none());
    }
}
