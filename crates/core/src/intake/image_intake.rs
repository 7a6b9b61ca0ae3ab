use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::gallery::domain::gallery_store::{
    CommandEffect, GalleryCommand, GallerySnapshot, GalleryStore, ScreeningVerdict,
};
use crate::gallery::domain::image_record::{ImageId, ImageSource};
use crate::gallery::domain::navigation_trigger::NavigationTrigger;
use crate::intake::screening::{DetectionOutcome, ScreeningJob};
use crate::intake::screening_executor::ScreeningExecutor;
use crate::intake::session_logger::SessionLogger;
use crate::shared::constants::NO_FACE_REASON;
use crate::shared::frame::Frame;

/// Accepts images into the gallery and folds screening outcomes back in.
///
/// This is the only owner of the gallery. Images are appended as
/// `Processing` the moment they arrive; their verdicts are applied later,
/// one at a time, by [`pump`](Self::pump) or [`wait_idle`](Self::wait_idle).
/// The navigation latch is re-evaluated after every gallery change.
pub struct ImageIntake {
    store: GalleryStore,
    trigger: NavigationTrigger,
    executor: Box<dyn ScreeningExecutor>,
    logger: Box<dyn SessionLogger>,
}

impl ImageIntake {
    pub fn new(
        executor: Box<dyn ScreeningExecutor>,
        trigger: NavigationTrigger,
        logger: Box<dyn SessionLogger>,
    ) -> Self {
        Self {
            store: GalleryStore::new(),
            trigger,
            executor,
            logger,
        }
    }

    /// Appends `image` as processing and queues it for screening.
    pub fn accept(&mut self, image: Frame, source: ImageSource) -> ImageId {
        let image = Arc::new(image);
        let id = self
            .store
            .apply(GalleryCommand::Append {
                image: image.clone(),
                source: source.clone(),
            })
            .id();
        self.logger.accepted(id, &source);
        self.check_navigation();

        if let Err(job) = self.executor.submit(ScreeningJob { id, image }) {
            log::warn!("Screening unavailable, rejecting image {}", job.id);
            self.resolve(job.id, reject());
        }
        id
    }

    /// Applies every outcome that has already arrived. Never blocks.
    ///
    /// Returns the number of images whose status changed.
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        while let Some(outcome) = self.executor.try_next() {
            if self.apply_outcome(outcome) {
                applied += 1;
            }
        }
        applied
    }

    /// Blocks until no image is processing or `timeout` elapses.
    ///
    /// Returns `true` if the gallery settled.
    pub fn wait_idle(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        self.pump();
        while self.store.pending() > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            match self.executor.next_timeout(remaining) {
                Some(outcome) => {
                    self.apply_outcome(outcome);
                }
                None => break,
            }
        }
        self.store.pending() == 0
    }

    pub fn snapshot(&self) -> GallerySnapshot {
        self.store.snapshot()
    }

    /// Whether the result screen has been unlocked.
    pub fn show_results(&self) -> bool {
        self.trigger.is_fired()
    }

    pub fn pending(&self) -> usize {
        self.store.pending()
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn logger(&self) -> &dyn SessionLogger {
        self.logger.as_ref()
    }

    fn apply_outcome(&mut self, outcome: DetectionOutcome) -> bool {
        let id = outcome.id;
        self.resolve(id, outcome.verdict())
    }

    fn resolve(&mut self, id: ImageId, verdict: ScreeningVerdict) -> bool {
        match self.store.apply(GalleryCommand::Resolve { id, verdict }) {
            CommandEffect::Resolved(id) => {
                if let Some(record) = self.store.get(id) {
                    self.logger.resolved(id, &record.status);
                }
                self.check_navigation();
                true
            }
            _ => {
                log::debug!("Ignoring outcome for image {id}: unknown or already resolved");
                false
            }
        }
    }

    fn check_navigation(&mut self) {
        if self.trigger.evaluate_gallery(&self.store) {
            self.logger.navigation(self.store.len());
        }
    }
}

fn reject() -> ScreeningVerdict {
    ScreeningVerdict::Rejected {
        reason: NO_FACE_REASON.to_string(),
    }
}
