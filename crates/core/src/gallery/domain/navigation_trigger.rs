use crate::gallery::domain::gallery_store::GalleryStore;
use crate::shared::constants::RESULT_THRESHOLD;

/// One-shot latch that opens the result screen once enough images exist.
///
/// Fires the first time the observed count reaches the threshold and stays
/// fired for the rest of the session.
#[derive(Clone, Debug)]
pub struct NavigationTrigger {
    threshold: usize,
    fired: bool,
}

impl NavigationTrigger {
    pub fn new(threshold: usize) -> Self {
        Self {
            threshold: threshold.max(1),
            fired: false,
        }
    }

    /// Returns `true` only on the call that flips the latch.
    pub fn evaluate(&mut self, count: usize) -> bool {
        if self.fired || count < self.threshold {
            return false;
        }
        self.fired = true;
        true
    }

    pub fn evaluate_gallery(&mut self, gallery: &GalleryStore) -> bool {
        self.evaluate(gallery.len())
    }

    pub fn is_fired(&self) -> bool {
        self.fired
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }
}

impl Default for NavigationTrigger {
    fn default() -> Self {
        Self::new(RESULT_THRESHOLD)
    }
}
