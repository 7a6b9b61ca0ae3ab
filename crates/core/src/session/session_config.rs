use std::time::Duration;

use crate::preview::live_preview::DEFAULT_FRAME_INTERVAL;
use crate::shared::constants::{DEFAULT_DETECTION_WORKERS, RESULT_THRESHOLD};

/// Tunables for one screening session.
///
/// Detector settings such as the confidence threshold travel with the
/// `DetectorFactory`, not here.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionConfig {
    /// Gallery size that unlocks the result screen.
    pub threshold: usize,
    /// Detection worker threads for still images.
    pub workers: usize,
    pub frame_interval: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            threshold: RESULT_THRESHOLD,
            workers: DEFAULT_DETECTION_WORKERS,
            frame_interval: DEFAULT_FRAME_INTERVAL,
        }
    }
}
