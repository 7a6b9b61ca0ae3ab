use crate::shared::frame::Frame;
use crate::shared::region::Region;

/// Domain interface for face detection.
///
/// Implementations may hold per-instance inference state, hence `&mut self`.
/// Each worker thread owns its own detector.
pub trait FaceDetector: Send {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Region>, Box<dyn std::error::Error>>;
}

/// Builds a fresh detector for each worker thread that needs one.
pub type DetectorFactory =
    std::sync::Arc<dyn Fn() -> Result<Box<dyn FaceDetector>, Box<dyn std::error::Error>> + Send + Sync>;

/// Boolean view of a detection call, the only answer intake cares about.
#[derive(Clone, Debug, PartialEq)]
pub enum FacePresence {
    Present(Vec<Region>),
    Absent,
    /// The detector itself failed; callers treat this like `Absent`.
    Failed(String),
}

impl FacePresence {
    pub fn of(detector: &mut dyn FaceDetector, frame: &Frame) -> Self {
        match detector.detect(frame) {
            Ok(regions) if regions.is_empty() => FacePresence::Absent,
            Ok(regions) => FacePresence::Present(regions),
            Err(e) => FacePresence::Failed(e.to_string()),
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, FacePresence::Present(_))
    }
}
