use crate::shared::frame::Frame;
use crate::shared::region::Region;

/// Produces diagnostic labels for an image that passed face screening.
///
/// Called from detection workers, so implementations must be shareable
/// across threads. Only invoked for images with at least one face.
pub trait AbnormalityAnalyzer: Send + Sync {
    fn analyze(&self, image: &Frame, faces: &[Region]) -> Vec<String>;
}
