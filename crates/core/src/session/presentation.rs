use std::sync::Arc;

use crate::gallery::domain::gallery_store::GallerySnapshot;
use crate::shared::frame::Frame;

/// Everything a frontend needs to draw one frame of UI.
///
/// Built fresh on every call; holding one never blocks the session.
#[derive(Clone, Debug)]
pub struct PresentationState {
    pub images: GallerySnapshot,
    pub show_results: bool,
    pub face_in_view: bool,
    pub capture_active: bool,
    pub preview_frame: Option<Arc<Frame>>,
    pub alert: Option<String>,
}

impl PresentationState {
    /// Status text and labels per image, in gallery order.
    pub fn result_lines(&self) -> Vec<(String, Vec<String>)> {
        self.images
            .records()
            .iter()
            .map(|r| (r.status_text(), r.abnormalities.clone().unwrap_or_default()))
            .collect()
    }
}
