use std::path::PathBuf;

use crate::capture::domain::capture_error::PickError;
use crate::shared::frame::Frame;

#[derive(Clone, Debug)]
pub struct PickedImage {
    pub path: PathBuf,
    pub image: Frame,
}

/// Lets the user choose zero or more still images.
///
/// Each item loads independently: one bad file yields one `Err` and does
/// not affect its neighbours. An empty result is a valid cancel.
pub trait GalleryPicker {
    fn pick_many(&mut self) -> Vec<Result<PickedImage, PickError>>;
}
