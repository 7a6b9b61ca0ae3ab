use std::path::Path;

use image::{DynamicImage, ImageDecoder, ImageReader};

use crate::capture::domain::capture_error::PickError;
use crate::shared::constants::IMAGE_EXTENSIONS;
use crate::shared::frame::Frame;

pub fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Decodes an image file into an RGB [`Frame`], applying EXIF orientation
/// so portrait phone photos reach the detector upright.
pub fn load_image(path: &Path, index: usize) -> Result<Frame, PickError> {
    if !is_image(path) {
        return Err(PickError::Unsupported(path.to_path_buf()));
    }
    let load_err = |message: String| PickError::Load {
        path: path.to_path_buf(),
        message,
    };

    let mut decoder = ImageReader::open(path)
        .map_err(|e| load_err(e.to_string()))?
        .with_guessed_format()
        .map_err(|e| load_err(e.to_string()))?
        .into_decoder()
        .map_err(|e| load_err(e.to_string()))?;
    let orientation = decoder
        .orientation()
        .map_err(|e| load_err(e.to_string()))?;
    let mut image = DynamicImage::from_decoder(decoder).map_err(|e| load_err(e.to_string()))?;
    image.apply_orientation(orientation);

    let frame = Frame::from_rgb_image(image.to_rgb8(), index);
    if frame.is_empty() {
        return Err(load_err("image has no pixels".into()));
    }
    Ok(frame)
}
