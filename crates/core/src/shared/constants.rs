pub const BLAZEFACE_MODEL_NAME: &str = "blazeface_short_range.onnx";
pub const BLAZEFACE_MODEL_URL: &str =
    "https://github.com/neutrinographics/faceguard/releases/download/v0.1.0/blazeface_short_range.onnx";

/// Number of gallery images that opens the result screen.
pub const RESULT_THRESHOLD: usize = 10;

/// Reason attached to images in which no face was found.
pub const NO_FACE_REASON: &str = "No face detected";

/// Alert shown when "take photo" is pressed without a face in view.
pub const NO_FACE_IN_VIEW_MESSAGE: &str = "No face detected, cannot take photo.";

pub const DEFAULT_DETECTION_WORKERS: usize = 2;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];
