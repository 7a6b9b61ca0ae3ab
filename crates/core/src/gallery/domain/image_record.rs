use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::shared::frame::Frame;

/// Identity of an accepted image. Assigned once by the gallery, never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImageId(pub u64);

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where an image entered the session from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImageSource {
    Camera,
    Gallery(PathBuf),
}

impl fmt::Display for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageSource::Camera => write!(f, "camera"),
            ImageSource::Gallery(path) => write!(f, "{}", path.display()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImageStatus {
    Processing,
    Processed,
    Invalid(String),
}

/// One accepted image and what face screening concluded about it.
///
/// `abnormalities` is `Some` exactly when `status` is `Processed`.
#[derive(Clone, Debug)]
pub struct ImageRecord {
    pub id: ImageId,
    pub image: Arc<Frame>,
    pub source: ImageSource,
    pub status: ImageStatus,
    pub abnormalities: Option<Vec<String>>,
}

impl ImageRecord {
    pub fn new(id: ImageId, image: Arc<Frame>, source: ImageSource) -> Self {
        Self {
            id,
            image,
            source,
            status: ImageStatus::Processing,
            abnormalities: None,
        }
    }

    pub fn is_processing(&self) -> bool {
        self.status == ImageStatus::Processing
    }

    pub fn status_text(&self) -> String {
        match &self.status {
            ImageStatus::Processing => "Processing".to_string(),
            ImageStatus::Processed => "Processed".to_string(),
            ImageStatus::Invalid(reason) => format!("Invalid: {reason}"),
        }
    }
}
