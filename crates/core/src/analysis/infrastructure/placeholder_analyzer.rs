use crate::analysis::domain::abnormality_analyzer::AbnormalityAnalyzer;
use crate::shared::frame::Frame;
use crate::shared::region::Region;

pub const PLACEHOLDER_LABELS: &[&str] = &["Mock Abnormality 1", "Mock Abnormality 2"];

/// Stand-in analyzer that reports the same fixed labels for every image.
///
/// No diagnostic model exists yet; swap this out for a real
/// [`AbnormalityAnalyzer`] once one does.
#[derive(Clone, Debug)]
pub struct PlaceholderAnalyzer {
    labels: Vec<String>,
}

impl PlaceholderAnalyzer {
    pub fn new() -> Self {
        Self::with_labels(PLACEHOLDER_LABELS.iter().map(|s| s.to_string()).collect())
    }

    pub fn with_labels(labels: Vec<String>) -> Self {
        Self { labels }
    }
}

impl Default for PlaceholderAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl AbnormalityAnalyzer for PlaceholderAnalyzer {
    fn analyze(&self, _image: &Frame, _faces: &[Region]) -> Vec<String> {
        self.labels.clone()
    }
}
