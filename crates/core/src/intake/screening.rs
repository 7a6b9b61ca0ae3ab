use std::sync::Arc;

use crate::analysis::domain::abnormality_analyzer::AbnormalityAnalyzer;
use crate::detection::domain::face_detector::{FaceDetector, FacePresence};
use crate::gallery::domain::gallery_store::ScreeningVerdict;
use crate::gallery::domain::image_record::ImageId;
use crate::shared::constants::NO_FACE_REASON;
use crate::shared::frame::Frame;

/// One accepted image waiting for face screening.
#[derive(Clone, Debug)]
pub struct ScreeningJob {
    pub id: ImageId,
    pub image: Arc<Frame>,
}

/// Tagged result of screening one image, sent back to the intake loop.
#[derive(Clone, Debug, PartialEq)]
pub struct DetectionOutcome {
    pub id: ImageId,
    pub presence: FacePresence,
    /// Filled only when a face was present.
    pub abnormalities: Vec<String>,
}

impl DetectionOutcome {
    /// Collapses the outcome into the verdict the gallery records.
    ///
    /// Detector failures reject the image the same way an empty result does.
    pub fn verdict(self) -> ScreeningVerdict {
        match self.presence {
            FacePresence::Present(_) => ScreeningVerdict::FaceFound {
                abnormalities: self.abnormalities,
            },
            FacePresence::Absent => ScreeningVerdict::Rejected {
                reason: NO_FACE_REASON.to_string(),
            },
            FacePresence::Failed(error) => {
                log::warn!("Face detection failed for image {}: {error}", self.id);
                ScreeningVerdict::Rejected {
                    reason: NO_FACE_REASON.to_string(),
                }
            }
        }
    }
}

/// Runs detection on `job` and, if a face is present, the analyzer.
pub fn screen(
    detector: &mut dyn FaceDetector,
    analyzer: &dyn AbnormalityAnalyzer,
    job: &ScreeningJob,
) -> DetectionOutcome {
    let presence = FacePresence::of(detector, &job.image);
    let abnormalities = match &presence {
        FacePresence::Present(faces) => analyzer.analyze(&job.image, faces),
        _ => Vec::new(),
    };
    DetectionOutcome {
        id: job.id,
        presence,
        abnormalities,
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use crate::detection::domain::face_detector::{DetectorFactory, FaceDetector};
    use crate::shared::frame::Frame;
    use crate::shared::region::Region;

    /// Pixel value at index 0 selects the detector's answer:
    /// 0 = no face, 255 = detector error, anything else = one face.
    pub const NO_FACE: u8 = 0;
    pub const BROKEN: u8 = 255;
    pub const FACE: u8 = 128;

    pub struct MarkerDetector;

    impl FaceDetector for MarkerDetector {
        fn detect(&mut self, frame: &Frame) -> Result<Vec<Region>, Box<dyn std::error::Error>> {
            match frame.data()[0] {
                NO_FACE => Ok(vec![]),
                BROKEN => Err("inference failed".into()),
                _ => Ok(vec![Region::new(0, 0, 2, 2, 0.9)]),
            }
        }
    }

    pub fn marker_frame(marker: u8) -> Frame {
        Frame::new(vec![marker; 4 * 4 * 3], 4, 4, 3, 0)
    }

    pub fn marker_factory() -> DetectorFactory {
        Arc::new(|| Ok(Box::new(MarkerDetector) as Box<dyn FaceDetector>))
    }

    /// Factory that counts how many detectors were built.
    pub fn counting_factory(built: Arc<AtomicUsize>) -> DetectorFactory {
        Arc::new(move || {
            built.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(MarkerDetector) as Box<dyn FaceDetector>)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::analysis::infrastructure::placeholder_analyzer::{
        PlaceholderAnalyzer, PLACEHOLDER_LABELS,
    };
    use rstest::rstest;

    fn job(marker: u8) -> ScreeningJob {
        ScreeningJob {
            id: ImageId(7),
            image: Arc::new(marker_frame(marker)),
        }
    }

    #[test]
    fn test_face_runs_analyzer() {
        let outcome = screen(&mut MarkerDetector, &PlaceholderAnalyzer::new(), &job(FACE));
        assert!(outcome.presence.is_present());
        assert_eq!(outcome.abnormalities, PLACEHOLDER_LABELS);
        assert_eq!(
            outcome.verdict(),
            ScreeningVerdict::FaceFound {
                abnormalities: PLACEHOLDER_LABELS.iter().map(|s| s.to_string()).collect()
            }
        );
    }

    #[rstest]
    #[case::no_face(NO_FACE)]
    #[case::detector_error(BROKEN)]
    fn test_rejections_carry_no_face_reason(#[case] marker: u8) {
        let outcome = screen(&mut MarkerDetector, &PlaceholderAnalyzer::new(), &job(marker));
        assert!(outcome.abnormalities.is_empty());
        assert_eq!(outcome.id, ImageId(7));
        assert_eq!(
            outcome.verdict(),
            ScreeningVerdict::Rejected {
                reason: "No face detected".into()
            }
        );
    }
}
