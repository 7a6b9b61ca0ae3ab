use std::sync::Arc;
use std::time::Duration;

use crate::analysis::domain::abnormality_analyzer::AbnormalityAnalyzer;
use crate::capture::domain::capture_error::CaptureError;
use crate::capture::domain::capture_session::CaptureSession;
use crate::capture::domain::gallery_picker::GalleryPicker;
use crate::detection::domain::face_detector::DetectorFactory;
use crate::gallery::domain::image_record::{ImageId, ImageSource};
use crate::gallery::domain::navigation_trigger::NavigationTrigger;
use crate::intake::image_intake::ImageIntake;
use crate::intake::infrastructure::threaded_screening_executor::ThreadedScreeningExecutor;
use crate::intake::session_logger::SessionLogger;
use crate::preview::live_preview::LivePreview;
use crate::session::presentation::PresentationState;
use crate::session::session_config::SessionConfig;

/// The capture-and-screen flow behind every frontend.
///
/// Owns the intake and at most one live preview. Frontends call the action
/// methods, call [`pump`](Self::pump) regularly, and render from
/// [`presentation`](Self::presentation).
pub struct FaceCheckSession {
    intake: ImageIntake,
    factory: DetectorFactory,
    preview: Option<LivePreview>,
    alert: Option<String>,
    frame_interval: Duration,
}

impl FaceCheckSession {
    pub fn new(
        config: &SessionConfig,
        factory: DetectorFactory,
        analyzer: Arc<dyn AbnormalityAnalyzer>,
        logger: Box<dyn SessionLogger>,
    ) -> Self {
        let executor = ThreadedScreeningExecutor::new(config.workers, factory.clone(), analyzer);
        let intake = ImageIntake::new(
            Box::new(executor),
            NavigationTrigger::new(config.threshold),
            logger,
        );
        Self::with_intake(intake, factory, config.frame_interval)
    }

    pub fn with_intake(
        intake: ImageIntake,
        factory: DetectorFactory,
        frame_interval: Duration,
    ) -> Self {
        Self {
            intake,
            factory,
            preview: None,
            alert: None,
            frame_interval,
        }
    }

    /// Opens the live preview on `session`.
    ///
    /// The camera opens in the background. One that fails to start raises an
    /// alert and closes the preview on a later [`pump`](Self::pump).
    pub fn capture_image(&mut self, session: Box<dyn CaptureSession>) {
        self.stop_capture();
        let mut preview = LivePreview::new(session, self.factory.clone())
            .with_frame_interval(self.frame_interval);
        preview.start();
        self.preview = Some(preview);
    }

    /// Takes a photo if a face is in view, accepts it, and closes the camera.
    ///
    /// Refusals and capture failures raise an alert and keep the preview open.
    pub fn take_photo(&mut self) -> Result<ImageId, CaptureError> {
        let Some(preview) = self.preview.as_mut() else {
            self.alert = Some(CaptureError::NotRunning.to_string());
            return Err(CaptureError::NotRunning);
        };
        match preview.take_photo() {
            Ok(photo) => {
                let id = self.intake.accept(photo, ImageSource::Camera);
                self.stop_capture();
                Ok(id)
            }
            Err(e) => {
                self.alert = Some(e.to_string());
                Err(e)
            }
        }
    }

    pub fn stop_capture(&mut self) {
        if let Some(mut preview) = self.preview.take() {
            preview.stop();
        }
    }

    /// Accepts every image the picker yields; failed items are skipped.
    ///
    /// Returns the ids of the accepted images.
    pub fn select_from_gallery(&mut self, picker: &mut dyn GalleryPicker) -> Vec<ImageId> {
        let mut accepted = Vec::new();
        for item in picker.pick_many() {
            match item {
                Ok(picked) => {
                    let source = ImageSource::Gallery(picked.path);
                    accepted.push(self.intake.accept(picked.image, source));
                }
                Err(e) => log::warn!("Skipping picked item: {e}"),
            }
        }
        accepted
    }

    /// Applies finished detections and live indicator updates.
    pub fn pump(&mut self) -> usize {
        let mut applied = self.intake.pump();
        if let Some(preview) = self.preview.as_mut() {
            applied += preview.pump();
            if let Some(reason) = preview.ended().cloned() {
                log::warn!("Capture closed: {reason}");
                self.alert = Some(reason.to_string());
                self.stop_capture();
            }
        }
        applied
    }

    /// Blocks until every accepted image is resolved or `timeout` passes.
    pub fn wait_idle(&mut self, timeout: Duration) -> bool {
        self.intake.wait_idle(timeout)
    }

    pub fn presentation(&self) -> PresentationState {
        PresentationState {
            images: self.intake.snapshot(),
            show_results: self.intake.show_results(),
            face_in_view: self.preview.as_ref().is_some_and(|p| p.indicator()),
            capture_active: self.preview.as_ref().is_some_and(|p| p.is_running()),
            preview_frame: self.preview.as_ref().and_then(|p| p.latest_frame().cloned()),
            alert: self.alert.clone(),
        }
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }

    pub fn intake(&self) -> &ImageIntake {
        &self.intake
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::infrastructure::placeholder_analyzer::PlaceholderAnalyzer;
    use crate::capture::domain::capture_error::PickError;
    use crate::capture::domain::gallery_picker::PickedImage;
    use crate::gallery::domain::image_record::ImageStatus;
    use crate::intake::screening::test_support::*;
    use crate::intake::session_logger::NullSessionLogger;
    use crate::preview::live_preview::test_support::ScriptedSession;
    use std::path::PathBuf;
    use std::time::Instant;

    const WAIT: Duration = Duration::from_secs(5);

    struct ListPicker(Vec<Result<PickedImage, PickError>>);

    impl GalleryPicker for ListPicker {
        fn pick_many(&mut self) -> Vec<Result<PickedImage, PickError>> {
            std::mem::take(&mut self.0)
        }
    }

    fn picked(name: &str, marker: u8) -> Result<PickedImage, PickError> {
        Ok(PickedImage {
            path: PathBuf::from(name),
            image: marker_frame(marker),
        })
    }

    fn session(threshold: usize) -> FaceCheckSession {
        let config = SessionConfig {
            threshold,
            frame_interval: Duration::from_millis(1),
            ..SessionConfig::default()
        };
        FaceCheckSession::new(
            &config,
            marker_factory(),
            Arc::new(PlaceholderAnalyzer::new()),
            Box::new(NullSessionLogger),
        )
    }

    fn pump_until(s: &mut FaceCheckSession, cond: impl Fn(&PresentationState) -> bool) -> bool {
        let deadline = Instant::now() + WAIT;
        while Instant::now() < deadline {
            s.pump();
            if cond(&s.presentation()) {
                return true;
            }
            std::thread::sleep(Duration::from_millis(2));
        }
        false
    }

    #[test]
    fn test_gallery_selection_of_three_resolves_in_order() {
        let mut s = session(10);
        let mut picker = ListPicker(vec![
            picked("a.jpg", FACE),
            picked("b.jpg", NO_FACE),
            picked("c.jpg", FACE),
        ]);
        let ids = s.select_from_gallery(&mut picker);
        assert_eq!(ids.len(), 3);
        assert!(s.wait_idle(WAIT));

        let state = s.presentation();
        assert_eq!(state.images.len(), 3);
        let texts: Vec<String> = state.result_lines().into_iter().map(|(t, _)| t).collect();
        assert_eq!(texts, vec!["Processed", "Invalid: No face detected", "Processed"]);
        assert!(!state.show_results);
    }

    #[test]
    fn test_failed_pick_is_skipped() {
        let mut s = session(10);
        let mut picker = ListPicker(vec![
            picked("a.jpg", FACE),
            Err(PickError::Unsupported(PathBuf::from("b.txt"))),
        ]);
        assert_eq!(s.select_from_gallery(&mut picker).len(), 1);
        assert_eq!(s.presentation().images.len(), 1);
    }

    #[test]
    fn test_empty_pick_is_noop() {
        let mut s = session(10);
        assert!(s.select_from_gallery(&mut ListPicker(vec![])).is_empty());
        assert!(s.presentation().images.is_empty());
    }

    #[test]
    fn test_unavailable_camera_raises_alert() {
        let mut s = session(10);
        s.capture_image(Box::new(ScriptedSession::failing()));
        assert!(pump_until(&mut s, |p| p.alert.is_some()));

        let state = s.presentation();
        assert!(!state.capture_active);
        assert_eq!(state.alert.as_deref(), Some("camera not available: no camera"));

        s.dismiss_alert();
        assert!(s.presentation().alert.is_none());
    }

    #[test]
    fn test_take_photo_with_face_accepts_and_closes_camera() {
        let mut s = session(10);
        s.capture_image(Box::new(ScriptedSession::new(vec![FACE])));
        assert!(pump_until(&mut s, |p| p.face_in_view));

        let id = s.take_photo().unwrap();
        let state = s.presentation();
        assert!(!state.capture_active);
        assert_eq!(state.images.records()[0].id, id);
        assert_eq!(state.images.records()[0].source, ImageSource::Camera);

        assert!(s.wait_idle(WAIT));
        assert_eq!(
            s.presentation().images.records()[0].status,
            ImageStatus::Processed
        );
    }

    #[test]
    fn test_take_photo_without_face_alerts_and_keeps_preview() {
        let mut s = session(10);
        s.capture_image(Box::new(ScriptedSession::new(vec![NO_FACE])));
        assert!(pump_until(&mut s, |p| p.preview_frame.is_some()));

        assert_eq!(s.take_photo(), Err(CaptureError::NoFaceInView));
        let state = s.presentation();
        assert!(state.capture_active);
        assert!(state.images.is_empty());
        assert_eq!(
            state.alert.as_deref(),
            Some("No face detected, cannot take photo.")
        );
    }

    #[test]
    fn test_take_photo_without_camera_is_not_running() {
        let mut s = session(10);
        assert_eq!(s.take_photo(), Err(CaptureError::NotRunning));
    }

    #[test]
    fn test_slow_camera_open_returns_immediately() {
        let mut s = session(10);
        let mut camera = ScriptedSession::new(vec![FACE]);
        camera.start_delay = Duration::from_millis(800);

        let begun = Instant::now();
        s.capture_image(Box::new(camera));
        assert!(begun.elapsed() < Duration::from_millis(250));
        assert!(s.presentation().capture_active);

        assert!(pump_until(&mut s, |p| p.face_in_view));
        assert!(s.presentation().alert.is_none());
    }

    #[test]
    fn test_stop_capture_is_idempotent() {
        let mut s = session(10);
        s.capture_image(Box::new(ScriptedSession::new(vec![FACE])));
        s.stop_capture();
        s.stop_capture();
        assert!(!s.presentation().capture_active);
    }

    #[test]
    fn test_source_end_closes_capture_with_alert() {
        let mut s = session(10);
        s.capture_image(Box::new(ScriptedSession::new(vec![])));
        assert!(pump_until(&mut s, |p| !p.capture_active));
        assert_eq!(s.presentation().alert.as_deref(), Some("capture source ended"));
    }

    #[test]
    fn test_threshold_reached_across_both_sources() {
        let mut s = session(3);
        let mut picker = ListPicker(vec![picked("a.jpg", FACE), picked("b.jpg", FACE)]);
        s.select_from_gallery(&mut picker);
        assert!(!s.presentation().show_results);

        s.capture_image(Box::new(ScriptedSession::new(vec![FACE])));
        assert!(pump_until(&mut s, |p| p.face_in_view));
        s.take_photo().unwrap();
        assert!(s.presentation().show_results);
    }
}
