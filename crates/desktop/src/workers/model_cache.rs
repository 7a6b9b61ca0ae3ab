use std::path::PathBuf;
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use facecheck_core::detection::domain::confidence_threshold::ConfidenceThreshold;
use facecheck_core::detection::domain::face_detector::{DetectorFactory, FaceDetector};
use facecheck_core::detection::infrastructure::onnx_blazeface_detector::OnnxBlazefaceDetector;
use facecheck_core::shared::constants::{BLAZEFACE_MODEL_NAME, BLAZEFACE_MODEL_URL};
use facecheck_core::shared::model_resolver::{self, ModelSource};

/// Resolves the face detection model in the background at startup.
///
/// Detector factories block on the cache, so workers started before the
/// download finishes simply wait for it.
pub struct ModelCache {
    result: Mutex<Option<Result<PathBuf, String>>>,
    ready: Condvar,
    progress: Mutex<(u64, u64)>,
}

impl ModelCache {
    pub fn new() -> Arc<Self> {
        let cache = Arc::new(Self {
            result: Mutex::new(None),
            ready: Condvar::new(),
            progress: Mutex::new((0, 0)),
        });

        let slot = cache.clone();
        thread::spawn(move || slot.resolve());
        cache
    }

    fn resolve(self: &Arc<Self>) {
        let source = ModelSource::new(BLAZEFACE_MODEL_NAME, BLAZEFACE_MODEL_URL);
        let progress_slot = self.clone();
        let result = model_resolver::resolve(
            &source,
            None,
            bundled_model_dir().as_deref(),
            Some(Box::new(move |downloaded, total| {
                *relock(&progress_slot.progress) = (downloaded, total);
            })),
        );
        if let Err(e) = &result {
            log::error!("Face detection model unavailable: {e}");
        }
        *relock(&self.result) = Some(result.map_err(|e| e.to_string()));
        self.ready.notify_all();
    }

    /// Blocks until the model is resolved.
    pub fn wait(&self) -> Result<PathBuf, String> {
        let mut guard = relock(&self.result);
        loop {
            if let Some(ref result) = *guard {
                return result.clone();
            }
            guard = match self.ready.wait_timeout(guard, Duration::from_millis(100)) {
                Ok((guard, _)) => guard,
                Err(poisoned) => poisoned.into_inner().0,
            };
        }
    }

    /// `(downloaded, total)` bytes while a download runs.
    pub fn progress(&self) -> (u64, u64) {
        *relock(&self.progress)
    }

    pub fn is_ready(&self) -> bool {
        relock(&self.result).is_some()
    }

    /// Factory for BlazeFace detectors sharing one live `confidence`.
    pub fn detector_factory(self: &Arc<Self>, confidence: ConfidenceThreshold) -> DetectorFactory {
        let cache = self.clone();
        Arc::new(move || -> Result<Box<dyn FaceDetector>, Box<dyn std::error::Error>> {
            let path = cache.wait()?;
            Ok(Box::new(OnnxBlazefaceDetector::new(&path, confidence.clone())?))
        })
    }
}

/// Models shipped next to the executable (app bundles, installers).
fn bundled_model_dir() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    let dir = exe.parent()?;
    #[cfg(target_os = "macos")]
    {
        Some(dir.join("../Resources/models"))
    }
    #[cfg(not(target_os = "macos"))]
    {
        Some(dir.join("models"))
    }
}

fn relock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
