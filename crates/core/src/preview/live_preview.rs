use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, TrySendError};

use crate::capture::domain::capture_error::CaptureError;
use crate::capture::domain::capture_session::CaptureSession;
use crate::detection::domain::face_detector::{DetectorFactory, FacePresence};
use crate::shared::frame::Frame;

/// Target delay between preview frames (~30 fps).
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(33);

type SharedSession = Arc<Mutex<Box<dyn CaptureSession>>>;

/// Messages from the preview threads to the owning routine.
#[derive(Clone, Debug)]
pub enum PreviewEvent {
    Frame(Arc<Frame>),
    FaceIndicator { frame_index: usize, present: bool },
    Ended(CaptureError),
}

struct Workers {
    stop: Arc<AtomicBool>,
    pump: JoinHandle<()>,
    detect: JoinHandle<()>,
}

/// Live camera preview with a face-in-view indicator.
///
/// Layout: `frame pump → frame queue → detector → events → owner`
///
/// The pump thread owns the session lifecycle. It passes frames to the
/// detection thread through a one-slot queue and drops them while that slot
/// is taken. Indicator updates are applied by [`pump`](Self::pump) in
/// arrival order, last write wins, so a slow detection of an older frame
/// can overwrite a newer answer.
/// `take_photo` gates on whatever the indicator says at that moment.
pub struct LivePreview {
    session: SharedSession,
    factory: DetectorFactory,
    frame_interval: Duration,
    events: Option<Receiver<PreviewEvent>>,
    workers: Option<Workers>,
    face_in_view: bool,
    latest_frame: Option<Arc<Frame>>,
    ended: Option<CaptureError>,
}

impl LivePreview {
    pub fn new(session: Box<dyn CaptureSession>, factory: DetectorFactory) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
            factory,
            frame_interval: DEFAULT_FRAME_INTERVAL,
            events: None,
            workers: None,
            face_in_view: false,
            latest_frame: None,
            ended: None,
        }
    }

    pub fn with_frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval = interval;
        self
    }

    /// Starts the preview threads. The capture session itself is opened on
    /// the frame-pump thread, so a slow device never blocks the caller.
    ///
    /// A session that fails to open arrives as [`PreviewEvent::Ended`] on
    /// the next [`pump`](Self::pump). Calling `start` on a running preview
    /// is a no-op.
    pub fn start(&mut self) {
        if self.workers.is_some() {
            return;
        }

        let stop = Arc::new(AtomicBool::new(false));
        let (frame_tx, frame_rx) = crossbeam_channel::bounded::<Arc<Frame>>(1);
        let (event_tx, event_rx) = crossbeam_channel::unbounded::<PreviewEvent>();

        let pump = spawn_frame_pump(
            self.session.clone(),
            frame_tx,
            event_tx.clone(),
            stop.clone(),
            self.frame_interval,
        );
        let detect = spawn_detector(self.factory.clone(), frame_rx, event_tx, stop.clone());

        self.face_in_view = false;
        self.latest_frame = None;
        self.ended = None;
        self.events = Some(event_rx);
        self.workers = Some(Workers { stop, pump, detect });
        log::info!("Live preview started");
    }

    /// Applies every pending preview event. Returns how many were applied.
    pub fn pump(&mut self) -> usize {
        let Some(events) = &self.events else {
            return 0;
        };
        let pending: Vec<PreviewEvent> = events.try_iter().collect();
        let count = pending.len();
        for event in pending {
            self.apply(event);
        }
        count
    }

    fn apply(&mut self, event: PreviewEvent) {
        match event {
            PreviewEvent::Frame(frame) => self.latest_frame = Some(frame),
            PreviewEvent::FaceIndicator {
                frame_index,
                present,
            } => {
                if present != self.face_in_view {
                    log::debug!("Face in view: {present} (frame {frame_index})");
                }
                self.face_in_view = present;
            }
            PreviewEvent::Ended(reason) => {
                log::info!("Preview stopped: {reason}");
                self.ended = Some(reason);
            }
        }
    }

    /// Current face-in-view indicator.
    pub fn indicator(&self) -> bool {
        self.face_in_view
    }

    /// True from `start` until `stop`, or until the source ends.
    pub fn is_running(&self) -> bool {
        self.workers.is_some() && self.ended.is_none()
    }

    pub fn latest_frame(&self) -> Option<&Arc<Frame>> {
        self.latest_frame.as_ref()
    }

    /// Why the preview source stopped producing frames, if it did.
    pub fn ended(&self) -> Option<&CaptureError> {
        self.ended.as_ref()
    }

    /// Captures a still, but only while the indicator says a face is in view.
    pub fn take_photo(&mut self) -> Result<Frame, CaptureError> {
        if !self.is_running() {
            return Err(CaptureError::NotRunning);
        }
        self.pump();
        if !self.face_in_view {
            return Err(CaptureError::NoFaceInView);
        }
        lock(&self.session)?.capture_photo()
    }

    /// Stops the preview threads and the capture session. Idempotent.
    ///
    /// Waits for the frame pump, which closes the session on its way out.
    /// The detector thread is left to finish its current frame (or a
    /// detector still loading) on its own.
    pub fn stop(&mut self) {
        let Some(workers) = self.workers.take() else {
            return;
        };
        workers.stop.store(true, Ordering::Relaxed);
        self.events = None;
        if workers.pump.join().is_err() {
            log::error!("Preview frame pump panicked");
        }
        drop(workers.detect);
        self.face_in_view = false;
        self.latest_frame = None;
        log::info!("Live preview stopped");
    }
}

impl Drop for LivePreview {
    fn drop(&mut self) {
        self.stop();
    }
}

fn lock(session: &SharedSession) -> Result<MutexGuard<'_, Box<dyn CaptureSession>>, CaptureError> {
    session
        .lock()
        .map_err(|_| CaptureError::Unavailable("capture session lock poisoned".into()))
}

/// Opens the session, then streams frames until stopped or the source fails.
///
/// The frame queue holds one frame; frames arriving while the detector is
/// busy are dropped so the indicator never lags behind a backlog.
fn spawn_frame_pump(
    session: SharedSession,
    frame_tx: Sender<Arc<Frame>>,
    event_tx: Sender<PreviewEvent>,
    stop: Arc<AtomicBool>,
    interval: Duration,
) -> JoinHandle<()> {
    std::thread::spawn(move || {
        if let Err(e) = lock(&session).and_then(|mut session| session.start()) {
            let _ = event_tx.send(PreviewEvent::Ended(e));
            return;
        }

        let mut dropped = 0usize;
        while !stop.load(Ordering::Relaxed) {
            let tick = Instant::now();
            let next = match lock(&session) {
                Ok(mut session) => session.next_frame(),
                Err(e) => Err(e),
            };
            let frame = match next {
                Ok(frame) => Arc::new(frame),
                Err(e) => {
                    let _ = event_tx.send(PreviewEvent::Ended(e));
                    break;
                }
            };

            if event_tx.send(PreviewEvent::Frame(frame.clone())).is_err() {
                break;
            }
            match frame_tx.try_send(frame) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => dropped += 1,
                Err(TrySendError::Disconnected(_)) => break,
            }

            let elapsed = tick.elapsed();
            if elapsed < interval {
                std::thread::sleep(interval - elapsed);
            }
        }

        if dropped > 0 {
            log::debug!("Preview skipped {dropped} frame(s) while detection was busy");
        }
        match lock(&session) {
            Ok(mut session) => session.stop(),
            Err(e) => log::error!("Could not stop capture session: {e}"),
        }
    })
}

fn spawn_detector(
    factory: DetectorFactory,
    frame_rx: Receiver<Arc<Frame>>,
    event_tx: Sender<PreviewEvent>,
    stop: Arc<AtomicBool>,
) -> JoinHandle<()> {
    std::thread::spawn(move || {
        let mut detector = match factory() {
            Ok(detector) => Some(detector),
            Err(e) => {
                log::error!("Preview face detector unavailable: {e}");
                None
            }
        };

        for frame in frame_rx {
            if stop.load(Ordering::Relaxed) {
                break;
            }
            let present = match detector.as_mut() {
                Some(detector) => FacePresence::of(&mut **detector, &frame).is_present(),
                None => false,
            };
            let event = PreviewEvent::FaceIndicator {
                frame_index: frame.index(),
                present,
            };
            if event_tx.send(event).is_err() {
                break;
            }
        }
    })
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::capture::domain::capture_error::CaptureError;
    use crate::capture::domain::capture_session::CaptureSession;
    use crate::intake::screening::test_support::marker_frame;
    use crate::shared::frame::Frame;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    /// Session that cycles through marker frames forever.
    pub struct ScriptedSession {
        pub markers: Vec<u8>,
        pub fail_start: bool,
        /// How long `start` takes, like a camera warming up.
        pub start_delay: Duration,
        pub stopped: Arc<AtomicBool>,
        running: bool,
        cursor: usize,
        last: Option<Frame>,
    }

    impl ScriptedSession {
        pub fn new(markers: Vec<u8>) -> Self {
            Self {
                markers,
                fail_start: false,
                start_delay: Duration::ZERO,
                stopped: Arc::new(AtomicBool::new(false)),
                running: false,
                cursor: 0,
                last: None,
            }
        }

        pub fn failing() -> Self {
            Self {
                fail_start: true,
                ..Self::new(vec![])
            }
        }
    }

    impl CaptureSession for ScriptedSession {
        fn start(&mut self) -> Result<(), CaptureError> {
            std::thread::sleep(self.start_delay);
            if self.fail_start {
                return Err(CaptureError::Unavailable("no camera".into()));
            }
            self.running = true;
            Ok(())
        }

        fn stop(&mut self) {
            self.running = false;
            self.stopped.store(true, Ordering::SeqCst);
        }

        fn is_running(&self) -> bool {
            self.running
        }

        fn next_frame(&mut self) -> Result<Frame, CaptureError> {
            if !self.running {
                return Err(CaptureError::NotRunning);
            }
            let Some(&marker) = self.markers.get(self.cursor % self.markers.len().max(1)) else {
                return Err(CaptureError::EndOfStream);
            };
            let frame = marker_frame(marker).with_index(self.cursor);
            self.cursor += 1;
            self.last = Some(frame.clone());
            Ok(frame)
        }

        fn capture_photo(&mut self) -> Result<Frame, CaptureError> {
            if !self.running {
                return Err(CaptureError::NotRunning);
            }
            self.last.clone().ok_or(CaptureError::NoFrame)
        }
    }
}
