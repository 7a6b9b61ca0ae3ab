use crate::capture::domain::capture_error::CaptureError;
use crate::shared::frame::Frame;

/// A live camera-like source: a stream of preview frames plus stills.
///
/// `capture_photo` is only valid while the session runs. `stop` must be
/// safe to call any number of times.
pub trait CaptureSession: Send {
    fn start(&mut self) -> Result<(), CaptureError>;

    fn stop(&mut self);

    fn is_running(&self) -> bool;

    /// Blocks until the next preview frame is available.
    fn next_frame(&mut self) -> Result<Frame, CaptureError>;

    fn capture_photo(&mut self) -> Result<Frame, CaptureError>;
}
