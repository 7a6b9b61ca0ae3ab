use crate::capture::domain::capture_error::CaptureError;
use crate::capture::domain::capture_session::CaptureSession;
use crate::shared::frame::Frame;

/// Capture session backed by ffmpeg-next (libavformat + libavdevice).
///
/// `source` is a capture device (e.g. `/dev/video0` with input format
/// `v4l2`, `0` with `avfoundation`) or a video file. Every decoded frame is a
/// preview frame; `capture_photo` returns the most recent one, which is what
/// the user saw when pressing the shutter.
pub struct FfmpegCaptureSession {
    source: String,
    input_format: Option<String>,
    loop_file: bool,
    stream: Option<OpenStream>,
    last_frame: Option<Frame>,
    frame_index: usize,
}

struct OpenStream {
    ictx: ffmpeg_next::format::context::Input,
    decoder: ffmpeg_next::decoder::Video,
    scaler: ffmpeg_next::software::scaling::Context,
    stream_index: usize,
    width: u32,
    height: u32,
}

// Safety: the session is driven from one thread at a time (the preview pump
// holds it behind a mutex). ffmpeg pointers never escape this struct.
unsafe impl Send for FfmpegCaptureSession {}

impl FfmpegCaptureSession {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            input_format: None,
            loop_file: false,
            stream: None,
            last_frame: None,
            frame_index: 0,
        }
    }

    /// Force a demuxer/device by name (`v4l2`, `avfoundation`, `dshow`).
    pub fn with_input_format(mut self, name: impl Into<String>) -> Self {
        self.input_format = Some(name.into());
        self
    }

    /// Rewind file sources at end-of-stream instead of ending the session.
    pub fn with_looping(mut self, loop_file: bool) -> Self {
        self.loop_file = loop_file;
        self
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    fn open(&self) -> Result<OpenStream, Box<dyn std::error::Error>> {
        ffmpeg_next::init()?;
        ffmpeg_next::device::register_all();

        let ictx = match &self.input_format {
            Some(name) => {
                let format = find_input_format(name)
                    .ok_or_else(|| format!("input format '{name}' is not available"))?;
                ffmpeg_next::format::open_with(
                    &self.source,
                    &ffmpeg_next::format::Format::Input(format),
                    ffmpeg_next::Dictionary::new(),
                )?
                .input()
            }
            None => ffmpeg_next::format::input(&self.source)?,
        };

        let stream = ictx
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .ok_or("No video stream found")?;
        let stream_index = stream.index();
        let codec_ctx = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())?;
        let decoder = codec_ctx.decoder().video()?;

        let width = decoder.width();
        let height = decoder.height();
        let scaler = ffmpeg_next::software::scaling::Context::get(
            decoder.format(),
            width,
            height,
            ffmpeg_next::format::Pixel::RGB24,
            width,
            height,
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )?;

        Ok(OpenStream {
            ictx,
            decoder,
            scaler,
            stream_index,
            width,
            height,
        })
    }
}

fn find_input_format(name: &str) -> Option<ffmpeg_next::format::format::Input> {
    ffmpeg_next::device::input::video().find(|f| f.name() == name)
}

impl CaptureSession for FfmpegCaptureSession {
    fn start(&mut self) -> Result<(), CaptureError> {
        if self.stream.is_some() {
            return Ok(());
        }
        let stream = self
            .open()
            .map_err(|e| CaptureError::Unavailable(format!("{}: {e}", self.source)))?;
        log::info!(
            "Capture session started on {} ({}x{})",
            self.source,
            stream.width,
            stream.height
        );
        self.stream = Some(stream);
        self.frame_index = 0;
        Ok(())
    }

    fn stop(&mut self) {
        if self.stream.take().is_some() {
            log::info!("Capture session stopped on {}", self.source);
        }
        self.last_frame = None;
    }

    fn is_running(&self) -> bool {
        self.stream.is_some()
    }

    fn next_frame(&mut self) -> Result<Frame, CaptureError> {
        let loop_file = self.loop_file;
        let stream = self.stream.as_mut().ok_or(CaptureError::NotRunning)?;

        let frame = match stream.read_frame(self.frame_index)? {
            Some(frame) => frame,
            None if loop_file => {
                stream.rewind()?;
                stream
                    .read_frame(self.frame_index)?
                    .ok_or(CaptureError::EndOfStream)?
            }
            None => return Err(CaptureError::EndOfStream),
        };

        self.frame_index += 1;
        self.last_frame = Some(frame.clone());
        Ok(frame)
    }

    fn capture_photo(&mut self) -> Result<Frame, CaptureError> {
        if !self.is_running() {
            return Err(CaptureError::NotRunning);
        }
        match self.last_frame.clone() {
            Some(frame) => Ok(frame),
            None => self.next_frame(),
        }
    }
}

impl OpenStream {
    /// Decodes until one frame comes out, or returns `None` at end of input.
    fn read_frame(&mut self, index: usize) -> Result<Option<Frame>, CaptureError> {
        if let Some(frame) = self.try_receive(index)? {
            return Ok(Some(frame));
        }

        loop {
            let Some((stream, packet)) = self.ictx.packets().next() else {
                let _ = self.decoder.send_eof();
                return self.try_receive(index);
            };
            if stream.index() != self.stream_index {
                continue;
            }
            if self.decoder.send_packet(&packet).is_err() {
                continue;
            }
            if let Some(frame) = self.try_receive(index)? {
                return Ok(Some(frame));
            }
        }
    }

    fn try_receive(&mut self, index: usize) -> Result<Option<Frame>, CaptureError> {
        let mut decoded = ffmpeg_next::util::frame::video::Video::empty();
        if self.decoder.receive_frame(&mut decoded).is_err() {
            return Ok(None);
        }
        let mut rgb_frame = ffmpeg_next::util::frame::video::Video::empty();
        self.scaler
            .run(&decoded, &mut rgb_frame)
            .map_err(|e| CaptureError::Decode(e.to_string()))?;
        let pixels = extract_rgb_pixels(&rgb_frame, self.width, self.height);
        Ok(Some(Frame::new(pixels, self.width, self.height, 3, index)))
    }

    fn rewind(&mut self) -> Result<(), CaptureError> {
        self.ictx
            .seek(0, ..)
            .map_err(|e| CaptureError::Decode(format!("rewind failed: {e}")))?;
        self.decoder.flush();
        Ok(())
    }
}

/// Copies an ffmpeg RGB24 frame into a tightly packed buffer, dropping the
/// per-row stride padding.
fn extract_rgb_pixels(
    rgb_frame: &ffmpeg_next::util::frame::video::Video,
    width: u32,
    height: u32,
) -> Vec<u8> {
    let stride = rgb_frame.stride(0);
    let data = rgb_frame.data(0);
    let row_bytes = width as usize * 3;

    let mut pixels = Vec::with_capacity(row_bytes * height as usize);
    for row in 0..height as usize {
        let start = row * stride;
        pixels.extend_from_slice(&data[start..start + row_bytes]);
    }
    pixels
}
