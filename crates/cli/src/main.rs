use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Parser;

use facecheck_core::analysis::infrastructure::placeholder_analyzer::PlaceholderAnalyzer;
use facecheck_core::capture::infrastructure::ffmpeg_capture_session::FfmpegCaptureSession;
use facecheck_core::capture::infrastructure::path_gallery_picker::PathGalleryPicker;
use facecheck_core::detection::domain::confidence_threshold::ConfidenceThreshold;
use facecheck_core::detection::domain::face_detector::{DetectorFactory, FaceDetector};
use facecheck_core::detection::infrastructure::onnx_blazeface_detector::OnnxBlazefaceDetector;
use facecheck_core::intake::session_logger::LogSessionLogger;
use facecheck_core::session::face_check_session::FaceCheckSession;
use facecheck_core::session::presentation::PresentationState;
use facecheck_core::session::session_config::SessionConfig;
use facecheck_core::shared::constants::{
    BLAZEFACE_MODEL_NAME, BLAZEFACE_MODEL_URL, DEFAULT_DETECTION_WORKERS, RESULT_THRESHOLD,
};
use facecheck_core::shared::model_resolver::{self, ModelSource};

/// Screen photos for faces and list placeholder abnormalities.
#[derive(Parser)]
#[command(name = "facecheck")]
struct Cli {
    /// Image files or directories of images to add from the gallery.
    images: Vec<PathBuf>,

    /// Capture photos from a camera device or video file.
    #[arg(long)]
    camera: Option<String>,

    /// Force the capture input format (v4l2, avfoundation, dshow).
    #[arg(long)]
    camera_format: Option<String>,

    /// Face detection confidence threshold (0.0-1.0).
    #[arg(long, default_value = "0.5")]
    confidence: f64,

    /// Detection worker threads.
    #[arg(long, default_value_t = DEFAULT_DETECTION_WORKERS)]
    workers: usize,

    /// Images needed to open the result screen.
    #[arg(long, default_value_t = RESULT_THRESHOLD)]
    threshold: usize,

    /// Photos to take from the camera.
    #[arg(long, default_value = "1")]
    max_captures: usize,

    /// Seconds to wait for a face before giving up on a capture.
    #[arg(long, default_value = "10")]
    face_timeout: u64,

    /// Use this BlazeFace ONNX model instead of the cached download.
    #[arg(long)]
    model: Option<PathBuf>,
}

const SETTLE_TIMEOUT: Duration = Duration::from_secs(120);
const POLL_INTERVAL: Duration = Duration::from_millis(20);

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let config = SessionConfig {
        threshold: cli.threshold,
        workers: cli.workers,
        ..SessionConfig::default()
    };
    let factory = build_detector_factory(&cli)?;
    let mut session = FaceCheckSession::new(
        &config,
        factory,
        Arc::new(PlaceholderAnalyzer::new()),
        Box::new(LogSessionLogger::new()),
    );

    if !cli.images.is_empty() {
        let mut picker = build_picker(&cli.images)?;
        let accepted = session.select_from_gallery(&mut picker);
        log::info!("Added {} image(s) from the gallery", accepted.len());
    }

    if let Some(source) = &cli.camera {
        run_captures(&cli, source, &mut session);
    }

    if !session.wait_idle(SETTLE_TIMEOUT) {
        log::warn!("Some images were still processing after {SETTLE_TIMEOUT:?}");
    }
    session.pump();

    let state = session.presentation();
    if state.show_results {
        print_result_screen(&state);
    } else {
        print_gallery_summary(&state, cli.threshold);
    }
    session.intake().logger().summary();
    Ok(())
}

fn run_captures(cli: &Cli, source: &str, session: &mut FaceCheckSession) {
    for n in 1..=cli.max_captures {
        if session.presentation().show_results {
            break;
        }
        let mut camera = FfmpegCaptureSession::new(source).with_looping(true);
        if let Some(format) = &cli.camera_format {
            camera = camera.with_input_format(format);
        }
        session.capture_image(Box::new(camera));

        eprint!("\rCapture {n}/{}: waiting for a face...", cli.max_captures);
        let deadline = Instant::now() + Duration::from_secs(cli.face_timeout);
        while Instant::now() < deadline && session.presentation().capture_active {
            session.pump();
            if session.presentation().face_in_view {
                break;
            }
            std::thread::sleep(POLL_INTERVAL);
        }
        eprintln!();

        // The camera failed to open or the source ran dry.
        if !session.presentation().capture_active {
            report_alert(session);
            return;
        }

        match session.take_photo() {
            Ok(id) => log::info!("Captured image {id}"),
            Err(_) => report_alert(session),
        }
        session.stop_capture();
    }
}

fn report_alert(session: &mut FaceCheckSession) {
    if let Some(alert) = session.presentation().alert {
        eprintln!("Alert: {alert}");
    }
    session.dismiss_alert();
}

fn build_picker(inputs: &[PathBuf]) -> Result<PathGalleryPicker, Box<dyn std::error::Error>> {
    let mut paths = Vec::new();
    for input in inputs {
        if input.is_dir() {
            paths.extend(PathGalleryPicker::from_directory(input)?.into_paths());
        } else {
            paths.push(input.clone());
        }
    }
    Ok(PathGalleryPicker::new(paths))
}

fn build_detector_factory(cli: &Cli) -> Result<DetectorFactory, Box<dyn std::error::Error>> {
    log::info!("Resolving model: {BLAZEFACE_MODEL_NAME}");
    let source = ModelSource::new(BLAZEFACE_MODEL_NAME, BLAZEFACE_MODEL_URL);
    let model_path = model_resolver::resolve(
        &source,
        cli.model.as_deref(),
        None,
        Some(Box::new(download_progress)),
    )?;
    eprintln!();

    let confidence = ConfidenceThreshold::new(cli.confidence);
    // Fail fast on a broken model instead of inside every worker.
    OnnxBlazefaceDetector::new(&model_path, confidence.clone())?;

    let factory: DetectorFactory =
        Arc::new(move || -> Result<Box<dyn FaceDetector>, Box<dyn std::error::Error>> {
            Ok(Box::new(OnnxBlazefaceDetector::new(
                &model_path,
                confidence.clone(),
            )?))
        });
    Ok(factory)
}

fn print_result_screen(state: &PresentationState) {
    println!("Result Screen");
    for (status, abnormalities) in state.result_lines() {
        println!();
        println!("{status}");
        for label in abnormalities {
            println!("  {label}");
        }
    }
}

fn print_gallery_summary(state: &PresentationState, threshold: usize) {
    let images = &state.images;
    println!(
        "{} image(s): {} processed, {} invalid, {} processing",
        images.len(),
        images.processed(),
        images.invalid(),
        images.processing()
    );
    println!("The result screen opens at {threshold} images.");
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if cli.images.is_empty() && cli.camera.is_none() {
        return Err("Nothing to screen: pass image paths or --camera".into());
    }
    for path in &cli.images {
        if !path.exists() {
            return Err(format!("Input not found: {}", path.display()).into());
        }
    }
    if !(0.0..=1.0).contains(&cli.confidence) {
        return Err(format!(
            "Confidence must be between 0.0 and 1.0, got {}",
            cli.confidence
        )
        .into());
    }
    if cli.workers == 0 {
        return Err("Workers must be at least 1".into());
    }
    if cli.threshold == 0 {
        return Err("Threshold must be at least 1".into());
    }
    if cli.camera_format.is_some() && cli.camera.is_none() {
        return Err("--camera-format requires --camera".into());
    }
    if let Some(model) = &cli.model {
        if !model.exists() {
            return Err(format!("Model file not found: {}", model.display()).into());
        }
    }
    Ok(())
}

fn download_progress(downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading face detection model... {pct}%");
    } else {
        eprint!("\rDownloading face detection model... {downloaded} bytes");
    }
}
