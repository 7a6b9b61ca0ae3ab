/// BlazeFace face detector using ONNX Runtime via `ort`.
///
/// Short-range BlazeFace is built for selfie-distance faces, which is what
/// both the camera flow and typical gallery portraits produce.
use std::path::Path;

use crate::detection::domain::confidence_threshold::ConfidenceThreshold;
use crate::detection::domain::face_detector::FaceDetector;
use crate::detection::infrastructure::execution_provider::preferred_execution_providers;
use crate::shared::frame::Frame;
use crate::shared::region::Region;

/// BlazeFace model input resolution.
const INPUT_SIZE: u32 = 128;

/// Default confidence threshold.
pub const DEFAULT_CONFIDENCE: f64 = 0.5;

/// Boxes narrower or shorter than this (in source pixels) are discarded.
pub const DEFAULT_MIN_FACE_PX: i32 = 12;

const NMS_IOU_THRESH: f64 = 0.3;

/// Number of BlazeFace anchors (short-range model).
const NUM_ANCHORS: usize = 896;

/// Values per anchor in the regressor output: box (4) + 6 keypoints (12).
const REGRESSOR_STRIDE: usize = 16;

pub struct OnnxBlazefaceDetector {
    session: ort::session::Session,
    confidence: ConfidenceThreshold,
    min_face_px: i32,
    anchors: Vec<[f32; 2]>,
}

impl OnnxBlazefaceDetector {
    pub fn new(
        model_path: &Path,
        confidence: ConfidenceThreshold,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let session = ort::session::Session::builder()?
            .with_execution_providers(preferred_execution_providers())?
            .commit_from_file(model_path)?;
        log::debug!("Loaded BlazeFace model from {}", model_path.display());
        Ok(Self {
            session,
            confidence,
            min_face_px: DEFAULT_MIN_FACE_PX,
            anchors: generate_anchors(),
        })
    }

    pub fn with_min_face_px(mut self, min_face_px: i32) -> Self {
        self.min_face_px = min_face_px;
        self
    }
}

impl FaceDetector for OnnxBlazefaceDetector {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Region>, Box<dyn std::error::Error>> {
        if frame.is_empty() {
            return Err("cannot run face detection on an empty image".into());
        }
        if frame.channels() < 3 {
            return Err(format!(
                "face detection needs RGB input, got {} channel(s)",
                frame.channels()
            )
            .into());
        }

        let input_tensor = preprocess(frame, INPUT_SIZE);
        let input_value = ort::value::Tensor::from_array(input_tensor)?;
        let outputs = self.session.run(ort::inputs![input_value])?;

        // regressors: [1, 896, 16], classificators: [1, 896, 1]
        if outputs.len() < 2 {
            return Err(
                format!("BlazeFace model expected 2 outputs, got {}", outputs.len()).into(),
            );
        }
        let regressors = outputs[0].try_extract_array::<f32>()?;
        let scores = outputs[1].try_extract_array::<f32>()?;
        let reg_data = regressors.as_slice().ok_or("Cannot get regressor slice")?;
        let score_data = scores.as_slice().ok_or("Cannot get score slice")?;

        let candidates = decode(
            reg_data,
            score_data,
            &self.anchors,
            frame.width(),
            frame.height(),
            self.confidence.get(),
        );
        let kept = nms(candidates, NMS_IOU_THRESH);
        Ok(Region::retain_min_size(kept, self.min_face_px))
    }
}

/// Nearest-neighbour resize to `size × size`, normalized to [0,1] NCHW.
fn preprocess(frame: &Frame, size: u32) -> ndarray::Array4<f32> {
    let src = frame.as_ndarray();
    let src_h = frame.height() as usize;
    let src_w = frame.width() as usize;
    let s = size as usize;

    let mut tensor = ndarray::Array4::<f32>::zeros((1, 3, s, s));
    for y in 0..s {
        let src_y = (((y as f64 + 0.5) * src_h as f64 / s as f64) as usize).min(src_h - 1);
        for x in 0..s {
            let src_x = (((x as f64 + 0.5) * src_w as f64 / s as f64) as usize).min(src_w - 1);
            for c in 0..3 {
                tensor[[0, c, y, x]] = src[[src_y, src_x, c]] as f32 / 255.0;
            }
        }
    }
    tensor
}

/// Short-range anchors: a 16×16 grid with 2 anchors per cell followed by an
/// 8×8 grid with 6 anchors per cell.
fn generate_anchors() -> Vec<[f32; 2]> {
    let strides = [(8, 2), (16, 6)];
    let mut anchors = Vec::with_capacity(NUM_ANCHORS);

    for &(stride, per_cell) in &strides {
        let grid = INPUT_SIZE as usize / stride;
        for y in 0..grid {
            for x in 0..grid {
                let cx = (x as f32 + 0.5) / grid as f32;
                let cy = (y as f32 + 0.5) / grid as f32;
                anchors.extend(std::iter::repeat([cx, cy]).take(per_cell));
            }
        }
    }
    anchors
}

/// Turns raw model outputs into frame-space boxes above `confidence`.
fn decode(
    reg_data: &[f32],
    score_data: &[f32],
    anchors: &[[f32; 2]],
    frame_w: u32,
    frame_h: u32,
    confidence: f64,
) -> Vec<Region> {
    let fw = frame_w as f32;
    let fh = frame_h as f32;
    let scale = INPUT_SIZE as f32;

    score_data
        .iter()
        .zip(anchors)
        .enumerate()
        .filter_map(|(i, (&raw_score, anchor))| {
            let score = sigmoid(raw_score);
            if (score as f64) < confidence {
                return None;
            }
            let reg = reg_data.get(i * REGRESSOR_STRIDE..i * REGRESSOR_STRIDE + 4)?;

            let cx = anchor[0] + reg[0] / scale;
            let cy = anchor[1] + reg[1] / scale;
            let w = reg[2] / scale;
            let h = reg[3] / scale;

            let x1 = ((cx - w / 2.0) * fw).clamp(0.0, fw);
            let y1 = ((cy - h / 2.0) * fh).clamp(0.0, fh);
            let x2 = ((cx + w / 2.0) * fw).clamp(0.0, fw);
            let y2 = ((cy + h / 2.0) * fh).clamp(0.0, fh);

            Some(Region::new(
                x1 as i32,
                y1 as i32,
                (x2 - x1) as i32,
                (y2 - y1) as i32,
                score as f64,
            ))
        })
        .collect()
}

fn nms(mut candidates: Vec<Region>, iou_thresh: f64) -> Vec<Region> {
    candidates.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut kept: Vec<Region> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if kept.iter().all(|k| k.iou(&candidate) <= iou_thresh) {
            kept.push(candidate);
        }
    }
    kept
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}
