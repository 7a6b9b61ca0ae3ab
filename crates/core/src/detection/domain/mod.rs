pub mod confidence_threshold;
pub mod face_detector;
