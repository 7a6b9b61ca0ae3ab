use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use facecheck_core::shared::constants::DEFAULT_DETECTION_WORKERS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Appearance {
    System,
    Dark,
    Light,
}

impl Appearance {
    pub const ALL: &[Appearance] = &[Appearance::System, Appearance::Dark, Appearance::Light];
}

impl std::fmt::Display for Appearance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Appearance::System => write!(f, "System"),
            Appearance::Dark => write!(f, "Dark"),
            Appearance::Light => write!(f, "Light"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Detection confidence in percent.
    pub confidence: u32,
    pub workers: u32,
    /// Capture device or video file handed to ffmpeg.
    pub camera_source: String,
    /// Empty means let ffmpeg probe the source.
    pub camera_format: String,
    pub appearance: Appearance,
    pub high_contrast: bool,
    pub font_scale: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            confidence: 50,
            workers: DEFAULT_DETECTION_WORKERS as u32,
            camera_source: default_camera_source().to_string(),
            camera_format: default_camera_format().to_string(),
            appearance: Appearance::System,
            high_contrast: false,
            font_scale: 1.0,
        }
    }
}

fn default_camera_source() -> &'static str {
    if cfg!(target_os = "macos") {
        "0"
    } else if cfg!(target_os = "windows") {
        "video=Integrated Camera"
    } else {
        "/dev/video0"
    }
}

fn default_camera_format() -> &'static str {
    if cfg!(target_os = "macos") {
        "avfoundation"
    } else if cfg!(target_os = "windows") {
        "dshow"
    } else {
        "v4l2"
    }
}

impl Settings {
    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("FaceCheck").join("settings.json"))
    }

    pub fn load() -> Self {
        Self::config_path()
            .map(|path| Self::load_from(&path))
            .unwrap_or_default()
    }

    pub fn save(&self) {
        if let Some(path) = Self::config_path() {
            self.save_to(&path);
        }
    }

    fn load_from(path: &Path) -> Self {
        fs::read_to_string(path)
            .ok()
            .and_then(|json| serde_json::from_str(&json).ok())
            .unwrap_or_default()
    }

    fn save_to(&self, path: &Path) {
        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(e) = fs::write(path, json) {
                    log::warn!("Could not save settings to {}: {e}", path.display());
                }
            }
            Err(e) => log::warn!("Could not serialize settings: {e}"),
        }
    }

    pub fn confidence_fraction(&self) -> f64 {
        self.confidence.min(100) as f64 / 100.0
    }

    pub fn camera_format(&self) -> Option<&str> {
        let format = self.camera_format.trim();
        (!format.is_empty()).then_some(format)
    }
}
