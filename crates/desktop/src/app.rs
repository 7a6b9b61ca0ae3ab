use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{Receiver, TryRecvError};
use iced::widget::image::Handle;
use iced::widget::{button, column, container, row, scrollable, text};
use iced::{Element, Length, Subscription, Task, Theme};

use facecheck_core::analysis::infrastructure::placeholder_analyzer::PlaceholderAnalyzer;
use facecheck_core::capture::infrastructure::ffmpeg_capture_session::FfmpegCaptureSession;
use facecheck_core::detection::domain::confidence_threshold::ConfidenceThreshold;
use facecheck_core::gallery::domain::image_record::ImageId;
use facecheck_core::intake::session_logger::LogSessionLogger;
use facecheck_core::session::face_check_session::FaceCheckSession;
use facecheck_core::session::presentation::PresentationState;
use facecheck_core::session::session_config::SessionConfig;
use facecheck_core::shared::constants::IMAGE_EXTENSIONS;

use crate::screens::{alert, result_screen, selection_screen, settings_screen, thumbnail};
use crate::settings::{Appearance, Settings};
use crate::theme;
use crate::workers::gallery_loader::{self, LoadedItems, LoadedSelection};
use crate::workers::model_cache::ModelCache;

const TICK_INTERVAL: Duration = Duration::from_millis(33);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Capture,
    Settings,
}

impl Tab {
    const ALL: &[Tab] = &[Tab::Capture, Tab::Settings];

    fn label(self) -> &'static str {
        match self {
            Tab::Capture => "Capture",
            Tab::Settings => "Settings",
        }
    }
}

#[derive(Debug, Clone)]
pub enum Message {
    TabSelected(Tab),
    CaptureImage,
    TakePhoto,
    StopCapture,
    SelectFromGallery,
    FilesPicked(Option<Vec<PathBuf>>),
    DismissAlert,
    ShowResults,
    BackToGallery,
    Tick,
    ConfidenceChanged(u32),
    CameraSourceChanged(String),
    CameraFormatChanged(String),
    RestoreDefaults,
    AppearanceChanged(Appearance),
    HighContrastChanged(bool),
    FontScaleChanged(f32),
    PollSystemTheme,
}

pub struct App {
    active_tab: Tab,
    pub settings: Settings,
    session: FaceCheckSession,
    state: PresentationState,
    thumbnails: HashMap<ImageId, Handle>,
    preview: Option<(usize, Handle)>,
    viewing_results: bool,
    results_opened: bool,
    model_cache: Arc<ModelCache>,
    confidence: ConfidenceThreshold,
    gallery_loads: Vec<Receiver<LoadedItems>>,
}

impl App {
    pub fn new() -> (Self, Task<Message>) {
        let settings = Settings::load();
        let model_cache = ModelCache::new();
        let confidence = ConfidenceThreshold::new(settings.confidence_fraction());
        let config = SessionConfig {
            workers: settings.workers.max(1) as usize,
            ..SessionConfig::default()
        };
        let session = FaceCheckSession::new(
            &config,
            model_cache.detector_factory(confidence.clone()),
            Arc::new(PlaceholderAnalyzer::new()),
            Box::new(LogSessionLogger::new()),
        );
        let state = session.presentation();

        (
            Self {
                active_tab: Tab::Capture,
                settings,
                session,
                state,
                thumbnails: HashMap::new(),
                preview: None,
                viewing_results: false,
                results_opened: false,
                model_cache,
                confidence,
                gallery_loads: Vec::new(),
            },
            Task::none(),
        )
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::TabSelected(tab) => {
                self.active_tab = tab;
            }
            Message::CaptureImage => {
                let mut camera = FfmpegCaptureSession::new(self.settings.camera_source.clone())
                    .with_looping(true);
                if let Some(format) = self.settings.camera_format() {
                    camera = camera.with_input_format(format);
                }
                // A camera that fails to open raises an alert on a later tick.
                self.session.capture_image(Box::new(camera));
            }
            Message::TakePhoto => {
                let _ = self.session.take_photo();
            }
            Message::StopCapture => {
                self.session.stop_capture();
            }
            Message::SelectFromGallery => {
                return Task::perform(
                    async {
                        rfd::AsyncFileDialog::new()
                            .set_title("Select photos")
                            .add_filter("Images", IMAGE_EXTENSIONS)
                            .pick_files()
                            .await
                            .map(|files| {
                                files
                                    .iter()
                                    .map(|h| h.path().to_path_buf())
                                    .collect::<Vec<PathBuf>>()
                            })
                    },
                    Message::FilesPicked,
                );
            }
            Message::FilesPicked(Some(paths)) => {
                self.gallery_loads.push(gallery_loader::spawn(paths));
            }
            Message::FilesPicked(None) => {}
            Message::DismissAlert => {
                self.session.dismiss_alert();
            }
            Message::ShowResults => {
                self.session.stop_capture();
                self.viewing_results = true;
            }
            Message::BackToGallery => {
                self.viewing_results = false;
            }
            Message::Tick => {
                self.collect_gallery_loads();
                self.session.pump();
            }
            Message::ConfidenceChanged(val) => {
                self.settings.confidence = val;
                self.confidence.set(self.settings.confidence_fraction());
                self.settings.save();
            }
            Message::CameraSourceChanged(source) => {
                self.settings.camera_source = source;
                self.settings.save();
            }
            Message::CameraFormatChanged(format) => {
                self.settings.camera_format = format;
                self.settings.save();
            }
            Message::RestoreDefaults => {
                let defaults = Settings::default();
                self.confidence.set(defaults.confidence_fraction());
                self.settings = Settings {
                    workers: self.settings.workers,
                    ..defaults
                };
                self.settings.save();
            }
            Message::AppearanceChanged(appearance) => {
                self.settings.appearance = appearance;
                self.settings.save();
            }
            Message::HighContrastChanged(enabled) => {
                self.settings.high_contrast = enabled;
                self.settings.save();
            }
            Message::FontScaleChanged(scale) => {
                self.settings.font_scale = scale;
                self.settings.save();
            }
            Message::PollSystemTheme => {}
        }
        self.refresh();
        Task::none()
    }

    /// Accepts every picked batch that finished decoding.
    fn collect_gallery_loads(&mut self) {
        for load in std::mem::take(&mut self.gallery_loads) {
            match load.try_recv() {
                Ok(items) => {
                    let accepted = self
                        .session
                        .select_from_gallery(&mut LoadedSelection::new(items));
                    log::info!("Added {} image(s) from the gallery", accepted.len());
                }
                Err(TryRecvError::Empty) => self.gallery_loads.push(load),
                Err(TryRecvError::Disconnected) => {
                    log::error!("Gallery loader stopped without a result");
                }
            }
        }
    }

    /// Re-reads the session and opens the result screen the first time the
    /// navigation flag is seen.
    fn refresh(&mut self) {
        self.state = self.session.presentation();

        if self.state.show_results && !self.results_opened {
            self.results_opened = true;
            self.viewing_results = true;
            self.session.stop_capture();
            self.state = self.session.presentation();
        }

        for record in self.state.images.records() {
            if !self.thumbnails.contains_key(&record.id) {
                if let Some(handle) = thumbnail::thumbnail_handle(&record.image) {
                    self.thumbnails.insert(record.id, handle);
                }
            }
        }

        self.preview = match (&self.state.preview_frame, self.preview.take()) {
            (Some(frame), Some((index, handle))) if index == frame.index() => {
                Some((index, handle))
            }
            (Some(frame), _) => Some((frame.index(), thumbnail::frame_handle(frame))),
            (None, _) => None,
        };
    }

    fn model_status(&self) -> Option<String> {
        if self.model_cache.is_ready() {
            return None;
        }
        let (downloaded, total) = self.model_cache.progress();
        Some(if total > 0 {
            format!(
                "Downloading face detection model... {}%",
                downloaded * 100 / total
            )
        } else {
            "Preparing face detection model...".to_string()
        })
    }

    pub fn view(&self) -> Element<'_, Message> {
        let fs = self.settings.font_scale;
        let theme = self.theme();

        let base: Element<'_, Message> = if self.viewing_results {
            result_screen::view(fs, &self.state, &self.thumbnails, &theme)
        } else {
            self.tabbed_view(fs, &theme)
        };

        match &self.state.alert {
            Some(message) => alert::modal(base, message, fs),
            None => base,
        }
    }

    fn tabbed_view(&self, fs: f32, theme: &Theme) -> Element<'_, Message> {
        let tab_bar = row(Tab::ALL
            .iter()
            .map(|&tab| {
                let label = text(tab.label()).size(scaled(13.0, fs));
                let btn = button(label)
                    .on_press(Message::TabSelected(tab))
                    .padding([6, 14]);
                if tab == self.active_tab {
                    btn.style(button::primary).into()
                } else {
                    btn.style(button::text).into()
                }
            })
            .collect::<Vec<_>>())
        .spacing(2);

        let content: Element<'_, Message> = match self.active_tab {
            Tab::Capture => selection_screen::view(
                fs,
                &self.state,
                self.preview.as_ref().map(|(_, handle)| handle),
                &self.thumbnails,
                self.model_status(),
                theme,
            ),
            Tab::Settings => settings_screen::view(&self.settings),
        };

        let tab_content = container(scrollable(content).height(Length::Fill))
            .padding(16)
            .height(Length::Fill);

        column![tab_bar, tab_content]
            .spacing(0)
            .height(Length::Fill)
            .into()
    }

    pub fn theme(&self) -> Theme {
        theme::resolve_theme(self.settings.appearance, self.settings.high_contrast)
    }

    pub fn subscription(&self) -> Subscription<Message> {
        let busy = self.state.capture_active
            || !self.gallery_loads.is_empty()
            || self.state.images.processing() > 0
            || !self.model_cache.is_ready();
        let tick = if busy {
            iced::time::every(TICK_INTERVAL).map(|_| Message::Tick)
        } else {
            Subscription::none()
        };
        let theme_poll = if self.settings.appearance == Appearance::System {
            iced::time::every(Duration::from_secs(2)).map(|_| Message::PollSystemTheme)
        } else {
            Subscription::none()
        };
        Subscription::batch([tick, theme_poll])
    }
}

/// Scale a base font size by the user's font_scale setting.
pub fn scaled(base: f32, font_scale: f32) -> f32 {
    (base * font_scale).round()
}
