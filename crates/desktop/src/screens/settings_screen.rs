use iced::widget::{button, checkbox, column, pick_list, row, slider, text, text_input, Space};
use iced::Element;

use crate::app::{scaled, Message};
use crate::settings::{Appearance, Settings};

pub fn view<'a>(settings: &'a Settings) -> Element<'a, Message> {
    let fs = settings.font_scale;

    column![
        text("Detection").size(scaled(16.0, fs)),
        Space::new().height(8),
        row![
            text("Confidence").size(scaled(13.0, fs)),
            slider(10..=95, settings.confidence, Message::ConfidenceChanged),
            text(format!("{}%", settings.confidence)).size(scaled(13.0, fs)),
        ]
        .spacing(12)
        .align_y(iced::Alignment::Center),
        text("Applies to the next photo or preview frame.").size(scaled(11.0, fs)),
        Space::new().height(20),
        text("Camera").size(scaled(16.0, fs)),
        Space::new().height(8),
        row![
            text("Source").size(scaled(13.0, fs)),
            text_input("/dev/video0 or a video file", &settings.camera_source)
                .on_input(Message::CameraSourceChanged)
                .size(scaled(13.0, fs)),
        ]
        .spacing(12)
        .align_y(iced::Alignment::Center),
        row![
            text("Format").size(scaled(13.0, fs)),
            text_input("auto", &settings.camera_format)
                .on_input(Message::CameraFormatChanged)
                .size(scaled(13.0, fs)),
        ]
        .spacing(12)
        .align_y(iced::Alignment::Center),
        Space::new().height(20),
        text("Appearance").size(scaled(16.0, fs)),
        Space::new().height(8),
        row![
            text("Mode").size(scaled(13.0, fs)),
            pick_list(Appearance::ALL, Some(settings.appearance), Message::AppearanceChanged)
                .text_size(scaled(13.0, fs)),
        ]
        .spacing(12)
        .align_y(iced::Alignment::Center),
        checkbox(settings.high_contrast)
            .label("High contrast")
            .on_toggle(Message::HighContrastChanged)
            .text_size(scaled(13.0, fs)),
        row![
            text("Font size").size(scaled(13.0, fs)),
            slider(0.8..=1.5, settings.font_scale, Message::FontScaleChanged).step(0.05),
            text(format!("{:.0}%", settings.font_scale * 100.0)).size(scaled(13.0, fs)),
        ]
        .spacing(12)
        .align_y(iced::Alignment::Center),
        Space::new().height(20),
        button(text("Restore Defaults").size(scaled(13.0, fs)))
            .on_press(Message::RestoreDefaults)
            .style(button::secondary),
    ]
    .spacing(6)
    .into()
}
