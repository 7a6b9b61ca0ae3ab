use std::collections::HashMap;

use iced::widget::image::Handle;
use iced::widget::{button, column, container, image, row, scrollable, text, Space};
use iced::{ContentFit, Element, Length, Theme};

use facecheck_core::gallery::domain::image_record::ImageId;
use facecheck_core::session::presentation::PresentationState;

use crate::app::{scaled, Message};
use crate::theme::{muted_color, status_color};

/// Capture controls, live preview and the gallery strip.
pub fn view<'a>(
    fs: f32,
    state: &'a PresentationState,
    preview: Option<&'a Handle>,
    thumbnails: &'a HashMap<ImageId, Handle>,
    model_status: Option<String>,
    theme: &Theme,
) -> Element<'a, Message> {
    let mut content = column![].spacing(12);

    if let Some(status) = model_status {
        content = content.push(text(status).size(scaled(12.0, fs)).color(muted_color(theme)));
    }

    content = if state.capture_active {
        content.push(capture_panel(fs, state, preview, theme))
    } else {
        content.push(action_row(fs, state))
    };

    content = content.push(gallery(fs, state, thumbnails, theme));
    content.into()
}

fn action_row<'a>(fs: f32, state: &PresentationState) -> Element<'a, Message> {
    let mut actions = row![
        button(text("Capture Image").size(scaled(14.0, fs)))
            .on_press(Message::CaptureImage)
            .padding([10, 20]),
        button(text("Select from Gallery").size(scaled(14.0, fs)))
            .on_press(Message::SelectFromGallery)
            .padding([10, 20])
            .style(button::secondary),
    ]
    .spacing(12);

    if state.show_results {
        actions = actions.push(
            button(text("View Results").size(scaled(14.0, fs)))
                .on_press(Message::ShowResults)
                .padding([10, 20])
                .style(button::success),
        );
    }
    actions.into()
}

fn capture_panel<'a>(
    fs: f32,
    state: &PresentationState,
    preview: Option<&'a Handle>,
    theme: &Theme,
) -> Element<'a, Message> {
    let palette = theme.palette();
    let frame: Element<'a, Message> = match preview {
        Some(handle) => image(handle.clone())
            .content_fit(ContentFit::Contain)
            .width(Length::Fill)
            .height(320)
            .into(),
        None => container(text("Starting camera...").size(scaled(13.0, fs)))
            .center_x(Length::Fill)
            .center_y(320)
            .into(),
    };

    let (label, color) = if state.face_in_view {
        ("Face detected", palette.success)
    } else {
        ("No face in view", palette.danger)
    };

    column![
        frame,
        text(label).size(scaled(13.0, fs)).color(color),
        row![
            button(text("Take Photo").size(scaled(14.0, fs)))
                .on_press(Message::TakePhoto)
                .padding([10, 24]),
            button(text("Cancel").size(scaled(14.0, fs)))
                .on_press(Message::StopCapture)
                .padding([10, 20])
                .style(button::secondary),
        ]
        .spacing(12),
    ]
    .spacing(8)
    .align_x(iced::Alignment::Center)
    .into()
}

fn gallery<'a>(
    fs: f32,
    state: &'a PresentationState,
    thumbnails: &'a HashMap<ImageId, Handle>,
    theme: &Theme,
) -> Element<'a, Message> {
    if state.images.is_empty() {
        return text("No images yet")
            .size(scaled(13.0, fs))
            .color(muted_color(theme))
            .into();
    }

    let cards = state.images.records().iter().map(|record| {
        let thumb: Element<'a, Message> = match thumbnails.get(&record.id) {
            Some(handle) => image(handle.clone()).width(96).height(96).into(),
            None => Space::new().width(96).height(96).into(),
        };
        column![
            thumb,
            text(record.status_text())
                .size(scaled(11.0, fs))
                .color(status_color(theme, &record.status)),
        ]
        .spacing(4)
        .width(110)
        .align_x(iced::Alignment::Center)
        .into()
    });

    let strip = row(cards.collect::<Vec<_>>()).spacing(8);
    column![
        text(format!("Gallery ({})", state.images.len())).size(scaled(15.0, fs)),
        scrollable(strip).direction(scrollable::Direction::Horizontal(
            scrollable::Scrollbar::default()
        )),
    ]
    .spacing(8)
    .into()
}
