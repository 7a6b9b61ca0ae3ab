use std::collections::HashMap;

use iced::widget::image::Handle;
use iced::widget::{button, column, image, row, scrollable, text, Space};
use iced::{Element, Length, Theme};

use facecheck_core::gallery::domain::image_record::ImageId;
use facecheck_core::session::presentation::PresentationState;

use crate::app::{scaled, Message};
use crate::theme::{muted_color, status_color};

/// One entry per gallery image: thumbnail, status, then its abnormalities.
pub fn view<'a>(
    fs: f32,
    state: &'a PresentationState,
    thumbnails: &'a HashMap<ImageId, Handle>,
    theme: &Theme,
) -> Element<'a, Message> {
    let header = row![
        button(text("\u{2190} Back").size(scaled(13.0, fs)))
            .on_press(Message::BackToGallery)
            .style(button::text),
        text("Result Screen").size(scaled(20.0, fs)),
    ]
    .spacing(12)
    .align_y(iced::Alignment::Center);

    let entries = state.images.records().iter().map(|record| {
        let thumb: Element<'a, Message> = match thumbnails.get(&record.id) {
            Some(handle) => image(handle.clone()).width(160).into(),
            None => Space::new().width(160).height(120).into(),
        };

        let mut details = column![text(record.status_text())
            .size(scaled(14.0, fs))
            .color(status_color(theme, &record.status))]
        .spacing(4);
        for label in record.abnormalities.iter().flatten() {
            details = details.push(text(label.clone()).size(scaled(13.0, fs)));
        }

        row![thumb, details]
            .spacing(16)
            .align_y(iced::Alignment::Center)
            .into()
    });

    let summary = text(format!(
        "{} processed, {} invalid, {} processing",
        state.images.processed(),
        state.images.invalid(),
        state.images.processing()
    ))
    .size(scaled(12.0, fs))
    .color(muted_color(theme));

    column![
        header,
        summary,
        scrollable(column(entries.collect::<Vec<_>>()).spacing(16)).height(Length::Fill),
    ]
    .spacing(12)
    .padding(16)
    .into()
}
