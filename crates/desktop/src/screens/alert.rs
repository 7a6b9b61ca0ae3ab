use iced::border::Border;
use iced::widget::{button, center, column, container, mouse_area, opaque, stack, text, Space};
use iced::{Color, Element, Theme};

use crate::app::{scaled, Message};

/// Dims `base` and shows `message` in a dialog that only "OK" dismisses.
pub fn modal<'a>(base: Element<'a, Message>, message: &str, fs: f32) -> Element<'a, Message> {
    let dialog = container(
        column![
            text("Alert").size(scaled(17.0, fs)).font(iced::Font {
                weight: iced::font::Weight::Bold,
                ..iced::Font::DEFAULT
            }),
            Space::new().height(8),
            text(message.to_owned()).size(scaled(14.0, fs)),
            Space::new().height(16),
            button(text("OK").size(scaled(14.0, fs)))
                .on_press(Message::DismissAlert)
                .padding([8, 28]),
        ]
        .align_x(iced::Alignment::Center),
    )
    .padding(24)
    .max_width(360)
    .style(|theme: &Theme| {
        let palette = theme.extended_palette();
        container::Style {
            background: Some(palette.background.base.color.into()),
            border: Border {
                radius: 12.0.into(),
                ..Border::default()
            },
            ..container::Style::default()
        }
    });

    let backdrop = center(opaque(dialog)).style(|_theme: &Theme| container::Style {
        background: Some(
            Color {
                a: 0.6,
                ..Color::BLACK
            }
            .into(),
        ),
        ..container::Style::default()
    });

    stack![base, opaque(mouse_area(backdrop))].into()
}
