use iced::color;
use iced::theme::Palette;
use iced::{Color, Theme};

use facecheck_core::gallery::domain::image_record::ImageStatus;

use crate::settings::Appearance;

/// Resolve the iced Theme from appearance + high_contrast settings.
pub fn resolve_theme(appearance: Appearance, high_contrast: bool) -> Theme {
    let is_dark = match appearance {
        Appearance::Dark => true,
        Appearance::Light => false,
        Appearance::System => detect_system_dark_mode(),
    };

    let palette = match (is_dark, high_contrast) {
        (true, false) => dark_palette(),
        (false, false) => light_palette(),
        (true, true) => high_contrast_dark_palette(),
        (false, true) => high_contrast_light_palette(),
    };

    Theme::custom("FaceCheck", palette)
}

/// Secondary text, e.g. thumbnail captions.
pub fn muted_color(theme: &Theme) -> Color {
    Color {
        a: 0.6,
        ..theme.palette().text
    }
}

pub fn status_color(theme: &Theme, status: &ImageStatus) -> Color {
    let palette = theme.palette();
    match status {
        ImageStatus::Processing => palette.warning,
        ImageStatus::Processed => palette.success,
        ImageStatus::Invalid(_) => palette.danger,
    }
}

fn dark_palette() -> Palette {
    Palette {
        background: color!(0x18, 0x1b, 0x1f),
        text: color!(0xd4, 0xd7, 0xdb),
        primary: color!(0x2b, 0xb3, 0xa3),
        success: color!(0x30, 0xd1, 0x58),
        warning: color!(0xff, 0xcc, 0x00),
        danger: color!(0xff, 0x45, 0x3a),
    }
}

fn light_palette() -> Palette {
    Palette {
        background: color!(0xf4, 0xf6, 0xf7),
        text: color!(0x1c, 0x1f, 0x22),
        primary: color!(0x1a, 0x8f, 0x82),
        success: color!(0x34, 0xc7, 0x59),
        warning: color!(0xff, 0x9f, 0x0a),
        danger: color!(0xff, 0x3b, 0x30),
    }
}

fn high_contrast_dark_palette() -> Palette {
    Palette {
        background: color!(0x00, 0x00, 0x00),
        text: color!(0xff, 0xff, 0xff),
        primary: color!(0x4d, 0xe0, 0xcf),
        success: color!(0x30, 0xd1, 0x58),
        warning: color!(0xff, 0xd6, 0x0a),
        danger: color!(0xff, 0x45, 0x3a),
    }
}

fn high_contrast_light_palette() -> Palette {
    Palette {
        background: color!(0xff, 0xff, 0xff),
        text: color!(0x00, 0x00, 0x00),
        primary: color!(0x00, 0x66, 0x5c),
        success: color!(0x24, 0x8a, 0x3d),
        warning: color!(0xb2, 0x5c, 0x00),
        danger: color!(0xd7, 0x00, 0x15),
    }
}

fn detect_system_dark_mode() -> bool {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("defaults")
            .args(["read", "-g", "AppleInterfaceStyle"])
            .output()
            .map(|o| {
                String::from_utf8_lossy(&o.stdout)
                    .trim()
                    .eq_ignore_ascii_case("dark")
            })
            .unwrap_or(true)
    }
    #[cfg(not(target_os = "macos"))]
    {
        true
    }
}
