use iced::widget::image::Handle;

use facecheck_core::shared::frame::Frame;

/// Longest side of gallery thumbnails, in pixels.
pub const THUMBNAIL_SIZE: u32 = 160;

/// Downscales `frame` to fit in a `max_side` square and returns RGBA pixels.
pub fn thumbnail_rgba(frame: &Frame, max_side: u32) -> Option<::image::RgbaImage> {
    let full = ::image::RgbaImage::from_raw(frame.width(), frame.height(), frame.to_rgba())?;
    let longest = frame.width().max(frame.height());
    if longest <= max_side {
        return Some(full);
    }
    let scale = max_side as f64 / longest as f64;
    let w = ((frame.width() as f64 * scale).round() as u32).max(1);
    let h = ((frame.height() as f64 * scale).round() as u32).max(1);
    Some(::image::imageops::thumbnail(&full, w, h))
}

pub fn thumbnail_handle(frame: &Frame) -> Option<Handle> {
    let thumb = thumbnail_rgba(frame, THUMBNAIL_SIZE)?;
    let (w, h) = thumb.dimensions();
    Some(Handle::from_rgba(w, h, thumb.into_raw()))
}

/// Full-size handle for the live preview.
pub fn frame_handle(frame: &Frame) -> Handle {
    Handle::from_rgba(frame.width(), frame.height(), frame.to_rgba())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_large_frame_scaled_to_fit() {
        let frame = Frame::new(vec![10; 640 * 320 * 3], 640, 320, 3, 0);
        let thumb = thumbnail_rgba(&frame, 160).unwrap();
        assert_eq!(thumb.dimensions(), (160, 80));
    }

    #[test]
    fn test_small_frame_kept_as_is() {
        let frame = Frame::new(vec![10; 20 * 10 * 3], 20, 10, 3, 0);
        let thumb = thumbnail_rgba(&frame, 160).unwrap();
        assert_eq!(thumb.dimensions(), (20, 10));
        assert_eq!(thumb.get_pixel(0, 0).0, [10, 10, 10, 255]);
    }
}
