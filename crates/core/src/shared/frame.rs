use ndarray::ArrayView3;

/// A still image or preview frame: contiguous RGB bytes in row-major order.
///
/// Decoding happens at the capture/picker boundary only; everything past
/// intake treats pixel data as opaque and shares frames behind an `Arc`.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
    index: usize,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, channels: u8, index: usize) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * (channels as usize),
            "data length must equal width * height * channels"
        );
        Self {
            data,
            width,
            height,
            channels,
            index,
        }
    }

    /// Wraps a decoded `image` buffer without copying.
    pub fn from_rgb_image(image: image::RgbImage, index: usize) -> Self {
        let (width, height) = image.dimensions();
        Self::new(image.into_raw(), width, height, 3, index)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    /// Sequence number within its source (preview frame counter, picker slot).
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn with_index(mut self, index: usize) -> Self {
        self.index = index;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(self.shape(), &self.data)
            .expect("Frame data length must match dimensions")
    }

    /// RGBA copy for display surfaces that want 4 channels.
    pub fn to_rgba(&self) -> Vec<u8> {
        let channels = self.channels as usize;
        let mut out = Vec::with_capacity(self.width as usize * self.height as usize * 4);
        for px in self.data.chunks_exact(channels.max(1)) {
            match channels {
                1 => out.extend_from_slice(&[px[0], px[0], px[0], 255]),
                3 => out.extend_from_slice(&[px[0], px[1], px[2], 255]),
                _ => out.extend_from_slice(&[px[0], px[1], px[2], px[3]]),
            }
        }
        out
    }

    fn shape(&self) -> (usize, usize, usize) {
        (
            self.height as usize,
            self.width as usize,
            self.channels as usize,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construction_and_accessors() {
        let data = vec![0u8; 12]; // 2x2x3
        let frame = Frame::new(data.clone(), 2, 2, 3, 5);
        assert_eq!(frame.width(), 2);
        assert_eq!(frame.height(), 2);
        assert_eq!(frame.channels(), 3);
        assert_eq!(frame.index(), 5);
        assert_eq!(frame.data(), &data[..]);
    }

    #[test]
    #[should_panic(expected = "data length must equal width * height * channels")]
    fn test_mismatched_data_length_panics_in_debug() {
        Frame::new(vec![0u8; 10], 2, 2, 3, 0);
    }

    #[test]
    fn test_from_rgb_image_keeps_pixels() {
        let mut img = image::RgbImage::new(3, 2);
        img.put_pixel(1, 1, image::Rgb([10, 20, 30]));
        let frame = Frame::from_rgb_image(img, 7);

        assert_eq!(frame.width(), 3);
        assert_eq!(frame.height(), 2);
        assert_eq!(frame.index(), 7);
        let arr = frame.as_ndarray();
        assert_eq!(arr[[1, 1, 0]], 10);
        assert_eq!(arr[[1, 1, 1]], 20);
        assert_eq!(arr[[1, 1, 2]], 30);
    }

    #[test]
    fn test_as_ndarray_shape() {
        let frame = Frame::new(vec![0u8; 24], 4, 2, 3, 0);
        assert_eq!(frame.as_ndarray().shape(), &[2, 4, 3]);
    }

    #[test]
    fn test_to_rgba_adds_opaque_alpha() {
        let frame = Frame::new(vec![1, 2, 3, 4, 5, 6], 2, 1, 3, 0);
        assert_eq!(frame.to_rgba(), vec![1, 2, 3, 255, 4, 5, 6, 255]);
    }

    #[test]
    fn test_with_index_replaces_index_only() {
        let frame = Frame::new(vec![9u8; 3], 1, 1, 3, 0).with_index(4);
        assert_eq!(frame.index(), 4);
        assert_eq!(frame.data(), &[9, 9, 9]);
    }

    #[test]
    fn test_zero_sized_frame_is_empty() {
        assert!(Frame::new(Vec::new(), 0, 0, 3, 0).is_empty());
        assert!(!Frame::new(vec![0; 3], 1, 1, 3, 0).is_empty());
    }
}
