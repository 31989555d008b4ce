use super::error::RecorderError;

/// Byte order of a raw pixel buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelLayout {
    Rgba8,
    Bgra8,
    Rgb8,
    Bgr8,
}

impl PixelLayout {
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            Self::Rgba8 | Self::Bgra8 => 4,
            Self::Rgb8 | Self::Bgr8 => 3,
        }
    }
}

/// One raw screen image.
///
/// Frames are transient: the worker captures, converts and hands each one to
/// the encoder within a single loop iteration and never keeps it around.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: u32,
    height: u32,
    layout: PixelLayout,
    data: Vec<u8>,
}

impl Frame {
    /// Wraps a pixel buffer, checking that its length matches the geometry.
    pub fn new(width: u32, height: u32, layout: PixelLayout, data: Vec<u8>) -> Result<Self, RecorderError> {
        let expected = width as usize * height as usize * layout.bytes_per_pixel();
        if width == 0 || height == 0 {
            return Err(RecorderError::CaptureUnavailable(format!(
                "empty frame ({}x{})",
                width, height
            )));
        }
        if data.len() != expected {
            return Err(RecorderError::CaptureUnavailable(format!(
                "frame buffer is {} bytes, expected {} for {}x{} {:?}",
                data.len(),
                expected,
                width,
                height,
                layout
            )));
        }
        Ok(Self {
            width,
            height,
            layout,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn layout(&self) -> PixelLayout {
        self.layout
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_matching_buffer() {
        let frame = Frame::new(2, 2, PixelLayout::Rgb8, vec![0; 12]).unwrap();
        assert_eq!(frame.width(), 2);
        assert_eq!(frame.data().len(), 12);
    }

    #[test]
    fn rejects_short_buffer() {
        let err = Frame::new(2, 2, PixelLayout::Rgba8, vec![0; 12]).unwrap_err();
        assert!(matches!(err, RecorderError::CaptureUnavailable(_)));
    }

    #[test]
    fn rejects_zero_size() {
        assert!(Frame::new(0, 10, PixelLayout::Rgb8, Vec::new()).is_err());
    }
}
