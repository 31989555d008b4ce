//! Pixel layout conversion between capture output and encoder input.

use crate::models::error::RecorderError;
use crate::models::frame::{Frame, PixelLayout};

/// Byte offsets of red, green and blue within one pixel.
fn rgb_offsets(layout: PixelLayout) -> [usize; 3] {
    match layout {
        PixelLayout::Rgba8 | PixelLayout::Rgb8 => [0, 1, 2],
        PixelLayout::Bgra8 | PixelLayout::Bgr8 => [2, 1, 0],
    }
}

/// Convert a frame to `target`, dropping or adding an opaque alpha channel
/// as needed. Frames already in `target` are returned untouched.
pub fn convert(frame: Frame, target: PixelLayout) -> Result<Frame, RecorderError> {
    let source = frame.layout();
    if source == target {
        return Ok(frame);
    }

    let (width, height) = (frame.width(), frame.height());
    let src_bpp = source.bytes_per_pixel();
    let dst_bpp = target.bytes_per_pixel();
    let src_rgb = rgb_offsets(source);
    let dst_rgb = rgb_offsets(target);

    let data = frame.into_data();
    let mut out = vec![0u8; data.len() / src_bpp * dst_bpp];

    for (src, dst) in data.chunks_exact(src_bpp).zip(out.chunks_exact_mut(dst_bpp)) {
        for channel in 0..3 {
            dst[dst_rgb[channel]] = src[src_rgb[channel]];
        }
        if dst_bpp == 4 {
            dst[3] = if src_bpp == 4 { src[3] } else { u8::MAX };
        }
    }

    Frame::new(width, height, target, out)
        .map_err(|e| RecorderError::EncodeFailure(format!("color conversion produced a bad frame: {}", e)))
}
