//! JPEG encoding of decoded frames.

use image::codecs::jpeg::JpegEncoder;
use image::ColorType;

use crate::error::{MediaError, MediaResult};
use crate::source::RawFrame;

/// Encode an RGB24 frame as JPEG. `quality` is clamped to 1..=100.
pub fn encode_jpeg(frame: &RawFrame, quality: u8) -> MediaResult<Vec<u8>> {
    if frame.width == 0 || frame.height == 0 {
        return Err(MediaError::encode_failed(format!(
            "frame {} has invalid dimensions {}x{}",
            frame.frame_index, frame.width, frame.height
        )));
    }
    if !frame.is_complete() {
        return Err(MediaError::encode_failed(format!(
            "frame {} has {} bytes, expected {}",
            frame.frame_index,
            frame.data.len(),
            frame.width as usize * frame.height as usize * 3
        )));
    }

    let mut buf = Vec::with_capacity(frame.data.len() / 8);
    let mut encoder = JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100));
    encoder
        .encode(&frame.data, frame.width, frame.height, ColorType::Rgb8)
        .map_err(|e| MediaError::encode_failed(e.to_string()))?;

    Ok(buf)
}
