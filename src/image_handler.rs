//! Byte-blob decode and encode around the codec.
//!
//! The codec itself only ever sees [`PixelBuffer`]; this module converts
//! container bytes to and from that shape. Any format the `image` crate can
//! probe is accepted on the way in. On the way out the caller picks PNG,
//! JPEG or WebP.

use image::codecs::jpeg::JpegEncoder;
use image::codecs::webp::WebPEncoder;
use image::{DynamicImage, ImageFormat, RgbaImage};
use std::io::Cursor;

use crate::error::{Result, VeilmarkError};
use crate::pixels::PixelBuffer;

/// Default JPEG quality on the 0-1 scale.
pub const JPEG_QUALITY: f32 = 0.92;

/// Encoders the watermarker can write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Png,
    Jpeg,
    /// Lossless; the quality knob does not apply.
    WebP,
}

impl OutputFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            OutputFormat::Png => "image/png",
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::WebP => "image/webp",
        }
    }
}

/// Decode container bytes (PNG, JPEG, WebP, BMP, ...) into an RGBA buffer.
pub fn decode(bytes: &[u8]) -> Result<PixelBuffer> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| VeilmarkError::Decode(e.to_string()))?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    PixelBuffer::new(width, height, rgba.into_raw())
}

/// Encode a pixel buffer into the requested container format.
///
/// `quality` in `[0, 1]` applies to JPEG only and maps onto the encoder's
/// 1-100 scale. JPEG has no alpha channel, so the alpha plane is dropped
/// for that format.
pub fn encode(pixels: &PixelBuffer, format: OutputFormat, quality: f32) -> Result<Vec<u8>> {
    let rgba: RgbaImage =
        RgbaImage::from_raw(pixels.width(), pixels.height(), pixels.data().to_vec())
            .ok_or_else(|| {
                VeilmarkError::Encode("pixel buffer does not match its dimensions".into())
            })?;

    let mut bytes = Vec::new();
    match format {
        OutputFormat::Png => {
            DynamicImage::ImageRgba8(rgba)
                .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
                .map_err(|e| VeilmarkError::Encode(e.to_string()))?;
        }
        OutputFormat::Jpeg => {
            let rgb = DynamicImage::ImageRgba8(rgba).to_rgb8();
            let steps = (quality.clamp(0.0, 1.0) * 100.0).round().max(1.0) as u8;
            let encoder = JpegEncoder::new_with_quality(&mut bytes, steps);
            rgb.write_with_encoder(encoder)
                .map_err(|e| VeilmarkError::Encode(e.to_string()))?;
        }
        OutputFormat::WebP => {
            let encoder = WebPEncoder::new_lossless(&mut bytes);
            rgba.write_with_encoder(encoder)
                .map_err(|e| VeilmarkError::Encode(e.to_string()))?;
        }
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixels::CHANNELS;

    fn checkerboard(width: u32, height: u32) -> PixelBuffer {
        let mut data = Vec::with_capacity(width as usize * height as usize * CHANNELS);
        for y in 0..height {
            for x in 0..width {
                let level = if (x + y) % 2 == 0 { 40 } else { 215 };
                data.extend_from_slice(&[level, level, level, 255]);
            }
        }
        PixelBuffer::new(width, height, data).unwrap()
    }

    #[test]
    fn png_round_trip_is_lossless() {
        let pixels = checkerboard(32, 24);
        let bytes = encode(&pixels, OutputFormat::Png, JPEG_QUALITY).unwrap();
        let decoded = decode(&bytes).unwrap();
        assert_eq!(decoded, pixels);
    }

    #[test]
    fn webp_round_trip_is_lossless() {
        let pixels = checkerboard(32, 24);
        let bytes = encode(&pixels, OutputFormat::WebP, JPEG_QUALITY).unwrap();
        let decoded = decode(&bytes).unwrap();
        assert_eq!(decoded, pixels);
    }

    #[test]
    fn jpeg_encodes_and_decodes_to_same_shape() {
        let pixels = checkerboard(32, 24);
        let bytes = encode(&pixels, OutputFormat::Jpeg, 0.9).unwrap();
        let decoded = decode(&bytes).unwrap();
        assert_eq!(decoded.width(), 32);
        assert_eq!(decoded.height(), 24);
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let err = decode(b"definitely not an image").unwrap_err();
        assert!(matches!(err, VeilmarkError::Decode(_)));
    }

    #[test]
    fn mime_types() {
        assert_eq!(OutputFormat::Png.mime_type(), "image/png");
        assert_eq!(OutputFormat::Jpeg.mime_type(), "image/jpeg");
        assert_eq!(OutputFormat::WebP.mime_type(), "image/webp");
    }
}
