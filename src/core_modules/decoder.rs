// THEORY:
// Decoding is not the engine's job, but its failures are. A `BufferSource` is anything
// that can be turned into a `PixelBuffer`; the engine calls `prepare` after starting its
// overall clock, so decode and conversion time show up in the total duration.
//
// Failure mapping:
// - nothing to decode, or bytes the `image` crate cannot read   -> DecodeFailure
// - dimensions that overflow, or a sample allocation that fails -> ContextCreationFailure
// - raw bytes that do not form exactly width * height RGBA samples -> BufferAccessFailure

use image::{DynamicImage, RgbaImage};

use crate::core_modules::pixel::pixel::{CHANNELS, Pixel};
use crate::core_modules::pixel_buffer::PixelBuffer;
use crate::error::ProcessingError;

/// Something that can be prepared into a decoded `PixelBuffer`.
pub trait BufferSource {
    fn prepare(self) -> Result<PixelBuffer, ProcessingError>;
}

impl BufferSource for PixelBuffer {
    fn prepare(self) -> Result<PixelBuffer, ProcessingError> {
        Ok(self)
    }
}

/// A missing image is a decode failure.
impl<S: BufferSource> BufferSource for Option<S> {
    fn prepare(self) -> Result<PixelBuffer, ProcessingError> {
        self.ok_or(ProcessingError::DecodeFailure)?.prepare()
    }
}

/// Already-decoded bytes, 4 per pixel, row-major, RGBA order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRgba {
    pub bytes: Vec<u8>,
    pub width: usize,
    pub height: usize,
}

impl RawRgba {
    pub fn new(bytes: Vec<u8>, width: usize, height: usize) -> Self {
        Self { bytes, width, height }
    }
}

impl BufferSource for RawRgba {
    fn prepare(self) -> Result<PixelBuffer, ProcessingError> {
        samples_from_bytes(&self.bytes, self.width, self.height)
    }
}

/// A compressed image (PNG, JPEG, ...) still to be decoded.
#[derive(Debug, Clone, Copy)]
pub struct EncodedImage<'a>(pub &'a [u8]);

impl BufferSource for EncodedImage<'_> {
    fn prepare(self) -> Result<PixelBuffer, ProcessingError> {
        if self.0.is_empty() {
            return Err(ProcessingError::DecodeFailure);
        }
        let image = image::load_from_memory(self.0).map_err(|err| {
            tracing::debug!(error = %err, "image decode failed");
            ProcessingError::DecodeFailure
        })?;
        image.prepare()
    }
}

impl BufferSource for DynamicImage {
    fn prepare(self) -> Result<PixelBuffer, ProcessingError> {
        self.into_rgba8().prepare()
    }
}

impl BufferSource for RgbaImage {
    fn prepare(self) -> Result<PixelBuffer, ProcessingError> {
        let width = self.width() as usize;
        let height = self.height() as usize;
        samples_from_bytes(self.as_raw(), width, height)
    }
}

fn samples_from_bytes(bytes: &[u8], width: usize, height: usize) -> Result<PixelBuffer, ProcessingError> {
    let pixel_count = width
        .checked_mul(height)
        .ok_or(ProcessingError::ContextCreationFailure)?;
    let byte_count = pixel_count
        .checked_mul(CHANNELS)
        .ok_or(ProcessingError::ContextCreationFailure)?;
    if bytes.len() != byte_count {
        return Err(ProcessingError::BufferAccessFailure);
    }

    let mut samples = Vec::new();
    samples
        .try_reserve_exact(pixel_count)
        .map_err(|_| ProcessingError::ContextCreationFailure)?;
    samples.extend(
        bytes
            .chunks_exact(CHANNELS)
            .map(|chunk| Pixel::new(chunk[0], chunk[1], chunk[2], chunk[3])),
    );

    PixelBuffer::new(width, height, samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageEncoder, Rgba};
    use std::io::Cursor;

    fn encode_png(image: &RgbaImage) -> Vec<u8> {
        let mut bytes = Cursor::new(Vec::new());
        image::codecs::png::PngEncoder::new(&mut bytes)
            .write_image(
                image.as_raw(),
                image.width(),
                image.height(),
                image::ExtendedColorType::Rgba8,
            )
            .expect("png encode");
        bytes.into_inner()
    }

    #[test]
    fn none_is_a_decode_failure() {
        let source: Option<PixelBuffer> = None;
        assert_eq!(source.prepare(), Err(ProcessingError::DecodeFailure));
    }

    #[test]
    fn some_prepares_the_inner_source() {
        let buffer = PixelBuffer::filled(2, 2, Pixel::WHITE);
        assert_eq!(Some(buffer.clone()).prepare(), Ok(buffer));
    }

    #[test]
    fn raw_bytes_keep_rgba_order() {
        let raw = RawRgba::new(vec![1, 2, 3, 4, 255, 255, 255, 255], 2, 1);
        let buffer = raw.prepare().expect("valid raw buffer");
        assert_eq!(buffer.get(0, 0), Pixel::new(1, 2, 3, 4));
        assert!(buffer.is_target(0, 1));
    }

    #[test]
    fn raw_bytes_with_wrong_length_are_inaccessible() {
        let raw = RawRgba::new(vec![255; 4 * 6 - 1], 3, 2);
        assert_eq!(raw.prepare(), Err(ProcessingError::BufferAccessFailure));
    }

    #[test]
    fn overflowing_dimensions_cannot_get_a_context() {
        let raw = RawRgba::new(Vec::new(), usize::MAX, 2);
        assert_eq!(raw.prepare(), Err(ProcessingError::ContextCreationFailure));
    }

    #[test]
    fn empty_or_garbage_bytes_fail_to_decode() {
        assert_eq!(EncodedImage(&[]).prepare(), Err(ProcessingError::DecodeFailure));
        assert_eq!(
            EncodedImage(b"definitely not an image").prepare(),
            Err(ProcessingError::DecodeFailure)
        );
    }

    #[test]
    fn decodes_png_bytes() {
        let image = RgbaImage::from_fn(6, 4, |x, _| {
            if x < 2 { Rgba([255, 255, 255, 255]) } else { Rgba([10, 20, 30, 255]) }
        });
        let bytes = encode_png(&image);

        let buffer = EncodedImage(&bytes).prepare().expect("png decodes");
        assert_eq!((buffer.width(), buffer.height()), (6, 4));
        assert!(buffer.is_target(3, 1));
        assert!(!buffer.is_target(3, 2));
    }

    #[test]
    fn dynamic_images_are_converted_to_rgba() {
        let gray = DynamicImage::ImageLuma8(image::GrayImage::from_pixel(3, 3, image::Luma([255])));
        let buffer = gray.prepare().expect("luma converts");
        assert!(buffer.samples().iter().all(Pixel::is_target));
    }
}
