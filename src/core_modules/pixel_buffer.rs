// THEORY:
// The `PixelBuffer` is a read-only, row-major view over a decoded image. It owns a flat
// `Vec<Pixel>` of exactly `width * height` samples, so `offset = row * width + column`
// always lands inside the allocation. Callers never see raw pointers: single samples are
// reached through `get`, which panics on out-of-range coordinates, and hot loops scan
// whole rows through `row`, which hands out a bounds-checked slice. Once constructed the
// buffer is never mutated, which is what lets any number of workers share `&PixelBuffer`.

use crate::core_modules::pixel::pixel::Pixel;
use crate::error::ProcessingError;

/// A decoded image as a flat, row-major sequence of `Pixel`s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: usize,
    height: usize,
    samples: Vec<Pixel>,
}

impl PixelBuffer {
    /// Wraps `samples` as a `width x height` buffer.
    ///
    /// Fails with `BufferAccessFailure` when the sample count does not match the
    /// dimensions, since such a buffer could not be indexed safely.
    pub fn new(width: usize, height: usize, samples: Vec<Pixel>) -> Result<Self, ProcessingError> {
        let expected = width
            .checked_mul(height)
            .ok_or(ProcessingError::ContextCreationFailure)?;
        if samples.len() != expected {
            return Err(ProcessingError::BufferAccessFailure);
        }
        Ok(Self {
            width,
            height,
            samples,
        })
    }

    /// A buffer where every sample is `pixel`.
    ///
    /// # Panics
    /// Panics if `width * height` overflows `usize`.
    pub fn filled(width: usize, height: usize, pixel: Pixel) -> Self {
        Self {
            width,
            height,
            samples: vec![pixel; sample_count(width, height)],
        }
    }

    /// Builds a buffer by evaluating `f(row, column)` for every position.
    ///
    /// # Panics
    /// Panics if `width * height` overflows `usize`.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> Pixel) -> Self {
        let mut samples = Vec::with_capacity(sample_count(width, height));
        for row in 0..height {
            for column in 0..width {
                samples.push(f(row, column));
            }
        }
        Self {
            width,
            height,
            samples,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// The sample at (`row`, `column`).
    ///
    /// # Panics
    /// Panics if `row >= height` or `column >= width`.
    #[inline]
    pub fn get(&self, row: usize, column: usize) -> Pixel {
        assert!(
            row < self.height && column < self.width,
            "pixel ({row}, {column}) out of bounds for {}x{} buffer",
            self.width,
            self.height
        );
        self.samples[row * self.width + column]
    }

    #[inline]
    pub fn is_target(&self, row: usize, column: usize) -> bool {
        self.get(row, column).is_target()
    }

    /// All samples of `row`, contiguous.
    ///
    /// # Panics
    /// Panics if `row >= height`.
    #[inline]
    pub fn row(&self, row: usize) -> &[Pixel] {
        assert!(row < self.height, "row {row} out of bounds for height {}", self.height);
        let start = row * self.width;
        &self.samples[start..start + self.width]
    }

    /// Number of target samples in `row`.
    #[inline]
    pub fn count_row(&self, row: usize) -> usize {
        self.row(row).iter().filter(|pixel| pixel.is_target()).count()
    }

    pub fn samples(&self) -> &[Pixel] {
        &self.samples
    }
}

fn sample_count(width: usize, height: usize) -> usize {
    width
        .checked_mul(height)
        .unwrap_or_else(|| panic!("{width}x{height} buffer overflows usize"))
}
