// THEORY:
// This file is the entry point for the `pixel_census` library crate. It exposes the
// counting `Engine`, its configuration and result types, the strategy selector, and the
// buffer types a caller needs to hand an already-decoded image to the engine.
//
// The leaf components (pixels, buffers, partitioning, accumulators, strategies and the
// decoder seam) live under `core_modules`. They stay public so benchmarks and callers
// can run a single strategy directly, but the intended front door is `Engine`.

pub mod core_modules;
pub mod error;
pub mod parallel_pipeline;
pub mod pipeline;

pub use crate::core_modules::decoder::{BufferSource, EncodedImage, RawRgba};
pub use crate::core_modules::pixel::pixel::Pixel;
pub use crate::core_modules::pixel_buffer::PixelBuffer;
pub use crate::core_modules::strategy::{
    ColumnMajor, CountingStrategy, NaiveParallel, Sequential, Strategy, StridedParallel,
};
pub use crate::error::ProcessingError;
pub use crate::parallel_pipeline::CountHandle;
pub use crate::pipeline::{CountResult, Engine, EngineConfig};
