pub mod accumulator;
pub mod decoder;
pub mod partition;
pub mod pixel;
pub mod pixel_buffer;
pub mod strategy;
