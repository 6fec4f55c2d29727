// THEORY:
// The `Pixel` module is the smallest unit the counting engine reasons about. It is a
// "dumb" 4-byte data container with a fixed component order (RGBA) and nothing else.
// The only question the engine ever asks of a pixel is "is this exactly the target?",
// so equality is the whole API surface.
//
// The target (opaque white) is a compile-time constant. It is never derived per call,
// which keeps every strategy comparing against the same value.

pub mod pixel {
    pub type Byte = u8;
    pub type Channel = Byte;

    /// Number of bytes in one decoded sample.
    pub const CHANNELS: usize = 4;

    /// A single RGBA sample, 8 bits per channel.
    #[repr(C)]
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Pixel {
        /// The red channel value (0-255).
        pub red: Channel,
        /// The green channel value (0-255).
        pub green: Channel,
        /// The blue channel value (0-255).
        pub blue: Channel,
        /// The alpha (transparency) channel value (0-255).
        pub alpha: Channel,
    }

    impl Pixel {
        pub const WHITE: Pixel = Pixel::new(255, 255, 255, 255);
        pub const BLACK: Pixel = Pixel::new(0, 0, 0, 255);

        /// The sample every strategy counts.
        pub const TARGET: Pixel = Pixel::WHITE;

        pub const fn new(red: Channel, green: Channel, blue: Channel, alpha: Channel) -> Self {
            Pixel {
                red,
                green,
                blue,
                alpha,
            }
        }

        #[inline]
        pub fn is_target(&self) -> bool {
            *self == Self::TARGET
        }
    }

    impl From<[Byte; CHANNELS]> for Pixel {
        fn from(bytes: [Byte; CHANNELS]) -> Self {
            Pixel::new(bytes[0], bytes[1], bytes[2], bytes[3])
        }
    }

    impl From<Pixel> for [Byte; CHANNELS] {
        fn from(pixel: Pixel) -> Self {
            [pixel.red, pixel.green, pixel.blue, pixel.alpha]
        }
    }

    impl From<image::Rgba<u8>> for Pixel {
        fn from(rgba: image::Rgba<u8>) -> Self {
            Pixel::from(rgba.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::pixel::*;

    #[test]
    fn target_is_opaque_white() {
        assert_eq!(Pixel::TARGET, Pixel::new(255, 255, 255, 255));
        assert!(Pixel::WHITE.is_target());
    }

    #[test]
    fn any_channel_difference_is_not_target() {
        assert!(!Pixel::new(254, 255, 255, 255).is_target());
        assert!(!Pixel::new(255, 254, 255, 255).is_target());
        assert!(!Pixel::new(255, 255, 254, 255).is_target());
        // Transparent white is a different sample.
        assert!(!Pixel::new(255, 255, 255, 0).is_target());
        assert!(!Pixel::BLACK.is_target());
    }

    #[test]
    fn byte_order_is_rgba() {
        let pixel = Pixel::from([1, 2, 3, 4]);
        assert_eq!(pixel.red, 1);
        assert_eq!(pixel.green, 2);
        assert_eq!(pixel.blue, 3);
        assert_eq!(pixel.alpha, 4);
        assert_eq!(<[u8; CHANNELS]>::from(pixel), [1, 2, 3, 4]);
    }

    #[test]
    fn converts_from_image_rgba() {
        let pixel = Pixel::from(image::Rgba([255, 255, 255, 255]));
        assert!(pixel.is_target());
    }
}
