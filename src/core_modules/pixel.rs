// THEORY:
// The `Pixel` module is the smallest unit of the analyzer. It is a "dumb" data
// container for one 24-bit pixel exactly as it sits in a BMP pixel buffer: three
// bytes in blue, green, red order. Every buffer-level transform in the crate walks
// the buffer in steps of `CHANNELS` and, where it needs arithmetic on a whole
// pixel, lifts the triple into a `Pixel`.
//
// Key principles:
// 1.  **File order**: Slot 0 is blue, slot 1 green, slot 2 red. The struct names
//     the slots but never reorders them on the way in or out.
// 2.  **Single-pixel scope**: Methods here read only this pixel's own channels
//     (luma, chroma differences). Anything spanning many pixels lives in
//     `SmartBuffer` or the transform modules.

pub mod pixel {
    pub type Byte = u8;
    pub type Bytes = Vec<Byte>;
    pub type Channel = Byte;
    pub type Luminance = f64;

    /// Bytes per pixel in a 24-bit buffer.
    pub const CHANNELS: usize = 3;

    /// A single 24-bit pixel in BMP (B, G, R) slot order.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct Pixel {
        /// Slot 0.
        pub blue: Channel,
        /// Slot 1.
        pub green: Channel,
        /// Slot 2.
        pub red: Channel,
    }

    impl Pixel {
        pub fn new(red: Channel, green: Channel, blue: Channel) -> Self {
            Pixel { blue, green, red }
        }

        /// A pixel with the same value in all three slots.
        pub fn gray(value: Channel) -> Self {
            Pixel::new(value, value, value)
        }

        /// Rec. 601 luma on the 0..255 scale.
        pub fn luminance(&self) -> Luminance {
            0.299 * self.red as f64 + 0.587 * self.green as f64 + 0.114 * self.blue as f64
        }

        /// Reads the pixel starting at `offset`, or `None` past the end of `bytes`.
        pub fn read(bytes: &[Byte], offset: usize) -> Option<Self> {
            bytes
                .get(offset..offset + CHANNELS)
                .map(|triple| Pixel { blue: triple[0], green: triple[1], red: triple[2] })
        }

        /// Writes the pixel at `offset`. The caller guarantees the slot is in bounds.
        pub fn write(&self, bytes: &mut [Byte], offset: usize) {
            bytes[offset..offset + CHANNELS].copy_from_slice(&self.to_bytes());
        }

        pub fn to_bytes(&self) -> [Byte; CHANNELS] {
            [self.blue, self.green, self.red]
        }
    }

    impl From<[Byte; CHANNELS]> for Pixel {
        fn from(bytes: [Byte; CHANNELS]) -> Self {
            Pixel { blue: bytes[0], green: bytes[1], red: bytes[2] }
        }
    }

    impl From<Pixel> for Bytes {
        fn from(pixel: Pixel) -> Self {
            pixel.to_bytes().to_vec()
        }
    }
}
