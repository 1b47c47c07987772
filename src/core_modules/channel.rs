// THEORY:
// A pixel buffer carries three interleaved byte planes, and callers name a plane with
// a single-character label. What a label means depends on what the buffer holds:
// in an RGB buffer the planes are blue, green, red (slots 0, 1, 2); in a luma/chroma
// buffer they are Y, Cb, Cr (slots 0, 1, 2). The label table below is the one place
// that knowledge lives. Its luma/chroma half sends 'Y' to slot 2 and 'R' to slot 0,
// crosswise to the stored layout, and 'r' and 'R' resolve to different slots.
//
// The Channel Extractor sits here too: it copies a buffer and zeroes the two planes
// that were not selected, which is how the per-channel visualizations are produced.

use crate::core_modules::error::{BitmapError, Result};
use crate::core_modules::pixel::pixel::{Byte, Bytes, CHANNELS};
use std::fmt;

/// What the three planes of a buffer represent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    /// Slots hold (B, G, R).
    Rgb,
    /// Slots hold (Y, Cb, Cr).
    LumaChroma,
}

impl fmt::Display for ColorSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorSpace::Rgb => write!(f, "RGB"),
            ColorSpace::LumaChroma => write!(f, "YCbCr"),
        }
    }
}

/// Slot index (0, 1 or 2) of a plane inside a pixel triple.
pub type ChannelIndex = usize;

pub const BLUE: ChannelIndex = 0;
pub const GREEN: ChannelIndex = 1;
pub const RED: ChannelIndex = 2;

// Slots the luma/chroma labels resolve to: 'R', 'B' and 'Y'.
pub const CHROMA_RED: ChannelIndex = 0;
pub const CHROMA_BLUE: ChannelIndex = 1;
pub const LUMA: ChannelIndex = 2;

/// Resolves a symbolic channel label to its slot for the given buffer context.
pub fn channel_index(label: char, space: ColorSpace) -> Result<ChannelIndex> {
    let index = match (space, label) {
        (ColorSpace::Rgb, 'r') => RED,
        (ColorSpace::Rgb, 'g') => GREEN,
        (ColorSpace::Rgb, 'b') => BLUE,
        (ColorSpace::LumaChroma, 'Y') => LUMA,
        (ColorSpace::LumaChroma, 'B') => CHROMA_BLUE,
        (ColorSpace::LumaChroma, 'R') => CHROMA_RED,
        _ => return Err(BitmapError::UnknownChannel { label, space }),
    };
    Ok(index)
}

/// Copies `buffer`, keeping slot `keep` and zeroing the other two in every triple.
/// A trailing partial triple is treated the same way for the slots it has.
pub fn isolate_channel(buffer: &[Byte], keep: ChannelIndex) -> Bytes {
    let mut isolated = buffer.to_vec();
    for triple in isolated.chunks_mut(CHANNELS) {
        for (slot, value) in triple.iter_mut().enumerate() {
            if slot != keep {
                *value = 0x00;
            }
        }
    }
    isolated
}

pub fn red_component(buffer: &[Byte]) -> Bytes {
    isolate_channel(buffer, RED)
}

pub fn green_component(buffer: &[Byte]) -> Bytes {
    isolate_channel(buffer, GREEN)
}

pub fn blue_component(buffer: &[Byte]) -> Bytes {
    isolate_channel(buffer, BLUE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgb_labels_follow_file_order() {
        assert_eq!(channel_index('r', ColorSpace::Rgb).unwrap(), 2);
        assert_eq!(channel_index('g', ColorSpace::Rgb).unwrap(), 1);
        assert_eq!(channel_index('b', ColorSpace::Rgb).unwrap(), 0);
    }

    #[test]
    fn luma_chroma_labels() {
        assert_eq!(channel_index('Y', ColorSpace::LumaChroma).unwrap(), 2);
        assert_eq!(channel_index('B', ColorSpace::LumaChroma).unwrap(), 1);
        assert_eq!(channel_index('R', ColorSpace::LumaChroma).unwrap(), 0);
    }

    #[test]
    fn labels_do_not_cross_contexts() {
        assert!(matches!(
            channel_index('Y', ColorSpace::Rgb),
            Err(BitmapError::UnknownChannel { label: 'Y', space: ColorSpace::Rgb })
        ));
        assert!(channel_index('r', ColorSpace::LumaChroma).is_err());
        assert!(channel_index('x', ColorSpace::Rgb).is_err());
    }

    #[test]
    fn components_zero_the_other_slots() {
        let buffer = vec![1, 2, 3, 4, 5, 6];
        assert_eq!(red_component(&buffer), vec![0, 0, 3, 0, 0, 6]);
        assert_eq!(green_component(&buffer), vec![0, 2, 0, 0, 5, 0]);
        assert_eq!(blue_component(&buffer), vec![1, 0, 0, 4, 0, 0]);
        assert_eq!(buffer, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn extraction_is_idempotent() {
        let buffer: Vec<u8> = (0..=255u8).cycle().take(300).collect();
        for extract in [red_component, green_component, blue_component] {
            let once = extract(&buffer);
            assert_eq!(extract(&once), once);
        }
    }

    #[test]
    fn trailing_partial_triple_is_handled() {
        let buffer = vec![1, 2, 3, 4, 5];
        assert_eq!(green_component(&buffer), vec![0, 2, 0, 0, 5]);
    }
}
