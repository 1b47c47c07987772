// THEORY:
// The color-space converter moves a 24-bit buffer between RGB and a full-resolution
// luma/chroma (YCbCr, 4:4:4) representation. Both directions work one triple at a
// time and always produce a new buffer.
//
// A luma/chroma triple is stored as (Y, Cb, Cr) in slots 0..2. The label table in
// `channel` is applied to that layout as is, so 'Y' reads slot 2 (Cr) and 'R' reads
// slot 0 (Y). The reported luma/chroma correlations depend on that mapping.
//
// The two directions are deliberately asymmetric:
// - forward: floating-point result truncated to u8 with no explicit clamp;
// - inverse: result clamped to [0, 255] first, then truncated.
// The round trip is lossy. PSNR against the source is how that loss is measured.

use crate::core_modules::bitmap::Bitmap;
use crate::core_modules::output_sink::{ArtifactStore, LUMA_CHROMA_DIR, RGB_DIR, artifact_name};
use crate::core_modules::pixel::pixel::{Byte, Bytes, CHANNELS, Pixel};
use tracing::debug;

const CHROMA_OFFSET: f64 = 128.0;

const CB_SCALE: f64 = 0.5643;
const CR_SCALE: f64 = 0.7132;

const R_FROM_CR: f64 = 1.402;
const G_FROM_CR: f64 = 0.714;
const G_FROM_CB: f64 = 0.334;
const B_FROM_CB: f64 = 1.772;

/// One pixel in luma/chroma form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LumaChroma {
    pub luma: Byte,
    pub chroma_blue: Byte,
    pub chroma_red: Byte,
}

impl LumaChroma {
    pub fn from_bytes(triple: &[Byte]) -> Self {
        Self { luma: triple[0], chroma_blue: triple[1], chroma_red: triple[2] }
    }

    pub fn to_bytes(&self) -> [Byte; CHANNELS] {
        [self.luma, self.chroma_blue, self.chroma_red]
    }

    /// Forward transform; each component is truncated toward zero.
    pub fn from_pixel(pixel: &Pixel) -> Self {
        let luma = pixel.luminance();
        let chroma_blue = CB_SCALE * (pixel.blue as f64 - luma) + CHROMA_OFFSET;
        let chroma_red = CR_SCALE * (pixel.red as f64 - luma) + CHROMA_OFFSET;
        Self {
            luma: luma as Byte,
            chroma_blue: chroma_blue as Byte,
            chroma_red: chroma_red as Byte,
        }
    }

    /// Inverse transform; each component is clamped to [0, 255] before truncation.
    pub fn to_pixel(&self) -> Pixel {
        let luma = self.luma as f64;
        let cb = self.chroma_blue as f64 - CHROMA_OFFSET;
        let cr = self.chroma_red as f64 - CHROMA_OFFSET;

        let red = luma + R_FROM_CR * cr;
        let green = luma - G_FROM_CR * cr - G_FROM_CB * cb;
        let blue = luma + B_FROM_CB * cb;
        Pixel::new(clamp_to_byte(red), clamp_to_byte(green), clamp_to_byte(blue))
    }
}

fn clamp_to_byte(value: f64) -> Byte {
    value.clamp(0.0, 255.0) as Byte
}

/// Applies `convert` to every whole triple. A trailing partial triple is copied as is.
fn map_triples(buffer: &[Byte], convert: impl Fn(&[Byte]) -> [Byte; CHANNELS]) -> Bytes {
    let mut converted = Vec::with_capacity(buffer.len());
    let triples = buffer.chunks_exact(CHANNELS);
    let remainder = triples.remainder();
    for triple in triples {
        converted.extend_from_slice(&convert(triple));
    }
    converted.extend_from_slice(remainder);
    converted
}

/// RGB buffer -> interleaved (Y, Cb, Cr) buffer.
pub fn to_luma_chroma(buffer: &[Byte]) -> Bytes {
    map_triples(buffer, |triple| {
        LumaChroma::from_pixel(&Pixel::from([triple[0], triple[1], triple[2]])).to_bytes()
    })
}

/// Interleaved (Y, Cb, Cr) buffer -> RGB buffer.
pub fn to_rgb(buffer: &[Byte]) -> Bytes {
    map_triples(buffer, |triple| LumaChroma::from_bytes(triple).to_pixel().to_bytes())
}

/// The luma/chroma buffer plus one gray visualization per plane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LumaChromaPlanes {
    /// (Y, Y, Y) per pixel.
    pub luma: Bytes,
    /// (Cb, Cb, Cb) per pixel.
    pub chroma_blue: Bytes,
    /// (Cr, Cr, Cr) per pixel.
    pub chroma_red: Bytes,
    /// (Y, Cb, Cr) per pixel.
    pub interleaved: Bytes,
}

pub fn luma_chroma_planes(buffer: &[Byte]) -> LumaChromaPlanes {
    let interleaved = to_luma_chroma(buffer);
    let replicate = |pick: fn(&LumaChroma) -> Byte| {
        map_triples(&interleaved, |triple| [pick(&LumaChroma::from_bytes(triple)); CHANNELS])
    };
    let luma = replicate(|lc| lc.luma);
    let chroma_blue = replicate(|lc| lc.chroma_blue);
    let chroma_red = replicate(|lc| lc.chroma_red);
    LumaChromaPlanes { luma, chroma_blue, chroma_red, interleaved }
}

impl Bitmap {
    /// Converts the image's own pixels and persists `YCbCr/Y`, `YCbCr/Cb`,
    /// `YCbCr/Cr` and `YCbCr/YCbCr`. Returns the interleaved buffer.
    pub fn convert_to_luma_chroma(&self, store: &mut dyn ArtifactStore) -> Bytes {
        let planes = luma_chroma_planes(self.data());
        self.save_buffer(store, &artifact_name(LUMA_CHROMA_DIR, "Y"), &planes.luma);
        self.save_buffer(store, &artifact_name(LUMA_CHROMA_DIR, "Cb"), &planes.chroma_blue);
        self.save_buffer(store, &artifact_name(LUMA_CHROMA_DIR, "Cr"), &planes.chroma_red);
        self.save_buffer(store, &artifact_name(LUMA_CHROMA_DIR, "YCbCr"), &planes.interleaved);
        debug!(bytes = planes.interleaved.len(), "converted to YCbCr");
        planes.interleaved
    }

    /// Converts a luma/chroma `buffer` back to RGB and persists `RGB/reconvertedRGB`.
    pub fn convert_to_rgb(&self, store: &mut dyn ArtifactStore, buffer: &[Byte]) -> Bytes {
        let rgb = to_rgb(buffer);
        self.save_buffer(store, &artifact_name(RGB_DIR, "reconvertedRGB"), &rgb);
        debug!(bytes = rgb.len(), "converted to RGB");
        rgb
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::channel::ColorSpace;
    use crate::core_modules::output_sink::MemoryStore;
    use crate::core_modules::smart_buffer::SmartBuffer;

    #[test]
    fn forward_truncates() {
        // Y = 0.299*200 + 0.587*100 + 0.114*50 = 124.2
        let lc = LumaChroma::from_pixel(&Pixel::new(200, 100, 50));
        assert_eq!(lc.luma, 124);
        // Cb = 0.5643 * (50 - 124.2) + 128 = 86.129...
        assert_eq!(lc.chroma_blue, 86);
        // Cr = 0.7132 * (200 - 124.2) + 128 = 182.060...
        assert_eq!(lc.chroma_red, 182);
    }

    #[test]
    fn inverse_clamps_before_truncating() {
        let bright = LumaChroma { luma: 250, chroma_blue: 128, chroma_red: 255 }.to_pixel();
        assert_eq!(bright.red, 255);
        let dark = LumaChroma { luma: 5, chroma_blue: 0, chroma_red: 128 }.to_pixel();
        assert_eq!(dark.blue, 0);
    }

    #[test]
    fn luma_leads_each_triple() {
        let buffer = to_luma_chroma(&[50, 100, 200]);
        assert_eq!(buffer, vec![124, 86, 182]);
    }

    #[test]
    fn labels_read_the_stored_slots() {
        let buffer = to_luma_chroma(&[50, 100, 200]);
        let view = SmartBuffer::new(&buffer, 1, 1, ColorSpace::LumaChroma)
            .expect("Error building view.");
        // 'R' resolves to slot 0, which holds Y.
        assert_eq!(view.mean('R').unwrap(), 124.0);
        assert_eq!(view.mean('B').unwrap(), 86.0);
        assert_eq!(view.mean('Y').unwrap(), 182.0);
    }

    #[test]
    fn gray_round_trip_stays_close() {
        let buffer: Vec<u8> = (0..=255u8).flat_map(|k| [k, k, k]).collect();
        let restored = to_rgb(&to_luma_chroma(&buffer));
        for (k, triple) in restored.chunks_exact(3).enumerate() {
            for &value in triple {
                assert!((value as i32 - k as i32).abs() <= 2, "gray {k} became {value}");
            }
        }
    }

    #[test]
    fn partial_triple_is_carried_over() {
        let buffer = to_luma_chroma(&[50, 100, 200, 7]);
        assert_eq!(buffer.len(), 4);
        assert_eq!(buffer[3], 7);
    }

    #[test]
    fn planes_replicate_each_component() {
        let planes = luma_chroma_planes(&[50, 100, 200]);
        assert_eq!(planes.luma, vec![124, 124, 124]);
        assert_eq!(planes.chroma_blue, vec![86, 86, 86]);
        assert_eq!(planes.chroma_red, vec![182, 182, 182]);
        assert_eq!(planes.interleaved, vec![124, 86, 182]);
    }

    #[test]
    fn bitmap_conversion_persists_artifacts() {
        let data: Vec<u8> = (0..48u8).collect();
        let bitmap = Bitmap::from_pixels(4, 4, data.clone()).unwrap();
        let mut store = MemoryStore::new();

        let ycbcr = bitmap.convert_to_luma_chroma(&mut store);
        let rgb = bitmap.convert_to_rgb(&mut store, &ycbcr);

        assert_eq!(ycbcr, to_luma_chroma(&data));
        assert_eq!(rgb, to_rgb(&ycbcr));
        for name in ["YCbCr/Y.bmp", "YCbCr/Cb.bmp", "YCbCr/Cr.bmp", "YCbCr/YCbCr.bmp", "RGB/reconvertedRGB.bmp"] {
            assert!(store.get(name).is_some(), "missing {name}");
        }
        assert_eq!(&store.get("YCbCr/YCbCr.bmp").unwrap()[54..], ycbcr.as_slice());
        assert_eq!(bitmap.data(), data.as_slice());
    }
}
