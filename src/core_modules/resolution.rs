// THEORY:
// The resolution transformer changes an image's size in place. Each operation builds
// a fresh buffer with exact `width * height * 3` length, then hands it to
// `Bitmap::replace_buffer`, so the headers never disagree with the pixels.
//
// Three strategies, none of them a real resampling filter:
// 1.  **Stride decimation**: keep every `factor`-th pixel on both axes.
// 2.  **Block averaging**: fixed 2x reduction; each output pixel is the truncated
//     per-channel mean of a 2x2 block. Odd trailing rows/columns are dropped.
// 3.  **Restoration**: upsample by `factor` with a checkerboard rule. An output
//     pixel whose x and y have the same parity is copied from the source pixel at
//     (x / factor, y / factor). Every other output pixel repeats its left neighbor,
//     or the pixel above it in the first column. The diagonal striping this
//     produces is part of the expected output.
//
// Coordinates are (x, y) in buffer order: row 0 is the first row stored, which for
// a bottom-up bitmap is the bottom of the picture.

use crate::core_modules::bitmap::Bitmap;
use crate::core_modules::error::{BitmapError, Result};
use crate::core_modules::pixel::pixel::{Bytes, CHANNELS, Pixel};
use tracing::debug;

fn offset(x: usize, y: usize, width: usize) -> usize {
    (y * width + x) * CHANNELS
}

fn checked_factor(factor: u32) -> Result<usize> {
    match factor {
        0 => Err(BitmapError::Domain("resize factor must be at least 1".to_string())),
        factor => Ok(factor as usize),
    }
}

fn source_pixel(bitmap: &Bitmap, x: usize, y: usize) -> Result<Pixel> {
    let width = bitmap.width() as usize;
    Pixel::read(bitmap.data(), offset(x, y, width)).ok_or_else(|| BitmapError::BufferSize {
        expected: bitmap.pixel_count() * CHANNELS,
        actual: bitmap.data().len(),
    })
}

impl Bitmap {
    /// Keeps every `factor`-th pixel along each axis.
    pub fn decimate_even(&mut self, factor: u32) -> Result<()> {
        let step = checked_factor(factor)?;
        let new_width = self.width() / factor;
        let new_height = self.height() / factor;
        let (width, height) = (new_width as usize, new_height as usize);

        let mut decimated: Bytes = vec![0; width * height * CHANNELS];
        for y in 0..height {
            for x in 0..width {
                source_pixel(self, x * step, y * step)?.write(&mut decimated, offset(x, y, width));
            }
        }

        debug!(factor, from_width = self.width(), from_height = self.height(), new_width, new_height, "stride decimation");
        self.replace_buffer(new_width, new_height, decimated)
    }

    /// Halves both dimensions by averaging each 2x2 block.
    pub fn decimate_average(&mut self) -> Result<()> {
        let new_width = self.width() / 2;
        let new_height = self.height() / 2;
        let (width, height) = (new_width as usize, new_height as usize);

        let mut decimated: Bytes = vec![0; width * height * CHANNELS];
        for y in 0..height {
            for x in 0..width {
                let block = [
                    source_pixel(self, 2 * x, 2 * y)?,
                    source_pixel(self, 2 * x + 1, 2 * y)?,
                    source_pixel(self, 2 * x, 2 * y + 1)?,
                    source_pixel(self, 2 * x + 1, 2 * y + 1)?,
                ];
                let mean = |pick: fn(&Pixel) -> u8| {
                    (block.iter().map(|p| pick(p) as u16).sum::<u16>() / 4) as u8
                };
                Pixel::new(mean(|p| p.red), mean(|p| p.green), mean(|p| p.blue))
                    .write(&mut decimated, offset(x, y, width));
            }
        }

        debug!(from_width = self.width(), from_height = self.height(), new_width, new_height, "block-average decimation");
        self.replace_buffer(new_width, new_height, decimated)
    }

    /// Upsamples by `factor` with checkerboard placement and fill-forward.
    pub fn restore(&mut self, factor: u32) -> Result<()> {
        let scale = checked_factor(factor)?;
        let new_width = self
            .width()
            .checked_mul(factor)
            .ok_or_else(|| BitmapError::Domain("restored width overflows".to_string()))?;
        let new_height = self
            .height()
            .checked_mul(factor)
            .ok_or_else(|| BitmapError::Domain("restored height overflows".to_string()))?;
        let (width, height) = (new_width as usize, new_height as usize);

        let mut restored: Bytes = vec![0; width * height * CHANNELS];
        for y in 0..height {
            for x in 0..width {
                let pixel = if x % 2 == y % 2 {
                    source_pixel(self, x / scale, y / scale)?
                } else if x > 0 {
                    Pixel::read(&restored, offset(x - 1, y, width)).unwrap_or_default()
                } else {
                    // x == 0 with odd y, so the row above exists.
                    Pixel::read(&restored, offset(x, y - 1, width)).unwrap_or_default()
                };
                pixel.write(&mut restored, offset(x, y, width));
            }
        }

        debug!(factor, new_width, new_height, "restoration");
        self.replace_buffer(new_width, new_height, restored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Each pixel encodes its own coordinates: (x, y, x ^ y).
    fn coordinate_image(width: u32, height: u32) -> Bitmap {
        let data = (0..height)
            .flat_map(|y| (0..width).flat_map(move |x| [x as u8, y as u8, (x ^ y) as u8]))
            .collect();
        Bitmap::from_pixels(width, height, data).expect("Error building bitmap.")
    }

    fn pixel_at(bitmap: &Bitmap, x: u32, y: u32) -> Pixel {
        source_pixel(bitmap, x as usize, y as usize).expect("Pixel out of range.")
    }

    #[test]
    fn stride_decimation_samples_every_other_pixel() {
        let source = coordinate_image(100, 100);
        let mut decimated = source.clone();
        decimated.decimate_even(2).expect("Error decimating.");

        assert_eq!((decimated.width(), decimated.height()), (50, 50));
        assert_eq!(decimated.data().len(), 50 * 50 * 3);
        for y in 0..50 {
            for x in 0..50 {
                assert_eq!(pixel_at(&decimated, x, y), pixel_at(&source, 2 * x, 2 * y));
            }
        }
    }

    #[test]
    fn stride_decimation_floors_dimensions() {
        let mut bitmap = coordinate_image(7, 5);
        bitmap.decimate_even(3).expect("Error decimating.");
        assert_eq!((bitmap.width(), bitmap.height()), (2, 1));
        assert_eq!(bitmap.info_header().image_size, 6);
        assert_eq!(bitmap.file_header().file_size, 54 + 6);
    }

    #[test]
    fn zero_factor_is_rejected() {
        let mut bitmap = coordinate_image(4, 4);
        assert!(matches!(bitmap.decimate_even(0), Err(BitmapError::Domain(_))));
        assert!(matches!(bitmap.restore(0), Err(BitmapError::Domain(_))));
        assert_eq!((bitmap.width(), bitmap.height()), (4, 4));
    }

    #[test]
    fn block_average_truncates() {
        // 2x2 image, one output pixel. Blue slot: 1 + 2 + 3 + 5 = 11 -> 2.
        let data = vec![1, 10, 255, 2, 20, 255, 3, 30, 255, 5, 40, 254];
        let mut bitmap = Bitmap::from_pixels(2, 2, data).unwrap();
        bitmap.decimate_average().expect("Error decimating.");
        assert_eq!((bitmap.width(), bitmap.height()), (1, 1));
        assert_eq!(bitmap.data(), &[2, 25, 254]);
    }

    #[test]
    fn block_average_drops_odd_edges() {
        let mut bitmap = coordinate_image(5, 3);
        bitmap.decimate_average().expect("Error decimating.");
        assert_eq!((bitmap.width(), bitmap.height()), (2, 1));
        // Block (2..4, 0..2): x values 2, 3, 2, 3 -> 2; y values 0, 0, 1, 1 -> 0.
        let pixel = pixel_at(&bitmap, 1, 0);
        assert_eq!((pixel.blue, pixel.green), (2, 0));
    }

    #[test]
    fn restoration_places_same_parity_pixels_from_source() {
        let source = coordinate_image(4, 4);
        let mut restored = source.clone();
        restored.restore(2).expect("Error restoring.");

        assert_eq!((restored.width(), restored.height()), (8, 8));
        assert_eq!(restored.data().len(), 8 * 8 * 3);
        assert_eq!(restored.info_header().image_size, 192);
        for y in 0..8 {
            for x in 0..8 {
                if x % 2 == y % 2 {
                    assert_eq!(pixel_at(&restored, x, y), pixel_at(&source, x / 2, y / 2));
                }
            }
        }
    }

    #[test]
    fn restoration_fills_forward() {
        let source = coordinate_image(4, 4);
        let mut restored = source.clone();
        restored.restore(2).expect("Error restoring.");

        for y in 0..8 {
            for x in 0..8 {
                if x % 2 != y % 2 {
                    let expected = if x > 0 {
                        pixel_at(&restored, x - 1, y)
                    } else {
                        pixel_at(&restored, x, y - 1)
                    };
                    assert_eq!(pixel_at(&restored, x, y), expected);
                }
            }
        }
        // (0, 1) copies (0, 0), which came from source (0, 0).
        assert_eq!(pixel_at(&restored, 0, 1), pixel_at(&source, 0, 0));
    }

    #[test]
    fn short_buffer_fails_without_mutation() {
        let mut bitmap = coordinate_image(4, 4).with_buffer(vec![0; 10]);
        let before = bitmap.clone();
        assert!(matches!(bitmap.decimate_even(2), Err(BitmapError::BufferSize { .. })));
        assert_eq!(bitmap, before);
    }
}
