// THEORY:
// The `SmartBuffer` is the statistics engine. It wraps a borrowed pixel buffer
// together with the two facts a raw byte slice cannot tell you: the image dimensions
// and what the three planes mean (RGB or luma/chroma). The dimensions fix the sample
// extent, which is always the first `width * height` triples. Anything after that is
// outside the image and is ignored. The color space decides how channel labels
// resolve.
//
// The formulas are fixed, quirks included:
// - standard deviation divides by `n - 1`;
// - correlation divides the summed deviation products by `n` once, then by both
//   standard deviations, so a channel correlated with itself gives `(n - 1) / n`;
// - PSNR of identical buffers is +infinity rather than an error.
// Every accumulation runs in f64, in pixel order.

use crate::core_modules::bitmap::Bitmap;
use crate::core_modules::channel::{ChannelIndex, ColorSpace, channel_index};
use crate::core_modules::error::{BitmapError, Result};
use crate::core_modules::pixel::pixel::{Byte, CHANNELS};
use tracing::warn;

pub type Mean = f64;
pub type StandardDeviation = f64;
pub type Correlation = f64;
pub type Psnr = f64;

const PEAK: f64 = 255.0;

/// A read-only, context-tagged view of a pixel buffer.
#[derive(Debug, Clone, Copy)]
pub struct SmartBuffer<'a> {
    data: &'a [Byte],
    width: u32,
    height: u32,
    space: ColorSpace,
}

impl<'a> SmartBuffer<'a> {
    /// Fails with `BufferSize` if `data` is shorter than `width * height` triples.
    pub fn new(data: &'a [Byte], width: u32, height: u32, space: ColorSpace) -> Result<Self> {
        let expected = width as usize * height as usize * CHANNELS;
        if data.len() < expected {
            return Err(BitmapError::BufferSize { expected, actual: data.len() });
        }
        Ok(Self { data, width, height, space })
    }

    /// Views `data` with the dimensions of `bitmap`.
    pub fn over(bitmap: &Bitmap, data: &'a [Byte], space: ColorSpace) -> Result<Self> {
        Self::new(data, bitmap.width(), bitmap.height(), space)
    }

    pub fn space(&self) -> ColorSpace {
        self.space
    }

    pub fn sample_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    fn samples(&self, index: ChannelIndex) -> impl Iterator<Item = f64> + '_ {
        self.data
            .chunks_exact(CHANNELS)
            .take(self.sample_count())
            .map(move |triple| triple[index] as f64)
    }

    fn mean_at(&self, index: ChannelIndex) -> Result<Mean> {
        let count = self.sample_count();
        if count == 0 {
            return Err(BitmapError::Domain("mean of an empty image".to_string()));
        }
        Ok(self.samples(index).sum::<f64>() / count as f64)
    }

    fn std_dev_at(&self, index: ChannelIndex) -> Result<StandardDeviation> {
        let count = self.sample_count();
        if count <= 1 {
            return Err(BitmapError::Domain(format!(
                "standard deviation needs at least 2 samples, got {count}"
            )));
        }
        let mean = self.mean_at(index)?;
        let squared: f64 = self.samples(index).map(|value| (value - mean).powi(2)).sum();
        Ok((squared / (count - 1) as f64).sqrt())
    }

    /// Mean of the labelled channel over the image extent.
    pub fn mean(&self, label: char) -> Result<Mean> {
        self.mean_at(channel_index(label, self.space)?)
    }

    /// Sample standard deviation of the labelled channel (divides by `n - 1`).
    pub fn std_dev(&self, label: char) -> Result<StandardDeviation> {
        self.std_dev_at(channel_index(label, self.space)?)
    }

    /// Correlation between two labelled channels.
    pub fn correlation(&self, first: char, second: char) -> Result<Correlation> {
        let first_index = channel_index(first, self.space)?;
        let second_index = channel_index(second, self.space)?;

        let first_mean = self.mean_at(first_index)?;
        let second_mean = self.mean_at(second_index)?;
        let first_std = self.std_dev_at(first_index)?;
        let second_std = self.std_dev_at(second_index)?;
        if first_std == 0.0 || second_std == 0.0 {
            return Err(BitmapError::Domain(format!(
                "correlation of '{first}' and '{second}' needs nonzero variance"
            )));
        }

        let covariance: f64 = self
            .samples(first_index)
            .zip(self.samples(second_index))
            .map(|(a, b)| (a - first_mean) * (b - second_mean))
            .sum();

        Ok(covariance / self.sample_count() as f64 / (first_std * second_std))
    }

    /// Peak signal-to-noise ratio between this buffer and `other` on one channel.
    ///
    /// Identical channels have no noise: the result is `f64::INFINITY`. Views of
    /// different dimensions fail with `BufferSize`.
    pub fn psnr(&self, other: &SmartBuffer<'_>, label: char) -> Result<Psnr> {
        if (self.width, self.height) != (other.width, other.height) {
            return Err(BitmapError::BufferSize {
                expected: self.sample_count() * CHANNELS,
                actual: other.sample_count() * CHANNELS,
            });
        }
        let count = self.sample_count();
        if count == 0 {
            return Err(BitmapError::Domain("PSNR of an empty image".to_string()));
        }
        let index = channel_index(label, self.space)?;

        let squared_error: f64 = self
            .samples(index)
            .zip(other.samples(index))
            .map(|(a, b)| (a - b).powi(2))
            .sum();
        if squared_error == 0.0 {
            warn!(channel = %label, "PSNR of identical channels is unbounded");
            return Ok(f64::INFINITY);
        }

        Ok(10.0 * (count as f64 * PEAK * PEAK / squared_error).log10())
    }
}
