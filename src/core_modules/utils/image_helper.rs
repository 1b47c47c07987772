// PNG previews of 24-bit BMP buffers, for viewers that do not open BMP.

pub mod image_helper {
    use crate::core_modules::pixel::pixel::{Byte, Bytes, CHANNELS};
    use image::ImageEncoder;
    use image::error::{ImageError, ParameterError, ParameterErrorKind};

    /// Encodes a bottom-up (B, G, R) buffer as a top-down RGB PNG.
    pub fn encode_png(width: u32, height: u32, buffer: &[Byte]) -> Result<Bytes, ImageError> {
        let row_len = width as usize * CHANNELS;
        let needed = row_len * height as usize;
        if needed == 0 || buffer.len() < needed {
            return Err(ImageError::Parameter(ParameterError::from_kind(
                ParameterErrorKind::DimensionMismatch,
            )));
        }

        let mut rgb = Vec::with_capacity(needed);
        for row in buffer[..needed].chunks_exact(row_len).rev() {
            for triple in row.chunks_exact(CHANNELS) {
                rgb.extend_from_slice(&[triple[2], triple[1], triple[0]]);
            }
        }

        let mut png = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut png);
        encoder.write_image(&rgb, width, height, image::ExtendedColorType::Rgb8)?;

        Ok(png)
    }
}
