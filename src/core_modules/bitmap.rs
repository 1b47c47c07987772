// THEORY:
// The `Bitmap` module is the container codec and the owner of the canonical in-memory
// image. A 24-bit BMP file is four regions laid end to end:
//
//     [ file header: 14 bytes ][ info header: 40 bytes ][ palette ][ pixel region ]
//
// Key principles:
// 1.  **Explicit layout**: Both headers are decoded and encoded field by field from
//     little-endian byte offsets. Nothing depends on how Rust lays out the structs.
// 2.  **Byte-faithful pixel region**: The pixel region read is `image_size + pixel_offset`
//     bytes long. That is larger than the pixel data itself, and files usually end
//     before it does; the missing tail is zero-filled so the region always has the
//     declared length. Saving writes the region back verbatim, which is what makes
//     load -> save -> load lossless.
// 3.  **Coupled header fields**: Width, height, image size and file size describe the
//     pixel buffer. `replace_buffer` is the only way to swap the buffer, and it updates
//     all four together.
// 4.  **Best-effort saving**: A failed save logs a warning and returns `false`. Loading
//     failures are errors the caller must handle.

use crate::core_modules::channel::{blue_component, green_component, red_component};
use crate::core_modules::error::{BitmapError, Result};
use crate::core_modules::output_sink::{ArtifactStore, COMPONENT_DIR, artifact_name};
use crate::core_modules::pixel::pixel::{Byte, Bytes, CHANNELS};
use std::path::Path;
use tracing::{debug, warn};

pub const FILE_HEADER_SIZE: usize = 14;
pub const INFO_HEADER_SIZE: usize = 40;
pub const HEADERS_SIZE: usize = FILE_HEADER_SIZE + INFO_HEADER_SIZE;

/// "BM" read as a little-endian u16.
pub const BMP_MAGIC: u16 = 0x4D42;
pub const SUPPORTED_BITS_PER_PIXEL: u16 = 24;
/// Appended to every base name on save.
pub const FILE_SUFFIX: &str = ".bmp";

/// 72 DPI expressed in pixels per meter.
const DEFAULT_PIXELS_PER_METER: i32 = 2835;

// File header field offsets.
const FH_MAGIC: usize = 0;
const FH_FILE_SIZE: usize = 2;
const FH_RESERVED1: usize = 6;
const FH_RESERVED2: usize = 8;
const FH_PIXEL_OFFSET: usize = 10;

// Info header field offsets.
const IH_HEADER_SIZE: usize = 0;
const IH_WIDTH: usize = 4;
const IH_HEIGHT: usize = 8;
const IH_PLANES: usize = 12;
const IH_BITS_PER_PIXEL: usize = 14;
const IH_COMPRESSION: usize = 16;
const IH_IMAGE_SIZE: usize = 20;
const IH_X_PIXELS_PER_METER: usize = 24;
const IH_Y_PIXELS_PER_METER: usize = 28;
const IH_COLORS_USED: usize = 32;
const IH_COLORS_IMPORTANT: usize = 36;

fn read_u16(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([bytes[offset], bytes[offset + 1], bytes[offset + 2], bytes[offset + 3]])
}

fn read_i32(bytes: &[u8], offset: usize) -> i32 {
    read_u32(bytes, offset) as i32
}

fn write_u16(bytes: &mut [u8], offset: usize, value: u16) {
    bytes[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
}

fn write_u32(bytes: &mut [u8], offset: usize, value: u32) {
    bytes[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

fn write_i32(bytes: &mut [u8], offset: usize, value: i32) {
    bytes[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

/// The 14-byte primary header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHeader {
    /// Must equal `BMP_MAGIC`.
    pub magic: u16,
    /// Total size of the file in bytes.
    pub file_size: u32,
    pub reserved1: u16,
    pub reserved2: u16,
    /// Offset from the start of the file to the pixel data.
    pub pixel_offset: u32,
}

impl FileHeader {
    pub fn decode(bytes: &[u8; FILE_HEADER_SIZE]) -> Self {
        Self {
            magic: read_u16(bytes, FH_MAGIC),
            file_size: read_u32(bytes, FH_FILE_SIZE),
            reserved1: read_u16(bytes, FH_RESERVED1),
            reserved2: read_u16(bytes, FH_RESERVED2),
            pixel_offset: read_u32(bytes, FH_PIXEL_OFFSET),
        }
    }

    pub fn encode(&self) -> [u8; FILE_HEADER_SIZE] {
        let mut bytes = [0u8; FILE_HEADER_SIZE];
        write_u16(&mut bytes, FH_MAGIC, self.magic);
        write_u32(&mut bytes, FH_FILE_SIZE, self.file_size);
        write_u16(&mut bytes, FH_RESERVED1, self.reserved1);
        write_u16(&mut bytes, FH_RESERVED2, self.reserved2);
        write_u32(&mut bytes, FH_PIXEL_OFFSET, self.pixel_offset);
        bytes
    }
}

/// The 40-byte secondary (BITMAPINFOHEADER) header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InfoHeader {
    pub header_size: u32,
    /// Signed in the format; only positive values describe supported images.
    pub width: i32,
    /// Positive means bottom-up row order.
    pub height: i32,
    pub planes: u16,
    pub bits_per_pixel: u16,
    pub compression: u32,
    /// Size of the pixel data in bytes. May be zero for uncompressed images.
    pub image_size: u32,
    pub x_pixels_per_meter: i32,
    pub y_pixels_per_meter: i32,
    pub colors_used: u32,
    pub colors_important: u32,
}

impl InfoHeader {
    pub fn decode(bytes: &[u8; INFO_HEADER_SIZE]) -> Self {
        Self {
            header_size: read_u32(bytes, IH_HEADER_SIZE),
            width: read_i32(bytes, IH_WIDTH),
            height: read_i32(bytes, IH_HEIGHT),
            planes: read_u16(bytes, IH_PLANES),
            bits_per_pixel: read_u16(bytes, IH_BITS_PER_PIXEL),
            compression: read_u32(bytes, IH_COMPRESSION),
            image_size: read_u32(bytes, IH_IMAGE_SIZE),
            x_pixels_per_meter: read_i32(bytes, IH_X_PIXELS_PER_METER),
            y_pixels_per_meter: read_i32(bytes, IH_Y_PIXELS_PER_METER),
            colors_used: read_u32(bytes, IH_COLORS_USED),
            colors_important: read_u32(bytes, IH_COLORS_IMPORTANT),
        }
    }

    pub fn encode(&self) -> [u8; INFO_HEADER_SIZE] {
        let mut bytes = [0u8; INFO_HEADER_SIZE];
        write_u32(&mut bytes, IH_HEADER_SIZE, self.header_size);
        write_i32(&mut bytes, IH_WIDTH, self.width);
        write_i32(&mut bytes, IH_HEIGHT, self.height);
        write_u16(&mut bytes, IH_PLANES, self.planes);
        write_u16(&mut bytes, IH_BITS_PER_PIXEL, self.bits_per_pixel);
        write_u32(&mut bytes, IH_COMPRESSION, self.compression);
        write_u32(&mut bytes, IH_IMAGE_SIZE, self.image_size);
        write_i32(&mut bytes, IH_X_PIXELS_PER_METER, self.x_pixels_per_meter);
        write_i32(&mut bytes, IH_Y_PIXELS_PER_METER, self.y_pixels_per_meter);
        write_u32(&mut bytes, IH_COLORS_USED, self.colors_used);
        write_u32(&mut bytes, IH_COLORS_IMPORTANT, self.colors_important);
        bytes
    }
}

/// A 24-bit bitmap: both headers, the palette region and the pixel region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    file_header: FileHeader,
    info_header: InfoHeader,
    /// `pixel_offset - 54` bytes; empty for ordinary 24-bit files.
    palette: Bytes,
    /// The pixel region, bottom-up rows of (B, G, R) triples.
    data: Bytes,
}

impl Bitmap {
    /// Reads and parses the file at `path` in one blocking call.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let bitmap = Self::from_bytes(&bytes)?;
        debug!(
            path = %path.display(),
            width = bitmap.width(),
            height = bitmap.height(),
            "loaded bitmap"
        );
        Ok(bitmap)
    }

    /// Parses a complete file image.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let file_bytes: &[u8; FILE_HEADER_SIZE] = bytes
            .get(..FILE_HEADER_SIZE)
            .and_then(|slice| slice.try_into().ok())
            .ok_or_else(|| BitmapError::Format("truncated file header".to_string()))?;
        let file_header = FileHeader::decode(file_bytes);
        if file_header.magic != BMP_MAGIC {
            return Err(BitmapError::Format(format!(
                "bad magic tag 0x{:04X}",
                file_header.magic
            )));
        }

        let info_bytes: &[u8; INFO_HEADER_SIZE] = bytes
            .get(FILE_HEADER_SIZE..HEADERS_SIZE)
            .and_then(|slice| slice.try_into().ok())
            .ok_or_else(|| BitmapError::Format("truncated info header".to_string()))?;
        let info_header = InfoHeader::decode(info_bytes);
        if info_header.bits_per_pixel != SUPPORTED_BITS_PER_PIXEL {
            return Err(BitmapError::UnsupportedFormat(info_header.bits_per_pixel));
        }

        let pixel_offset = file_header.pixel_offset as usize;
        if pixel_offset > bytes.len() {
            return Err(BitmapError::Format(format!(
                "pixel offset {pixel_offset} is past the end of a {}-byte file",
                bytes.len()
            )));
        }
        let palette_len = pixel_offset.saturating_sub(HEADERS_SIZE);
        let palette = take_zero_filled(bytes, HEADERS_SIZE, palette_len);

        let declared_size = match info_header.image_size {
            0 => (info_header.width.unsigned_abs() as usize)
                .checked_mul(info_header.height.unsigned_abs() as usize)
                .and_then(|pixels| pixels.checked_mul(CHANNELS))
                .ok_or_else(|| BitmapError::Format("image dimensions overflow".to_string()))?,
            size => size as usize,
        };
        // The region read runs `pixel_offset` bytes past the declared pixels; only that
        // overshoot may be zero-filled.
        let pixels_start = HEADERS_SIZE + palette_len;
        let available = bytes.len().saturating_sub(pixels_start);
        if declared_size > available {
            return Err(BitmapError::Format(format!(
                "pixel region declares {declared_size} bytes but the file holds {available}"
            )));
        }
        let region_len = declared_size
            .checked_add(pixel_offset)
            .ok_or_else(|| BitmapError::Format("pixel region size overflows".to_string()))?;
        let data = take_zero_filled(bytes, pixels_start, region_len);

        Ok(Self { file_header, info_header, palette, data })
    }

    /// Builds a canonical bottom-up 24-bit image around `data`.
    pub fn from_pixels(width: u32, height: u32, data: Bytes) -> Result<Self> {
        let expected = width as usize * height as usize * CHANNELS;
        if data.len() != expected {
            return Err(BitmapError::BufferSize { expected, actual: data.len() });
        }
        let (width, height) = signed_dimensions(width, height)?;
        let image_size = checked_u32(data.len())?;
        let pixel_offset = HEADERS_SIZE as u32;
        let file_size = pixel_offset
            .checked_add(image_size)
            .ok_or_else(|| BitmapError::Domain("file size exceeds 4 GiB".to_string()))?;
        Ok(Self {
            file_header: FileHeader {
                magic: BMP_MAGIC,
                file_size,
                reserved1: 0,
                reserved2: 0,
                pixel_offset,
            },
            info_header: InfoHeader {
                header_size: INFO_HEADER_SIZE as u32,
                width,
                height,
                planes: 1,
                bits_per_pixel: SUPPORTED_BITS_PER_PIXEL,
                compression: 0,
                image_size,
                x_pixels_per_meter: DEFAULT_PIXELS_PER_METER,
                y_pixels_per_meter: DEFAULT_PIXELS_PER_METER,
                colors_used: 0,
                colors_important: 0,
            },
            palette: Bytes::new(),
            data,
        })
    }

    /// The same headers and palette wrapped around a different pixel region.
    pub fn with_buffer(&self, data: Bytes) -> Self {
        Self {
            file_header: self.file_header,
            info_header: self.info_header,
            palette: self.palette.clone(),
            data,
        }
    }

    pub fn file_header(&self) -> &FileHeader {
        &self.file_header
    }

    pub fn info_header(&self) -> &InfoHeader {
        &self.info_header
    }

    pub fn palette(&self) -> &[Byte] {
        &self.palette
    }

    pub fn data(&self) -> &[Byte] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.info_header.width.unsigned_abs()
    }

    pub fn height(&self) -> u32 {
        self.info_header.height.unsigned_abs()
    }

    pub fn pixel_count(&self) -> usize {
        self.width() as usize * self.height() as usize
    }

    /// Swaps in a new `width` x `height` pixel buffer and updates every header
    /// field that describes it. Nothing is modified if validation fails.
    pub fn replace_buffer(&mut self, width: u32, height: u32, data: Bytes) -> Result<()> {
        let expected = width as usize * height as usize * CHANNELS;
        if data.len() != expected {
            return Err(BitmapError::BufferSize { expected, actual: data.len() });
        }
        let (signed_width, signed_height) = signed_dimensions(width, height)?;
        let image_size = checked_u32(data.len())?;
        let file_size = self
            .file_header
            .pixel_offset
            .checked_add(image_size)
            .ok_or_else(|| BitmapError::Domain("file size exceeds 4 GiB".to_string()))?;

        self.info_header.width = signed_width;
        self.info_header.height = signed_height;
        self.info_header.image_size = image_size;
        self.file_header.file_size = file_size;
        self.data = data;
        Ok(())
    }

    /// Serializes the image with its own pixel region.
    pub fn to_bytes(&self) -> Bytes {
        self.to_bytes_with(&self.data)
    }

    /// Serializes the headers and palette followed by `buffer`.
    pub fn to_bytes_with(&self, buffer: &[Byte]) -> Bytes {
        let mut bytes = Vec::with_capacity(HEADERS_SIZE + self.palette.len() + buffer.len());
        bytes.extend_from_slice(&self.file_header.encode());
        bytes.extend_from_slice(&self.info_header.encode());
        bytes.extend_from_slice(&self.palette);
        bytes.extend_from_slice(buffer);
        bytes
    }

    /// Writes the image to `<name>.bmp` in `store`. Returns `false` on failure.
    pub fn save(&self, store: &mut dyn ArtifactStore, name: &str) -> bool {
        self.save_buffer(store, name, &self.data)
    }

    /// Like `save`, but serializes `buffer` instead of the image's own pixels.
    pub fn save_buffer(&self, store: &mut dyn ArtifactStore, name: &str, buffer: &[Byte]) -> bool {
        let file_name = format!("{name}{FILE_SUFFIX}");
        match store.write(Path::new(&file_name), &self.to_bytes_with(buffer)) {
            Ok(()) => {
                debug!(file = %file_name, bytes = buffer.len(), "saved bitmap");
                true
            }
            Err(error) => {
                warn!(file = %file_name, %error, "Error opening file");
                false
            }
        }
    }

    /// Persists the three single-channel extractions as
    /// `component/R<name>`, `component/G<name>` and `component/B<name>`.
    pub fn save_components(&self, store: &mut dyn ArtifactStore, name: &str) -> bool {
        let red = red_component(&self.data);
        let green = green_component(&self.data);
        let blue = blue_component(&self.data);

        let saved_red = self.save_buffer(store, &artifact_name(COMPONENT_DIR, &format!("R{name}")), &red);
        let saved_green = self.save_buffer(store, &artifact_name(COMPONENT_DIR, &format!("G{name}")), &green);
        let saved_blue = self.save_buffer(store, &artifact_name(COMPONENT_DIR, &format!("B{name}")), &blue);
        saved_red && saved_green && saved_blue
    }
}

/// `len` bytes of `bytes` starting at `start`, zero-filled past the end of input.
fn take_zero_filled(bytes: &[u8], start: usize, len: usize) -> Bytes {
    let mut region = vec![0u8; len];
    if let Some(available) = bytes.get(start..) {
        let copied = available.len().min(len);
        region[..copied].copy_from_slice(&available[..copied]);
        if copied < len {
            debug!(declared = len, read = copied, "zero-filled short region");
        }
    }
    region
}

fn signed_dimensions(width: u32, height: u32) -> Result<(i32, i32)> {
    let width = i32::try_from(width)
        .map_err(|_| BitmapError::Domain(format!("width {width} does not fit the header")))?;
    let height = i32::try_from(height)
        .map_err(|_| BitmapError::Domain(format!("height {height} does not fit the header")))?;
    Ok((width, height))
}

fn checked_u32(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| BitmapError::Domain(format!("{len} bytes exceeds 4 GiB")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::output_sink::MemoryStore;
    use std::io;

    struct FailingStore;

    impl ArtifactStore for FailingStore {
        fn write(&mut self, _relative: &Path, _bytes: &[u8]) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"))
        }

        fn read(&self, _relative: &Path) -> io::Result<Vec<u8>> {
            Err(io::Error::from(io::ErrorKind::NotFound))
        }
    }

    fn gradient(width: u32, height: u32) -> Bitmap {
        let data = (0..width * height * 3).map(|i| (i % 251) as u8).collect();
        Bitmap::from_pixels(width, height, data).expect("Error building bitmap.")
    }

    #[test]
    fn headers_survive_encode_decode() {
        let bitmap = gradient(4, 3);
        let file = FileHeader::decode(&bitmap.file_header().encode());
        let info = InfoHeader::decode(&bitmap.info_header().encode());
        assert_eq!(&file, bitmap.file_header());
        assert_eq!(&info, bitmap.info_header());
    }

    #[test]
    fn header_bytes_match_the_format() {
        let bytes = gradient(4, 2).to_bytes();
        assert_eq!(&bytes[0..2], b"BM");
        assert_eq!(read_u32(&bytes, 2), 54 + 24);
        assert_eq!(read_u32(&bytes, 10), 54);
        assert_eq!(read_u32(&bytes, 14), 40);
        assert_eq!(read_i32(&bytes, 18), 4);
        assert_eq!(read_i32(&bytes, 22), 2);
        assert_eq!(read_u16(&bytes, 28), 24);
        assert_eq!(read_u32(&bytes, 34), 24);
    }

    #[test]
    fn pixel_region_includes_offset_bytes() {
        let bitmap = gradient(4, 4);
        let parsed = Bitmap::from_bytes(&bitmap.to_bytes()).expect("Error parsing bitmap.");
        assert_eq!(parsed.data().len(), 48 + 54);
        assert_eq!(&parsed.data()[..48], bitmap.data());
        assert!(parsed.data()[48..].iter().all(|&b| b == 0));
        assert!(parsed.palette().is_empty());
    }

    #[test]
    fn load_save_load_is_lossless() {
        let first = Bitmap::from_bytes(&gradient(8, 5).to_bytes()).expect("Error parsing bitmap.");
        let mut store = MemoryStore::new();
        assert!(first.save(&mut store, "SAVE"));

        let saved = store.get("SAVE.bmp").expect("Missing saved file.");
        let second = Bitmap::from_bytes(saved).expect("Error reparsing bitmap.");
        assert_eq!(first, second);
        assert_eq!(first.to_bytes(), second.to_bytes());
    }

    #[test]
    fn palette_region_is_read_and_written() {
        let mut bytes = gradient(2, 2).to_bytes();
        write_u32(&mut bytes, FH_PIXEL_OFFSET, 58);
        bytes.splice(54..54, [9u8, 8, 7, 6]);

        let bitmap = Bitmap::from_bytes(&bytes).expect("Error parsing bitmap.");
        assert_eq!(bitmap.palette(), &[9, 8, 7, 6]);
        assert_eq!(bitmap.data().len(), 12 + 58);
        assert_eq!(&bitmap.to_bytes()[54..58], &[9, 8, 7, 6]);
    }

    #[test]
    fn zero_image_size_falls_back_to_dimensions() {
        let mut bytes = gradient(2, 2).to_bytes();
        write_u32(&mut bytes, FILE_HEADER_SIZE + IH_IMAGE_SIZE, 0);
        let bitmap = Bitmap::from_bytes(&bytes).expect("Error parsing bitmap.");
        assert_eq!(bitmap.data().len(), 12 + 54);
    }

    #[test]
    fn bad_magic_is_a_format_error() {
        let mut bytes = gradient(2, 2).to_bytes();
        bytes[0] = b'P';
        assert!(matches!(Bitmap::from_bytes(&bytes), Err(BitmapError::Format(_))));
    }

    #[test]
    fn truncated_headers_are_format_errors() {
        let bytes = gradient(2, 2).to_bytes();
        assert!(matches!(Bitmap::from_bytes(&bytes[..10]), Err(BitmapError::Format(_))));
        assert!(matches!(Bitmap::from_bytes(&bytes[..30]), Err(BitmapError::Format(_))));
    }

    #[test]
    fn oversized_dimensions_are_format_errors() {
        let mut bytes = gradient(1, 1).to_bytes();
        write_u32(&mut bytes, FILE_HEADER_SIZE + IH_IMAGE_SIZE, 0);
        write_i32(&mut bytes, FILE_HEADER_SIZE + IH_WIDTH, i32::MAX);
        write_i32(&mut bytes, FILE_HEADER_SIZE + IH_HEIGHT, i32::MAX);
        assert!(matches!(Bitmap::from_bytes(&bytes), Err(BitmapError::Format(_))));
    }

    #[test]
    fn declared_sizes_beyond_the_file_are_format_errors() {
        let mut bytes = gradient(2, 2).to_bytes();
        write_u32(&mut bytes, FILE_HEADER_SIZE + IH_IMAGE_SIZE, u32::MAX);
        assert!(matches!(Bitmap::from_bytes(&bytes), Err(BitmapError::Format(_))));

        let mut bytes = gradient(2, 2).to_bytes();
        write_u32(&mut bytes, FH_PIXEL_OFFSET, u32::MAX);
        assert!(matches!(Bitmap::from_bytes(&bytes), Err(BitmapError::Format(_))));

        let bytes = gradient(2, 2).to_bytes();
        assert!(matches!(Bitmap::from_bytes(&bytes[..60]), Err(BitmapError::Format(_))));
    }

    #[test]
    fn non_24_bit_is_unsupported() {
        let mut bytes = gradient(2, 2).to_bytes();
        write_u16(&mut bytes, FILE_HEADER_SIZE + IH_BITS_PER_PIXEL, 8);
        assert!(matches!(
            Bitmap::from_bytes(&bytes),
            Err(BitmapError::UnsupportedFormat(8))
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().expect("Error creating temp dir.");
        let result = Bitmap::load(dir.path().join("missing.bmp"));
        assert!(matches!(result, Err(BitmapError::Io(_))));
    }

    #[test]
    fn load_reads_from_disk() {
        let dir = tempfile::tempdir().expect("Error creating temp dir.");
        let path = dir.path().join("source.bmp");
        std::fs::write(&path, gradient(4, 4).to_bytes()).expect("Error writing file.");
        let bitmap = Bitmap::load(&path).expect("Error loading bitmap.");
        assert_eq!((bitmap.width(), bitmap.height()), (4, 4));
    }

    #[test]
    fn replace_buffer_updates_coupled_fields() {
        let mut bitmap = gradient(4, 4);
        bitmap.replace_buffer(2, 2, vec![1; 12]).expect("Error replacing buffer.");
        assert_eq!((bitmap.width(), bitmap.height()), (2, 2));
        assert_eq!(bitmap.info_header().image_size, 12);
        assert_eq!(bitmap.file_header().file_size, 54 + 12);
        assert_eq!(bitmap.data(), &[1; 12]);
    }

    #[test]
    fn replace_buffer_rejects_mismatched_length() {
        let mut bitmap = gradient(4, 4);
        let before = bitmap.clone();
        let result = bitmap.replace_buffer(2, 2, vec![1; 11]);
        assert!(matches!(result, Err(BitmapError::BufferSize { expected: 12, actual: 11 })));
        assert_eq!(bitmap, before);
    }

    #[test]
    fn save_buffer_leaves_own_data_untouched() {
        let bitmap = gradient(2, 2);
        let mut store = MemoryStore::new();
        assert!(bitmap.save_buffer(&mut store, "other", &[5; 12]));
        let saved = store.get("other.bmp").expect("Missing saved file.");
        assert_eq!(&saved[54..], &[5; 12]);
        assert_ne!(bitmap.data(), &[5; 12]);
    }

    #[test]
    fn save_failure_is_reported_not_raised() {
        assert!(!gradient(2, 2).save(&mut FailingStore, "SAVE"));
    }

    #[test]
    fn components_land_in_their_directory() {
        let mut store = MemoryStore::new();
        assert!(gradient(2, 2).save_components(&mut store, "component"));
        let paths: Vec<_> = store.paths().map(|p| p.to_string_lossy().into_owned()).collect();
        assert_eq!(
            paths,
            vec![
                "component/Bcomponent.bmp",
                "component/Gcomponent.bmp",
                "component/Rcomponent.bmp",
            ]
        );
    }
}
