// THEORY:
// Saving an artifact used to mean "make sure the directory exists, then write the
// file". That side effect is pulled out behind the `ArtifactStore` trait so the
// codec and the transforms never touch the filesystem directly. A store takes a
// relative path such as `YCbCr/Y.bmp`, creates whatever parents it needs, and keeps
// the bytes. Reading back through the same store is how a run reloads an artifact
// it wrote earlier.
//
// `PreviewStore` decorates any store: every `.bmp` written through it is also
// rendered to a `.png` sibling. A preview that cannot be produced is logged and
// skipped; it never fails the bitmap write.

use crate::core_modules::bitmap::Bitmap;
use crate::core_modules::utils::image_helper::image_helper::encode_png;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Directory for single-channel extractions.
pub const COMPONENT_DIR: &str = "component";
/// Directory for the luma/chroma artifacts.
pub const LUMA_CHROMA_DIR: &str = "YCbCr";
/// Directory for reconverted and resized RGB artifacts.
pub const RGB_DIR: &str = "RGB";

/// Joins an artifact directory and base name into a store-relative name.
pub fn artifact_name(dir: &str, base: &str) -> String {
    format!("{dir}/{base}")
}

/// Destination for persisted artifacts, addressed by relative path.
pub trait ArtifactStore {
    /// Ensures parent directories exist, then replaces the artifact at `relative`.
    fn write(&mut self, relative: &Path, bytes: &[u8]) -> io::Result<()>;

    fn read(&self, relative: &Path) -> io::Result<Vec<u8>>;
}

/// Writes artifacts under a root directory on disk.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ArtifactStore for DirectoryStore {
    fn write(&mut self, relative: &Path, bytes: &[u8]) -> io::Result<()> {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            // create_dir_all is a no-op when the directory is already there.
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, bytes)
    }

    fn read(&self, relative: &Path) -> io::Result<Vec<u8>> {
        fs::read(self.root.join(relative))
    }
}

/// Keeps artifacts in memory. Useful wherever touching the disk is unwanted.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    files: BTreeMap<PathBuf, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, relative: impl AsRef<Path>) -> Option<&[u8]> {
        self.files.get(relative.as_ref()).map(Vec::as_slice)
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.files.keys().map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl ArtifactStore for MemoryStore {
    fn write(&mut self, relative: &Path, bytes: &[u8]) -> io::Result<()> {
        self.files.insert(relative.to_path_buf(), bytes.to_vec());
        Ok(())
    }

    fn read(&self, relative: &Path) -> io::Result<Vec<u8>> {
        self.files.get(relative).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no artifact at {}", relative.display()),
            )
        })
    }
}

/// Writes a PNG preview next to every bitmap when enabled.
#[derive(Debug, Clone)]
pub struct PreviewStore<S> {
    inner: S,
    enabled: bool,
}

impl<S: ArtifactStore> PreviewStore<S> {
    pub fn new(inner: S, enabled: bool) -> Self {
        Self { inner, enabled }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }

    fn write_preview(&mut self, relative: &Path, bytes: &[u8]) -> io::Result<()> {
        let bitmap = match Bitmap::from_bytes(bytes) {
            Ok(bitmap) => bitmap,
            Err(error) => {
                warn!(file = %relative.display(), %error, "skipping preview of unreadable bitmap");
                return Ok(());
            }
        };
        match encode_png(bitmap.width(), bitmap.height(), bitmap.data()) {
            Ok(png) => {
                let preview = relative.with_extension("png");
                debug!(file = %preview.display(), "writing preview");
                self.inner.write(&preview, &png)
            }
            Err(error) => {
                warn!(file = %relative.display(), %error, "skipping preview");
                Ok(())
            }
        }
    }
}

impl<S: ArtifactStore> ArtifactStore for PreviewStore<S> {
    fn write(&mut self, relative: &Path, bytes: &[u8]) -> io::Result<()> {
        self.inner.write(relative, bytes)?;
        let is_bitmap = relative.extension().is_some_and(|ext| ext == "bmp");
        if self.enabled && is_bitmap {
            if let Err(error) = self.write_preview(relative, bytes) {
                warn!(file = %relative.display(), %error, "Error writing preview");
            }
        }
        Ok(())
    }

    fn read(&self, relative: &Path) -> io::Result<Vec<u8>> {
        self.inner.read(relative)
    }
}
