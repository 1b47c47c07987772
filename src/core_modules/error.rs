// THEORY:
// Every fallible operation in the analyzer reports through one error enum. Parsing
// failures are terminal for the image being loaded; statistics failures are terminal
// for the metric being computed. Saving is deliberately absent from this list: a
// failed write is logged and reported as `false` so a run keeps going.

use crate::core_modules::channel::ColorSpace;
use thiserror::Error;

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, BitmapError>;

#[derive(Error, Debug)]
pub enum BitmapError {
    /// The file could not be opened or read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The magic tag is not "BM", or the headers are truncated.
    #[error("Invalid BMP file: {0}")]
    Format(String),

    #[error("Only 24-bit BMP files are supported (found {0} bits per pixel)")]
    UnsupportedFormat(u16),

    #[error("Unknown channel label '{label}' for a {space} buffer")]
    UnknownChannel { label: char, space: ColorSpace },

    /// A statistic or transform is undefined for the given input.
    #[error("Domain error: {0}")]
    Domain(String),

    #[error("Buffer too small: expected at least {expected} bytes, got {actual}")]
    BufferSize { expected: usize, actual: usize },

    #[error("Configuration error: {0}")]
    Config(#[from] figment::Error),
}
