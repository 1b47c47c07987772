// THEORY:
// This file is the entry point for the `bmp_analyzer` library crate. The public API is
// the `AnalysisPipeline` with its `PipelineConfig` and `Report`, plus the building
// blocks in `core_modules` for callers that want a single operation:
//
// - `bitmap`: the 24-bit BMP codec and the owning `Bitmap` image;
// - `channel`: channel labels and single-channel extraction;
// - `smart_buffer`: mean, standard deviation, correlation and PSNR;
// - `color_space`: RGB <-> YCbCr;
// - `resolution`: decimation and restoration;
// - `output_sink`: where artifacts are written.
//
// Everything is synchronous and operates on whole in-memory buffers.

pub mod config;
pub mod core_modules;
pub mod logging;
pub mod pipeline;
