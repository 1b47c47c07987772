// THEORY:
// The `pipeline` module is the top-level API of the analyzer. It runs the complete
// analysis sequence for one source image and hands back a typed `Report` instead of
// printing. Every artifact goes through the injected `ArtifactStore`, so the same
// sequence runs against a directory on disk or an in-memory store.
//
// Sequence:
// 1.  Persist an unmodified copy and the three channel extractions.
// 2.  Correlate the RGB channels pairwise.
// 3.  Convert to YCbCr (persisting Y, Cb, Cr and the interleaved buffer) and
//     correlate those planes pairwise.
// 4.  Convert back to RGB (persisting it) and measure PSNR per channel against
//     the source.
// 5.  Reload the YCbCr artifact from the store, apply stride decimation and block
//     averaging to two independent copies, then restore the stride-decimated one.

use crate::config::PipelineConfig;
use crate::core_modules::bitmap::{Bitmap, FILE_SUFFIX};
use crate::core_modules::channel::ColorSpace;
use crate::core_modules::error::Result;
use crate::core_modules::output_sink::{
    ArtifactStore, LUMA_CHROMA_DIR, PreviewStore, RGB_DIR, artifact_name,
};
use crate::core_modules::smart_buffer::{Correlation, Psnr, SmartBuffer};
use std::fmt;
use std::path::Path;
use tracing::{info, warn};

// Re-export the pieces a caller needs alongside the pipeline.
pub use crate::core_modules::error::BitmapError;
pub use crate::core_modules::output_sink::{DirectoryStore, MemoryStore};

const RGB_PAIRS: [(char, char); 3] = [('b', 'g'), ('r', 'g'), ('b', 'r')];
const LUMA_CHROMA_PAIRS: [(char, char); 3] = [('R', 'B'), ('R', 'Y'), ('Y', 'B')];
const PSNR_CHANNELS: [char; 3] = ['r', 'b', 'g'];

/// Correlation between two labelled channels of one buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationEntry {
    pub first: char,
    pub second: char,
    pub value: Correlation,
}

/// PSNR of one channel between the source and the reconverted buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct PsnrEntry {
    pub channel: char,
    pub value: Psnr,
}

/// Everything a run measures.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    /// b-g, r-g, b-r on the source. A pair with no variance is NaN.
    pub rgb_correlations: Vec<CorrelationEntry>,
    /// Label pairs R-B, R-Y, Y-B on the luma/chroma buffer. A pair with no
    /// variance is NaN.
    pub luma_chroma_correlations: Vec<CorrelationEntry>,
    /// r, b, g between the source and the YCbCr round trip.
    pub psnr: Vec<PsnrEntry>,
    pub decimated_even: (u32, u32),
    pub decimated_average: (u32, u32),
    pub restored: (u32, u32),
}

fn plane_name(space: ColorSpace, label: char) -> &'static str {
    match (space, label) {
        (ColorSpace::LumaChroma, 'Y') => "Y ",
        (ColorSpace::LumaChroma, 'B') => "Cb",
        (ColorSpace::LumaChroma, 'R') => "Cr",
        (_, 'r') => "r",
        (_, 'g') => "g",
        (_, 'b') => "b",
        _ => "?",
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.rgb_correlations {
            writeln!(
                f,
                "Coefficient correl between {} and {}: {}",
                plane_name(ColorSpace::Rgb, entry.first),
                plane_name(ColorSpace::Rgb, entry.second),
                entry.value
            )?;
        }
        for entry in &self.luma_chroma_correlations {
            writeln!(
                f,
                "Coefficient correl between {} and {}: {}",
                plane_name(ColorSpace::LumaChroma, entry.first),
                plane_name(ColorSpace::LumaChroma, entry.second),
                entry.value
            )?;
        }
        for entry in &self.psnr {
            writeln!(f, "PSNR {}: {}", entry.channel, entry.value)?;
        }
        writeln!(f, "Decimated (stride): {}x{}", self.decimated_even.0, self.decimated_even.1)?;
        writeln!(f, "Decimated (average): {}x{}", self.decimated_average.0, self.decimated_average.1)?;
        write!(f, "Restored: {}x{}", self.restored.0, self.restored.1)
    }
}

/// Correlates each pair. A pair that is undefined (no variance) is recorded as NaN
/// and the run carries on; any other failure aborts.
fn correlations(view: &SmartBuffer<'_>, pairs: &[(char, char)]) -> Result<Vec<CorrelationEntry>> {
    pairs
        .iter()
        .map(|&(first, second)| {
            let value = match view.correlation(first, second) {
                Ok(value) => value,
                Err(BitmapError::Domain(reason)) => {
                    warn!(space = %view.space(), %first, %second, %reason, "correlation undefined");
                    f64::NAN
                }
                Err(error) => return Err(error),
            };
            Ok(CorrelationEntry { first, second, value })
        })
        .collect()
}

/// Runs the full analysis sequence against an artifact store.
pub struct AnalysisPipeline<S: ArtifactStore> {
    config: PipelineConfig,
    store: PreviewStore<S>,
}

impl<S: ArtifactStore> AnalysisPipeline<S> {
    pub fn new(config: PipelineConfig, store: S) -> Self {
        let previews = config.export_png_previews;
        Self { config, store: PreviewStore::new(store, previews) }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        self.store.inner()
    }

    pub fn into_store(self) -> S {
        self.store.into_inner()
    }

    /// Loads the configured input and analyzes it.
    pub fn run(&mut self) -> Result<Report> {
        info!(input = %self.config.input.display(), "loading source bitmap");
        let source = Bitmap::load(&self.config.input)?;
        self.run_on(&source)
    }

    /// Analyzes an already loaded source image.
    pub fn run_on(&mut self, source: &Bitmap) -> Result<Report> {
        info!(width = source.width(), height = source.height(), "persisting copy and channel components");
        source.save(&mut self.store, &self.config.copy_name);
        source.save_components(&mut self.store, &self.config.component_name);

        let rgb_view = SmartBuffer::over(source, source.data(), ColorSpace::Rgb)?;
        let rgb_correlations = correlations(&rgb_view, &RGB_PAIRS)?;

        info!("converting to YCbCr");
        let luma_chroma = source.convert_to_luma_chroma(&mut self.store);
        let luma_chroma_view = SmartBuffer::over(source, &luma_chroma, ColorSpace::LumaChroma)?;
        let luma_chroma_correlations = correlations(&luma_chroma_view, &LUMA_CHROMA_PAIRS)?;

        info!("converting back to RGB");
        let recovered = source.convert_to_rgb(&mut self.store, &luma_chroma);
        let recovered_view = SmartBuffer::over(source, &recovered, ColorSpace::Rgb)?;
        let psnr = PSNR_CHANNELS
            .iter()
            .map(|&channel| Ok(PsnrEntry { channel, value: rgb_view.psnr(&recovered_view, channel)? }))
            .collect::<Result<Vec<_>>>()?;

        info!("decimating and restoring the YCbCr artifact");
        let artifact = format!("{}{FILE_SUFFIX}", artifact_name(LUMA_CHROMA_DIR, "YCbCr"));
        let reloaded = Bitmap::from_bytes(&self.store.read(Path::new(&artifact))?)?;

        let mut even = reloaded.clone();
        even.decimate_even(self.config.decimation_factor)?;
        even.save(&mut self.store, &artifact_name(RGB_DIR, "decimationEven"));
        let decimated_even = (even.width(), even.height());

        let mut average = reloaded;
        average.decimate_average()?;
        average.save(&mut self.store, &artifact_name(RGB_DIR, "decimationAvg"));

        even.restore(self.config.restore_factor)?;
        even.save(&mut self.store, &artifact_name(RGB_DIR, "restored"));

        Ok(Report {
            rgb_correlations,
            luma_chroma_correlations,
            psnr,
            decimated_even,
            decimated_average: (average.width(), average.height()),
            restored: (even.width(), even.height()),
        })
    }
}
