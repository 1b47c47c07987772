// THEORY:
// Configuration for an analysis run. Values are layered with `figment`, later
// sources overriding earlier ones:
// 1.  library defaults (`PipelineConfig::default`);
// 2.  an optional TOML file;
// 3.  environment variables prefixed with `BMP_ANALYZER_`
//     (e.g. `BMP_ANALYZER_DECIMATION_FACTOR=4`).
//
// A file might look like:
//
//     input = "kodim15.bmp"
//     output_root = "out"
//     decimation_factor = 2
//     restore_factor = 2
//     export_png_previews = true
//     log_level = "debug"

use crate::core_modules::error::{BitmapError, Result};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

const ENV_PREFIX: &str = "BMP_ANALYZER_";

/// Tunable settings for [`AnalysisPipeline`](crate::pipeline::AnalysisPipeline).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Source bitmap to analyze.
    pub input: PathBuf,
    /// Directory under which every artifact is written.
    pub output_root: PathBuf,
    /// Base name of the unmodified copy written at the output root.
    pub copy_name: String,
    /// Base name suffix of the channel extractions (`component/R<name>` ...).
    pub component_name: String,
    /// Step used by stride decimation.
    pub decimation_factor: u32,
    /// Scale used by restoration.
    pub restore_factor: u32,
    /// Also write a `<name>.png` next to each persisted bitmap.
    pub export_png_previews: bool,
    /// Default tracing level; `RUST_LOG` takes precedence.
    pub log_level: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("kodim15.bmp"),
            output_root: PathBuf::from("."),
            copy_name: "SAVE".to_string(),
            component_name: "component".to_string(),
            decimation_factor: 2,
            restore_factor: 2,
            export_png_previews: false,
            log_level: "info".to_string(),
        }
    }
}

impl PipelineConfig {
    /// Loads defaults, then `path` (if given), then the environment, and validates.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(PipelineConfig::default()));
        if let Some(path) = path {
            debug!(path = %path.display(), "loading config file");
            figment = figment.merge(Toml::file(path));
        }
        let config: PipelineConfig = figment.merge(Env::prefixed(ENV_PREFIX)).extract()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.decimation_factor == 0 {
            return Err(BitmapError::Domain("decimation_factor must be at least 1".to_string()));
        }
        if self.restore_factor == 0 {
            return Err(BitmapError::Domain("restore_factor must be at least 1".to_string()));
        }
        if self.copy_name.is_empty() || self.component_name.is_empty() {
            return Err(BitmapError::Domain("artifact names must not be empty".to_string()));
        }
        Ok(())
    }
}
