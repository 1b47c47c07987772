// THEORY:
// Command-line runner for the BMP analyzer. Flags override whatever the config
// layers produced, then the pipeline runs against a directory store and the report
// goes to stdout.
//
//     bmp_analyzer --input kodim15.bmp --output out --previews
//     bmp_analyzer --config analyzer.toml

use anyhow::{Context, Result};
use bmp_analyzer::config::PipelineConfig;
use bmp_analyzer::logging;
use bmp_analyzer::pipeline::{AnalysisPipeline, DirectoryStore};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bmp_analyzer")]
#[command(about = "Channel statistics, YCbCr conversion and resizing for 24-bit BMP files", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Source bitmap (overrides the config)
    #[arg(long)]
    input: Option<PathBuf>,

    /// Directory for generated artifacts (overrides the config)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Also write PNG previews of every artifact
    #[arg(long)]
    previews: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = PipelineConfig::load(cli.config.as_deref()).context("loading configuration")?;
    if let Some(input) = cli.input {
        config.input = input;
    }
    if let Some(output) = cli.output {
        config.output_root = output;
    }
    config.export_png_previews |= cli.previews;

    logging::init(&config.log_level);

    let store = DirectoryStore::new(&config.output_root);
    let input = config.input.clone();
    let mut pipeline = AnalysisPipeline::new(config, store);
    let report = pipeline
        .run()
        .with_context(|| format!("analyzing {}", input.display()))?;

    println!("{report}");
    Ok(())
}
