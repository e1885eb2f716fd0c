use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use veilmark::{OutputFormat, VerifyOptions, VisibleOverlay, WatermarkOptions};

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Png,
    Jpeg,
    Webp,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Png => OutputFormat::Png,
            Format::Jpeg => OutputFormat::Jpeg,
            Format::Webp => OutputFormat::WebP,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Embed a payload fingerprint into an image.
    Embed {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        #[arg(short, long)]
        payload: String,
        /// Output container format.
        #[arg(short, long, value_enum, default_value_t = Format::Png)]
        format: Format,
        /// JPEG quality in [0, 1].
        #[arg(short, long)]
        quality: Option<f32>,
        /// Also stamp the payload as a translucent visible marker.
        #[arg(long)]
        visible: bool,
    },
    /// Check whether an image carries a payload's fingerprint.
    Verify {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long)]
        payload: String,
        /// Minimum confidence for a positive match.
        #[arg(short, long)]
        threshold: Option<f32>,
    },
    /// Diagnostic read under the fixed debug seed.
    Extract {
        #[arg(short, long)]
        input: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Embed {
            input,
            output,
            payload,
            format,
            quality,
            visible,
        } => {
            let bytes = std::fs::read(&input)
                .with_context(|| format!("reading {}", input.display()))?;
            let opts = WatermarkOptions {
                format: format.into(),
                jpeg_quality: quality.unwrap_or(0.0),
                visible: visible.then(|| VisibleOverlay::new(payload.clone())),
            };
            let marked = veilmark::watermark(&bytes, &payload, &opts)?;
            std::fs::write(&output, &marked.bytes)
                .with_context(|| format!("writing {}", output.display()))?;
            println!(
                "Embedded into {} ({}x{}, {}).",
                output.display(),
                marked.width,
                marked.height,
                marked.mime_type
            );
        }

        Commands::Verify {
            input,
            payload,
            threshold,
        } => {
            let bytes = std::fs::read(&input)
                .with_context(|| format!("reading {}", input.display()))?;
            let mut opts = VerifyOptions::default();
            if let Some(threshold) = threshold {
                opts.threshold = threshold;
            }
            let report = veilmark::verify(&bytes, &payload, &opts)?;
            println!(
                "match: {}  confidence: {:.4}  digest: {}",
                report.is_match, report.confidence, report.recovered_digest_hex
            );
            if !report.is_match {
                std::process::exit(1);
            }
        }

        Commands::Extract { input } => {
            let bytes = std::fs::read(&input)
                .with_context(|| format!("reading {}", input.display()))?;
            let read = veilmark::extract(&bytes)?;
            println!(
                "diagnostic read: {}  confidence: {:.4}",
                read.digest_hex, read.confidence
            );
        }
    }

    Ok(())
}
