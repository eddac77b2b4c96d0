//! roadmapper CLI - Roadmap diagram renderer
//!
//! Command-line interface for rendering roadmap definitions to PNG, JPEG or
//! interactive PDF, and for inspecting the computed layout.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rayon::prelude::*;
use roadmapper_core::Roadmap;
use roadmapper_layout::{FontBook, LayoutEngine};
use roadmapper_render::{OutputFormat, PdfRenderer, RasterRenderer, Renderer};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "roadmapper")]
#[command(author, version, about = "Roadmap diagram renderer", long_about = None)]
struct Cli {
    /// Verbose output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render definition files to PNG, JPEG or PDF
    Render {
        /// Definition files (.toml or .json)
        #[arg(value_name = "DEFINITION", required = true)]
        definitions: Vec<PathBuf>,

        /// Output files; the extension picks the format
        #[arg(short, long, value_name = "FILE", required = true, num_args = 1..)]
        output: Vec<PathBuf>,

        /// Date used for markers without one (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        today: Option<NaiveDate>,
    },

    /// Print the computed layout of a definition
    Inspect {
        /// Definition file (.toml or .json)
        #[arg(value_name = "DEFINITION")]
        definition: PathBuf,

        /// Date used for markers without one (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        today: Option<NaiveDate>,
    },
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    roadmapper_config::parse_date(value).map_err(|err| err.to_string())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over -v
    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .init();

    match cli.command {
        Commands::Render {
            definitions,
            output,
            today,
        } => cmd_render(&definitions, &output, today),
        Commands::Inspect { definition, today } => cmd_inspect(&definition, today),
    }
}

// ============================================================================
// render
// ============================================================================

fn cmd_render(definitions: &[PathBuf], outputs: &[PathBuf], today: Option<NaiveDate>) -> Result<()> {
    // Reject unknown extensions before any work is done
    for output in outputs {
        OutputFormat::from_path(output)?;
    }

    let several = definitions.len() > 1;
    let failures: Vec<(PathBuf, anyhow::Error)> = definitions
        .par_iter()
        .filter_map(|definition| {
            render_definition(definition, outputs, several, today)
                .err()
                .map(|err| (definition.clone(), err))
        })
        .collect();

    for (definition, err) in &failures {
        error!(definition = %definition.display(), "{err:#}");
        eprintln!("error: {}: {err:#}", definition.display());
    }
    if !failures.is_empty() {
        bail!(
            "{} of {} definitions failed to render",
            failures.len(),
            definitions.len()
        );
    }
    Ok(())
}

fn render_definition(
    definition: &Path,
    outputs: &[PathBuf],
    several: bool,
    today: Option<NaiveDate>,
) -> Result<()> {
    let roadmap = roadmapper_config::load(definition)
        .with_context(|| format!("Failed to load {}", definition.display()))?;

    for output in outputs {
        let path = output_path(output, definition, several);
        let bytes = render_bytes(&roadmap, &path, today)?;
        std::fs::write(&path, &bytes)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!(path = %path.display(), bytes = bytes.len(), "wrote roadmap");
        println!("{} -> {}", definition.display(), path.display());
    }
    Ok(())
}

fn render_bytes(roadmap: &Roadmap, path: &Path, today: Option<NaiveDate>) -> Result<Vec<u8>> {
    let raster = |renderer: RasterRenderer| match today {
        Some(today) => renderer.today(today),
        None => renderer,
    };
    let bytes = match OutputFormat::from_path(path)? {
        OutputFormat::Png => raster(RasterRenderer::png()).render(roadmap)?,
        OutputFormat::Jpeg => raster(RasterRenderer::jpeg()).render(roadmap)?,
        OutputFormat::Pdf => {
            let renderer = match today {
                Some(today) => PdfRenderer::new().today(today),
                None => PdfRenderer::new(),
            };
            renderer.render(roadmap)?
        }
    };
    Ok(bytes)
}

/// With several definitions, `out/roadmap.pdf` becomes
/// `out/roadmap_<definition stem>.pdf`.
fn output_path(output: &Path, definition: &Path, several: bool) -> PathBuf {
    if !several {
        return output.to_path_buf();
    }
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let suffix = definition
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut name = format!("{stem}_{suffix}");
    if let Some(ext) = output.extension() {
        name.push('.');
        name.push_str(&ext.to_string_lossy());
    }
    output.with_file_name(name)
}

// ============================================================================
// inspect
// ============================================================================

fn cmd_inspect(definition: &Path, today: Option<NaiveDate>) -> Result<()> {
    let roadmap = roadmapper_config::load(definition)
        .with_context(|| format!("Failed to load {}", definition.display()))?;
    let fonts = FontBook::from_typography(&roadmap.typography);
    let engine = LayoutEngine::new(&fonts);
    let engine = match today {
        Some(today) => engine.today(today),
        None => engine,
    };
    let layout = engine.layout(&roadmap)?;
    print!("{layout}");
    println!("Detail pages: {}", layout.detail_tasks().len());
    Ok(())
}
