//! lineart: turn a photograph into a colouring-book page.
//!
//! Reads an image file, runs the line-art pipeline, and writes the
//! result next to the input (or to `--output`). Can also print per-stage
//! diagnostics, average timings over several runs, or process a JSON
//! request document the way the web service does.
//!
//! # Usage
//!
//! ```text
//! lineart [OPTIONS] <INPUT>
//! lineart --request request.json -o response.json
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

mod logging;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use lineart_pipeline::diagnostics::{Clock, PipelineDiagnostics};
use lineart_pipeline::{OutputFormat, PipelineParameters, ToneParameters};

/// Turn photographs into colouring-book line art.
///
/// Converts the input to grayscale, optionally adjusts its tone, blurs
/// it, traces outlines with a morphological gradient and inverts the
/// result into dark strokes on white paper.
#[derive(Parser, Debug)]
#[command(name = "lineart", version)]
struct Cli {
    /// Input image (PNG, JPEG, BMP, WebP, GIF), or a JSON request
    /// document with `--request`.
    input: PathBuf,

    /// Output file. Defaults to `<input stem>-lineart.<ext>` beside the
    /// input; with `--request` the response is printed to stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Box blur radius in pixels (0 disables the blur).
    #[arg(long, default_value_t = PipelineParameters::DEFAULT_BLUR_RADIUS, allow_negative_numbers = true)]
    blur_radius: i32,

    /// Sharpen the finished drawing.
    #[arg(long)]
    sharpen: bool,

    /// Linear contrast in (-127, 127).
    #[arg(long, allow_negative_numbers = true, conflicts_with_all = ["lighten", "darken"])]
    contrast: Option<i32>,

    /// Linear brightness offset in [-127, 127].
    #[arg(long, allow_negative_numbers = true, conflicts_with_all = ["lighten", "darken"])]
    brightness: Option<i32>,

    /// Lightening gamma (> 1); reveals edges inside shadows.
    #[arg(long, allow_negative_numbers = true)]
    lighten: Option<f32>,

    /// Darkening gamma in (0, 1); reveals edges inside highlights.
    #[arg(long, allow_negative_numbers = true)]
    darken: Option<f32>,

    /// Output container.
    #[arg(long, value_enum, default_value_t = Format::Png)]
    format: Format,

    /// JPEG quality (1-100), used with `--format jpeg`.
    #[arg(long, default_value_t = PipelineParameters::DEFAULT_JPEG_QUALITY)]
    jpeg_quality: u8,

    /// Reject images with more pixels than this (0 = no limit).
    #[arg(long, default_value_t = PipelineParameters::DEFAULT_MAX_PIXELS)]
    max_pixels: u64,

    /// Full pipeline parameters as a JSON string.
    ///
    /// When provided, all other pipeline parameter flags are ignored.
    /// The JSON must be a valid `PipelineParameters` serialization.
    #[arg(long)]
    params_json: Option<String>,

    /// Treat INPUT as a JSON colour-in request and emit the response
    /// document.
    #[arg(long, conflicts_with_all = ["diagnostics", "runs"])]
    request: bool,

    /// With `--request`, report every failure as a generic 500.
    #[arg(long, requires = "request")]
    legacy_status: bool,

    /// Print per-stage timing and pixel-count diagnostics.
    #[arg(long)]
    diagnostics: bool,

    /// Print diagnostics as JSON instead of a human-readable report.
    #[arg(long)]
    json: bool,

    /// Number of runs for averaging diagnostics.
    #[arg(long, default_value_t = 1, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    runs: usize,

    /// Enable debug logging.
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON.
    #[arg(long)]
    json_logs: bool,
}

/// Output container selection.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    /// Lossless PNG.
    Png,
    /// Lossy JPEG.
    Jpeg,
}

impl Cli {
    /// Build [`PipelineParameters`] from the flags.
    ///
    /// If `--params-json` is provided, the JSON is parsed directly and all
    /// individual parameter flags are ignored.
    fn parameters(&self) -> Result<PipelineParameters> {
        if let Some(ref json) = self.params_json {
            return serde_json::from_str(json).context("parsing --params-json");
        }

        let tone = if self.lighten.is_some() || self.darken.is_some() {
            ToneParameters::Gamma {
                lighten: self.lighten,
                darken: self.darken,
            }
        } else if self.contrast.is_some() || self.brightness.is_some() {
            ToneParameters::Linear {
                contrast: self.contrast.unwrap_or(0),
                brightness: self.brightness.unwrap_or(0),
            }
        } else {
            ToneParameters::None
        };

        Ok(PipelineParameters {
            blur_radius: self.blur_radius,
            sharpen: self.sharpen,
            tone,
            output_format: match self.format {
                Format::Png => OutputFormat::Png,
                Format::Jpeg => OutputFormat::Jpeg {
                    quality: self.jpeg_quality,
                },
            },
            max_pixels: self.max_pixels,
        })
    }
}

/// Default output path: `<stem>-lineart.<ext>` beside the input.
fn default_output(input: &Path, format: OutputFormat) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("image");
    let ext = match format {
        OutputFormat::Png => "png",
        OutputFormat::Jpeg { .. } => "jpg",
    };
    input.with_file_name(format!("{stem}-lineart.{ext}"))
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.json_logs);

    let result = if cli.request {
        run_request(&cli)
    } else {
        run_image(&cli)
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Convert an image file, optionally collecting diagnostics.
fn run_image(cli: &Cli) -> Result<ExitCode> {
    let params = cli.parameters()?;
    let image_bytes =
        std::fs::read(&cli.input).with_context(|| format!("reading {}", cli.input.display()))?;

    tracing::info!(
        input = %cli.input.display(),
        bytes = image_bytes.len(),
        tone = params.tone.policy_name(),
        blur_radius = params.blur_radius,
        sharpen = params.sharpen,
        format = %params.output_format,
        "processing image"
    );

    let collect = cli.diagnostics || cli.json || cli.runs > 1;
    let output = if collect {
        run_with_diagnostics(cli, &image_bytes, &params)?
    } else {
        lineart_pipeline::generate_line_art(&image_bytes, &params)?
    };

    let path = cli
        .output
        .clone()
        .unwrap_or_else(|| default_output(&cli.input, params.output_format));
    std::fs::write(&path, &output).with_context(|| format!("writing {}", path.display()))?;
    tracing::info!(output = %path.display(), bytes = output.len(), "line art written");

    Ok(ExitCode::SUCCESS)
}

/// Run the pipeline `cli.runs` times, printing diagnostics for each run.
/// Returns the output of the first run.
fn run_with_diagnostics(
    cli: &Cli,
    image_bytes: &[u8],
    params: &PipelineParameters,
) -> Result<Vec<u8>> {
    let mut first_output = None;
    let mut all_diagnostics = Vec::with_capacity(cli.runs);

    for run in 0..cli.runs {
        if cli.runs > 1 {
            eprintln!("--- Run {}/{} ---", run + 1, cli.runs);
        }

        let (output, diagnostics) =
            lineart_pipeline::generate_line_art_with_diagnostics(image_bytes, params, &StdClock)?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&diagnostics).context("serializing diagnostics")?
            );
        } else {
            println!("{}", diagnostics.report());
        }

        first_output.get_or_insert(output);
        all_diagnostics.push(diagnostics);
    }

    if cli.runs > 1 {
        print_multi_run_summary(&all_diagnostics);
    }

    match first_output {
        Some(output) => Ok(output),
        None => bail!("no pipeline runs were performed"),
    }
}

/// Process a JSON colour-in request file and emit the response document.
fn run_request(cli: &Cli) -> Result<ExitCode> {
    let body = std::fs::read_to_string(&cli.input)
        .with_context(|| format!("reading {}", cli.input.display()))?;
    let base = cli.parameters()?;

    let (status, response) = lineart_request::handle_json(&body, &base, cli.legacy_status);
    tracing::info!(status, bytes = response.len(), "request handled");

    match cli.output {
        Some(ref path) => std::fs::write(path, &response)
            .with_context(|| format!("writing {}", path.display()))?,
        None => println!("{response}"),
    }

    Ok(if status == 200 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// [`Clock`] implementation backed by [`std::time::Instant`].
struct StdClock;

impl Clock for StdClock {
    type Instant = Instant;

    fn now(&self) -> Instant {
        Instant::now()
    }

    fn elapsed(&self, since: &Instant) -> Duration {
        since.elapsed()
    }
}

/// Function pointer type for extracting a stage duration from diagnostics.
type StageExtractor = fn(&PipelineDiagnostics) -> Option<Duration>;

/// Print aggregated statistics across multiple runs.
#[allow(clippy::cast_precision_loss)]
fn print_multi_run_summary(all_diagnostics: &[PipelineDiagnostics]) {
    if all_diagnostics.is_empty() {
        return;
    }

    println!();
    println!(
        "Summary ({} runs)\n{}",
        all_diagnostics.len(),
        "=".repeat(60),
    );

    let durations: Vec<f64> = all_diagnostics
        .iter()
        .map(|d| d.total_duration.as_secs_f64() * 1000.0)
        .collect();

    let min = durations.iter().copied().reduce(f64::min).unwrap_or(0.0);
    let max = durations.iter().copied().reduce(f64::max).unwrap_or(0.0);
    let mean = durations.iter().sum::<f64>() / durations.len() as f64;

    println!("Total duration: min={min:.3}ms  mean={mean:.3}ms  max={max:.3}ms");

    println!();
    println!("{:<24} {:>12}", "Stage", "Mean (ms)");
    println!("{}", "-".repeat(40));

    let stage_extractors: &[(&str, StageExtractor)] = &[
        ("Decode", |d| Some(d.decode.duration)),
        ("Grayscale", |d| Some(d.grayscale.duration)),
        ("Tone", |d| Some(d.tone.duration)),
        ("Blur", |d| Some(d.blur.duration)),
        ("Edge Extraction", |d| Some(d.edge_extraction.duration)),
        ("Invert", |d| Some(d.invert.duration)),
        ("Sharpen", |d| d.sharpen.as_ref().map(|s| s.duration)),
        ("Encode", |d| Some(d.encode.duration)),
    ];

    for (name, extractor) in stage_extractors {
        let stage_durations: Vec<f64> = all_diagnostics
            .iter()
            .filter_map(extractor)
            .map(|dur| dur.as_secs_f64() * 1000.0)
            .collect();

        if stage_durations.is_empty() {
            continue;
        }

        let stage_mean = stage_durations.iter().sum::<f64>() / stage_durations.len() as f64;
        println!("{name:<24} {stage_mean:>10.3}ms");
    }
}
