//! Pipeline diagnostics: timing and pixel counts for each stage.
//!
//! [`generate_line_art_with_diagnostics`] drives the same stage
//! sequence as [`crate::generate_line_art`] and records how long each
//! stage took and what it produced. Timing goes through the [`Clock`]
//! trait so this crate never reads a clock itself; the CLI supplies one
//! backed by `std::time::Instant`.
//!
//! Durations are serialized as fractional seconds (`f64`) for JSON
//! compatibility, since `std::time::Duration` does not implement serde
//! traits.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::pipeline::Pipeline;
use crate::types::{GrayImage, PipelineError, PipelineParameters};

/// Source of monotonic timestamps.
pub trait Clock {
    /// Opaque timestamp type.
    type Instant;

    /// The current time.
    fn now(&self) -> Self::Instant;

    /// Time elapsed since `since`.
    fn elapsed(&self, since: &Self::Instant) -> Duration;
}

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a `Duration` as fractional seconds (`f64`).
    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    /// Deserialize a `Duration` from fractional seconds (`f64`).
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// Diagnostics collected from a single pipeline run.
///
/// `sharpen` is `None` when sharpening was disabled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineDiagnostics {
    /// Stage 1: parameter validation and image decoding.
    pub decode: StageDiagnostics,
    /// Stage 2: grayscale conversion.
    pub grayscale: StageDiagnostics,
    /// Stage 3: tone adjustment.
    pub tone: StageDiagnostics,
    /// Stage 4: box blur.
    pub blur: StageDiagnostics,
    /// Stage 5: outline extraction and union.
    pub edge_extraction: StageDiagnostics,
    /// Stage 6: inversion.
    pub invert: StageDiagnostics,
    /// Stage 7: sharpening (only when `params.sharpen == true`).
    pub sharpen: Option<StageDiagnostics>,
    /// Stage 8: encoding.
    pub encode: StageDiagnostics,
    /// Total wall-clock duration of the entire pipeline (seconds).
    #[serde(with = "duration_serde")]
    pub total_duration: Duration,
    /// Summary counts across all stages.
    pub summary: PipelineSummary,
}

/// Diagnostics for a single pipeline stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageDiagnostics {
    /// Wall-clock duration of this stage (seconds).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
    /// Stage-specific metrics.
    pub metrics: StageMetrics,
}

/// Stage-specific metrics that vary by pipeline stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StageMetrics {
    /// Image decoding metrics.
    Decode {
        /// Size of the input image bytes.
        input_bytes: usize,
        /// Decoded image width in pixels.
        width: u32,
        /// Decoded image height in pixels.
        height: u32,
        /// Total pixel count (`width * height`).
        pixel_count: u64,
    },
    /// Grayscale conversion metrics.
    Grayscale {
        /// Image width in pixels.
        width: u32,
        /// Image height in pixels.
        height: u32,
    },
    /// Tone adjustment metrics.
    Tone {
        /// Which policy ran (`none`, `linear`, `gamma`).
        policy: String,
        /// Number of gamma variants produced.
        variant_count: usize,
    },
    /// Blur metrics.
    Blur {
        /// Box radius in pixels (0 = disabled).
        radius: u32,
        /// Number of buffers blurred.
        candidate_count: usize,
    },
    /// Outline extraction metrics.
    EdgeExtraction {
        /// Number of outlines merged.
        candidate_count: usize,
        /// Pixels with a non-zero outline value.
        edge_pixel_count: u64,
        /// Total pixel count for computing edge density.
        total_pixel_count: u64,
    },
    /// Inversion metrics.
    Invert {
        /// Pixels that are pure white after inversion.
        white_pixel_count: u64,
    },
    /// Sharpen metrics.
    Sharpen {
        /// Whether the kernel was applied.
        applied: bool,
    },
    /// Encoding metrics.
    Encode {
        /// Container and settings.
        format: String,
        /// Size of the encoded output.
        output_bytes: usize,
    },
}

/// High-level summary for the entire pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// Source image width in pixels.
    pub image_width: u32,
    /// Source image height in pixels.
    pub image_height: u32,
    /// Total pixel count.
    pub pixel_count: u64,
    /// Pixels carrying a stroke in the combined outline.
    pub edge_pixel_count: u64,
    /// Size of the encoded output.
    pub output_bytes: usize,
}

impl PipelineDiagnostics {
    /// Format diagnostics as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Pipeline Diagnostics Report\n{}", "=".repeat(60)));
        lines.push(format!(
            "Image: {}x{} ({} pixels)",
            self.summary.image_width, self.summary.image_height, self.summary.pixel_count,
        ));
        lines.push(format!(
            "Total duration: {:.3}ms",
            duration_ms(self.total_duration),
        ));
        lines.push(String::new());

        lines.push(format!(
            "{:<24} {:>10} {:>10}  {}",
            "Stage", "Duration", "% Total", "Details"
        ));
        lines.push("-".repeat(80));

        let total_ms = duration_ms(self.total_duration);

        let mut stages = vec![
            ("Decode", &self.decode),
            ("Grayscale", &self.grayscale),
            ("Tone", &self.tone),
            ("Blur", &self.blur),
            ("Edge Extraction", &self.edge_extraction),
            ("Invert", &self.invert),
        ];
        if let Some(ref sharpen) = self.sharpen {
            stages.push(("Sharpen", sharpen));
        }
        stages.push(("Encode", &self.encode));

        for (name, diag) in &stages {
            let ms = duration_ms(diag.duration);
            let pct = if total_ms > 0.0 {
                ms / total_ms * 100.0
            } else {
                0.0
            };
            let details = format_metrics(&diag.metrics);
            lines.push(format!("{name:<24} {ms:>8.3}ms {pct:>9.1}%  {details}"));
        }

        lines.push(String::new());
        lines.push(format!(
            "Edge pixels: {}  |  Output: {} bytes",
            self.summary.edge_pixel_count, self.summary.output_bytes,
        ));

        lines.join("\n")
    }
}

/// Convert a `Duration` to milliseconds as `f64`.
fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

/// Format stage metrics into a compact detail string.
fn format_metrics(metrics: &StageMetrics) -> String {
    match metrics {
        StageMetrics::Decode {
            input_bytes,
            width,
            height,
            ..
        } => format!("{input_bytes} bytes -> {width}x{height}"),
        StageMetrics::Grayscale { width, height } => format!("{width}x{height}"),
        StageMetrics::Tone {
            policy,
            variant_count,
        } => format!("policy={policy} variants={variant_count}"),
        StageMetrics::Blur {
            radius,
            candidate_count,
        } => format!("radius={radius} buffers={candidate_count}"),
        StageMetrics::EdgeExtraction {
            candidate_count,
            edge_pixel_count,
            total_pixel_count,
        } => {
            #[allow(clippy::cast_precision_loss)]
            let density = if *total_pixel_count > 0 {
                *edge_pixel_count as f64 / *total_pixel_count as f64 * 100.0
            } else {
                0.0
            };
            format!("outlines={candidate_count} edges={edge_pixel_count} ({density:.1}%)")
        }
        StageMetrics::Invert { white_pixel_count } => format!("white={white_pixel_count}"),
        StageMetrics::Sharpen { applied } => format!("applied={applied}"),
        StageMetrics::Encode {
            format,
            output_bytes,
        } => format!("{format} {output_bytes} bytes"),
    }
}

/// Count pixels with a non-zero value.
pub(crate) fn count_nonzero_pixels(image: &GrayImage) -> u64 {
    image.pixels().map(|p| u64::from(p.0[0] != 0)).sum()
}

/// Count pixels at full white (255).
pub(crate) fn count_white_pixels(image: &GrayImage) -> u64 {
    image.pixels().map(|p| u64::from(p.0[0] == 255)).sum()
}

/// Run `step` and record how long it took.
fn timed<C: Clock, T>(clock: &C, step: impl FnOnce() -> T) -> (T, Duration) {
    let start = clock.now();
    let value = step();
    (value, clock.elapsed(&start))
}

/// Run the full pipeline, collecting per-stage diagnostics.
///
/// Produces exactly the bytes [`crate::generate_line_art`] would.
///
/// # Errors
///
/// Returns the same errors as [`crate::generate_line_art`].
pub fn generate_line_art_with_diagnostics<C: Clock>(
    image_bytes: &[u8],
    params: &PipelineParameters,
    clock: &C,
) -> Result<(Vec<u8>, PipelineDiagnostics), PipelineError> {
    let start = clock.now();

    let (decoded, decode_time) = timed(clock, || {
        Pipeline::new(image_bytes, params.clone()).decode()
    });
    let decoded = decoded?;
    let decode = StageDiagnostics {
        duration: decode_time,
        metrics: decoded.metrics(),
    };
    let dimensions = decoded.dimensions();

    let (grayscaled, duration) = timed(clock, || decoded.grayscale());
    let grayscale = StageDiagnostics {
        duration,
        metrics: grayscaled.metrics(),
    };

    let (toned, duration) = timed(clock, || grayscaled.adjust_tone());
    let toned = toned?;
    let tone = StageDiagnostics {
        duration,
        metrics: toned.metrics(),
    };

    let (blurred, duration) = timed(clock, || toned.blur());
    let blur = StageDiagnostics {
        duration,
        metrics: blurred.metrics(),
    };

    let (edges, duration) = timed(clock, || blurred.extract_edges());
    let edge_extraction = StageDiagnostics {
        duration,
        metrics: edges.metrics(),
    };
    let edge_pixel_count = count_nonzero_pixels(edges.outline());

    let (inverted, duration) = timed(clock, || edges.invert());
    let invert = StageDiagnostics {
        duration,
        metrics: inverted.metrics(),
    };

    let (sharpened, duration) = timed(clock, || inverted.sharpen());
    let sharpen = sharpened.applied().then(|| StageDiagnostics {
        duration,
        metrics: sharpened.metrics(),
    });

    let (encoded, duration) = timed(clock, || sharpened.encode());
    let encoded = encoded?;
    let encode = StageDiagnostics {
        duration,
        metrics: encoded.metrics(),
    };

    let total_duration = clock.elapsed(&start);
    let bytes = encoded.into_bytes();

    let diagnostics = PipelineDiagnostics {
        decode,
        grayscale,
        tone,
        blur,
        edge_extraction,
        invert,
        sharpen,
        encode,
        total_duration,
        summary: PipelineSummary {
            image_width: dimensions.width,
            image_height: dimensions.height,
            pixel_count: dimensions.pixel_count(),
            edge_pixel_count,
            output_bytes: bytes.len(),
        },
    };

    Ok((bytes, diagnostics))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::testing::solid_png;

    /// A clock that advances one millisecond per reading.
    struct TickClock {
        ticks: Cell<u64>,
    }

    impl TickClock {
        const fn new() -> Self {
            Self {
                ticks: Cell::new(0),
            }
        }
    }

    impl Clock for TickClock {
        type Instant = u64;

        fn now(&self) -> u64 {
            let t = self.ticks.get();
            self.ticks.set(t + 1);
            t
        }

        fn elapsed(&self, since: &u64) -> Duration {
            Duration::from_millis(self.now() - since)
        }
    }

    #[test]
    fn duration_ms_converts_correctly() {
        let d = Duration::from_millis(1234);
        let ms = duration_ms(d);
        assert!((ms - 1234.0).abs() < 0.01);
    }

    #[test]
    fn pixel_counters() {
        let mut img = GrayImage::new(10, 10);
        for i in 0..5 {
            img.put_pixel(i, 0, image::Luma([255]));
        }
        img.put_pixel(0, 1, image::Luma([3]));
        assert_eq!(count_white_pixels(&img), 5);
        assert_eq!(count_nonzero_pixels(&img), 6);
    }

    #[test]
    fn diagnostics_match_plain_run() {
        let png = solid_png(6, 5, 90);
        let params = PipelineParameters {
            sharpen: true,
            ..PipelineParameters::default()
        };
        let (bytes, diag) =
            generate_line_art_with_diagnostics(&png, &params, &TickClock::new()).unwrap();
        assert_eq!(bytes, crate::generate_line_art(&png, &params).unwrap());
        assert_eq!(diag.summary.image_width, 6);
        assert_eq!(diag.summary.image_height, 5);
        assert_eq!(diag.summary.pixel_count, 30);
        assert_eq!(diag.summary.edge_pixel_count, 0);
        assert_eq!(diag.summary.output_bytes, bytes.len());
        assert!(diag.sharpen.is_some());
        assert!(diag.total_duration >= diag.decode.duration);
    }

    #[test]
    fn sharpen_is_omitted_when_disabled() {
        let png = solid_png(3, 3, 10);
        let (_, diag) = generate_line_art_with_diagnostics(
            &png,
            &PipelineParameters::default(),
            &TickClock::new(),
        )
        .unwrap();
        assert!(diag.sharpen.is_none());
        assert!(!diag.report().contains("Sharpen"));
    }

    #[test]
    fn errors_propagate() {
        let result = generate_line_art_with_diagnostics(
            b"garbage",
            &PipelineParameters::default(),
            &TickClock::new(),
        );
        assert!(matches!(result, Err(PipelineError::ImageDecode(_))));
    }

    #[test]
    fn report_lists_every_stage() {
        let png = solid_png(4, 4, 200);
        let params = PipelineParameters {
            sharpen: true,
            blur_radius: 1,
            ..PipelineParameters::default()
        };
        let (_, diag) =
            generate_line_art_with_diagnostics(&png, &params, &TickClock::new()).unwrap();
        let report = diag.report();
        assert!(report.contains("Pipeline Diagnostics Report"));
        for stage in [
            "Decode",
            "Grayscale",
            "Tone",
            "Blur",
            "Edge Extraction",
            "Invert",
            "Sharpen",
            "Encode",
        ] {
            assert!(report.contains(stage), "missing {stage}");
        }
        assert!(report.contains("radius=1"));
    }

    #[test]
    fn diagnostics_serialize_durations_as_seconds() {
        let png = solid_png(2, 2, 0);
        let (_, diag) = generate_line_art_with_diagnostics(
            &png,
            &PipelineParameters::default(),
            &TickClock::new(),
        )
        .unwrap();
        let json = serde_json::to_value(&diag).unwrap();
        assert!(json["total_duration"].is_f64());
        assert!(json["sharpen"].is_null());
        let back: PipelineDiagnostics = serde_json::from_value(json).unwrap();
        assert_eq!(back.decode.metrics, diag.decode.metrics);
    }
}
