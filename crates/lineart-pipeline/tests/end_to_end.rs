//! End-to-end scenarios through the public API.

#![allow(clippy::unwrap_used)]

use image::{GrayImage, ImageEncoder, RgbImage};
use lineart_pipeline::{
    ErrorKind, OutputFormat, ParameterError, Pipeline, PipelineError, PipelineParameters,
    ToneParameters, generate_line_art,
};

fn png(img: &RgbImage) -> Vec<u8> {
    let mut buf = Vec::new();
    image::codecs::png::PngEncoder::new(&mut buf)
        .write_image(
            img.as_raw(),
            img.width(),
            img.height(),
            image::ExtendedColorType::Rgb8,
        )
        .unwrap();
    buf
}

fn checkerboard_png(width: u32, height: u32) -> Vec<u8> {
    png(&RgbImage::from_fn(width, height, |x, y| {
        let v = if (x + y) % 2 == 0 { 0 } else { 255 };
        image::Rgb([v, v, v])
    }))
}

fn photo_like_png(width: u32, height: u32) -> Vec<u8> {
    png(&RgbImage::from_fn(width, height, |x, y| {
        let r = u8::try_from((x * 255) / width.max(1)).unwrap();
        let g = u8::try_from((y * 255) / height.max(1)).unwrap();
        let b = if (x / 4 + y / 4) % 2 == 0 { 40 } else { 200 };
        image::Rgb([r, g, b])
    }))
}

fn decode(bytes: &[u8]) -> GrayImage {
    image::load_from_memory(bytes).unwrap().to_luma8()
}

#[test]
fn solid_gray_becomes_white_page() {
    let input = png(&RgbImage::from_pixel(4, 4, image::Rgb([128, 128, 128])));
    let out = generate_line_art(&input, &PipelineParameters::default()).unwrap();
    let gray = decode(&out);
    assert_eq!(gray.dimensions(), (4, 4));
    assert!(gray.pixels().all(|p| p.0[0] >= 250));
}

#[test]
fn checkerboard_is_mostly_stroke() {
    let input = checkerboard_png(2, 2);

    let edges = Pipeline::new(&input, PipelineParameters::default())
        .decode()
        .unwrap()
        .grayscale()
        .adjust_tone()
        .unwrap()
        .blur()
        .extract_edges();
    let bright = edges.outline().pixels().filter(|p| p.0[0] == 255).count();
    assert!(bright >= 3, "only {bright} edge pixels");

    let out = generate_line_art(&input, &PipelineParameters::default()).unwrap();
    let dark = decode(&out).pixels().filter(|p| p.0[0] == 0).count();
    assert!(dark >= 3, "only {dark} stroke pixels");
}

#[test]
fn garbage_bytes_are_a_decode_error() {
    let err = generate_line_art(b"\x00\x01\x02 not an image", &PipelineParameters::default())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Decode);
}

#[test]
fn truncated_png_is_a_decode_error() {
    let full = photo_like_png(32, 32);
    let truncated = &full[..full.len() / 2];
    let err = generate_line_art(truncated, &PipelineParameters::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Decode);
}

#[test]
fn zero_or_negative_gamma_is_a_parameter_error() {
    let input = photo_like_png(8, 8);
    for tone in [
        ToneParameters::Gamma {
            lighten: Some(0.0),
            darken: None,
        },
        ToneParameters::Gamma {
            lighten: None,
            darken: Some(-0.5),
        },
    ] {
        let params = PipelineParameters {
            tone,
            ..PipelineParameters::default()
        };
        let err = generate_line_art(&input, &params).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidParameter(_)), "{err}");
    }
}

#[test]
fn out_of_range_linear_tone_is_a_parameter_error() {
    let params = PipelineParameters {
        tone: ToneParameters::Linear {
            contrast: 127,
            brightness: 0,
        },
        ..PipelineParameters::default()
    };
    let err = generate_line_art(&photo_like_png(4, 4), &params).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Parameter);
}

#[test]
fn huge_blur_radius_is_a_parameter_error() {
    let input = png(&RgbImage::from_pixel(4, 4, image::Rgb([128, 128, 128])));
    for blur_radius in [50_000_000, i32::MAX] {
        let params = PipelineParameters {
            blur_radius,
            ..PipelineParameters::default()
        };
        let err = generate_line_art(&input, &params).unwrap_err();
        assert!(
            matches!(
                err,
                PipelineError::InvalidParameter(ParameterError::BlurRadiusTooLarge(r))
                    if r == blur_radius
            ),
            "{err}"
        );
    }

    let widest = PipelineParameters {
        blur_radius: 1024,
        ..PipelineParameters::default()
    };
    let out = generate_line_art(&input, &widest).unwrap();
    assert_eq!(decode(&out).dimensions(), (4, 4));
}

#[test]
fn neutral_linear_tone_matches_pass_through() {
    let input = photo_like_png(20, 14);
    let plain = generate_line_art(&input, &PipelineParameters::default()).unwrap();
    let neutral = generate_line_art(
        &input,
        &PipelineParameters {
            tone: ToneParameters::Linear {
                contrast: 0,
                brightness: 0,
            },
            ..PipelineParameters::default()
        },
    )
    .unwrap();
    assert_eq!(plain, neutral);
}

#[test]
fn dimensions_are_preserved_for_every_setting() {
    let input = photo_like_png(23, 17);
    let settings = [
        PipelineParameters::default(),
        PipelineParameters {
            blur_radius: 2,
            sharpen: true,
            ..PipelineParameters::default()
        },
        PipelineParameters {
            tone: ToneParameters::Linear {
                contrast: 40,
                brightness: -20,
            },
            ..PipelineParameters::default()
        },
        PipelineParameters {
            tone: ToneParameters::Gamma {
                lighten: Some(2.2),
                darken: Some(0.45),
            },
            output_format: OutputFormat::Jpeg { quality: 75 },
            ..PipelineParameters::default()
        },
    ];
    for params in &settings {
        let out = generate_line_art(&input, params).unwrap();
        assert_eq!(decode(&out).dimensions(), (23, 17), "{params:?}");
    }
}

#[test]
fn gamma_variants_only_add_strokes() {
    let input = photo_like_png(24, 24);
    let base = decode(&generate_line_art(&input, &PipelineParameters::default()).unwrap());
    let with_gamma = decode(
        &generate_line_art(
            &input,
            &PipelineParameters {
                tone: ToneParameters::Gamma {
                    lighten: Some(2.0),
                    darken: Some(0.5),
                },
                ..PipelineParameters::default()
            },
        )
        .unwrap(),
    );
    for (a, b) in base.pixels().zip(with_gamma.pixels()) {
        assert!(b.0[0] <= a.0[0], "a stroke got lighter");
    }
}

#[test]
fn pixel_ceiling_rejects_large_images() {
    let params = PipelineParameters {
        max_pixels: 100,
        ..PipelineParameters::default()
    };
    let err = generate_line_art(&photo_like_png(11, 10), &params).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::ImageTooLarge {
            width: 11,
            height: 10,
            max_pixels: 100
        }
    ));

    let unlimited = PipelineParameters {
        max_pixels: 0,
        ..PipelineParameters::default()
    };
    assert!(generate_line_art(&photo_like_png(11, 10), &unlimited).is_ok());
}

#[test]
fn parameters_round_trip_through_json() {
    let json = r#"{
        "blur_radius": 1,
        "sharpen": true,
        "tone": { "policy": "gamma", "lighten": 1.5 },
        "output_format": { "format": "jpeg", "quality": 80 }
    }"#;
    let params: PipelineParameters = serde_json::from_str(json).unwrap();
    assert_eq!(params.blur_radius, 1);
    assert_eq!(
        params.tone,
        ToneParameters::Gamma {
            lighten: Some(1.5),
            darken: None
        }
    );
    assert_eq!(params.max_pixels, PipelineParameters::DEFAULT_MAX_PIXELS);
    let out = generate_line_art(&photo_like_png(9, 9), &params).unwrap();
    assert_eq!(image::guess_format(&out).unwrap(), image::ImageFormat::Jpeg);
}
