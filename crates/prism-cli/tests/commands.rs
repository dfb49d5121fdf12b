//! End-to-end command tests on temporary files. CPU path only.

use std::fs;
use std::path::Path;

use prism_cli::commands::grade::{self, GradeArgs};
use prism_cli::commands::histogram::{self, HistogramArgs};
use prism_cli::commands::info::ImageInfo;
use prism_cli::config::CliConfig;
use prism_core::PixelBuffer;
use prism_core::scopes::histogram::Histogram;
use tempfile::TempDir;

fn cpu_config() -> CliConfig {
    CliConfig::from_lookup(|_| None)
}

fn write_png(path: &Path, width: u32, height: u32, rgba: [u8; 4]) {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba(rgba));
    img.save(path).expect("write test png");
}

#[test]
fn test_grade_exposure_doubles_values() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in.png");
    let output = dir.path().join("out.png");
    write_png(&input, 3, 2, [50, 60, 70, 200]);

    let args = GradeArgs {
        input,
        output: output.clone(),
        exposure: Some(0.5),
        ..Default::default()
    };
    grade::run(args, &cpu_config()).unwrap();

    let result = image::open(&output).unwrap().to_rgba8();
    assert_eq!(result.dimensions(), (3, 2));
    for px in result.pixels() {
        assert_eq!(px.0, [100, 120, 140, 200]);
    }
}

#[test]
fn test_grade_clips_on_export() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in.png");
    let output = dir.path().join("out.png");
    write_png(&input, 2, 2, [200, 10, 128, 255]);

    let args = GradeArgs {
        input,
        output: output.clone(),
        brightness: Some(0.5),
        ..Default::default()
    };
    grade::run(args, &cpu_config()).unwrap();

    let result = image::open(&output).unwrap().to_rgba8();
    let px = result.get_pixel(0, 0).0;
    assert_eq!(px[0], 255);
    assert_eq!(px[3], 255);
}

#[test]
fn test_grade_writes_histogram_plot() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in.png");
    let output = dir.path().join("out.png");
    let plot = dir.path().join("plot.png");
    write_png(&input, 4, 4, [10, 20, 30, 255]);

    let args = GradeArgs {
        input,
        output,
        histogram_plot: Some(plot.clone()),
        ..Default::default()
    };
    grade::run(args, &cpu_config()).unwrap();

    let rendered = image::open(&plot).unwrap().to_rgba8();
    assert_eq!(rendered.dimensions(), (256, 100));
}

#[test]
fn test_flags_override_preset() {
    let dir = TempDir::new().unwrap();
    let preset = dir.path().join("look.json");
    fs::write(&preset, r#"{ "brightness": 0.1, "contrast": 0.3 }"#).unwrap();

    let args = GradeArgs {
        preset: Some(preset),
        contrast: Some(-0.2),
        linearize: true,
        ..Default::default()
    };
    let params = args.resolve_params().unwrap();
    assert_eq!(params.brightness, 0.1);
    assert_eq!(params.contrast, -0.2);
    assert_eq!(params.exposure, 0.0);
    assert!(params.linearize);
}

#[test]
fn test_invalid_preset_is_an_error() {
    let dir = TempDir::new().unwrap();
    let preset = dir.path().join("broken.json");
    fs::write(&preset, "{ brightness: ").unwrap();

    let args = GradeArgs {
        preset: Some(preset),
        ..Default::default()
    };
    assert!(args.resolve_params().is_err());
}

#[test]
fn test_missing_input_is_an_error() {
    let dir = TempDir::new().unwrap();
    let args = GradeArgs {
        input: dir.path().join("nope.png"),
        output: dir.path().join("out.png"),
        ..Default::default()
    };
    let err = grade::run(args, &cpu_config()).unwrap_err();
    assert!(err.to_string().contains("Failed to load"));
}

#[test]
fn test_histogram_exports_json_and_plot() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in.png");
    let json = dir.path().join("hist.json");
    let plot = dir.path().join("hist.png");
    write_png(&input, 5, 4, [10, 20, 30, 255]);

    let args = HistogramArgs {
        input,
        json: Some(json.clone()),
        plot: Some(plot.clone()),
        height: Some(40),
        ..Default::default()
    };
    histogram::run(args, &cpu_config()).unwrap();

    let hist: Histogram = serde_json::from_str(&fs::read_to_string(&json).unwrap()).unwrap();
    assert_eq!(hist.num_bins(), 256);
    assert_eq!(hist.r_bins()[10], 20);
    assert_eq!(hist.g_bins()[20], 20);
    assert_eq!(hist.b_bins()[30], 20);

    let rendered = image::open(&plot).unwrap().to_rgba8();
    assert_eq!(rendered.dimensions(), (256, 40));
}

#[test]
fn test_histogram_bins_flag_wins_over_config() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in.png");
    let json = dir.path().join("hist.json");
    write_png(&input, 2, 2, [1, 2, 3, 255]);

    let config = CliConfig::from_lookup(|key| (key == "PRISM_BINS").then(|| "128".to_string()));
    let args = HistogramArgs {
        input,
        bins: Some(300),
        json: Some(json.clone()),
        ..Default::default()
    };
    histogram::run(args, &config).unwrap();

    let hist: Histogram = serde_json::from_str(&fs::read_to_string(&json).unwrap()).unwrap();
    assert_eq!(hist.num_bins(), 300);
}

#[test]
fn test_histogram_too_few_bins_fails() {
    let buffer = PixelBuffer::filled(2, 2, [200, 0, 0, 255]).unwrap();
    assert!(histogram::build(&buffer, 16, false, false).is_err());
}

#[test]
fn test_parallel_build_matches_sequential() {
    let pixels: Vec<[u8; 4]> = (0..64u32)
        .map(|i| [(i * 3) as u8, (i * 5) as u8, (i * 7) as u8, 255])
        .collect();
    let buffer = PixelBuffer::from_pixels(8, 8, &pixels).unwrap();

    let seq = histogram::build(&buffer, 256, false, false).unwrap();
    let par = histogram::build(&buffer, 256, true, false).unwrap();
    assert_eq!(seq, par);
}

#[test]
fn test_info_reports_channel_means() {
    let buffer = PixelBuffer::from_pixels(2, 1, &[[0, 100, 255, 255], [100, 100, 255, 0]]).unwrap();
    let info = ImageInfo::from_buffer(&buffer).unwrap();

    assert_eq!((info.width, info.height, info.pixels), (2, 1, 2));
    assert_eq!(info.means, [Some(50.0), Some(100.0), Some(255.0)]);
}

#[test]
fn test_oversized_gpu_input_takes_cpu_path() {
    use prism_cli::commands::falls_back_to_cpu;
    use prism_gpu::GpuError;

    assert!(falls_back_to_cpu(&GpuError::TooLarge {
        bytes: 192_000_000,
        limit: 134_217_728,
    }));
    assert!(falls_back_to_cpu(&GpuError::EmptyImage));
    assert!(falls_back_to_cpu(&GpuError::UnsupportedBins {
        requested: 64,
        supported: 256,
    }));
    assert!(!falls_back_to_cpu(&GpuError::MapPending));
}
