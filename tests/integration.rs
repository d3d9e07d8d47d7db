use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Once;

use image::{Rgba, RgbaImage};
use proptest::prelude::*;

use nuri_profile::category::Category;
use nuri_profile::cli::ThemeMode;
use nuri_profile::color::Color;
use nuri_profile::config::Config;
use nuri_profile::pipeline::hue::{circular_mean, hue_distance};
use nuri_profile::pipeline::sample::{sample, stride_for, PixelSource};
use nuri_profile::pipeline::weighted::{total_weight, weigh};
use nuri_profile::profile::{process_image, Profiler};
use nuri_profile::ProfileError;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn fixture_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

fn create_dark_photo(path: &Path) {
    let img = image::RgbImage::from_fn(64, 64, |x, y| {
        let r = ((x * 40) / 64) as u8;
        let g = ((y * 30) / 64) as u8 + 5;
        let b = 20 + ((x + y) % 15) as u8;
        image::Rgb([r, g, b])
    });
    img.save(path).unwrap();
}

fn create_light_photo(path: &Path) {
    let img = image::RgbImage::from_fn(64, 64, |x, y| {
        let r = 200 + ((x * 55) / 64) as u8;
        let g = 190 + ((y * 55) / 64) as u8;
        let b = 180 + (((x + y) * 30) / 128).min(75) as u8;
        image::Rgb([r, g, b])
    });
    img.save(path).unwrap();
}

fn create_colorful(path: &Path) {
    let img = image::RgbImage::from_fn(64, 64, |x, y| {
        let region = (x / 16) + (y / 16) * 4;
        match region % 8 {
            0 => image::Rgb([220, 50, 50]),
            1 => image::Rgb([50, 200, 50]),
            2 => image::Rgb([50, 50, 220]),
            3 => image::Rgb([220, 220, 50]),
            4 => image::Rgb([200, 50, 200]),
            5 => image::Rgb([50, 200, 200]),
            6 => image::Rgb([20, 20, 20]),
            _ => image::Rgb([240, 240, 240]),
        }
    });
    img.save(path).unwrap();
}

fn ensure_fixtures() {
    static FIXTURES: Once = Once::new();
    FIXTURES.call_once(|| {
        let dir = fixture_dir();
        std::fs::create_dir_all(&dir).unwrap();
        create_dark_photo(&dir.join("dark-photo.png"));
        create_light_photo(&dir.join("light-photo.png"));
        create_colorful(&dir.join("colorful.png"));
        std::fs::write(dir.join("not_an_image.txt"), "plain text").unwrap();
        std::fs::write(dir.join("broken.toml"), "[mode]\nthreshold = 3.0\n").unwrap();
        std::fs::write(dir.join("bright.toml"), "[mode]\nthreshold = 0.02\n").unwrap();
    });
}

fn fixture(name: &str) -> String {
    ensure_fixtures();
    fixture_dir().join(name).to_string_lossy().into_owned()
}

/// Deterministic xorshift noise, one fresh RGB triple per pixel.
fn noise_image(width: u32, height: u32, seed: u32) -> RgbaImage {
    let mut state = seed.max(1);
    RgbaImage::from_fn(width, height, |_, _| {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        let [r, g, b, _] = state.to_le_bytes();
        Rgba([r, g, b, 255])
    })
}

fn black_white(dark_percent: u32) -> RgbaImage {
    RgbaImage::from_fn(100, 20, |x, _| {
        if x < dark_percent {
            Rgba([0, 0, 0, 255])
        } else {
            Rgba([255, 255, 255, 255])
        }
    })
}

// ---------------------------------------------------------------------------
// Pipeline scenarios
// ---------------------------------------------------------------------------

#[test]
fn mostly_black_image_is_dark_with_maximal_contrast() {
    let profile = process_image(&black_white(70), &Config::default()).unwrap();

    assert_eq!(profile.mode, ThemeMode::Dark);
    assert!((profile.weighted_lightness - 0.3).abs() < 0.01);
    let bg = profile.color(Category::Background).unwrap();
    let fg = profile.color(Category::Foreground).unwrap();
    assert_eq!(bg, Color::BLACK);
    assert_eq!(fg, Color::WHITE);
    assert!((Color::contrast_ratio(&fg, &bg) - 21.0).abs() < 0.01);
}

#[test]
fn single_red_hue_has_no_spread() {
    // Pure red from L = 0.1 up to L = 0.9.
    let img = RgbaImage::from_fn(81, 16, |x, _| {
        let c = Color::from_hsl(0.0, 1.0, 0.1 + x as f32 * 0.01);
        Rgba([c.r, c.g, c.b, 255])
    });
    let profile = process_image(&img, &Config::default()).unwrap();
    let stats = profile.statistics();

    let lightness: Vec<f32> = profile.pool.all_colors.iter().map(|c| c.color.lightness()).collect();
    assert!(lightness.iter().any(|&l| l < 0.25), "{lightness:?}");
    assert!(lightness.iter().any(|&l| l > 0.75), "{lightness:?}");
    assert!(stats.hue_variance < 1.0, "variance {}", stats.hue_variance);
    assert_eq!(stats.chromatic_diversity, 0.0);
    assert!(stats.chromatic_diversity.is_sign_positive());
    assert_eq!(stats.primary_hue, 15.0);
    assert_eq!(stats.secondary_hue, 0.0);
    assert!(stats.mean_hue < 1.0 || stats.mean_hue > 359.0);
    assert!(profile.has_significant_color);
}

#[test]
fn noise_is_mostly_filtered_out() {
    // Half flat black, half noise: the noise spreads over tens of thousands of
    // colors, none of which reaches the minimum weight.
    let noise = noise_image(256, 128, 7);
    let img = RgbaImage::from_fn(256, 256, |x, y| {
        if y < 128 {
            Rgba([0, 0, 0, 255])
        } else {
            *noise.get_pixel(x, y - 128)
        }
    });
    let mut config = Config::default();
    config.sampling.quantize_bits = 8;

    let profile = process_image(&img, &config).unwrap();
    assert!(profile.sampled_colors > 10_000, "{}", profile.sampled_colors);
    assert!(profile.pool.len() < 100, "{}", profile.pool.len());
    assert!(profile.coverage_ratio < 1.0);
    assert_eq!(profile.color(Category::Background), Some(Color::BLACK));
}

#[test]
fn coarse_noise_is_chromatically_diverse() {
    let mut config = Config::default();
    config.sampling.quantize_bits = 3;

    let profile = process_image(&noise_image(256, 256, 42), &config).unwrap();
    let stats = profile.statistics();
    assert!(stats.chromatic_diversity > 0.6, "{}", stats.chromatic_diversity);
    assert!(profile.has_significant_color);
    assert!(profile.coverage_ratio > 0.0 && profile.coverage_ratio <= 1.0);
}

#[test]
fn pure_noise_at_full_precision_is_input_empty() {
    let mut config = Config::default();
    config.sampling.quantize_bits = 8;
    let err = process_image(&noise_image(128, 128, 3), &config).unwrap_err();
    assert!(matches!(err, ProfileError::InputEmpty));
}

#[test]
fn single_pixel_image() {
    let img = RgbaImage::from_pixel(1, 1, Rgba([128, 64, 32, 255]));
    let config = Config::default();
    let profile = process_image(&img, &config).unwrap();

    assert_eq!(profile.pool.len(), 1);
    assert_eq!(profile.mode, ThemeMode::Dark);
    assert!(profile.background_fallback);
    assert_eq!(
        profile.color(Category::Background),
        Some(config.fallbacks.dark.background)
    );
    assert!(profile.coverage_ratio < 0.5);
}

#[test]
fn colorful_fixture_fills_accents() {
    let img = image::open(fixture("colorful.png")).unwrap();
    let profile = process_image(&img, &Config::default()).unwrap();

    assert!(profile.has_significant_color);
    assert!(profile.color(Category::AccentPrimary).is_some());
    let bg = profile.color(Category::Background).unwrap();
    let table = Config::default().category_table();
    for (&category, color) in &profile.colors {
        if category == Category::Background {
            continue;
        }
        let min = table.get(category, profile.mode).min_contrast;
        assert!(
            Color::contrast_ratio(color, &bg) >= min,
            "{category} {color} vs {bg} below {min}"
        );
    }
}

#[test]
fn light_fixture_is_light() {
    let img = image::open(fixture("light-photo.png")).unwrap();
    let profile = process_image(&img, &Config::default()).unwrap();
    assert_eq!(profile.mode, ThemeMode::Light);
    let bg = profile.color(Category::Background).unwrap();
    assert!(bg.lightness() >= 0.85, "{bg}");
}

#[test]
fn one_profiler_serves_many_threads() {
    let profiler = Profiler::new(Config::default()).unwrap();
    let img = image::open(fixture("colorful.png")).unwrap();
    let expected = profiler.profile(&img).unwrap();

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| profiler.profile(&img).unwrap()))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap().colors, expected.colors);
        }
    });
}

#[test]
fn parallel_and_sequential_sampling_agree() {
    let img = noise_image(300, 300, 11);
    let mut sequential = Config::default().sampling;
    sequential.parallel_min_samples = u64::MAX;
    let mut parallel = Config::default().sampling;
    parallel.parallel_min_samples = 1;
    parallel.parallel_min_threads = 1;

    assert_eq!(sample(&img, &sequential), sample(&img, &parallel));
}

/// Reports a large canvas without allocating it: black on even columns, white on odd.
struct StripedCanvas {
    width: u32,
    height: u32,
}

impl PixelSource for StripedCanvas {
    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn rgba(&self, x: u32, _y: u32) -> [u8; 4] {
        if x % 2 == 0 {
            [0, 0, 0, 255]
        } else {
            [255, 255, 255, 255]
        }
    }
}

#[test]
fn large_images_are_sampled_with_a_stride() {
    let config = Config::default().sampling;
    let cases = [
        // (width, height, stride)
        (2_000, 1_000, 1),
        (3_000, 1_000, 2),
        (3_000, 1_500, 3),
        (4_000, 2_250, 4),
    ];
    for (width, height, stride) in cases {
        let canvas = StripedCanvas { width, height };
        assert_eq!(stride_for(u64::from(width) * u64::from(height)), stride);

        let result = sample(&canvas, &config);
        let expected = u64::from(width.div_ceil(stride)) * u64::from(height.div_ceil(stride));
        assert_eq!(result.total_samples, expected, "{width}x{height}");
        let black = result.frequencies[&Color::BLACK];
        if stride % 2 == 0 {
            // Even strides only ever land on even columns.
            assert_eq!(black, expected, "{width}x{height}");
            assert_eq!(result.frequencies.len(), 1);
        } else {
            assert!(black < expected, "{width}x{height}");
            assert_eq!(result.frequencies.len(), 2);
        }
    }
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

fn arb_image() -> impl Strategy<Value = RgbaImage> {
    (1u32..24, 1u32..24).prop_flat_map(|(w, h)| {
        prop::collection::vec(any::<[u8; 3]>(), (w * h) as usize).prop_map(move |pixels| {
            RgbaImage::from_fn(w, h, |x, y| {
                let [r, g, b] = pixels[(y * w + x) as usize];
                Rgba([r, g, b, 255])
            })
        })
    })
}

proptest! {
    #[test]
    fn weights_sum_to_one(img in arb_image(), bits in 1u8..=8) {
        let mut config = Config::default().sampling;
        config.quantize_bits = bits;
        let weighted = weigh(&sample(&img, &config));
        prop_assert!((total_weight(&weighted) - 1.0).abs() < 1e-3);
    }

    #[test]
    fn pool_bands_partition_the_pool(img in arb_image()) {
        let mut config = Config::default();
        config.sampling.quantize_bits = 2;
        config.pool.min_frequency = 0.0;
        let profile = process_image(&img, &config).unwrap();
        let pool = &profile.pool;
        prop_assert_eq!(pool.by_lightness.len(), pool.len());
        prop_assert_eq!(pool.by_saturation.len(), pool.len());
        let sectored: usize = pool.by_hue.values().map(Vec::len).sum();
        prop_assert!(sectored <= pool.len());
    }

    #[test]
    fn contrast_is_symmetric(a in any::<[u8; 3]>(), b in any::<[u8; 3]>()) {
        let (a, b) = (Color::new(a[0], a[1], a[2]), Color::new(b[0], b[1], b[2]));
        let ab = Color::contrast_ratio(&a, &b);
        prop_assert_eq!(ab, Color::contrast_ratio(&b, &a));
        prop_assert!((1.0..=21.01).contains(&ab));
    }

    #[test]
    fn hue_distance_is_circular(a in 0.0f32..360.0, b in 0.0f32..360.0) {
        let d = hue_distance(a, b);
        prop_assert!((0.0..=180.0).contains(&d));
        prop_assert!((d - hue_distance(b, a)).abs() < 1e-3);
    }

    #[test]
    fn assigned_roles_stay_above_required_contrast(img in arb_image()) {
        let mut config = Config::default();
        config.sampling.quantize_bits = 3;
        config.pool.min_frequency = 0.0;
        let profile = process_image(&img, &config).unwrap();
        let table = config.category_table();
        let bg = profile.color(Category::Background).unwrap();
        for (&category, color) in &profile.colors {
            if category != Category::Background {
                let min = table.get(category, profile.mode).min_contrast;
                prop_assert!(Color::contrast_ratio(color, &bg) >= min);
            }
        }
    }
}

#[test]
fn hue_wraps_at_zero() {
    assert_eq!(hue_distance(359.0, 1.0), 2.0);
    let mean = circular_mean(&[(350.0, 1.0), (10.0, 1.0)]);
    assert!(mean < 0.01 || mean > 359.99, "mean {mean}");
}

// ---------------------------------------------------------------------------
// CLI integration tests (run the actual binary)
// ---------------------------------------------------------------------------

fn cargo_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_nuri-profile"))
}

fn run_json(args: &[&str]) -> serde_json::Value {
    let output = cargo_bin().args(args).arg("--json").output().unwrap();
    assert!(
        output.status.success(),
        "binary failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn cli_prints_summary() {
    let output = cargo_bin().arg(fixture("dark-photo.png")).output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("mode: Dark"), "{stdout}");
    assert!(stdout.contains("background"));
    assert!(stdout.contains("coverage:"));
}

#[test]
fn cli_json_output() {
    let json = run_json(&[&fixture("colorful.png")]);
    assert_eq!(json["mode_forced"], false);
    assert!(json["colors"]["background"].as_str().unwrap().starts_with('#'));
    let coverage = json["coverage_ratio"].as_f64().unwrap();
    assert!((0.0..=1.0).contains(&coverage));
    assert!(json["pool"]["statistics"]["hue_histogram"].is_array());
}

#[test]
fn cli_mode_flag_forces_mode() {
    let json = run_json(&[&fixture("dark-photo.png"), "--mode", "light"]);
    assert_eq!(json["mode"], "light");
    assert_eq!(json["mode_forced"], true);

    let json = run_json(&[&fixture("light-photo.png"), "--mode", "dark"]);
    assert_eq!(json["mode"], "dark");
}

#[test]
fn cli_config_file_is_applied() {
    let json = run_json(&[&fixture("dark-photo.png")]);
    assert_eq!(json["mode"], "dark");

    let json = run_json(&[&fixture("dark-photo.png"), "--config", &fixture("bright.toml")]);
    assert_eq!(json["mode"], "light");
}

#[test]
fn cli_invalid_config_fails() {
    let output = cargo_bin()
        .args([&fixture("dark-photo.png"), "--config", &fixture("broken.toml")])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to load config"), "{stderr}");
}

#[test]
fn cli_heuristic_strategy() {
    let json = run_json(&[&fixture("colorful.png"), "--heuristic"]);
    let assigned = json["colors"].as_object().unwrap();
    assert!(assigned.contains_key("background"));
    assert!(assigned.len() <= 3);
}

#[test]
fn cli_preview_uses_truecolor() {
    let output = cargo_bin()
        .args([&fixture("colorful.png"), "--preview"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("\x1b[48;2;"));
}

#[test]
fn cli_help_output() {
    let output = cargo_bin().arg("--help").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("nuri-profile"));
    assert!(stdout.contains("--mode"));
    assert!(stdout.contains("--json"));
    assert!(stdout.contains("--preview"));
}

#[test]
fn cli_file_not_found_error() {
    let output = cargo_bin().arg("/nonexistent/image.png").output().unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("file not found"),
        "expected file-not-found error, got: {stderr}"
    );
}

#[test]
fn cli_unsupported_format_error() {
    let output = cargo_bin().arg(fixture("not_an_image.txt")).output().unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("unsupported"),
        "expected unsupported format error, got: {stderr}"
    );
}
