use std::collections::HashMap;

use image::{DynamicImage, GenericImageView, RgbaImage};
use rayon::prelude::*;

use crate::color::Color;
use crate::config::SamplingConfig;

/// Read access to a decoded raster, normalized to 8-bit RGBA.
pub trait PixelSource: Sync {
    fn dimensions(&self) -> (u32, u32);

    /// Pixel at `(x, y)`. Callers stay within `dimensions()`.
    fn rgba(&self, x: u32, y: u32) -> [u8; 4];
}

impl PixelSource for RgbaImage {
    fn dimensions(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    fn rgba(&self, x: u32, y: u32) -> [u8; 4] {
        self.get_pixel(x, y).0
    }
}

impl PixelSource for DynamicImage {
    fn dimensions(&self) -> (u32, u32) {
        GenericImageView::dimensions(self)
    }

    fn rgba(&self, x: u32, y: u32) -> [u8; 4] {
        self.get_pixel(x, y).0
    }
}

/// Quantized color counts produced by one sampling pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleResult {
    pub frequencies: HashMap<Color, u64>,
    pub total_samples: u64,
}

impl SampleResult {
    /// Fold another partial result into this one. Order does not matter.
    pub fn merge(&mut self, other: SampleResult) {
        for (color, count) in other.frequencies {
            *self.frequencies.entry(color).or_insert(0) += count;
        }
        self.total_samples += other.total_samples;
    }

    pub fn is_empty(&self) -> bool {
        self.total_samples == 0
    }
}

/// Pixel step in both axes, chosen to bound the cost of very large images.
pub fn stride_for(pixel_count: u64) -> u32 {
    match pixel_count {
        n if n > 8_000_000 => 4,
        n if n > 4_000_000 => 3,
        n if n > 2_000_000 => 2,
        _ => 1,
    }
}

/// Snap a channel to the nearest of `2^bits` evenly spaced levels in [0, 255].
pub fn quantize_channel(value: u8, bits: u8) -> u8 {
    let bits = bits.clamp(1, 8);
    let max_level = (1u32 << bits) - 1;
    let level = (u32::from(value) * max_level + 127) / 255;
    ((level * 255 + max_level / 2) / max_level) as u8
}

/// Quantize an RGBA pixel to an opaque color. Alpha is discarded.
pub fn quantize(pixel: [u8; 4], bits: u8) -> Color {
    Color::new(
        quantize_channel(pixel[0], bits),
        quantize_channel(pixel[1], bits),
        quantize_channel(pixel[2], bits),
    )
}

/// Walk the image with an adaptive stride and count quantized colors.
///
/// Large images are split into contiguous row bands sampled on the rayon pool, each
/// into its own map; the partial maps are summed once every band has finished.
pub fn sample<S: PixelSource + ?Sized>(source: &S, config: &SamplingConfig) -> SampleResult {
    let (width, height) = source.dimensions();
    let pixel_count = u64::from(width) * u64::from(height);
    if pixel_count == 0 {
        tracing::debug!(width, height, "zero-area image, nothing to sample");
        return SampleResult::default();
    }

    let stride = stride_for(pixel_count);
    let rows: Vec<u32> = (0..height).step_by(stride as usize).collect();
    let samples_per_row = u64::from(width.div_ceil(stride));
    let expected = rows.len() as u64 * samples_per_row;
    let threads = rayon::current_num_threads();
    let bits = config.quantize_bits;

    let result = if expected >= config.parallel_min_samples
        && threads >= config.parallel_min_threads
    {
        let band_len = rows.len().div_ceil(threads).max(1);
        tracing::debug!(
            expected,
            stride,
            bands = rows.len().div_ceil(band_len),
            "sampling in parallel"
        );
        let partials: Vec<SampleResult> = rows
            .par_chunks(band_len)
            .map(|band| sample_rows(source, band, width, stride, bits))
            .collect();
        partials
            .into_iter()
            .fold(SampleResult::default(), |mut acc, partial| {
                acc.merge(partial);
                acc
            })
    } else {
        tracing::debug!(expected, stride, "sampling sequentially");
        sample_rows(source, &rows, width, stride, bits)
    };

    tracing::debug!(
        total_samples = result.total_samples,
        distinct = result.frequencies.len(),
        "sampling complete"
    );
    result
}

fn sample_rows<S: PixelSource + ?Sized>(
    source: &S,
    rows: &[u32],
    width: u32,
    stride: u32,
    bits: u8,
) -> SampleResult {
    let mut result = SampleResult::default();
    for &y in rows {
        for x in (0..width).step_by(stride as usize) {
            let color = quantize(source.rgba(x, y), bits);
            *result.frequencies.entry(color).or_insert(0) += 1;
            result.total_samples += 1;
        }
    }
    result
}
