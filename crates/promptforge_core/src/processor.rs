//! Image post-processing
//!
//! Raster operations applied to finished images: upscaling, tone and color
//! adjustment, cropping, resizing, named convolution filters, and stamping or
//! masking a corner watermark. Operations run in order through a [`Pipeline`]
//! and every saved result gets a `<name>_metadata.json` sidecar.
//!
//! Adjustment factors follow the usual enhancer convention: `0.0` gives the
//! degenerate image (black, flat gray, grayscale or smoothed), `1.0` leaves the
//! image unchanged, and values above `1.0` extrapolate past it.

use chrono::Local;
use image::imageops::{self, FilterType};
use image::{DynamicImage, GenericImageView, Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use std::fs;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{ForgeError, Result};

/// Accepted range for brightness/contrast/saturation/sharpness factors.
pub const ENHANCE_RANGE: RangeInclusive<f32> = 0.0..=2.0;

/// Supported upscale factors.
pub const UPSCALE_FACTORS: [u32; 2] = [2, 4];

/// Text stamped by [`Operation::Watermark`].
pub const WATERMARK_TEXT: &str = "AI GENERATED";

/// Distance between a corner mark and the image edge, in pixels.
const MARGIN: u32 = 10;
/// Padding around the stamped text.
const PADDING: u32 = 5;
/// Width of the band above and left of a mark sampled for its fill color.
const SAMPLE_BAND: u32 = 50;

const GLYPH_WIDTH: u32 = 5;
const GLYPH_HEIGHT: u32 = 7;

/// Resampling method for upscaling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resample {
    /// High quality.
    #[default]
    Lanczos,
    /// Fast, keeps hard pixel edges.
    Nearest,
}

impl Resample {
    /// Unknown names fall back to lanczos.
    pub fn from_key(key: &str) -> Self {
        match key.trim().to_lowercase().as_str() {
            "nearest" => Resample::Nearest,
            _ => Resample::Lanczos,
        }
    }

    fn filter(self) -> FilterType {
        match self {
            Resample::Lanczos => FilterType::Lanczos3,
            Resample::Nearest => FilterType::Nearest,
        }
    }
}

/// Named convolution filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamedFilter {
    Blur,
    Sharpen,
    Smooth,
    EdgeEnhance,
    Emboss,
}

impl NamedFilter {
    pub const ALL: [NamedFilter; 5] = [
        NamedFilter::Blur,
        NamedFilter::Sharpen,
        NamedFilter::Smooth,
        NamedFilter::EdgeEnhance,
        NamedFilter::Emboss,
    ];

    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim().to_lowercase().replace('-', "_");
        Self::ALL.into_iter().find(|f| f.as_str() == key)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NamedFilter::Blur => "blur",
            NamedFilter::Sharpen => "sharpen",
            NamedFilter::Smooth => "smooth",
            NamedFilter::EdgeEnhance => "edge_enhance",
            NamedFilter::Emboss => "emboss",
        }
    }

    fn kernel(self) -> &'static Kernel {
        match self {
            NamedFilter::Blur => &BLUR,
            NamedFilter::Sharpen => &SHARPEN,
            NamedFilter::Smooth => &SMOOTH,
            NamedFilter::EdgeEnhance => &EDGE_ENHANCE,
            NamedFilter::Emboss => &EMBOSS,
        }
    }
}

struct Kernel {
    size: u32,
    weights: &'static [f32],
    scale: f32,
    offset: f32,
}

#[rustfmt::skip]
const BLUR: Kernel = Kernel {
    size: 5,
    weights: &[
        1.0, 1.0, 1.0, 1.0, 1.0,
        1.0, 0.0, 0.0, 0.0, 1.0,
        1.0, 0.0, 0.0, 0.0, 1.0,
        1.0, 0.0, 0.0, 0.0, 1.0,
        1.0, 1.0, 1.0, 1.0, 1.0,
    ],
    scale: 16.0,
    offset: 0.0,
};

#[rustfmt::skip]
const SHARPEN: Kernel = Kernel {
    size: 3,
    weights: &[-2.0, -2.0, -2.0, -2.0, 32.0, -2.0, -2.0, -2.0, -2.0],
    scale: 16.0,
    offset: 0.0,
};

#[rustfmt::skip]
const SMOOTH: Kernel = Kernel {
    size: 3,
    weights: &[1.0, 1.0, 1.0, 1.0, 5.0, 1.0, 1.0, 1.0, 1.0],
    scale: 13.0,
    offset: 0.0,
};

#[rustfmt::skip]
const EDGE_ENHANCE: Kernel = Kernel {
    size: 3,
    weights: &[-1.0, -1.0, -1.0, -1.0, 10.0, -1.0, -1.0, -1.0, -1.0],
    scale: 2.0,
    offset: 0.0,
};

#[rustfmt::skip]
const EMBOSS: Kernel = Kernel {
    size: 3,
    weights: &[-1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0],
    scale: 1.0,
    offset: 128.0,
};

/// One post-processing step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    Upscale {
        factor: u32,
        #[serde(default)]
        method: Resample,
    },
    Brightness {
        factor: f32,
    },
    Contrast {
        factor: f32,
    },
    Saturation {
        factor: f32,
    },
    Sharpness {
        factor: f32,
    },
    /// Box in source pixels; `right` and `bottom` are exclusive.
    Crop {
        left: u32,
        top: u32,
        right: u32,
        bottom: u32,
    },
    /// With `keep_aspect` the image is shrunk to fit inside the box and never
    /// enlarged; otherwise it is stretched to exactly `width` x `height`.
    Resize {
        width: u32,
        height: u32,
        keep_aspect: bool,
    },
    Filter {
        name: NamedFilter,
    },
    /// Paint over the bottom-right corner with the surrounding color.
    RemoveWatermark,
    /// Stamp [`WATERMARK_TEXT`] in the bottom-right corner.
    Watermark,
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Upscale { .. } => "upscale",
            Operation::Brightness { .. } => "brightness",
            Operation::Contrast { .. } => "contrast",
            Operation::Saturation { .. } => "saturation",
            Operation::Sharpness { .. } => "sharpness",
            Operation::Crop { .. } => "crop",
            Operation::Resize { .. } => "resize",
            Operation::Filter { .. } => "filter",
            Operation::RemoveWatermark => "remove_watermark",
            Operation::Watermark => "watermark",
        }
    }

    /// Checks that do not depend on the image.
    pub fn validate(&self) -> Result<()> {
        match *self {
            Operation::Upscale { factor, .. } if !UPSCALE_FACTORS.contains(&factor) => Err(
                ForgeError::invalid("upscale", format!("factor must be 2 or 4, got {}", factor)),
            ),
            Operation::Brightness { factor }
            | Operation::Contrast { factor }
            | Operation::Saturation { factor }
            | Operation::Sharpness { factor }
                if !ENHANCE_RANGE.contains(&factor) =>
            {
                Err(ForgeError::invalid(
                    self.name(),
                    format!("factor must be between 0.0 and 2.0, got {}", factor),
                ))
            }
            Operation::Crop {
                left,
                top,
                right,
                bottom,
            } if left >= right || top >= bottom => Err(ForgeError::invalid(
                "crop",
                format!("empty box ({}, {}, {}, {})", left, top, right, bottom),
            )),
            Operation::Resize { width, height, .. } if width == 0 || height == 0 => Err(
                ForgeError::invalid("resize", format!("size must be non-zero, got {}x{}", width, height)),
            ),
            _ => Ok(()),
        }
    }

    pub fn apply(&self, image: &RgbaImage) -> Result<RgbaImage> {
        self.validate()?;
        let out = match *self {
            Operation::Upscale { factor, method } => {
                let (w, h) = image.dimensions();
                imageops::resize(image, w * factor, h * factor, method.filter())
            }
            Operation::Brightness { factor } => {
                enhance(image, factor, |_, _, _| [0, 0, 0])
            }
            Operation::Contrast { factor } => {
                let mean = mean_luma(image);
                enhance(image, factor, |_, _, _| [mean, mean, mean])
            }
            Operation::Saturation { factor } => enhance(image, factor, |_, _, p| {
                let l = luma(p);
                [l, l, l]
            }),
            Operation::Sharpness { factor } => {
                let smooth = convolve(image, &SMOOTH);
                enhance(image, factor, |x, y, _| rgb(smooth.get_pixel(x, y)))
            }
            Operation::Crop {
                left,
                top,
                right,
                bottom,
            } => {
                let (w, h) = image.dimensions();
                if right > w || bottom > h {
                    return Err(ForgeError::invalid(
                        "crop",
                        format!(
                            "box ({}, {}, {}, {}) exceeds {}x{} image",
                            left, top, right, bottom, w, h
                        ),
                    ));
                }
                imageops::crop_imm(image, left, top, right - left, bottom - top).to_image()
            }
            Operation::Resize {
                width,
                height,
                keep_aspect: true,
            } => fit_within(image, width, height),
            Operation::Resize {
                width,
                height,
                keep_aspect: false,
            } => imageops::resize(image, width, height, FilterType::Lanczos3),
            Operation::Filter { name } => convolve(image, name.kernel()),
            Operation::RemoveWatermark => remove_watermark(image),
            Operation::Watermark => stamp_watermark(image),
        };
        Ok(out)
    }
}

/// Ordered list of operations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pipeline {
    pub operations: Vec<Operation>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, operation: Operation) -> &mut Self {
        self.operations.push(operation);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Run every operation in order. Static checks run for the whole
    /// pipeline before any pixel work starts.
    pub fn run(&self, image: DynamicImage) -> Result<DynamicImage> {
        for operation in &self.operations {
            operation.validate()?;
        }

        let mut current = image.to_rgba8();
        for operation in &self.operations {
            current = operation.apply(&current)?;
            debug!(
                op = operation.name(),
                width = current.width(),
                height = current.height(),
                "applied operation"
            );
        }
        Ok(DynamicImage::ImageRgba8(current))
    }
}

/// Sidecar written next to every saved image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<PathBuf>,
    /// Local time, `YYYYmmdd_HHMMSS`.
    pub timestamp: String,
    pub filename: String,
    pub width: u32,
    pub height: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub operations: Vec<Operation>,
}

impl ImageMetadata {
    /// Metadata for `image` about to be saved at `path`.
    pub fn describe(image: &DynamicImage, path: &Path, operations: &[Operation]) -> Self {
        let (width, height) = image.dimensions();
        Self {
            prompt: None,
            source: None,
            timestamp: Local::now().format("%Y%m%d_%H%M%S").to_string(),
            filename: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            width,
            height,
            operations: operations.to_vec(),
        }
    }
}

/// `out/image.png` -> `out/image_metadata.json`
pub fn metadata_path(image_path: &Path) -> PathBuf {
    let stem = image_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    image_path.with_file_name(format!("{}_metadata.json", stem))
}

pub fn open_image(path: &Path) -> Result<DynamicImage> {
    Ok(image::open(path)?)
}

/// Save `image` (format from the extension) and its metadata sidecar.
/// Returns the sidecar path.
pub fn save_with_metadata(
    image: &DynamicImage,
    path: &Path,
    metadata: &ImageMetadata,
) -> Result<PathBuf> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    image.save(path)?;
    let sidecar = metadata_path(path);
    fs::write(&sidecar, serde_json::to_string_pretty(metadata)?)?;
    info!(path = %path.display(), "saved image");
    Ok(sidecar)
}

fn rgb(p: &Rgba<u8>) -> [u8; 3] {
    [p[0], p[1], p[2]]
}

fn luma(p: &Rgba<u8>) -> u8 {
    ((p[0] as u32 * 299 + p[1] as u32 * 587 + p[2] as u32 * 114) / 1000) as u8
}

fn mean_luma(image: &RgbaImage) -> u8 {
    let count = image.width() as u64 * image.height() as u64;
    if count == 0 {
        return 0;
    }
    let total: u64 = image.pixels().map(|p| luma(p) as u64).sum();
    ((total as f64 / count as f64) + 0.5) as u8
}

/// Interpolate each pixel between a degenerate color and itself. Alpha is kept.
fn enhance<F>(image: &RgbaImage, factor: f32, degenerate: F) -> RgbaImage
where
    F: Fn(u32, u32, &Rgba<u8>) -> [u8; 3],
{
    RgbaImage::from_fn(image.width(), image.height(), |x, y| {
        let p = image.get_pixel(x, y);
        let d = degenerate(x, y, p);
        let mix = |c: usize| {
            let from = d[c] as f32;
            (from + factor * (p[c] as f32 - from)).round().clamp(0.0, 255.0) as u8
        };
        Rgba([mix(0), mix(1), mix(2), p[3]])
    })
}

/// Convolve RGB with edge replication. Alpha is kept.
fn convolve(image: &RgbaImage, kernel: &Kernel) -> RgbaImage {
    let (w, h) = image.dimensions();
    let radius = (kernel.size / 2) as i64;
    RgbaImage::from_fn(w, h, |x, y| {
        let mut acc = [0f32; 3];
        for ky in 0..kernel.size {
            for kx in 0..kernel.size {
                let weight = kernel.weights[(ky * kernel.size + kx) as usize];
                if weight == 0.0 {
                    continue;
                }
                let sx = (x as i64 + kx as i64 - radius).clamp(0, w as i64 - 1) as u32;
                let sy = (y as i64 + ky as i64 - radius).clamp(0, h as i64 - 1) as u32;
                let p = image.get_pixel(sx, sy);
                for (c, slot) in acc.iter_mut().enumerate() {
                    *slot += weight * p[c] as f32;
                }
            }
        }
        let channel = |v: f32| (v / kernel.scale + kernel.offset).round().clamp(0.0, 255.0) as u8;
        Rgba([channel(acc[0]), channel(acc[1]), channel(acc[2]), image.get_pixel(x, y)[3]])
    })
}

fn fit_within(image: &RgbaImage, max_width: u32, max_height: u32) -> RgbaImage {
    let (w, h) = image.dimensions();
    if w <= max_width && h <= max_height {
        return image.clone();
    }
    let scale = (max_width as f64 / w as f64).min(max_height as f64 / h as f64);
    let width = ((w as f64 * scale).round() as u32).clamp(1, max_width);
    let height = ((h as f64 * scale).round() as u32).clamp(1, max_height);
    imageops::resize(image, width, height, FilterType::Lanczos3)
}

/// Fill a bottom-right box (15% x 10% plus margin) with the average color
/// of the band diagonally above-left of it, then soften with a light blur.
/// Images too small to hold the box are returned unchanged.
fn remove_watermark(image: &RgbaImage) -> RgbaImage {
    let (w, h) = image.dimensions();
    let mark_width = (w as f64 * 0.15) as u32;
    let mark_height = (h as f64 * 0.1) as u32;
    let (Some(left), Some(top)) = (
        w.checked_sub(mark_width + MARGIN),
        h.checked_sub(mark_height + MARGIN),
    ) else {
        return image.clone();
    };

    let sample_left = left.saturating_sub(SAMPLE_BAND);
    let sample_top = top.saturating_sub(SAMPLE_BAND);
    if left == sample_left || top == sample_top {
        return image.clone();
    }

    let sample = imageops::crop_imm(image, sample_left, sample_top, left - sample_left, top - sample_top)
        .to_image();
    let fill = average_rgb(&sample);

    let mut out = image.clone();
    for y in top..h {
        for x in left..w {
            let alpha = out.get_pixel(x, y)[3];
            out.put_pixel(x, y, Rgba([fill[0], fill[1], fill[2], alpha]));
        }
    }
    imageops::blur(&out, 1.0)
}

fn average_rgb(image: &RgbaImage) -> [u8; 3] {
    let count = (image.width() as u64 * image.height() as u64).max(1);
    let mut sums = [0u64; 3];
    for p in image.pixels() {
        for (c, sum) in sums.iter_mut().enumerate() {
            *sum += p[c] as u64;
        }
    }
    sums.map(|s| (s / count) as u8)
}

/// White text on a half-darkened box, scaled with the image. Images too
/// small to hold the box are returned unchanged.
fn stamp_watermark(image: &RgbaImage) -> RgbaImage {
    let (w, h) = image.dimensions();
    let scale = (w.min(h) / 256).max(1);
    let advance = (GLYPH_WIDTH + 1) * scale;
    let text_width = WATERMARK_TEXT.chars().count() as u32 * advance - scale;
    let text_height = GLYPH_HEIGHT * scale;

    let x0 = w.checked_sub(text_width + MARGIN).filter(|x| *x >= PADDING);
    let y0 = h.checked_sub(text_height + MARGIN).filter(|y| *y >= PADDING);
    let (Some(x0), Some(y0)) = (x0, y0) else {
        return image.clone();
    };

    let mut out = image.clone();
    let box_right = (x0 + text_width + PADDING).min(w);
    let box_bottom = (y0 + text_height + PADDING).min(h);
    for y in (y0 - PADDING)..box_bottom {
        for x in (x0 - PADDING)..box_right {
            let p = out.get_pixel_mut(x, y);
            for c in 0..3 {
                p[c] /= 2;
            }
        }
    }

    for (i, ch) in WATERMARK_TEXT.chars().enumerate() {
        let rows = glyph(ch);
        let gx = x0 + i as u32 * advance;
        for (row, bits) in rows.iter().enumerate() {
            for col in 0..GLYPH_WIDTH {
                if (bits >> (GLYPH_WIDTH - 1 - col)) & 1 == 0 {
                    continue;
                }
                for dy in 0..scale {
                    for dx in 0..scale {
                        let px = gx + col * scale + dx;
                        let py = y0 + row as u32 * scale + dy;
                        let alpha = out.get_pixel(px, py)[3];
                        out.put_pixel(px, py, Rgba([255, 255, 255, alpha]));
                    }
                }
            }
        }
    }
    out
}

/// 5x7 bitmaps for the characters of [`WATERMARK_TEXT`].
fn glyph(ch: char) -> [u8; 7] {
    match ch {
        'A' => [0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'D' => [0b11110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11110],
        'E' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111],
        'G' => [0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01111],
        'I' => [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b11111],
        'N' => [0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001, 0b10001],
        'R' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001],
        'T' => [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100],
        _ => [0; 7],
    }
}
