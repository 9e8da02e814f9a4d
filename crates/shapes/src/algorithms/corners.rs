use image::GrayImage;
use imageproc::gradients::{horizontal_sobel, vertical_sobel};
use tracing::debug;

use crate::{
    config::{HarrisConfig, ShiTomasiConfig},
    error::Result,
    traits::CornerDetector,
    types::Keypoint,
};

/// Windowed sums of the gradient products `Ix²`, `IxIy`, `Iy²` for every pixel.
struct StructureTensor {
    xx: Vec<f64>,
    xy: Vec<f64>,
    yy: Vec<f64>,
}

impl StructureTensor {
    fn compute(image: &GrayImage, window_radius: u32) -> Self {
        let gx = horizontal_sobel(image);
        let gy = vertical_sobel(image);
        let (width, height) = (image.width() as usize, image.height() as usize);

        let mut xx = Vec::with_capacity(width * height);
        let mut xy = Vec::with_capacity(width * height);
        let mut yy = Vec::with_capacity(width * height);
        for (dx, dy) in gx.pixels().zip(gy.pixels()) {
            let (dx, dy) = (dx[0] as f64, dy[0] as f64);
            xx.push(dx * dx);
            xy.push(dx * dy);
            yy.push(dy * dy);
        }

        let r = window_radius as usize;
        Self {
            xx: window_sum(&xx, width, height, r),
            xy: window_sum(&xy, width, height, r),
            yy: window_sum(&yy, width, height, r),
        }
    }

    fn response(&self, f: impl Fn(f64, f64, f64) -> f64) -> Vec<f64> {
        (0..self.xx.len())
            .map(|i| f(self.xx[i], self.xy[i], self.yy[i]))
            .collect()
    }
}

/// Sum over the `(2r + 1)²` window around each pixel, clipped at the image border.
fn window_sum(values: &[f64], width: usize, height: usize, r: usize) -> Vec<f64> {
    // summed-area table with a zero row and column in front
    let stride = width + 1;
    let mut table = vec![0.0; stride * (height + 1)];
    for y in 0..height {
        let mut row = 0.0;
        for x in 0..width {
            row += values[y * width + x];
            table[(y + 1) * stride + x + 1] = table[y * stride + x + 1] + row;
        }
    }

    let mut sums = Vec::with_capacity(width * height);
    for y in 0..height {
        let (top, bottom) = (y.saturating_sub(r), (y + r + 1).min(height));
        for x in 0..width {
            let (left, right) = (x.saturating_sub(r), (x + r + 1).min(width));
            sums.push(
                table[bottom * stride + right] - table[top * stride + right]
                    - table[bottom * stride + left]
                    + table[top * stride + left],
            );
        }
    }
    sums
}

/// Pixels whose response exceeds `ratio * max`, in raster order.
fn above_quality(response: &[f64], width: usize, ratio: f64) -> Vec<Keypoint> {
    let max = response.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !(max > 0.0) {
        return Vec::new();
    }

    let threshold = ratio * max;
    response
        .iter()
        .enumerate()
        .filter(|&(_, &r)| r > threshold)
        .map(|(i, &r)| Keypoint::new((i % width) as f64, (i / width) as f64, r as f32))
        .collect()
}

fn sort_by_response(keypoints: &mut [Keypoint]) {
    keypoints.sort_by(|a, b| b.response.total_cmp(&a.response));
}

/// Greedy non-maximum suppression: visits candidates by descending response
/// and suppresses the `(2 * radius + 1)²` square around each one it keeps.
pub fn suppress_non_maxima(
    mut candidates: Vec<Keypoint>,
    width: u32,
    height: u32,
    radius: u32,
) -> Vec<Keypoint> {
    sort_by_response(&mut candidates);

    let (w, h, r) = (width as i64, height as i64, radius as i64);
    let mut suppressed = vec![false; (width as usize) * (height as usize)];
    let mut kept = Vec::new();

    for kp in candidates {
        let (x, y) = (kp.point.x.round() as i64, kp.point.y.round() as i64);
        if x < 0 || y < 0 || x >= w || y >= h || suppressed[(y * w + x) as usize] {
            continue;
        }
        kept.push(kp);

        for sy in (y - r).max(0)..=(y + r).min(h - 1) {
            for sx in (x - r).max(0)..=(x + r).min(w - 1) {
                suppressed[(sy * w + sx) as usize] = true;
            }
        }
    }
    kept
}

/// Harris corner detector with radius-based non-maximum suppression.
#[derive(Debug, Clone)]
pub struct HarrisDetector {
    /// Gaussian blur applied before taking gradients; `0` disables it
    pub pre_blur_sigma: f32,
    pub window_radius: u32,
    /// Harris free parameter in `det - k * trace²`
    pub k: f64,
    /// Candidates must exceed this fraction of the strongest response
    pub quality_ratio: f64,
    pub nms_radius: u32,
}

impl Default for HarrisDetector {
    fn default() -> Self {
        Self::from(&HarrisConfig::default())
    }
}

impl From<&HarrisConfig> for HarrisDetector {
    fn from(config: &HarrisConfig) -> Self {
        Self {
            pre_blur_sigma: config.pre_blur_sigma,
            window_radius: config.window_radius,
            k: config.k,
            quality_ratio: config.quality_ratio,
            nms_radius: config.nms_radius,
        }
    }
}

impl HarrisDetector {
    /// Per-pixel cornerness in row-major order.
    pub fn response(&self, image: &GrayImage) -> Vec<f64> {
        let blurred;
        let source = if self.pre_blur_sigma > 0.0 {
            blurred = imageproc::filter::gaussian_blur_f32(image, self.pre_blur_sigma);
            &blurred
        } else {
            image
        };

        let k = self.k;
        StructureTensor::compute(source, self.window_radius)
            .response(|xx, xy, yy| xx * yy - xy * xy - k * (xx + yy) * (xx + yy))
    }
}

impl CornerDetector for HarrisDetector {
    fn detect_corners(&self, image: &GrayImage) -> Result<Vec<Keypoint>> {
        let response = self.response(image);
        let candidates = above_quality(&response, image.width() as usize, self.quality_ratio);
        let initial = candidates.len();

        let corners = suppress_non_maxima(candidates, image.width(), image.height(), self.nms_radius);
        debug!(initial, after_nms = corners.len(), "harris corners");

        Ok(corners)
    }
}

/// Shi-Tomasi "good features to track" detector.
#[derive(Debug, Clone)]
pub struct ShiTomasiDetector {
    pub window_radius: u32,
    /// Upper bound on returned corners; `0` means unbounded
    pub max_corners: usize,
    pub quality_level: f64,
    pub min_distance: f64,
}

impl Default for ShiTomasiDetector {
    fn default() -> Self {
        Self::from(&ShiTomasiConfig::default())
    }
}

impl From<&ShiTomasiConfig> for ShiTomasiDetector {
    fn from(config: &ShiTomasiConfig) -> Self {
        Self {
            window_radius: config.window_radius,
            max_corners: config.max_corners,
            quality_level: config.quality_level,
            min_distance: config.min_distance,
        }
    }
}

impl ShiTomasiDetector {
    /// Smaller eigenvalue of the structure tensor at every pixel.
    pub fn response(&self, image: &GrayImage) -> Vec<f64> {
        StructureTensor::compute(image, self.window_radius).response(|xx, xy, yy| {
            let half_trace = (xx + yy) / 2.0;
            let half_diff = (xx - yy) / 2.0;
            half_trace - (half_diff * half_diff + xy * xy).sqrt()
        })
    }
}

fn is_local_max(response: &[f64], width: usize, height: usize, i: usize) -> bool {
    let (x, y) = (i % width, i / width);
    let value = response[i];
    (y.saturating_sub(1)..(y + 2).min(height)).all(|ny| {
        (x.saturating_sub(1)..(x + 2).min(width)).all(|nx| response[ny * width + nx] <= value)
    })
}

impl CornerDetector for ShiTomasiDetector {
    fn detect_corners(&self, image: &GrayImage) -> Result<Vec<Keypoint>> {
        let (width, height) = (image.width() as usize, image.height() as usize);
        let response = self.response(image);

        let mut candidates: Vec<Keypoint> = above_quality(&response, width, self.quality_level)
            .into_iter()
            .filter(|kp| {
                let i = kp.point.y as usize * width + kp.point.x as usize;
                is_local_max(&response, width, height, i)
            })
            .collect();
        sort_by_response(&mut candidates);
        let initial = candidates.len();

        let mut corners: Vec<Keypoint> = Vec::new();
        for kp in candidates {
            if self.max_corners > 0 && corners.len() >= self.max_corners {
                break;
            }
            if corners.iter().all(|c| c.point.distance(kp.point) >= self.min_distance) {
                corners.push(kp);
            }
        }
        debug!(initial, accepted = corners.len(), "shi-tomasi corners");

        Ok(corners)
    }
}
