//! Image quality checks and enhancement before recognition.

use image::{DynamicImage, GrayImage, RgbImage};
use tracing::debug;

/// Laplacian variance below which an image is considered blurry.
const SHARPNESS_THRESHOLD: f64 = 100.0;

/// Mean brightness bounds outside which brightness is corrected.
const MIN_BRIGHTNESS: f64 = 50.0;
const MAX_BRIGHTNESS: f64 = 200.0;

const CONTRAST_GAIN: f64 = 1.1;
const BRIGHTNESS_SHIFT: f64 = 10.0;

const SHARPEN_KERNEL: [f32; 9] = [0.0, -0.5, 0.0, -0.5, 4.0, -0.5, 0.0, -0.5, 0.0];

/// Simple quality measurements of a capture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageQuality {
    /// Variance of the 4-neighbour Laplacian over the grayscale image.
    pub laplacian_variance: f64,
    /// Mean grayscale value (0 - 255).
    pub brightness: f64,
}

impl ImageQuality {
    pub fn is_sharp(&self) -> bool {
        self.laplacian_variance >= SHARPNESS_THRESHOLD
    }

    pub fn needs_brightness_correction(&self) -> bool {
        self.brightness < MIN_BRIGHTNESS || self.brightness > MAX_BRIGHTNESS
    }
}

/// Measure sharpness and brightness of an image.
pub fn assess(image: &DynamicImage) -> ImageQuality {
    let gray = image.to_luma8();
    ImageQuality {
        laplacian_variance: laplacian_variance(&gray),
        brightness: mean_brightness(&gray),
    }
}

/// Sharpen blurry captures and pull extreme brightness towards the middle.
///
/// Returns a new RGB image; the input is left untouched.
pub fn enhance(image: &DynamicImage) -> DynamicImage {
    let quality = assess(image);
    debug!(
        "Image quality: laplacian variance {:.1}, brightness {:.1}",
        quality.laplacian_variance, quality.brightness
    );

    let mut enhanced = DynamicImage::ImageRgb8(image.to_rgb8());

    if !quality.is_sharp() {
        enhanced = DynamicImage::ImageRgb8(sharpen(&enhanced.to_rgb8()));
    }

    if quality.needs_brightness_correction() {
        let shift = if quality.brightness < MIN_BRIGHTNESS {
            BRIGHTNESS_SHIFT
        } else {
            -BRIGHTNESS_SHIFT
        };
        enhanced = DynamicImage::ImageRgb8(scale_abs(&enhanced.to_rgb8(), CONTRAST_GAIN, shift));
    }

    enhanced
}

fn mean_brightness(gray: &GrayImage) -> f64 {
    let count = gray.width() as u64 * gray.height() as u64;
    if count == 0 {
        return 0.0;
    }
    let sum: u64 = gray.pixels().map(|p| p[0] as u64).sum();
    sum as f64 / count as f64
}

/// Variance of the 4-neighbour Laplacian over interior pixels only.
///
/// Border pixels are skipped rather than reflected as OpenCV's `Laplacian`
/// does, so values differ slightly from OpenCV on small images.
fn laplacian_variance(gray: &GrayImage) -> f64 {
    let (width, height) = gray.dimensions();
    if width < 3 || height < 3 {
        return 0.0;
    }

    let px = |x: u32, y: u32| gray.get_pixel(x, y)[0] as f64;
    let mut sum = 0.0;
    let mut sum_sq = 0.0;
    let mut count = 0.0;

    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let value = px(x - 1, y) + px(x + 1, y) + px(x, y - 1) + px(x, y + 1) - 4.0 * px(x, y);
            sum += value;
            sum_sq += value * value;
            count += 1.0;
        }
    }

    let mean = sum / count;
    sum_sq / count - mean * mean
}

/// Convolve with [`SHARPEN_KERNEL`] normalized by its sum, replicating edges.
///
/// Unlike OpenCV's `filter2D` with the raw kernel, flat regions keep their
/// brightness.
fn sharpen(image: &RgbImage) -> RgbImage {
    let (width, height) = image.dimensions();
    let kernel_sum: f32 = SHARPEN_KERNEL.iter().sum();
    let mut out = RgbImage::new(width, height);

    for y in 0..height {
        for x in 0..width {
            let mut acc = [0.0f32; 3];
            for (i, weight) in SHARPEN_KERNEL.iter().enumerate() {
                if *weight == 0.0 {
                    continue;
                }
                let sx = (x as i64 + (i % 3) as i64 - 1).clamp(0, width as i64 - 1) as u32;
                let sy = (y as i64 + (i / 3) as i64 - 1).clamp(0, height as i64 - 1) as u32;
                let source = image.get_pixel(sx, sy);
                for c in 0..3 {
                    acc[c] += weight * source[c] as f32;
                }
            }
            let pixel = out.get_pixel_mut(x, y);
            for c in 0..3 {
                pixel[c] = (acc[c] / kernel_sum).round().clamp(0.0, 255.0) as u8;
            }
        }
    }

    out
}

/// `saturate(|alpha * v + beta|)` per channel.
fn scale_abs(image: &RgbImage, alpha: f64, beta: f64) -> RgbImage {
    let mut out = image.clone();
    for pixel in out.pixels_mut() {
        for channel in pixel.0.iter_mut() {
            let value = (alpha * *channel as f64 + beta).abs().round();
            *channel = value.min(255.0) as u8;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb};

    #[test]
    fn test_flat_image_is_blurry() {
        let image = DynamicImage::ImageLuma8(GrayImage::from_pixel(20, 20, Luma([128])));
        let quality = assess(&image);

        assert_eq!(quality.laplacian_variance, 0.0);
        assert_eq!(quality.brightness, 128.0);
        assert!(!quality.is_sharp());
        assert!(!quality.needs_brightness_correction());
    }

    #[test]
    fn test_checkerboard_is_sharp() {
        let gray = GrayImage::from_fn(20, 20, |x, y| {
            if (x + y) % 2 == 0 {
                Luma([0])
            } else {
                Luma([255])
            }
        });
        let quality = assess(&DynamicImage::ImageLuma8(gray));
        assert!(quality.is_sharp());
    }

    #[test]
    fn test_dark_image_is_brightened() {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(10, 10, Rgb([20, 20, 20])));
        let enhanced = enhance(&image).to_rgb8();

        // Flat input is unchanged by sharpening, then 1.1 * 20 + 10.
        assert_eq!(enhanced.get_pixel(5, 5), &Rgb([32, 32, 32]));
        assert_eq!(enhanced.get_pixel(0, 0), &Rgb([32, 32, 32]));
        assert_eq!((enhanced.width(), enhanced.height()), (10, 10));
    }

    #[test]
    fn test_sharpen_boosts_edges() {
        let image = RgbImage::from_fn(5, 1, |x, _| {
            let value = if x < 2 { 100 } else { 200 };
            Rgb([value, value, value])
        });
        let out = sharpen(&image);

        assert_eq!(out.get_pixel(0, 0), &Rgb([100, 100, 100]));
        assert!(out.get_pixel(1, 0)[0] < 100);
        assert!(out.get_pixel(2, 0)[0] > 200);
    }

    #[test]
    fn test_scale_abs_saturates() {
        let image = RgbImage::from_pixel(1, 1, Rgb([250, 0, 100]));
        let out = scale_abs(&image, 1.1, -10.0);
        assert_eq!(out.get_pixel(0, 0), &Rgb([255, 10, 100]));
    }
}
