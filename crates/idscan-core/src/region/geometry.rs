//! Bounding-box arithmetic in pixel coordinates.

use image::DynamicImage;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle with exclusive right and bottom edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelRect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl PixelRect {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Horizontal extent, widened so detector boxes spanning the whole
    /// `i32` range cannot overflow.
    pub fn width(&self) -> i64 {
        i64::from(self.right) - i64::from(self.left)
    }

    pub fn height(&self) -> i64 {
        i64::from(self.bottom) - i64::from(self.top)
    }

    pub fn area(&self) -> i64 {
        if self.is_degenerate() {
            return 0;
        }
        self.width() * self.height()
    }

    /// Width over height, 0.0 for degenerate rectangles.
    pub fn aspect_ratio(&self) -> f32 {
        if self.is_degenerate() {
            return 0.0;
        }
        self.width() as f32 / self.height() as f32
    }

    /// True when the rectangle encloses no pixels.
    pub fn is_degenerate(&self) -> bool {
        self.right <= self.left || self.bottom <= self.top
    }

    pub fn non_degenerate(self) -> Option<Self> {
        (!self.is_degenerate()).then_some(self)
    }

    /// Clamp all edges into `[0, width] x [0, height]`.
    pub fn clamp(self, width: u32, height: u32) -> Self {
        let (w, h) = (to_coord(width), to_coord(height));
        Self {
            left: self.left.clamp(0, w),
            top: self.top.clamp(0, h),
            right: self.right.clamp(0, w),
            bottom: self.bottom.clamp(0, h),
        }
    }

    /// Grow by the given margins on each side, then clamp to the image.
    ///
    /// The result may be degenerate; callers must check before cropping.
    pub fn expand(self, horizontal: i32, vertical: i32, width: u32, height: u32) -> Self {
        Self {
            left: self.left.saturating_sub(horizontal),
            top: self.top.saturating_sub(vertical),
            right: self.right.saturating_add(horizontal),
            bottom: self.bottom.saturating_add(vertical),
        }
        .clamp(width, height)
    }

    /// Shrink the dimension that is too long for `ratio` (width / height).
    ///
    /// The top-left corner stays fixed and the result is clamped again.
    pub fn force_aspect_ratio(self, ratio: f32, width: u32, height: u32) -> Self {
        if self.is_degenerate() || ratio <= 0.0 {
            return self.clamp(width, height);
        }

        let (w, h) = (self.width(), self.height());
        let mut rect = self;
        if w as f32 / h as f32 > ratio {
            rect.right = rect.left.saturating_add((h as f32 * ratio) as i32);
        } else {
            rect.bottom = rect.top.saturating_add((w as f32 / ratio) as i32);
        }

        rect.clamp(width, height)
    }

    /// Copy the covered pixels into a new image.
    ///
    /// Returns `None` when the clamped rectangle is degenerate.
    pub fn crop(&self, image: &DynamicImage) -> Option<DynamicImage> {
        let rect = self.clamp(image.width(), image.height()).non_degenerate()?;
        Some(image.crop_imm(
            rect.left as u32,
            rect.top as u32,
            rect.width() as u32,
            rect.height() as u32,
        ))
    }
}

fn to_coord(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_clamps_to_image() {
        let rect = PixelRect::new(5, 5, 50, 40).expand(10, 10, 55, 45);
        assert_eq!(rect, PixelRect::new(0, 0, 55, 45));
    }

    #[test]
    fn test_expand_can_be_degenerate() {
        let rect = PixelRect::new(120, 10, 150, 20).expand(5, 5, 100, 100);
        assert!(rect.is_degenerate());
        assert!(rect.non_degenerate().is_none());
    }

    #[test]
    fn test_force_aspect_shrinks_wide_box() {
        let rect = PixelRect::new(160, 160, 340, 340).force_aspect_ratio(0.8, 1000, 1000);
        assert_eq!(rect, PixelRect::new(160, 160, 304, 340));
    }

    #[test]
    fn test_extreme_coordinates_do_not_overflow() {
        let rect = PixelRect::new(-2_000_000_000, 0, 2_000_000_000, 50);
        assert_eq!(rect.width(), 4_000_000_000);
        assert_eq!(rect.area(), 200_000_000_000);

        let clamped = rect
            .expand(i32::MAX, 0, 100, 100)
            .force_aspect_ratio(0.8, 100, 100);
        assert_eq!(clamped, PixelRect::new(0, 0, 40, 50));
    }

    #[test]
    fn test_force_aspect_shrinks_tall_box() {
        let rect = PixelRect::new(0, 0, 80, 200).force_aspect_ratio(0.5, 1000, 1000);
        assert_eq!(rect, PixelRect::new(0, 0, 80, 160));
    }

    #[test]
    fn test_crop_rejects_degenerate() {
        let image = DynamicImage::new_rgb8(10, 10);
        assert!(PixelRect::new(4, 4, 4, 8).crop(&image).is_none());
        assert!(PixelRect::new(20, 20, 30, 30).crop(&image).is_none());

        let crop = PixelRect::new(2, 3, 7, 9).crop(&image).unwrap();
        assert_eq!((crop.width(), crop.height()), (5, 6));
    }

    #[test]
    fn test_aspect_ratio() {
        assert_eq!(PixelRect::new(0, 0, 200, 100).aspect_ratio(), 2.0);
        assert_eq!(PixelRect::new(0, 0, 0, 100).aspect_ratio(), 0.0);
    }
}
