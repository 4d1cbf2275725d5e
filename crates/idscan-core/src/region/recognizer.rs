//! Seam to the external text recognizer.

use image::DynamicImage;

use super::PixelRect;
use crate::error::OcrError;

/// External OCR engine used to measure how much text a region holds.
pub trait TextRecognizer: Send + Sync {
    /// Recognize all text in an image, lines separated by `\n`.
    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError>;

    /// Recognize the text inside `region` of `image`.
    ///
    /// The default crops the region and runs [`TextRecognizer::recognize`].
    fn recognize_region(
        &self,
        image: &DynamicImage,
        region: &PixelRect,
    ) -> Result<String, OcrError> {
        match region.crop(image) {
            Some(sub_image) => self.recognize(&sub_image),
            None => Ok(String::new()),
        }
    }
}

impl<F> TextRecognizer for F
where
    F: Fn(&DynamicImage) -> Result<String, OcrError> + Send + Sync,
{
    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError> {
        self(image)
    }
}

/// Recognizer backed by text an upstream OCR pass already produced.
///
/// Region lookups match on exact rectangles; anything else reads as empty.
#[derive(Debug, Clone, Default)]
pub struct PrecomputedRecognizer {
    full_text: String,
    regions: Vec<(PixelRect, String)>,
}

impl PrecomputedRecognizer {
    pub fn new(full_text: impl Into<String>) -> Self {
        Self {
            full_text: full_text.into(),
            regions: Vec::new(),
        }
    }

    /// Register the recognized text of one region.
    pub fn with_region(mut self, region: PixelRect, text: impl Into<String>) -> Self {
        self.regions.push((region, text.into()));
        self
    }

    pub fn region_count(&self) -> usize {
        self.regions.len()
    }
}

impl TextRecognizer for PrecomputedRecognizer {
    fn recognize(&self, _image: &DynamicImage) -> Result<String, OcrError> {
        Ok(self.full_text.clone())
    }

    fn recognize_region(
        &self,
        image: &DynamicImage,
        region: &PixelRect,
    ) -> Result<String, OcrError> {
        let (width, height) = (image.width(), image.height());
        let wanted = region.clamp(width, height);
        Ok(self
            .regions
            .iter()
            .find(|(rect, _)| rect.clamp(width, height) == wanted)
            .map(|(_, text)| text.clone())
            .unwrap_or_default())
    }
}

/// Number of non-blank lines in recognizer output.
pub fn count_text_lines(text: &str) -> usize {
    text.lines().filter(|l| !l.trim().is_empty()).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_text_lines() {
        assert_eq!(count_text_lines(""), 0);
        assert_eq!(count_text_lines("a\n\n  \nb\nc"), 3);
    }

    #[test]
    fn test_precomputed_region_lookup() {
        let image = DynamicImage::new_rgb8(100, 100);
        let recognizer = PrecomputedRecognizer::new("all")
            .with_region(PixelRect::new(0, 0, 50, 50), "one\ntwo");

        let text = recognizer
            .recognize_region(&image, &PixelRect::new(0, 0, 50, 50))
            .unwrap();
        assert_eq!(text, "one\ntwo");

        let missing = recognizer
            .recognize_region(&image, &PixelRect::new(10, 10, 50, 50))
            .unwrap();
        assert!(missing.is_empty());
        assert_eq!(recognizer.recognize(&image).unwrap(), "all");
    }

    #[test]
    fn test_closure_recognizer_crops_region() {
        let image = DynamicImage::new_rgb8(100, 80);
        let recognizer = |img: &DynamicImage| -> Result<String, OcrError> {
            Ok(format!("{}x{}", img.width(), img.height()))
        };

        let text = recognizer
            .recognize_region(&image, &PixelRect::new(10, 10, 40, 30))
            .unwrap();
        assert_eq!(text, "30x20");
    }
}
