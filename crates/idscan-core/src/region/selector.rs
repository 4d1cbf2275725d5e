//! Face and document crop selection.

use image::{DynamicImage, GrayImage};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::enhance::enhance;
use super::recognizer::{TextRecognizer, count_text_lines};
use super::{CandidateBox, PixelRect};
use crate::error::RegionError;
use crate::models::config::RegionConfig;

/// How the document crop was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum CropStrategy {
    /// Best scoring detector box, expanded by the document margin.
    Detector {
        /// Position of the box in the detector's list.
        index: usize,
        score: f32,
        rect: PixelRect,
    },
    /// Bounds of non-background pixels, expanded by the content margin.
    ContentBounds { rect: PixelRect },
    /// Nothing usable was found; the source image is returned as is.
    Original,
}

/// A document crop together with the strategy that produced it.
#[derive(Debug, Clone)]
pub struct DocumentCrop {
    pub image: DynamicImage,
    pub strategy: CropStrategy,
}

/// Score of one eligible detector box.
#[derive(Debug, Clone, Copy)]
struct ScoredCandidate {
    index: usize,
    rect: PixelRect,
    score: f32,
}

/// Selects face and document regions from detector output.
///
/// Stateless apart from its configuration; safe to share between threads.
#[derive(Debug, Clone)]
pub struct RegionSelector {
    config: RegionConfig,
}

impl RegionSelector {
    /// Create a selector with default settings.
    pub fn new() -> Self {
        Self {
            config: RegionConfig::default(),
        }
    }

    pub fn with_config(config: RegionConfig) -> Self {
        Self { config }
    }

    /// Crop the holder's face around the first (highest ranked) face box.
    ///
    /// Returns `Ok(None)` when no face was detected or the padded box does
    /// not cover any pixels of the image.
    pub fn select_face(
        &self,
        image: &DynamicImage,
        face_boxes: &[CandidateBox],
    ) -> Result<Option<DynamicImage>, RegionError> {
        let (width, height) = validate_image(image)?;

        let Some(face) = face_boxes.iter().find(|b| b.is_valid()) else {
            debug!("No face detected");
            return Ok(None);
        };

        let rect = face.rect;
        let pad_x = (rect.width() as f32 * self.config.face_padding) as i32;
        let pad_y = (rect.height() as f32 * self.config.face_padding) as i32;

        let crop_rect = rect
            .expand(pad_x, pad_y, width, height)
            .force_aspect_ratio(self.config.face_aspect_ratio, width, height);

        match crop_rect.crop(image) {
            Some(crop) => {
                debug!(
                    "Face cropped: left={}, top={}, width={}, height={}",
                    crop_rect.left,
                    crop_rect.top,
                    crop_rect.width(),
                    crop_rect.height()
                );
                Ok(Some(crop))
            }
            None => {
                warn!("Face box {:?} yields an empty crop", rect);
                Ok(None)
            }
        }
    }

    /// Crop the document body.
    ///
    /// Always produces an image: the best detector box if one is eligible,
    /// otherwise the content bounds of the image, otherwise the image itself.
    pub fn select_document(
        &self,
        image: &DynamicImage,
        object_boxes: &[CandidateBox],
        recognizer: &dyn TextRecognizer,
    ) -> Result<DocumentCrop, RegionError> {
        let (width, height) = validate_image(image)?;

        if let Some(best) = self.best_candidate(image, object_boxes, recognizer) {
            let margin = self.config.document_margin;
            let rect = best.rect.expand(margin, margin, width, height);
            if let Some(crop) = rect.crop(image) {
                info!(
                    "Document cropped from detector box {} (score {:.3}): left={}, top={}, width={}, height={}",
                    best.index,
                    best.score,
                    rect.left,
                    rect.top,
                    rect.width(),
                    rect.height()
                );
                return Ok(DocumentCrop {
                    image: crop,
                    strategy: CropStrategy::Detector {
                        index: best.index,
                        score: best.score,
                        rect,
                    },
                });
            }
            warn!(
                "Selected document box {:?} is degenerate after expansion",
                best.rect
            );
        } else {
            warn!("No valid document detected, attempting content-bounds cropping");
        }

        if let Some(bounds) = content_bounds(&image.to_luma8(), self.config.content_threshold) {
            let margin = self.config.content_margin;
            let rect = bounds.expand(margin, margin, width, height);
            if let Some(crop) = rect.crop(image) {
                info!(
                    "Content-bounds cropping: left={}, top={}, width={}, height={}",
                    rect.left,
                    rect.top,
                    rect.width(),
                    rect.height()
                );
                return Ok(DocumentCrop {
                    image: crop,
                    strategy: CropStrategy::ContentBounds { rect },
                });
            }
        }

        warn!("Content-bounds detection failed, returning original image");
        Ok(DocumentCrop {
            image: image.clone(),
            strategy: CropStrategy::Original,
        })
    }

    /// Highest scoring eligible box; the first listed wins exact ties.
    ///
    /// A box whose region reads as no text scores zero and is never chosen.
    fn best_candidate(
        &self,
        image: &DynamicImage,
        object_boxes: &[CandidateBox],
        recognizer: &dyn TextRecognizer,
    ) -> Option<ScoredCandidate> {
        let (width, height) = (image.width(), image.height());
        let image_area = width as f32 * height as f32;
        let mut scoring_image: Option<DynamicImage> = None;
        let mut best: Option<ScoredCandidate> = None;

        for (index, candidate) in object_boxes.iter().enumerate() {
            let rect = candidate.rect;
            if rect.is_degenerate() {
                debug!("Skipping degenerate object box {}", index);
                continue;
            }

            let aspect_ratio = rect.aspect_ratio();
            let min_width = width as f32 * self.config.min_document_fraction;
            let min_height = height as f32 * self.config.min_document_fraction;
            let large_enough = rect.width() as f32 > min_width && rect.height() as f32 > min_height;

            if !(self.aspect_in_range(aspect_ratio) && large_enough) {
                debug!(
                    "Object box {} not eligible: {}x{}, aspect {:.2}",
                    index,
                    rect.width(),
                    rect.height(),
                    aspect_ratio
                );
                continue;
            }

            let scoring_image = scoring_image.get_or_insert_with(|| {
                if self.config.enhance_for_scoring {
                    enhance(image)
                } else {
                    image.clone()
                }
            });

            let text_lines = match recognizer.recognize_region(scoring_image, &rect) {
                Ok(text) => count_text_lines(&text),
                Err(e) => {
                    warn!("Text recognition failed for object box {}: {}", index, e);
                    0
                }
            };

            let score = self.score(rect, image_area, text_lines);
            debug!(
                "Object box {}: {} text lines, score {:.4}",
                index, text_lines, score
            );

            if score > best.map_or(0.0, |b| b.score) {
                best = Some(ScoredCandidate { index, rect, score });
            }
        }

        best
    }

    /// `area_ratio * aspect_penalty * text_density`.
    fn score(&self, rect: PixelRect, image_area: f32, text_lines: usize) -> f32 {
        let area_ratio = rect.area() as f32 / image_area;
        let aspect_penalty = if self.aspect_in_range(rect.aspect_ratio()) {
            1.0
        } else {
            self.config.aspect_penalty
        };
        let max_lines = self.config.max_text_lines.max(1);
        let text_density = text_lines.min(max_lines) as f32 / max_lines as f32;

        area_ratio * aspect_penalty * text_density
    }

    fn aspect_in_range(&self, aspect_ratio: f32) -> bool {
        (self.config.min_aspect_ratio..=self.config.max_aspect_ratio).contains(&aspect_ratio)
    }
}

impl Default for RegionSelector {
    fn default() -> Self {
        Self::new()
    }
}

/// Crop the face with default settings. See [`RegionSelector::select_face`].
pub fn select_face(
    image: &DynamicImage,
    face_boxes: &[CandidateBox],
) -> Result<Option<DynamicImage>, RegionError> {
    RegionSelector::new().select_face(image, face_boxes)
}

/// Crop the document with default settings. See [`RegionSelector::select_document`].
pub fn select_document(
    image: &DynamicImage,
    object_boxes: &[CandidateBox],
    recognizer: &dyn TextRecognizer,
) -> Result<DocumentCrop, RegionError> {
    RegionSelector::new().select_document(image, object_boxes, recognizer)
}

fn validate_image(image: &DynamicImage) -> Result<(u32, u32), RegionError> {
    let (width, height) = (image.width(), image.height());
    if width == 0 || height == 0 {
        return Err(RegionError::InvalidImage { width, height });
    }
    Ok((width, height))
}

/// Edges of the region holding every pixel darker than `threshold`.
///
/// Equivalent to scanning rows and columns inward from each edge until a
/// dark pixel is met. `right` and `bottom` are the last dark column and row
/// themselves, so adding the content margin reproduces the edge-scan crop.
/// `None` when the image has no dark pixel.
fn content_bounds(gray: &GrayImage, threshold: u8) -> Option<PixelRect> {
    let (width, height) = gray.dimensions();
    let mut column_has_content = vec![false; width as usize];
    let mut row_has_content = vec![false; height as usize];

    for (x, y, pixel) in gray.enumerate_pixels() {
        if pixel[0] < threshold {
            column_has_content[x as usize] = true;
            row_has_content[y as usize] = true;
        }
    }

    let left = column_has_content.iter().position(|&c| c)?;
    let right = column_has_content.iter().rposition(|&c| c)?;
    let top = row_has_content.iter().position(|&c| c)?;
    let bottom = row_has_content.iter().rposition(|&c| c)?;

    Some(PixelRect::new(left as i32, top as i32, right as i32, bottom as i32))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OcrError;
    use crate::region::PrecomputedRecognizer;
    use image::{Luma, Rgb, RgbImage};

    fn white_image(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([255, 255, 255])))
    }

    fn with_dark_block(width: u32, height: u32, block: PixelRect) -> DynamicImage {
        let mut image = RgbImage::from_pixel(width, height, Rgb([255, 255, 255]));
        for y in block.top..block.bottom {
            for x in block.left..block.right {
                image.put_pixel(x as u32, y as u32, Rgb([10, 10, 10]));
            }
        }
        DynamicImage::ImageRgb8(image)
    }

    fn lines(n: usize) -> String {
        (0..n)
            .map(|i| format!("line {}", i))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn boxed(left: i32, top: i32, right: i32, bottom: i32) -> CandidateBox {
        CandidateBox::new(left, top, right, bottom).unwrap()
    }

    #[test]
    fn test_select_face_without_boxes() {
        let image = white_image(100, 100);
        assert!(select_face(&image, &[]).unwrap().is_none());
    }

    #[test]
    fn test_select_face_with_extreme_box() {
        let image = white_image(100, 100);
        let face = select_face(&image, &[boxed(-2_000_000_000, 0, 2_000_000_000, 50)])
            .unwrap()
            .unwrap();

        // Padding saturates, the box clamps to (0, 0, 100, 70), then 4:5 gives 56x70.
        assert_eq!((face.width(), face.height()), (56, 70));
    }

    #[test]
    fn test_document_with_extreme_box() {
        let image = white_image(400, 300);
        let huge = boxed(-1_500_000_000, -1_000_000_000, 1_500_000_000, 1_000_000_000);
        let recognizer = PrecomputedRecognizer::default().with_region(huge.rect, lines(6));

        let crop = select_document(&image, &[huge], &recognizer).unwrap();
        assert!(matches!(crop.strategy, CropStrategy::Detector { index: 0, .. }));
        assert_eq!((crop.image.width(), crop.image.height()), (400, 300));
    }

    #[test]
    fn test_select_face_pads_and_forces_aspect() {
        let image = white_image(1000, 1000);
        let face = select_face(&image, &[boxed(200, 200, 300, 300)]).unwrap().unwrap();

        // 100x100 box padded by 40 on each side, then trimmed to 4:5.
        assert_eq!((face.width(), face.height()), (144, 180));
    }

    #[test]
    fn test_select_face_uses_first_box() {
        let image = white_image(1000, 1000);
        let face = select_face(&image, &[boxed(0, 0, 50, 50), boxed(200, 200, 300, 300)])
            .unwrap()
            .unwrap();

        // Clamped to (0, 0, 70, 70), then trimmed to 56x70.
        assert_eq!((face.width(), face.height()), (56, 70));
    }

    #[test]
    fn test_select_face_outside_image() {
        let image = white_image(100, 100);
        let face = select_face(&image, &[boxed(500, 500, 510, 510)]).unwrap();
        assert!(face.is_none());
    }

    #[test]
    fn test_invalid_image_is_error() {
        let image = DynamicImage::new_rgb8(0, 0);
        let recognizer = PrecomputedRecognizer::default();
        assert!(select_face(&image, &[]).is_err());
        assert!(select_document(&image, &[], &recognizer).is_err());
    }

    #[test]
    fn test_white_image_returns_original() {
        let image = white_image(120, 80);
        let crop = select_document(&image, &[], &PrecomputedRecognizer::default()).unwrap();

        assert_eq!(crop.strategy, CropStrategy::Original);
        assert_eq!(crop.image.to_rgb8(), image.to_rgb8());
    }

    #[test]
    fn test_content_bounds_fallback() {
        let image = with_dark_block(200, 200, PixelRect::new(50, 60, 150, 140));
        let crop = select_document(&image, &[], &PrecomputedRecognizer::default()).unwrap();

        // Last dark column 149 and row 139, plus the 10px margin.
        assert_eq!(
            crop.strategy,
            CropStrategy::ContentBounds {
                rect: PixelRect::new(40, 50, 159, 149)
            }
        );
        assert_eq!((crop.image.width(), crop.image.height()), (119, 99));
    }

    #[test]
    fn test_content_bounds_scan() {
        let mut gray = GrayImage::from_pixel(10, 10, Luma([255]));
        gray.put_pixel(2, 7, Luma([0]));
        gray.put_pixel(6, 3, Luma([199]));
        gray.put_pixel(8, 8, Luma([200]));

        assert_eq!(content_bounds(&gray, 200), Some(PixelRect::new(2, 3, 6, 7)));

        let blank = GrayImage::from_pixel(4, 4, Luma([255]));
        assert_eq!(content_bounds(&blank, 200), None);
    }

    #[test]
    fn test_detector_box_selected() {
        let image = white_image(400, 300);
        let document = boxed(50, 40, 350, 260);
        let recognizer = PrecomputedRecognizer::default().with_region(document.rect, lines(6));

        let crop = select_document(&image, &[document], &recognizer).unwrap();

        match crop.strategy {
            CropStrategy::Detector { index, rect, .. } => {
                assert_eq!(index, 0);
                assert_eq!(rect, PixelRect::new(40, 30, 360, 270));
            }
            other => panic!("unexpected strategy {:?}", other),
        }
        assert_eq!((crop.image.width(), crop.image.height()), (320, 240));
    }

    #[test]
    fn test_small_or_skewed_boxes_are_not_eligible() {
        let image = white_image(400, 300);
        let small = boxed(0, 0, 100, 100);
        let wide = boxed(0, 0, 400, 130);
        let recognizer = PrecomputedRecognizer::default()
            .with_region(small.rect, lines(10))
            .with_region(wide.rect, lines(10));

        let crop = select_document(&image, &[small, wide], &recognizer).unwrap();
        assert_eq!(crop.strategy, CropStrategy::Original);
    }

    #[test]
    fn test_box_without_text_is_not_selected() {
        let image = with_dark_block(400, 300, PixelRect::new(100, 100, 300, 200));
        let recognizer = PrecomputedRecognizer::default();
        let crop = select_document(&image, &[boxed(20, 20, 380, 280)], &recognizer).unwrap();

        assert!(matches!(crop.strategy, CropStrategy::ContentBounds { .. }));
    }

    #[test]
    fn test_higher_text_density_wins() {
        let image = white_image(400, 300);
        let sparse = boxed(10, 10, 390, 290);
        let dense = boxed(20, 20, 380, 280);
        let recognizer = PrecomputedRecognizer::default()
            .with_region(sparse.rect, lines(2))
            .with_region(dense.rect, lines(12));

        let crop = select_document(&image, &[sparse, dense], &recognizer).unwrap();
        assert!(matches!(crop.strategy, CropStrategy::Detector { index: 1, .. }));
    }

    #[test]
    fn test_exact_tie_keeps_first_listed() {
        let image = white_image(400, 300);
        let first = boxed(0, 0, 300, 200);
        let second = boxed(100, 100, 400, 300);
        let recognizer = PrecomputedRecognizer::default()
            .with_region(first.rect, lines(10))
            .with_region(second.rect, lines(10));

        let crop = select_document(&image, &[first, second], &recognizer).unwrap();
        assert!(matches!(crop.strategy, CropStrategy::Detector { index: 0, .. }));
    }

    #[test]
    fn test_recognizer_failure_degrades() {
        let image = white_image(400, 300);
        let failing = |_: &DynamicImage| -> Result<String, OcrError> {
            Err(OcrError::Recognition("engine unavailable".to_string()))
        };

        let crop = select_document(&image, &[boxed(10, 10, 390, 290)], &failing).unwrap();
        assert_eq!(crop.strategy, CropStrategy::Original);
    }

    #[test]
    fn test_score_formula() {
        let selector = RegionSelector::new();
        let score = selector.score(PixelRect::new(0, 0, 200, 150), 400.0 * 300.0, 5);
        assert!((score - 0.125).abs() < 1e-6);

        let penalized = selector.score(PixelRect::new(0, 0, 300, 100), 400.0 * 300.0, 10);
        assert!((penalized - 0.125).abs() < 1e-6);
    }
}
