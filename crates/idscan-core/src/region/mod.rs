//! Face and document region selection.
//!
//! Detector output (face boxes, generic object boxes) and raw pixel statistics
//! are turned into two crops of the source image. The face crop is optional;
//! the document crop always succeeds through a three-tier fallback:
//! detector box, content bounds, then the original image.

mod enhance;
mod geometry;
mod recognizer;
mod selector;

pub use enhance::{ImageQuality, assess, enhance};
pub use geometry::PixelRect;
pub use recognizer::{PrecomputedRecognizer, TextRecognizer, count_text_lines};
pub use selector::{CropStrategy, DocumentCrop, RegionSelector, select_document, select_face};

use serde::{Deserialize, Serialize};
use tracing::debug;

/// A bounding box reported by an external face or object detector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CandidateBox {
    /// Box coordinates in source image pixels.
    #[serde(flatten)]
    pub rect: PixelRect,

    /// Detector confidence, if the detector reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

impl CandidateBox {
    /// Create a candidate box, rejecting empty or inverted rectangles.
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Option<Self> {
        PixelRect::new(left, top, right, bottom)
            .non_degenerate()
            .map(|rect| Self { rect, score: None })
    }

    pub fn is_valid(&self) -> bool {
        !self.rect.is_degenerate()
    }
}

/// Drop boxes with `right <= left` or `bottom <= top`, keeping detector order.
pub fn sanitize_candidates<I>(boxes: I) -> Vec<CandidateBox>
where
    I: IntoIterator<Item = CandidateBox>,
{
    boxes
        .into_iter()
        .filter(|b| {
            if b.is_valid() {
                true
            } else {
                debug!("Discarding degenerate candidate box {:?}", b.rect);
                false
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_box_rejects_inverted() {
        assert!(CandidateBox::new(10, 10, 5, 20).is_none());
        assert!(CandidateBox::new(10, 10, 20, 10).is_none());
        assert!(CandidateBox::new(10, 10, 20, 20).is_some());
    }

    #[test]
    fn test_sanitize_keeps_order() {
        let scored = |rect: PixelRect, score: Option<f32>| CandidateBox { rect, score };
        let boxes = vec![
            scored(PixelRect::new(0, 0, 10, 10), Some(0.9)),
            scored(PixelRect::new(5, 5, 5, 5), Some(0.8)),
            scored(PixelRect::new(1, 1, 3, 3), None),
        ];

        let kept = sanitize_candidates(boxes);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].score, Some(0.9));
        assert_eq!(kept[1].rect, PixelRect::new(1, 1, 3, 3));
    }

    #[test]
    fn test_candidate_box_json() {
        let parsed: CandidateBox =
            serde_json::from_str(r#"{"left":1,"top":2,"right":30,"bottom":40,"score":0.5}"#)
                .unwrap();
        assert_eq!(parsed.rect, PixelRect::new(1, 2, 30, 40));
        assert_eq!(parsed.score, Some(0.5));
    }
}
