// Detection records consumed by the frame loop

mod labels;

pub use labels::{LabelTable, COCO_NAMES, FALLBACK_LABEL};

use serde::{Deserialize, Serialize};

/// Axis-aligned box in pixel coordinates (top-left, bottom-right)
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl BoundingBox {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Integer pixel corners, as drawn on the frame
    pub fn corners(&self) -> ((i32, i32), (i32, i32)) {
        (
            (self.x1 as i32, self.y1 as i32),
            (self.x2 as i32, self.y2 as i32),
        )
    }
}

/// One labeled box reported by the detector for a single frame.
///
/// Re-produced every frame; the loop never keeps detections across frames.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Class label (open-ended text)
    pub label: String,
    /// Detector confidence in [0, 1]
    pub confidence: f32,
    #[serde(rename = "box")]
    pub bbox: BoundingBox,
}

impl Detection {
    pub fn new(label: impl Into<String>, confidence: f32, bbox: BoundingBox) -> Self {
        Self {
            label: label.into(),
            confidence: confidence.clamp(0.0, 1.0),
            bbox,
        }
    }

    /// Caption drawn above the box, e.g. `"dog 0.91"`
    pub fn caption(&self) -> String {
        format!("{} {:.2}", self.label, self.confidence)
    }

    /// Case-insensitive match against the configured person class
    pub fn is_person(&self, person_label: &str) -> bool {
        self.label.eq_ignore_ascii_case(person_label)
    }
}

/// True when any detection in the frame is of the person class
pub fn person_present(detections: &[Detection], person_label: &str) -> bool {
    detections.iter().any(|d| d.is_person(person_label))
}
