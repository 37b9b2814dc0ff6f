use anyhow::{Context, Result};
use std::collections::HashMap;

/// Label used for class ids the table does not know
pub const FALLBACK_LABEL: &str = "unknown";

/// The 80 COCO class names in model order
pub const COCO_NAMES: [&str; 80] = [
    "person",
    "bicycle",
    "car",
    "motorcycle",
    "airplane",
    "bus",
    "train",
    "truck",
    "boat",
    "traffic light",
    "fire hydrant",
    "stop sign",
    "parking meter",
    "bench",
    "bird",
    "cat",
    "dog",
    "horse",
    "sheep",
    "cow",
    "elephant",
    "bear",
    "zebra",
    "giraffe",
    "backpack",
    "umbrella",
    "handbag",
    "tie",
    "suitcase",
    "frisbee",
    "skis",
    "snowboard",
    "sports ball",
    "kite",
    "baseball bat",
    "baseball glove",
    "skateboard",
    "surfboard",
    "tennis racket",
    "bottle",
    "wine glass",
    "cup",
    "fork",
    "knife",
    "spoon",
    "bowl",
    "banana",
    "apple",
    "sandwich",
    "orange",
    "broccoli",
    "carrot",
    "hot dog",
    "pizza",
    "donut",
    "cake",
    "chair",
    "couch",
    "potted plant",
    "bed",
    "dining table",
    "toilet",
    "tv",
    "laptop",
    "mouse",
    "remote",
    "keyboard",
    "cell phone",
    "microwave",
    "oven",
    "toaster",
    "sink",
    "refrigerator",
    "book",
    "clock",
    "vase",
    "scissors",
    "teddy bear",
    "hair drier",
    "toothbrush",
];

/// Class-index to label mapping for a detector model.
///
/// Lookups never fail: unknown ids resolve to [`FALLBACK_LABEL`] so the
/// detection is still drawn.
#[derive(Debug, Clone, Default)]
pub struct LabelTable {
    names: HashMap<u32, String>,
}

impl LabelTable {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names
                .into_iter()
                .enumerate()
                .map(|(i, name)| (i as u32, name.into()))
                .collect(),
        }
    }

    /// Parse a `coco.names`-style list: one class per line, line number is
    /// the class id. Surrounding whitespace is trimmed.
    pub fn parse(contents: &str) -> Self {
        Self::new(contents.lines().map(|line| line.trim().to_string()))
    }

    /// Table for COCO-trained detectors
    pub fn coco() -> Self {
        Self::new(COCO_NAMES)
    }

    pub fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read label file '{}'", path))?;
        Ok(Self::parse(&contents))
    }

    pub fn resolve(&self, class_id: u32) -> &str {
        match self.names.get(&class_id) {
            Some(name) if !name.is_empty() => name.as_str(),
            _ => FALLBACK_LABEL,
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
